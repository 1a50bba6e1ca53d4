//! Address/prefix values and their canonical ordering.

use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error type for address parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid prefix length: {0}")]
    InvalidPrefix(String),

    #[error("invalid MAC address: {0}")]
    InvalidMac(String),
}

/// Error type for route literal parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteParseError {
    #[error("invalid destination: {0}")]
    Destination(#[source] AddressParseError),

    #[error("invalid next hop: {0}")]
    NextHop(String),

    #[error("invalid metric: {0}")]
    Metric(String),

    #[error("next hop {next_hop} does not match destination family of {destination}")]
    FamilyMismatch { destination: IpNet, next_hop: IpAddr },

    #[error("unexpected token: {0}")]
    Unexpected(String),
}

/// An IP address with a prefix length.
///
/// The address keeps its host bits, so `10.0.0.1/24` and `10.0.0.2/24` are
/// distinct values. [`IpNet::network`] gives the masked form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpNet {
    addr: IpAddr,
    prefix_len: u8,
}

impl IpNet {
    /// Create a prefix, rejecting lengths wider than the address family.
    pub fn new(addr: IpAddr, prefix_len: u8) -> Result<Self, AddressParseError> {
        if prefix_len > max_prefix_len(&addr) {
            return Err(AddressParseError::InvalidPrefix(format!(
                "{} exceeds maximum {} for address family",
                prefix_len,
                max_prefix_len(&addr)
            )));
        }
        Ok(Self { addr, prefix_len })
    }

    /// Create a prefix, clamping the length to the address family width.
    pub fn new_clamped(addr: IpAddr, prefix_len: u8) -> Self {
        Self {
            prefix_len: prefix_len.min(max_prefix_len(&addr)),
            addr,
        }
    }

    /// A single-host prefix (/32 or /128).
    pub fn host(addr: IpAddr) -> Self {
        Self {
            prefix_len: max_prefix_len(&addr),
            addr,
        }
    }

    /// The address, including host bits.
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    /// The prefix length.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Width of the address family in bits.
    pub fn max_prefix_len(&self) -> u8 {
        max_prefix_len(&self.addr)
    }

    pub fn is_ipv4(&self) -> bool {
        self.addr.is_ipv4()
    }

    pub fn is_ipv6(&self) -> bool {
        self.addr.is_ipv6()
    }

    /// The netmask as an address of the same family.
    pub fn mask(&self) -> IpAddr {
        match self.addr {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::from(v4_mask(self.prefix_len))),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::from(v6_mask(self.prefix_len))),
        }
    }

    /// The address with host bits cleared.
    pub fn network(&self) -> IpAddr {
        match self.addr {
            IpAddr::V4(a) => IpAddr::V4(Ipv4Addr::from(u32::from(a) & v4_mask(self.prefix_len))),
            IpAddr::V6(a) => {
                IpAddr::V6(Ipv6Addr::from(u128::from(a) & v6_mask(self.prefix_len)))
            }
        }
    }

    /// This prefix with host bits cleared.
    pub fn trunc(&self) -> Self {
        Self {
            addr: self.network(),
            prefix_len: self.prefix_len,
        }
    }

    /// Check whether `addr` falls inside this prefix.
    pub fn contains(&self, addr: &IpAddr) -> bool {
        match (self.addr, addr) {
            (IpAddr::V4(net), IpAddr::V4(a)) => ipv4_in_prefix(*a, net, self.prefix_len),
            (IpAddr::V6(net), IpAddr::V6(a)) => ipv6_in_prefix(*a, net, self.prefix_len),
            _ => false,
        }
    }

    /// This prefix with an IPv4-mapped IPv6 address folded to IPv4.
    ///
    /// The prefix length is trimmed to the low 32 bits of the mask, so
    /// `::ffff:10.0.0.0/120` becomes `10.0.0.0/24`.
    pub fn to_canonical(&self) -> Self {
        match self.addr {
            IpAddr::V6(a) => match a.to_ipv4_mapped() {
                Some(v4) => Self {
                    addr: IpAddr::V4(v4),
                    prefix_len: self.prefix_len.saturating_sub(96),
                },
                None => *self,
            },
            IpAddr::V4(_) => *self,
        }
    }

    /// Check if the address is an IPv6 link-local unicast address (fe80::/10).
    pub fn is_ipv6_link_local(&self) -> bool {
        match self.addr {
            IpAddr::V6(a) => a.is_unicast_link_local(),
            IpAddr::V4(_) => false,
        }
    }
}

impl fmt::Display for IpNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

impl FromStr for IpNet {
    type Err = AddressParseError;

    /// Parse CIDR notation. A bare address is a host prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = parse_prefix(s)?;
        Self::new(addr, prefix)
    }
}

impl From<IpAddr> for IpNet {
    fn from(addr: IpAddr) -> Self {
        Self::host(addr)
    }
}

impl Serialize for IpNet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IpNet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn max_prefix_len(addr: &IpAddr) -> u8 {
    if addr.is_ipv4() { 32 } else { 128 }
}

fn v4_mask(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        n => !0u32 << (32 - u32::from(n.min(32))),
    }
}

fn v6_mask(prefix_len: u8) -> u128 {
    match prefix_len {
        0 => 0,
        n => !0u128 << (128 - u32::from(n.min(128))),
    }
}

/// Parse an IP address from string.
pub fn parse_addr(s: &str) -> Result<IpAddr, AddressParseError> {
    s.trim()
        .parse()
        .map_err(|_| AddressParseError::InvalidAddress(s.to_string()))
}

/// Parse an IP address with prefix length (CIDR notation).
/// Returns (address, prefix_length).
pub fn parse_prefix(s: &str) -> Result<(IpAddr, u8), AddressParseError> {
    if let Some((addr_str, prefix_str)) = s.trim().split_once('/') {
        let addr = parse_addr(addr_str)?;
        let prefix: u8 = prefix_str
            .parse()
            .map_err(|_| AddressParseError::InvalidPrefix(prefix_str.to_string()))?;
        Ok((addr, prefix))
    } else {
        let addr = parse_addr(s)?;
        Ok((addr, max_prefix_len(&addr)))
    }
}

/// Octets of an address in its shortest form.
///
/// IPv4-mapped IPv6 addresses collapse to their 4-byte form so that
/// the same host compares equal however it was reported.
pub fn addr_octets(addr: &IpAddr) -> Vec<u8> {
    match addr.to_canonical() {
        IpAddr::V4(a) => a.octets().to_vec(),
        IpAddr::V6(a) => a.octets().to_vec(),
    }
}

/// Compare two addresses by their raw octets.
///
/// A 4-byte address is compared on its own terms against a 16-byte one,
/// never zero-padded. When the shorter one is a prefix of the longer, the
/// shorter sorts first.
pub fn compare_addrs(a: &IpAddr, b: &IpAddr) -> Ordering {
    addr_octets(a).cmp(&addr_octets(b))
}

/// Canonical order for address/prefix pairs.
///
/// Both sides are folded with [`IpNet::to_canonical`], then ordered by
/// address octets ascending and prefix length descending so the more
/// specific entry sorts first.
pub fn compare_nets(a: &IpNet, b: &IpNet) -> Ordering {
    let (a, b) = (a.to_canonical(), b.to_canonical());
    compare_addrs(&a.addr, &b.addr).then_with(|| b.prefix_len.cmp(&a.prefix_len))
}

/// Check if an IPv4 address is in a given prefix.
pub fn ipv4_in_prefix(addr: Ipv4Addr, prefix_addr: Ipv4Addr, prefix_len: u8) -> bool {
    if prefix_len > 32 {
        return false;
    }
    let mask = v4_mask(prefix_len);
    (u32::from(addr) & mask) == (u32::from(prefix_addr) & mask)
}

/// Check if an IPv6 address is in a given prefix.
pub fn ipv6_in_prefix(addr: Ipv6Addr, prefix_addr: Ipv6Addr, prefix_len: u8) -> bool {
    if prefix_len > 128 {
        return false;
    }
    let mask = v6_mask(prefix_len);
    (u128::from(addr) & mask) == (u128::from(prefix_addr) & mask)
}

/// Parse a MAC address from string (colon or dash separated).
pub fn parse_mac(s: &str) -> Result<Vec<u8>, AddressParseError> {
    s.split([':', '-'])
        .map(|part| {
            if part.len() != 2 {
                return Err(AddressParseError::InvalidMac(s.to_string()));
            }
            u8::from_str_radix(part, 16).map_err(|_| AddressParseError::InvalidMac(s.to_string()))
        })
        .collect()
}

/// Format a hardware address.
pub fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}
