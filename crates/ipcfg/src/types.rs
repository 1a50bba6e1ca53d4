//! Identifiers and enumerations carried by adapter records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Address family filter and socket address tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum AddressFamily {
    /// Both families.
    #[default]
    Unspec = 0,
    /// IPv4 (`AF_INET`).
    Inet = 2,
    /// IPv6 (`AF_INET6`).
    Inet6 = 23,
}

impl AddressFamily {
    /// Check whether an address belongs to this family (`Unspec` matches all).
    pub fn matches(self, addr: &std::net::IpAddr) -> bool {
        match self {
            Self::Unspec => true,
            Self::Inet => addr.is_ipv4(),
            Self::Inet6 => addr.is_ipv6(),
        }
    }

    /// Family of an address.
    pub fn of(addr: &std::net::IpAddr) -> Self {
        if addr.is_ipv4() { Self::Inet } else { Self::Inet6 }
    }
}

impl From<u16> for AddressFamily {
    fn from(val: u16) -> Self {
        match val {
            2 => Self::Inet,
            23 => Self::Inet6,
            _ => Self::Unspec,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unspec => "unspec",
            Self::Inet => "inet",
            Self::Inet6 => "inet6",
        })
    }
}

/// Interface type (IANA ifType).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum IfType {
    #[default]
    Other = 1,
    Ethernet = 6,
    TokenRing = 9,
    Ppp = 23,
    SoftwareLoopback = 24,
    Atm = 37,
    Ieee80211 = 71,
    Tunnel = 131,
    Ieee1394 = 144,
    Wwanpp = 243,
    Wwanpp2 = 244,
}

impl From<u32> for IfType {
    fn from(val: u32) -> Self {
        match val {
            6 => Self::Ethernet,
            9 => Self::TokenRing,
            23 => Self::Ppp,
            24 => Self::SoftwareLoopback,
            37 => Self::Atm,
            71 => Self::Ieee80211,
            131 => Self::Tunnel,
            144 => Self::Ieee1394,
            243 => Self::Wwanpp,
            244 => Self::Wwanpp2,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for IfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Other => "other",
            Self::Ethernet => "ethernet",
            Self::TokenRing => "token-ring",
            Self::Ppp => "ppp",
            Self::SoftwareLoopback => "loopback",
            Self::Atm => "atm",
            Self::Ieee80211 => "wireless",
            Self::Tunnel => "tunnel",
            Self::Ieee1394 => "firewire",
            Self::Wwanpp => "wwan",
            Self::Wwanpp2 => "wwan2",
        })
    }
}

/// Operational status (RFC 2863 ifOperStatus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum OperStatus {
    Up = 1,
    Down = 2,
    Testing = 3,
    #[default]
    Unknown = 4,
    Dormant = 5,
    NotPresent = 6,
    LowerLayerDown = 7,
}

impl From<u32> for OperStatus {
    fn from(val: u32) -> Self {
        match val {
            1 => Self::Up,
            2 => Self::Down,
            3 => Self::Testing,
            5 => Self::Dormant,
            6 => Self::NotPresent,
            7 => Self::LowerLayerDown,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for OperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Testing => "TESTING",
            Self::Unknown => "UNKNOWN",
            Self::Dormant => "DORMANT",
            Self::NotPresent => "NOTPRESENT",
            Self::LowerLayerDown => "LOWERLAYERDOWN",
        })
    }
}

/// Where the network part of a unicast address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum PrefixOrigin {
    #[default]
    Other = 0,
    Manual = 1,
    WellKnown = 2,
    Dhcp = 3,
    RouterAdvertisement = 4,
    Unchanged = 16,
}

impl From<u32> for PrefixOrigin {
    fn from(val: u32) -> Self {
        match val {
            1 => Self::Manual,
            2 => Self::WellKnown,
            3 => Self::Dhcp,
            4 => Self::RouterAdvertisement,
            16 => Self::Unchanged,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for PrefixOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Other => "other",
            Self::Manual => "manual",
            Self::WellKnown => "well-known",
            Self::Dhcp => "dhcp",
            Self::RouterAdvertisement => "router-advertisement",
            Self::Unchanged => "unchanged",
        })
    }
}

/// Where the host part of a unicast address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum SuffixOrigin {
    #[default]
    Other = 0,
    Manual = 1,
    WellKnown = 2,
    Dhcp = 3,
    LinkLayerAddress = 4,
    Random = 5,
    Unchanged = 16,
}

impl From<u32> for SuffixOrigin {
    fn from(val: u32) -> Self {
        match val {
            1 => Self::Manual,
            2 => Self::WellKnown,
            3 => Self::Dhcp,
            4 => Self::LinkLayerAddress,
            5 => Self::Random,
            16 => Self::Unchanged,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for SuffixOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Other => "other",
            Self::Manual => "manual",
            Self::WellKnown => "well-known",
            Self::Dhcp => "dhcp",
            Self::LinkLayerAddress => "link-layer",
            Self::Random => "random",
            Self::Unchanged => "unchanged",
        })
    }
}

/// Duplicate address detection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum DadState {
    #[default]
    Invalid = 0,
    Tentative = 1,
    Duplicate = 2,
    Deprecated = 3,
    Preferred = 4,
}

impl From<u32> for DadState {
    fn from(val: u32) -> Self {
        match val {
            1 => Self::Tentative,
            2 => Self::Duplicate,
            3 => Self::Deprecated,
            4 => Self::Preferred,
            _ => Self::Invalid,
        }
    }
}

impl fmt::Display for DadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Invalid => "invalid",
            Self::Tentative => "tentative",
            Self::Duplicate => "duplicate",
            Self::Deprecated => "deprecated",
            Self::Preferred => "preferred",
        })
    }
}

/// Connection type of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum ConnectionType {
    #[default]
    Dedicated = 1,
    Passive = 2,
    Demand = 3,
    Maximum = 4,
}

impl From<u32> for ConnectionType {
    fn from(val: u32) -> Self {
        match val {
            2 => Self::Passive,
            3 => Self::Demand,
            4 => Self::Maximum,
            _ => Self::Dedicated,
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dedicated => "dedicated",
            Self::Passive => "passive",
            Self::Demand => "demand",
            Self::Maximum => "maximum",
        })
    }
}

/// Encapsulation used by a tunnel adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum TunnelType {
    #[default]
    None = 0,
    Other = 1,
    Direct = 2,
    SixToFour = 11,
    Isatap = 13,
    Teredo = 14,
    IpHttps = 15,
}

impl From<u32> for TunnelType {
    fn from(val: u32) -> Self {
        match val {
            1 => Self::Other,
            2 => Self::Direct,
            11 => Self::SixToFour,
            13 => Self::Isatap,
            14 => Self::Teredo,
            15 => Self::IpHttps,
            _ => Self::None,
        }
    }
}

impl fmt::Display for TunnelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Other => "other",
            Self::Direct => "direct",
            Self::SixToFour => "6to4",
            Self::Isatap => "isatap",
            Self::Teredo => "teredo",
            Self::IpHttps => "iphttps",
        })
    }
}

/// Routing protocol that installed a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum RouteProtocol {
    Other = 1,
    Local = 2,
    /// Static route added by management (the default for created routes).
    #[default]
    NetMgmt = 3,
    Icmp = 4,
    Egp = 5,
    Ggp = 6,
    Hello = 7,
    Rip = 8,
    IsIs = 9,
    EsIs = 10,
    Cisco = 11,
    Bbn = 12,
    Ospf = 13,
    Bgp = 14,
    Idpr = 15,
    Eigrp = 16,
    Dvmrp = 17,
    Rpl = 18,
    Dhcp = 19,
}

impl From<u32> for RouteProtocol {
    fn from(val: u32) -> Self {
        match val {
            2 => Self::Local,
            3 => Self::NetMgmt,
            4 => Self::Icmp,
            5 => Self::Egp,
            6 => Self::Ggp,
            7 => Self::Hello,
            8 => Self::Rip,
            9 => Self::IsIs,
            10 => Self::EsIs,
            11 => Self::Cisco,
            12 => Self::Bbn,
            13 => Self::Ospf,
            14 => Self::Bgp,
            15 => Self::Idpr,
            16 => Self::Eigrp,
            17 => Self::Dvmrp,
            18 => Self::Rpl,
            19 => Self::Dhcp,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for RouteProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Other => "other",
            Self::Local => "local",
            Self::NetMgmt => "static",
            Self::Icmp => "icmp",
            Self::Egp => "egp",
            Self::Ggp => "ggp",
            Self::Hello => "hello",
            Self::Rip => "rip",
            Self::IsIs => "is-is",
            Self::EsIs => "es-is",
            Self::Cisco => "igrp",
            Self::Bbn => "bbn",
            Self::Ospf => "ospf",
            Self::Bgp => "bgp",
            Self::Idpr => "idpr",
            Self::Eigrp => "eigrp",
            Self::Dvmrp => "dvmrp",
            Self::Rpl => "rpl",
            Self::Dhcp => "dhcp",
        })
    }
}

/// How a route came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum RouteOrigin {
    #[default]
    Manual = 0,
    WellKnown = 1,
    Dhcp = 2,
    RouterAdvertisement = 3,
    SixToFour = 4,
}

impl From<u32> for RouteOrigin {
    fn from(val: u32) -> Self {
        match val {
            1 => Self::WellKnown,
            2 => Self::Dhcp,
            3 => Self::RouterAdvertisement,
            4 => Self::SixToFour,
            _ => Self::Manual,
        }
    }
}

impl fmt::Display for RouteOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Manual => "manual",
            Self::WellKnown => "well-known",
            Self::Dhcp => "dhcp",
            Self::RouterAdvertisement => "router-advertisement",
            Self::SixToFour => "6to4",
        })
    }
}

/// Locally unique interface identifier, stable across reboots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Luid(pub u64);

impl Luid {
    /// Interface type encoded in the high bits.
    pub fn if_type(&self) -> u16 {
        (self.0 >> 48) as u16
    }

    /// Per-type index encoded in the middle bits.
    pub fn net_luid_index(&self) -> u32 {
        ((self.0 >> 24) & 0xff_ffff) as u32
    }
}

impl fmt::Display for Luid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl From<u64> for Luid {
    fn from(val: u64) -> Self {
        Self(val)
    }
}

impl Serialize for Luid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

/// Globally unique identifier, laid out as the host stores it.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    /// Size of this structure.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Create a GUID from its parts.
    pub const fn from_parts(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    /// Check whether every byte is zero.
    pub fn is_nil(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

/// Error returned when a GUID string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid GUID: {0}")]
pub struct GuidParseError(String);

impl FromStr for Guid {
    type Err = GuidParseError;

    /// Parse `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`, with or without braces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || GuidParseError(s.to_string());
        let inner = s.trim();
        let inner = inner
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(inner);

        let groups: Vec<&str> = inner.split('-').collect();
        let widths = [8, 4, 4, 4, 12];
        if groups.len() != widths.len()
            || groups.iter().zip(widths).any(|(g, w)| g.len() != w)
        {
            return Err(err());
        }

        let data1 = u32::from_str_radix(groups[0], 16).map_err(|_| err())?;
        let data2 = u16::from_str_radix(groups[1], 16).map_err(|_| err())?;
        let data3 = u16::from_str_radix(groups[2], 16).map_err(|_| err())?;
        let tail = format!("{}{}", groups[3], groups[4]);
        let mut data4 = [0u8; 8];
        for (i, byte) in data4.iter_mut().enumerate() {
            let pair = tail.get(i * 2..i * 2 + 2).ok_or_else(err)?;
            *byte = u8::from_str_radix(pair, 16).map_err(|_| err())?;
        }
        Ok(Self::from_parts(data1, data2, data3, data4))
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
