//! Linked sub-record chains and their decoded forms.

use std::marker::PhantomData;
use std::net::IpAddr;

use serde::Serialize;
use zerocopy::FromBytes;

use super::buffer::{RecordBuffer, wide_array};
use super::layout::{LEGACY_UNICAST_RECORD_SIZE, UNICAST_RECORD_SIZE};
use super::raw::{
    IpAdapterAddressEntry, IpAdapterAddresses, IpAdapterDnsSuffix, IpAdapterPrefix,
    IpAdapterUnicastAddress, IpAdapterUnicastAddressXp, Ptr,
};
use super::sockaddr;
use crate::error::{Error, Result};
use crate::net::IpNet;
use crate::types::{DadState, PrefixOrigin, SuffixOrigin};

/// A record type that links to the next record of the same type.
pub trait LinkedRecord: FromBytes + Sized {
    /// Name used in errors.
    const NAME: &'static str;

    /// Pointer to the next record, zero at the end of the chain.
    fn next(&self) -> Ptr;
}

impl LinkedRecord for IpAdapterAddresses {
    const NAME: &'static str = "adapter";

    fn next(&self) -> Ptr {
        self.next
    }
}

impl LinkedRecord for IpAdapterUnicastAddressXp {
    const NAME: &'static str = "unicast address";

    fn next(&self) -> Ptr {
        self.next
    }
}

impl LinkedRecord for IpAdapterAddressEntry {
    const NAME: &'static str = "address";

    fn next(&self) -> Ptr {
        self.next
    }
}

impl LinkedRecord for IpAdapterPrefix {
    const NAME: &'static str = "prefix";

    fn next(&self) -> Ptr {
        self.next
    }
}

impl LinkedRecord for IpAdapterDnsSuffix {
    const NAME: &'static str = "DNS suffix";

    fn next(&self) -> Ptr {
        self.next
    }
}

/// Iterator over a chain of records, yielding each record with its address.
///
/// The walk stops at a null link. Records are not checked for cycles; the
/// walk is instead bounded by how many records of this type could fit in
/// the buffer, and running past that bound is an error.
pub struct Chain<'b, 'a, T> {
    buf: &'b RecordBuffer<'a>,
    next: u64,
    remaining: usize,
    _marker: PhantomData<T>,
}

impl<'b, 'a, T: LinkedRecord> Chain<'b, 'a, T> {
    pub fn new(buf: &'b RecordBuffer<'a>, head: Ptr) -> Self {
        Self {
            buf,
            next: u64::from(head),
            remaining: buf.len() / size_of::<T>().max(1),
            _marker: PhantomData,
        }
    }
}

impl<T: LinkedRecord> Iterator for Chain<'_, '_, T> {
    type Item = Result<(u64, T)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == 0 {
            return None;
        }
        if self.remaining == 0 {
            self.next = 0;
            return Some(Err(Error::InvalidRecord(format!(
                "{} chain is longer than the buffer can hold",
                T::NAME
            ))));
        }
        self.remaining -= 1;

        let at = self.next;
        match self.buf.read::<T>(at) {
            Ok(record) => {
                self.next = u64::from(record.next());
                Some(Ok((at, record)))
            }
            Err(e) => {
                self.next = 0;
                Some(Err(e))
            }
        }
    }
}

/// A unicast address with its on-link prefix and lifetimes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnicastAddress {
    pub address: IpAddr,
    pub flags: u32,
    pub prefix_origin: PrefixOrigin,
    pub suffix_origin: SuffixOrigin,
    pub dad_state: DadState,
    pub valid_lifetime: u32,
    pub preferred_lifetime: u32,
    pub lease_lifetime: u32,
    pub on_link_prefix_length: u8,
}

impl UnicastAddress {
    /// Lifetime value meaning "never expires".
    pub const INFINITE: u32 = u32::MAX;

    /// A manually configured address that never expires.
    pub fn manual(net: IpNet) -> Self {
        Self {
            address: net.addr(),
            flags: 0,
            prefix_origin: PrefixOrigin::Manual,
            suffix_origin: SuffixOrigin::Manual,
            dad_state: DadState::Preferred,
            valid_lifetime: Self::INFINITE,
            preferred_lifetime: Self::INFINITE,
            lease_lifetime: Self::INFINITE,
            on_link_prefix_length: net.prefix_len(),
        }
    }

    /// The address paired with its on-link prefix length.
    pub fn ip_net(&self) -> IpNet {
        IpNet::new_clamped(self.address, self.on_link_prefix_length)
    }
}

/// An anycast, multicast, DNS server, WINS server or gateway address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterAddress {
    pub address: IpAddr,
    pub flags: u32,
}

impl From<IpAddr> for AdapterAddress {
    fn from(address: IpAddr) -> Self {
        Self { address, flags: 0 }
    }
}

/// An on-link prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpPrefix {
    pub address: IpAddr,
    pub prefix_length: u32,
    pub flags: u32,
}

impl IpPrefix {
    pub fn ip_net(&self) -> IpNet {
        let len = u8::try_from(self.prefix_length).unwrap_or(u8::MAX);
        IpNet::new_clamped(self.address, len)
    }
}

/// Check whether a unicast record's length marks the pre-Vista layout.
///
/// Only 64-bit targets can tell the generations apart. On 32-bit targets
/// both are the same size, so every full-size record is read as current.
pub fn is_legacy_unicast(length: u32) -> bool {
    let length = length as usize;
    if LEGACY_UNICAST_RECORD_SIZE < UNICAST_RECORD_SIZE {
        length <= LEGACY_UNICAST_RECORD_SIZE
    } else {
        length < UNICAST_RECORD_SIZE
    }
}

/// Decode a unicast chain, accepting both record generations.
pub fn unicast_addresses(buf: &RecordBuffer<'_>, head: Ptr) -> Result<Vec<UnicastAddress>> {
    let mut out = Vec::new();
    for item in Chain::<IpAdapterUnicastAddressXp>::new(buf, head) {
        let (at, xp) = item?;
        let Some(address) = sockaddr::decode(buf, &xp.address)? else {
            tracing::debug!(record = "unicast", at, "skipping record without address");
            continue;
        };

        let on_link_prefix_length = if is_legacy_unicast(xp.length) {
            tracing::debug!(at, length = xp.length, "legacy unicast record");
            if address.is_ipv4() { 32 } else { 128 }
        } else {
            buf.read::<IpAdapterUnicastAddress>(at)?.on_link_prefix_length
        };

        out.push(UnicastAddress {
            address,
            flags: xp.flags,
            prefix_origin: PrefixOrigin::from(xp.prefix_origin),
            suffix_origin: SuffixOrigin::from(xp.suffix_origin),
            dad_state: DadState::from(xp.dad_state),
            valid_lifetime: xp.valid_lifetime,
            preferred_lifetime: xp.preferred_lifetime,
            lease_lifetime: xp.lease_lifetime,
            on_link_prefix_length,
        });
    }
    Ok(out)
}

/// Decode an anycast, multicast, DNS server, WINS server or gateway chain.
pub fn addresses(buf: &RecordBuffer<'_>, head: Ptr) -> Result<Vec<AdapterAddress>> {
    let mut out = Vec::new();
    for item in Chain::<IpAdapterAddressEntry>::new(buf, head) {
        let (at, entry) = item?;
        match sockaddr::decode(buf, &entry.address)? {
            Some(address) => out.push(AdapterAddress {
                address,
                flags: entry.flags,
            }),
            None => tracing::debug!(record = "address", at, "skipping record without address"),
        }
    }
    Ok(out)
}

/// Decode a prefix chain.
pub fn prefixes(buf: &RecordBuffer<'_>, head: Ptr) -> Result<Vec<IpPrefix>> {
    let mut out = Vec::new();
    for item in Chain::<IpAdapterPrefix>::new(buf, head) {
        let (at, prefix) = item?;
        match sockaddr::decode(buf, &prefix.address)? {
            Some(address) => out.push(IpPrefix {
                address,
                prefix_length: prefix.prefix_length,
                flags: prefix.flags,
            }),
            None => tracing::debug!(record = "prefix", at, "skipping record without address"),
        }
    }
    Ok(out)
}

/// Decode a DNS suffix chain.
pub fn dns_suffixes(buf: &RecordBuffer<'_>, head: Ptr) -> Result<Vec<String>> {
    Chain::<IpAdapterDnsSuffix>::new(buf, head)
        .map(|item| item.map(|(_, suffix)| wide_array(&suffix.string)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    use zerocopy::IntoBytes;

    use crate::record::raw::SocketAddress;

    const BASE: u64 = 0x10_0000;

    fn ptr(offset: usize) -> Ptr {
        (BASE + offset as u64) as Ptr
    }

    /// Lay out one address record per entry, each followed by its sockaddr.
    fn entry_chain(addrs: &[&str]) -> Vec<u8> {
        let entry_size = size_of::<IpAdapterAddressEntry>();
        let sa_size = 28;
        let stride = entry_size + sa_size;
        let mut bytes = vec![0u8; stride * addrs.len()];

        for (i, addr) in addrs.iter().enumerate() {
            let at = i * stride;
            let sa = sockaddr::encode(&addr.parse().unwrap());
            let entry = IpAdapterAddressEntry {
                length: entry_size as u32,
                flags: i as u32,
                next: if i + 1 < addrs.len() { ptr(at + stride) } else { 0 },
                address: SocketAddress {
                    sockaddr: ptr(at + entry_size),
                    sockaddr_length: sa.len() as i32,
                    ..Default::default()
                },
                ..Default::default()
            };
            bytes[at..at + entry_size].copy_from_slice(entry.as_bytes());
            bytes[at + entry_size..at + entry_size + sa.len()].copy_from_slice(&sa);
        }
        bytes
    }

    #[test]
    fn test_address_chain_in_order() {
        let bytes = entry_chain(&["8.8.8.8", "2001:4860:4860::8888", "1.1.1.1"]);
        let buf = RecordBuffer::new(&bytes, BASE);
        let out = addresses(&buf, ptr(0)).unwrap();
        let got: Vec<String> = out.iter().map(|a| a.address.to_string()).collect();
        assert_eq!(got, ["8.8.8.8", "2001:4860:4860::8888", "1.1.1.1"]);
        assert_eq!(out[2].flags, 2);
    }

    #[test]
    fn test_null_head_is_empty() {
        let bytes = entry_chain(&["8.8.8.8"]);
        let buf = RecordBuffer::new(&bytes, BASE);
        assert!(addresses(&buf, 0).unwrap().is_empty());
        assert!(prefixes(&buf, 0).unwrap().is_empty());
        assert!(unicast_addresses(&buf, 0).unwrap().is_empty());
        assert!(dns_suffixes(&buf, 0).unwrap().is_empty());
    }

    #[test]
    fn test_cycle_is_bounded() {
        let mut bytes = entry_chain(&["8.8.8.8"]);
        // Point the only record at itself
        let next = offset_of!(IpAdapterAddressEntry, next);
        bytes[next..next + size_of::<Ptr>()].copy_from_slice(ptr(0).as_bytes());
        let buf = RecordBuffer::new(&bytes, BASE);
        assert!(matches!(addresses(&buf, ptr(0)), Err(Error::InvalidRecord(_))));
    }

    #[test]
    fn test_dangling_next() {
        let mut bytes = entry_chain(&["8.8.8.8"]);
        let next = offset_of!(IpAdapterAddressEntry, next);
        bytes[next..next + size_of::<Ptr>()].copy_from_slice(ptr(1 << 16).as_bytes());
        let buf = RecordBuffer::new(&bytes, BASE);
        assert!(matches!(addresses(&buf, ptr(0)), Err(Error::InvalidRecord(_))));
    }

    #[test]
    fn test_absent_address_is_skipped() {
        let mut bytes = entry_chain(&["8.8.8.8", "9.9.9.9"]);
        let len = offset_of!(IpAdapterAddressEntry, address)
            + offset_of!(SocketAddress, sockaddr_length);
        bytes[len..len + 4].copy_from_slice(&0i32.to_ne_bytes());
        let buf = RecordBuffer::new(&bytes, BASE);
        let out = addresses(&buf, ptr(0)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].address.to_string(), "9.9.9.9");
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_legacy_detection_by_length() {
        assert!(is_legacy_unicast(56));
        assert!(!is_legacy_unicast(64));
        assert!(!is_legacy_unicast(size_of::<IpAdapterUnicastAddress>() as u32));
        assert!(is_legacy_unicast(size_of::<IpAdapterUnicastAddressXp>() as u32));
    }

    #[test]
    #[cfg(target_pointer_width = "32")]
    fn test_legacy_detection_by_length() {
        // Both generations are 48 bytes; a full record is always current.
        assert!(!is_legacy_unicast(48));
        assert!(is_legacy_unicast(44));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_legacy_unicast_defaults_prefix() {
        let xp_size = size_of::<IpAdapterUnicastAddressXp>();
        let sa = sockaddr::encode(&"10.1.2.3".parse().unwrap());
        let record = IpAdapterUnicastAddressXp {
            length: xp_size as u32,
            address: SocketAddress {
                sockaddr: ptr(xp_size),
                sockaddr_length: sa.len() as i32,
                ..Default::default()
            },
            dad_state: 4,
            prefix_origin: 3,
            ..Default::default()
        };
        let mut bytes = record.as_bytes().to_vec();
        bytes.extend_from_slice(&sa);

        let buf = RecordBuffer::new(&bytes, BASE);
        let out = unicast_addresses(&buf, ptr(0)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].on_link_prefix_length, 32);
        assert_eq!(out[0].dad_state, DadState::Preferred);
        assert_eq!(out[0].prefix_origin, PrefixOrigin::Dhcp);
        assert_eq!(out[0].ip_net().to_string(), "10.1.2.3/32");
    }

    #[test]
    fn test_current_unicast_reads_prefix() {
        let size = size_of::<IpAdapterUnicastAddress>();
        let sa = sockaddr::encode(&"fe80::5".parse().unwrap());
        let record = IpAdapterUnicastAddress {
            length: size as u32,
            address: SocketAddress {
                sockaddr: ptr(size),
                sockaddr_length: sa.len() as i32,
                ..Default::default()
            },
            on_link_prefix_length: 64,
            ..Default::default()
        };
        let mut bytes = record.as_bytes().to_vec();
        bytes.extend_from_slice(&sa);

        let buf = RecordBuffer::new(&bytes, BASE);
        let out = unicast_addresses(&buf, ptr(0)).unwrap();
        assert_eq!(out[0].ip_net().to_string(), "fe80::5/64");
        assert!(out[0].ip_net().is_ipv6_link_local());
    }

    #[test]
    fn test_prefix_ip_net() {
        let p = IpPrefix {
            address: "10.0.0.0".parse().unwrap(),
            prefix_length: 8,
            flags: 0,
        };
        assert_eq!(p.ip_net().to_string(), "10.0.0.0/8");
        let wide = IpPrefix {
            prefix_length: 4000,
            ..p
        };
        assert_eq!(wide.ip_net().prefix_len(), 32);
    }
}
