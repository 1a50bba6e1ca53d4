//! Serialize interfaces into a linked adapter record buffer.
//!
//! The output has the exact shape the host produces: the adapter chain
//! starts at the first byte and every pointer is an absolute address, taking
//! the buffer to live at `base`. Decoding it yields the same interfaces.

use std::net::IpAddr;

use zerocopy::{FromZeros, Immutable, IntoBytes};

use crate::codepage::{self, CodePage};
use crate::error::Result;
use crate::interface::Interface;
use crate::record::entry::{AdapterAddress, IpPrefix, UnicastAddress};
use crate::record::raw::{
    IpAdapterAddressEntry, IpAdapterAddresses, IpAdapterDnsSuffix, IpAdapterPrefix,
    IpAdapterUnicastAddress, IpAdapterUnicastAddressXp, MAX_DNS_SUFFIX_STRING_LENGTH, Ptr,
    SocketAddress,
};
use crate::record::sockaddr;

const ALIGN: usize = 8;

/// Encoder for adapter record buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    legacy_unicast: bool,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write unicast entries in the pre-Vista layout, without prefix lengths.
    pub fn legacy_unicast(mut self, legacy: bool) -> Self {
        self.legacy_unicast = legacy;
        self
    }

    /// Encode `interfaces` for a buffer starting at address `base`.
    pub fn encode(&self, interfaces: &[Interface], base: u64) -> Result<Vec<u8>> {
        let mut w = Writer {
            bytes: Vec::new(),
            base,
        };
        if interfaces.is_empty() {
            return Ok(w.bytes);
        }

        let slots: Vec<usize> = interfaces
            .iter()
            .map(|_| w.reserve(size_of::<IpAdapterAddresses>()))
            .collect();

        for (i, ifc) in interfaces.iter().enumerate() {
            let mut rec = self.adapter(&mut w, ifc)?;
            rec.next = slots.get(i + 1).map_or(0, |off| w.ptr(*off));
            w.put(slots[i], &rec);
        }
        Ok(w.bytes)
    }

    fn adapter(&self, w: &mut Writer, ifc: &Interface) -> Result<IpAdapterAddresses> {
        let mut rec = IpAdapterAddresses::new_zeroed();
        rec.length = size_of::<IpAdapterAddresses>() as u32;
        rec.if_index = ifc.index;
        rec.adapter_name = w.ansi(&ifc.adapter_name)?;
        rec.first_unicast_address = if self.legacy_unicast {
            w.chain(&ifc.unicast_addresses, unicast_xp)
        } else {
            w.chain(&ifc.unicast_addresses, unicast)
        };
        rec.first_anycast_address = w.chain(&ifc.anycast_addresses, address_entry);
        rec.first_multicast_address = w.chain(&ifc.multicast_addresses, address_entry);
        rec.first_dns_server_address = w.chain(&ifc.dns_server_addresses, address_entry);
        rec.dns_suffix = w.wide(&ifc.dns_suffix);
        rec.description = w.wide(&ifc.description);
        rec.friendly_name = w.wide(&ifc.friendly_name);

        let phys = ifc.physical_address.len().min(rec.physical_address.len());
        rec.physical_address[..phys].copy_from_slice(&ifc.physical_address[..phys]);
        rec.physical_address_length = phys as u32;

        rec.flags = ifc.flags;
        rec.mtu = ifc.mtu;
        rec.if_type = ifc.if_type as u32;
        rec.oper_status = ifc.oper_status as u32;
        rec.ipv6_if_index = ifc.ipv6_if_index;
        rec.zone_indices = ifc.zone_indices;
        rec.first_prefix = w.chain(&ifc.prefixes, prefix);
        rec.transmit_link_speed = ifc.transmit_link_speed;
        rec.receive_link_speed = ifc.receive_link_speed;
        rec.first_wins_server_address = w.chain(&ifc.wins_server_addresses, address_entry);
        rec.first_gateway_address = w.chain(&ifc.gateway_addresses, address_entry);
        rec.ipv4_metric = ifc.ipv4_metric;
        rec.ipv6_metric = ifc.ipv6_metric;
        rec.luid = ifc.luid.0;
        rec.dhcpv4_server = w.sockaddr(ifc.dhcpv4_server);
        rec.compartment_id = ifc.compartment_id;
        rec.network_guid = ifc.network_guid;
        rec.connection_type = ifc.connection_type as u32;
        rec.tunnel_type = ifc.tunnel_type as u32;
        rec.dhcpv6_server = w.sockaddr(ifc.dhcpv6_server);

        let duid = ifc.dhcpv6_client_duid.len().min(rec.dhcpv6_client_duid.len());
        rec.dhcpv6_client_duid[..duid].copy_from_slice(&ifc.dhcpv6_client_duid[..duid]);
        rec.dhcpv6_client_duid_length = duid as u32;
        rec.dhcpv6_iaid = ifc.dhcpv6_iaid;
        rec.first_dns_suffix = w.chain(&ifc.dns_suffixes, dns_suffix);
        Ok(rec)
    }
}

/// Encode with the current record layout.
pub fn encode_interfaces(interfaces: &[Interface], base: u64) -> Result<Vec<u8>> {
    Encoder::new().encode(interfaces, base)
}

struct Writer {
    bytes: Vec<u8>,
    base: u64,
}

impl Writer {
    /// Append `len` zero bytes at the next aligned offset.
    fn reserve(&mut self, len: usize) -> usize {
        let off = self.bytes.len().next_multiple_of(ALIGN);
        self.bytes.resize(off + len, 0);
        off
    }

    fn put<T: IntoBytes + Immutable>(&mut self, off: usize, value: &T) {
        let raw = value.as_bytes();
        self.bytes[off..off + raw.len()].copy_from_slice(raw);
    }

    fn push_bytes(&mut self, raw: &[u8]) -> Ptr {
        let off = self.reserve(raw.len());
        self.bytes[off..off + raw.len()].copy_from_slice(raw);
        self.ptr(off)
    }

    fn ptr(&self, off: usize) -> Ptr {
        (self.base + off as u64) as Ptr
    }

    fn ansi(&mut self, text: &str) -> Result<Ptr> {
        let mut raw = codepage::encode(text, CodePage::Ansi)?;
        raw.push(0);
        Ok(self.push_bytes(&raw))
    }

    fn wide(&mut self, text: &str) -> Ptr {
        let units: Vec<u16> = text.encode_utf16().chain(Some(0)).collect();
        self.push_bytes(units.as_bytes())
    }

    fn sockaddr(&mut self, addr: Option<IpAddr>) -> SocketAddress {
        match addr {
            Some(addr) => {
                let raw = sockaddr::encode(&addr);
                SocketAddress {
                    sockaddr: self.push_bytes(&raw),
                    sockaddr_length: raw.len() as i32,
                    ..Default::default()
                }
            }
            None => SocketAddress::default(),
        }
    }

    /// Lay out a chain; `build` gets each item and the pointer to the next record.
    fn chain<I, T: IntoBytes + Immutable>(
        &mut self,
        items: &[I],
        build: impl Fn(&mut Self, &I, Ptr) -> T,
    ) -> Ptr {
        if items.is_empty() {
            return 0;
        }
        let slots: Vec<usize> = items.iter().map(|_| self.reserve(size_of::<T>())).collect();
        for (i, item) in items.iter().enumerate() {
            let next = slots.get(i + 1).map_or(0, |off| self.ptr(*off));
            let record = build(self, item, next);
            self.put(slots[i], &record);
        }
        self.ptr(slots[0])
    }
}

fn unicast(w: &mut Writer, addr: &UnicastAddress, next: Ptr) -> IpAdapterUnicastAddress {
    IpAdapterUnicastAddress {
        length: size_of::<IpAdapterUnicastAddress>() as u32,
        flags: addr.flags,
        next,
        address: w.sockaddr(Some(addr.address)),
        prefix_origin: addr.prefix_origin as u32,
        suffix_origin: addr.suffix_origin as u32,
        dad_state: addr.dad_state as u32,
        valid_lifetime: addr.valid_lifetime,
        preferred_lifetime: addr.preferred_lifetime,
        lease_lifetime: addr.lease_lifetime,
        on_link_prefix_length: addr.on_link_prefix_length,
        ..Default::default()
    }
}

fn unicast_xp(w: &mut Writer, addr: &UnicastAddress, next: Ptr) -> IpAdapterUnicastAddressXp {
    IpAdapterUnicastAddressXp {
        length: size_of::<IpAdapterUnicastAddressXp>() as u32,
        flags: addr.flags,
        next,
        address: w.sockaddr(Some(addr.address)),
        prefix_origin: addr.prefix_origin as u32,
        suffix_origin: addr.suffix_origin as u32,
        dad_state: addr.dad_state as u32,
        valid_lifetime: addr.valid_lifetime,
        preferred_lifetime: addr.preferred_lifetime,
        lease_lifetime: addr.lease_lifetime,
        ..Default::default()
    }
}

fn address_entry(w: &mut Writer, addr: &AdapterAddress, next: Ptr) -> IpAdapterAddressEntry {
    IpAdapterAddressEntry {
        length: size_of::<IpAdapterAddressEntry>() as u32,
        flags: addr.flags,
        next,
        address: w.sockaddr(Some(addr.address)),
        ..Default::default()
    }
}

fn prefix(w: &mut Writer, p: &IpPrefix, next: Ptr) -> IpAdapterPrefix {
    IpAdapterPrefix {
        length: size_of::<IpAdapterPrefix>() as u32,
        flags: p.flags,
        next,
        address: w.sockaddr(Some(p.address)),
        prefix_length: p.prefix_length,
        ..Default::default()
    }
}

fn dns_suffix(_w: &mut Writer, suffix: &String, next: Ptr) -> IpAdapterDnsSuffix {
    let mut string = [0u16; MAX_DNS_SUFFIX_STRING_LENGTH];
    for (slot, unit) in string
        .iter_mut()
        .zip(suffix.encode_utf16())
        .take(MAX_DNS_SUFFIX_STRING_LENGTH - 1)
    {
        *slot = unit;
    }
    IpAdapterDnsSuffix { next, string }
}
