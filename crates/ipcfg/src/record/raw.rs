//! `repr(C)` mirrors of the adapter records the host writes into the
//! enumeration buffer.
//!
//! Pointer fields are kept as plain integers ([`Ptr`]); they are absolute
//! addresses into the same buffer and are only ever resolved through
//! [`RecordBuffer`](super::RecordBuffer). Padding the C compiler inserts is
//! spelled out as `_pad` fields so every mirror derives `IntoBytes`.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::types::Guid;

/// A pointer-sized field.
#[cfg(target_pointer_width = "64")]
pub type Ptr = u64;

/// A pointer-sized field.
#[cfg(target_pointer_width = "32")]
pub type Ptr = u32;

/// Maximum length of a DNS suffix string, in UTF-16 units.
pub const MAX_DNS_SUFFIX_STRING_LENGTH: usize = 256;

/// Maximum length of a hardware address.
pub const MAX_ADAPTER_ADDRESS_LENGTH: usize = 8;

/// Maximum length of a DHCPv6 DUID.
pub const MAX_DHCPV6_DUID_LENGTH: usize = 130;

/// Pointer to a variable-length socket address plus its declared length
/// (`SOCKET_ADDRESS`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct SocketAddress {
    pub sockaddr: Ptr,
    pub sockaddr_length: i32,
    #[cfg(target_pointer_width = "64")]
    pub _pad: u32,
}

/// Adapter entry (`IP_ADAPTER_ADDRESSES_LH`).
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IpAdapterAddresses {
    pub length: u32,
    pub if_index: u32,
    pub next: Ptr,
    /// Single-byte string in the ANSI code page.
    pub adapter_name: Ptr,
    pub first_unicast_address: Ptr,
    pub first_anycast_address: Ptr,
    pub first_multicast_address: Ptr,
    pub first_dns_server_address: Ptr,
    /// UTF-16.
    pub dns_suffix: Ptr,
    /// UTF-16.
    pub description: Ptr,
    /// UTF-16.
    pub friendly_name: Ptr,
    pub physical_address: [u8; MAX_ADAPTER_ADDRESS_LENGTH],
    pub physical_address_length: u32,
    pub flags: u32,
    pub mtu: u32,
    pub if_type: u32,
    pub oper_status: u32,
    pub ipv6_if_index: u32,
    pub zone_indices: [u32; 16],
    pub first_prefix: Ptr,
    pub transmit_link_speed: u64,
    pub receive_link_speed: u64,
    pub first_wins_server_address: Ptr,
    pub first_gateway_address: Ptr,
    pub ipv4_metric: u32,
    pub ipv6_metric: u32,
    pub luid: u64,
    pub dhcpv4_server: SocketAddress,
    pub compartment_id: u32,
    pub network_guid: Guid,
    pub connection_type: u32,
    pub tunnel_type: u32,
    #[cfg(target_pointer_width = "64")]
    pub _pad0: u32,
    pub dhcpv6_server: SocketAddress,
    pub dhcpv6_client_duid: [u8; MAX_DHCPV6_DUID_LENGTH],
    pub _pad1: [u8; 2],
    pub dhcpv6_client_duid_length: u32,
    pub dhcpv6_iaid: u32,
    #[cfg(target_pointer_width = "64")]
    pub _pad2: u32,
    pub first_dns_suffix: Ptr,
    #[cfg(target_pointer_width = "32")]
    pub _pad3: u32,
}

/// Unicast address entry (`IP_ADAPTER_UNICAST_ADDRESS_LH`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IpAdapterUnicastAddress {
    pub length: u32,
    pub flags: u32,
    pub next: Ptr,
    pub address: SocketAddress,
    pub prefix_origin: u32,
    pub suffix_origin: u32,
    pub dad_state: u32,
    pub valid_lifetime: u32,
    pub preferred_lifetime: u32,
    pub lease_lifetime: u32,
    pub on_link_prefix_length: u8,
    #[cfg(target_pointer_width = "64")]
    pub _pad: [u8; 7],
    #[cfg(target_pointer_width = "32")]
    pub _pad: [u8; 3],
}

/// Pre-Vista unicast address entry (`IP_ADAPTER_UNICAST_ADDRESS_XP`).
///
/// Identical to the current record up to the lease lifetime; it has no
/// on-link prefix length.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IpAdapterUnicastAddressXp {
    pub length: u32,
    pub flags: u32,
    pub next: Ptr,
    pub address: SocketAddress,
    pub prefix_origin: u32,
    pub suffix_origin: u32,
    pub dad_state: u32,
    pub valid_lifetime: u32,
    pub preferred_lifetime: u32,
    pub lease_lifetime: u32,
    #[cfg(target_pointer_width = "32")]
    pub _pad: u32,
}

/// Address entry shared by the anycast, multicast, DNS server, WINS server
/// and gateway chains (`IP_ADAPTER_ANYCAST_ADDRESS_XP` and friends).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IpAdapterAddressEntry {
    pub length: u32,
    pub flags: u32,
    pub next: Ptr,
    pub address: SocketAddress,
    #[cfg(target_pointer_width = "32")]
    pub _pad: u32,
}

/// On-link prefix entry (`IP_ADAPTER_PREFIX_XP`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IpAdapterPrefix {
    pub length: u32,
    pub flags: u32,
    pub next: Ptr,
    pub address: SocketAddress,
    pub prefix_length: u32,
    #[cfg(target_pointer_width = "64")]
    pub _pad: u32,
}

/// DNS suffix entry (`IP_ADAPTER_DNS_SUFFIX`).
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IpAdapterDnsSuffix {
    pub next: Ptr,
    pub string: [u16; MAX_DNS_SUFFIX_STRING_LENGTH],
}

/// IPv4 socket address (`SOCKADDR_IN`). Port is in network byte order.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct SockaddrIn {
    pub family: u16,
    pub port: [u8; 2],
    pub addr: [u8; 4],
    pub zero: [u8; 8],
}

/// IPv6 socket address (`SOCKADDR_IN6`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct SockaddrIn6 {
    pub family: u16,
    pub port: [u8; 2],
    pub flowinfo: u32,
    pub addr: [u8; 16],
    pub scope_id: u32,
}

/// Family tag every socket address starts with.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct SockaddrHeader {
    pub family: u16,
}
