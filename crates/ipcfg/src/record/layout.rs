//! Structural self-test of the record mirrors.
//!
//! Every field offset and record size the host declares for this target is
//! compared with the compiled mirror struct. A mismatch means the mirrors are
//! wrong for this build and nothing can be decoded safely.

use std::mem::{offset_of, size_of};
use std::sync::OnceLock;

use super::raw::{
    IpAdapterAddressEntry, IpAdapterAddresses, IpAdapterDnsSuffix, IpAdapterPrefix,
    IpAdapterUnicastAddress, IpAdapterUnicastAddressXp, SockaddrIn, SockaddrIn6, SocketAddress,
};
use crate::error::{Error, Result};
use crate::types::Guid;

/// Field name used for whole-record size checks.
pub const SIZE: &str = "size";

const ADAPTER: &str = "IP_ADAPTER_ADDRESSES_LH";
const UNICAST: &str = "IP_ADAPTER_UNICAST_ADDRESS_LH";
const UNICAST_XP: &str = "IP_ADAPTER_UNICAST_ADDRESS_XP";
const ENTRY: &str = "IP_ADAPTER_ANYCAST_ADDRESS_XP";
const PREFIX: &str = "IP_ADAPTER_PREFIX_XP";
const DNS_SUFFIX: &str = "IP_ADAPTER_DNS_SUFFIX";
const SOCKET_ADDRESS: &str = "SOCKET_ADDRESS";
const SOCKADDR_IN: &str = "SOCKADDR_IN";
const SOCKADDR_IN6: &str = "SOCKADDR_IN6";
const GUID: &str = "GUID";

#[cfg(target_pointer_width = "64")]
mod declared {
    pub const ADAPTER_SIZE: usize = 448;
    pub const ADAPTER_LENGTH: usize = 0;
    pub const ADAPTER_IF_INDEX: usize = 4;
    pub const ADAPTER_NEXT: usize = 8;
    pub const ADAPTER_ADAPTER_NAME: usize = 16;
    pub const ADAPTER_FIRST_UNICAST_ADDRESS: usize = 24;
    pub const ADAPTER_FIRST_ANYCAST_ADDRESS: usize = 32;
    pub const ADAPTER_FIRST_MULTICAST_ADDRESS: usize = 40;
    pub const ADAPTER_FIRST_DNS_SERVER_ADDRESS: usize = 48;
    pub const ADAPTER_DNS_SUFFIX: usize = 56;
    pub const ADAPTER_DESCRIPTION: usize = 64;
    pub const ADAPTER_FRIENDLY_NAME: usize = 72;
    pub const ADAPTER_PHYSICAL_ADDRESS: usize = 80;
    pub const ADAPTER_PHYSICAL_ADDRESS_LENGTH: usize = 88;
    pub const ADAPTER_FLAGS: usize = 92;
    pub const ADAPTER_MTU: usize = 96;
    pub const ADAPTER_IF_TYPE: usize = 100;
    pub const ADAPTER_OPER_STATUS: usize = 104;
    pub const ADAPTER_IPV6_IF_INDEX: usize = 108;
    pub const ADAPTER_ZONE_INDICES: usize = 112;
    pub const ADAPTER_FIRST_PREFIX: usize = 176;
    pub const ADAPTER_TRANSMIT_LINK_SPEED: usize = 184;
    pub const ADAPTER_RECEIVE_LINK_SPEED: usize = 192;
    pub const ADAPTER_FIRST_WINS_SERVER_ADDRESS: usize = 200;
    pub const ADAPTER_FIRST_GATEWAY_ADDRESS: usize = 208;
    pub const ADAPTER_IPV4_METRIC: usize = 216;
    pub const ADAPTER_IPV6_METRIC: usize = 220;
    pub const ADAPTER_LUID: usize = 224;
    pub const ADAPTER_DHCPV4_SERVER: usize = 232;
    pub const ADAPTER_COMPARTMENT_ID: usize = 248;
    pub const ADAPTER_NETWORK_GUID: usize = 252;
    pub const ADAPTER_CONNECTION_TYPE: usize = 268;
    pub const ADAPTER_TUNNEL_TYPE: usize = 272;
    pub const ADAPTER_DHCPV6_SERVER: usize = 280;
    pub const ADAPTER_DHCPV6_CLIENT_DUID: usize = 296;
    pub const ADAPTER_DHCPV6_CLIENT_DUID_LENGTH: usize = 428;
    pub const ADAPTER_DHCPV6_IAID: usize = 432;
    pub const ADAPTER_FIRST_DNS_SUFFIX: usize = 440;

    pub const UNICAST_SIZE: usize = 64;
    pub const UNICAST_LENGTH: usize = 0;
    pub const UNICAST_FLAGS: usize = 4;
    pub const UNICAST_NEXT: usize = 8;
    pub const UNICAST_ADDRESS: usize = 16;
    pub const UNICAST_PREFIX_ORIGIN: usize = 32;
    pub const UNICAST_SUFFIX_ORIGIN: usize = 36;
    pub const UNICAST_DAD_STATE: usize = 40;
    pub const UNICAST_VALID_LIFETIME: usize = 44;
    pub const UNICAST_PREFERRED_LIFETIME: usize = 48;
    pub const UNICAST_LEASE_LIFETIME: usize = 52;
    pub const UNICAST_ON_LINK_PREFIX_LENGTH: usize = 56;

    pub const UNICAST_XP_SIZE: usize = 56;

    pub const ENTRY_SIZE: usize = 32;
    pub const ENTRY_NEXT: usize = 8;
    pub const ENTRY_ADDRESS: usize = 16;

    pub const PREFIX_SIZE: usize = 40;
    pub const PREFIX_NEXT: usize = 8;
    pub const PREFIX_ADDRESS: usize = 16;
    pub const PREFIX_PREFIX_LENGTH: usize = 32;

    pub const DNS_SUFFIX_SIZE: usize = 520;
    pub const DNS_SUFFIX_NEXT: usize = 0;
    pub const DNS_SUFFIX_STRING: usize = 8;

    pub const SOCKET_ADDRESS_SIZE: usize = 16;
    pub const SOCKET_ADDRESS_SOCKADDR: usize = 0;
    pub const SOCKET_ADDRESS_LENGTH: usize = 8;
}

#[cfg(target_pointer_width = "32")]
mod declared {
    pub const ADAPTER_SIZE: usize = 376;
    pub const ADAPTER_LENGTH: usize = 0;
    pub const ADAPTER_IF_INDEX: usize = 4;
    pub const ADAPTER_NEXT: usize = 8;
    pub const ADAPTER_ADAPTER_NAME: usize = 12;
    pub const ADAPTER_FIRST_UNICAST_ADDRESS: usize = 16;
    pub const ADAPTER_FIRST_ANYCAST_ADDRESS: usize = 20;
    pub const ADAPTER_FIRST_MULTICAST_ADDRESS: usize = 24;
    pub const ADAPTER_FIRST_DNS_SERVER_ADDRESS: usize = 28;
    pub const ADAPTER_DNS_SUFFIX: usize = 32;
    pub const ADAPTER_DESCRIPTION: usize = 36;
    pub const ADAPTER_FRIENDLY_NAME: usize = 40;
    pub const ADAPTER_PHYSICAL_ADDRESS: usize = 44;
    pub const ADAPTER_PHYSICAL_ADDRESS_LENGTH: usize = 52;
    pub const ADAPTER_FLAGS: usize = 56;
    pub const ADAPTER_MTU: usize = 60;
    pub const ADAPTER_IF_TYPE: usize = 64;
    pub const ADAPTER_OPER_STATUS: usize = 68;
    pub const ADAPTER_IPV6_IF_INDEX: usize = 72;
    pub const ADAPTER_ZONE_INDICES: usize = 76;
    pub const ADAPTER_FIRST_PREFIX: usize = 140;
    pub const ADAPTER_TRANSMIT_LINK_SPEED: usize = 144;
    pub const ADAPTER_RECEIVE_LINK_SPEED: usize = 152;
    pub const ADAPTER_FIRST_WINS_SERVER_ADDRESS: usize = 160;
    pub const ADAPTER_FIRST_GATEWAY_ADDRESS: usize = 164;
    pub const ADAPTER_IPV4_METRIC: usize = 168;
    pub const ADAPTER_IPV6_METRIC: usize = 172;
    pub const ADAPTER_LUID: usize = 176;
    pub const ADAPTER_DHCPV4_SERVER: usize = 184;
    pub const ADAPTER_COMPARTMENT_ID: usize = 192;
    pub const ADAPTER_NETWORK_GUID: usize = 196;
    pub const ADAPTER_CONNECTION_TYPE: usize = 212;
    pub const ADAPTER_TUNNEL_TYPE: usize = 216;
    pub const ADAPTER_DHCPV6_SERVER: usize = 220;
    pub const ADAPTER_DHCPV6_CLIENT_DUID: usize = 228;
    pub const ADAPTER_DHCPV6_CLIENT_DUID_LENGTH: usize = 360;
    pub const ADAPTER_DHCPV6_IAID: usize = 364;
    pub const ADAPTER_FIRST_DNS_SUFFIX: usize = 368;

    pub const UNICAST_SIZE: usize = 48;
    pub const UNICAST_LENGTH: usize = 0;
    pub const UNICAST_FLAGS: usize = 4;
    pub const UNICAST_NEXT: usize = 8;
    pub const UNICAST_ADDRESS: usize = 12;
    pub const UNICAST_PREFIX_ORIGIN: usize = 20;
    pub const UNICAST_SUFFIX_ORIGIN: usize = 24;
    pub const UNICAST_DAD_STATE: usize = 28;
    pub const UNICAST_VALID_LIFETIME: usize = 32;
    pub const UNICAST_PREFERRED_LIFETIME: usize = 36;
    pub const UNICAST_LEASE_LIFETIME: usize = 40;
    pub const UNICAST_ON_LINK_PREFIX_LENGTH: usize = 44;

    pub const UNICAST_XP_SIZE: usize = 48;

    pub const ENTRY_SIZE: usize = 24;
    pub const ENTRY_NEXT: usize = 8;
    pub const ENTRY_ADDRESS: usize = 12;

    pub const PREFIX_SIZE: usize = 24;
    pub const PREFIX_NEXT: usize = 8;
    pub const PREFIX_ADDRESS: usize = 12;
    pub const PREFIX_PREFIX_LENGTH: usize = 20;

    pub const DNS_SUFFIX_SIZE: usize = 516;
    pub const DNS_SUFFIX_NEXT: usize = 0;
    pub const DNS_SUFFIX_STRING: usize = 4;

    pub const SOCKET_ADDRESS_SIZE: usize = 8;
    pub const SOCKET_ADDRESS_SOCKADDR: usize = 0;
    pub const SOCKET_ADDRESS_LENGTH: usize = 4;
}

/// Declared size of the current unicast record.
pub const UNICAST_RECORD_SIZE: usize = declared::UNICAST_SIZE;

/// Declared size of the pre-Vista unicast record. Equal to
/// [`UNICAST_RECORD_SIZE`] on 32-bit targets, where alignment pads both
/// generations to 48 bytes.
pub const LEGACY_UNICAST_RECORD_SIZE: usize = declared::UNICAST_XP_SIZE;

/// One declared offset or size paired with the compiled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutCheck {
    pub record: &'static str,
    pub field: &'static str,
    pub declared: usize,
    pub compiled: usize,
}

impl LayoutCheck {
    const fn new(record: &'static str, field: &'static str, declared: usize, compiled: usize) -> Self {
        Self {
            record,
            field,
            declared,
            compiled,
        }
    }

    /// Check whether the compiled value matches the declaration.
    pub fn is_ok(&self) -> bool {
        self.declared == self.compiled
    }

    fn into_error(self) -> Error {
        Error::Layout {
            record: self.record,
            field: self.field,
            expected: self.declared,
            actual: self.compiled,
        }
    }
}

/// Every offset and size check for this target, covering all record types.
pub fn checks() -> Vec<LayoutCheck> {
    use declared::*;

    #[cfg_attr(not(windows), allow(unused_mut))]
    let mut checks = vec![
        LayoutCheck::new(ADAPTER, SIZE, ADAPTER_SIZE, size_of::<IpAdapterAddresses>()),
        LayoutCheck::new(ADAPTER, "Length", ADAPTER_LENGTH, offset_of!(IpAdapterAddresses, length)),
        LayoutCheck::new(ADAPTER, "IfIndex", ADAPTER_IF_INDEX, offset_of!(IpAdapterAddresses, if_index)),
        LayoutCheck::new(ADAPTER, "Next", ADAPTER_NEXT, offset_of!(IpAdapterAddresses, next)),
        LayoutCheck::new(
            ADAPTER,
            "AdapterName",
            ADAPTER_ADAPTER_NAME,
            offset_of!(IpAdapterAddresses, adapter_name),
        ),
        LayoutCheck::new(
            ADAPTER,
            "FirstUnicastAddress",
            ADAPTER_FIRST_UNICAST_ADDRESS,
            offset_of!(IpAdapterAddresses, first_unicast_address),
        ),
        LayoutCheck::new(
            ADAPTER,
            "FirstAnycastAddress",
            ADAPTER_FIRST_ANYCAST_ADDRESS,
            offset_of!(IpAdapterAddresses, first_anycast_address),
        ),
        LayoutCheck::new(
            ADAPTER,
            "FirstMulticastAddress",
            ADAPTER_FIRST_MULTICAST_ADDRESS,
            offset_of!(IpAdapterAddresses, first_multicast_address),
        ),
        LayoutCheck::new(
            ADAPTER,
            "FirstDnsServerAddress",
            ADAPTER_FIRST_DNS_SERVER_ADDRESS,
            offset_of!(IpAdapterAddresses, first_dns_server_address),
        ),
        LayoutCheck::new(ADAPTER, "DnsSuffix", ADAPTER_DNS_SUFFIX, offset_of!(IpAdapterAddresses, dns_suffix)),
        LayoutCheck::new(
            ADAPTER,
            "Description",
            ADAPTER_DESCRIPTION,
            offset_of!(IpAdapterAddresses, description),
        ),
        LayoutCheck::new(
            ADAPTER,
            "FriendlyName",
            ADAPTER_FRIENDLY_NAME,
            offset_of!(IpAdapterAddresses, friendly_name),
        ),
        LayoutCheck::new(
            ADAPTER,
            "PhysicalAddress",
            ADAPTER_PHYSICAL_ADDRESS,
            offset_of!(IpAdapterAddresses, physical_address),
        ),
        LayoutCheck::new(
            ADAPTER,
            "PhysicalAddressLength",
            ADAPTER_PHYSICAL_ADDRESS_LENGTH,
            offset_of!(IpAdapterAddresses, physical_address_length),
        ),
        LayoutCheck::new(ADAPTER, "Flags", ADAPTER_FLAGS, offset_of!(IpAdapterAddresses, flags)),
        LayoutCheck::new(ADAPTER, "Mtu", ADAPTER_MTU, offset_of!(IpAdapterAddresses, mtu)),
        LayoutCheck::new(ADAPTER, "IfType", ADAPTER_IF_TYPE, offset_of!(IpAdapterAddresses, if_type)),
        LayoutCheck::new(
            ADAPTER,
            "OperStatus",
            ADAPTER_OPER_STATUS,
            offset_of!(IpAdapterAddresses, oper_status),
        ),
        LayoutCheck::new(
            ADAPTER,
            "Ipv6IfIndex",
            ADAPTER_IPV6_IF_INDEX,
            offset_of!(IpAdapterAddresses, ipv6_if_index),
        ),
        LayoutCheck::new(
            ADAPTER,
            "ZoneIndices",
            ADAPTER_ZONE_INDICES,
            offset_of!(IpAdapterAddresses, zone_indices),
        ),
        LayoutCheck::new(
            ADAPTER,
            "FirstPrefix",
            ADAPTER_FIRST_PREFIX,
            offset_of!(IpAdapterAddresses, first_prefix),
        ),
        LayoutCheck::new(
            ADAPTER,
            "TransmitLinkSpeed",
            ADAPTER_TRANSMIT_LINK_SPEED,
            offset_of!(IpAdapterAddresses, transmit_link_speed),
        ),
        LayoutCheck::new(
            ADAPTER,
            "ReceiveLinkSpeed",
            ADAPTER_RECEIVE_LINK_SPEED,
            offset_of!(IpAdapterAddresses, receive_link_speed),
        ),
        LayoutCheck::new(
            ADAPTER,
            "FirstWinsServerAddress",
            ADAPTER_FIRST_WINS_SERVER_ADDRESS,
            offset_of!(IpAdapterAddresses, first_wins_server_address),
        ),
        LayoutCheck::new(
            ADAPTER,
            "FirstGatewayAddress",
            ADAPTER_FIRST_GATEWAY_ADDRESS,
            offset_of!(IpAdapterAddresses, first_gateway_address),
        ),
        LayoutCheck::new(
            ADAPTER,
            "Ipv4Metric",
            ADAPTER_IPV4_METRIC,
            offset_of!(IpAdapterAddresses, ipv4_metric),
        ),
        LayoutCheck::new(
            ADAPTER,
            "Ipv6Metric",
            ADAPTER_IPV6_METRIC,
            offset_of!(IpAdapterAddresses, ipv6_metric),
        ),
        LayoutCheck::new(ADAPTER, "Luid", ADAPTER_LUID, offset_of!(IpAdapterAddresses, luid)),
        LayoutCheck::new(
            ADAPTER,
            "Dhcpv4Server",
            ADAPTER_DHCPV4_SERVER,
            offset_of!(IpAdapterAddresses, dhcpv4_server),
        ),
        LayoutCheck::new(
            ADAPTER,
            "CompartmentId",
            ADAPTER_COMPARTMENT_ID,
            offset_of!(IpAdapterAddresses, compartment_id),
        ),
        LayoutCheck::new(
            ADAPTER,
            "NetworkGuid",
            ADAPTER_NETWORK_GUID,
            offset_of!(IpAdapterAddresses, network_guid),
        ),
        LayoutCheck::new(
            ADAPTER,
            "ConnectionType",
            ADAPTER_CONNECTION_TYPE,
            offset_of!(IpAdapterAddresses, connection_type),
        ),
        LayoutCheck::new(
            ADAPTER,
            "TunnelType",
            ADAPTER_TUNNEL_TYPE,
            offset_of!(IpAdapterAddresses, tunnel_type),
        ),
        LayoutCheck::new(
            ADAPTER,
            "Dhcpv6Server",
            ADAPTER_DHCPV6_SERVER,
            offset_of!(IpAdapterAddresses, dhcpv6_server),
        ),
        LayoutCheck::new(
            ADAPTER,
            "Dhcpv6ClientDuid",
            ADAPTER_DHCPV6_CLIENT_DUID,
            offset_of!(IpAdapterAddresses, dhcpv6_client_duid),
        ),
        LayoutCheck::new(
            ADAPTER,
            "Dhcpv6ClientDuidLength",
            ADAPTER_DHCPV6_CLIENT_DUID_LENGTH,
            offset_of!(IpAdapterAddresses, dhcpv6_client_duid_length),
        ),
        LayoutCheck::new(
            ADAPTER,
            "Dhcpv6Iaid",
            ADAPTER_DHCPV6_IAID,
            offset_of!(IpAdapterAddresses, dhcpv6_iaid),
        ),
        LayoutCheck::new(
            ADAPTER,
            "FirstDnsSuffix",
            ADAPTER_FIRST_DNS_SUFFIX,
            offset_of!(IpAdapterAddresses, first_dns_suffix),
        ),
        // Unicast
        LayoutCheck::new(UNICAST, SIZE, UNICAST_SIZE, size_of::<IpAdapterUnicastAddress>()),
        LayoutCheck::new(UNICAST, "Length", UNICAST_LENGTH, offset_of!(IpAdapterUnicastAddress, length)),
        LayoutCheck::new(UNICAST, "Flags", UNICAST_FLAGS, offset_of!(IpAdapterUnicastAddress, flags)),
        LayoutCheck::new(UNICAST, "Next", UNICAST_NEXT, offset_of!(IpAdapterUnicastAddress, next)),
        LayoutCheck::new(UNICAST, "Address", UNICAST_ADDRESS, offset_of!(IpAdapterUnicastAddress, address)),
        LayoutCheck::new(
            UNICAST,
            "PrefixOrigin",
            UNICAST_PREFIX_ORIGIN,
            offset_of!(IpAdapterUnicastAddress, prefix_origin),
        ),
        LayoutCheck::new(
            UNICAST,
            "SuffixOrigin",
            UNICAST_SUFFIX_ORIGIN,
            offset_of!(IpAdapterUnicastAddress, suffix_origin),
        ),
        LayoutCheck::new(UNICAST, "DadState", UNICAST_DAD_STATE, offset_of!(IpAdapterUnicastAddress, dad_state)),
        LayoutCheck::new(
            UNICAST,
            "ValidLifetime",
            UNICAST_VALID_LIFETIME,
            offset_of!(IpAdapterUnicastAddress, valid_lifetime),
        ),
        LayoutCheck::new(
            UNICAST,
            "PreferredLifetime",
            UNICAST_PREFERRED_LIFETIME,
            offset_of!(IpAdapterUnicastAddress, preferred_lifetime),
        ),
        LayoutCheck::new(
            UNICAST,
            "LeaseLifetime",
            UNICAST_LEASE_LIFETIME,
            offset_of!(IpAdapterUnicastAddress, lease_lifetime),
        ),
        LayoutCheck::new(
            UNICAST,
            "OnLinkPrefixLength",
            UNICAST_ON_LINK_PREFIX_LENGTH,
            offset_of!(IpAdapterUnicastAddress, on_link_prefix_length),
        ),
        // Legacy unicast shares every offset up to the lease lifetime
        LayoutCheck::new(UNICAST_XP, SIZE, UNICAST_XP_SIZE, size_of::<IpAdapterUnicastAddressXp>()),
        LayoutCheck::new(UNICAST_XP, "Next", UNICAST_NEXT, offset_of!(IpAdapterUnicastAddressXp, next)),
        LayoutCheck::new(
            UNICAST_XP,
            "Address",
            UNICAST_ADDRESS,
            offset_of!(IpAdapterUnicastAddressXp, address),
        ),
        LayoutCheck::new(
            UNICAST_XP,
            "LeaseLifetime",
            UNICAST_LEASE_LIFETIME,
            offset_of!(IpAdapterUnicastAddressXp, lease_lifetime),
        ),
        // Anycast, multicast, DNS server, WINS server, gateway
        LayoutCheck::new(ENTRY, SIZE, ENTRY_SIZE, size_of::<IpAdapterAddressEntry>()),
        LayoutCheck::new(ENTRY, "Next", ENTRY_NEXT, offset_of!(IpAdapterAddressEntry, next)),
        LayoutCheck::new(ENTRY, "Address", ENTRY_ADDRESS, offset_of!(IpAdapterAddressEntry, address)),
        // Prefix
        LayoutCheck::new(PREFIX, SIZE, PREFIX_SIZE, size_of::<IpAdapterPrefix>()),
        LayoutCheck::new(PREFIX, "Next", PREFIX_NEXT, offset_of!(IpAdapterPrefix, next)),
        LayoutCheck::new(PREFIX, "Address", PREFIX_ADDRESS, offset_of!(IpAdapterPrefix, address)),
        LayoutCheck::new(
            PREFIX,
            "PrefixLength",
            PREFIX_PREFIX_LENGTH,
            offset_of!(IpAdapterPrefix, prefix_length),
        ),
        // DNS suffix
        LayoutCheck::new(DNS_SUFFIX, SIZE, DNS_SUFFIX_SIZE, size_of::<IpAdapterDnsSuffix>()),
        LayoutCheck::new(DNS_SUFFIX, "Next", DNS_SUFFIX_NEXT, offset_of!(IpAdapterDnsSuffix, next)),
        LayoutCheck::new(DNS_SUFFIX, "String", DNS_SUFFIX_STRING, offset_of!(IpAdapterDnsSuffix, string)),
        // Socket address slot
        LayoutCheck::new(SOCKET_ADDRESS, SIZE, SOCKET_ADDRESS_SIZE, size_of::<SocketAddress>()),
        LayoutCheck::new(
            SOCKET_ADDRESS,
            "lpSockaddr",
            SOCKET_ADDRESS_SOCKADDR,
            offset_of!(SocketAddress, sockaddr),
        ),
        LayoutCheck::new(
            SOCKET_ADDRESS,
            "iSockaddrLength",
            SOCKET_ADDRESS_LENGTH,
            offset_of!(SocketAddress, sockaddr_length),
        ),
        // Socket addresses do not depend on pointer width
        LayoutCheck::new(SOCKADDR_IN, SIZE, 16, size_of::<SockaddrIn>()),
        LayoutCheck::new(SOCKADDR_IN, "sin_addr", 4, offset_of!(SockaddrIn, addr)),
        LayoutCheck::new(SOCKADDR_IN6, SIZE, 28, size_of::<SockaddrIn6>()),
        LayoutCheck::new(SOCKADDR_IN6, "sin6_addr", 8, offset_of!(SockaddrIn6, addr)),
        LayoutCheck::new(SOCKADDR_IN6, "sin6_scope_id", 24, offset_of!(SockaddrIn6, scope_id)),
        LayoutCheck::new(GUID, SIZE, 16, size_of::<Guid>()),
    ];

    #[cfg(windows)]
    checks.extend(host_checks());

    checks
}

/// Sizes straight from the platform bindings, when building for Windows.
#[cfg(windows)]
fn host_checks() -> Vec<LayoutCheck> {
    use windows_sys::Win32::NetworkManagement::IpHelper::{
        IP_ADAPTER_ADDRESSES_LH, IP_ADAPTER_ANYCAST_ADDRESS_XP, IP_ADAPTER_DNS_SUFFIX,
        IP_ADAPTER_PREFIX_XP, IP_ADAPTER_UNICAST_ADDRESS_LH,
    };
    use windows_sys::Win32::Networking::WinSock::{SOCKADDR_IN, SOCKADDR_IN6, SOCKET_ADDRESS};

    vec![
        LayoutCheck::new(ADAPTER, SIZE, size_of::<IP_ADAPTER_ADDRESSES_LH>(), size_of::<IpAdapterAddresses>()),
        LayoutCheck::new(
            ADAPTER,
            "FirstDnsSuffix",
            offset_of!(IP_ADAPTER_ADDRESSES_LH, FirstDnsSuffix),
            offset_of!(IpAdapterAddresses, first_dns_suffix),
        ),
        LayoutCheck::new(
            ADAPTER,
            "Luid",
            offset_of!(IP_ADAPTER_ADDRESSES_LH, Luid),
            offset_of!(IpAdapterAddresses, luid),
        ),
        LayoutCheck::new(
            UNICAST,
            SIZE,
            size_of::<IP_ADAPTER_UNICAST_ADDRESS_LH>(),
            size_of::<IpAdapterUnicastAddress>(),
        ),
        LayoutCheck::new(
            UNICAST,
            "OnLinkPrefixLength",
            offset_of!(IP_ADAPTER_UNICAST_ADDRESS_LH, OnLinkPrefixLength),
            offset_of!(IpAdapterUnicastAddress, on_link_prefix_length),
        ),
        LayoutCheck::new(ENTRY, SIZE, size_of::<IP_ADAPTER_ANYCAST_ADDRESS_XP>(), size_of::<IpAdapterAddressEntry>()),
        LayoutCheck::new(PREFIX, SIZE, size_of::<IP_ADAPTER_PREFIX_XP>(), size_of::<IpAdapterPrefix>()),
        LayoutCheck::new(DNS_SUFFIX, SIZE, size_of::<IP_ADAPTER_DNS_SUFFIX>(), size_of::<IpAdapterDnsSuffix>()),
        LayoutCheck::new(SOCKET_ADDRESS, SIZE, size_of::<SOCKET_ADDRESS>(), size_of::<SocketAddress>()),
        LayoutCheck::new(SOCKADDR_IN, SIZE, size_of::<SOCKADDR_IN>(), size_of::<SockaddrIn>()),
        LayoutCheck::new(SOCKADDR_IN6, SIZE, size_of::<SOCKADDR_IN6>(), size_of::<SockaddrIn6>()),
    ]
}

/// Run every check, failing on the first mismatch.
pub fn verify() -> Result<()> {
    match checks().into_iter().find(|c| !c.is_ok()) {
        Some(bad) => Err(bad.into_error()),
        None => Ok(()),
    }
}

/// Run [`verify`] once per process and replay its outcome afterwards.
pub fn ensure_verified() -> Result<()> {
    static OUTCOME: OnceLock<Option<LayoutCheck>> = OnceLock::new();

    let outcome = OUTCOME.get_or_init(|| {
        let failed = checks().into_iter().find(|c| !c.is_ok());
        match &failed {
            Some(bad) => tracing::error!(
                record = bad.record,
                field = bad.field,
                declared = bad.declared,
                compiled = bad.compiled,
                "record layout mismatch"
            ),
            None => tracing::debug!("record layout verified"),
        }
        failed
    });

    match outcome {
        Some(bad) => Err(bad.into_error()),
        None => Ok(()),
    }
}
