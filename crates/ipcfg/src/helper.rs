//! The host's IP helper service, as seen by this crate.
//!
//! [`IpHelper`] is the boundary to the operating system: adapter enumeration
//! into a caller-supplied buffer plus get/create/delete of single unicast
//! address and route rows. Everything above it (decoding, reconciliation,
//! dispatch) is host-independent.

use std::net::IpAddr;

use serde::Serialize;

use crate::error::Result;
use crate::net::IpNet;
use crate::record::AdapterBuffer;
use crate::route::RouteData;
use crate::types::{AddressFamily, DadState, Guid, Luid, PrefixOrigin, RouteOrigin, RouteProtocol, SuffixOrigin};

/// `GAA_FLAG_*` values accepted by adapter enumeration.
pub mod gaa_flags {
    pub const SKIP_UNICAST: u32 = 0x0001;
    pub const SKIP_ANYCAST: u32 = 0x0002;
    pub const SKIP_MULTICAST: u32 = 0x0004;
    pub const SKIP_DNS_SERVER: u32 = 0x0008;
    pub const INCLUDE_PREFIX: u32 = 0x0010;
    pub const SKIP_FRIENDLY_NAME: u32 = 0x0020;
    pub const INCLUDE_WINS_INFO: u32 = 0x0040;
    pub const INCLUDE_GATEWAYS: u32 = 0x0080;
    pub const INCLUDE_ALL_INTERFACES: u32 = 0x0100;
    pub const INCLUDE_ALL_COMPARTMENTS: u32 = 0x0200;
    pub const INCLUDE_TUNNEL_BINDINGORDER: u32 = 0x0400;
    pub const SKIP_DNS_INFO: u32 = 0x0800;
}

/// Which parts of each adapter enumeration should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterFlags {
    pub skip_unicast: bool,
    pub skip_anycast: bool,
    pub skip_multicast: bool,
    pub skip_dns_server: bool,
    pub include_prefix: bool,
    pub skip_friendly_name: bool,
    pub include_wins_info: bool,
    pub include_gateways: bool,
    pub include_all_interfaces: bool,
    pub include_all_compartments: bool,
    pub include_tunnel_binding_order: bool,
    pub skip_dns_info: bool,
}

impl Default for AdapterFlags {
    /// Prefixes, gateways, WINS servers and disconnected interfaces included.
    fn default() -> Self {
        Self {
            skip_unicast: false,
            skip_anycast: false,
            skip_multicast: false,
            skip_dns_server: false,
            include_prefix: true,
            skip_friendly_name: false,
            include_wins_info: true,
            include_gateways: true,
            include_all_interfaces: true,
            include_all_compartments: false,
            include_tunnel_binding_order: false,
            skip_dns_info: false,
        }
    }
}

impl AdapterFlags {
    /// Create flags from a raw `GAA_FLAG_*` mask.
    pub fn from_raw(flags: u32) -> Self {
        Self {
            skip_unicast: flags & gaa_flags::SKIP_UNICAST != 0,
            skip_anycast: flags & gaa_flags::SKIP_ANYCAST != 0,
            skip_multicast: flags & gaa_flags::SKIP_MULTICAST != 0,
            skip_dns_server: flags & gaa_flags::SKIP_DNS_SERVER != 0,
            include_prefix: flags & gaa_flags::INCLUDE_PREFIX != 0,
            skip_friendly_name: flags & gaa_flags::SKIP_FRIENDLY_NAME != 0,
            include_wins_info: flags & gaa_flags::INCLUDE_WINS_INFO != 0,
            include_gateways: flags & gaa_flags::INCLUDE_GATEWAYS != 0,
            include_all_interfaces: flags & gaa_flags::INCLUDE_ALL_INTERFACES != 0,
            include_all_compartments: flags & gaa_flags::INCLUDE_ALL_COMPARTMENTS != 0,
            include_tunnel_binding_order: flags & gaa_flags::INCLUDE_TUNNEL_BINDINGORDER != 0,
            skip_dns_info: flags & gaa_flags::SKIP_DNS_INFO != 0,
        }
    }

    /// Convert to the raw `GAA_FLAG_*` mask.
    pub fn to_raw(self) -> u32 {
        [
            (self.skip_unicast, gaa_flags::SKIP_UNICAST),
            (self.skip_anycast, gaa_flags::SKIP_ANYCAST),
            (self.skip_multicast, gaa_flags::SKIP_MULTICAST),
            (self.skip_dns_server, gaa_flags::SKIP_DNS_SERVER),
            (self.include_prefix, gaa_flags::INCLUDE_PREFIX),
            (self.skip_friendly_name, gaa_flags::SKIP_FRIENDLY_NAME),
            (self.include_wins_info, gaa_flags::INCLUDE_WINS_INFO),
            (self.include_gateways, gaa_flags::INCLUDE_GATEWAYS),
            (self.include_all_interfaces, gaa_flags::INCLUDE_ALL_INTERFACES),
            (self.include_all_compartments, gaa_flags::INCLUDE_ALL_COMPARTMENTS),
            (self.include_tunnel_binding_order, gaa_flags::INCLUDE_TUNNEL_BINDINGORDER),
            (self.skip_dns_info, gaa_flags::SKIP_DNS_INFO),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .fold(0, |acc, (_, bit)| acc | bit)
    }
}

/// Options for adapter enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumerateOptions {
    pub family: AddressFamily,
    pub flags: AdapterFlags,
}

impl EnumerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one address family.
    pub fn family(mut self, family: AddressFamily) -> Self {
        self.family = family;
        self
    }

    /// Replace all flags.
    pub fn flags(mut self, flags: AdapterFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn skip_unicast(mut self, skip: bool) -> Self {
        self.flags.skip_unicast = skip;
        self
    }

    pub fn skip_multicast(mut self, skip: bool) -> Self {
        self.flags.skip_multicast = skip;
        self
    }

    pub fn skip_anycast(mut self, skip: bool) -> Self {
        self.flags.skip_anycast = skip;
        self
    }

    pub fn skip_dns_server(mut self, skip: bool) -> Self {
        self.flags.skip_dns_server = skip;
        self
    }

    pub fn skip_friendly_name(mut self, skip: bool) -> Self {
        self.flags.skip_friendly_name = skip;
        self
    }

    pub fn include_prefix(mut self, include: bool) -> Self {
        self.flags.include_prefix = include;
        self
    }

    pub fn include_gateways(mut self, include: bool) -> Self {
        self.flags.include_gateways = include;
        self
    }

    pub fn include_all_compartments(mut self, include: bool) -> Self {
        self.flags.include_all_compartments = include;
        self
    }
}

/// Outcome of one enumeration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// The buffer now holds the adapter chain.
    Complete,
    /// The buffer is too small; `required` bytes are needed.
    Overflow { required: usize },
    /// There are no adapters matching the request.
    NoData,
}

/// A unicast address row (`MIB_UNICASTIPADDRESS_ROW`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnicastRow {
    pub interface_luid: Luid,
    pub interface_index: u32,
    pub address: IpAddr,
    pub on_link_prefix_length: u8,
    pub prefix_origin: PrefixOrigin,
    pub suffix_origin: SuffixOrigin,
    pub valid_lifetime: u32,
    pub preferred_lifetime: u32,
    pub dad_state: DadState,
    pub skip_as_source: bool,
}

impl UnicastRow {
    /// Lifetime value meaning "never expires".
    pub const INFINITE: u32 = u32::MAX;

    /// A manually configured, non-expiring address on the given interface.
    pub fn new(luid: Luid, net: IpNet) -> Self {
        Self {
            interface_luid: luid,
            interface_index: 0,
            address: net.addr(),
            on_link_prefix_length: net.prefix_len(),
            prefix_origin: PrefixOrigin::Manual,
            suffix_origin: SuffixOrigin::Manual,
            valid_lifetime: Self::INFINITE,
            preferred_lifetime: Self::INFINITE,
            dad_state: DadState::Preferred,
            skip_as_source: false,
        }
    }

    pub fn ip_net(&self) -> IpNet {
        IpNet::new_clamped(self.address, self.on_link_prefix_length)
    }
}

/// A route row (`MIB_IPFORWARD_ROW2`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRow {
    pub interface_luid: Luid,
    pub interface_index: u32,
    pub destination: IpNet,
    /// Unspecified (`0.0.0.0` or `::`) for on-link routes.
    pub next_hop: IpAddr,
    pub site_prefix_length: u8,
    pub valid_lifetime: u32,
    pub preferred_lifetime: u32,
    pub metric: u32,
    pub protocol: RouteProtocol,
    pub loopback: bool,
    pub autoconfigure: bool,
    pub publish: bool,
    pub immortal: bool,
    pub age: u32,
    pub origin: RouteOrigin,
}

impl RouteRow {
    /// A static, non-expiring route on the given interface.
    pub fn new(luid: Luid, destination: IpNet, next_hop: IpAddr, metric: u32) -> Self {
        Self {
            interface_luid: luid,
            interface_index: 0,
            destination,
            next_hop,
            site_prefix_length: 0,
            valid_lifetime: UnicastRow::INFINITE,
            preferred_lifetime: UnicastRow::INFINITE,
            metric,
            protocol: RouteProtocol::NetMgmt,
            loopback: false,
            autoconfigure: false,
            publish: false,
            immortal: false,
            age: 0,
            origin: RouteOrigin::Manual,
        }
    }

    /// The reconciliation view of this row.
    pub fn to_route_data(&self) -> RouteData {
        RouteData::new(self.destination, self.next_hop, self.metric)
    }
}

/// The host's IP helper API.
///
/// Every call is blocking and has no timeout. Implementations perform no
/// locking of their own beyond what the host does; concurrent mutation of the
/// same interface is the caller's concern.
pub trait IpHelper {
    /// Fill `buf` with the adapter chain for `family`, filtered by `flags`.
    fn adapter_addresses(&self, family: AddressFamily, flags: u32, buf: &mut AdapterBuffer) -> Result<Fill>;

    /// All unicast address rows of a family, across interfaces.
    fn unicast_addresses(&self, family: AddressFamily) -> Result<Vec<UnicastRow>>;

    /// The unicast address row for `address` on an interface.
    fn unicast_address(&self, luid: Luid, address: IpAddr) -> Result<UnicastRow>;

    fn create_unicast_address(&self, row: &UnicastRow) -> Result<()>;

    fn delete_unicast_address(&self, row: &UnicastRow) -> Result<()>;

    /// All route rows of a family, across interfaces.
    fn routes(&self, family: AddressFamily) -> Result<Vec<RouteRow>>;

    /// The route row matching destination and next hop on an interface.
    fn route(&self, luid: Luid, destination: IpNet, next_hop: IpAddr) -> Result<RouteRow>;

    fn create_route(&self, row: &RouteRow) -> Result<()>;

    fn delete_route(&self, row: &RouteRow) -> Result<()>;

    /// Map an interface GUID to its LUID.
    fn luid_from_guid(&self, guid: &Guid) -> Result<Luid>;
}

impl<T: IpHelper + ?Sized> IpHelper for &T {
    fn adapter_addresses(&self, family: AddressFamily, flags: u32, buf: &mut AdapterBuffer) -> Result<Fill> {
        (**self).adapter_addresses(family, flags, buf)
    }

    fn unicast_addresses(&self, family: AddressFamily) -> Result<Vec<UnicastRow>> {
        (**self).unicast_addresses(family)
    }

    fn unicast_address(&self, luid: Luid, address: IpAddr) -> Result<UnicastRow> {
        (**self).unicast_address(luid, address)
    }

    fn create_unicast_address(&self, row: &UnicastRow) -> Result<()> {
        (**self).create_unicast_address(row)
    }

    fn delete_unicast_address(&self, row: &UnicastRow) -> Result<()> {
        (**self).delete_unicast_address(row)
    }

    fn routes(&self, family: AddressFamily) -> Result<Vec<RouteRow>> {
        (**self).routes(family)
    }

    fn route(&self, luid: Luid, destination: IpNet, next_hop: IpAddr) -> Result<RouteRow> {
        (**self).route(luid, destination, next_hop)
    }

    fn create_route(&self, row: &RouteRow) -> Result<()> {
        (**self).create_route(row)
    }

    fn delete_route(&self, row: &RouteRow) -> Result<()> {
        (**self).delete_route(row)
    }

    fn luid_from_guid(&self, guid: &Guid) -> Result<Luid> {
        (**self).luid_from_guid(guid)
    }
}
