//! An [`IpHelper`] backed by in-memory tables.

use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::encode::Encoder;
use crate::error::{Error, Result, status};
use crate::helper::{AdapterFlags, Fill, IpHelper, RouteRow, UnicastRow};
use crate::interface::Interface;
use crate::net::IpNet;
use crate::record::entry::{AdapterAddress, UnicastAddress};
use crate::record::AdapterBuffer;
use crate::route::RouteData;
use crate::types::{AddressFamily, Guid, Luid};

/// Calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Enumerate,
    ListAddresses,
    CreateAddress,
    DeleteAddress,
    ListRoutes,
    CreateRoute,
    DeleteRoute,
}

#[derive(Debug, Clone)]
struct Failure {
    op: Op,
    /// Address or route destination the failure applies to; `None` for all.
    target: Option<String>,
    code: u32,
}

#[derive(Debug, Default)]
struct State {
    interfaces: Vec<Interface>,
    unicast: Vec<UnicastRow>,
    routes: Vec<RouteRow>,
    failures: Vec<Failure>,
    calls: Vec<String>,
    encoder: Encoder,
    always_overflow: bool,
}

impl State {
    fn check(&self, op: Op, target: &str) -> Result<()> {
        let hit = self.failures.iter().find(|f| {
            f.op == op && f.target.as_deref().is_none_or(|t| t == target)
        });
        match hit {
            Some(f) => Err(Error::from_status(f.code)),
            None => Ok(()),
        }
    }

    fn has_interface(&self, luid: Luid) -> bool {
        self.interfaces.iter().any(|ifc| ifc.luid == luid)
    }

    /// Interfaces as enumeration reports them: unicast addresses follow the
    /// address table, collections are filtered by family and flags.
    fn snapshot(&self, family: AddressFamily, flags: AdapterFlags) -> Vec<Interface> {
        let keep = |addr: &IpAddr| family.matches(addr);
        let keep_entries = |list: &[AdapterAddress], include: bool| -> Vec<AdapterAddress> {
            if include {
                list.iter().filter(|a| keep(&a.address)).cloned().collect()
            } else {
                Vec::new()
            }
        };

        self.interfaces
            .iter()
            .map(|base| {
                let mut ifc = base.clone();
                ifc.unicast_addresses = if flags.skip_unicast {
                    Vec::new()
                } else {
                    self.unicast
                        .iter()
                        .filter(|row| row.interface_luid == ifc.luid && keep(&row.address))
                        .map(|row| UnicastAddress {
                            prefix_origin: row.prefix_origin,
                            suffix_origin: row.suffix_origin,
                            dad_state: row.dad_state,
                            valid_lifetime: row.valid_lifetime,
                            preferred_lifetime: row.preferred_lifetime,
                            ..UnicastAddress::manual(row.ip_net())
                        })
                        .collect()
                };
                ifc.unicast_ip_nets = ifc.unicast_addresses.iter().map(UnicastAddress::ip_net).collect();
                ifc.anycast_addresses = keep_entries(&base.anycast_addresses, !flags.skip_anycast);
                ifc.multicast_addresses = keep_entries(&base.multicast_addresses, !flags.skip_multicast);
                ifc.dns_server_addresses = keep_entries(&base.dns_server_addresses, !flags.skip_dns_server);
                ifc.gateway_addresses = keep_entries(&base.gateway_addresses, flags.include_gateways);
                ifc.wins_server_addresses = keep_entries(&base.wins_server_addresses, flags.include_wins_info);
                if !flags.include_prefix {
                    ifc.prefixes.clear();
                } else {
                    ifc.prefixes.retain(|p| keep(&p.address));
                }
                if flags.skip_friendly_name {
                    ifc.friendly_name.clear();
                }
                ifc
            })
            .collect()
    }
}

/// In-memory stand-in for the host's IP helper.
///
/// Enumeration serializes the configured interfaces into a real linked
/// record buffer, so it exercises the decoder end to end. Unicast address
/// and route rows live in tables that the create and delete calls modify.
///
/// # Example
///
/// ```ignore
/// use ipcfg::lab::{MemoryIpHelper, Op};
///
/// let helper = MemoryIpHelper::new().with_interface(ethernet);
/// helper.fail(Op::CreateRoute, Some("0.0.0.0/0"), 5);
/// ```
#[derive(Debug, Default)]
pub struct MemoryIpHelper {
    state: Mutex<State>,
}

impl MemoryIpHelper {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an interface; its unicast addresses seed the address table.
    pub fn with_interface(self, ifc: Interface) -> Self {
        self.add_interface(ifc);
        self
    }

    /// Add a route on the interface with `luid`.
    pub fn with_route(self, luid: Luid, route: RouteData) -> Self {
        self.add_route(luid, route);
        self
    }

    /// Encode unicast entries in the pre-Vista layout.
    pub fn with_legacy_records(self) -> Self {
        self.state().encoder = Encoder::new().legacy_unicast(true);
        self
    }

    pub fn add_interface(&self, ifc: Interface) {
        let mut state = self.state();
        for addr in &ifc.unicast_addresses {
            let mut row = UnicastRow::new(ifc.luid, addr.ip_net());
            row.interface_index = ifc.index;
            row.prefix_origin = addr.prefix_origin;
            row.suffix_origin = addr.suffix_origin;
            row.dad_state = addr.dad_state;
            row.valid_lifetime = addr.valid_lifetime;
            row.preferred_lifetime = addr.preferred_lifetime;
            state.unicast.push(row);
        }
        state.interfaces.push(ifc);
    }

    pub fn add_route(&self, luid: Luid, route: RouteData) {
        let mut state = self.state();
        let index = state
            .interfaces
            .iter()
            .find(|ifc| ifc.luid == luid)
            .map_or(0, |ifc| ifc.index);
        let mut row = RouteRow::new(luid, route.destination, route.next_hop_addr(), route.metric);
        row.interface_index = index;
        state.routes.push(row);
    }

    /// Make `op` fail with `code`, for one target or for every call.
    pub fn fail(&self, op: Op, target: Option<&str>, code: u32) {
        self.state().failures.push(Failure {
            op,
            target: target.map(str::to_string),
            code,
        });
    }

    /// Remove every injected failure.
    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Report an overflow on every enumeration, as if adapters kept appearing.
    pub fn always_overflow(&self, on: bool) {
        self.state().always_overflow = on;
    }

    /// Calls made so far, one line each (e.g. `create_route 0.0.0.0/0 via 10.0.0.1 metric 5`).
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// The address table.
    pub fn unicast_rows(&self) -> Vec<UnicastRow> {
        self.state().unicast.clone()
    }

    /// Addresses assigned to one interface, in table order.
    pub fn addresses_of(&self, luid: Luid) -> Vec<IpNet> {
        self.state()
            .unicast
            .iter()
            .filter(|row| row.interface_luid == luid)
            .map(UnicastRow::ip_net)
            .collect()
    }

    /// The route table.
    pub fn route_rows(&self) -> Vec<RouteRow> {
        self.state().routes.clone()
    }

    /// Routes of one interface, in table order.
    pub fn routes_of(&self, luid: Luid) -> Vec<RouteData> {
        self.state()
            .routes
            .iter()
            .filter(|row| row.interface_luid == luid)
            .map(RouteRow::to_route_data)
            .collect()
    }
}

impl IpHelper for MemoryIpHelper {
    fn adapter_addresses(
        &self,
        family: AddressFamily,
        flags: u32,
        buf: &mut AdapterBuffer,
    ) -> Result<Fill> {
        let mut state = self.state();
        state.calls.push(format!("adapter_addresses {family} {flags:#x} {}", buf.len()));
        state.check(Op::Enumerate, "")?;

        if state.always_overflow {
            return Ok(Fill::Overflow {
                required: buf.len() + 1024,
            });
        }

        let interfaces = state.snapshot(family, AdapterFlags::from_raw(flags));
        if interfaces.is_empty() {
            return Ok(Fill::NoData);
        }

        let bytes = state.encoder.encode(&interfaces, buf.base())?;
        if bytes.len() > buf.len() {
            return Ok(Fill::Overflow {
                required: bytes.len(),
            });
        }
        let dst = buf.as_mut_bytes();
        dst.fill(0);
        dst[..bytes.len()].copy_from_slice(&bytes);
        Ok(Fill::Complete)
    }

    fn unicast_addresses(&self, family: AddressFamily) -> Result<Vec<UnicastRow>> {
        let mut state = self.state();
        state.calls.push(format!("unicast_addresses {family}"));
        state.check(Op::ListAddresses, "")?;
        Ok(state
            .unicast
            .iter()
            .filter(|row| family.matches(&row.address))
            .cloned()
            .collect())
    }

    fn unicast_address(&self, luid: Luid, address: IpAddr) -> Result<UnicastRow> {
        let state = self.state();
        state
            .unicast
            .iter()
            .find(|row| row.interface_luid == luid && row.address == address)
            .cloned()
            .ok_or_else(|| Error::from_status(status::ERROR_NOT_FOUND))
    }

    fn create_unicast_address(&self, row: &UnicastRow) -> Result<()> {
        let mut state = self.state();
        let net = row.ip_net();
        state.calls.push(format!("create_unicast_address {net}"));
        state.check(Op::CreateAddress, &net.to_string())?;

        if !state.has_interface(row.interface_luid) {
            return Err(Error::from_status(status::ERROR_NOT_FOUND));
        }
        if state
            .unicast
            .iter()
            .any(|r| r.interface_luid == row.interface_luid && r.address == row.address)
        {
            return Err(Error::from_status(status::ERROR_OBJECT_ALREADY_EXISTS));
        }
        state.unicast.push(row.clone());
        Ok(())
    }

    fn delete_unicast_address(&self, row: &UnicastRow) -> Result<()> {
        let mut state = self.state();
        let net = row.ip_net();
        state.calls.push(format!("delete_unicast_address {net}"));
        state.check(Op::DeleteAddress, &net.to_string())?;

        let before = state.unicast.len();
        state
            .unicast
            .retain(|r| !(r.interface_luid == row.interface_luid && r.address == row.address));
        if state.unicast.len() == before {
            return Err(Error::from_status(status::ERROR_NOT_FOUND));
        }
        Ok(())
    }

    fn routes(&self, family: AddressFamily) -> Result<Vec<RouteRow>> {
        let mut state = self.state();
        state.calls.push(format!("routes {family}"));
        state.check(Op::ListRoutes, "")?;
        Ok(state
            .routes
            .iter()
            .filter(|row| family.matches(&row.destination.addr()))
            .cloned()
            .collect())
    }

    fn route(&self, luid: Luid, destination: IpNet, next_hop: IpAddr) -> Result<RouteRow> {
        let state = self.state();
        state
            .routes
            .iter()
            .find(|row| {
                row.interface_luid == luid
                    && row.destination == destination
                    && row.next_hop == next_hop
            })
            .cloned()
            .ok_or_else(|| Error::from_status(status::ERROR_NOT_FOUND))
    }

    fn create_route(&self, row: &RouteRow) -> Result<()> {
        let mut state = self.state();
        let data = row.to_route_data();
        state.calls.push(format!("create_route {data}"));
        state.check(Op::CreateRoute, &row.destination.to_string())?;

        if !state.has_interface(row.interface_luid) {
            return Err(Error::from_status(status::ERROR_NOT_FOUND));
        }
        if state.routes.iter().any(|r| {
            r.interface_luid == row.interface_luid
                && r.destination == row.destination
                && r.next_hop == row.next_hop
        }) {
            return Err(Error::from_status(status::ERROR_OBJECT_ALREADY_EXISTS));
        }
        state.routes.push(row.clone());
        Ok(())
    }

    fn delete_route(&self, row: &RouteRow) -> Result<()> {
        let mut state = self.state();
        let data = row.to_route_data();
        state.calls.push(format!("delete_route {data}"));
        state.check(Op::DeleteRoute, &row.destination.to_string())?;

        let before = state.routes.len();
        state.routes.retain(|r| {
            !(r.interface_luid == row.interface_luid
                && r.destination == row.destination
                && r.next_hop == row.next_hop)
        });
        if state.routes.len() == before {
            return Err(Error::from_status(status::ERROR_NOT_FOUND));
        }
        Ok(())
    }

    fn luid_from_guid(&self, guid: &Guid) -> Result<Luid> {
        self.state()
            .interfaces
            .iter()
            .find(|ifc| ifc.adapter_name.parse::<Guid>().is_ok_and(|g| g == *guid))
            .map(|ifc| ifc.luid)
            .ok_or_else(|| Error::from_status(status::ERROR_FILE_NOT_FOUND))
    }
}
