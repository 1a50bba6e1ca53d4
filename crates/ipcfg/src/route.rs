//! Route reconciliation and per-interface route operations.

use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::command::CommandRunner;
use crate::error::{BatchError, Error, Result};
use crate::helper::{IpHelper, RouteRow};
use crate::host::Host;
use crate::interface::Interface;
use crate::net::{IpNet, RouteParseError, compare_addrs, compare_nets, parse_addr};
use crate::reconcile::{self, Delta};
use crate::types::AddressFamily;

/// A route as desired state: destination, optional next hop, metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteData {
    pub destination: IpNet,
    /// `None` for an on-link route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_hop: Option<IpAddr>,
    #[serde(default)]
    pub metric: u32,
}

impl RouteData {
    /// Create a route. An unspecified next hop means "no next hop".
    pub fn new(destination: IpNet, next_hop: IpAddr, metric: u32) -> Self {
        Self {
            destination,
            next_hop: Some(next_hop).filter(|nh| !nh.is_unspecified()),
            metric,
        }
    }

    /// An on-link route.
    pub fn on_link(destination: IpNet, metric: u32) -> Self {
        Self {
            destination,
            next_hop: None,
            metric,
        }
    }

    /// The next hop, treating an unspecified address as absent.
    pub fn gateway(&self) -> Option<IpAddr> {
        self.next_hop.filter(|nh| !nh.is_unspecified())
    }

    /// The next hop as the host stores it: unspecified of the destination's
    /// family when absent.
    pub fn next_hop_addr(&self) -> IpAddr {
        match self.gateway() {
            Some(nh) => nh,
            None if self.destination.is_ipv4() => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            None => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }

    /// Same destination address and prefix length, IPv4-mapped forms
    /// included.
    pub fn same_destination(&self, other: &Self) -> bool {
        compare_nets(&self.destination, &other.destination).is_eq()
    }
}

impl fmt::Display for RouteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.destination)?;
        if let Some(nh) = self.gateway() {
            write!(f, " via {nh}")?;
        }
        write!(f, " metric {}", self.metric)
    }
}

impl FromStr for RouteData {
    type Err = RouteParseError;

    /// Parse `DEST [via NEXTHOP] [metric N]`, in the style of `ip route`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let dest = words
            .next()
            .ok_or_else(|| RouteParseError::Unexpected("empty route".into()))?;
        let destination: IpNet = dest.parse().map_err(RouteParseError::Destination)?;

        let mut next_hop = None;
        let mut metric = 0;
        while let Some(word) = words.next() {
            match word {
                "via" => {
                    let nh = words
                        .next()
                        .ok_or_else(|| RouteParseError::NextHop("missing".into()))?;
                    next_hop =
                        Some(parse_addr(nh).map_err(|_| RouteParseError::NextHop(nh.into()))?);
                }
                "metric" => {
                    let m = words
                        .next()
                        .ok_or_else(|| RouteParseError::Metric("missing".into()))?;
                    metric = m.parse().map_err(|_| RouteParseError::Metric(m.into()))?;
                }
                other => return Err(RouteParseError::Unexpected(other.into())),
            }
        }

        if let Some(nh) = next_hop
            && nh.is_ipv4() != destination.is_ipv4()
        {
            return Err(RouteParseError::FamilyMismatch {
                destination,
                next_hop: nh,
            });
        }

        Ok(match next_hop {
            Some(nh) => Self::new(destination, nh, metric),
            None => Self::on_link(destination, metric),
        })
    }
}

/// Canonical route order.
///
/// Destination in [`compare_nets`] order (octets ascending, more specific
/// first), next hop ascending with "no next hop" first, metric ascending.
pub fn compare_routes(a: &RouteData, b: &RouteData) -> Ordering {
    compare_nets(&a.destination, &b.destination)
        .then_with(|| match (a.gateway(), b.gateway()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => compare_addrs(&x, &y),
        })
        .then_with(|| a.metric.cmp(&b.metric))
}

/// Sort into canonical order.
pub fn sort_routes(routes: &mut [RouteData]) {
    routes.sort_by(compare_routes);
}

/// Keep only the first route for each destination and prefix length.
///
/// Expects canonical order, so the survivor is the one with the lowest
/// next hop and metric. Multipath routes are not modelled.
pub fn dedup_routes(routes: &mut Vec<RouteData>) {
    routes.dedup_by(|later, first| later.same_destination(first));
}

/// Changes turning `current` into `desired`.
///
/// Both sides are sorted and deduplicated first. No route is protected from
/// deletion.
pub fn route_delta(current: &[RouteData], desired: &[RouteData]) -> Delta<RouteData> {
    let mut current = current.to_vec();
    let mut desired = desired.to_vec();
    sort_routes(&mut current);
    sort_routes(&mut desired);
    dedup_routes(&mut current);
    dedup_routes(&mut desired);
    reconcile::merge(&current, &desired, compare_routes)
}

/// The live routes a reconciliation towards `want` may touch.
///
/// Every IPv4 route is managed. An IPv6 route is managed only when `want`
/// has a route to the same destination, so host-installed routes such as
/// `fe80::/64` and `ff00::/8` are left alone.
pub fn managed_routes(current: &[RouteData], want: &[RouteData]) -> Vec<RouteData> {
    current
        .iter()
        .filter(|r| {
            r.destination.to_canonical().is_ipv4() || want.iter().any(|w| w.same_destination(r))
        })
        .copied()
        .collect()
}

impl<H: IpHelper, R: CommandRunner> Host<H, R> {
    /// The interface's routes of a family.
    pub fn routes(&self, ifc: &Interface, family: AddressFamily) -> Result<Vec<RouteRow>> {
        let mut rows = self.helper().routes(family)?;
        rows.retain(|r| r.interface_luid == ifc.luid);
        Ok(rows)
    }

    /// The route matching destination and next hop.
    pub fn route(&self, ifc: &Interface, destination: IpNet, next_hop: IpAddr) -> Result<RouteRow> {
        self.helper()
            .route(ifc.luid, destination, next_hop)
            .map_err(|e| {
                if e.is_not_found() {
                    Error::RouteNotFound {
                        destination: destination.to_string(),
                        next_hop: next_hop.to_string(),
                    }
                } else {
                    e
                }
            })
    }

    /// Delete every route on the interface, stopping at the first failure.
    pub fn flush_routes(&self, ifc: &Interface) -> Result<()> {
        for row in self.routes(ifc, AddressFamily::Unspec)? {
            let data = row.to_route_data();
            self.helper()
                .delete_route(&row)
                .map_err(|e| e.with_context(format!("deleting route {data}")))?;
            tracing::info!(interface = ifc.index, route = %data, "route deleted");
        }
        Ok(())
    }

    /// Add one route.
    pub fn add_route(&self, ifc: &Interface, route: &RouteData) -> Result<()> {
        let mut row = RouteRow::new(ifc.luid, route.destination, route.next_hop_addr(), route.metric);
        row.interface_index = ifc.index;
        self.helper().create_route(&row)?;
        tracing::info!(interface = ifc.index, route = %route, "route added");
        Ok(())
    }

    /// Add several routes, attempting every one.
    ///
    /// A single failure is returned as is; several are combined into
    /// [`Error::Batch`].
    pub fn add_routes(&self, ifc: &Interface, routes: &[RouteData]) -> Result<()> {
        let mut errors = BatchError::new();
        for route in routes {
            if let Err(e) = self.add_route(ifc, route) {
                tracing::warn!(interface = ifc.index, route = %route, error = %e, "add failed");
                errors.push(format!("adding route {route}"), e);
            }
        }
        errors.into_result()
    }

    /// Replace all routes: flush, then add. Nothing is added if the flush fails.
    pub fn set_routes(&self, ifc: &Interface, routes: &[RouteData]) -> Result<()> {
        self.flush_routes(ifc)?;
        self.add_routes(ifc, routes)
    }

    /// Incrementally converge the interface's routes on `want`.
    ///
    /// Current routes are read live and narrowed with [`managed_routes`].
    /// Deletes run before adds; every operation is attempted and the last
    /// failure is returned.
    pub fn sync_routes(&self, ifc: &Interface, want: &[RouteData]) -> Result<()> {
        let live: Vec<RouteData> = self
            .routes(ifc, AddressFamily::Unspec)?
            .iter()
            .map(RouteRow::to_route_data)
            .collect();
        let delta = route_delta(&managed_routes(&live, want), want);
        tracing::debug!(
            interface = ifc.index,
            add = delta.add.len(),
            delete = delta.delete.len(),
            "route sync"
        );

        let mut last_err = None;
        for route in &delta.delete {
            if let Err(e) = self.delete_route(ifc, route.destination, route.next_hop_addr()) {
                tracing::warn!(interface = ifc.index, route = %route, error = %e, "delete failed");
                last_err = Some(e);
            }
        }
        for route in &delta.add {
            if let Err(e) = self.add_route(ifc, route) {
                tracing::warn!(interface = ifc.index, route = %route, error = %e, "add failed");
                last_err = Some(e);
            }
        }

        match last_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Delete the route matching destination and next hop.
    pub fn delete_route(&self, ifc: &Interface, destination: IpNet, next_hop: IpAddr) -> Result<()> {
        let row = self.route(ifc, destination, next_hop)?;
        self.helper().delete_route(&row)?;
        tracing::info!(interface = ifc.index, route = %row.to_route_data(), "route deleted");
        Ok(())
    }
}
