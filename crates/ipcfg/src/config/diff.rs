//! Configuration diffing.
//!
//! Computes the difference between a desired [`InterfaceConfig`] and the
//! current state of an interface.

use std::net::IpAddr;

use serde::Serialize;

use super::types::InterfaceConfig;
use crate::address::address_delta;
use crate::interface::Interface;
use crate::net::IpNet;
use crate::route::{RouteData, managed_routes, route_delta};

/// Difference between desired and current interface state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigDiff {
    /// Addresses to add.
    pub addresses_to_add: Vec<IpNet>,
    /// Addresses to remove.
    pub addresses_to_remove: Vec<IpNet>,

    /// Routes to add.
    pub routes_to_add: Vec<RouteData>,
    /// Routes to remove.
    pub routes_to_remove: Vec<RouteData>,

    /// Replacement DNS server list, when it differs from the current one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_to_set: Option<Vec<IpAddr>>,
}

impl ConfigDiff {
    /// Check if no changes are needed.
    pub fn is_empty(&self) -> bool {
        self.addresses_to_add.is_empty()
            && self.addresses_to_remove.is_empty()
            && self.routes_to_add.is_empty()
            && self.routes_to_remove.is_empty()
            && self.dns_to_set.is_none()
    }

    /// Get the total number of changes. A DNS replacement counts once.
    pub fn change_count(&self) -> usize {
        self.addresses_to_add.len()
            + self.addresses_to_remove.len()
            + self.routes_to_add.len()
            + self.routes_to_remove.len()
            + usize::from(self.dns_to_set.is_some())
    }

    /// Get a human-readable summary of the changes.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        for route in &self.routes_to_remove {
            lines.push(format!("- route {route}"));
        }
        for net in &self.addresses_to_remove {
            lines.push(format!("- address {net}"));
        }
        for net in &self.addresses_to_add {
            lines.push(format!("+ address {net}"));
        }
        for route in &self.routes_to_add {
            lines.push(format!("+ route {route}"));
        }
        if let Some(servers) = &self.dns_to_set {
            lines.push(format!("~ dns {}", dns_list(servers)));
        }

        if lines.is_empty() {
            "No changes needed".to_string()
        } else {
            lines.join("\n")
        }
    }
}

pub(crate) fn dns_list(servers: &[IpAddr]) -> String {
    if servers.is_empty() {
        "(none)".to_string()
    } else {
        servers
            .iter()
            .map(IpAddr::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Diff two configurations, `current` standing for the live state.
///
/// DNS servers are compared in order, since order is the resolver's
/// preference order.
pub fn compute_diff(desired: &InterfaceConfig, current: &InterfaceConfig) -> ConfigDiff {
    let addresses = address_delta(&current.addresses, &desired.addresses);
    let routes = route_delta(&current.routes, &desired.routes);

    let dns_to_set = match (&desired.dns, &current.dns) {
        (Some(want), Some(have)) if want == have => None,
        (Some(want), None) if want.is_empty() => None,
        (Some(want), _) => Some(want.clone()),
        (None, _) => None,
    };

    ConfigDiff {
        addresses_to_add: addresses.add,
        addresses_to_remove: addresses.delete,
        routes_to_add: routes.add,
        routes_to_remove: routes.delete,
        dns_to_set,
    }
}

impl InterfaceConfig {
    /// Compute the changes that bring `ifc` to this configuration.
    ///
    /// `current_routes` are the interface's live routes, which the
    /// [`Interface`] snapshot does not carry. IPv6 routes with no desired
    /// route to the same destination are left out of the diff.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let routes: Vec<RouteData> = host
    ///     .routes(&ifc, AddressFamily::Unspec)?
    ///     .iter()
    ///     .map(RouteRow::to_route_data)
    ///     .collect();
    /// let diff = config.diff(&ifc, &routes);
    /// if !diff.is_empty() {
    ///     println!("Changes needed:\n{}", diff.summary());
    /// }
    /// ```
    pub fn diff(&self, ifc: &Interface, current_routes: &[RouteData]) -> ConfigDiff {
        let current = managed_routes(current_routes, &self.routes);
        compute_diff(self, &InterfaceConfig::from_interface(ifc, &current))
    }

    /// Compute the changes that turn `current` into this configuration.
    pub fn diff_from(&self, current: &InterfaceConfig) -> ConfigDiff {
        compute_diff(self, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(addrs: &[&str], routes: &[&str]) -> InterfaceConfig {
        let mut c = InterfaceConfig::new();
        for a in addrs {
            c = c.address(a).unwrap();
        }
        c.routes = routes.iter().map(|r| r.parse().unwrap()).collect();
        c
    }

    #[test]
    fn test_identical_is_empty() {
        let c = config(&["10.0.0.2/24"], &["0.0.0.0/0 via 10.0.0.1"]).dns("10.0.0.53").unwrap();
        let diff = c.diff_from(&c);
        assert!(diff.is_empty());
        assert_eq!(diff.change_count(), 0);
        assert_eq!(diff.summary(), "No changes needed");
    }

    #[test]
    fn test_summary() {
        let current = config(&["10.0.0.1/24", "fe80::1/64"], &["10.0.0.0/24 via 10.0.0.1 metric 10"]);
        let desired = config(&["10.0.0.2/24"], &[]).dns("1.1.1.1").unwrap().dns("8.8.8.8").unwrap();
        let diff = desired.diff_from(&current);

        assert_eq!(diff.change_count(), 4);
        assert_eq!(
            diff.summary(),
            "- route 10.0.0.0/24 via 10.0.0.1 metric 10\n\
             - address 10.0.0.1/24\n\
             + address 10.0.0.2/24\n\
             ~ dns 1.1.1.1, 8.8.8.8"
        );
    }

    #[test]
    fn test_dns_unmanaged_or_reordered() {
        let current = config(&[], &[]).dns("1.1.1.1").unwrap().dns("8.8.8.8").unwrap();

        let unmanaged = config(&[], &[]);
        assert!(unmanaged.diff_from(&current).dns_to_set.is_none());

        let reordered = config(&[], &[]).dns("8.8.8.8").unwrap().dns("1.1.1.1").unwrap();
        assert_eq!(
            reordered.diff_from(&current).dns_to_set.as_deref().map(dns_list),
            Some("8.8.8.8, 1.1.1.1".to_string())
        );

        let cleared = config(&[], &[]).no_dns();
        assert_eq!(cleared.diff_from(&current).dns_to_set, Some(Vec::new()));
        assert!(cleared.diff_from(&config(&[], &[])).is_empty());
    }
}
