//! Core types for declarative interface configuration.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::interface::Interface;
use crate::net::{AddressParseError, IpNet, RouteParseError, parse_addr};
use crate::route::RouteData;

/// Desired configuration of one interface.
///
/// Addresses and routes are complete sets: anything on the interface that
/// is not listed is removed (IPv6 link-local addresses excepted). DNS
/// servers are left alone unless `dns` is given; an empty list clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterfaceConfig {
    #[serde(default)]
    pub(crate) addresses: Vec<IpNet>,
    #[serde(default)]
    pub(crate) routes: Vec<RouteData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) dns: Option<Vec<IpAddr>>,
}

impl InterfaceConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the live state of an interface.
    ///
    /// Routes are not part of [`Interface`] and are passed separately.
    pub fn from_interface(ifc: &Interface, routes: &[RouteData]) -> Self {
        Self {
            addresses: ifc.unicast_ip_nets.clone(),
            routes: routes.to_vec(),
            dns: Some(ifc.dns_servers()),
        }
    }

    /// Add an address in CIDR notation (e.g., "192.168.1.10/24").
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = InterfaceConfig::new()
    ///     .address("192.168.1.10/24")?
    ///     .address("2001:db8::10/64")?;
    /// ```
    pub fn address(mut self, addr: &str) -> Result<Self, AddressParseError> {
        self.addresses.push(addr.parse()?);
        Ok(self)
    }

    /// Add a route.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = InterfaceConfig::new()
    ///     .route("0.0.0.0/0", |r| r.via("192.168.1.1").metric(25))?
    ///     .route("10.8.0.0/16", |r| r)?;
    /// ```
    pub fn route(
        mut self,
        destination: &str,
        f: impl FnOnce(RouteBuilder) -> RouteBuilder,
    ) -> Result<Self, RouteParseError> {
        let builder = f(RouteBuilder::new(destination)?);
        self.routes.push(builder.build()?);
        Ok(self)
    }

    /// Add a DNS server. The first call switches DNS management on.
    pub fn dns(mut self, server: &str) -> Result<Self, AddressParseError> {
        let addr = parse_addr(server)?;
        self.dns.get_or_insert_with(Vec::new).push(addr);
        Ok(self)
    }

    /// Manage DNS and clear every server.
    pub fn no_dns(mut self) -> Self {
        self.dns = Some(Vec::new());
        self
    }

    pub fn addresses(&self) -> &[IpNet] {
        &self.addresses
    }

    pub fn routes(&self) -> &[RouteData] {
        &self.routes
    }

    /// DNS servers, or `None` when DNS is not managed.
    pub fn dns_servers(&self) -> Option<&[IpAddr]> {
        self.dns.as_deref()
    }
}

/// Builder for route configuration.
#[derive(Debug)]
pub struct RouteBuilder {
    destination: IpNet,
    next_hop: Option<IpAddr>,
    metric: u32,
    error: Option<RouteParseError>,
}

impl RouteBuilder {
    fn new(destination: &str) -> Result<Self, RouteParseError> {
        let destination = destination.parse().map_err(RouteParseError::Destination)?;
        Ok(Self {
            destination,
            next_hop: None,
            metric: 0,
            error: None,
        })
    }

    /// Set the next hop.
    pub fn via(mut self, next_hop: &str) -> Self {
        match parse_addr(next_hop) {
            Ok(addr) => self.next_hop = Some(addr),
            Err(_) => self.error = Some(RouteParseError::NextHop(next_hop.to_string())),
        }
        self
    }

    /// Set the route metric.
    pub fn metric(mut self, metric: u32) -> Self {
        self.metric = metric;
        self
    }

    fn build(self) -> Result<RouteData, RouteParseError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        match self.next_hop {
            Some(nh) if nh.is_ipv4() != self.destination.is_ipv4() => {
                Err(RouteParseError::FamilyMismatch {
                    destination: self.destination,
                    next_hop: nh,
                })
            }
            Some(nh) => Ok(RouteData::new(self.destination, nh, self.metric)),
            None => Ok(RouteData::on_link(self.destination, self.metric)),
        }
    }
}
