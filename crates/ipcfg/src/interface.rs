//! The interface snapshot assembled from one adapter record.

use std::fmt;
use std::net::IpAddr;

use serde::Serialize;

use crate::error::Result;
use crate::net::{IpNet, format_mac};
use crate::record::entry::{self, AdapterAddress, IpPrefix, UnicastAddress};
use crate::record::raw::IpAdapterAddresses;
use crate::record::{RecordBuffer, sockaddr};
use crate::types::{ConnectionType, Guid, IfType, Luid, OperStatus, TunnelType};

/// Adapter flag bits (`IP_ADAPTER_*`) found in [`Interface::flags`].
pub mod adapter_flags {
    pub const DDNS_ENABLED: u32 = 0x0001;
    pub const REGISTER_ADAPTER_SUFFIX: u32 = 0x0002;
    pub const DHCP_ENABLED: u32 = 0x0004;
    pub const RECEIVE_ONLY: u32 = 0x0008;
    pub const NO_MULTICAST: u32 = 0x0010;
    pub const IPV6_OTHER_STATEFUL_CONFIG: u32 = 0x0020;
    pub const NETBIOS_OVER_TCPIP_ENABLED: u32 = 0x0040;
    pub const IPV4_ENABLED: u32 = 0x0080;
    pub const IPV6_ENABLED: u32 = 0x0100;
    pub const IPV6_MANAGE_ADDRESS_CONFIG: u32 = 0x0200;
}

/// A snapshot of one network interface.
///
/// Collections keep the order the host reported them in; for unicast
/// addresses that order is the host's preference order. Nothing refreshes a
/// snapshot after it is returned, except that address synchronization
/// replaces [`unicast_ip_nets`](Self::unicast_ip_nets) with what it applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Interface {
    /// Locally unique identifier, stable across reboots.
    pub luid: Luid,
    /// Interface index. Falls back to the IPv6 index when the IPv4 one is zero.
    pub index: u32,
    pub adapter_name: String,
    pub friendly_name: String,
    pub unicast_addresses: Vec<UnicastAddress>,
    /// Unicast addresses paired with their on-link prefix lengths.
    pub unicast_ip_nets: Vec<IpNet>,
    pub anycast_addresses: Vec<AdapterAddress>,
    pub multicast_addresses: Vec<AdapterAddress>,
    pub dns_server_addresses: Vec<AdapterAddress>,
    pub dns_suffix: String,
    pub description: String,
    pub physical_address: Vec<u8>,
    pub flags: u32,
    pub mtu: u32,
    pub if_type: IfType,
    pub oper_status: OperStatus,
    pub ipv6_if_index: u32,
    pub zone_indices: [u32; 16],
    pub prefixes: Vec<IpPrefix>,
    pub transmit_link_speed: u64,
    pub receive_link_speed: u64,
    pub wins_server_addresses: Vec<AdapterAddress>,
    pub gateway_addresses: Vec<AdapterAddress>,
    pub ipv4_metric: u32,
    pub ipv6_metric: u32,
    pub dhcpv4_server: Option<IpAddr>,
    pub compartment_id: u32,
    pub network_guid: Guid,
    pub connection_type: ConnectionType,
    pub tunnel_type: TunnelType,
    pub dhcpv6_server: Option<IpAddr>,
    pub dhcpv6_client_duid: Vec<u8>,
    pub dhcpv6_iaid: u32,
    pub dns_suffixes: Vec<String>,
}

impl Interface {
    /// Build an interface from an adapter record and the chains it points at.
    pub fn from_record(buf: &RecordBuffer<'_>, record: &IpAdapterAddresses) -> Result<Self> {
        let unicast_addresses = entry::unicast_addresses(buf, record.first_unicast_address)?;
        let unicast_ip_nets = unicast_addresses.iter().map(UnicastAddress::ip_net).collect();

        let phys_len = (record.physical_address_length as usize).min(record.physical_address.len());
        let duid_len =
            (record.dhcpv6_client_duid_length as usize).min(record.dhcpv6_client_duid.len());

        let index = match record.if_index {
            0 => record.ipv6_if_index,
            index => index,
        };

        Ok(Self {
            luid: Luid(record.luid),
            index,
            adapter_name: buf.ansi_string(u64::from(record.adapter_name))?,
            friendly_name: buf.wide_string(u64::from(record.friendly_name))?,
            unicast_addresses,
            unicast_ip_nets,
            anycast_addresses: entry::addresses(buf, record.first_anycast_address)?,
            multicast_addresses: entry::addresses(buf, record.first_multicast_address)?,
            dns_server_addresses: entry::addresses(buf, record.first_dns_server_address)?,
            dns_suffix: buf.wide_string(u64::from(record.dns_suffix))?,
            description: buf.wide_string(u64::from(record.description))?,
            physical_address: record.physical_address[..phys_len].to_vec(),
            flags: record.flags,
            mtu: record.mtu,
            if_type: IfType::from(record.if_type),
            oper_status: OperStatus::from(record.oper_status),
            ipv6_if_index: record.ipv6_if_index,
            zone_indices: record.zone_indices,
            prefixes: entry::prefixes(buf, record.first_prefix)?,
            transmit_link_speed: record.transmit_link_speed,
            receive_link_speed: record.receive_link_speed,
            wins_server_addresses: entry::addresses(buf, record.first_wins_server_address)?,
            gateway_addresses: entry::addresses(buf, record.first_gateway_address)?,
            ipv4_metric: record.ipv4_metric,
            ipv6_metric: record.ipv6_metric,
            dhcpv4_server: sockaddr::decode(buf, &record.dhcpv4_server)?,
            compartment_id: record.compartment_id,
            network_guid: record.network_guid,
            connection_type: ConnectionType::from(record.connection_type),
            tunnel_type: TunnelType::from(record.tunnel_type),
            dhcpv6_server: sockaddr::decode(buf, &record.dhcpv6_server)?,
            dhcpv6_client_duid: record.dhcpv6_client_duid[..duid_len].to_vec(),
            dhcpv6_iaid: record.dhcpv6_iaid,
            dns_suffixes: entry::dns_suffixes(buf, record.first_dns_suffix)?,
        })
    }

    /// Check whether an adapter flag bit is set.
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    pub fn is_dhcp_enabled(&self) -> bool {
        self.has_flag(adapter_flags::DHCP_ENABLED)
    }

    pub fn is_up(&self) -> bool {
        self.oper_status == OperStatus::Up
    }

    pub fn is_loopback(&self) -> bool {
        self.if_type == IfType::SoftwareLoopback
    }

    /// Formatted hardware address, empty when the adapter has none.
    pub fn mac_address(&self) -> String {
        format_mac(&self.physical_address)
    }

    /// Configured DNS server addresses.
    pub fn dns_servers(&self) -> Vec<IpAddr> {
        self.dns_server_addresses.iter().map(|a| a.address).collect()
    }

    /// Default gateway addresses.
    pub fn gateways(&self) -> Vec<IpAddr> {
        self.gateway_addresses.iter().map(|a| a.address).collect()
    }
}

fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    items: impl IntoIterator<Item = T>,
) -> fmt::Result {
    writeln!(f, "{label}:")?;
    for item in items {
        writeln!(f, "\t{item}")?;
    }
    Ok(())
}

fn write_opt(f: &mut fmt::Formatter<'_>, label: &str, addr: Option<IpAddr>) -> fmt::Result {
    match addr {
        Some(a) => writeln!(f, "{label}: {a}"),
        None => writeln!(f, "{label}: <nil>"),
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Luid: {}", self.luid)?;
        writeln!(f, "Index: {}", self.index)?;
        writeln!(f, "AdapterName: {}", self.adapter_name)?;
        writeln!(f, "FriendlyName: {}", self.friendly_name)?;
        write_list(
            f,
            "UnicastAddresses",
            self.unicast_addresses.iter().map(|u| {
                format!(
                    "{} {} valid {} preferred {}",
                    u.ip_net(),
                    u.dad_state,
                    u.valid_lifetime,
                    u.preferred_lifetime
                )
            }),
        )?;
        write_list(f, "UnicastIPNets", &self.unicast_ip_nets)?;
        write_list(f, "AnycastAddresses", self.anycast_addresses.iter().map(|a| a.address))?;
        write_list(f, "MulticastAddresses", self.multicast_addresses.iter().map(|a| a.address))?;
        write_list(f, "DnsServerAddresses", self.dns_server_addresses.iter().map(|a| a.address))?;
        writeln!(f, "DnsSuffix: {}", self.dns_suffix)?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "PhysicalAddress: {}", self.mac_address())?;
        writeln!(f, "Flags: {:#x}", self.flags)?;
        writeln!(f, "Mtu: {}", self.mtu)?;
        writeln!(f, "IfType: {}", self.if_type)?;
        writeln!(f, "OperStatus: {}", self.oper_status)?;
        writeln!(f, "Ipv6IfIndex: {}", self.ipv6_if_index)?;
        writeln!(f, "ZoneIndices: {:?}", self.zone_indices)?;
        write_list(f, "Prefixes", self.prefixes.iter().map(IpPrefix::ip_net))?;
        writeln!(f, "TransmitLinkSpeed: {}", self.transmit_link_speed)?;
        writeln!(f, "ReceiveLinkSpeed: {}", self.receive_link_speed)?;
        write_list(f, "WinsServerAddresses", self.wins_server_addresses.iter().map(|a| a.address))?;
        write_list(f, "GatewayAddresses", self.gateway_addresses.iter().map(|a| a.address))?;
        writeln!(f, "Ipv4Metric: {}", self.ipv4_metric)?;
        writeln!(f, "Ipv6Metric: {}", self.ipv6_metric)?;
        write_opt(f, "Dhcpv4Server", self.dhcpv4_server)?;
        writeln!(f, "CompartmentId: {}", self.compartment_id)?;
        writeln!(f, "NetworkGuid: {}", self.network_guid)?;
        writeln!(f, "ConnectionType: {}", self.connection_type)?;
        writeln!(f, "TunnelType: {}", self.tunnel_type)?;
        write_opt(f, "Dhcpv6Server", self.dhcpv6_server)?;
        writeln!(f, "Dhcpv6ClientDuid: {}", format_mac(&self.dhcpv6_client_duid))?;
        writeln!(f, "Dhcpv6Iaid: {}", self.dhcpv6_iaid)?;
        write_list(f, "DnsSuffixes", &self.dns_suffixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Interface {
        let unicast = vec![
            UnicastAddress::manual("10.0.0.1/24".parse().unwrap()),
            UnicastAddress::manual("fe80::1/64".parse().unwrap()),
        ];
        Interface {
            luid: Luid(0x0006_0000_0100_0000),
            index: 7,
            adapter_name: "{4D36E972-E325-11CE-BFC1-08002BE10318}".into(),
            friendly_name: "Ethernet".into(),
            unicast_ip_nets: unicast.iter().map(UnicastAddress::ip_net).collect(),
            unicast_addresses: unicast,
            dns_server_addresses: vec![AdapterAddress::from("1.1.1.1".parse::<IpAddr>().unwrap())],
            physical_address: vec![0x00, 0x15, 0x5d, 0x01, 0x02, 0x03],
            flags: adapter_flags::DHCP_ENABLED | adapter_flags::IPV4_ENABLED,
            oper_status: OperStatus::Up,
            if_type: IfType::Ethernet,
            ..Default::default()
        }
    }

    #[test]
    fn test_accessors() {
        let ifc = sample();
        assert!(ifc.is_dhcp_enabled());
        assert!(ifc.is_up());
        assert!(!ifc.is_loopback());
        assert_eq!(ifc.mac_address(), "00:15:5d:01:02:03");
        assert_eq!(ifc.dns_servers(), vec!["1.1.1.1".parse::<IpAddr>().unwrap()]);
        assert!(ifc.gateways().is_empty());
    }

    #[test]
    fn test_display_lists_collections() {
        let text = sample().to_string();
        assert!(text.contains("Index: 7\n"));
        assert!(text.contains("FriendlyName: Ethernet\n"));
        assert!(text.contains("UnicastIPNets:\n\t10.0.0.1/24\n\tfe80::1/64\n"));
        assert!(text.contains("DnsServerAddresses:\n\t1.1.1.1\n"));
        assert!(text.contains("Dhcpv4Server: <nil>\n"));
        assert!(text.contains("OperStatus: UP\n"));
        assert!(text.ends_with("DnsSuffixes:\n"));
    }
}
