//! Common fixtures for integration tests.
//!
//! Every test builds its own [`LabHost`]: an in-memory IP helper seeded with
//! a couple of adapters and a recording command runner.

use std::net::IpAddr;

use ipcfg::lab::{MemoryIpHelper, RecordingRunner};
use ipcfg::record::{AdapterAddress, UnicastAddress};
use ipcfg::types::{IfType, OperStatus};
use ipcfg::{Guid, Host, Interface, IpNet, Luid};

pub type LabHost = Host<MemoryIpHelper, RecordingRunner>;

pub const ETHERNET_LUID: Luid = Luid(0x0006_0000_0100_0000);
pub const WIFI_LUID: Luid = Luid(0x0047_0000_0200_0000);

pub const ETHERNET_GUID: &str = "{4D36E972-E325-11CE-BFC1-08002BE10318}";

pub fn net(s: &str) -> IpNet {
    s.parse().unwrap()
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn unicast(nets: &[&str]) -> Vec<UnicastAddress> {
    nets.iter().map(|n| UnicastAddress::manual(net(n))).collect()
}

fn adapter_addresses(addrs: &[&str]) -> Vec<AdapterAddress> {
    addrs.iter().map(|a| AdapterAddress::from(ip(a))).collect()
}

/// A wired adapter with an IPv4 address, a link-local IPv6 address, one
/// DNS server per family and a default gateway.
pub fn ethernet() -> Interface {
    let unicast_addresses = unicast(&["10.0.0.1/24", "fe80::1/64"]);
    Interface {
        luid: ETHERNET_LUID,
        index: 12,
        ipv6_if_index: 12,
        adapter_name: ETHERNET_GUID.into(),
        friendly_name: "Ethernet".into(),
        description: "Intel(R) Ethernet Connection".into(),
        dns_suffix: "corp.example".into(),
        unicast_ip_nets: unicast_addresses.iter().map(UnicastAddress::ip_net).collect(),
        unicast_addresses,
        dns_server_addresses: adapter_addresses(&["10.0.0.53", "2001:db8::53"]),
        gateway_addresses: adapter_addresses(&["10.0.0.254"]),
        physical_address: vec![0x00, 0x15, 0x5d, 0x01, 0x02, 0x03],
        mtu: 1500,
        if_type: IfType::Ethernet,
        oper_status: OperStatus::Up,
        transmit_link_speed: 1_000_000_000,
        receive_link_speed: 1_000_000_000,
        ipv4_metric: 25,
        ipv6_metric: 25,
        ..Default::default()
    }
}

/// A wireless adapter that only speaks IPv6.
pub fn wifi() -> Interface {
    let unicast_addresses = unicast(&["2001:db8:1::10/64", "fe80::10/64"]);
    Interface {
        luid: WIFI_LUID,
        index: 0,
        ipv6_if_index: 17,
        adapter_name: "{9A1B3C5D-0000-4000-8000-00AABBCCDDEE}".into(),
        friendly_name: "Wi-Fi".into(),
        description: "Wireless adapter".into(),
        unicast_ip_nets: unicast_addresses.iter().map(UnicastAddress::ip_net).collect(),
        unicast_addresses,
        physical_address: vec![0x02, 0x00, 0x00, 0xaa, 0xbb, 0xcc],
        mtu: 1480,
        if_type: IfType::Ieee80211,
        oper_status: OperStatus::Up,
        ..Default::default()
    }
}

/// A host with both adapters and no routes.
pub fn lab_host() -> LabHost {
    Host::new(
        MemoryIpHelper::new().with_interface(ethernet()).with_interface(wifi()),
        RecordingRunner::new(),
    )
}

pub fn ethernet_guid() -> Guid {
    ETHERNET_GUID.parse().unwrap()
}
