//! Enumeration integration tests.

use ipcfg::error::status;
use ipcfg::lab::{MemoryIpHelper, Op, RecordingRunner};
use ipcfg::types::{IfType, OperStatus};
use ipcfg::{AddressFamily, EnumerateOptions, Error, Host, Luid, Result};

use crate::common::*;

#[test]
fn test_enumerate_all() -> Result<()> {
    let host = lab_host();
    let interfaces = host.interfaces()?;
    assert_eq!(interfaces.len(), 2);

    let eth = &interfaces[0];
    assert_eq!(eth.luid, ETHERNET_LUID);
    assert_eq!(eth.index, 12);
    assert_eq!(eth.friendly_name, "Ethernet");
    assert_eq!(eth.adapter_name, ETHERNET_GUID);
    assert_eq!(eth.if_type, IfType::Ethernet);
    assert_eq!(eth.oper_status, OperStatus::Up);
    assert_eq!(eth.mtu, 1500);
    assert_eq!(eth.mac_address(), "00:15:5d:01:02:03");
    assert_eq!(eth.unicast_ip_nets, [net("10.0.0.1/24"), net("fe80::1/64")]);
    assert_eq!(eth.dns_servers(), [ip("10.0.0.53"), ip("2001:db8::53")]);
    assert_eq!(eth.gateways(), [ip("10.0.0.254")]);
    assert_eq!(eth.dns_suffix, "corp.example");

    // No IPv4 index: the IPv6 one stands in.
    assert_eq!(interfaces[1].index, 17);
    assert_eq!(interfaces[1].ipv6_if_index, 17);
    Ok(())
}

#[test]
fn test_enumerate_by_family() -> Result<()> {
    let host = lab_host();
    let opts = EnumerateOptions::new().family(AddressFamily::Inet);
    let interfaces = host.interfaces_with(&opts)?;

    assert_eq!(interfaces[0].unicast_ip_nets, [net("10.0.0.1/24")]);
    assert_eq!(interfaces[0].dns_servers(), [ip("10.0.0.53")]);
    assert!(interfaces[1].unicast_ip_nets.is_empty());
    Ok(())
}

#[test]
fn test_enumerate_without_friendly_names() -> Result<()> {
    let host = lab_host();
    let opts = EnumerateOptions::new().skip_friendly_name(true).skip_dns_server(true);
    let interfaces = host.interfaces_with(&opts)?;
    assert!(interfaces.iter().all(|ifc| ifc.friendly_name.is_empty()));
    assert!(interfaces.iter().all(|ifc| ifc.dns_server_addresses.is_empty()));
    Ok(())
}

#[test]
fn test_no_adapters_is_empty() -> Result<()> {
    let host = Host::new(MemoryIpHelper::new(), RecordingRunner::new());
    assert!(host.interfaces()?.is_empty());
    Ok(())
}

#[test]
fn test_buffer_grows_on_overflow() -> Result<()> {
    let mut host_ifcs = Vec::new();
    for i in 0..80u32 {
        let mut ifc = ethernet();
        ifc.luid = Luid(u64::from(i) << 24);
        ifc.index = i + 1;
        ifc.ipv6_if_index = i + 1;
        ifc.friendly_name = format!("Ethernet {i}");
        ifc.description = "x".repeat(200);
        host_ifcs.push(ifc);
    }
    let helper = MemoryIpHelper::new();
    for ifc in host_ifcs {
        helper.add_interface(ifc);
    }
    let host = Host::new(helper, RecordingRunner::new());

    let interfaces = host.interfaces()?;
    assert_eq!(interfaces.len(), 80);
    assert_eq!(interfaces[79].friendly_name, "Ethernet 79");

    let attempts = host
        .helper()
        .calls()
        .iter()
        .filter(|c| c.starts_with("adapter_addresses"))
        .count();
    assert_eq!(attempts, 2);
    Ok(())
}

#[test]
fn test_buffer_growth_gives_up() {
    let host = lab_host();
    host.helper().always_overflow(true);

    let err = host.interfaces().unwrap_err();
    assert_eq!(err.status(), Some(status::ERROR_BUFFER_OVERFLOW));
    assert_eq!(host.helper().calls().len(), 4);
}

#[test]
fn test_enumeration_failure_propagates() {
    let host = lab_host();
    host.helper().fail(Op::Enumerate, None, status::ERROR_ACCESS_DENIED);
    assert!(host.interfaces().unwrap_err().is_access_denied());
}

// Legacy records are only recognisable on 64-bit targets.
#[test]
#[cfg(target_pointer_width = "64")]
fn test_legacy_records() -> Result<()> {
    let host = Host::new(
        MemoryIpHelper::new().with_interface(ethernet()).with_legacy_records(),
        RecordingRunner::new(),
    );
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    assert_eq!(eth.unicast_ip_nets, [net("10.0.0.1/32"), net("fe80::1/128")]);
    Ok(())
}

#[test]
fn test_lookups() -> Result<()> {
    let host = lab_host();

    assert_eq!(host.interface_by_luid(WIFI_LUID)?.friendly_name, "Wi-Fi");
    assert_eq!(host.interface_by_index(12)?.luid, ETHERNET_LUID);
    assert_eq!(host.interface_by_index(17)?.luid, WIFI_LUID);
    assert_eq!(host.interface_by_friendly_name("Wi-Fi")?.luid, WIFI_LUID);
    assert_eq!(host.interface_by_guid(&ethernet_guid())?.luid, ETHERNET_LUID);
    Ok(())
}

#[test]
fn test_lookup_misses() {
    let host = lab_host();

    let err = host.interface_by_friendly_name("Ethernet 2").unwrap_err();
    assert!(matches!(err, Error::InterfaceNotFound { .. }));
    assert!(err.to_string().contains("Ethernet 2"));

    assert!(matches!(
        host.interface_by_luid(Luid(1)).unwrap_err(),
        Error::InterfaceNotFound { .. }
    ));
    assert!(matches!(
        host.interface_by_index(99).unwrap_err(),
        Error::InterfaceNotFound { .. }
    ));
    assert!(matches!(
        host.interface_by_guid(&ipcfg::Guid::default()).unwrap_err(),
        Error::InterfaceNotFound { .. }
    ));
}
