//! Tool-driven integration tests: DNS servers and adapter administration.

use ipcfg::{AdminStatus, Error, Result};

use crate::common::*;

const ETHERNET_STATUS: &str = "
Ethernet
   Type:                 Dedicated
   Administrative state: Enabled
   Connect state:        Connected
";

#[test]
fn test_set_dns_single_invocation() -> Result<()> {
    let host = lab_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;

    host.set_dns(&eth, &[ip("1.1.1.1"), ip("2606:4700:4700::1111"), ip("::ffff:8.8.8.8")])?;

    assert_eq!(host.runner().runs(), 1);
    assert_eq!(
        host.runner().scripts()[0],
        [
            "interface ipv4 set dnsservers name=12 source=static address=none validate=no register=both",
            "interface ipv6 set dnsservers name=12 source=static address=none validate=no register=both",
            "interface ipv4 add dnsservers name=12 address=1.1.1.1 validate=no",
            "interface ipv6 add dnsservers name=12 address=2606:4700:4700::1111 validate=no",
            "interface ipv4 add dnsservers name=12 address=8.8.8.8 validate=no",
        ]
    );
    Ok(())
}

#[test]
fn test_set_dns_uses_ipv6_index() -> Result<()> {
    let host = lab_host();
    let wifi = host.interface_by_luid(WIFI_LUID)?;

    host.set_dns(&wifi, &[ip("2001:db8::53")])?;
    assert_eq!(
        host.runner().scripts()[0][2],
        "interface ipv6 add dnsservers name=17 address=2001:db8::53 validate=no"
    );
    Ok(())
}

#[test]
fn test_flush_dns_tolerates_notice() -> Result<()> {
    let host = lab_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.runner()
        .reply("\r\nThere are no Domain Name Servers (DNS) configured on this computer.\r\n");

    host.flush_dns(&eth)?;
    assert_eq!(host.runner().scripts()[0].len(), 2);
    Ok(())
}

#[test]
fn test_add_dns_empty_is_noop() -> Result<()> {
    let host = lab_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.add_dns(&eth, &[])?;
    assert_eq!(host.runner().runs(), 0);
    Ok(())
}

#[test]
fn test_dns_residual_output_is_error() -> Result<()> {
    let host = lab_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.runner().reply("The configured DNS server is incorrect or does not exist.");

    let err = host.set_dns(&eth, &[ip("10.0.0.53")]).unwrap_err();
    let Error::Tool { input, output } = &err else {
        panic!("expected a tool error, got {err:?}");
    };
    assert!(input.ends_with("exit\r\n"));
    assert!(input.contains("address=10.0.0.53"));
    assert!(output.contains("does not exist"));
    Ok(())
}

#[test]
fn test_dns_exit_status_is_error() -> Result<()> {
    let host = lab_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.runner().reply_status("", 1);

    let err = host.add_dns(&eth, &[ip("10.0.0.53")]).unwrap_err();
    assert!(matches!(err, Error::ToolExit { status: 1, .. }));
    Ok(())
}

#[test]
fn test_admin_state() -> Result<()> {
    let host = lab_host();
    host.set_admin_state("Ethernet", false)?;
    host.set_admin_state("Ethernet", true)?;

    let scripts = host.runner().scripts();
    assert_eq!(scripts[0], ["interface set interface name=\"Ethernet\" admin=disable"]);
    assert_eq!(scripts[1], ["interface set interface name=\"Ethernet\" admin=enable"]);
    Ok(())
}

#[test]
fn test_admin_status() -> Result<()> {
    let host = lab_host();
    host.runner()
        .reply(ETHERNET_STATUS)
        .reply("管理状态: 已禁用\r\n连接状态: 已断开连接\r\n")
        .reply("Ethernet 2 is not a valid interface name.");

    assert_eq!(host.admin_status("Ethernet")?, AdminStatus::Connected);
    assert_eq!(host.admin_status("以太网")?, AdminStatus::Disabled);
    assert_eq!(host.admin_status("Ethernet 2")?, AdminStatus::Unknown);
    assert_eq!(
        host.runner().scripts()[0],
        ["interface show interface name=\"Ethernet\""]
    );
    Ok(())
}

#[test]
fn test_rename() -> Result<()> {
    let host = lab_host();
    host.rename("Ethernet", "Uplink")?;
    assert_eq!(
        host.runner().scripts()[0],
        ["interface set interface name=\"Ethernet\" newname=\"Uplink\""]
    );

    assert!(matches!(host.rename("Ethernet", "bad\"name"), Err(Error::Parse(_))));
    assert_eq!(host.runner().runs(), 1);
    Ok(())
}

#[test]
fn test_run_script_strips_prompts() -> Result<()> {
    let host = lab_host();
    host.runner().reply("\r\nOk.\r\n");

    let out = host.run_script(&["interface ipv4 show config".to_string()])?;
    assert_eq!(out.trim(), "Ok.");
    assert!(!out.contains("netsh>"));
    Ok(())
}
