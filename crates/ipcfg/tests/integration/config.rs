//! Declarative configuration integration tests.

use ipcfg::config::{ApplyOptions, InterfaceConfig};
use ipcfg::error::status;
use ipcfg::lab::{MemoryIpHelper, Op, RecordingRunner};
use ipcfg::{Host, Result, RouteData};

use crate::common::*;

fn routed_host() -> LabHost {
    Host::new(
        MemoryIpHelper::new()
            .with_interface(ethernet())
            .with_route(ETHERNET_LUID, "0.0.0.0/0 via 10.0.0.254 metric 25".parse().unwrap()),
        RecordingRunner::new(),
    )
}

fn desired() -> Result<InterfaceConfig> {
    Ok(InterfaceConfig::new()
        .address("10.0.0.2/24")?
        .route("0.0.0.0/0", |r| r.via("10.0.0.1").metric(25))?
        .dns("10.0.0.53")?)
}

#[test]
fn test_diff_against_live_state() -> Result<()> {
    let host = routed_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;

    let diff = host.diff_config(&eth, &desired()?)?;
    assert_eq!(diff.addresses_to_add, [net("10.0.0.2/24")]);
    assert_eq!(diff.addresses_to_remove, [net("10.0.0.1/24")]);
    assert_eq!(diff.routes_to_remove.len(), 1);
    assert_eq!(diff.routes_to_add.len(), 1);
    // The IPv6 server is not listed, so DNS is rewritten.
    assert_eq!(diff.dns_to_set, Some(vec![ip("10.0.0.53")]));
    assert_eq!(diff.change_count(), 5);
    Ok(())
}

#[test]
fn test_diff_leaves_ipv6_system_routes() -> Result<()> {
    let host = Host::new(
        MemoryIpHelper::new()
            .with_interface(ethernet())
            .with_route(ETHERNET_LUID, "0.0.0.0/0 via 10.0.0.254 metric 25".parse().unwrap())
            .with_route(ETHERNET_LUID, "fe80::/64 metric 256".parse().unwrap())
            .with_route(ETHERNET_LUID, "ff00::/8 metric 256".parse().unwrap()),
        RecordingRunner::new(),
    );
    let eth = host.interface_by_luid(ETHERNET_LUID)?;

    let diff = host.diff_config(&eth, &desired()?)?;
    assert_eq!(
        diff.routes_to_remove,
        ["0.0.0.0/0 via 10.0.0.254 metric 25".parse::<RouteData>().unwrap()]
    );
    assert_eq!(diff.routes_to_add.len(), 1);
    Ok(())
}

#[test]
fn test_apply_config() -> Result<()> {
    let host = routed_host();
    let mut eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().clear_calls();

    let result = host.apply_config(&mut eth, &desired()?, ApplyOptions::default())?;
    assert!(result.is_success());
    assert_eq!(result.changes_made, 5);
    assert_eq!(
        result.summary,
        [
            "Removed route 0.0.0.0/0 via 10.0.0.254 metric 25",
            "Removed address 10.0.0.1/24",
            "Added address 10.0.0.2/24",
            "Added route 0.0.0.0/0 via 10.0.0.1 metric 25",
            "Set dns 10.0.0.53",
        ]
    );

    assert_eq!(
        host.helper().addresses_of(ETHERNET_LUID),
        [net("fe80::1/64"), net("10.0.0.2/24")]
    );
    assert_eq!(
        host.helper().routes_of(ETHERNET_LUID),
        ["0.0.0.0/0 via 10.0.0.1 metric 25".parse::<RouteData>().unwrap()]
    );
    assert_eq!(host.runner().runs(), 1);
    assert_eq!(eth.unicast_ip_nets, [net("fe80::1/64"), net("10.0.0.2/24")]);
    Ok(())
}

#[test]
fn test_apply_is_idempotent() -> Result<()> {
    let host = routed_host();
    let mut eth = host.interface_by_luid(ETHERNET_LUID)?;
    let config = desired()?.no_dns();

    host.apply_config(&mut eth, &config, ApplyOptions::default())?;
    host.helper().clear_calls();

    let mut eth = host.interface_by_luid(ETHERNET_LUID)?;
    let diff = host.diff_config(&eth, &config)?;
    // The lab keeps the enumerated DNS list, so only DNS still differs.
    assert!(diff.addresses_to_add.is_empty());
    assert!(diff.addresses_to_remove.is_empty());
    assert!(diff.routes_to_add.is_empty());
    assert!(diff.routes_to_remove.is_empty());

    let unmanaged = InterfaceConfig::new().address("10.0.0.2/24")?.route("0.0.0.0/0", |r| {
        r.via("10.0.0.1").metric(25)
    })?;
    let result = host.apply_config(&mut eth, &unmanaged, ApplyOptions::default())?;
    assert_eq!(result.changes_made, 0);
    assert_eq!(result.summary_text(), "No changes made");
    assert!(
        !host
            .helper()
            .calls()
            .iter()
            .any(|c| c.starts_with("create") || c.starts_with("delete"))
    );
    Ok(())
}

#[test]
fn test_apply_dry_run() -> Result<()> {
    let host = routed_host();
    let mut eth = host.interface_by_luid(ETHERNET_LUID)?;
    let before = eth.clone();

    let options = ApplyOptions {
        dry_run: true,
        ..Default::default()
    };
    let result = host.apply_config(&mut eth, &desired()?, options)?;

    assert_eq!(result.changes_made, 5);
    assert!(result.summary.iter().all(|s| s.starts_with("Would ")));
    assert_eq!(result.summary[1], "Would remove address 10.0.0.1/24");
    assert_eq!(host.helper().addresses_of(ETHERNET_LUID).len(), 2);
    assert_eq!(host.helper().routes_of(ETHERNET_LUID).len(), 1);
    assert_eq!(host.runner().runs(), 0);
    assert_eq!(eth, before);
    Ok(())
}

#[test]
fn test_apply_stops_at_first_error() -> Result<()> {
    let host = routed_host();
    let mut eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().fail(Op::DeleteAddress, None, status::ERROR_ACCESS_DENIED);

    let err = host
        .apply_config(&mut eth, &desired()?, ApplyOptions::default())
        .unwrap_err();
    assert!(err.is_access_denied());
    assert!(err.to_string().contains("remove address 10.0.0.1/24"));
    // Nothing after the failed step ran.
    assert!(!host.helper().addresses_of(ETHERNET_LUID).contains(&net("10.0.0.2/24")));
    assert_eq!(host.runner().runs(), 0);
    Ok(())
}

#[test]
fn test_apply_continue_on_error() -> Result<()> {
    let host = routed_host();
    let mut eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().fail(Op::DeleteAddress, None, status::ERROR_ACCESS_DENIED);

    let options = ApplyOptions {
        continue_on_error: true,
        ..Default::default()
    };
    let result = host.apply_config(&mut eth, &desired()?, options)?;

    assert!(!result.is_success());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].operation, "remove address 10.0.0.1/24");
    assert_eq!(result.changes_made, 4);
    assert!(eth.unicast_ip_nets.contains(&net("10.0.0.1/24")));
    assert!(eth.unicast_ip_nets.contains(&net("10.0.0.2/24")));

    let err = result.into_result().unwrap_err();
    assert!(err.is_access_denied());
    Ok(())
}

#[test]
fn test_config_from_json() -> Result<()> {
    let json = r#"{
        "addresses": ["10.0.0.2/24"],
        "routes": [{"destination": "0.0.0.0/0", "next_hop": "10.0.0.1", "metric": 25}],
        "dns": ["10.0.0.53"]
    }"#;
    let config: InterfaceConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config, desired()?);

    let unknown = r#"{"addresses": [], "gateway": "10.0.0.1"}"#;
    assert!(serde_json::from_str::<InterfaceConfig>(unknown).is_err());
    Ok(())
}
