//! Address integration tests.

use ipcfg::error::status;
use ipcfg::lab::Op;
use ipcfg::{Error, Result};

use crate::common::*;

#[test]
fn test_add_and_delete_address() -> Result<()> {
    let host = lab_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;

    host.add_address(&eth, net("10.0.0.2/24"))?;
    let row = host.unicast_address_row(&eth, ip("10.0.0.2"))?;
    assert_eq!(row.on_link_prefix_length, 24);
    assert_eq!(row.interface_index, 12);

    // Visible to the next enumeration.
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    assert!(eth.unicast_ip_nets.contains(&net("10.0.0.2/24")));

    host.delete_address(&eth, ip("10.0.0.2"))?;
    let err = host.unicast_address_row(&eth, ip("10.0.0.2")).unwrap_err();
    assert!(matches!(err, Error::AddressNotFound { .. }));
    Ok(())
}

#[test]
fn test_add_existing_address() -> Result<()> {
    let host = lab_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    assert!(host.add_address(&eth, net("10.0.0.1/24")).unwrap_err().is_already_exists());
    Ok(())
}

#[test]
fn test_flush_only_touches_interface() -> Result<()> {
    let host = lab_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;

    host.flush_addresses(&eth)?;
    assert!(host.helper().addresses_of(ETHERNET_LUID).is_empty());
    assert_eq!(host.helper().addresses_of(WIFI_LUID).len(), 2);
    Ok(())
}

#[test]
fn test_add_many_single_failure() -> Result<()> {
    let host = lab_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().fail(Op::CreateAddress, Some("10.0.0.3/24"), status::ERROR_ACCESS_DENIED);

    let err = host
        .add_addresses(&eth, &[net("10.0.0.2/24"), net("10.0.0.3/24"), net("10.0.0.4/24")])
        .unwrap_err();
    assert!(err.is_access_denied());
    assert!(err.to_string().contains("adding 10.0.0.3/24"));

    // The others went through.
    let nets = host.helper().addresses_of(ETHERNET_LUID);
    assert!(nets.contains(&net("10.0.0.2/24")));
    assert!(nets.contains(&net("10.0.0.4/24")));
    Ok(())
}

#[test]
fn test_add_many_aggregates_failures() -> Result<()> {
    let host = lab_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().fail(Op::CreateAddress, Some("10.0.0.3/24"), status::ERROR_ACCESS_DENIED);

    let err = host
        .add_addresses(&eth, &[net("10.0.0.1/24"), net("10.0.0.3/24"), net("10.0.0.4/24")])
        .unwrap_err();
    let Error::Batch(batch) = &err else {
        panic!("expected a batch error, got {err:?}");
    };
    assert_eq!(batch.len(), 2);
    assert!(batch.errors()[0].error.is_already_exists());
    assert!(batch.errors()[1].error.is_access_denied());

    let text = err.to_string();
    assert!(text.starts_with("2 errors: adding 10.0.0.1/24"));
    assert!(text.contains("adding 10.0.0.3/24"));
    Ok(())
}

#[test]
fn test_set_replaces_addresses() -> Result<()> {
    let host = lab_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;

    host.set_addresses(&eth, &[net("192.168.7.2/24")])?;
    assert_eq!(host.helper().addresses_of(ETHERNET_LUID), [net("192.168.7.2/24")]);
    Ok(())
}

#[test]
fn test_set_stops_when_flush_fails() -> Result<()> {
    let host = lab_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().fail(Op::DeleteAddress, Some("fe80::1/64"), status::ERROR_ACCESS_DENIED);
    host.helper().clear_calls();

    let err = host.set_addresses(&eth, &[net("192.168.7.2/24")]).unwrap_err();
    assert!(err.is_access_denied());
    assert!(
        !host
            .helper()
            .calls()
            .iter()
            .any(|c| c.starts_with("create_unicast_address"))
    );
    Ok(())
}

#[test]
fn test_sync_applies_minimal_changes() -> Result<()> {
    let host = lab_host();
    let mut eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().clear_calls();

    host.sync_addresses(&mut eth, &[net("10.0.0.2/24")])?;

    assert_eq!(
        host.helper().calls(),
        ["delete_unicast_address 10.0.0.1/24", "create_unicast_address 10.0.0.2/24"]
    );
    // The link-local address stays on the host.
    assert_eq!(
        host.helper().addresses_of(ETHERNET_LUID),
        [net("fe80::1/64"), net("10.0.0.2/24")]
    );
    assert_eq!(eth.unicast_ip_nets, [net("10.0.0.2/24")]);
    Ok(())
}

#[test]
fn test_sync_same_set_is_noop() -> Result<()> {
    let host = lab_host();
    let mut eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().clear_calls();

    let same = eth.unicast_ip_nets.clone();
    host.sync_addresses(&mut eth, &same)?;
    assert!(host.helper().calls().is_empty());
    Ok(())
}

#[test]
fn test_sync_continues_and_returns_last_error() -> Result<()> {
    let host = lab_host();
    let mut eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().fail(Op::DeleteAddress, None, status::ERROR_ACCESS_DENIED);
    host.helper().fail(Op::CreateAddress, Some("10.0.0.3/24"), status::ERROR_INVALID_PARAMETER);

    let want = [net("10.0.0.2/24"), net("10.0.0.3/24"), net("10.0.0.4/24")];
    let err = host.sync_addresses(&mut eth, &want).unwrap_err();
    assert_eq!(err.status(), Some(status::ERROR_INVALID_PARAMETER));

    let nets = host.helper().addresses_of(ETHERNET_LUID);
    assert!(nets.contains(&net("10.0.0.1/24")));
    assert!(nets.contains(&net("10.0.0.2/24")));
    assert!(nets.contains(&net("10.0.0.4/24")));
    assert_eq!(eth.unicast_ip_nets, want);
    Ok(())
}
