//! Route integration tests.

use ipcfg::error::status;
use ipcfg::lab::{MemoryIpHelper, Op, RecordingRunner};
use ipcfg::route::sort_routes;
use ipcfg::{AddressFamily, Error, Host, Result, RouteData};

use crate::common::*;

fn route(s: &str) -> RouteData {
    s.parse().unwrap()
}

/// The lab host with a default route and a connected route on Ethernet and
/// an IPv6 default route on Wi-Fi.
fn routed_host() -> LabHost {
    Host::new(
        MemoryIpHelper::new()
            .with_interface(ethernet())
            .with_interface(wifi())
            .with_route(ETHERNET_LUID, route("0.0.0.0/0 via 10.0.0.254 metric 25"))
            .with_route(ETHERNET_LUID, route("10.0.0.0/24 metric 256"))
            .with_route(WIFI_LUID, route("::/0 via fe80::1 metric 50")),
        RecordingRunner::new(),
    )
}

#[test]
fn test_routes_filtered_by_interface() -> Result<()> {
    let host = routed_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;

    let rows = host.routes(&eth, AddressFamily::Unspec)?;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.interface_luid == ETHERNET_LUID));
    assert_eq!(rows[0].interface_index, 12);

    assert!(host.routes(&eth, AddressFamily::Inet6)?.is_empty());
    Ok(())
}

#[test]
fn test_route_lookup() -> Result<()> {
    let host = routed_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;

    let row = host.route(&eth, net("0.0.0.0/0"), ip("10.0.0.254"))?;
    assert_eq!(row.metric, 25);
    assert_eq!(row.to_route_data(), route("0.0.0.0/0 via 10.0.0.254 metric 25"));

    // On-link routes are keyed by the unspecified next hop.
    let row = host.route(&eth, net("10.0.0.0/24"), ip("0.0.0.0"))?;
    assert_eq!(row.to_route_data().next_hop, None);

    let err = host.route(&eth, net("0.0.0.0/0"), ip("10.0.0.1")).unwrap_err();
    assert!(matches!(err, Error::RouteNotFound { .. }));
    Ok(())
}

#[test]
fn test_add_and_delete_route() -> Result<()> {
    let host = routed_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;

    host.add_route(&eth, &route("172.16.0.0/12 via 10.0.0.1 metric 5"))?;
    assert!(
        host.helper()
            .routes_of(ETHERNET_LUID)
            .contains(&route("172.16.0.0/12 via 10.0.0.1 metric 5"))
    );
    assert!(
        host.add_route(&eth, &route("172.16.0.0/12 via 10.0.0.1 metric 9"))
            .unwrap_err()
            .is_already_exists()
    );

    host.delete_route(&eth, net("172.16.0.0/12"), ip("10.0.0.1"))?;
    assert_eq!(host.helper().routes_of(ETHERNET_LUID).len(), 2);
    assert!(
        host.delete_route(&eth, net("172.16.0.0/12"), ip("10.0.0.1"))
            .unwrap_err()
            .is_not_found()
    );
    Ok(())
}

#[test]
fn test_add_many_routes_aggregates() -> Result<()> {
    let host = routed_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().fail(Op::CreateRoute, None, status::ERROR_ACCESS_DENIED);

    let err = host
        .add_routes(&eth, &[route("10.1.0.0/16 via 10.0.0.1"), route("10.2.0.0/16 via 10.0.0.1")])
        .unwrap_err();
    let Error::Batch(batch) = err else {
        panic!("expected a batch error");
    };
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.errors()[0].operation, "adding route 10.1.0.0/16 via 10.0.0.1 metric 0");
    Ok(())
}

#[test]
fn test_set_routes() -> Result<()> {
    let host = routed_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;

    host.set_routes(&eth, &[route("0.0.0.0/0 via 10.0.0.1 metric 10")])?;
    assert_eq!(
        host.helper().routes_of(ETHERNET_LUID),
        [route("0.0.0.0/0 via 10.0.0.1 metric 10")]
    );
    assert_eq!(host.helper().routes_of(WIFI_LUID).len(), 1);
    Ok(())
}

#[test]
fn test_sync_routes() -> Result<()> {
    let host = routed_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().clear_calls();

    host.sync_routes(
        &eth,
        &[
            route("10.0.0.0/24 metric 256"),
            route("0.0.0.0/0 via 10.0.0.1 metric 25"),
            route("2001:db8::/32 via fe80::1"),
        ],
    )?;

    assert_eq!(
        host.helper().calls(),
        [
            "routes unspec",
            "delete_route 0.0.0.0/0 via 10.0.0.254 metric 25",
            "create_route 0.0.0.0/0 via 10.0.0.1 metric 25",
            "create_route 2001:db8::/32 via fe80::1 metric 0",
        ]
    );
    Ok(())
}

#[test]
fn test_sync_ipv4_routes_keeps_ipv6_system_routes() -> Result<()> {
    let host = Host::new(
        MemoryIpHelper::new()
            .with_interface(ethernet())
            .with_route(ETHERNET_LUID, route("0.0.0.0/0 via 10.0.0.254 metric 25"))
            .with_route(ETHERNET_LUID, route("fe80::/64 metric 256"))
            .with_route(ETHERNET_LUID, route("ff00::/8 metric 256")),
        RecordingRunner::new(),
    );
    let eth = host.interface_by_luid(ETHERNET_LUID)?;

    host.sync_routes(&eth, &[route("0.0.0.0/0 via 10.0.0.254 metric 25")])?;
    assert_eq!(
        host.helper().routes_of(ETHERNET_LUID),
        [
            route("0.0.0.0/0 via 10.0.0.254 metric 25"),
            route("fe80::/64 metric 256"),
            route("ff00::/8 metric 256"),
        ]
    );
    Ok(())
}

#[test]
fn test_sync_routes_mixed_families() -> Result<()> {
    let host = Host::new(
        MemoryIpHelper::new()
            .with_interface(ethernet())
            .with_route(ETHERNET_LUID, route("0.0.0.0/0 via 10.0.0.254 metric 25"))
            .with_route(ETHERNET_LUID, route("10.0.0.0/24 metric 256"))
            .with_route(ETHERNET_LUID, route("::/0 via fe80::1 metric 50"))
            .with_route(ETHERNET_LUID, route("fe80::/64 metric 256")),
        RecordingRunner::new(),
    );
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().clear_calls();

    host.sync_routes(
        &eth,
        &[route("0.0.0.0/0 via 10.0.0.254 metric 25"), route("::/0 via fe80::2 metric 50")],
    )?;

    // The IPv6 default is replaced; the connected IPv4 route goes; the
    // link-local IPv6 route is not part of the diff.
    assert_eq!(
        host.helper().calls(),
        [
            "routes unspec",
            "delete_route ::/0 via fe80::1 metric 50",
            "delete_route 10.0.0.0/24 metric 256",
            "create_route ::/0 via fe80::2 metric 50",
        ]
    );
    let mut remaining = host.helper().routes_of(ETHERNET_LUID);
    sort_routes(&mut remaining);
    assert_eq!(
        remaining,
        [
            route("0.0.0.0/0 via 10.0.0.254 metric 25"),
            route("::/0 via fe80::2 metric 50"),
            route("fe80::/64 metric 256"),
        ]
    );
    Ok(())
}

#[test]
fn test_sync_routes_metric_change() -> Result<()> {
    let host = routed_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().clear_calls();

    host.sync_routes(
        &eth,
        &[route("0.0.0.0/0 via 10.0.0.254 metric 5"), route("10.0.0.0/24 metric 256")],
    )?;
    assert_eq!(
        host.helper().routes_of(ETHERNET_LUID),
        [route("10.0.0.0/24 metric 256"), route("0.0.0.0/0 via 10.0.0.254 metric 5")]
    );
    Ok(())
}

#[test]
fn test_sync_routes_returns_last_error() -> Result<()> {
    let host = routed_host();
    let eth = host.interface_by_luid(ETHERNET_LUID)?;
    host.helper().fail(Op::DeleteRoute, Some("0.0.0.0/0"), status::ERROR_ACCESS_DENIED);

    let err = host
        .sync_routes(&eth, &[route("10.9.0.0/16 via 10.0.0.1")])
        .unwrap_err();
    assert!(err.is_access_denied());

    // The connected route was still removed and the new one added.
    assert_eq!(
        host.helper().routes_of(ETHERNET_LUID),
        [route("0.0.0.0/0 via 10.0.0.254 metric 25"), route("10.9.0.0/16 via 10.0.0.1")]
    );
    Ok(())
}

#[test]
fn test_flush_routes() -> Result<()> {
    let host = routed_host();
    let wifi = host.interface_by_luid(WIFI_LUID)?;

    host.flush_routes(&wifi)?;
    assert!(host.helper().routes_of(WIFI_LUID).is_empty());
    assert_eq!(host.helper().routes_of(ETHERNET_LUID).len(), 2);
    Ok(())
}
