//! Unicast address reconciliation and per-interface address operations.

use std::net::IpAddr;

use crate::command::CommandRunner;
use crate::error::{BatchError, Error, Result};
use crate::helper::{IpHelper, UnicastRow};
use crate::host::Host;
use crate::interface::Interface;
use crate::net::IpNet;
use crate::reconcile::{self, Delta};
use crate::types::AddressFamily;

pub use crate::net::compare_nets;

/// Sort into canonical order.
pub fn sort_nets(nets: &mut [IpNet]) {
    nets.sort_by(compare_nets);
}

/// Changes turning `current` into `desired`.
///
/// IPv6 link-local addresses are never scheduled for deletion; the host
/// assigns them and they survive any desired set.
pub fn address_delta(current: &[IpNet], desired: &[IpNet]) -> Delta<IpNet> {
    let mut current = current.to_vec();
    let mut desired = desired.to_vec();
    sort_nets(&mut current);
    sort_nets(&mut desired);

    let mut delta = reconcile::merge(&current, &desired, compare_nets);
    delta.retain_deletes(|net| {
        if net.is_ipv6_link_local() {
            tracing::warn!(address = %net, "keeping IPv6 link-local address");
            false
        } else {
            true
        }
    });
    delta
}

impl<H: IpHelper, R: CommandRunner> Host<H, R> {
    /// The unicast address row for `ip` on this interface.
    pub fn unicast_address_row(&self, ifc: &Interface, ip: IpAddr) -> Result<UnicastRow> {
        self.helper().unicast_address(ifc.luid, ip).map_err(|e| {
            if e.is_not_found() {
                Error::AddressNotFound {
                    address: ip.to_string(),
                }
            } else {
                e
            }
        })
    }

    /// Delete every unicast address on the interface, stopping at the first failure.
    pub fn flush_addresses(&self, ifc: &Interface) -> Result<()> {
        let rows = self.helper().unicast_addresses(AddressFamily::Unspec)?;
        for row in rows.iter().filter(|r| r.interface_luid == ifc.luid) {
            self.helper()
                .delete_unicast_address(row)
                .map_err(|e| e.with_context(format!("deleting {}", row.ip_net())))?;
            tracing::info!(interface = ifc.index, address = %row.ip_net(), "address deleted");
        }
        Ok(())
    }

    /// Add one unicast address.
    pub fn add_address(&self, ifc: &Interface, net: IpNet) -> Result<()> {
        let mut row = UnicastRow::new(ifc.luid, net);
        row.interface_index = ifc.index;
        self.helper().create_unicast_address(&row)?;
        tracing::info!(interface = ifc.index, address = %net, "address added");
        Ok(())
    }

    /// Add several addresses, attempting every one.
    ///
    /// A single failure is returned as is; several are combined into
    /// [`Error::Batch`].
    pub fn add_addresses(&self, ifc: &Interface, nets: &[IpNet]) -> Result<()> {
        let mut errors = BatchError::new();
        for net in nets {
            if let Err(e) = self.add_address(ifc, *net) {
                tracing::warn!(interface = ifc.index, address = %net, error = %e, "add failed");
                errors.push(format!("adding {net}"), e);
            }
        }
        errors.into_result()
    }

    /// Replace all addresses: flush, then add. Nothing is added if the flush fails.
    pub fn set_addresses(&self, ifc: &Interface, nets: &[IpNet]) -> Result<()> {
        self.flush_addresses(ifc)?;
        self.add_addresses(ifc, nets)
    }

    /// Incrementally converge the interface's addresses on `want`.
    ///
    /// Only the differences against [`Interface::unicast_ip_nets`] are
    /// applied, deletes first. Every operation is attempted; the last
    /// failure is returned. Afterwards `unicast_ip_nets` holds `want`, on
    /// the assumption that nothing else changed the interface meanwhile.
    pub fn sync_addresses(&self, ifc: &mut Interface, want: &[IpNet]) -> Result<()> {
        let delta = address_delta(&ifc.unicast_ip_nets, want);
        tracing::debug!(
            interface = ifc.index,
            add = delta.add.len(),
            delete = delta.delete.len(),
            "address sync"
        );

        let mut last_err = None;
        for net in &delta.delete {
            if let Err(e) = self.delete_address(ifc, net.addr()) {
                tracing::warn!(interface = ifc.index, address = %net, error = %e, "delete failed");
                last_err = Some(e);
            }
        }
        for net in &delta.add {
            if let Err(e) = self.add_address(ifc, *net) {
                tracing::warn!(interface = ifc.index, address = %net, error = %e, "add failed");
                last_err = Some(e);
            }
        }

        ifc.unicast_ip_nets = want.to_vec();
        match last_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Delete one unicast address.
    pub fn delete_address(&self, ifc: &Interface, ip: IpAddr) -> Result<()> {
        let row = self.unicast_address_row(ifc, ip)?;
        self.helper().delete_unicast_address(&row)?;
        tracing::info!(interface = ifc.index, address = %row.ip_net(), "address deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nets(list: &[&str]) -> Vec<IpNet> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_order_prefers_longer_prefix() {
        let mut v = nets(&["10.0.0.1/8", "10.0.0.1/24", "10.0.0.0/24", "10.0.0.1/16"]);
        sort_nets(&mut v);
        let got: Vec<String> = v.iter().map(|n| n.to_string()).collect();
        assert_eq!(got, ["10.0.0.0/24", "10.0.0.1/24", "10.0.0.1/16", "10.0.0.1/8"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut once = nets(&["fe80::1/64", "192.168.0.1/24", "2001:db8::1/64", "10.0.0.1/8"]);
        sort_nets(&mut once);
        let mut twice = once.clone();
        sort_nets(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_same_set_is_empty() {
        let s = nets(&["10.0.0.1/24", "2001:db8::5/64", "192.168.7.7/32"]);
        let mut shuffled = s.clone();
        shuffled.reverse();
        assert!(address_delta(&s, &shuffled).is_empty());
    }

    #[test]
    fn test_link_local_kept() {
        let current = nets(&["10.0.0.1/24", "fe80::1/64"]);
        let desired = nets(&["10.0.0.2/24"]);
        let delta = address_delta(&current, &desired);
        assert_eq!(delta.add, nets(&["10.0.0.2/24"]));
        assert_eq!(delta.delete, nets(&["10.0.0.1/24"]));
    }

    #[test]
    fn test_prefix_change_is_delete_and_add() {
        let delta = address_delta(&nets(&["10.0.0.1/24"]), &nets(&["10.0.0.1/16"]));
        assert_eq!(delta.add, nets(&["10.0.0.1/16"]));
        assert_eq!(delta.delete, nets(&["10.0.0.1/24"]));
    }

    #[test]
    fn test_mapped_address_matches_ipv4() {
        let delta = address_delta(&nets(&["::ffff:10.0.0.1/120"]), &nets(&["10.0.0.1/24"]));
        assert!(delta.is_empty());
    }

    #[test]
    fn test_applying_delta_reaches_desired() {
        let current = nets(&["10.0.0.1/24", "10.0.0.3/24", "fe80::9/64", "2001:db8::1/64"]);
        let desired = nets(&["10.0.0.3/24", "10.0.0.4/24", "2001:db8::2/64"]);
        let delta = address_delta(&current, &desired);

        let mut state = current.clone();
        state.retain(|n| !delta.delete.contains(n));
        state.extend(delta.add.iter().copied());
        sort_nets(&mut state);

        let mut expected = desired.clone();
        expected.push("fe80::9/64".parse().unwrap());
        sort_nets(&mut expected);
        assert_eq!(state, expected);
    }
}
