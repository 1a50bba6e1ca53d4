//! Configuration application logic.
//!
//! This module applies a computed diff to bring an interface to its
//! desired state.

use super::diff::{ConfigDiff, dns_list};
use super::types::InterfaceConfig;
use crate::command::CommandRunner;
use crate::error::{BatchError, OperationError, Result};
use crate::helper::{IpHelper, RouteRow};
use crate::host::Host;
use crate::interface::Interface;
use crate::route::RouteData;
use crate::types::AddressFamily;

/// Options for applying configuration.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Don't actually make changes, just compute what would be done.
    pub dry_run: bool,
    /// Continue applying changes even if some operations fail.
    pub continue_on_error: bool,
}

/// Result of applying configuration.
#[derive(Debug, Default)]
pub struct ApplyResult {
    /// Number of changes made (or that would be made in dry-run mode).
    pub changes_made: usize,
    /// Errors that occurred during application (when continue_on_error is true).
    pub errors: Vec<OperationError>,
    /// Summary of what was done.
    pub summary: Vec<String>,
}

impl ApplyResult {
    /// Check if the application was fully successful.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get a human-readable summary.
    pub fn summary_text(&self) -> String {
        if self.summary.is_empty() {
            "No changes made".to_string()
        } else {
            self.summary.join("\n")
        }
    }

    /// Collapse into the number of changes, or the collected failures.
    pub fn into_result(self) -> Result<usize> {
        let mut errors = BatchError::new();
        for e in self.errors {
            errors.push(e.operation, e.error);
        }
        errors.into_result().map(|()| self.changes_made)
    }

    fn record(
        &mut self,
        options: &ApplyOptions,
        op: String,
        done: String,
        run: impl FnOnce() -> Result<()>,
    ) -> Result<bool> {
        if options.dry_run {
            self.summary.push(format!("Would {op}"));
            self.changes_made += 1;
            return Ok(true);
        }
        match run() {
            Ok(()) => {
                self.summary.push(done);
                self.changes_made += 1;
                Ok(true)
            }
            Err(e) if options.continue_on_error => {
                tracing::warn!(operation = %op, error = %e, "config change failed");
                self.errors.push(OperationError {
                    operation: op,
                    error: e,
                });
                Ok(false)
            }
            Err(e) => Err(e.with_context(op)),
        }
    }
}

impl<H: IpHelper, R: CommandRunner> Host<H, R> {
    /// The interface's live routes of both families.
    pub fn current_routes(&self, ifc: &Interface) -> Result<Vec<RouteData>> {
        Ok(self
            .routes(ifc, AddressFamily::Unspec)?
            .iter()
            .map(RouteRow::to_route_data)
            .collect())
    }

    /// Compute the changes that bring `ifc` to `config`, reading routes live.
    pub fn diff_config(&self, ifc: &Interface, config: &InterfaceConfig) -> Result<ConfigDiff> {
        let routes = self.current_routes(ifc)?;
        Ok(config.diff(ifc, &routes))
    }

    /// Bring `ifc` to `config`.
    ///
    /// Changes run in this order:
    /// 1. Remove routes
    /// 2. Remove addresses
    /// 3. Add addresses
    /// 4. Add routes
    /// 5. Replace DNS servers
    ///
    /// # Example
    ///
    /// ```ignore
    /// // Dry run first
    /// let result = host.apply_config(&mut ifc, &config, ApplyOptions {
    ///     dry_run: true,
    ///     ..Default::default()
    /// })?;
    /// println!("Would make {} changes", result.changes_made);
    /// ```
    pub fn apply_config(
        &self,
        ifc: &mut Interface,
        config: &InterfaceConfig,
        options: ApplyOptions,
    ) -> Result<ApplyResult> {
        let diff = self.diff_config(ifc, config)?;
        self.apply_diff(ifc, &diff, options)
    }

    /// Apply a pre-computed diff.
    ///
    /// Successful address changes are reflected in
    /// [`Interface::unicast_ip_nets`].
    pub fn apply_diff(
        &self,
        ifc: &mut Interface,
        diff: &ConfigDiff,
        options: ApplyOptions,
    ) -> Result<ApplyResult> {
        let mut result = ApplyResult::default();

        if diff.is_empty() {
            return Ok(result);
        }

        // 1. Remove routes
        for route in &diff.routes_to_remove {
            result.record(
                &options,
                format!("remove route {route}"),
                format!("Removed route {route}"),
                || self.delete_route(ifc, route.destination, route.next_hop_addr()),
            )?;
        }

        // 2. Remove addresses
        for net in &diff.addresses_to_remove {
            let removed = result.record(
                &options,
                format!("remove address {net}"),
                format!("Removed address {net}"),
                || self.delete_address(ifc, net.addr()),
            )?;
            if removed && !options.dry_run {
                ifc.unicast_ip_nets.retain(|n| n != net);
            }
        }

        // 3. Add addresses
        for net in &diff.addresses_to_add {
            let added = result.record(
                &options,
                format!("add address {net}"),
                format!("Added address {net}"),
                || self.add_address(ifc, *net),
            )?;
            if added && !options.dry_run {
                ifc.unicast_ip_nets.push(*net);
            }
        }

        // 4. Add routes
        for route in &diff.routes_to_add {
            result.record(
                &options,
                format!("add route {route}"),
                format!("Added route {route}"),
                || self.add_route(ifc, route),
            )?;
        }

        // 5. DNS
        if let Some(servers) = &diff.dns_to_set {
            let list = dns_list(servers);
            result.record(
                &options,
                format!("set dns {list}"),
                format!("Set dns {list}"),
                || self.set_dns(ifc, servers),
            )?;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, status};

    #[test]
    fn test_summary_text() {
        let mut result = ApplyResult::default();
        assert!(result.is_success());
        assert_eq!(result.summary_text(), "No changes made");

        result.summary.push("Added address 10.0.0.2/24".into());
        result.summary.push("Set dns (none)".into());
        assert_eq!(result.summary_text(), "Added address 10.0.0.2/24\nSet dns (none)");
    }

    #[test]
    fn test_record_dry_run_skips_work() {
        let mut result = ApplyResult::default();
        let options = ApplyOptions {
            dry_run: true,
            ..Default::default()
        };
        let ran = std::cell::Cell::new(false);
        let done = result
            .record(&options, "add address 10.0.0.2/24".into(), "Added".into(), || {
                ran.set(true);
                Ok(())
            })
            .unwrap();
        assert!(done);
        assert!(!ran.get());
        assert_eq!(result.summary, ["Would add address 10.0.0.2/24"]);
        assert_eq!(result.changes_made, 1);
    }

    #[test]
    fn test_record_failure_modes() {
        let fail = || Err(Error::from_status(status::ERROR_ACCESS_DENIED));

        let mut result = ApplyResult::default();
        let err = result
            .record(&ApplyOptions::default(), "remove route x".into(), "Removed".into(), fail)
            .unwrap_err();
        assert!(err.is_access_denied());
        assert!(err.to_string().contains("remove route x"));

        let keep_going = ApplyOptions {
            continue_on_error: true,
            ..Default::default()
        };
        assert!(!result.record(&keep_going, "remove route y".into(), "Removed".into(), fail).unwrap());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].operation, "remove route y");
        assert_eq!(result.changes_made, 0);
    }
}
