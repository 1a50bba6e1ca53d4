//! DNS server configuration through the external configuration tool.
//!
//! The host has no per-row call for DNS servers, so every change is a short
//! command script. Clearing and re-adding run in one invocation.

use std::net::IpAddr;

use crate::command::CommandRunner;
use crate::error::Result;
use crate::helper::IpHelper;
use crate::host::Host;
use crate::interface::Interface;

/// Commands clearing the static DNS servers of both families.
pub fn flush_commands(ifc: &Interface) -> Vec<String> {
    vec![
        format!(
            "interface ipv4 set dnsservers name={} source=static address=none validate=no register=both",
            ifc.index
        ),
        format!(
            "interface ipv6 set dnsservers name={} source=static address=none validate=no register=both",
            ifc.ipv6_if_index
        ),
    ]
}

/// Commands adding `servers`, each to its family's interface index.
///
/// IPv4-mapped IPv6 addresses are added as IPv4.
pub fn add_commands(ifc: &Interface, servers: &[IpAddr]) -> Vec<String> {
    servers
        .iter()
        .map(|server| match server.to_canonical() {
            IpAddr::V4(v4) => format!(
                "interface ipv4 add dnsservers name={} address={v4} validate=no",
                ifc.index
            ),
            IpAddr::V6(v6) => format!(
                "interface ipv6 add dnsservers name={} address={v6} validate=no",
                ifc.ipv6_if_index
            ),
        })
        .collect()
}

impl<H: IpHelper, R: CommandRunner> Host<H, R> {
    /// Remove every static DNS server from the interface.
    pub fn flush_dns(&self, ifc: &Interface) -> Result<()> {
        self.runner().run(&flush_commands(ifc))?.into_checked()?;
        tracing::info!(interface = ifc.index, "dns servers cleared");
        Ok(())
    }

    /// Append DNS servers, keeping the existing ones.
    pub fn add_dns(&self, ifc: &Interface, servers: &[IpAddr]) -> Result<()> {
        if servers.is_empty() {
            return Ok(());
        }
        self.runner().run(&add_commands(ifc, servers))?.into_checked()?;
        tracing::info!(interface = ifc.index, count = servers.len(), "dns servers added");
        Ok(())
    }

    /// Replace the DNS servers in a single tool invocation.
    pub fn set_dns(&self, ifc: &Interface, servers: &[IpAddr]) -> Result<()> {
        let mut commands = flush_commands(ifc);
        commands.extend(add_commands(ifc, servers));
        self.runner().run(&commands)?.into_checked()?;
        tracing::info!(interface = ifc.index, count = servers.len(), "dns servers set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ifc() -> Interface {
        Interface {
            index: 7,
            ipv6_if_index: 9,
            ..Default::default()
        }
    }

    #[test]
    fn test_flush_commands_cover_both_families() {
        let cmds = flush_commands(&ifc());
        assert_eq!(
            cmds,
            [
                "interface ipv4 set dnsservers name=7 source=static address=none validate=no register=both",
                "interface ipv6 set dnsservers name=9 source=static address=none validate=no register=both",
            ]
        );
    }

    #[test]
    fn test_add_commands_per_family() {
        let servers: Vec<IpAddr> = ["1.1.1.1", "2606:4700::1111", "::ffff:8.8.8.8"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let cmds = add_commands(&ifc(), &servers);
        assert_eq!(
            cmds,
            [
                "interface ipv4 add dnsservers name=7 address=1.1.1.1 validate=no",
                "interface ipv6 add dnsservers name=9 address=2606:4700::1111 validate=no",
                "interface ipv4 add dnsservers name=7 address=8.8.8.8 validate=no",
            ]
        );
    }

    #[test]
    fn test_add_commands_empty() {
        assert!(add_commands(&ifc(), &[]).is_empty());
    }
}
