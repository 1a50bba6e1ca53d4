//! ipcfg dns command implementation.

use std::net::IpAddr;

use clap::Args;
use ipcfg::{CommandRunner, Host, IpHelper};

#[derive(Args)]
pub struct DnsCmd {
    /// Interface friendly name.
    name: String,

    /// DNS servers in preference order (none clears the list).
    servers: Vec<IpAddr>,

    /// Append to the existing servers instead of replacing them.
    #[arg(long)]
    add: bool,
}

impl DnsCmd {
    pub fn run<H: IpHelper, R: CommandRunner>(self, host: &Host<H, R>) -> anyhow::Result<()> {
        let ifc = host.interface_by_friendly_name(&self.name)?;
        if self.add {
            host.add_dns(&ifc, &self.servers)?;
        } else {
            host.set_dns(&ifc, &self.servers)?;
        }
        Ok(())
    }
}
