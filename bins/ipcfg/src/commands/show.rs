//! ipcfg show command implementation.

use clap::Args;
use ipcfg::output::{OutputFormat, OutputOptions, print_all};
use ipcfg::{CommandRunner, Host, IpHelper};

#[derive(Args)]
pub struct ShowCmd {
    /// Interface friendly name (all interfaces when omitted).
    name: Option<String>,

    /// Only interfaces that are up.
    #[arg(long)]
    up: bool,
}

impl ShowCmd {
    pub fn run<H: IpHelper, R: CommandRunner>(
        self,
        host: &Host<H, R>,
        format: OutputFormat,
        opts: &OutputOptions,
    ) -> anyhow::Result<()> {
        let mut interfaces = match &self.name {
            Some(name) => vec![host.interface_by_friendly_name(name)?],
            None => host.interfaces()?,
        };
        if self.up {
            interfaces.retain(|ifc| ifc.is_up());
        }

        let mut stdout = std::io::stdout().lock();
        print_all(&interfaces, &mut stdout, format, opts)?;
        Ok(())
    }
}
