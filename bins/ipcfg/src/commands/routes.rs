//! ipcfg routes command implementation.

use clap::Args;
use ipcfg::output::{OutputFormat, OutputOptions, print_all};
use ipcfg::route::compare_routes;
use ipcfg::{AddressFamily, CommandRunner, Host, IpHelper};

#[derive(Args)]
pub struct RoutesCmd {
    /// Interface friendly name (all interfaces when omitted).
    name: Option<String>,

    /// IPv4 routes only.
    #[arg(short = '4', conflicts_with = "ipv6")]
    ipv4: bool,

    /// IPv6 routes only.
    #[arg(short = '6')]
    ipv6: bool,
}

impl RoutesCmd {
    fn family(&self) -> AddressFamily {
        match (self.ipv4, self.ipv6) {
            (true, _) => AddressFamily::Inet,
            (_, true) => AddressFamily::Inet6,
            _ => AddressFamily::Unspec,
        }
    }

    pub fn run<H: IpHelper, R: CommandRunner>(
        self,
        host: &Host<H, R>,
        format: OutputFormat,
        opts: &OutputOptions,
    ) -> anyhow::Result<()> {
        let family = self.family();
        let mut rows = match &self.name {
            Some(name) => {
                let ifc = host.interface_by_friendly_name(name)?;
                host.routes(&ifc, family)?
            }
            None => host.helper().routes(family)?,
        };
        rows.sort_by(|a, b| {
            a.interface_index
                .cmp(&b.interface_index)
                .then_with(|| compare_routes(&a.to_route_data(), &b.to_route_data()))
        });

        let mut stdout = std::io::stdout().lock();
        print_all(&rows, &mut stdout, format, opts)?;
        Ok(())
    }
}
