//! ipcfg admin and rename command implementations.

use std::io::Write;

use clap::{Args, ValueEnum};
use ipcfg::output::{OutputFormat, OutputOptions};
use ipcfg::{CommandRunner, Host, IpHelper};

#[derive(Clone, Copy, ValueEnum)]
enum AdminAction {
    Enable,
    Disable,
    Status,
}

#[derive(Args)]
pub struct AdminCmd {
    /// Interface friendly name.
    name: String,

    /// What to do with the adapter.
    #[arg(value_enum)]
    action: AdminAction,
}

impl AdminCmd {
    pub fn run<H: IpHelper, R: CommandRunner>(
        self,
        host: &Host<H, R>,
        format: OutputFormat,
        opts: &OutputOptions,
    ) -> anyhow::Result<()> {
        match self.action {
            AdminAction::Enable => host.set_admin_state(&self.name, true)?,
            AdminAction::Disable => host.set_admin_state(&self.name, false)?,
            AdminAction::Status => {
                let status = host.admin_status(&self.name)?;
                let mut stdout = std::io::stdout().lock();
                match format {
                    OutputFormat::Text => writeln!(stdout, "{}: {status}", self.name)?,
                    OutputFormat::Json => {
                        let json = serde_json::json!({ "name": self.name, "status": status });
                        if opts.pretty {
                            serde_json::to_writer_pretty(&mut stdout, &json)?;
                        } else {
                            serde_json::to_writer(&mut stdout, &json)?;
                        }
                        writeln!(stdout)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct RenameCmd {
    /// Current friendly name.
    old: String,

    /// New friendly name.
    new: String,
}

impl RenameCmd {
    pub fn run<H: IpHelper, R: CommandRunner>(self, host: &Host<H, R>) -> anyhow::Result<()> {
        host.rename(&self.old, &self.new)?;
        Ok(())
    }
}
