//! ipcfg apply command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use ipcfg::config::ApplyOptions;
use ipcfg::output::{OutputFormat, OutputOptions};
use ipcfg::{CommandRunner, Host, IpHelper};

use super::load_config;

#[derive(Args)]
pub struct ApplyCmd {
    /// State file (YAML or JSON).
    file: PathBuf,

    /// Interface friendly name.
    #[arg(long, short)]
    interface: String,

    /// Print the changes without making them.
    #[arg(long, short = 'n')]
    dry_run: bool,

    /// Keep going after a failed change.
    #[arg(long)]
    continue_on_error: bool,
}

impl ApplyCmd {
    pub fn run<H: IpHelper, R: CommandRunner>(
        self,
        host: &Host<H, R>,
        format: OutputFormat,
        opts: &OutputOptions,
    ) -> anyhow::Result<()> {
        let config = load_config(&self.file)?;
        let mut ifc = host.interface_by_friendly_name(&self.interface)?;

        let options = ApplyOptions {
            dry_run: self.dry_run,
            continue_on_error: self.continue_on_error,
        };
        let result = host.apply_config(&mut ifc, &config, options)?;

        let mut stdout = std::io::stdout().lock();
        match format {
            OutputFormat::Text => writeln!(stdout, "{}", result.summary_text())?,
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "interface": ifc.friendly_name,
                    "dry_run": self.dry_run,
                    "changes_made": result.changes_made,
                    "summary": result.summary,
                    "errors": result.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
                });
                if opts.pretty {
                    serde_json::to_writer_pretty(&mut stdout, &json)?;
                } else {
                    serde_json::to_writer(&mut stdout, &json)?;
                }
                writeln!(stdout)?;
            }
        }

        result.into_result()?;
        Ok(())
    }
}
