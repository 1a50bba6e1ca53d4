//! ipcfg plan command implementation.
//!
//! Reconciles two state files without touching the host, so it runs
//! anywhere.

use std::path::PathBuf;

use clap::Args;
use ipcfg::config::compute_diff;
use ipcfg::output::{OutputFormat, OutputOptions, Printable};

use super::load_config;

#[derive(Args)]
pub struct PlanCmd {
    /// State file describing the interface as it is (YAML or JSON).
    #[arg(long)]
    current: PathBuf,

    /// State file describing the interface as it should be (YAML or JSON).
    #[arg(long)]
    desired: PathBuf,
}

impl PlanCmd {
    pub fn run(self, format: OutputFormat, opts: &OutputOptions) -> anyhow::Result<()> {
        let current = load_config(&self.current)?;
        let desired = load_config(&self.desired)?;

        let diff = compute_diff(&desired, &current);
        tracing::debug!(changes = diff.change_count(), "plan computed");

        let mut stdout = std::io::stdout().lock();
        diff.print(&mut stdout, format, opts)?;
        Ok(())
    }
}
