//! ipcfg command - interface address, route and DNS configuration.

mod commands;

use clap::{Parser, Subcommand};
use ipcfg::output::{OutputFormat, OutputOptions};

#[derive(Parser)]
#[command(name = "ipcfg", version, about = "Windows interface configuration tool")]
struct Cli {
    /// Output JSON.
    #[arg(short = 'j', long, global = true)]
    json: bool,

    /// Pretty print JSON.
    #[arg(short = 'p', long, global = true)]
    pretty: bool,

    /// Show details.
    #[arg(short = 'd', long, global = true)]
    details: bool,

    /// Log debug output to stderr.
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show network interfaces.
    #[command(visible_alias = "s")]
    Show(commands::show::ShowCmd),

    /// Show routes.
    #[command(visible_alias = "r")]
    Routes(commands::routes::RoutesCmd),

    /// Compare two state files offline and print the changes.
    Plan(commands::plan::PlanCmd),

    /// Bring an interface to the state described in a file.
    Apply(commands::apply::ApplyCmd),

    /// Replace the DNS servers of an interface.
    Dns(commands::dns::DnsCmd),

    /// Enable, disable or query an adapter.
    Admin(commands::admin::AdminCmd),

    /// Rename an adapter.
    Rename(commands::admin::RenameCmd),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Show(_) => "show",
            Self::Routes(_) => "routes",
            Self::Plan(_) => "plan",
            Self::Apply(_) => "apply",
            Self::Dns(_) => "dns",
            Self::Admin(_) => "admin",
            Self::Rename(_) => "rename",
        }
    }
}

#[cfg(windows)]
fn run_on_host(command: Command, format: OutputFormat, opts: &OutputOptions) -> anyhow::Result<()> {
    let host = ipcfg::Host::system()?;
    match command {
        Command::Show(cmd) => cmd.run(&host, format, opts),
        Command::Routes(cmd) => cmd.run(&host, format, opts),
        Command::Apply(cmd) => cmd.run(&host, format, opts),
        Command::Dns(cmd) => cmd.run(&host),
        Command::Admin(cmd) => cmd.run(&host, format, opts),
        Command::Rename(cmd) => cmd.run(&host),
        Command::Plan(cmd) => cmd.run(format, opts),
    }
}

#[cfg(not(windows))]
fn run_on_host(command: Command, _format: OutputFormat, _opts: &OutputOptions) -> anyhow::Result<()> {
    Err(ipcfg::Error::Unsupported(format!("'{}' needs a Windows host", command.name())).into())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let opts = OutputOptions {
        details: cli.details,
        pretty: cli.pretty,
    };

    tracing::debug!(command = cli.command.name(), "starting");
    let result = match cli.command {
        Command::Plan(cmd) => cmd.run(format, &opts),
        command => run_on_host(command, format, &opts),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}
