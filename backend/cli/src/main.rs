mod events_cmd;
mod init_cmd;
mod install_cmd;
mod terminal_output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, error, warn};

use addonforge_config::{config_dir, config_file_path, load_and_prepare, FailAt};
use addonforge_core::UninstallOutcome;
use install_cmd::{SimulationOverrides, Target};

#[derive(Parser)]
#[command(name = "addonforge")]
#[command(about = "Install and uninstall a browser add-on through a host add-on manager")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.addonforge/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the add-on and follow its progress
    Install(TargetArgs),
    /// Install the add-on, then uninstall it
    Cycle(TargetArgs),
    /// List the install event types that are subscribed
    Events,
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Add-on id
    #[arg(long)]
    id: Option<String>,

    /// Install package url
    #[arg(long)]
    url: Option<String>,

    /// Make the simulated install fail at this stage
    #[arg(long, value_enum)]
    fail_at: Option<FailAtArg>,

    /// What the simulated host reports when uninstalling
    #[arg(long, value_enum)]
    uninstall_report: Option<ReportArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FailAtArg {
    Download,
    Install,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportArg {
    True,
    False,
    None,
}

impl TargetArgs {
    fn overrides(&self) -> SimulationOverrides {
        SimulationOverrides {
            fail_at: self.fail_at.map(|f| match f {
                FailAtArg::Download => FailAt::Download,
                FailAtArg::Install => FailAt::Install,
            }),
            uninstall_report: self.uninstall_report.map(|r| match r {
                ReportArg::True => UninstallOutcome::Confirmed,
                ReportArg::False => UninstallOutcome::Refused,
                ReportArg::None => UninstallOutcome::Unreported,
            }),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));

    if let Commands::Init { force } = cli.command {
        return init_cmd::run(&config_path, force).await;
    }

    let (config, report) = load_and_prepare(&config_path).await?;
    let logging = config.logging.clone().unwrap_or_default();
    let level = cli
        .log_level
        .or(logging.level)
        .unwrap_or_else(|| "info".to_string());
    let _log_guard = addonforge_logging::init_logger(logging.dir.as_deref().unwrap_or("logs"), &level)?;
    debug!(config = %config_path.display(), "Config loaded");

    for warning in &report.warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
        terminal_output::note_warn(&warning.to_string());
    }
    if !report.is_valid() {
        for err in &report.errors {
            error!(path = %err.path, message = %err.message, "Config error");
            terminal_output::note_error(&err.to_string());
        }
        anyhow::bail!("Config at {} is invalid", config_path.display());
    }

    match cli.command {
        Commands::Install(args) => {
            let target = Target::resolve(&config, args.id.clone(), args.url.clone())?;
            install_cmd::run_install(&config, &target, &args.overrides()).await
        }
        Commands::Cycle(args) => {
            let target = Target::resolve(&config, args.id.clone(), args.url.clone())?;
            install_cmd::run_cycle(&config, &target, &args.overrides()).await
        }
        Commands::Events => {
            events_cmd::run(&config);
            Ok(())
        }
        Commands::Init { .. } => Ok(()),
    }
}
