//! devid - Stable device identifier resolution
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use devid::cli::{Cli, Commands};
use devid::config::{Config, ConfigManager};
use devid::error::DevIdResult;
use devid::host::{Host, HostProfile};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> DevIdResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    // Config commands never touch the host
    if let Commands::Config(args) = cli.command {
        return devid::cli::commands::config(args, &config, &config_manager).await;
    }

    let profile = cli.profile.or_else(|| config.general.profile.clone());
    let host = match profile {
        Some(path) => {
            debug!("Loading host profile {}", path.display());
            HostProfile::load(&path).await?.into_host()
        }
        None => Host::local(),
    };

    match cli.command {
        Commands::Config(_) => unreachable!("Config handled above"),
        Commands::Resolve(args) => devid::cli::commands::resolve(args, &config, &host).await,
        Commands::Info(args) => devid::cli::commands::info(args, &host).await,
        Commands::Apis => devid::cli::commands::apis(&host).await,
        Commands::Cache(args) => devid::cli::commands::cache(args, &config).await,
    }
}

/// 0 = warn (spinners only), 1 = info, 2+ = debug. Logs go to stderr so
/// `--json` output stays parseable.
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("devid=warn"),
        1 => EnvFilter::new("devid=info"),
        _ => EnvFilter::new("devid=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
