//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// devid - Stable device identifier resolution
///
/// Tries native bridges, media devices, client hints and the hardware
/// profile in order, and falls back to a generated id.
#[derive(Parser, Debug)]
#[command(name = "devid")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DEVID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Simulated host profile (TOML) to resolve against
    #[arg(long, global = true, env = "DEVID_PROFILE")]
    pub profile: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the device identifier
    Resolve(ResolveArgs),

    /// Show device hardware information
    Info(InfoArgs),

    /// Show which host APIs are available
    Apis,

    /// Drive the offline cache worker
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Print the hardware profile as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.generation)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for list output
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Fetch and store every manifest entry, then activate
    Install,

    /// Activate an installed generation and delete stale ones
    Activate,

    /// Serve one request through the worker
    Fetch {
        /// URL or path relative to the app origin
        uri: String,
    },

    /// Post a JSON control message to the worker
    Message {
        /// Message body, e.g. '{"action":"skipWaiting"}'
        json: String,
    },

    /// List stored cache generations
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_resolve_json() {
        let cli = Cli::try_parse_from(["devid", "resolve", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Resolve(ResolveArgs { json: true })));
    }

    #[test]
    fn parse_cache_fetch() {
        let cli = Cli::try_parse_from(["devid", "-vv", "cache", "fetch", "/app.js"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Fetch { uri },
            }) => assert_eq!(uri, "/app.js"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_profile_flag() {
        let cli = Cli::try_parse_from(["devid", "apis", "--profile", "android.toml"]).unwrap();
        assert_eq!(cli.profile, Some(PathBuf::from("android.toml")));
    }
}
