//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{DevIdError, DevIdResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Keys accepted by `config set`
const VALID_KEYS: [&str; 9] = [
    "general.log_format",
    "general.profile",
    "resolver.ios_timeout_ms",
    "resolver.media_permission",
    "cache.generation",
    "cache.origin",
    "cache.allowed_hosts",
    "cache.storage_dir",
    "cache.fetch_timeout_secs",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> DevIdResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let ctx = UiContext::detect();
            let updated = set_value(manager, config, &key, &value)?;
            manager.save(&updated).await?;
            ui::step_ok(&ctx, &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> DevIdResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> DevIdResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn(&ctx, &format!("Config already exists at {}", path.display()));
        ui::remark(&ctx, "Use --force to overwrite");
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());

    Ok(())
}

/// Apply one dot-separated key to a copy of the config
fn set_value(manager: &ConfigManager, config: &Config, key: &str, value: &str) -> DevIdResult<Config> {
    let invalid = |reason: String| DevIdError::ConfigInvalid {
        path: manager.path().to_path_buf(),
        reason,
    };
    let mut config = config.clone();

    match key {
        "general.log_format" => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => return Err(invalid(format!("log_format must be text or json, got {}", value))),
        },
        "general.profile" => config.general.profile = optional_path(value),
        "resolver.ios_timeout_ms" => {
            config.resolver.ios_timeout_ms = value
                .parse()
                .map_err(|_| invalid(format!("invalid number: {}", value)))?
        }
        "resolver.media_permission" => {
            config.resolver.media_permission = parse_bool(value).ok_or_else(|| {
                invalid(format!("invalid boolean value: {}. Use true/false", value))
            })?
        }
        "cache.generation" => config.cache.generation = value.to_string(),
        "cache.origin" => config.cache.origin = value.to_string(),
        "cache.allowed_hosts" => {
            config.cache.allowed_hosts = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "cache.storage_dir" => config.cache.storage_dir = optional_path(value),
        "cache.fetch_timeout_secs" => {
            config.cache.fetch_timeout_secs = value
                .parse()
                .map_err(|_| invalid(format!("invalid number: {}", value)))?
        }
        _ => {
            return Err(invalid(format!(
                "unknown key {} (valid keys: {})",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(config)
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
