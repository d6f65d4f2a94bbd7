//! Cache command - drive the offline cache worker

use crate::cache::{CacheStorage, DirCacheStorage};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::{DevIdError, DevIdResult};
use crate::fetch::{HttpFetcher, Request};
use crate::ui::{self, InstallProgress, UiContext};
use crate::worker::{CacheWorker, ClientMessage, Scope};
use console::style;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> DevIdResult<()> {
    let store = DirCacheStorage::new(ConfigManager::storage_dir(config));
    debug!("Cache storage at {}", store.root().display());
    let storage: Arc<dyn CacheStorage> = Arc::new(store);

    match args.action {
        CacheAction::Install => install(config, storage).await,
        CacheAction::Activate => activate(config, storage).await,
        CacheAction::Fetch { uri } => fetch(config, storage, &uri).await,
        CacheAction::Message { json } => message(config, storage, &json).await,
        CacheAction::List { format } => list(config, &*storage, format).await,
    }
}

fn worker(config: &Config, storage: Arc<dyn CacheStorage>) -> DevIdResult<CacheWorker> {
    let fetcher = HttpFetcher::new(Duration::from_secs(config.cache.fetch_timeout_secs));
    CacheWorker::from_config(&config.cache, storage, Arc::new(fetcher))
}

async fn install(config: &Config, storage: Arc<dyn CacheStorage>) -> DevIdResult<()> {
    let ctx = UiContext::detect();
    let mut worker = worker(config, storage)?;

    ui::intro(&ctx, "Installing offline cache");

    let progress = InstallProgress::new(
        &ctx,
        worker.generation(),
        worker.manifest().entries().len(),
    );
    let installed = worker
        .install_with_progress(&|key| progress.on_cached(key))
        .await;
    progress.finish();

    let count = match installed {
        Ok(count) => count,
        Err(e) => {
            ui::outro_error(&ctx, &format!("Install failed, worker is {}", worker.state()));
            return Err(e);
        }
    };
    ui::step_ok_detail(&ctx, "Assets cached", &format!("{} in {}", count, worker.generation()));

    finish_activation(&ctx, &mut worker).await
}

async fn activate(config: &Config, storage: Arc<dyn CacheStorage>) -> DevIdResult<()> {
    let ctx = UiContext::detect();
    let mut worker = worker(config, storage)?;

    if !worker.resume_installed().await? {
        return Err(DevIdError::NotInstalled(worker.generation().to_string()));
    }

    ui::intro(&ctx, "Activating offline cache");
    finish_activation(&ctx, &mut worker).await
}

async fn finish_activation(ctx: &UiContext, worker: &mut CacheWorker) -> DevIdResult<()> {
    let deleted = worker.activate().await?;
    for name in &deleted {
        ui::step_info(ctx, &format!("Deleted old cache {}", name));
    }

    ui::outro_success(ctx, &format!("{} is active", worker.generation()));
    Ok(())
}

async fn fetch(config: &Config, storage: Arc<dyn CacheStorage>, uri: &str) -> DevIdResult<()> {
    let ctx = UiContext::detect();
    let scope = Scope::from_config(&config.cache)?;
    let request = Request::new(scope.resolve(uri)?);
    let worker = worker(config, storage)?;

    let result = worker.handle_fetch(&request).await?;
    let response = &result.response;

    ui::key_value(&ctx, "URL", request.cache_key());
    ui::key_value_status(
        &ctx,
        "Status",
        &response.status.to_string(),
        response.is_ok(),
    );
    ui::key_value(&ctx, "Served from", &format!("{:?}", result.served_from).to_lowercase());
    if let Some(content_type) = response.header("content-type") {
        ui::key_value(&ctx, "Content-Type", content_type);
    }
    ui::key_value(&ctx, "Size", &format!("{} bytes", response.body.len()));

    Ok(())
}

/// Post a message to the installed worker. `skipWaiting` releases a
/// waiting generation, which then activates.
async fn message(config: &Config, storage: Arc<dyn CacheStorage>, json: &str) -> DevIdResult<()> {
    let ctx = UiContext::detect();
    let mut worker = worker(config, storage)?;
    let installed = worker.resume_installed().await?;

    match worker.handle_message(json)? {
        ClientMessage::SkipWaiting => ui::step_ok(&ctx, "Worker will skip waiting"),
        ClientMessage::Ignored => {
            ui::step_warn(&ctx, "Message ignored");
            return Ok(());
        }
    }

    if !installed {
        ui::remark(
            &ctx,
            &format!("{} is not installed; nothing to activate", worker.generation()),
        );
        return Ok(());
    }

    finish_activation(&ctx, &mut worker).await
}

#[derive(Serialize)]
struct CacheListing {
    name: String,
    entries: usize,
    current: bool,
}

async fn list(config: &Config, storage: &dyn CacheStorage, format: OutputFormat) -> DevIdResult<()> {
    let names = storage.keys().await?;

    if names.is_empty() {
        println!("No caches found.");
        return Ok(());
    }

    let mut caches = Vec::with_capacity(names.len());
    for name in names {
        let entries = storage.entries(&name).await?.len();
        caches.push(CacheListing {
            current: name == config.cache.generation,
            name,
            entries,
        });
    }

    match format {
        OutputFormat::Table => print_cache_table(&caches),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&caches)?),
        OutputFormat::Plain => {
            for cache in &caches {
                println!("{}", cache.name);
            }
        }
    }

    Ok(())
}

fn print_cache_table(caches: &[CacheListing]) {
    println!("{:<32} {:<10} {:<10}", "CACHE", "ENTRIES", "STATE");
    println!("{}", "-".repeat(54));

    for cache in caches {
        let state = if cache.current {
            style("current").green().to_string()
        } else {
            style("stale").dim().to_string()
        };
        println!("{:<32} {:<10} {:<10}", cache.name, cache.entries, state);
    }

    println!();
    println!("Total: {} cache(s)", caches.len());
}
