//! Offline cache worker
//!
//! Intercepts requests for the app shell and serves them cache-first. The
//! worker owns exactly one cache generation; activation deletes every other.
//!
//! # Lifecycle
//!
//! | State | Entered by | Next |
//! |-------|-----------|------|
//! | Parsed | construction | Installing |
//! | Installing | `install` | Installed, Redundant |
//! | Installed | manifest cached | Activating |
//! | Activating | `activate` | Activated |
//! | Activated | stale generations deleted | - |
//! | Redundant | install failed | - |
//!
//! An `Installed` worker waits while another generation is still stored,
//! unless skip-waiting was requested. Installing always requests it; a
//! worker resumed from an earlier run needs a `skipWaiting` message.

pub mod manifest;

pub use manifest::{CacheManifest, Scope};

use crate::cache::CacheStorage;
use crate::config::schema::CacheConfig;
use crate::error::{DevIdError, DevIdResult};
use crate::fetch::{Fetcher, Request, Response};
use futures_util::future::try_join_all;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Worker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

/// Where an intercepted response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServedFrom {
    /// Cache hit, no network access
    Cache,
    /// Network response, a copy was stored
    Network,
    /// Network response for an out-of-scope URL, not stored
    Passthrough,
}

/// Response to an intercepted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub response: Response,
    pub served_from: ServedFrom,
}

/// Control message posted by a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    SkipWaiting,
    Ignored,
}

/// Request-intercepting cache worker for one generation
pub struct CacheWorker {
    manifest: CacheManifest,
    scope: Scope,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    state: WorkerState,
    skip_waiting: bool,
    clients_claimed: bool,
}

impl CacheWorker {
    pub fn new(
        manifest: CacheManifest,
        scope: Scope,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            manifest,
            scope,
            storage,
            fetcher,
            state: WorkerState::Parsed,
            skip_waiting: false,
            clients_claimed: false,
        }
    }

    pub fn from_config(
        config: &CacheConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
    ) -> DevIdResult<Self> {
        Ok(Self::new(
            CacheManifest::from_config(config)?,
            Scope::from_config(config)?,
            storage,
            fetcher,
        ))
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn generation(&self) -> &str {
        self.manifest.generation()
    }

    pub fn manifest(&self) -> &CacheManifest {
        &self.manifest
    }

    /// Whether the worker asked to take over without waiting
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting
    }

    /// Whether open clients are controlled by this worker
    pub fn clients_claimed(&self) -> bool {
        self.clients_claimed
    }

    /// Take over as soon as installed, without a handoff period
    pub fn skip_waiting(&mut self) {
        if !self.skip_waiting {
            debug!("Worker for {} will skip waiting", self.generation());
        }
        self.skip_waiting = true;
    }

    /// Pick up a generation installed by an earlier run.
    ///
    /// Moves a fresh worker to `Installed` when its cache holds every
    /// manifest entry, so it can be activated without re-fetching. A cache
    /// left behind by a failed install or filled by `handle_fetch` alone
    /// does not count.
    pub async fn resume_installed(&mut self) -> DevIdResult<bool> {
        if self.state != WorkerState::Parsed {
            return Ok(false);
        }

        let complete = self.is_complete().await?;
        if complete {
            self.state = WorkerState::Installed;
        }
        Ok(complete)
    }

    async fn is_complete(&self) -> DevIdResult<bool> {
        let stored = match self.storage.entries(self.generation()).await {
            Ok(keys) => keys,
            Err(DevIdError::CacheNotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };

        let missing: Vec<_> = self
            .manifest
            .resolve(&self.scope)?
            .into_iter()
            .filter(|url| !stored.iter().any(|key| key == url.as_str()))
            .collect();

        if !missing.is_empty() {
            debug!(
                "{} is missing {} manifest entries",
                self.generation(),
                missing.len()
            );
        }
        Ok(missing.is_empty())
    }

    async fn stale_generations(&self) -> DevIdResult<Vec<String>> {
        Ok(self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| name != self.generation())
            .collect())
    }

    /// Cache every manifest entry under the current generation
    pub async fn install(&mut self) -> DevIdResult<usize> {
        self.install_with_progress(&|_| {}).await
    }

    /// Install, calling `on_cached` with each stored key.
    ///
    /// All entries are fetched before any is stored. A single failed fetch or
    /// non-2xx status fails the install and leaves the worker `Redundant`.
    pub async fn install_with_progress(
        &mut self,
        on_cached: &(dyn Fn(&str) + Send + Sync),
    ) -> DevIdResult<usize> {
        if self.state != WorkerState::Parsed {
            return Err(self.state_error("install"));
        }

        self.state = WorkerState::Installing;
        self.skip_waiting();

        match self.populate(on_cached).await {
            Ok(count) => {
                self.state = WorkerState::Installed;
                info!("Cached {} assets in {}", count, self.generation());
                Ok(count)
            }
            Err(e) => {
                self.state = WorkerState::Redundant;
                error!("Install of {} failed: {}", self.generation(), e);
                Err(e)
            }
        }
    }

    async fn populate(&self, on_cached: &(dyn Fn(&str) + Send + Sync)) -> DevIdResult<usize> {
        let generation = self.generation();
        let urls = self.manifest.resolve(&self.scope)?;
        let fetched = try_join_all(urls.into_iter().map(|url| async move {
            let request = Request::new(url);
            let response = self
                .fetcher
                .fetch(&request)
                .await
                .map_err(|e| DevIdError::InstallFailed {
                    url: request.url.to_string(),
                    reason: e.to_string(),
                })?;

            if !response.is_ok() {
                return Err(DevIdError::InstallFailed {
                    url: request.url.to_string(),
                    reason: format!("HTTP status {}", response.status),
                });
            }
            Ok((request, response))
        }))
        .await?;

        self.storage.open(generation).await?;
        for (request, response) in &fetched {
            self.storage
                .put(generation, request.cache_key(), response)
                .await?;
            on_cached(request.cache_key());
        }

        Ok(fetched.len())
    }

    /// Delete stale generations and claim open clients.
    ///
    /// Returns the names of the deleted caches. While another generation is
    /// stored and skip-waiting was not requested, the worker stays
    /// `Installed` and this fails with `WorkerWaiting`.
    pub async fn activate(&mut self) -> DevIdResult<Vec<String>> {
        if self.state != WorkerState::Installed {
            return Err(self.state_error("activate"));
        }

        let stale = self.stale_generations().await?;
        if !stale.is_empty() && !self.skip_waiting {
            info!("{} is waiting for {}", self.generation(), stale.join(", "));
            return Err(DevIdError::WorkerWaiting {
                generation: self.generation().to_string(),
                current: stale.join(", "),
            });
        }

        self.state = WorkerState::Activating;

        let storage = &self.storage;
        let deleted = try_join_all(stale.iter().map(|name| async move {
            info!("Clearing old cache {}", name);
            storage.delete(name).await
        }))
        .await;

        if let Err(e) = deleted {
            self.state = WorkerState::Installed;
            return Err(e);
        }

        self.state = WorkerState::Activated;
        self.claim_clients();
        Ok(stale)
    }

    fn claim_clients(&mut self) {
        self.clients_claimed = true;
        debug!("Worker for {} controls all clients", self.generation());
    }

    /// Serve a request cache-first.
    ///
    /// Misses go to the network. In-scope responses are copied into the
    /// current generation before the original is returned. Network failures
    /// propagate to the caller unchanged.
    pub async fn handle_fetch(&self, request: &Request) -> DevIdResult<FetchResult> {
        let generation = self.generation();
        let key = request.cache_key();

        if let Some(cached) = self.storage.match_entry(generation, key).await? {
            debug!("Cache hit for {}", key);
            return Ok(FetchResult {
                response: cached,
                served_from: ServedFrom::Cache,
            });
        }

        let response = self.fetcher.fetch(request).await.map_err(|e| {
            error!("Fetch failed for {}: {}", key, e);
            e
        })?;

        if !self.scope.is_cacheable(&request.url) {
            debug!("Not caching out-of-scope {}", key);
            return Ok(FetchResult {
                response,
                served_from: ServedFrom::Passthrough,
            });
        }

        let copy = response.clone();
        if let Err(e) = self.storage.put(generation, key, &copy).await {
            warn!("Failed to cache {}: {}", key, e);
        }

        Ok(FetchResult {
            response,
            served_from: ServedFrom::Network,
        })
    }

    /// Handle a JSON control message such as `{"action": "skipWaiting"}`
    pub fn handle_message(&mut self, raw: &str) -> DevIdResult<ClientMessage> {
        let value: serde_json::Value = serde_json::from_str(raw)?;

        match value.get("action").and_then(serde_json::Value::as_str) {
            Some("skipWaiting") => {
                self.skip_waiting();
                Ok(ClientMessage::SkipWaiting)
            }
            other => {
                debug!("Ignoring client message with action {:?}", other);
                Ok(ClientMessage::Ignored)
            }
        }
    }

    fn state_error(&self, action: &str) -> DevIdError {
        DevIdError::WorkerState {
            action: action.to_string(),
            state: self.state.to_string(),
        }
    }
}
