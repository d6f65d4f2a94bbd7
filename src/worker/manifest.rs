//! Asset manifest and caching scope

use crate::cache::validate_cache_name;
use crate::config::schema::CacheConfig;
use crate::error::{DevIdError, DevIdResult};
use url::Url;

/// Ordered set of URIs bound to one cache generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheManifest {
    generation: String,
    entries: Vec<String>,
}

impl CacheManifest {
    /// Build a manifest. Duplicate entries keep their first position.
    pub fn new(generation: impl Into<String>, entries: impl IntoIterator<Item = String>) -> DevIdResult<Self> {
        let generation = generation.into();
        validate_cache_name(&generation)?;

        let mut unique: Vec<String> = Vec::new();
        for entry in entries {
            if !unique.contains(&entry) {
                unique.push(entry);
            }
        }

        Ok(Self {
            generation,
            entries: unique,
        })
    }

    pub fn from_config(config: &CacheConfig) -> DevIdResult<Self> {
        Self::new(config.generation.clone(), config.manifest.iter().cloned())
    }

    /// Name of the cache this manifest populates
    pub fn generation(&self) -> &str {
        &self.generation
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Absolute URLs of every entry, relative ones resolved against the scope
    pub fn resolve(&self, scope: &Scope) -> DevIdResult<Vec<Url>> {
        self.entries.iter().map(|e| scope.resolve(e)).collect()
    }
}

/// Which URLs the worker may store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    origin: Url,
    allowed_hosts: Vec<String>,
}

impl Scope {
    pub fn new(origin: &str, allowed_hosts: impl IntoIterator<Item = String>) -> DevIdResult<Self> {
        let origin = Url::parse(origin).map_err(|e| DevIdError::UrlInvalid {
            input: origin.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            origin,
            allowed_hosts: allowed_hosts.into_iter().collect(),
        })
    }

    pub fn from_config(config: &CacheConfig) -> DevIdResult<Self> {
        Self::new(&config.origin, config.allowed_hosts.iter().cloned())
    }

    /// Resolve a possibly relative URI against the app origin
    pub fn resolve(&self, input: &str) -> DevIdResult<Url> {
        self.origin.join(input).map_err(|e| DevIdError::UrlInvalid {
            input: input.to_string(),
            reason: e.to_string(),
        })
    }

    /// Same origin as the app, or on an allow-listed host
    pub fn is_cacheable(&self, url: &Url) -> bool {
        if url.origin() == self.origin.origin() {
            return true;
        }

        url.host_str()
            .is_some_and(|host| self.allowed_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)))
    }
}
