//! In-memory cache store

use super::{validate_cache_name, CacheStorage};
use crate::error::{DevIdError, DevIdResult};
use crate::fetch::Response;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

type Entries = BTreeMap<String, Response>;

/// Cache store that lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    caches: RwLock<BTreeMap<String, Entries>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> DevIdResult<()> {
        validate_cache_name(name)?;
        self.caches
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn keys(&self) -> DevIdResult<Vec<String>> {
        Ok(self.caches.read().await.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> DevIdResult<bool> {
        Ok(self.caches.write().await.remove(name).is_some())
    }

    async fn match_entry(&self, name: &str, key: &str) -> DevIdResult<Option<Response>> {
        Ok(self
            .caches
            .read()
            .await
            .get(name)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn put(&self, name: &str, key: &str, response: &Response) -> DevIdResult<()> {
        validate_cache_name(name)?;
        self.caches
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .insert(key.to_string(), response.clone());
        Ok(())
    }

    async fn entries(&self, name: &str) -> DevIdResult<Vec<String>> {
        self.caches
            .read()
            .await
            .get(name)
            .map(|entries| entries.keys().cloned().collect())
            .ok_or_else(|| DevIdError::CacheNotFound(name.to_string()))
    }
}
