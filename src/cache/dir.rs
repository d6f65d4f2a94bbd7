//! Directory-backed cache store
//!
//! Layout: `<root>/<cache name>/<entry>.json`, where the entry file name is the
//! SHA-256 of the request key. Each file carries the original key so
//! listings do not depend on reversing the hash.

use super::{validate_cache_name, CacheStorage};
use crate::error::{DevIdError, DevIdResult};
use crate::fetch::Response;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// On-disk form of one cached response
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    status: u16,
    headers: Vec<(String, String)>,
    /// Hex-encoded body
    body: String,
}

impl StoredEntry {
    fn new(key: &str, response: &Response) -> Self {
        Self {
            key: key.to_string(),
            status: response.status,
            headers: response.headers.clone(),
            body: hex::encode(&response.body),
        }
    }

    fn into_response(self, path: &Path) -> DevIdResult<Response> {
        let body = hex::decode(&self.body).map_err(|e| DevIdError::Internal(format!(
            "corrupt cache entry {}: {}",
            path.display(),
            e
        )))?;
        Ok(Response {
            status: self.status,
            headers: self.headers,
            body,
        })
    }
}

/// Cache store rooted at a directory
#[derive(Debug, Clone)]
pub struct DirCacheStorage {
    root: PathBuf,
}

impl DirCacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_path(&self, name: &str) -> DevIdResult<PathBuf> {
        validate_cache_name(name)?;
        Ok(self.root.join(name))
    }

    fn entry_path(&self, name: &str, key: &str) -> DevIdResult<PathBuf> {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let digest = hex::encode(hasher.finalize());
        Ok(self.cache_path(name)?.join(format!("{}.json", digest)))
    }

    async fn read_entry(path: &Path) -> DevIdResult<StoredEntry> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| DevIdError::io(format!("reading cache entry {}", path.display()), e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl CacheStorage for DirCacheStorage {
    async fn open(&self, name: &str) -> DevIdResult<()> {
        let path = self.cache_path(name)?;
        fs::create_dir_all(&path)
            .await
            .map_err(|e| DevIdError::io(format!("creating cache {}", path.display()), e))
    }

    async fn keys(&self) -> DevIdResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(vec![]);
        }

        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| DevIdError::io("reading cache root", e))?;

        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| DevIdError::io("reading cache root entry", e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if let (true, Some(name)) = (is_dir, entry.file_name().to_str()) {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> DevIdResult<bool> {
        let path = self.cache_path(name)?;
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(&path)
            .await
            .map_err(|e| DevIdError::io(format!("deleting cache {}", path.display()), e))?;
        debug!("Deleted cache {}", name);
        Ok(true)
    }

    async fn match_entry(&self, name: &str, key: &str) -> DevIdResult<Option<Response>> {
        let path = self.entry_path(name, key)?;
        if !path.exists() {
            return Ok(None);
        }

        let stored = Self::read_entry(&path).await?;
        if stored.key != key {
            return Ok(None);
        }
        stored.into_response(&path).map(Some)
    }

    async fn put(&self, name: &str, key: &str, response: &Response) -> DevIdResult<()> {
        self.open(name).await?;

        let path = self.entry_path(name, key)?;
        let content = serde_json::to_string(&StoredEntry::new(key, response))?;

        // Write then rename so readers never see a partial entry
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .await
            .map_err(|e| DevIdError::io(format!("writing cache entry {}", tmp.display()), e))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| DevIdError::io(format!("committing cache entry {}", path.display()), e))
    }

    async fn entries(&self, name: &str) -> DevIdResult<Vec<String>> {
        let path = self.cache_path(name)?;
        if !path.exists() {
            return Err(DevIdError::CacheNotFound(name.to_string()));
        }

        let mut dir = fs::read_dir(&path)
            .await
            .map_err(|e| DevIdError::io(format!("reading cache {}", path.display()), e))?;

        let mut keys = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| DevIdError::io("reading cache entry", e))?
        {
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                keys.push(Self::read_entry(&entry.path()).await?.key);
            }
        }

        keys.sort();
        Ok(keys)
    }
}
