//! Named response caches
//!
//! A cache store holds any number of named caches, one per generation. Each
//! cache maps an exact request key to a stored response.
//!
//! # Stores
//!
//! | Store | Backing | Used by |
//! |-------|---------|---------|
//! | [`MemoryCacheStorage`] | process memory | tests, embedding |
//! | [`DirCacheStorage`] | one directory per cache | the CLI |

mod dir;
mod memory;

pub use dir::DirCacheStorage;
pub use memory::MemoryCacheStorage;

use crate::error::{DevIdError, DevIdResult};
use crate::fetch::Response;
use async_trait::async_trait;

/// Storage for named caches of request → response entries
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named cache if it does not exist
    async fn open(&self, name: &str) -> DevIdResult<()>;

    /// Names of all existing caches
    async fn keys(&self) -> DevIdResult<Vec<String>>;

    /// Delete a cache and everything in it. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> DevIdResult<bool>;

    /// Exact-match lookup inside one cache
    async fn match_entry(&self, name: &str, key: &str) -> DevIdResult<Option<Response>>;

    /// Store or overwrite an entry, creating the cache if needed
    async fn put(&self, name: &str, key: &str, response: &Response) -> DevIdResult<()>;

    /// Request keys stored in one cache, sorted.
    ///
    /// Fails with `CacheNotFound` when the cache does not exist; an opened
    /// but empty cache yields an empty list.
    async fn entries(&self, name: &str) -> DevIdResult<Vec<String>>;
}

/// Reject names that cannot safely become a directory name
pub(crate) fn validate_cache_name(name: &str) -> DevIdResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);

    if invalid {
        Err(DevIdError::CacheNameInvalid(name.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(validate_cache_name("device-id-pwa-v1").is_ok());
        assert!(validate_cache_name("v0").is_ok());
    }

    #[test]
    fn invalid_names() {
        for name in ["", ".", "..", "a/b", "a\\b", "v1\n"] {
            assert!(validate_cache_name(name).is_err(), "{name:?} should be rejected");
        }
    }
}
