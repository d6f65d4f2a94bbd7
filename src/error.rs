//! Error types for devid
//!
//! All modules use `DevIdResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for devid operations
pub type DevIdResult<T> = Result<T, DevIdError>;

/// All errors that can occur in devid
#[derive(Error, Debug)]
pub enum DevIdError {
    // Identification errors (never escape the resolver)
    #[error("Bridge not available: {0}")]
    BridgeUnavailable(String),

    #[error("Bridge call failed: {call}: {reason}")]
    BridgeCallFailed { call: String, reason: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No usable media devices reported")]
    EnumerationEmpty,

    #[error("Client hint unavailable: {0}")]
    HintUnavailable(String),

    #[error("Timed out after {millis} ms waiting for {what}")]
    Timeout { what: String, millis: u64 },

    // Network errors
    #[error("Network request failed for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Invalid URL '{input}': {reason}")]
    UrlInvalid { input: String, reason: String },

    // Cache worker errors
    #[error("Invalid cache name '{0}'")]
    CacheNameInvalid(String),

    #[error("Cache not found: {0}")]
    CacheNotFound(String),

    #[error("Install failed while caching {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("Cache {0} is not fully installed")]
    NotInstalled(String),

    #[error("Cannot {action} while worker is {state}")]
    WorkerState { action: String, state: String },

    #[error("{generation} is waiting for {current} to release its clients")]
    WorkerWaiting { generation: String, current: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid host profile at {path}: {reason}")]
    ProfileInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DevIdError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a bridge call failure
    pub fn bridge_failed(call: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BridgeCallFailed {
            call: call.into(),
            reason: reason.into(),
        }
    }

    /// Create a network failure for a URL
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error only means "this identification step had nothing".
    ///
    /// The resolver downgrades every error to a miss; this classifies the ones
    /// that are expected on ordinary hosts so they can be logged quietly.
    pub fn is_step_miss(&self) -> bool {
        matches!(
            self,
            Self::BridgeUnavailable(_)
                | Self::PermissionDenied(_)
                | Self::EnumerationEmpty
                | Self::HintUnavailable(_)
                | Self::Timeout { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Network { .. } => Some("Check that the app origin in [cache] origin is reachable"),
            Self::InstallFailed { .. } => {
                Some("Every manifest entry must be fetchable; fix the entry or the origin and re-run: devid cache install")
            }
            Self::NotInstalled(_) => Some("Run: devid cache install"),
            Self::WorkerWaiting { .. } => {
                Some("Take over now with: devid cache message '{\"action\":\"skipWaiting\"}'")
            }
            Self::ConfigInvalid { .. } => Some("Run: devid config show"),
            Self::CacheNameInvalid(_) => {
                Some("Cache generation names must not contain path separators")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DevIdError::Timeout {
            what: "iOS bridge reply".to_string(),
            millis: 1000,
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 1000 ms waiting for iOS bridge reply"
        );
    }

    #[test]
    fn error_hint() {
        let err = DevIdError::network("https://example.com/", "connection refused");
        assert!(err.hint().is_some());
        assert!(DevIdError::EnumerationEmpty.hint().is_none());

        let waiting = DevIdError::WorkerWaiting {
            generation: "device-id-pwa-v2".into(),
            current: "device-id-pwa-v1".into(),
        };
        assert_eq!(
            waiting.to_string(),
            "device-id-pwa-v2 is waiting for device-id-pwa-v1 to release its clients"
        );
        assert!(waiting.hint().is_some_and(|h| h.contains("skipWaiting")));
    }

    #[test]
    fn step_miss_classification() {
        assert!(DevIdError::EnumerationEmpty.is_step_miss());
        assert!(DevIdError::HintUnavailable("model".into()).is_step_miss());
        assert!(!DevIdError::bridge_failed("getAndroidId", "boom").is_step_miss());
        assert!(!DevIdError::network("https://example.com/", "reset").is_step_miss());
    }
}
