//! Configuration schema for devid
//!
//! Configuration is stored at `~/.config/devid/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default cache generation identifier
pub const DEFAULT_GENERATION: &str = "device-id-pwa-v1";

/// App shell assets cached at install time
pub const DEFAULT_MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/styles.css",
    "/app.js",
    "/manifest.json",
    "/fingerprint2.min.js",
    "/icons/icon-72x72.png",
    "/icons/icon-96x96.png",
    "/icons/icon-128x128.png",
    "/icons/icon-144x144.png",
    "/icons/icon-152x152.png",
    "/icons/icon-192x192.png",
    "/icons/icon-384x384.png",
    "/icons/icon-512x512.png",
    "https://cdnjs.cloudflare.com/ajax/libs/fingerprintjs2/2.1.0/fingerprint2.min.js",
];

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Identifier resolver settings
    pub resolver: ResolverConfig,

    /// Offline cache worker settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Host profile to load instead of probing the local machine
    pub profile: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            profile: None,
        }
    }
}

/// Identifier resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// How long to wait for the iOS bridge reply
    pub ios_timeout_ms: u64,

    /// Ask for audio+video capture permission before enumerating media devices
    pub media_permission: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ios_timeout_ms: 1000,
            media_permission: true,
        }
    }
}

/// Offline cache worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Current cache generation; every other generation is deleted on activate
    pub generation: String,

    /// Origin the app shell is served from
    pub origin: String,

    /// Cross-origin hosts whose responses may be cached
    pub allowed_hosts: Vec<String>,

    /// URIs cached at install time (relative paths resolve against `origin`)
    pub manifest: Vec<String>,

    /// Directory holding cache generations (defaults to the user cache dir)
    pub storage_dir: Option<PathBuf>,

    /// Network timeout per request in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            generation: DEFAULT_GENERATION.to_string(),
            origin: "http://localhost:8080".to_string(),
            allowed_hosts: vec!["cdnjs.cloudflare.com".to_string()],
            manifest: DEFAULT_MANIFEST.iter().map(|s| s.to_string()).collect(),
            storage_dir: None,
            fetch_timeout_secs: 30,
        }
    }
}
