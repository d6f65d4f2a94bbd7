//! Device identifier resolution
//!
//! Walks an ordered chain of identification strategies, most reliable first:
//! - Android shell id
//! - iOS shell id (bounded request/reply)
//! - Android device serial
//! - Media device enumeration
//! - High-entropy client hints
//! - Hardware profile composite
//!
//! The first strategy that yields a non-empty value wins. When none does, a
//! random identifier is generated, so resolution never fails.

pub mod fallback;
pub mod hardware;
pub mod hints;
pub mod media;
pub mod native;
mod strategy;

pub use strategy::IdentifierStrategy;

use crate::capability::CapabilitySet;
use crate::config::schema::ResolverConfig;
use crate::host::Host;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where an identifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    NativeAndroid,
    NativeIos,
    DeviceSerial,
    MediaDevice,
    ClientHints,
    HardwareProfile,
    FallbackGenerated,
}

impl SourceTag {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeAndroid => "native_android",
            Self::NativeIos => "native_ios",
            Self::DeviceSerial => "device_serial",
            Self::MediaDevice => "media_device",
            Self::ClientHints => "client_hints",
            Self::HardwareProfile => "hardware_profile",
            Self::FallbackGenerated => "fallback_generated",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::NativeAndroid => "Android ID",
            Self::NativeIos => "iOS Device ID",
            Self::DeviceSerial => "Device Serial",
            Self::MediaDevice => "Hardware ID",
            Self::ClientHints => "Device Model",
            Self::HardwareProfile => "Hardware Profile",
            Self::FallbackGenerated => "Generated ID",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved identifier and its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationResult {
    pub device_id: String,
    pub source: SourceTag,
}

impl IdentificationResult {
    pub fn new(device_id: impl Into<String>, source: SourceTag) -> Self {
        Self {
            device_id: device_id.into(),
            source,
        }
    }

    /// Generated result, used when every strategy missed
    pub fn fallback() -> Self {
        Self::new(fallback::generate_id(), SourceTag::FallbackGenerated)
    }

    /// Identifier grouped in blocks of four for display.
    ///
    /// Ids that already carry `-` or `_` separators, or are at most eight
    /// characters long, are shown as-is.
    pub fn display_id(&self) -> String {
        let id = &self.device_id;
        if id.chars().count() <= 8 || id.contains('-') || id.contains('_') {
            return id.clone();
        }

        let chars: Vec<char> = id.chars().collect();
        chars
            .chunks(4)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Ordered chain of identification strategies
pub struct Resolver {
    strategies: Vec<Arc<dyn IdentifierStrategy>>,
}

impl Resolver {
    /// Standard chain for a host
    pub fn new(host: &Host, config: &ResolverConfig) -> Self {
        let strategies: Vec<Arc<dyn IdentifierStrategy>> = vec![
            Arc::new(native::AndroidIdStrategy::new(host.android.clone())),
            Arc::new(native::IosBridgeStrategy::new(
                host.ios.clone(),
                Arc::clone(&host.replies),
                Duration::from_millis(config.ios_timeout_ms),
            )),
            Arc::new(native::DeviceSerialStrategy::new(host.android.clone())),
            Arc::new(media::MediaDeviceStrategy::new(
                host.media.clone(),
                config.media_permission,
            )),
            Arc::new(hints::ClientHintsStrategy::new(
                host.user_agent_data.clone(),
            )),
            Arc::new(hardware::HardwareProfileStrategy::new(
                host.hardware.clone(),
            )),
        ];

        Self::with_strategies(strategies)
    }

    /// Chain made of the given strategies, tried in order
    pub fn with_strategies(strategies: Vec<Arc<dyn IdentifierStrategy>>) -> Self {
        Self { strategies }
    }

    /// Source tags of the chain, in attempt order
    pub fn sources(&self) -> Vec<SourceTag> {
        self.strategies.iter().map(|s| s.source()).collect()
    }

    /// Resolve an identifier. Never fails.
    ///
    /// Each strategy settles completely before the next one starts. A
    /// strategy that panics is treated like one that found nothing.
    pub async fn resolve(&self, capabilities: &CapabilitySet) -> IdentificationResult {
        for strategy in &self.strategies {
            let source = strategy.source();
            debug!("Trying {}", source);

            match AssertUnwindSafe(strategy.attempt(capabilities))
                .catch_unwind()
                .await
            {
                Ok(Some(result)) => {
                    info!("Resolved device identifier from {}", source);
                    return result;
                }
                Ok(None) => {}
                Err(_) => warn!("{} strategy panicked, moving on", source),
            }
        }

        info!("No identification source answered, generating identifier");
        IdentificationResult::fallback()
    }
}
