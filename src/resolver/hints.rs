//! High-entropy user-agent client hints

use super::strategy::IdentifierStrategy;
use super::SourceTag;
use crate::capability::{Capability, CapabilitySet};
use crate::error::{DevIdError, DevIdResult};
use crate::host::{HighEntropyValues, HintKey, UserAgentData};
use async_trait::async_trait;
use std::sync::Arc;

/// Hints requested from the host
pub const REQUESTED_HINTS: [HintKey; 5] = [
    HintKey::Platform,
    HintKey::PlatformVersion,
    HintKey::Architecture,
    HintKey::Model,
    HintKey::UaFullVersion,
];

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Derive an identifier from client hints.
///
/// The device model wins. Otherwise platform and platform version are joined
/// with the architecture, which may be blank.
pub fn identifier_from_hints(hints: &HighEntropyValues) -> Option<String> {
    if let Some(model) = present(&hints.model) {
        return Some(model.to_string());
    }

    let platform = present(&hints.platform)?;
    let version = present(&hints.platform_version)?;
    let arch = hints.architecture.as_deref().unwrap_or("");
    Some(format!("{}-{}-{}", platform, version, arch))
}

pub struct ClientHintsStrategy {
    data: Option<Arc<dyn UserAgentData>>,
}

impl ClientHintsStrategy {
    pub fn new(data: Option<Arc<dyn UserAgentData>>) -> Self {
        Self { data }
    }
}

#[async_trait]
impl IdentifierStrategy for ClientHintsStrategy {
    fn source(&self) -> SourceTag {
        SourceTag::ClientHints
    }

    fn is_supported(&self, capabilities: &CapabilitySet) -> bool {
        capabilities.is_available(Capability::ClientHints)
    }

    async fn lookup(&self) -> DevIdResult<Option<String>> {
        let data = self
            .data
            .as_deref()
            .ok_or_else(|| DevIdError::BridgeUnavailable("user agent data".to_string()))?;

        let hints = data.get_high_entropy_values(&REQUESTED_HINTS).await?;
        identifier_from_hints(&hints)
            .map(Some)
            .ok_or_else(|| DevIdError::HintUnavailable("model or platform version".to_string()))
    }
}
