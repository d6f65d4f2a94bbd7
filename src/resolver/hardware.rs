//! Hardware profile composite

use super::strategy::IdentifierStrategy;
use super::SourceTag;
use crate::capability::CapabilitySet;
use crate::error::DevIdResult;
use crate::host::HardwareProfile;
use async_trait::async_trait;

/// Separator between profile tokens
pub const TOKEN_SEPARATOR: &str = "_";

/// `label-value` tokens for every property the profile reports
pub fn profile_tokens(profile: &HardwareProfile) -> Vec<String> {
    let mut tokens = Vec::new();

    if let Some(cores) = profile.logical_cores.filter(|c| *c > 0) {
        tokens.push(format!("cores-{}", cores));
    }

    if let Some(memory) = profile.device_memory_gb.filter(|m| *m > 0.0) {
        tokens.push(format!("memory-{}", memory));
    }

    if let Some(screen) = profile.screen {
        if let Some(depth) = screen.color_depth.filter(|d| *d > 0) {
            tokens.push(format!("display-{}x{}x{}", screen.width, screen.height, depth));
        }
    }

    if let Some(network) = profile.network_type.as_deref().filter(|n| !n.is_empty()) {
        tokens.push(format!("network-{}", network));
    }

    if let Some(platform) = profile.platform.as_deref().filter(|p| !p.is_empty()) {
        tokens.push(format!("platform-{}", platform));
    }

    tokens
}

/// Composite identifier, or `None` when the profile is empty
pub fn composite_identifier(profile: &HardwareProfile) -> Option<String> {
    let tokens = profile_tokens(profile);
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(TOKEN_SEPARATOR))
    }
}

pub struct HardwareProfileStrategy {
    profile: HardwareProfile,
}

impl HardwareProfileStrategy {
    pub fn new(profile: HardwareProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl IdentifierStrategy for HardwareProfileStrategy {
    fn source(&self) -> SourceTag {
        SourceTag::HardwareProfile
    }

    // Each property is optional on its own; an empty profile is a miss.
    fn is_supported(&self, _capabilities: &CapabilitySet) -> bool {
        true
    }

    async fn lookup(&self) -> DevIdResult<Option<String>> {
        Ok(composite_identifier(&self.profile))
    }
}
