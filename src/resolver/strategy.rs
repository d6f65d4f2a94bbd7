//! Identifier strategy abstraction
//!
//! Each identification source is one strategy. The resolver walks an ordered
//! list of them and stops at the first one that yields a value.

use super::{IdentificationResult, SourceTag};
use crate::capability::CapabilitySet;
use crate::error::DevIdResult;
use async_trait::async_trait;
use tracing::{debug, warn};

/// One identification source in the fallback chain
#[async_trait]
pub trait IdentifierStrategy: Send + Sync {
    /// Provenance tag attached to identifiers from this source
    fn source(&self) -> SourceTag;

    /// Whether the host offers what this source needs
    fn is_supported(&self, capabilities: &CapabilitySet) -> bool;

    /// Query the source. `Ok(None)` and `Ok(Some(""))` both mean "nothing".
    async fn lookup(&self) -> DevIdResult<Option<String>>;

    /// Run this step of the chain. Never fails: errors become `None`.
    async fn attempt(&self, capabilities: &CapabilitySet) -> Option<IdentificationResult> {
        let source = self.source();

        if !self.is_supported(capabilities) {
            debug!("Skipping {}: not supported by host", source);
            return None;
        }

        match self.lookup().await {
            Ok(Some(id)) if !id.is_empty() => Some(IdentificationResult::new(id, source)),
            Ok(_) => {
                debug!("{} returned no identifier", source);
                None
            }
            Err(e) if e.is_step_miss() => {
                debug!("{} unavailable: {}", source, e);
                None
            }
            Err(e) => {
                warn!("Error reading {}: {}", source, e);
                None
            }
        }
    }
}
