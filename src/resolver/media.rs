//! Media device enumeration

use super::strategy::IdentifierStrategy;
use super::SourceTag;
use crate::capability::{Capability, CapabilitySet};
use crate::error::{DevIdError, DevIdResult};
use crate::host::{MediaConstraints, MediaDeviceInfo, MediaDevices};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Device ids that name a role rather than a device
pub const SENTINEL_DEVICE_IDS: [&str; 2] = ["default", "communications"];

/// First concrete device id in enumeration order.
///
/// Enumeration order belongs to the host and may change between calls when
/// devices or permissions change, so the chosen id is not stable.
pub fn first_concrete_device_id(devices: &[MediaDeviceInfo]) -> Option<&str> {
    devices
        .iter()
        .map(|d| d.device_id.as_str())
        .find(|id| !id.is_empty() && !SENTINEL_DEVICE_IDS.contains(id))
}

/// Identifier taken from the connected media devices
pub struct MediaDeviceStrategy {
    media: Option<Arc<dyn MediaDevices>>,
    request_permission: bool,
}

impl MediaDeviceStrategy {
    pub fn new(media: Option<Arc<dyn MediaDevices>>, request_permission: bool) -> Self {
        Self {
            media,
            request_permission,
        }
    }
}

#[async_trait]
impl IdentifierStrategy for MediaDeviceStrategy {
    fn source(&self) -> SourceTag {
        SourceTag::MediaDevice
    }

    fn is_supported(&self, capabilities: &CapabilitySet) -> bool {
        capabilities.is_available(Capability::MediaDevices)
    }

    async fn lookup(&self) -> DevIdResult<Option<String>> {
        let media = self
            .media
            .as_deref()
            .ok_or_else(|| DevIdError::BridgeUnavailable("media devices".to_string()))?;

        if self.request_permission {
            let constraints = MediaConstraints {
                audio: true,
                video: true,
            };
            // Without permission ids may be blank, but enumeration still runs
            if let Err(e) = media.request_permission(constraints).await {
                debug!("Media access denied: {}", e);
            }
        }

        let devices = media.enumerate_devices().await?;
        first_concrete_device_id(&devices)
            .map(|id| Some(id.to_string()))
            .ok_or(DevIdError::EnumerationEmpty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeMedia {
        grant: bool,
        devices: Vec<&'static str>,
        asked: AtomicBool,
    }

    impl FakeMedia {
        fn new(grant: bool, devices: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                grant,
                devices,
                asked: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl MediaDevices for FakeMedia {
        async fn request_permission(&self, constraints: MediaConstraints) -> DevIdResult<()> {
            assert!(constraints.audio && constraints.video);
            self.asked.store(true, Ordering::SeqCst);
            if self.grant {
                Ok(())
            } else {
                Err(DevIdError::PermissionDenied("capture".into()))
            }
        }

        async fn enumerate_devices(&self) -> DevIdResult<Vec<MediaDeviceInfo>> {
            Ok(self
                .devices
                .iter()
                .map(|id| MediaDeviceInfo::with_id(*id))
                .collect())
        }
    }

    fn caps() -> CapabilitySet {
        CapabilitySet::with_available([Capability::MediaDevices])
    }

    #[tokio::test]
    async fn skips_sentinels() {
        let media = FakeMedia::new(true, vec!["default", "communications", "abc123"]);
        let result = MediaDeviceStrategy::new(Some(media as Arc<dyn MediaDevices>), true)
            .attempt(&caps())
            .await
            .unwrap();

        assert_eq!(result.device_id, "abc123");
        assert_eq!(result.source, SourceTag::MediaDevice);
    }

    #[tokio::test]
    async fn only_sentinels_is_a_miss() {
        let media = FakeMedia::new(true, vec!["default", "communications"]);
        assert!(MediaDeviceStrategy::new(Some(media as Arc<dyn MediaDevices>), true)
            .attempt(&caps())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn permission_denial_is_ignored() {
        let media = FakeMedia::new(false, vec!["", "mic-1", "cam-2"]);
        let result = MediaDeviceStrategy::new(Some(media.clone() as Arc<dyn MediaDevices>), true)
            .attempt(&caps())
            .await
            .unwrap();

        assert!(media.asked.load(Ordering::SeqCst));
        assert_eq!(result.device_id, "mic-1");
    }

    #[tokio::test]
    async fn permission_request_can_be_disabled() {
        let media = FakeMedia::new(true, vec!["cam-2"]);
        MediaDeviceStrategy::new(Some(media.clone() as Arc<dyn MediaDevices>), false)
            .attempt(&caps())
            .await
            .unwrap();
        assert!(!media.asked.load(Ordering::SeqCst));
    }

    #[test]
    fn first_concrete_keeps_enumeration_order() {
        let devices = vec![
            MediaDeviceInfo::with_id("default"),
            MediaDeviceInfo::with_id("zzz"),
            MediaDeviceInfo::with_id("aaa"),
        ];
        assert_eq!(first_concrete_device_id(&devices), Some("zzz"));
        assert_eq!(first_concrete_device_id(&[]), None);
    }
}
