//! Native shell bridges (Android id, iOS message bridge, Android serial)

use super::strategy::IdentifierStrategy;
use super::SourceTag;
use crate::capability::{Capability, CapabilitySet};
use crate::error::{DevIdError, DevIdResult};
use crate::host::{AndroidBridge, IosBridge, PendingReplies};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Message posted to the iOS shell to request the identifier
pub const IOS_REQUEST_MESSAGE: &str = "getDeviceId";

fn android_bridge(bridge: &Option<Arc<dyn AndroidBridge>>) -> DevIdResult<&dyn AndroidBridge> {
    bridge
        .as_deref()
        .ok_or_else(|| DevIdError::BridgeUnavailable("Android".to_string()))
}

/// `getAndroidId()` on the Android shell
pub struct AndroidIdStrategy {
    bridge: Option<Arc<dyn AndroidBridge>>,
}

impl AndroidIdStrategy {
    pub fn new(bridge: Option<Arc<dyn AndroidBridge>>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl IdentifierStrategy for AndroidIdStrategy {
    fn source(&self) -> SourceTag {
        SourceTag::NativeAndroid
    }

    fn is_supported(&self, capabilities: &CapabilitySet) -> bool {
        capabilities.is_available(Capability::AndroidBridge)
    }

    async fn lookup(&self) -> DevIdResult<Option<String>> {
        android_bridge(&self.bridge)?.get_android_id()
    }
}

/// `getDeviceSerial()` on the Android shell
pub struct DeviceSerialStrategy {
    bridge: Option<Arc<dyn AndroidBridge>>,
}

impl DeviceSerialStrategy {
    pub fn new(bridge: Option<Arc<dyn AndroidBridge>>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl IdentifierStrategy for DeviceSerialStrategy {
    fn source(&self) -> SourceTag {
        SourceTag::DeviceSerial
    }

    fn is_supported(&self, capabilities: &CapabilitySet) -> bool {
        capabilities.is_available(Capability::DeviceSerial)
    }

    async fn lookup(&self) -> DevIdResult<Option<String>> {
        android_bridge(&self.bridge)?.get_device_serial()
    }
}

/// Request/reply exchange with the iOS shell, bounded by a timeout
pub struct IosBridgeStrategy {
    bridge: Option<Arc<dyn IosBridge>>,
    replies: Arc<PendingReplies>,
    timeout: Duration,
}

impl IosBridgeStrategy {
    pub fn new(
        bridge: Option<Arc<dyn IosBridge>>,
        replies: Arc<PendingReplies>,
        timeout: Duration,
    ) -> Self {
        Self {
            bridge,
            replies,
            timeout,
        }
    }
}

#[async_trait]
impl IdentifierStrategy for IosBridgeStrategy {
    fn source(&self) -> SourceTag {
        SourceTag::NativeIos
    }

    fn is_supported(&self, capabilities: &CapabilitySet) -> bool {
        capabilities.is_available(Capability::IosBridge)
    }

    async fn lookup(&self) -> DevIdResult<Option<String>> {
        let bridge = self
            .bridge
            .as_deref()
            .ok_or_else(|| DevIdError::BridgeUnavailable("iOS".to_string()))?;

        let (token, rx) = self.replies.register();
        if let Err(e) = bridge.post_message(token, IOS_REQUEST_MESSAGE) {
            self.replies.cancel(token);
            return Err(e);
        }

        let value = self.replies.wait(token, rx, self.timeout).await?;
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct FakeAndroid {
        id: DevIdResult<Option<String>>,
        serial: Option<String>,
    }

    impl AndroidBridge for FakeAndroid {
        fn get_android_id(&self) -> DevIdResult<Option<String>> {
            match &self.id {
                Ok(v) => Ok(v.clone()),
                Err(_) => Err(DevIdError::bridge_failed("getAndroidId", "shell crashed")),
            }
        }

        fn get_device_serial(&self) -> DevIdResult<Option<String>> {
            Ok(self.serial.clone())
        }
    }

    /// Records tokens; replies immediately when `answer` is set
    struct FakeIos {
        replies: Arc<PendingReplies>,
        answer: Option<String>,
        seen: Mutex<Vec<Uuid>>,
    }

    impl IosBridge for FakeIos {
        fn post_message(&self, token: Uuid, message: &str) -> DevIdResult<()> {
            assert_eq!(message, IOS_REQUEST_MESSAGE);
            self.seen.lock().unwrap().push(token);
            if let Some(answer) = &self.answer {
                self.replies.complete(token, answer.clone());
            }
            Ok(())
        }
    }

    fn android_caps() -> CapabilitySet {
        CapabilitySet::with_available([Capability::AndroidBridge, Capability::DeviceSerial])
    }

    #[tokio::test]
    async fn android_id_is_used() {
        let bridge: Arc<dyn AndroidBridge> = Arc::new(FakeAndroid {
            id: Ok(Some("9774d56d682e549c".into())),
            serial: None,
        });
        let result = AndroidIdStrategy::new(Some(bridge))
            .attempt(&android_caps())
            .await
            .unwrap();

        assert_eq!(result.device_id, "9774d56d682e549c");
        assert_eq!(result.source, SourceTag::NativeAndroid);
    }

    #[tokio::test]
    async fn android_error_is_a_miss() {
        let bridge: Arc<dyn AndroidBridge> = Arc::new(FakeAndroid {
            id: Err(DevIdError::Internal("unused".into())),
            serial: Some("SER".into()),
        });
        let strategy = AndroidIdStrategy::new(Some(Arc::clone(&bridge)));
        assert!(strategy.attempt(&android_caps()).await.is_none());

        let serial = DeviceSerialStrategy::new(Some(bridge))
            .attempt(&android_caps())
            .await
            .unwrap();
        assert_eq!(serial.source, SourceTag::DeviceSerial);
    }

    #[tokio::test]
    async fn empty_android_id_is_a_miss() {
        let bridge: Arc<dyn AndroidBridge> = Arc::new(FakeAndroid {
            id: Ok(Some(String::new())),
            serial: None,
        });
        assert!(AndroidIdStrategy::new(Some(bridge))
            .attempt(&android_caps())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn missing_capability_skips_bridge() {
        let bridge: Arc<dyn AndroidBridge> = Arc::new(FakeAndroid {
            id: Ok(Some("abc".into())),
            serial: None,
        });
        assert!(AndroidIdStrategy::new(Some(bridge))
            .attempt(&CapabilitySet::none())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn ios_reply_is_used_and_registration_cleared() {
        let replies = Arc::new(PendingReplies::new());
        let bridge = Arc::new(FakeIos {
            replies: Arc::clone(&replies),
            answer: Some("XYZ".into()),
            seen: Mutex::new(vec![]),
        });
        let strategy = IosBridgeStrategy::new(
            Some(bridge.clone() as Arc<dyn IosBridge>),
            Arc::clone(&replies),
            Duration::from_millis(1000),
        );

        let result = strategy
            .attempt(&CapabilitySet::with_available([Capability::IosBridge]))
            .await
            .unwrap();

        assert_eq!(result.device_id, "XYZ");
        assert_eq!(result.source, SourceTag::NativeIos);
        assert!(replies.is_empty());
        assert_eq!(bridge.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ios_silence_times_out_and_late_reply_is_ignored() {
        let replies = Arc::new(PendingReplies::new());
        let bridge = Arc::new(FakeIos {
            replies: Arc::clone(&replies),
            answer: None,
            seen: Mutex::new(vec![]),
        });
        let strategy = IosBridgeStrategy::new(
            Some(bridge.clone() as Arc<dyn IosBridge>),
            Arc::clone(&replies),
            Duration::from_millis(1000),
        );

        let started = tokio::time::Instant::now();
        let result = strategy
            .attempt(&CapabilitySet::with_available([Capability::IosBridge]))
            .await;

        assert!(result.is_none());
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert!(replies.is_empty());

        let token = bridge.seen.lock().unwrap()[0];
        assert!(!replies.complete(token, "late"));
    }
}
