//! Host environment abstraction
//!
//! Identifier sources live outside the process: a native shell embedding the
//! app, media device enumeration, user-agent client hints and a handful of
//! hardware properties. Each source is a trait so the resolver can run
//! against a real host, a static profile, or a test double.

pub mod pending;
mod profile;

pub use pending::PendingReplies;
pub use profile::{AndroidProfile, HostProfile, IosProfile, MediaProfile};

use crate::error::DevIdResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Android shell bridge exposing two synchronous identifier calls
pub trait AndroidBridge: Send + Sync {
    /// `getAndroidId()`
    fn get_android_id(&self) -> DevIdResult<Option<String>>;

    /// `getDeviceSerial()`
    fn get_device_serial(&self) -> DevIdResult<Option<String>>;

    /// Whether the shell exposes `getAndroidId`
    fn exposes_android_id(&self) -> bool {
        true
    }

    /// Whether the shell exposes `getDeviceSerial`
    fn exposes_device_serial(&self) -> bool {
        true
    }
}

/// iOS shell bridge
///
/// Posting is fire-and-forget. The shell answers later by handing the value
/// to [`PendingReplies::complete`] with the token it was given.
pub trait IosBridge: Send + Sync {
    fn post_message(&self, token: Uuid, message: &str) -> DevIdResult<()>;
}

/// Capture permission requested before enumerating media devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

/// One entry of a media device enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDeviceInfo {
    pub device_id: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub label: String,
}

impl MediaDeviceInfo {
    /// Device entry with only an id
    pub fn with_id(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            kind: String::new(),
            label: String::new(),
        }
    }
}

/// Media device enumeration API
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Ask the user for capture permission
    async fn request_permission(&self, constraints: MediaConstraints) -> DevIdResult<()>;

    /// List connected media devices in host-defined order
    async fn enumerate_devices(&self) -> DevIdResult<Vec<MediaDeviceInfo>>;
}

/// High-entropy client hint keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HintKey {
    Platform,
    PlatformVersion,
    Architecture,
    Model,
    UaFullVersion,
}

impl HintKey {
    /// Wire name of the hint
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::PlatformVersion => "platformVersion",
            Self::Architecture => "architecture",
            Self::Model => "model",
            Self::UaFullVersion => "uaFullVersion",
        }
    }
}

/// Record returned by a high-entropy client hints request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HighEntropyValues {
    pub platform: Option<String>,
    pub platform_version: Option<String>,
    pub architecture: Option<String>,
    pub model: Option<String>,
    pub ua_full_version: Option<String>,
}

impl HighEntropyValues {
    /// Keep only the requested hints
    pub fn restricted_to(&self, hints: &[HintKey]) -> Self {
        let pick = |key: HintKey, value: &Option<String>| {
            if hints.contains(&key) {
                value.clone()
            } else {
                None
            }
        };

        Self {
            platform: pick(HintKey::Platform, &self.platform),
            platform_version: pick(HintKey::PlatformVersion, &self.platform_version),
            architecture: pick(HintKey::Architecture, &self.architecture),
            model: pick(HintKey::Model, &self.model),
            ua_full_version: pick(HintKey::UaFullVersion, &self.ua_full_version),
        }
    }
}

/// User-agent client hints API
#[async_trait]
pub trait UserAgentData: Send + Sync {
    async fn get_high_entropy_values(&self, hints: &[HintKey]) -> DevIdResult<HighEntropyValues>;
}

/// Screen geometry
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    pub color_depth: Option<u32>,
    pub pixel_ratio: Option<f64>,
}

/// Hardware properties a host may report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareProfile {
    /// Logical processor count
    pub logical_cores: Option<u32>,

    /// Approximate device memory in GB
    pub device_memory_gb: Option<f64>,

    pub screen: Option<ScreenInfo>,

    /// Network effective type ("4g", "wifi", ...)
    pub network_type: Option<String>,

    /// Platform string ("Linux x86_64", "MacIntel", ...)
    pub platform: Option<String>,
}

impl HardwareProfile {
    /// Profile of the machine this process runs on
    pub fn local() -> Self {
        let logical_cores = std::thread::available_parallelism()
            .ok()
            .and_then(|n| u32::try_from(n.get()).ok());

        let os = match std::env::consts::OS {
            "linux" => "Linux",
            "macos" => "macOS",
            "windows" => "Windows",
            other => other,
        };

        Self {
            logical_cores,
            device_memory_gb: None,
            screen: None,
            network_type: None,
            platform: Some(format!("{} {}", os, std::env::consts::ARCH)),
        }
    }
}

/// Informational web platform features, displayed but never used for lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebFeatures {
    pub webrtc: bool,
    pub bluetooth: bool,
    pub usb: bool,
    pub serial: bool,
    pub hid: bool,
    pub credentials: bool,
}

/// Everything the resolver can reach on one host
#[derive(Clone, Default)]
pub struct Host {
    pub android: Option<Arc<dyn AndroidBridge>>,
    pub ios: Option<Arc<dyn IosBridge>>,
    pub media: Option<Arc<dyn MediaDevices>>,
    pub user_agent_data: Option<Arc<dyn UserAgentData>>,
    pub hardware: HardwareProfile,
    pub features: WebFeatures,

    /// Reply registry shared with the iOS bridge
    pub replies: Arc<PendingReplies>,
}

impl Host {
    /// Host backed by the local machine: hardware properties only
    pub fn local() -> Self {
        Self {
            hardware: HardwareProfile::local(),
            ..Self::default()
        }
    }

    pub fn with_android(mut self, bridge: Arc<dyn AndroidBridge>) -> Self {
        self.android = Some(bridge);
        self
    }

    pub fn with_ios(mut self, bridge: Arc<dyn IosBridge>) -> Self {
        self.ios = Some(bridge);
        self
    }

    pub fn with_media(mut self, media: Arc<dyn MediaDevices>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn with_user_agent_data(mut self, data: Arc<dyn UserAgentData>) -> Self {
        self.user_agent_data = Some(data);
        self
    }

    pub fn with_hardware(mut self, hardware: HardwareProfile) -> Self {
        self.hardware = hardware;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restricted_to_drops_unrequested_hints() {
        let values = HighEntropyValues {
            platform: Some("Android".into()),
            model: Some("Pixel 7".into()),
            ..Default::default()
        };

        let only_model = values.restricted_to(&[HintKey::Model]);
        assert_eq!(only_model.model.as_deref(), Some("Pixel 7"));
        assert!(only_model.platform.is_none());
    }

    #[test]
    fn hint_keys_use_wire_names() {
        assert_eq!(HintKey::PlatformVersion.as_str(), "platformVersion");
        assert_eq!(HintKey::UaFullVersion.as_str(), "uaFullVersion");
    }

    #[test]
    fn local_profile_reports_platform() {
        let profile = HardwareProfile::local();
        assert!(profile.platform.is_some());
        assert!(profile.screen.is_none());
    }

    #[test]
    fn local_host_has_no_bridges() {
        let host = Host::local();
        assert!(host.android.is_none());
        assert!(host.ios.is_none());
        assert!(host.media.is_none());
        assert!(host.user_agent_data.is_none());
    }
}
