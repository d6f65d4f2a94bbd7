//! Static host profiles
//!
//! A profile describes a simulated device in TOML. A section being present
//! means the corresponding bridge or API exists on the host:
//!
//! ```toml
//! [android]
//! android_id = "9774d56d682e549c"
//!
//! [ios]
//! device_id = "6F9619FF-8B86-D011-B42D-00C04FC964FF"
//! reply_delay_ms = 50
//!
//! [media]
//! permission = false
//! devices = ["default", "communications", "c0ffee"]
//!
//! [client_hints]
//! model = "Pixel 7"
//!
//! [hardware]
//! logical_cores = 8
//! ```

use super::{
    AndroidBridge, HardwareProfile, HighEntropyValues, HintKey, Host, IosBridge,
    MediaConstraints, MediaDeviceInfo, MediaDevices, PendingReplies, UserAgentData, WebFeatures,
};
use crate::error::{DevIdError, DevIdResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// A simulated host environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostProfile {
    pub android: Option<AndroidProfile>,
    pub ios: Option<IosProfile>,
    pub media: Option<MediaProfile>,
    pub client_hints: Option<HighEntropyValues>,
    pub hardware: HardwareProfile,
    pub features: WebFeatures,
}

/// Android shell answers. A missing key means the call is not exposed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AndroidProfile {
    pub android_id: Option<String>,
    pub device_serial: Option<String>,
}

/// iOS shell behavior. Without a `device_id` the shell never replies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IosProfile {
    pub device_id: Option<String>,
    pub reply_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaProfile {
    /// Whether the capture permission prompt is granted
    pub permission: bool,
    /// Device ids in enumeration order
    pub devices: Vec<String>,
}

impl Default for MediaProfile {
    fn default() -> Self {
        Self {
            permission: true,
            devices: vec![],
        }
    }
}

impl HostProfile {
    /// Load a profile from a TOML file
    pub async fn load(path: &Path) -> DevIdResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| DevIdError::io(format!("reading profile from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| DevIdError::ProfileInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Build a host whose bridges answer from this profile
    pub fn into_host(self) -> Host {
        let replies = Arc::new(PendingReplies::new());

        let android = self
            .android
            .map(|p| Arc::new(ProfileAndroid(p)) as Arc<dyn AndroidBridge>);
        let ios = self.ios.map(|p| {
            Arc::new(ProfileIos {
                profile: p,
                replies: Arc::clone(&replies),
            }) as Arc<dyn IosBridge>
        });
        let media = self
            .media
            .map(|p| Arc::new(ProfileMedia(p)) as Arc<dyn MediaDevices>);
        let user_agent_data = self
            .client_hints
            .map(|v| Arc::new(ProfileHints(v)) as Arc<dyn UserAgentData>);

        Host {
            android,
            ios,
            media,
            user_agent_data,
            hardware: self.hardware,
            features: self.features,
            replies,
        }
    }
}

struct ProfileAndroid(AndroidProfile);

impl AndroidBridge for ProfileAndroid {
    fn get_android_id(&self) -> DevIdResult<Option<String>> {
        Ok(self.0.android_id.clone())
    }

    fn get_device_serial(&self) -> DevIdResult<Option<String>> {
        Ok(self.0.device_serial.clone())
    }

    fn exposes_android_id(&self) -> bool {
        self.0.android_id.is_some()
    }

    fn exposes_device_serial(&self) -> bool {
        self.0.device_serial.is_some()
    }
}

struct ProfileIos {
    profile: IosProfile,
    replies: Arc<PendingReplies>,
}

impl IosBridge for ProfileIos {
    fn post_message(&self, token: Uuid, message: &str) -> DevIdResult<()> {
        debug!("iOS bridge received '{}' ({})", message, token);

        let Some(device_id) = self.profile.device_id.clone() else {
            return Ok(());
        };
        let delay = Duration::from_millis(self.profile.reply_delay_ms);
        let replies = Arc::clone(&self.replies);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            replies.complete(token, device_id);
        });
        Ok(())
    }
}

struct ProfileMedia(MediaProfile);

#[async_trait]
impl MediaDevices for ProfileMedia {
    async fn request_permission(&self, _constraints: MediaConstraints) -> DevIdResult<()> {
        if self.0.permission {
            Ok(())
        } else {
            Err(DevIdError::PermissionDenied("audio/video capture".to_string()))
        }
    }

    async fn enumerate_devices(&self) -> DevIdResult<Vec<MediaDeviceInfo>> {
        Ok(self
            .0
            .devices
            .iter()
            .map(MediaDeviceInfo::with_id)
            .collect())
    }
}

struct ProfileHints(HighEntropyValues);

#[async_trait]
impl UserAgentData for ProfileHints {
    async fn get_high_entropy_values(&self, hints: &[HintKey]) -> DevIdResult<HighEntropyValues> {
        Ok(self.0.restricted_to(hints))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_profile_has_no_bridges() {
        let host = HostProfile::default().into_host();
        assert!(host.android.is_none());
        assert!(host.ios.is_none());
        assert!(host.media.is_none());
        assert!(host.user_agent_data.is_none());
    }

    #[test]
    fn android_exposure_follows_keys() {
        let profile: HostProfile = toml::from_str(
            r#"
            [android]
            android_id = "abc"
            "#,
        )
        .unwrap();
        let host = profile.into_host();
        let android = host.android.unwrap();

        assert!(android.exposes_android_id());
        assert!(!android.exposes_device_serial());
        assert_eq!(android.get_android_id().unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn ios_profile_replies_through_registry() {
        let profile: HostProfile = toml::from_str(
            r#"
            [ios]
            device_id = "XYZ"
            "#,
        )
        .unwrap();
        let host = profile.into_host();
        let (token, rx) = host.replies.register();

        host.ios.unwrap().post_message(token, "getDeviceId").unwrap();
        let value = host
            .replies
            .wait(token, rx, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(value, "XYZ");
    }

    #[tokio::test]
    async fn media_permission_denied() {
        let media = ProfileMedia(MediaProfile {
            permission: false,
            devices: vec!["abc".into()],
        });
        let err = media
            .request_permission(MediaConstraints {
                audio: true,
                video: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DevIdError::PermissionDenied(_)));
        assert_eq!(media.enumerate_devices().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn load_reports_invalid_profile() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("profile.toml");
        tokio::fs::write(&path, "[hardware]\nlogical_cores = \"many\"")
            .await
            .unwrap();

        let err = HostProfile::load(&path).await.unwrap_err();
        assert!(matches!(err, DevIdError::ProfileInvalid { .. }));
    }
}
