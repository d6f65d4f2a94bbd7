//! Capability probing
//!
//! A [`CapabilitySet`] is computed once from a [`Host`] and never changes
//! afterwards. Callers that want fresh data probe again.

use crate::host::Host;
use std::collections::BTreeMap;
use std::fmt;

/// A host capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    AndroidBridge,
    DeviceSerial,
    IosBridge,
    MediaDevices,
    ClientHints,
    DeviceMemory,
    HardwareConcurrency,
    WebRtc,
    Bluetooth,
    Usb,
    Serial,
    Hid,
    CredentialManagement,
}

impl Capability {
    /// Every capability in display order
    pub const ALL: [Capability; 13] = [
        Self::AndroidBridge,
        Self::DeviceSerial,
        Self::IosBridge,
        Self::ClientHints,
        Self::DeviceMemory,
        Self::HardwareConcurrency,
        Self::MediaDevices,
        Self::WebRtc,
        Self::Bluetooth,
        Self::Usb,
        Self::Serial,
        Self::Hid,
        Self::CredentialManagement,
    ];

    /// Stable identifier
    pub fn name(&self) -> &'static str {
        match self {
            Self::AndroidBridge => "androidBridge",
            Self::DeviceSerial => "deviceSerial",
            Self::IosBridge => "iosBridge",
            Self::MediaDevices => "mediaDevices",
            Self::ClientHints => "clientHints",
            Self::DeviceMemory => "deviceMemory",
            Self::HardwareConcurrency => "hardwareConcurrency",
            Self::WebRtc => "webRTC",
            Self::Bluetooth => "bluetooth",
            Self::Usb => "usb",
            Self::Serial => "serial",
            Self::Hid => "hid",
            Self::CredentialManagement => "credentialManagement",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::AndroidBridge => "Android ID",
            Self::DeviceSerial => "Device Serial",
            Self::IosBridge => "iOS Device ID",
            Self::MediaDevices => "Media Devices API",
            Self::ClientHints => "Device Info API",
            Self::DeviceMemory => "Memory API",
            Self::HardwareConcurrency => "CPU Cores API",
            Self::WebRtc => "WebRTC",
            Self::Bluetooth => "Bluetooth API",
            Self::Usb => "USB API",
            Self::Serial => "Serial API",
            Self::Hid => "HID API",
            Self::CredentialManagement => "Credential Management API",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable snapshot of which capabilities a host offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitySet {
    available: BTreeMap<Capability, bool>,
}

impl CapabilitySet {
    /// Probe a host
    pub fn probe(host: &Host) -> Self {
        let android = host.android.as_deref();

        Self::from_pairs([
            (
                Capability::AndroidBridge,
                android.is_some_and(|b| b.exposes_android_id()),
            ),
            (
                Capability::DeviceSerial,
                android.is_some_and(|b| b.exposes_device_serial()),
            ),
            (Capability::IosBridge, host.ios.is_some()),
            (Capability::MediaDevices, host.media.is_some()),
            (Capability::ClientHints, host.user_agent_data.is_some()),
            (
                Capability::DeviceMemory,
                host.hardware.device_memory_gb.is_some(),
            ),
            (
                Capability::HardwareConcurrency,
                host.hardware.logical_cores.is_some(),
            ),
            (Capability::WebRtc, host.features.webrtc),
            (Capability::Bluetooth, host.features.bluetooth),
            (Capability::Usb, host.features.usb),
            (Capability::Serial, host.features.serial),
            (Capability::Hid, host.features.hid),
            (Capability::CredentialManagement, host.features.credentials),
        ])
    }

    /// A set where nothing is available
    pub fn none() -> Self {
        Self::from_pairs([])
    }

    /// A set where exactly `capabilities` are available
    pub fn with_available(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self::from_pairs(capabilities.into_iter().map(|c| (c, true)))
    }

    fn from_pairs(pairs: impl IntoIterator<Item = (Capability, bool)>) -> Self {
        let mut available: BTreeMap<Capability, bool> =
            Capability::ALL.iter().map(|c| (*c, false)).collect();
        available.extend(pairs);
        Self { available }
    }

    pub fn is_available(&self, capability: Capability) -> bool {
        self.available.get(&capability).copied().unwrap_or(false)
    }

    /// Capabilities with their availability, in display order
    pub fn report(&self) -> Vec<(Capability, bool)> {
        Capability::ALL
            .iter()
            .map(|c| (*c, self.is_available(*c)))
            .collect()
    }

    /// Number of available capabilities
    pub fn count_available(&self) -> usize {
        self.available.values().filter(|v| **v).count()
    }
}
