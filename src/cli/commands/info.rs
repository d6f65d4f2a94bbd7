//! Info command - show what the host reports about its hardware

use crate::cli::args::InfoArgs;
use crate::error::DevIdResult;
use crate::host::{HardwareProfile, Host};
use crate::ui::{self, UiContext};
use serde::Serialize;

const UNKNOWN: &str = "unknown";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceInfo<'a> {
    hardware: &'a HardwareProfile,
    has_android_bridge: bool,
    has_ios_bridge: bool,
    has_media_devices: bool,
    has_client_hints: bool,
}

/// Execute the info command
pub async fn execute(args: InfoArgs, host: &Host) -> DevIdResult<()> {
    if args.json {
        let info = DeviceInfo {
            hardware: &host.hardware,
            has_android_bridge: host.android.is_some(),
            has_ios_bridge: host.ios.is_some(),
            has_media_devices: host.media.is_some(),
            has_client_hints: host.user_agent_data.is_some(),
        };
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let ctx = UiContext::detect();
    let hw = &host.hardware;

    ui::intro(&ctx, "Device Information");

    ui::section(&ctx, "Hardware");
    ui::key_value(&ctx, "Platform", hw.platform.as_deref().unwrap_or(UNKNOWN));
    ui::key_value(&ctx, "CPU cores", &optional(hw.logical_cores));
    ui::key_value(
        &ctx,
        "Memory",
        &hw.device_memory_gb
            .map(|gb| format!("{} GB", gb))
            .unwrap_or_else(|| UNKNOWN.to_string()),
    );

    ui::section(&ctx, "Display");
    match hw.screen {
        Some(screen) => {
            ui::key_value(&ctx, "Resolution", &format!("{}x{}", screen.width, screen.height));
            ui::key_value(&ctx, "Color depth", &optional(screen.color_depth));
            ui::key_value(&ctx, "Pixel ratio", &optional(screen.pixel_ratio));
        }
        None => ui::key_value(&ctx, "Resolution", UNKNOWN),
    }

    ui::section(&ctx, "Network");
    ui::key_value(&ctx, "Connection", hw.network_type.as_deref().unwrap_or(UNKNOWN));

    Ok(())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
