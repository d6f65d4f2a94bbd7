//! APIs command - supported host API checklist

use crate::capability::CapabilitySet;
use crate::error::DevIdResult;
use crate::host::Host;
use crate::ui::{self, UiContext};

/// Execute the apis command
pub async fn execute(host: &Host) -> DevIdResult<()> {
    let ctx = UiContext::detect();
    let capabilities = CapabilitySet::probe(host);

    ui::intro(&ctx, "Supported APIs");

    for (capability, available) in capabilities.report() {
        let status = if available { "supported" } else { "not supported" };
        ui::key_value_status(&ctx, capability.label(), status, available);
    }

    ui::remark(
        &ctx,
        &format!(
            "{} of {} APIs available",
            capabilities.count_available(),
            capabilities.report().len()
        ),
    );

    Ok(())
}
