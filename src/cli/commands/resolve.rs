//! Resolve command - run the identification chain

use crate::capability::CapabilitySet;
use crate::cli::args::ResolveArgs;
use crate::config::Config;
use crate::error::DevIdResult;
use crate::host::Host;
use crate::resolver::{Resolver, SourceTag};
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &Config, host: &Host) -> DevIdResult<()> {
    let capabilities = CapabilitySet::probe(host);
    let resolver = Resolver::new(host, &config.resolver);

    if args.json {
        let result = resolver.resolve(&capabilities).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let ctx = UiContext::detect();
    ui::intro(&ctx, "Device ID");

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Resolving device identifier...");
    let result = resolver.resolve(&capabilities).await;
    spinner.stop("Identifier resolved");

    ui::key_value(&ctx, "Device ID", &result.display_id());
    ui::key_value(&ctx, "Source", result.source.label());

    if result.source == SourceTag::FallbackGenerated {
        ui::remark(&ctx, "No host API produced an identifier; this id changes on every run");
    }

    Ok(())
}
