//! CLI logic for the sitestack tool.
//!
//! This module contains the core CLI logic: loading configuration,
//! synthesizing the stack, emitting the plan and writing the export.

pub mod error_adapter;

mod args;
mod config;
mod identity;

pub use args::Args;

use std::{fs, str::FromStr};

use log::{LevelFilter, info, warn};

use sitestack::{
    SitestackError, StackBuilder,
    content::SystemClock,
    emit::BackendReferenceResolver,
    identity::{IdentityLookup, StaticIdentity},
};

/// Run the sitestack CLI application
///
/// Synthesizes the configured stack, emits its provisioning plan and writes
/// it to the output file in the requested format.
///
/// # Errors
///
/// Returns `SitestackError` for:
/// - File I/O errors
/// - Configuration loading and validation errors
/// - Template and output expression errors
/// - Caller identity lookup errors
/// - Export errors
pub fn run(args: &Args) -> Result<(), SitestackError> {
    info!(
        output_path = args.output,
        format:% = args.format;
        "Synthesizing stack"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let app_config = config::apply_overrides(app_config, args)?;

    let builder = StackBuilder::new(app_config);
    let params = builder.parameters()?;
    if args.account_id.is_some() && !params.topology().has_distribution() {
        warn!(topology:% = params.topology(); "--account-id is not used by this topology");
    }

    let identity = identity_lookup(args, params.region())?;
    let graph = builder.synthesize(&SystemClock)?;
    let plan = builder.emit(graph, &BackendReferenceResolver, identity.as_ref())?;
    let rendered = builder.export(&plan, args.format)?;

    fs::write(&args.output, rendered)?;

    for output in plan.outputs() {
        info!(name:% = output.name(), value = output.value(); "Declared output");
    }
    info!(output_file = args.output; "Plan exported successfully");

    Ok(())
}

/// Install the `env_logger` backend at `level`.
///
/// An unknown level name falls back to `warn` with a note on stderr.
pub fn init_logging(level: &str) -> LevelFilter {
    let filter = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Unknown log level `{level}`, logging at `warn`");
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(filter)
        .init();
    filter
}

fn identity_lookup(
    args: &Args,
    region: &str,
) -> Result<Box<dyn IdentityLookup>, SitestackError> {
    match &args.account_id {
        Some(account_id) => Ok(Box::new(StaticIdentity::new(account_id.parse()?))),
        None => Ok(remote_identity(region)),
    }
}

#[cfg(feature = "sts")]
fn remote_identity(region: &str) -> Box<dyn IdentityLookup> {
    Box::new(identity::StsIdentity::new(region))
}

#[cfg(not(feature = "sts"))]
fn remote_identity(_region: &str) -> Box<dyn IdentityLookup> {
    Box::new(identity::UnavailableIdentity::new(
        "no --account-id given and STS support is not compiled in",
    ))
}
