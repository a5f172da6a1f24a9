//! CLI logic for the Bindery validator.
//!
//! Loads a round manifest, runs one processing round and reports the
//! resolved module set of every component.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use bindery::{BinderyError, ComponentModules, RoundProcessor};

/// Run the Bindery CLI application
///
/// Processes the manifest named in `args` and returns the resolved modules.
///
/// # Errors
///
/// Returns `BinderyError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Manifest errors
/// - Internal dispatch failures
/// - Rounds that recorded at least one error finding
pub fn run(args: &Args) -> Result<ComponentModules, BinderyError> {
    info!(manifest_path = args.manifest; "Processing round");

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(variant) = args.variant {
        app_config = app_config.with_variant(variant);
    }

    let source = fs::read_to_string(&args.manifest)?;

    let processor = RoundProcessor::new(app_config);
    let round = processor.load(&source)?;
    let outcome = processor.process(&round)?;

    let modules = outcome
        .into_result()
        .map_err(|err| err.with_manifest_source(source, round.spans()))?;

    info!(components = modules.len(); "Round completed without errors");

    Ok(modules)
}
