//! Command-line argument definitions for the Bindery CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the round manifest, configuration file,
//! build variant and logging verbosity.

use clap::Parser;

use bindery::config::BuildVariant;

/// Command-line arguments for the Bindery validator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the round manifest (TOML)
    #[arg(help = "Path to the round manifest")]
    pub manifest: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Build variant (test, production); overrides the configuration file
    #[arg(long)]
    pub variant: Option<BuildVariant>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
