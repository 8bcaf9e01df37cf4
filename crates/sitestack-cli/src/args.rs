//! Command-line argument definitions for the sitestack CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments override configuration file values, select the
//! output path and format, and control logging verbosity.

use clap::Parser;

use sitestack::{Topology, export::Format};

/// Command-line arguments for the sitestack tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Cloud region code, e.g. eu-central-1
    #[arg(long)]
    pub region: Option<String>,

    /// Name of the bucket holding the site
    #[arg(short, long)]
    pub bucket: Option<String>,

    /// Key of the index document
    #[arg(long)]
    pub index_document: Option<String>,

    /// Deployment topology (private_edge_cached, public_direct)
    #[arg(short, long)]
    pub topology: Option<Topology>,

    /// Deployment name
    #[arg(long)]
    pub stack_name: Option<String>,

    /// Path to a content template with one `{{ timestamp }}` placeholder,
    /// replacing the default index document
    #[arg(long)]
    pub template: Option<String>,

    /// Account id of the caller; skips the STS lookup
    #[arg(long)]
    pub account_id: Option<String>,

    /// Path to the output file
    #[arg(short, long, default_value = "plan.json")]
    pub output: String,

    /// Output format (plan, terraform, dot)
    #[arg(short, long, default_value = "plan")]
    pub format: Format,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
