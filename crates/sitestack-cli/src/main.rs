//! The `sitestack` binary.

use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info};

use sitestack_cli::{Args, error_adapter, init_logging};

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();
    let level = init_logging(&args.log_level);
    info!(level:?; "Starting sitestack");
    debug!(args:?; "Parsed arguments");

    match sitestack_cli::run(&args) {
        Ok(()) => {
            info!("Synthesis finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            for report in error_adapter::render(&err) {
                error!("{report}");
            }
            ExitCode::FAILURE
        }
    }
}
