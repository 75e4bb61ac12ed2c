//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `http_loadgen` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Fatal error reporting and exit codes
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use http_loadgen::initialization::{init_logger_with, print_fatal_error};
use http_loadgen::{run_load, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments (usage errors exit with status 2)
    let opt = Opt::parse();

    // Validate before any worker starts; fatal lines go to stderr and need no logger
    let config = match Config::try_from(opt) {
        Ok(config) => config,
        Err(e) => {
            print_fatal_error(&e.to_string());
            process::exit(1);
        }
    };

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    match run_load(config).await {
        Ok(_report) => Ok(()),
        Err(e) => {
            print_fatal_error(&format!("{:#}", e));
            process::exit(1);
        }
    }
}
