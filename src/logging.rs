//! Logging infrastructure.
//!
//! The core logs through the `log` facade; this module provides the
//! `env_logger` initialization for embedding applications. Log levels are
//! determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. The `quiet` (error only) and `verbose` (debug/trace) flags
//! 3. Default: info level

use env_logger::Builder;
use log::LevelFilter;
use std::env;

/// Initialize the logging subsystem.
///
/// This function should be called once at the start of the embedding
/// application, before any logging calls are made.
///
/// # Arguments
///
/// * `verbose` - Verbosity count (0=info, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by `RUST_LOG`)
///
/// # Panics
///
/// This function will panic if called more than once, as `env_logger`
/// can only be initialized once per process.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    if env::var("RUST_LOG").is_ok() {
        // RUST_LOG takes precedence over the flags
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    builder.init();
}

/// Determine the log level from the verbosity flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
