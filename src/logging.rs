//! Diagnostic output
//!
//! Everything the commands report on the side (warnings, progress in
//! verbose mode, request traces in debug mode) goes through `tracing` to
//! stderr, so stdout carries only command results.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Filter directive for the requested verbosity
#[must_use]
pub const fn default_level(verbose: bool, debug: bool) -> &'static str {
    if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the level picked from the flags. Calling this twice
/// is harmless; the second call is ignored.
pub fn init(verbose: bool, debug: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, debug)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(debug)
        .without_time();

    // Fails only when a subscriber is already installed
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
