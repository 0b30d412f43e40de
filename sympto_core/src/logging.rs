//! Tracing setup for the `sympto` binary.
//!
//! Everything goes to stderr: stdout carries the report, JSON or CSV
//! path the user asked for.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the subscriber at `info`, or whatever RUST_LOG asks for
pub fn init() {
    init_with_level("info")
}

/// Install the subscriber with `default_level` (debug, info, warn, error)
/// as the fallback filter when RUST_LOG is unset or unparsable
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Route engine traces into the test harness output
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("sympto_core=debug"))
        .try_init();
}
