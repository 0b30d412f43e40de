//! Error types for the sympto_core library.
//!
//! Analysis itself never fails: missing evidence is an absent field on the
//! result. These errors cover the store, export and configuration layers.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sympto_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cycle store error (bad index, unreadable store file)
    #[error("Store error: {0}")]
    Store(String),

    /// An entry could not be recorded
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
}
