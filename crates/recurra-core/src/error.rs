//! Error types for Recurra
//!
//! Domain computations never fail: malformed rules, missing history and zero
//! denominators all degrade to `false`, live values, or zero. These variants
//! cover the surfaces that touch the outside world.

use thiserror::Error;

/// Recurra error type
#[derive(Error, Debug)]
pub enum RecurraError {
    /// Report configuration could not be parsed
    #[error("config error: {0}")]
    Config(String),

    /// Export could not be produced
    #[error("export error: {0}")]
    Export(String),

    /// Invalid caller-supplied argument (period name, date text)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Snapshot JSON could not be decoded
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Result type for Recurra
pub type Result<T> = std::result::Result<T, RecurraError>;
