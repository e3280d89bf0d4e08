//! Error types for gridtable
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using GridError
pub type Result<T> = std::result::Result<T, GridError>;

/// Unified error type for gridtable operations
#[derive(Debug, Error)]
pub enum GridError {
    // -------------------------------------------------------------------------
    // Addressing Errors
    // -------------------------------------------------------------------------
    #[error("invalid address: {0}")]
    AddressParse(String),

    #[error("region starting at {start} is wider than the probe limit {limit}")]
    RegionLimitExceeded { start: String, limit: String },

    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error("no header row at {0}")]
    MissingHeader(String),

    // -------------------------------------------------------------------------
    // Cache Errors
    // -------------------------------------------------------------------------
    /// Durable cache write failed. Reads never produce this: a failed read
    /// is a miss.
    #[error("cache write failed for {path}: {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Value Store Errors
    // -------------------------------------------------------------------------
    #[error("{operation} returned status {status}")]
    Remote { operation: &'static str, status: u16 },

    #[error("value store transport error: {0}")]
    Transport(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("fan-out worker failed: {0}")]
    FanOut(String),
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::Serialization(err.to_string())
    }
}
