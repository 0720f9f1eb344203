//! Error types for the swatch library

use thiserror::Error;

/// Result type alias for swatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during catalog operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before or by the store (bad column, duplicate materialId, ...)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No material with the requested identifier
    #[error("Material not found: {0}")]
    NotFound(String),

    /// Error reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error encoding or decoding list columns
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite database error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
