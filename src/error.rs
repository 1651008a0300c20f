//! Error types for the message-insights library.
//!
//! This module provides custom error types using `thiserror` for better error handling
//! and more specific error messages throughout the application.

use thiserror::Error;

/// Errors that can occur in the message-insights application.
#[derive(Error, Debug)]
pub enum MessagesError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A row from the message store did not have the expected shape
    #[error("Malformed message record: {0}")]
    MalformedRecord(String),

    /// Filter combination not allowed for the requested operation
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// A name lookup needs the contacts directory, which is not attached
    #[error("Contact directory is not available; cannot filter by name: {0}")]
    DirectoryUnavailable(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV export errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with `MessagesError`
pub type Result<T> = std::result::Result<T, MessagesError>;
