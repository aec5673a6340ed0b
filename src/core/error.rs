//! Error types and error handling for the Gnosis indexing service.
//!
//! This module defines the error types used throughout the
//! crate. Mapping errors onto transport status codes is left to
//! the adapter that serves them; the predicates below are the seam.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Gnosis operations
pub type Result<T> = std::result::Result<T, GnosisError>;

/// Main error type for the Gnosis service
#[derive(Error, Debug)]
pub enum GnosisError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to read page {path:?}: {source}")]
    PageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No title found in page {path:?}")]
    NoTitle { path: PathBuf },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid query field '{field}': {message}")]
    InvalidQueryField {
        field: String,
        message: String,
        valid_fields: Vec<String>,
        suggestion: Option<String>,
    },

    #[error("Unexpected value type in results for field '{field}'")]
    ResultsFormat { field: String },

    #[error("Failed to create index at {path:?}: {message}")]
    IndexCreate { path: PathBuf, message: String },

    #[error("Failed to open index at {path:?}: {message}")]
    IndexOpen { path: PathBuf, message: String },

    #[error("Index write failed: {0}")]
    IndexWrite(String),

    #[error("Index read failed: {0}")]
    IndexRead(String),

    #[error("Failed to close index '{name}': {message}")]
    IndexClose { name: String, message: String },

    #[error("Failed to wipe index at {path:?}: {message}")]
    IndexWipe { path: PathBuf, message: String },

    #[error("Index '{0}' not found")]
    IndexNotFound(String),

    #[error("Index '{0}' is closed")]
    IndexClosed(String),

    #[error("Watcher error for {path:?}: {message}")]
    Watcher { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl GnosisError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this is a "not found" type error
    ///
    /// Pages that cannot be read or carry no title are reported
    /// as missing to callers.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GnosisError::PageRead { .. }
                | GnosisError::NoTitle { .. }
                | GnosisError::IndexNotFound(_)
        )
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            GnosisError::InvalidQuery(_)
                | GnosisError::InvalidQueryField { .. }
                | GnosisError::ConfigError(_)
        )
    }

    /// Check if the error comes from a store that has been shut down
    pub fn is_closed(&self) -> bool {
        matches!(self, GnosisError::IndexClosed(_))
    }
}
