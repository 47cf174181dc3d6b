//! Error types for page-dl
//!
//! A single [`Error`] enum covers every fallible collaborator call. Inside the
//! download worker any `Err` is treated as a fatal fault for the current document;
//! recoverable per-page skips are not errors at all (see
//! [`PageOutcome::Skipped`](crate::types::PageOutcome::Skipped)).

use crate::types::DocumentId;
use thiserror::Error;

/// Result type alias for page-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for page-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "poll_interval")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A page URL could not be parsed
    #[error("invalid page URL: {0}")]
    InvalidUrl(String),

    /// Unrecoverable fault while fetching a single page
    #[error("failed to fetch page {page} of {document}: {message}")]
    Fetch {
        /// Document being downloaded
        document: DocumentId,
        /// Zero-based page index
        page: usize,
        /// What went wrong
        message: String,
    },

    /// Document storage (directory or metadata) failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Catalog refresh failed
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error for a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Machine-readable error code, logged alongside failures
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::InvalidUrl(_) => "invalid_url",
            Error::Fetch { .. } => "fetch_error",
            Error::Storage(_) => "storage_error",
            Error::Catalog(_) => "catalog_error",
            Error::Other(_) => "internal_error",
        }
    }
}
