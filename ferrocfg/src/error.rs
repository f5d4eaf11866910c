//! Error types for ferrocfg.
//!
//! Recognition misses and format violations are not errors: the former
//! yield empty values, the latter show up as quality warnings.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for ferrocfg operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Rule document and pattern errors
    #[error("Ruleset error: {0}")]
    Ruleset(#[from] RulesetError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Hosted extraction service errors
    #[error("Extraction service error: {0}")]
    Service(#[from] ServiceError),

    /// Record store errors
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// Failed to read a configuration file
    #[error("Failed to read {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid parser or pipeline settings
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Rule set generation, persistence and application errors.
#[derive(Error, Debug)]
pub enum RulesetError {
    /// A stored pattern does not compile
    #[error("Invalid pattern for field '{field}': {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// Rule document could not be read or written
    #[error("Rule document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Rule document key does not name a single file
    #[error("Invalid rule document key '{key}'")]
    InvalidKey { key: String },

    /// Rule document is not valid YAML for a rule set
    #[error("Malformed rule document {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Rule set could not be serialized
    #[error("Failed to serialize rule set: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error writing the export
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Hosted extraction service errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The service is not configured (e.g. missing API key)
    #[error("Service not configured: {message}")]
    NotConfigured { message: String },

    /// The service call itself failed
    #[error("Service call failed: {message}")]
    CallFailed { message: String },

    /// The service did not answer in time
    #[error("Service call timed out after {0:?}")]
    Timeout(Duration),

    /// No JSON document could be located in the response
    #[error("No valid JSON in response: {preview}...")]
    NoJson { preview: String },
}

/// Record store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected the record
    #[error("Record rejected: {message}")]
    Rejected { message: String },
}

/// Result type alias using ferrocfg's Error.
pub type Result<T> = std::result::Result<T, Error>;
