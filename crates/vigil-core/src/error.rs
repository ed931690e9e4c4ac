//! Unified error types for Vigil.

use thiserror::Error;

/// Result type alias using VigilError.
pub type Result<T> = std::result::Result<T, VigilError>;

#[derive(Error, Debug)]
pub enum VigilError {
    // Source adapter errors
    #[error("Query error: {0}")]
    Query(String),

    // Transform pipeline errors
    #[error("Filter error: {0}")]
    Filter(String),

    #[error("Filter expects {expected} payload, got {actual}")]
    FilterPayload { expected: &'static str, actual: &'static str },

    // Differ errors
    #[error("Differ expects {expected} payload, got {actual}")]
    DifferPayload { expected: &'static str, actual: &'static str },

    // Notifier errors
    #[error("Notify error: {0}")]
    Notify(String),

    // State store errors
    #[error("Store error: {0}")]
    Store(String),

    // Job definition / registry errors
    #[error("Unknown {component} kind: {kind}")]
    UnknownKind { component: &'static str, kind: String },

    #[error("Missing parameter '{0}'")]
    MissingParameter(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Job definition error: {0}")]
    Definition(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl VigilError {
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn filter(msg: impl Into<String>) -> Self {
        Self::Filter(msg.into())
    }

    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
