//! # Error Types
//!
//! This module defines error types used throughout the etiket library.
//!
//! Every backend-facing operation has its own top-level variant so callers
//! can tell a failed load from a failed print without inspecting messages.
//! None of them is fatal: the composition in memory is never touched by a
//! failed network operation.

use thiserror::Error;

use crate::model::EntryKind;

/// Main error type for etiket operations
#[derive(Debug, Error)]
pub enum EtiketError {
    /// One of the load fetches failed; nothing was applied
    #[error("Load error: {0}")]
    Load(BackendError),

    /// Bitmap generation failed; the previous preview is kept
    #[error("Preview error: {0}")]
    Preview(BackendError),

    /// Saving the composition failed
    #[error("Persist error: {0}")]
    Persist(BackendError),

    /// The print request failed or the backend reported a failure
    #[error("Print error: {0}")]
    Print(BackendError),

    /// An image resource could not be read
    #[error("Resource read error: {0}")]
    ResourceRead(String),

    /// The same operation is already in flight
    #[error("{0} already in progress")]
    Busy(&'static str),

    /// A field update was rejected
    #[error("Invalid field: {0}")]
    Field(#[from] FieldError),

    /// Auxiliary backend call (health, printer settings) failed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error wrapper (CLI file handling)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error wrapper (CLI layout files)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a backend call failed.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection or protocol failure before a response arrived
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("{path} returned HTTP {status}: {message}")]
    Status {
        path: String,
        status: u16,
        message: String,
    },

    /// 2xx response whose body states a failure
    #[error("rejected: {0}")]
    Rejected(String),

    /// Response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// A field update that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{kind} entries have no updatable field '{field}'")]
    UnknownField { kind: EntryKind, field: String },

    #[error("'{value}' is not a valid {field}")]
    InvalidChoice { field: &'static str, value: String },
}

impl FieldError {
    pub(crate) fn unknown(kind: EntryKind, field: &str) -> Self {
        FieldError::UnknownField {
            kind,
            field: field.to_string(),
        }
    }
}

impl EtiketError {
    /// Short label for the failed operation, used in notices.
    pub fn operation(&self) -> &'static str {
        match self {
            EtiketError::Load(_) => "load",
            EtiketError::Preview(_) => "preview",
            EtiketError::Persist(_) => "save",
            EtiketError::Print(_) => "print",
            EtiketError::ResourceRead(_) => "image read",
            EtiketError::Busy(op) => op,
            EtiketError::Field(_) => "update",
            EtiketError::Backend(_) => "backend request",
            EtiketError::Config(_) => "configuration",
            EtiketError::Io(_) | EtiketError::Json(_) => "file",
        }
    }
}
