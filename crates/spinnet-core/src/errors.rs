//! Error types for SPINNET.
//!
//! One unified error enum shared by every crate in the workspace. The
//! taxonomy follows the engine's propagation policy: shape/precondition
//! violations abort a whole step, numeric degeneracies never reach this
//! type (they resolve locally to documented fallback values).

use thiserror::Error;

/// Unified error type for all SPINNET operations.
#[derive(Error, Debug)]
pub enum SpinnetError {
    /// Input validation errors (mismatched array sizes, out-of-range ids).
    /// Raised before any computation touches the arrays.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration validation errors (non-finite dt, negative coupling).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Compute-backend errors, tagged with the backend that raised them.
    #[error("Backend error in {backend}: {message}")]
    Backend { backend: String, message: String },

    /// Scheduler errors (coloring failures, stale-snapshot misuse).
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// I/O errors (telemetry export).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SpinnetError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        SpinnetError::Validation(message.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SpinnetError::Config(message.into())
    }

    /// Creates a backend error with context.
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        SpinnetError::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Creates a scheduler error.
    pub fn scheduler(message: impl Into<String>) -> Self {
        SpinnetError::Scheduler(message.into())
    }
}
