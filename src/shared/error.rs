//! Shared Error Types
//!
//! This module defines error types that are shared between the server and the
//! client agent. These errors represent common failure cases that can occur in
//! both contexts.
//!
//! # Error Categories
//!
//! - `ValidationError` - Request validation failures
//!
//! Malformed JSON bodies are reported at the HTTP boundary instead, as
//! `BackendError::SerializationError`.
//!
//! # Usage
//!
//! ```rust
//! use xflock::shared::error::SharedError;
//!
//! let error = SharedError::validation("requesterId", "requesterId is required");
//! ```
use thiserror::Error;

/// Shared error types that can occur on both sides of the lock endpoint
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Missing or blank required field
    pub fn required(field: &str) -> Self {
        Self::validation(field, format!("{} is required", field))
    }
}

/// Return the trimmed value of a required text field
///
/// `None`, empty and whitespace-only values are all rejected.
pub fn require_field<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, SharedError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SharedError::required(field)),
    }
}
