/**
 * Backend Error Types
 *
 * This module defines the error type returned by HTTP handlers. Every
 * variant knows its HTTP status code and the machine-readable code carried
 * in the JSON body.
 *
 * # Error Types
 *
 * - `HandlerError` - malformed requests caught before the lock service runs
 * - `Lock` - a decision or failure reported by the lock service
 * - `SharedError` - validation failures from the shared module
 * - `SerializationError` - JSON body could not be parsed
 *
 * # Status Code Mapping
 *
 * | Error                            | Status |
 * |----------------------------------|--------|
 * | `Conflict`, `AlreadyHeldElsewhere` | 423  |
 * | `NotLocked`, validation, bad JSON | 400   |
 * | `NotOwner`, `Forbidden`          | 403    |
 * | `Expired`                        | 410    |
 * | `StoreUnavailable`               | 500    |
 * | `Contended`                      | 503    |
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::backend::locks::error::LockError;
use crate::shared::{LockErrorCode, LockStatus, SharedError};

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use xflock::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., malformed request)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Lock service error
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Request body is not valid JSON for the expected shape
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Lock(err) => match err {
                LockError::Conflict { .. } | LockError::AlreadyHeldElsewhere { .. } => {
                    StatusCode::LOCKED
                }
                LockError::NotLocked { .. } => StatusCode::BAD_REQUEST,
                LockError::NotOwner { .. } | LockError::Forbidden { .. } => StatusCode::FORBIDDEN,
                LockError::Expired { .. } => StatusCode::GONE,
                LockError::StoreUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                LockError::Contended { .. } => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::SharedError(_) | Self::SerializationError(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Machine-readable error code for the response body
    pub fn code(&self) -> LockErrorCode {
        match self {
            Self::HandlerError { status, .. } if status.is_client_error() => LockErrorCode::Validation,
            Self::HandlerError { .. } => LockErrorCode::Internal,
            Self::Lock(err) => err.code(),
            Self::SharedError(_) | Self::SerializationError(_) => LockErrorCode::Validation,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Lock(err) => err.to_string(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => format!("Invalid request body: {}", err),
        }
    }

    /// Lock status to attach to the response, if any
    pub fn lock_status(&self) -> Option<&LockStatus> {
        match self {
            Self::Lock(err) => err.lock_status(),
            _ => None,
        }
    }
}
