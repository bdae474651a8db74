//! Client Error Types
//!
//! Failures seen by the lock client. Server-reported lock decisions arrive
//! as `ClientError::Lock` with the machine-readable `code` from the error
//! body; transport problems (including timeouts) as `ClientError::Network`.

use thiserror::Error;

use crate::shared::{ConfigError, LockErrorCode, LockErrorResponse, LockStatus};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Request could not be sent or timed out
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server rejected the request with a structured error body
    #[error("{message} ({code:?}, HTTP {status})")]
    Lock {
        code: LockErrorCode,
        status: u16,
        message: String,
        lock_status: Option<LockStatus>,
    },

    /// Server answered with something that is not a lock response
    #[error("Unexpected response (HTTP {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Server-reported error code, if the server produced one
    pub fn code(&self) -> Option<LockErrorCode> {
        match self {
            Self::Lock { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn lock_status(&self) -> Option<&LockStatus> {
        match self {
            Self::Lock { lock_status, .. } => lock_status.as_ref(),
            _ => None,
        }
    }

    /// True when the requester no longer holds the lock and must re-acquire
    pub fn is_lease_lost(&self) -> bool {
        matches!(
            self.code(),
            Some(LockErrorCode::NotOwner | LockErrorCode::Expired | LockErrorCode::NotLocked)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }
}

impl From<LockErrorResponse> for ClientError {
    fn from(body: LockErrorResponse) -> Self {
        Self::Lock {
            code: body.code,
            status: body.status,
            message: body.error,
            lock_status: body.lock_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error(code: LockErrorCode, status: u16) -> ClientError {
        LockErrorResponse {
            success: false,
            error: "nope".into(),
            code,
            status,
            lock_status: None,
        }
        .into()
    }

    #[test]
    fn test_lease_lost_codes() {
        assert!(server_error(LockErrorCode::NotOwner, 403).is_lease_lost());
        assert!(server_error(LockErrorCode::Expired, 410).is_lease_lost());
        assert!(server_error(LockErrorCode::NotLocked, 400).is_lease_lost());
        assert!(!server_error(LockErrorCode::StoreUnavailable, 500).is_lease_lost());
        assert!(!ClientError::InvalidUrl("x".into()).is_lease_lost());
    }

    #[test]
    fn test_display_includes_message() {
        let err = server_error(LockErrorCode::Conflict, 423);
        assert!(err.to_string().contains("nope"));
        assert_eq!(err.code(), Some(LockErrorCode::Conflict));
    }
}
