/**
 * Lock Error Taxonomy
 *
 * Every failure the lock service can report. All of them are scoped to one
 * resource and one caller; none is fatal to the server process.
 *
 * | Variant                | Meaning                                         |
 * |------------------------|-------------------------------------------------|
 * | `StoreUnavailable`     | store I/O failed, not retried within the call   |
 * | `Conflict`             | another identity holds a live lease             |
 * | `AlreadyHeldElsewhere` | the requester holds it from another session     |
 * | `NotLocked`            | refresh of an absent lock                       |
 * | `NotOwner`             | refresh by someone who is not the holder        |
 * | `Expired`              | refresh of a lapsed lease                       |
 * | `Forbidden`            | release of someone else's live lease            |
 * | `Contended`            | compare-and-swap lost on every attempt          |
 */
use thiserror::Error;

use crate::shared::{LockErrorCode, LockStatus};

#[derive(Debug, Error)]
pub enum LockError {
    #[error("Lock store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Section '{resource_id}' is being edited by someone else")]
    Conflict {
        resource_id: String,
        status: LockStatus,
    },

    #[error("Section '{resource_id}' is already open in another session")]
    AlreadyHeldElsewhere {
        resource_id: String,
        status: LockStatus,
    },

    #[error("Section '{resource_id}' is not locked")]
    NotLocked { resource_id: String },

    #[error("Section '{resource_id}' is locked by someone else")]
    NotOwner {
        resource_id: String,
        status: LockStatus,
    },

    #[error("Lease on section '{resource_id}' has expired")]
    Expired { resource_id: String },

    #[error("Section '{resource_id}' is held by someone else and cannot be released")]
    Forbidden {
        resource_id: String,
        status: LockStatus,
    },

    #[error("Section '{resource_id}' changed concurrently {attempts} times, giving up")]
    Contended { resource_id: String, attempts: u32 },
}

impl LockError {
    /// Wrap any store-level failure
    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable {
            message: err.to_string(),
        }
    }

    pub fn code(&self) -> LockErrorCode {
        match self {
            Self::StoreUnavailable { .. } => LockErrorCode::StoreUnavailable,
            Self::Conflict { .. } => LockErrorCode::Conflict,
            Self::AlreadyHeldElsewhere { .. } => LockErrorCode::AlreadyHeldElsewhere,
            Self::NotLocked { .. } => LockErrorCode::NotLocked,
            Self::NotOwner { .. } => LockErrorCode::NotOwner,
            Self::Expired { .. } => LockErrorCode::Expired,
            Self::Forbidden { .. } => LockErrorCode::Forbidden,
            Self::Contended { .. } => LockErrorCode::Contended,
        }
    }

    /// Current lock status, for the variants that carry one
    pub fn lock_status(&self) -> Option<&LockStatus> {
        match self {
            Self::Conflict { status, .. }
            | Self::AlreadyHeldElsewhere { status, .. }
            | Self::NotOwner { status, .. }
            | Self::Forbidden { status, .. } => Some(status),
            _ => None,
        }
    }
}
