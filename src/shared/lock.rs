/**
 * Section Lock Data Structures
 *
 * This module defines the lock record kept per editable resource and the
 * request/response payloads exchanged between the lock endpoint and the
 * client agent.
 *
 * All timestamps are `chrono::DateTime<Utc>` and travel over the wire as
 * ISO 8601 (RFC3339) strings. Wire names are camelCase.
 */
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Presentation fields describing who holds a lock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LockIdentity {
    /// Human-readable name shown to other editors
    pub display_name: String,
    /// Contact address (usually an e-mail) shown to other editors
    pub contact: String,
}

impl LockIdentity {
    pub fn new(display_name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            contact: contact.into(),
        }
    }
}

/// The single lock record stored per lockable resource
///
/// A record whose `expires_at <= now` is treated exactly like an absent
/// record. `expires_at` is always `acquired_at + lease`.
///
/// `revision` is the compare-and-swap token used by stores. It strictly
/// increases on every rewrite of a key, and a brand-new record starts from
/// the clock's microsecond timestamp, so a record that is deleted and
/// recreated does not hand out a token an earlier reader may still hold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    /// Identifies the editable unit (e.g. a magazine section)
    pub resource_id: String,
    /// Identity of the holder
    pub owner_id: String,
    /// Holder's display name
    pub owner_display_name: String,
    /// Holder's contact address
    pub owner_contact: String,
    /// When the lease was last granted or extended
    pub acquired_at: DateTime<Utc>,
    /// Absolute time after which the lock is abandoned
    pub expires_at: DateTime<Utc>,
    /// Compare-and-swap token
    pub revision: i64,
}

impl LockRecord {
    /// Build a freshly granted record starting at `now`
    pub fn grant(
        resource_id: impl Into<String>,
        owner_id: impl Into<String>,
        identity: &LockIdentity,
        now: DateTime<Utc>,
        lease: Duration,
        revision: i64,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            owner_id: owner_id.into(),
            owner_display_name: identity.display_name.clone(),
            owner_contact: identity.contact.clone(),
            acquired_at: now,
            expires_at: now + lease,
            revision,
        }
    }

    /// Same owner, new lease window starting at `now`, next revision
    pub fn renewed(&self, now: DateTime<Utc>, lease: Duration) -> Self {
        Self {
            acquired_at: now,
            expires_at: now + lease,
            revision: next_revision(Some(self.revision), now),
            ..self.clone()
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_owned_by(&self, requester_id: &str) -> bool {
        self.owner_id == requester_id
    }

    /// Time left on the lease, never negative
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }

    pub fn identity(&self) -> LockIdentity {
        LockIdentity::new(&self.owner_display_name, &self.owner_contact)
    }
}

/// Revision for a record written at `now` over `previous`
pub fn next_revision(previous: Option<i64>, now: DateTime<Utc>) -> i64 {
    (previous.unwrap_or(0) + 1).max(now.timestamp_micros())
}

/// Lock state as seen by one requester
///
/// This is the body of `GET` and the `lockStatus` field of every other
/// lock response. `lockedBy` carries the holder's contact; the opaque owner
/// id never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LockStatus {
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_acquired_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
    pub can_override: bool,
}

impl LockStatus {
    pub fn unlocked() -> Self {
        Self::default()
    }

    /// Describe a live record from the point of view of `requester_id`
    ///
    /// `can_override` is true only when the requester is the holder.
    pub fn held(record: &LockRecord, requester_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            is_locked: true,
            locked_by: Some(record.owner_contact.clone()),
            locked_by_name: Some(record.owner_display_name.clone()),
            lock_expires_at: Some(record.expires_at),
            lock_acquired_at: Some(record.acquired_at),
            remaining_seconds: Some(record.remaining(now).num_seconds()),
            can_override: record.is_owned_by(requester_id),
        }
    }

    /// Describe a record for observers that are not a party to it
    pub fn observed(record: &LockRecord, now: DateTime<Utc>) -> Self {
        Self {
            can_override: false,
            ..Self::held(record, "", now)
        }
    }
}

/// Query string for `GET`, `PUT` and `DELETE`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequesterQuery {
    #[serde(default)]
    pub requester_id: Option<String>,
}

/// Body of `POST` (acquire)
///
/// Fields are optional on the wire so that a missing field is reported as
/// a 400 with a field name instead of a generic deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AcquireLockRequest {
    #[serde(default)]
    pub requester_id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default, rename = "override")]
    pub override_lock: bool,
}

impl AcquireLockRequest {
    pub fn new(requester_id: &str, identity: &LockIdentity, override_lock: bool) -> Self {
        Self {
            requester_id: Some(requester_id.to_string()),
            user_email: Some(identity.contact.clone()),
            user_name: Some(identity.display_name.clone()),
            override_lock,
        }
    }
}

/// Successful response of `POST`, `PUT` and `DELETE`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LockOperationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_status: Option<LockStatus>,
}

impl LockOperationResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            lock_status: None,
        }
    }

    pub fn with_status(lock_status: LockStatus) -> Self {
        Self {
            success: true,
            lock_status: Some(lock_status),
        }
    }
}

/// Machine-readable failure code carried in every error body
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LockErrorCode {
    Conflict,
    AlreadyHeldElsewhere,
    NotLocked,
    NotOwner,
    Expired,
    Forbidden,
    StoreUnavailable,
    Contended,
    Validation,
    Internal,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LockErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: LockErrorCode,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_status: Option<LockStatus>,
}
