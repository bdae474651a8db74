/**
 * Lock Event System
 *
 * Every state change made by the lock service is published as a
 * `LockEvent`. The server fans these out over Server-Sent Events so that
 * editors can watch a section instead of polling `GET`.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::lock::{LockRecord, LockStatus};

/// Kind of lock state change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LockEventKind {
    /// An unlocked (or abandoned) resource was granted
    Acquired,
    /// The holder re-acquired its own lock with `override`
    Overridden,
    /// The holder extended its lease
    Refreshed,
    /// The holder released the lock
    Released,
    /// An expired lock was cleared
    Reclaimed,
}

impl LockEventKind {
    /// SSE event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acquired => "acquired",
            Self::Overridden => "overridden",
            Self::Refreshed => "refreshed",
            Self::Released => "released",
            Self::Reclaimed => "reclaimed",
        }
    }
}

/// A lock state change for one resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LockEvent {
    pub resource_id: String,
    pub kind: LockEventKind,
    /// Lock status after the change, as seen by a third party
    pub lock_status: LockStatus,
    pub timestamp: DateTime<Utc>,
}

impl LockEvent {
    /// Event for a change that left `record` in place
    pub fn held(kind: LockEventKind, record: &LockRecord, now: DateTime<Utc>) -> Self {
        Self {
            resource_id: record.resource_id.clone(),
            kind,
            lock_status: LockStatus::observed(record, now),
            timestamp: now,
        }
    }

    /// Event for a change that left the resource unlocked
    pub fn cleared(kind: LockEventKind, resource_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            resource_id: resource_id.to_string(),
            kind,
            lock_status: LockStatus::unlocked(),
            timestamp: now,
        }
    }
}
