/**
 * Lock Record Store
 *
 * Persistence contract for the single lock record kept per resource, plus
 * the in-memory implementation used when no database is configured.
 *
 * # Conditional Writes
 *
 * Every write carries a `Precondition`. The store applies the write only if
 * the precondition still holds at write time and reports whether it did.
 * This turns the service's read-decide-write into a compare-and-swap: two
 * acquires racing on an unlocked resource both read "absent", but only one
 * `put(.., Precondition::Absent)` succeeds and the loser re-reads.
 *
 * The store has no retention logic of its own. Expired records stay until
 * the service deletes them.
 */
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::locks::error::LockError;
use crate::shared::LockRecord;

/// Expected state of a key at write time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// No record may exist
    Absent,
    /// The stored record must carry this revision
    Revision(i64),
}

impl Precondition {
    /// Precondition matching what was just read
    pub fn matching(current: Option<&LockRecord>) -> Self {
        match current {
            Some(record) => Self::Revision(record.revision),
            None => Self::Absent,
        }
    }

    fn holds(&self, current: Option<&LockRecord>) -> bool {
        match (self, current) {
            (Self::Absent, None) => true,
            (Self::Revision(expected), Some(record)) => record.revision == *expected,
            _ => false,
        }
    }
}

/// Storage for lock records, one per `resource_id`
///
/// Implementations must never expose a partially written record and must
/// apply each conditional write atomically with respect to other writes to
/// the same key. Any I/O failure is reported as
/// `LockError::StoreUnavailable`.
#[async_trait]
pub trait LockRecordStore: Send + Sync {
    /// Read the current record, expired or not
    async fn get(&self, resource_id: &str) -> Result<Option<LockRecord>, LockError>;

    /// Write `record` under `record.resource_id` if `expected` holds
    ///
    /// Returns `Ok(false)` when the precondition failed and nothing was written.
    async fn put(&self, record: &LockRecord, expected: Precondition) -> Result<bool, LockError>;

    /// Delete the record for `resource_id` if `expected` holds
    ///
    /// Returns `Ok(false)` when the precondition failed and nothing was deleted.
    async fn delete(&self, resource_id: &str, expected: Precondition) -> Result<bool, LockError>;
}

/// Process-local store
///
/// Clones share the same map. Each conditional write runs under the write
/// half of a `tokio::sync::RwLock`, which makes check-and-write atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLockStore {
    records: Arc<RwLock<HashMap<String, LockRecord>>>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired ones included
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl LockRecordStore for InMemoryLockStore {
    async fn get(&self, resource_id: &str) -> Result<Option<LockRecord>, LockError> {
        Ok(self.records.read().await.get(resource_id).cloned())
    }

    async fn put(&self, record: &LockRecord, expected: Precondition) -> Result<bool, LockError> {
        let mut records = self.records.write().await;
        if !expected.holds(records.get(&record.resource_id)) {
            return Ok(false);
        }
        records.insert(record.resource_id.clone(), record.clone());
        Ok(true)
    }

    async fn delete(&self, resource_id: &str, expected: Precondition) -> Result<bool, LockError> {
        let mut records = self.records.write().await;
        if !expected.holds(records.get(resource_id)) {
            return Ok(false);
        }
        Ok(records.remove(resource_id).is_some())
    }
}
