/**
 * Lock Service
 *
 * The protocol engine behind the lock endpoint. Each resource is in one of
 * two states:
 *
 * - `Unlocked` - no record, or a record with `expires_at <= now`
 * - `Locked(owner, expires_at)` - a live record
 *
 * # Operations
 *
 * - `check` - read the state for a requester, clearing a stale record on the
 *   way (best effort, never fails the call)
 * - `acquire` - grant an unlocked resource; re-grant the requester's own
 *   lock only with `override`; never hand a live lock to another identity
 * - `refresh` - extend the holder's live lease; an expired lease is never
 *   resurrected
 * - `release` - delete the holder's lock or any expired lock; releasing an
 *   absent lock is a no-op
 *
 * # Concurrency
 *
 * Each call is read → decide → conditional write against the store. When
 * the conditional write loses (another call changed the record in between)
 * the service re-reads and decides again, up to
 * `LockSettings::max_write_attempts` rounds. No in-process locking is used,
 * so several service instances may share one store.
 */
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::backend::locks::clock::ClockSource;
use crate::backend::locks::error::LockError;
use crate::backend::locks::store::{LockRecordStore, Precondition};
use crate::shared::lock::next_revision;
use crate::shared::{
    ConfigError, LockEvent, LockEventKind, LockIdentity, LockRecord, LockSettings, LockStatus,
};

/// Capacity of the lock event channel
const EVENT_CHANNEL_CAPACITY: usize = 1024;

pub struct LockService {
    store: Arc<dyn LockRecordStore>,
    clock: Arc<dyn ClockSource>,
    settings: LockSettings,
    lease: chrono::Duration,
    events: broadcast::Sender<LockEvent>,
}

impl LockService {
    /// Build a service over `store` and `clock`
    ///
    /// Settings are validated here as well, since `LockSettings` can be
    /// built by hand: a zero lease or a zero write budget is rejected.
    pub fn new(
        store: Arc<dyn LockRecordStore>,
        clock: Arc<dyn ClockSource>,
        settings: LockSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            store,
            clock,
            lease: settings.lease_delta(),
            settings,
            events,
        })
    }

    pub fn settings(&self) -> &LockSettings {
        &self.settings
    }

    /// Receive every lock change made through this service
    pub fn subscribe(&self) -> broadcast::Receiver<LockEvent> {
        self.events.subscribe()
    }

    /// Lock state of `resource_id` as seen by `requester_id`
    pub async fn check(&self, resource_id: &str, requester_id: &str) -> Result<LockStatus, LockError> {
        let now = self.clock.now().await?;
        match self.store.get(resource_id).await? {
            None => Ok(LockStatus::unlocked()),
            Some(record) if record.is_expired(now) => {
                self.reclaim(&record, now).await;
                Ok(LockStatus::unlocked())
            }
            Some(record) => Ok(LockStatus::held(&record, requester_id, now)),
        }
    }

    /// Try to take the edit lock on `resource_id`
    ///
    /// `override_lock` only lets a requester replace its own live lock (for
    /// example one left behind by a crashed tab). A live lock held by anyone
    /// else is always a `Conflict`.
    pub async fn acquire(
        &self,
        resource_id: &str,
        requester_id: &str,
        identity: &LockIdentity,
        override_lock: bool,
    ) -> Result<LockStatus, LockError> {
        for attempt in 1..=self.settings.max_write_attempts {
            let now = self.clock.now().await?;
            let current = self.store.get(resource_id).await?;

            let (record, kind) = match &current {
                Some(existing) if !existing.is_expired(now) => {
                    let status = LockStatus::held(existing, requester_id, now);
                    if !existing.is_owned_by(requester_id) {
                        tracing::info!(
                            "[Locks] {} denied to {}: held by {} for {}s",
                            resource_id,
                            requester_id,
                            existing.owner_id,
                            existing.remaining(now).num_seconds()
                        );
                        return Err(LockError::Conflict {
                            resource_id: resource_id.to_string(),
                            status,
                        });
                    }
                    if !override_lock {
                        tracing::info!(
                            "[Locks] {} already held by {} in another session",
                            resource_id,
                            requester_id
                        );
                        return Err(LockError::AlreadyHeldElsewhere {
                            resource_id: resource_id.to_string(),
                            status,
                        });
                    }
                    let mut renewed = existing.renewed(now, self.lease);
                    renewed.owner_display_name = identity.display_name.clone();
                    renewed.owner_contact = identity.contact.clone();
                    (renewed, LockEventKind::Overridden)
                }
                stale_or_absent => {
                    let revision = next_revision(stale_or_absent.as_ref().map(|r| r.revision), now);
                    let record = LockRecord::grant(
                        resource_id,
                        requester_id,
                        identity,
                        now,
                        self.lease,
                        revision,
                    );
                    (record, LockEventKind::Acquired)
                }
            };

            if self
                .store
                .put(&record, Precondition::matching(current.as_ref()))
                .await?
            {
                tracing::info!(
                    "[Locks] {} {} by {} until {}",
                    resource_id,
                    kind.as_str(),
                    requester_id,
                    record.expires_at.to_rfc3339()
                );
                self.publish(LockEvent::held(kind, &record, now));
                return Ok(LockStatus::held(&record, requester_id, now));
            }

            tracing::debug!(
                "[Locks] acquire of {} raced with another writer (attempt {})",
                resource_id,
                attempt
            );
        }

        Err(self.contended(resource_id))
    }

    /// Extend the requester's live lease to `now + lease`
    pub async fn refresh(&self, resource_id: &str, requester_id: &str) -> Result<LockStatus, LockError> {
        for attempt in 1..=self.settings.max_write_attempts {
            let now = self.clock.now().await?;
            let record = match self.store.get(resource_id).await? {
                Some(record) => record,
                None => {
                    return Err(LockError::NotLocked {
                        resource_id: resource_id.to_string(),
                    })
                }
            };

            if !record.is_owned_by(requester_id) {
                tracing::info!(
                    "[Locks] refresh of {} by {} rejected: held by {}",
                    resource_id,
                    requester_id,
                    record.owner_id
                );
                return Err(LockError::NotOwner {
                    resource_id: resource_id.to_string(),
                    status: status_for(&record, requester_id, now),
                });
            }
            if record.is_expired(now) {
                tracing::info!(
                    "[Locks] refresh of {} by {} rejected: lease expired at {}",
                    resource_id,
                    requester_id,
                    record.expires_at.to_rfc3339()
                );
                return Err(LockError::Expired {
                    resource_id: resource_id.to_string(),
                });
            }

            let renewed = record.renewed(now, self.lease);
            if self
                .store
                .put(&renewed, Precondition::Revision(record.revision))
                .await?
            {
                tracing::debug!(
                    "[Locks] {} refreshed by {} until {}",
                    resource_id,
                    requester_id,
                    renewed.expires_at.to_rfc3339()
                );
                self.publish(LockEvent::held(LockEventKind::Refreshed, &renewed, now));
                return Ok(LockStatus::held(&renewed, requester_id, now));
            }

            tracing::debug!(
                "[Locks] refresh of {} raced with another writer (attempt {})",
                resource_id,
                attempt
            );
        }

        Err(self.contended(resource_id))
    }

    /// Drop the lock on `resource_id`
    ///
    /// Succeeds when there is no lock, when the requester holds it, or when
    /// the lock has expired (anyone may clear an abandoned lock).
    pub async fn release(&self, resource_id: &str, requester_id: &str) -> Result<(), LockError> {
        for attempt in 1..=self.settings.max_write_attempts {
            let now = self.clock.now().await?;
            let record = match self.store.get(resource_id).await? {
                Some(record) => record,
                None => return Ok(()),
            };

            let owned = record.is_owned_by(requester_id);
            if !owned && !record.is_expired(now) {
                tracing::info!(
                    "[Locks] release of {} by {} rejected: held by {}",
                    resource_id,
                    requester_id,
                    record.owner_id
                );
                return Err(LockError::Forbidden {
                    resource_id: resource_id.to_string(),
                    status: LockStatus::held(&record, requester_id, now),
                });
            }

            if self
                .store
                .delete(resource_id, Precondition::Revision(record.revision))
                .await?
            {
                let kind = if owned {
                    LockEventKind::Released
                } else {
                    LockEventKind::Reclaimed
                };
                tracing::info!("[Locks] {} {} by {}", resource_id, kind.as_str(), requester_id);
                self.publish(LockEvent::cleared(kind, resource_id, now));
                return Ok(());
            }

            tracing::debug!(
                "[Locks] release of {} raced with another writer (attempt {})",
                resource_id,
                attempt
            );
        }

        Err(self.contended(resource_id))
    }

    /// Best-effort removal of an expired record
    async fn reclaim(&self, record: &LockRecord, now: DateTime<Utc>) {
        match self
            .store
            .delete(&record.resource_id, Precondition::Revision(record.revision))
            .await
        {
            Ok(true) => {
                tracing::debug!(
                    "[Locks] cleared stale lock on {} (expired {})",
                    record.resource_id,
                    record.expires_at.to_rfc3339()
                );
                self.publish(LockEvent::cleared(
                    LockEventKind::Reclaimed,
                    &record.resource_id,
                    now,
                ));
            }
            Ok(false) => {
                tracing::debug!("[Locks] stale lock on {} already replaced", record.resource_id);
            }
            Err(e) => {
                tracing::warn!(
                    "[Locks] failed to clear stale lock on {}: {}",
                    record.resource_id,
                    e
                );
            }
        }
    }

    fn publish(&self, event: LockEvent) {
        match self.events.send(event) {
            Ok(subscribers) => {
                tracing::debug!("[Locks] event delivered to {} subscribers", subscribers);
            }
            Err(_) => {
                // No subscribers.
            }
        }
    }

    fn contended(&self, resource_id: &str) -> LockError {
        tracing::warn!(
            "[Locks] giving up on {} after {} conflicting writes",
            resource_id,
            self.settings.max_write_attempts
        );
        LockError::Contended {
            resource_id: resource_id.to_string(),
            attempts: self.settings.max_write_attempts,
        }
    }
}

/// Status of a record that may already have expired
fn status_for(record: &LockRecord, requester_id: &str, now: DateTime<Utc>) -> LockStatus {
    if record.is_expired(now) {
        LockStatus::unlocked()
    } else {
        LockStatus::held(record, requester_id, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::locks::clock::ManualClock;
    use crate::backend::locks::store::InMemoryLockStore;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const LEASE_SECS: i64 = 300;

    struct Harness {
        service: LockService,
        store: InMemoryLockStore,
        clock: ManualClock,
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn harness() -> Harness {
        let store = InMemoryLockStore::new();
        let clock = ManualClock::new(start());
        let service = LockService::new(
            Arc::new(store.clone()),
            Arc::new(clock.clone()),
            LockSettings::with_lease(std::time::Duration::from_secs(LEASE_SECS as u64)),
        )
        .unwrap();
        Harness { service, store, clock }
    }

    fn alice() -> LockIdentity {
        LockIdentity::new("Alice Editor", "alice@example.com")
    }

    fn bob() -> LockIdentity {
        LockIdentity::new("Bob Writer", "bob@example.com")
    }

    #[tokio::test]
    async fn test_events_only_cover_own_service() {
        let store = InMemoryLockStore::new();
        let clock = ManualClock::new(start());
        let build = || {
            LockService::new(
                Arc::new(store.clone()),
                Arc::new(clock.clone()),
                LockSettings::default(),
            )
            .unwrap()
        };
        let here = build();
        let elsewhere = build();
        let mut events = here.subscribe();

        elsewhere.acquire("sectionX", "alice", &alice(), false).await.unwrap();

        // The shared store sees the lock; this service published nothing.
        assert!(here.check("sectionX", "bob").await.unwrap().is_locked);
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let build = |settings: LockSettings| {
            LockService::new(
                Arc::new(InMemoryLockStore::new()),
                Arc::new(ManualClock::new(start())),
                settings,
            )
        };

        let no_attempts = LockSettings {
            max_write_attempts: 0,
            ..LockSettings::default()
        };
        assert!(matches!(
            build(no_attempts),
            Err(ConfigError::InvalidValue("max_write_attempts", _))
        ));
        assert!(matches!(
            build(LockSettings::with_lease(std::time::Duration::ZERO)),
            Err(ConfigError::InvalidValue("lease", _))
        ));
        assert!(build(LockSettings::default()).is_ok());
    }

    #[tokio::test]
    async fn test_check_unlocked() {
        let h = harness();
        let status = h.service.check("sectionX", "alice").await.unwrap();
        assert_eq!(status, LockStatus::unlocked());
    }

    #[tokio::test]
    async fn test_acquire_grants_unlocked_resource() {
        let h = harness();
        let status = h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();

        assert!(status.is_locked);
        assert!(status.can_override);
        assert_eq!(status.lock_expires_at, Some(start() + Duration::seconds(LEASE_SECS)));

        let record = h.store.get("sectionX").await.unwrap().unwrap();
        assert_eq!(record.owner_id, "alice");
        assert_eq!(record.expires_at - record.acquired_at, Duration::seconds(LEASE_SECS));
    }

    #[tokio::test]
    async fn test_check_from_holder_and_other() {
        let h = harness();
        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();
        h.clock.advance(Duration::seconds(10));

        let own = h.service.check("sectionX", "alice").await.unwrap();
        assert!(own.is_locked && own.can_override);

        let other = h.service.check("sectionX", "bob").await.unwrap();
        assert!(other.is_locked);
        assert!(!other.can_override);
        assert_eq!(other.locked_by_name.as_deref(), Some("Alice Editor"));
        assert_eq!(other.remaining_seconds, Some(LEASE_SECS - 10));
    }

    #[tokio::test]
    async fn test_acquire_conflict_reports_holder_and_ttl() {
        let h = harness();
        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();
        h.clock.advance(Duration::seconds(60));

        let err = h.service.acquire("sectionX", "bob", &bob(), false).await.unwrap_err();
        assert_matches!(&err, LockError::Conflict { status, .. } => {
            assert_eq!(status.locked_by.as_deref(), Some("alice@example.com"));
            assert_eq!(status.remaining_seconds, Some(LEASE_SECS - 60));
            assert!(!status.can_override);
        });
    }

    #[tokio::test]
    async fn test_override_never_crosses_owners() {
        let h = harness();
        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();

        for _ in 0..3 {
            let err = h.service.acquire("sectionX", "bob", &bob(), true).await.unwrap_err();
            assert_matches!(err, LockError::Conflict { .. });
        }
        let record = h.store.get("sectionX").await.unwrap().unwrap();
        assert_eq!(record.owner_id, "alice");
    }

    #[tokio::test]
    async fn test_self_conflict_requires_override() {
        let h = harness();
        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();

        let err = h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap_err();
        assert_matches!(&err, LockError::AlreadyHeldElsewhere { status, .. } => {
            assert!(status.can_override);
        });
    }

    #[tokio::test]
    async fn test_self_override_is_idempotent_and_extends() {
        let h = harness();
        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();

        for step in 1..=5 {
            h.clock.advance(Duration::seconds(30));
            let status = h.service.acquire("sectionX", "alice", &alice(), true).await.unwrap();
            assert_eq!(
                status.lock_expires_at,
                Some(start() + Duration::seconds(30 * step + LEASE_SECS))
            );
        }
    }

    #[tokio::test]
    async fn test_expired_lock_is_reclaimed_by_acquire() {
        let h = harness();
        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();
        h.clock.advance(Duration::seconds(LEASE_SECS + 1));

        let status = h.service.acquire("sectionX", "bob", &bob(), false).await.unwrap();
        assert_eq!(status.locked_by.as_deref(), Some("bob@example.com"));
        assert_eq!(h.store.get("sectionX").await.unwrap().unwrap().owner_id, "bob");
    }

    #[tokio::test]
    async fn test_lock_expires_exactly_at_lease_end() {
        let h = harness();
        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();
        h.clock.advance(Duration::seconds(LEASE_SECS));

        let status = h.service.check("sectionX", "bob").await.unwrap();
        assert!(!status.is_locked);
    }

    #[tokio::test]
    async fn test_check_clears_stale_record() {
        let h = harness();
        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();
        let mut events = h.service.subscribe();
        h.clock.advance(Duration::seconds(LEASE_SECS + 5));

        h.service.check("sectionX", "bob").await.unwrap();
        assert!(h.store.get("sectionX").await.unwrap().is_none());

        let event = events.recv().await.unwrap();
        assert_eq!(event.kind, LockEventKind::Reclaimed);
        assert!(!event.lock_status.is_locked);
    }

    #[tokio::test]
    async fn test_refresh_extends_monotonically() {
        let h = harness();
        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();

        let mut last = start();
        for _ in 0..4 {
            h.clock.advance(Duration::seconds(100));
            let status = h.service.refresh("sectionX", "alice").await.unwrap();
            let expires = status.lock_expires_at.unwrap();
            assert_eq!(expires, h.clock.current() + Duration::seconds(LEASE_SECS));
            assert!(expires >= last);
            last = expires;
        }
    }

    #[tokio::test]
    async fn test_refresh_errors() {
        let h = harness();
        assert_matches!(
            h.service.refresh("sectionX", "alice").await,
            Err(LockError::NotLocked { .. })
        );

        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();
        assert_matches!(
            h.service.refresh("sectionX", "bob").await,
            Err(LockError::NotOwner { .. })
        );

        h.clock.advance(Duration::seconds(LEASE_SECS));
        assert_matches!(
            h.service.refresh("sectionX", "alice").await,
            Err(LockError::Expired { .. })
        );
        // A refused refresh leaves the lapsed record alone.
        assert!(h.store.get("sectionX").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_release_rules() {
        let h = harness();
        h.service.release("sectionX", "alice").await.unwrap();
        h.service.release("sectionX", "alice").await.unwrap();

        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();
        assert_matches!(
            h.service.release("sectionX", "bob").await,
            Err(LockError::Forbidden { .. })
        );

        h.service.release("sectionX", "alice").await.unwrap();
        assert!(h.store.get("sectionX").await.unwrap().is_none());
        h.service.release("sectionX", "alice").await.unwrap();
    }

    #[tokio::test]
    async fn test_anyone_may_release_expired_lock() {
        let h = harness();
        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();
        let mut events = h.service.subscribe();
        h.clock.advance(Duration::seconds(LEASE_SECS + 1));

        h.service.release("sectionX", "bob").await.unwrap();
        assert!(h.store.get("sectionX").await.unwrap().is_none());
        assert_eq!(events.recv().await.unwrap().kind, LockEventKind::Reclaimed);
    }

    #[tokio::test]
    async fn test_takeover_scenario() {
        let h = harness();
        h.service.acquire("sectionX", "A", &alice(), false).await.unwrap();

        h.clock.advance(Duration::seconds(10));
        let seen = h.service.check("sectionX", "B").await.unwrap();
        assert!(seen.is_locked && !seen.can_override);
        assert_matches!(
            h.service.acquire("sectionX", "B", &bob(), false).await,
            Err(LockError::Conflict { .. })
        );

        h.clock.set(start() + Duration::seconds(310));
        h.service.acquire("sectionX", "B", &bob(), false).await.unwrap();

        assert_matches!(
            h.service.refresh("sectionX", "A").await,
            Err(LockError::NotOwner { status, .. }) if status.locked_by_name.as_deref() == Some("Bob Writer")
        );
    }

    #[tokio::test]
    async fn test_events_follow_lifecycle() {
        let h = harness();
        let mut events = h.service.subscribe();

        h.service.acquire("sectionX", "alice", &alice(), false).await.unwrap();
        h.service.acquire("sectionX", "alice", &alice(), true).await.unwrap();
        h.service.refresh("sectionX", "alice").await.unwrap();
        h.service.release("sectionX", "alice").await.unwrap();

        let kinds: Vec<_> = [
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
        ]
        .into_iter()
        .map(|e| e.kind)
        .collect();
        assert_eq!(
            kinds,
            vec![
                LockEventKind::Acquired,
                LockEventKind::Overridden,
                LockEventKind::Refreshed,
                LockEventKind::Released
            ]
        );
    }

    /// Store that lets a competing editor slip in between a read and the
    /// first conditional write.
    struct RacingStore {
        inner: InMemoryLockStore,
        competitor: LockRecord,
        fired: AtomicBool,
    }

    #[async_trait]
    impl LockRecordStore for RacingStore {
        async fn get(&self, resource_id: &str) -> Result<Option<LockRecord>, LockError> {
            self.inner.get(resource_id).await
        }

        async fn put(&self, record: &LockRecord, expected: Precondition) -> Result<bool, LockError> {
            if !self.fired.swap(true, Ordering::SeqCst) {
                let current = self.inner.get(&record.resource_id).await?;
                self.inner
                    .put(&self.competitor, Precondition::matching(current.as_ref()))
                    .await?;
            }
            self.inner.put(record, expected).await
        }

        async fn delete(&self, resource_id: &str, expected: Precondition) -> Result<bool, LockError> {
            self.inner.delete(resource_id, expected).await
        }
    }

    #[tokio::test]
    async fn test_acquire_race_has_single_winner() {
        let inner = InMemoryLockStore::new();
        let competitor = LockRecord::grant(
            "sectionX",
            "bob",
            &bob(),
            start(),
            Duration::seconds(LEASE_SECS),
            next_revision(None, start()),
        );
        let store = RacingStore {
            inner: inner.clone(),
            competitor,
            fired: AtomicBool::new(false),
        };
        let service = LockService::new(
            Arc::new(store),
            Arc::new(ManualClock::new(start())),
            LockSettings::default(),
        )
        .unwrap();

        // Alice read "absent", Bob wrote first: Alice must re-read and lose.
        let err = service.acquire("sectionX", "alice", &alice(), false).await.unwrap_err();
        assert_matches!(err, LockError::Conflict { .. });
        assert_eq!(inner.get("sectionX").await.unwrap().unwrap().owner_id, "bob");
    }

    /// Store whose writes always lose.
    struct AlwaysLosingStore {
        inner: InMemoryLockStore,
        puts: AtomicUsize,
    }

    #[async_trait]
    impl LockRecordStore for AlwaysLosingStore {
        async fn get(&self, resource_id: &str) -> Result<Option<LockRecord>, LockError> {
            self.inner.get(resource_id).await
        }

        async fn put(&self, _record: &LockRecord, _expected: Precondition) -> Result<bool, LockError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }

        async fn delete(&self, _resource_id: &str, _expected: Precondition) -> Result<bool, LockError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_contention_is_bounded() {
        let store = Arc::new(AlwaysLosingStore {
            inner: InMemoryLockStore::new(),
            puts: AtomicUsize::new(0),
        });
        let settings = LockSettings {
            max_write_attempts: 3,
            ..LockSettings::default()
        };
        let service =
            LockService::new(store.clone(), Arc::new(ManualClock::new(start())), settings).unwrap();

        let err = service.acquire("sectionX", "alice", &alice(), false).await.unwrap_err();
        assert_matches!(err, LockError::Contended { attempts: 3, .. });
        assert_eq!(store.puts.load(Ordering::SeqCst), 3);
    }

    /// Store that serves reads but fails every write.
    struct ReadOnlyStore {
        inner: InMemoryLockStore,
    }

    #[async_trait]
    impl LockRecordStore for ReadOnlyStore {
        async fn get(&self, resource_id: &str) -> Result<Option<LockRecord>, LockError> {
            self.inner.get(resource_id).await
        }

        async fn put(&self, _record: &LockRecord, _expected: Precondition) -> Result<bool, LockError> {
            Err(LockError::store("disk full"))
        }

        async fn delete(&self, _resource_id: &str, _expected: Precondition) -> Result<bool, LockError> {
            Err(LockError::store("disk full"))
        }
    }

    #[tokio::test]
    async fn test_check_survives_cleanup_failure_but_writes_surface_it() {
        let inner = InMemoryLockStore::new();
        let stale = LockRecord::grant(
            "sectionX",
            "alice",
            &alice(),
            start() - Duration::hours(1),
            Duration::seconds(LEASE_SECS),
            1,
        );
        inner.put(&stale, Precondition::Absent).await.unwrap();

        let service = LockService::new(
            Arc::new(ReadOnlyStore { inner }),
            Arc::new(ManualClock::new(start())),
            LockSettings::default(),
        )
        .unwrap();

        let status = service.check("sectionX", "bob").await.unwrap();
        assert!(!status.is_locked);

        assert_matches!(
            service.acquire("sectionX", "bob", &bob(), false).await,
            Err(LockError::StoreUnavailable { .. })
        );
    }
}
