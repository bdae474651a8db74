//! Property-based tests for the lock service
//!
//! Random operation sequences are run against the service and against a
//! small reference model of the lock state machine; every result must match.

#![cfg(feature = "ssr")]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use xflock::backend::locks::{InMemoryLockStore, LockError, LockRecordStore, LockService, ManualClock};
use xflock::shared::{LockIdentity, LockSettings};

const LEASE_SECS: i64 = 300;
const RESOURCE: &str = "sectionX";

#[derive(Debug, Clone)]
enum Op {
    Check(usize),
    Acquire(usize, bool),
    Refresh(usize),
    Release(usize),
    Advance(i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize).prop_map(Op::Check),
        (0..3usize, any::<bool>()).prop_map(|(who, o)| Op::Acquire(who, o)),
        (0..3usize).prop_map(Op::Refresh),
        (0..3usize).prop_map(Op::Release),
        (0..400i64).prop_map(Op::Advance),
    ]
}

fn requester(who: usize) -> String {
    format!("editor-{}", who)
}

fn identity(who: usize) -> LockIdentity {
    LockIdentity::new(format!("Editor {}", who), format!("editor{}@example.com", who))
}

/// Stored record as the model sees it: owner and expiry, expired or not
type Model = Option<(usize, DateTime<Utc>)>;

fn run(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async move {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let lease = Duration::seconds(LEASE_SECS);
        let store = InMemoryLockStore::new();
        let clock = ManualClock::new(start);
        let service = LockService::new(
            Arc::new(store.clone()),
            Arc::new(clock.clone()),
            LockSettings::with_lease(std::time::Duration::from_secs(LEASE_SECS as u64)),
        )
        .unwrap();
        let mut model: Model = None;

        for op in ops {
            let now = clock.current();
            let live = |m: &Model| m.filter(|(_, expires)| *expires > now);

            match op {
                Op::Advance(secs) => clock.advance(Duration::seconds(secs)),
                Op::Check(who) => {
                    let status = service.check(RESOURCE, &requester(who)).await.unwrap();
                    let expected = live(&model);
                    prop_assert_eq!(status.is_locked, expected.is_some());
                    prop_assert_eq!(status.can_override, expected.map_or(false, |(o, _)| o == who));
                    model = expected;
                }
                Op::Acquire(who, override_lock) => {
                    let result = service
                        .acquire(RESOURCE, &requester(who), &identity(who), override_lock)
                        .await;
                    match live(&model) {
                        None => {
                            prop_assert!(result.is_ok());
                            model = Some((who, now + lease));
                        }
                        Some((owner, _)) if owner != who => {
                            prop_assert!(matches!(result, Err(LockError::Conflict { .. })), "expected LockError::Conflict");
                        }
                        Some(_) if !override_lock => {
                            prop_assert!(matches!(result, Err(LockError::AlreadyHeldElsewhere { .. })), "expected LockError::AlreadyHeldElsewhere");
                        }
                        Some(_) => {
                            prop_assert!(result.is_ok());
                            model = Some((who, now + lease));
                        }
                    }
                }
                Op::Refresh(who) => {
                    let result = service.refresh(RESOURCE, &requester(who)).await;
                    match model {
                        None => prop_assert!(matches!(result, Err(LockError::NotLocked { .. })), "expected LockError::NotLocked"),
                        Some((owner, _)) if owner != who => {
                            prop_assert!(matches!(result, Err(LockError::NotOwner { .. })), "expected LockError::NotOwner")
                        }
                        Some((_, expires)) if expires <= now => {
                            prop_assert!(matches!(result, Err(LockError::Expired { .. })), "expected LockError::Expired")
                        }
                        Some(_) => {
                            let status = result.unwrap();
                            prop_assert_eq!(status.lock_expires_at, Some(now + lease));
                            model = Some((who, now + lease));
                        }
                    }
                }
                Op::Release(who) => {
                    let result = service.release(RESOURCE, &requester(who)).await;
                    match model {
                        Some((owner, expires)) if owner != who && expires > now => {
                            prop_assert!(matches!(result, Err(LockError::Forbidden { .. })), "expected LockError::Forbidden");
                        }
                        _ => {
                            prop_assert!(result.is_ok());
                            model = None;
                        }
                    }
                }
            }

            // The store holds exactly what the model says.
            let stored = store.get(RESOURCE).await.unwrap();
            prop_assert_eq!(
                stored.map(|r| (r.owner_id, r.expires_at)),
                model.map(|(owner, expires)| (requester(owner), expires))
            );
        }
        Ok::<(), TestCaseError>(())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_service_matches_state_machine(ops in prop::collection::vec(op(), 1..40)) {
        run(ops)?;
    }

    #[test]
    fn test_cross_owner_override_never_grants(attempts in 1..10usize, offset in 0..LEASE_SECS) {
        run(
            std::iter::once(Op::Acquire(0, false))
                .chain(std::iter::once(Op::Advance(offset)))
                .chain(std::iter::repeat(Op::Acquire(1, true)).take(attempts))
                .collect(),
        )?;
    }
}
