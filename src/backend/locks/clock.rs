/**
 * Clock Sources
 *
 * The lock service never calls `Utc::now()` directly. It asks a
 * `ClockSource`, which lets tests drive time by hand and lets several
 * server processes share one authoritative clock.
 *
 * # Implementations
 *
 * - `SystemClock` - local wall clock, for a single server process
 * - `ManualClock` - settable clock for tests
 * - `PgClock` - the database server's `NOW()`; used whenever the lock
 *   records live in PostgreSQL so that every process stamps `acquired_at`
 *   and `expires_at` from the same clock
 */
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::backend::locks::error::LockError;

/// Source of the current time for expiry math
#[async_trait]
pub trait ClockSource: Send + Sync {
    async fn now(&self) -> Result<DateTime<Utc>, LockError>;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl ClockSource for SystemClock {
    async fn now(&self) -> Result<DateTime<Utc>, LockError> {
        Ok(Utc::now())
    }
}

/// Hand-driven clock
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the service.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = *now + by;
    }

    pub fn current(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ClockSource for ManualClock {
    async fn now(&self) -> Result<DateTime<Utc>, LockError> {
        Ok(self.current())
    }
}

/// Database server time
#[derive(Debug, Clone)]
pub struct PgClock {
    pool: PgPool,
}

impl PgClock {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClockSource for PgClock {
    async fn now(&self) -> Result<DateTime<Utc>, LockError> {
        sqlx::query_scalar::<_, DateTime<Utc>>("SELECT NOW()")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("[Locks] Failed to read database clock: {:?}", e);
                LockError::store(e)
            })
    }
}
