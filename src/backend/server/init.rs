/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server:
 * store and clock selection, lock service creation, and route configuration.
 *
 * # Store Selection
 *
 * | `DATABASE_URL`         | Store               | Clock        |
 * |------------------------|---------------------|--------------|
 * | set and reachable      | `PgLockStore`       | `PgClock`    |
 * | set but unreachable    | startup error       |              |
 * | unset                  | `InMemoryLockStore` | `SystemClock`|
 *
 * With PostgreSQL every server process stamps lease times from the
 * database clock, so several processes can share one store.
 */

use axum::Router;
use std::sync::Arc;

use crate::backend::locks::{
    ClockSource, InMemoryLockStore, LockRecordStore, LockService, PgClock, PgLockStore,
    SystemClock,
};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, StartupError};
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Create and configure the Axum application
///
/// # Initialization Steps
///
/// 1. **Load Database**: Attempts to connect and migrate
/// 2. **Pick Store and Clock**: PostgreSQL if configured, in-memory otherwise
/// 3. **Create Lock Service**: With the configured lease and retry budget
/// 4. **Create Router**: Mounts the lock routes under the configured prefix
///
/// Fails when `DATABASE_URL` is set but the database cannot be reached.
pub async fn create_app(config: AppConfig) -> Result<Router<()>, StartupError> {
    tracing::info!("Initializing xflock server");

    let db_pool = load_database().await?;

    let (store, clock): (Arc<dyn LockRecordStore>, Arc<dyn ClockSource>) = match db_pool {
        Some(pool) => {
            tracing::info!("[Locks] Using PostgreSQL store and database clock");
            (
                Arc::new(PgLockStore::new(pool.clone())),
                Arc::new(PgClock::new(pool)),
            )
        }
        None => {
            tracing::info!("[Locks] Using in-memory store and system clock");
            (Arc::new(InMemoryLockStore::new()), Arc::new(SystemClock))
        }
    };

    let service = LockService::new(store, clock, config.lock)?;
    Ok(create_app_with(service, config))
}

/// Build the router around an already constructed lock service
pub fn create_app_with(service: LockService, config: AppConfig) -> Router<()> {
    tracing::info!(
        "[Locks] Lease {}s, {} write attempts, mounted at {}",
        config.lock.lease.as_secs(),
        config.lock.max_write_attempts,
        config.route_prefix
    );

    create_router(AppState::new(service, config))
}
