/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Thread Safety
 *
 * `LockService` holds no mutable state of its own (records live in the
 * store), so it is shared across handlers as a plain `Arc`.
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow Axum handlers to extract specific
 * parts of the state without needing the entire `AppState`.
 *
 * ```rust,no_run
 * use std::sync::Arc;
 * use axum::extract::State;
 * use xflock::backend::locks::LockService;
 *
 * async fn handler(State(locks): State<Arc<LockService>>) {
 *     let _lease = locks.settings().lease;
 * }
 * ```
 */

use axum::extract::FromRef;
use std::sync::Arc;
use crate::backend::locks::LockService;
use crate::shared::AppConfig;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Lock protocol engine
    pub locks: Arc<LockService>,
    /// Effective configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(locks: LockService, config: AppConfig) -> Self {
        Self {
            locks: Arc::new(locks),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Arc<LockService> {
    fn from_ref(state: &AppState) -> Self {
        state.locks.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
