//! Route Configuration Module
//!
//! This module configures all HTTP routes for the lock server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! └── router.rs       - Main router creation
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xflock::backend::locks::{InMemoryLockStore, LockService, SystemClock};
//! use xflock::backend::routes::create_router;
//! use xflock::backend::server::AppState;
//! use xflock::shared::AppConfig;
//!
//! # fn example() -> Result<(), xflock::shared::ConfigError> {
//! let config = AppConfig::default();
//! let service = LockService::new(
//!     Arc::new(InMemoryLockStore::new()),
//!     Arc::new(SystemClock),
//!     config.lock,
//! )?;
//! let router = create_router(AppState::new(service, config));
//! # Ok(())
//! # }
//! ```

/// Main router creation
pub mod router;

// Re-export commonly used functions
pub use router::create_router;
