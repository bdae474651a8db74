//! Section Lock Module
//!
//! Advisory edit locks with a fixed lease, one per editable resource.
//!
//! # Module Structure
//!
//! ```text
//! locks/
//! ├── mod.rs       - Module exports and documentation
//! ├── error.rs     - Lock error taxonomy
//! ├── clock.rs     - Clock sources (system, manual, database)
//! ├── store.rs     - Store contract and in-memory store
//! ├── pg_store.rs  - PostgreSQL store
//! ├── service.rs   - check / acquire / refresh / release
//! ├── handlers.rs  - HTTP handlers
//! └── events.rs    - SSE stream of lock changes
//! ```

/// Lock error taxonomy
pub mod error;

/// Clock sources
pub mod clock;

/// Lock record store contract and in-memory store
pub mod store;

/// PostgreSQL lock record store
pub mod pg_store;

/// Lock protocol engine
pub mod service;

/// HTTP handlers
pub mod handlers;

/// Lock event subscription
pub mod events;

pub use clock::{ClockSource, ManualClock, PgClock, SystemClock};
pub use error::LockError;
pub use pg_store::PgLockStore;
pub use service::LockService;
pub use store::{InMemoryLockStore, LockRecordStore, Precondition};
