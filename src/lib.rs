//! xflock - Section Edit Locks
//!
//! xflock lets several editors work on a shared document store without
//! silently overwriting each other. Before editing a section, an editor
//! acquires a short advisory lease on it; the lease is kept alive by a
//! heartbeat and reclaimed by anyone once it lapses.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between server and client
//!   - Lock record, lock status and wire payloads
//!   - Lock events
//!   - Configuration and validation errors
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Lock service with compare-and-swap against the store
//!   - In-memory and PostgreSQL stores
//!   - Axum endpoint and SSE event stream
//!
//! - **`client`** - Editor-side code
//!   - Typed HTTP client for the lock endpoint
//!   - Acquire-with-confirmation flow and heartbeat
//!
//! # Feature Flags
//!
//! - **`ssr`** - Server build (Axum, sqlx, tracing-subscriber). On by default.
//!
//! # Lock Semantics
//!
//! - One lock record per resource; a record with `expires_at <= now` counts
//!   as absent
//! - `override` only replaces the requester's own lock, never another
//!   editor's
//! - `refresh` never resurrects an expired lease
//! - Releasing an absent lock succeeds
//!
//! # Usage
//!
//! ```rust,no_run
//! use xflock::backend::server::{config::load_config, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(load_config()?).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Editor-side lock client
pub mod client;
