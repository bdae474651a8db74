//! Backend Module
//!
//! This module contains all server-side code for the lock server: an Axum
//! HTTP service that decides who may currently edit a given section.
//!
//! # Overview
//!
//! The backend module includes:
//! - Axum HTTP server setup and configuration
//! - The lock protocol engine (`check`, `acquire`, `refresh`, `release`)
//! - In-memory and PostgreSQL lock record stores
//! - Server-Sent Events stream of lock changes
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization, state and configuration
//! ├── routes/         - Route configuration
//! ├── locks/          - Lock service, stores, clocks and handlers
//! └── error/          - HTTP error mapping
//! ```
//!
//! # Concurrency
//!
//! Handlers share one `Arc<LockService>`. Every lock operation is a
//! compare-and-swap loop against the store, so no in-process lock guards the
//! records and several server processes may share one PostgreSQL store.
//!
//! # Example
//!
//! ```rust,no_run
//! use xflock::backend::server::{config::load_config, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(load_config()?).await?;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Section locks
pub mod locks;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::BackendError;
pub use locks::{LockError, LockService};
pub use server::create_app;
