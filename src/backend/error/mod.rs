//! Backend Error Module
//!
//! This module defines the error type returned by HTTP handlers and its
//! conversion into JSON responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions and status mapping
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use xflock::backend::error::BackendError;
//! use axum::Json;
//! use xflock::shared::LockStatus;
//!
//! # async fn example() -> Result<Json<LockStatus>, BackendError> {
//! // Handler can return BackendError directly
//! # Ok(Json(LockStatus::unlocked()))
//! # }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;
