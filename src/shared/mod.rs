//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the lock server and the client agent. These types are used for
//! serialization and communication over the lock endpoint.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types that can be used
//! in both server and client code. All types are designed for serialization
//! and transmission over HTTP.

/// Lock records, lock status and endpoint payloads
pub mod lock;

/// Lock change events
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use lock::{
    AcquireLockRequest, LockErrorCode, LockErrorResponse, LockIdentity, LockOperationResponse,
    LockRecord, LockStatus, RequesterQuery,
};
pub use event::{LockEvent, LockEventKind};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, LockSettings};
