//! Lock Client
//!
//! Caller-side code for editors: a typed HTTP client for the lock endpoint
//! and an agent that runs the acquire / heartbeat / release cycle.
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs       - Module exports and documentation
//! ├── config.rs    - Client configuration (CLIENT_* environment)
//! ├── error.rs     - Client error type
//! ├── api.rs       - LockApiClient (reqwest)
//! ├── agent.rs     - ClientLockAgent and EditSession
//! └── messages.rs  - Human-readable lock messages
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use xflock::client::{AcquireOutcome, ClientConfig, ClientLockAgent, NeverOverride};
//! use xflock::shared::LockIdentity;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let agent = ClientLockAgent::new(
//!     ClientConfig::from_env()?,
//!     "user-42",
//!     LockIdentity::new("Alice Editor", "alice@example.com"),
//! )?;
//!
//! match agent.acquire("sectionX", &NeverOverride).await? {
//!     AcquireOutcome::Granted(session) => {
//!         // edit...
//!         session.release().await;
//!     }
//!     AcquireOutcome::ReadOnly { message, .. } => println!("{}", message),
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod messages;

pub use agent::{
    AcquireOutcome, AlwaysOverride, ClientLockAgent, EditSession, NeverOverride, OverridePrompt,
    ReadOnlyReason, SessionState,
};
pub use api::LockApiClient;
pub use config::ClientConfig;
pub use error::ClientError;
