/**
 * Client Lock Agent
 *
 * Caller-side helper around the lock endpoint:
 *
 * - `acquire` runs the confirmation flow. A conflict with another editor
 *   leaves the section read-only; a conflict with the requester's own other
 *   session asks an `OverridePrompt` whether to take over.
 * - A granted acquire returns an `EditSession` whose heartbeat task
 *   refreshes the lease every `heartbeat_interval`, capped at half of the
 *   lease the server actually granted.
 * - `EditSession::release` is best-effort: failures are logged and the
 *   lease is left to expire.
 *
 * The agent never retries a conflict on its own.
 */

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::client::api::LockApiClient;
use crate::client::config::ClientConfig;
use crate::client::error::ClientError;
use crate::client::messages::{describe_conflict, describe_lost_lock, describe_self_conflict};
use crate::shared::{LockErrorCode, LockIdentity, LockStatus};

/// Decides whether to take over the requester's own lock from another session
pub trait OverridePrompt: Send + Sync {
    /// `message` is ready to show to the user
    fn confirm_override(&self, status: &LockStatus, message: &str) -> bool;
}

impl<F> OverridePrompt for F
where
    F: Fn(&LockStatus, &str) -> bool + Send + Sync,
{
    fn confirm_override(&self, status: &LockStatus, message: &str) -> bool {
        self(status, message)
    }
}

/// Always take over
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOverride;

impl OverridePrompt for AlwaysOverride {
    fn confirm_override(&self, _status: &LockStatus, _message: &str) -> bool {
        true
    }
}

/// Never take over
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOverride;

impl OverridePrompt for NeverOverride {
    fn confirm_override(&self, _status: &LockStatus, _message: &str) -> bool {
        false
    }
}

/// Why a section stays read-only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOnlyReason {
    /// Another editor holds a live lock
    HeldByOther,
    /// The requester holds it elsewhere and declined to take over
    OverrideDeclined,
}

/// Result of `ClientLockAgent::acquire`
#[derive(Debug)]
pub enum AcquireOutcome {
    Granted(EditSession),
    ReadOnly {
        reason: ReadOnlyReason,
        status: LockStatus,
        message: String,
    },
}

impl AcquireOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Heartbeat state of an edit session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Active,
    /// The lock is gone; the message is ready to show to the user
    Lost(String),
}

/// Lock client for one editor
#[derive(Debug, Clone)]
pub struct ClientLockAgent {
    api: Arc<LockApiClient>,
    requester_id: String,
    identity: LockIdentity,
    heartbeat_interval: Duration,
}

impl ClientLockAgent {
    pub fn new(
        config: ClientConfig,
        requester_id: impl Into<String>,
        identity: LockIdentity,
    ) -> Result<Self, ClientError> {
        let heartbeat_interval = config.heartbeat_interval();
        Ok(Self {
            api: Arc::new(LockApiClient::new(config)?),
            requester_id: requester_id.into(),
            identity,
            heartbeat_interval,
        })
    }

    pub fn requester_id(&self) -> &str {
        &self.requester_id
    }

    pub fn api(&self) -> &LockApiClient {
        &self.api
    }

    pub async fn check(&self, resource_id: &str) -> Result<LockStatus, ClientError> {
        self.api.check(resource_id, &self.requester_id).await
    }

    /// Whether the UI may offer editing for `resource_id`
    pub async fn can_edit(&self, resource_id: &str) -> Result<bool, ClientError> {
        let status = self.check(resource_id).await?;
        Ok(!status.is_locked || status.can_override)
    }

    /// Acquire `resource_id` for editing
    ///
    /// Network and server failures are returned as errors; the section must
    /// then be treated as not acquired.
    pub async fn acquire(
        &self,
        resource_id: &str,
        prompt: &dyn OverridePrompt,
    ) -> Result<AcquireOutcome, ClientError> {
        let status = match self
            .api
            .acquire(resource_id, &self.requester_id, &self.identity, false)
            .await
        {
            Ok(status) => status,
            Err(err) => return self.resolve_denied(resource_id, err, prompt).await,
        };

        tracing::info!("[LockAgent] Acquired {}", resource_id);
        Ok(AcquireOutcome::Granted(self.start_session(resource_id, status)))
    }

    async fn resolve_denied(
        &self,
        resource_id: &str,
        err: ClientError,
        prompt: &dyn OverridePrompt,
    ) -> Result<AcquireOutcome, ClientError> {
        let status = err.lock_status().cloned().unwrap_or_default();

        match err.code() {
            Some(LockErrorCode::Conflict) => {
                let message = describe_conflict(&status);
                tracing::info!("[LockAgent] {} is held by another editor", resource_id);
                Ok(AcquireOutcome::ReadOnly {
                    reason: ReadOnlyReason::HeldByOther,
                    status,
                    message,
                })
            }
            Some(LockErrorCode::AlreadyHeldElsewhere) => {
                let message = describe_self_conflict(&status);
                if !prompt.confirm_override(&status, &message) {
                    tracing::info!("[LockAgent] Override of {} declined", resource_id);
                    return Ok(AcquireOutcome::ReadOnly {
                        reason: ReadOnlyReason::OverrideDeclined,
                        status,
                        message,
                    });
                }

                match self
                    .api
                    .acquire(resource_id, &self.requester_id, &self.identity, true)
                    .await
                {
                    Ok(status) => {
                        tracing::info!("[LockAgent] Took over {} from another session", resource_id);
                        Ok(AcquireOutcome::Granted(self.start_session(resource_id, status)))
                    }
                    // Someone else got in between the two requests.
                    Err(err) if err.code() == Some(LockErrorCode::Conflict) => {
                        let status = err.lock_status().cloned().unwrap_or_default();
                        Ok(AcquireOutcome::ReadOnly {
                            reason: ReadOnlyReason::HeldByOther,
                            message: describe_conflict(&status),
                            status,
                        })
                    }
                    Err(err) => Err(err),
                }
            }
            _ if err.is_timeout() => {
                // The server may still have granted it; the lease runs out unused.
                tracing::warn!("[LockAgent] Acquire of {} timed out, treating as failed", resource_id);
                Err(err)
            }
            _ => {
                tracing::warn!("[LockAgent] Acquire of {} failed: {}", resource_id, err);
                Err(err)
            }
        }
    }

    fn start_session(&self, resource_id: &str, status: LockStatus) -> EditSession {
        let interval = heartbeat_period(self.heartbeat_interval, &status);
        tracing::debug!("[LockAgent] Heartbeat for {} every {:?}", resource_id, interval);

        let (state_tx, state_rx) = watch::channel(SessionState::Active);
        let heartbeat = tokio::spawn(run_heartbeat(
            self.api.clone(),
            resource_id.to_string(),
            self.requester_id.clone(),
            interval,
            state_tx,
        ));

        EditSession {
            api: self.api.clone(),
            resource_id: resource_id.to_string(),
            requester_id: self.requester_id.clone(),
            status,
            state: state_rx,
            heartbeat: Some(heartbeat),
        }
    }
}

/// An open edit on one resource
///
/// Dropping the session stops the heartbeat without releasing; the lease
/// then runs out on its own.
#[derive(Debug)]
pub struct EditSession {
    api: Arc<LockApiClient>,
    resource_id: String,
    requester_id: String,
    status: LockStatus,
    state: watch::Receiver<SessionState>,
    heartbeat: Option<JoinHandle<()>>,
}

impl EditSession {
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Lock status at the time the session was granted
    pub fn granted_status(&self) -> &LockStatus {
        &self.status
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        *self.state.borrow() == SessionState::Active
    }

    /// Watch heartbeat state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Stop the heartbeat and release the lock
    ///
    /// Returns whether the server confirmed the release. A failure is only
    /// logged: the lease will expire anyway.
    pub async fn release(mut self) -> bool {
        self.stop_heartbeat();
        match self.api.release(&self.resource_id, &self.requester_id).await {
            Ok(()) => {
                tracing::info!("[LockAgent] Released {}", self.resource_id);
                true
            }
            Err(e) => {
                tracing::warn!(
                    "[LockAgent] Release of {} failed, lease will expire: {}",
                    self.resource_id,
                    e
                );
                false
            }
        }
    }

    fn stop_heartbeat(&mut self) {
        if let Some(handle) = self.heartbeat.take() {
            handle.abort();
        }
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        self.stop_heartbeat();
    }
}

/// Refresh period for a granted lock
///
/// The server's lease may be shorter than the one this client was configured
/// with, so the period never exceeds half of the granted lease.
fn heartbeat_period(configured: Duration, granted: &LockStatus) -> Duration {
    let lease = match (granted.lock_acquired_at, granted.lock_expires_at) {
        (Some(acquired), Some(expires)) => (expires - acquired).to_std().ok(),
        _ => None,
    };

    match lease.map(|lease| lease / 2) {
        Some(half) if !half.is_zero() => configured.min(half),
        _ => configured,
    }
}

async fn run_heartbeat(
    api: Arc<LockApiClient>,
    resource_id: String,
    requester_id: String,
    interval: Duration,
    state: watch::Sender<SessionState>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match api.refresh(&resource_id, &requester_id).await {
            Ok(status) => {
                tracing::debug!(
                    "[LockAgent] Refreshed {}, {}s left",
                    resource_id,
                    status.remaining_seconds.unwrap_or_default()
                );
            }
            Err(e) if e.is_lease_lost() => {
                tracing::warn!("[LockAgent] Lost lock on {}: {}", resource_id, e);
                state.send_replace(SessionState::Lost(describe_lost_lock(&e)));
                return;
            }
            Err(e) => {
                // Retried at the next tick.
                tracing::warn!("[LockAgent] Heartbeat for {} failed: {}", resource_id, e);
            }
        }
    }
}
