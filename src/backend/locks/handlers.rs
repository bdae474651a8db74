/**
 * Lock Endpoint Handlers
 *
 * Thin HTTP mapping of the four lock operations onto one resource path.
 * Handlers validate parameters and translate results; every decision is
 * made by `LockService`.
 *
 * # Routes
 *
 * | Verb     | Input                                            | Operation |
 * |----------|--------------------------------------------------|-----------|
 * | `GET`    | `?requesterId=`                                  | `check`   |
 * | `POST`   | `{requesterId, userEmail, userName, override?}`  | `acquire` |
 * | `PUT`    | `?requesterId=`                                  | `refresh` |
 * | `DELETE` | `?requesterId=`                                  | `release` |
 *
 * Errors are returned as `BackendError`, which renders the JSON error body
 * and status code.
 */

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};

use crate::backend::error::BackendError;
use crate::backend::locks::service::LockService;
use crate::shared::error::require_field;
use crate::shared::{
    AcquireLockRequest, LockIdentity, LockOperationResponse, LockStatus, RequesterQuery,
};

/// Handle lock check (GET /{prefix}/{resource_id})
pub async fn handle_check_lock(
    State(locks): State<Arc<LockService>>,
    Path(resource_id): Path<String>,
    Query(query): Query<RequesterQuery>,
) -> Result<Json<LockStatus>, BackendError> {
    let requester_id = require_field(query.requester_id.as_deref(), "requesterId")?;
    tracing::debug!("[Locks] GET {} for {}", resource_id, requester_id);

    let status = locks.check(&resource_id, requester_id).await?;
    Ok(Json(status))
}

/// Handle lock acquire (POST /{prefix}/{resource_id})
///
/// The body is parsed by hand so that malformed JSON is reported with the
/// same error body as every other failure.
pub async fn handle_acquire_lock(
    State(locks): State<Arc<LockService>>,
    Path(resource_id): Path<String>,
    body: Bytes,
) -> Result<Json<LockOperationResponse>, BackendError> {
    let request: AcquireLockRequest = serde_json::from_slice(&body)?;

    let requester_id = require_field(request.requester_id.as_deref(), "requesterId")?;
    let contact = require_field(request.user_email.as_deref(), "userEmail")?;
    let display_name = require_field(request.user_name.as_deref(), "userName")?;
    let identity = LockIdentity::new(display_name, contact);

    tracing::debug!(
        "[Locks] POST {} for {} (override: {})",
        resource_id,
        requester_id,
        request.override_lock
    );

    let status = locks
        .acquire(&resource_id, requester_id, &identity, request.override_lock)
        .await?;
    Ok(Json(LockOperationResponse::with_status(status)))
}

/// Handle lock refresh (PUT /{prefix}/{resource_id})
pub async fn handle_refresh_lock(
    State(locks): State<Arc<LockService>>,
    Path(resource_id): Path<String>,
    Query(query): Query<RequesterQuery>,
) -> Result<Json<LockOperationResponse>, BackendError> {
    let requester_id = require_field(query.requester_id.as_deref(), "requesterId")?;
    tracing::debug!("[Locks] PUT {} for {}", resource_id, requester_id);

    let status = locks.refresh(&resource_id, requester_id).await?;
    Ok(Json(LockOperationResponse::with_status(status)))
}

/// Handle lock release (DELETE /{prefix}/{resource_id})
pub async fn handle_release_lock(
    State(locks): State<Arc<LockService>>,
    Path(resource_id): Path<String>,
    Query(query): Query<RequesterQuery>,
) -> Result<Json<LockOperationResponse>, BackendError> {
    let requester_id = require_field(query.requester_id.as_deref(), "requesterId")?;
    tracing::debug!("[Locks] DELETE {} for {}", resource_id, requester_id);

    locks.release(&resource_id, requester_id).await?;
    Ok(Json(LockOperationResponse::ok()))
}
