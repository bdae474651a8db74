/**
 * Error Conversion
 *
 * All backend errors implement `IntoResponse` from Axum, allowing them to be
 * returned directly from handlers.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "success": false,
 *   "error": "Section 'sectionX' is being edited by someone else",
 *   "code": "conflict",
 *   "status": 423,
 *   "lockStatus": { "isLocked": true, "canOverride": false, ... }
 * }
 * ```
 *
 * `lockStatus` is present only for errors that describe a current holder.
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use crate::backend::error::types::BackendError;
use crate::shared::LockErrorResponse;

impl From<&BackendError> for LockErrorResponse {
    fn from(err: &BackendError) -> Self {
        Self {
            success: false,
            error: err.message(),
            code: err.code(),
            status: err.status_code().as_u16(),
            lock_status: err.lock_status().cloned(),
        }
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[Locks] {} ({})", self.message(), status);
        } else {
            tracing::debug!("[Locks] {} ({})", self.message(), status);
        }

        (status, Json(LockErrorResponse::from(&self))).into_response()
    }
}
