/**
 * Router Configuration
 *
 * This module provides the main router creation function.
 *
 * # Routes
 *
 * With the default prefix `/api/locks`:
 *
 * - `GET    /api/locks/{resource_id}` - Check lock state
 * - `POST   /api/locks/{resource_id}` - Acquire (optionally with override)
 * - `PUT    /api/locks/{resource_id}` - Refresh the holder's lease
 * - `DELETE /api/locks/{resource_id}` - Release
 * - `GET    /api/locks/{resource_id}/events` - SSE stream of lock changes
 *
 * Unknown paths get a JSON 404 in the same shape as every other error.
 */

use axum::{http::StatusCode, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::locks::events::handle_lock_events;
use crate::backend::locks::handlers::{
    handle_acquire_lock, handle_check_lock, handle_refresh_lock, handle_release_lock,
};
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// Routes are mounted under `app_state.config.route_prefix`.
pub fn create_router(app_state: AppState) -> Router<()> {
    let prefix = app_state.config.route_prefix.clone();

    let router = Router::new()
        .route(
            &format!("{}/{{resource_id}}", prefix),
            get(handle_check_lock)
                .post(handle_acquire_lock)
                .put(handle_refresh_lock)
                .delete(handle_release_lock),
        )
        .route(
            &format!("{}/{{resource_id}}/events", prefix),
            get(handle_lock_events),
        );

    // Fallback handler for 404
    let router = router.fallback(|| async {
        BackendError::handler(StatusCode::NOT_FOUND, "Not found")
    });

    router.layer(TraceLayer::new_for_http()).with_state(app_state)
}
