/**
 * Lock Event Subscription Handler
 *
 * Server-Sent Events stream for `GET /{prefix}/{resource_id}/events`. It
 * lets an editor watch a section instead of polling `GET`: every lock
 * change published by `LockService` for that resource is sent as one event.
 *
 * # Example Response
 *
 * ```http
 * HTTP/1.1 200 OK
 * Content-Type: text/event-stream
 *
 * event: acquired
 * data: {"resourceId":"sectionX","kind":"acquired","lockStatus":{...},"timestamp":"..."}
 *
 * event: released
 * data: {"resourceId":"sectionX","kind":"released","lockStatus":{"isLocked":false,"canOverride":false},"timestamp":"..."}
 * ```
 *
 * # Connection Management
 *
 * - Connections are kept alive using the SSE keep-alive mechanism
 * - Lagged receivers skip ahead; the next `GET` gives the current state
 *
 * # Scope
 *
 * Only changes made through this process's `LockService` are streamed.
 * When several server processes share one PostgreSQL store, a change made
 * through another process produces no event here; `GET` remains the source
 * of truth for the current state.
 */

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use tokio::sync::broadcast::error::RecvError;

use crate::backend::locks::service::LockService;

/// Handle lock event subscription (GET /{prefix}/{resource_id}/events)
pub async fn handle_lock_events(
    State(locks): State<Arc<LockService>>,
    Path(resource_id): Path<String>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>> {
    tracing::info!("[Locks] Event subscription opened for {}", resource_id);

    let receiver = locks.subscribe();

    let stream = stream::unfold(
        (receiver, resource_id),
        |(mut rx, resource_id)| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if event.resource_id != resource_id {
                            continue;
                        }

                        let data = match serde_json::to_string(&event) {
                            Ok(data) => data,
                            Err(e) => {
                                tracing::error!("[Locks] Failed to serialize event: {:?}", e);
                                continue;
                            }
                        };

                        let sse_event = Event::default().event(event.kind.as_str()).data(data);
                        return Some((Ok(sse_event), (rx, resource_id)));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "[Locks] Subscriber for {} lagged, skipped {} events",
                            resource_id,
                            skipped
                        );
                        continue;
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("[Locks] Event channel closed, ending stream");
                        return None;
                    }
                }
            }
        },
    );

    Sse::new(stream).keep_alive(KeepAlive::default())
}
