//! SSE call status stream handler.

use crate::AppState;
use axum::{
    extract::Extension,
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
};
use dialtone_types::CallStatusEvent;
use futures_util::Stream;
use std::{convert::Infallible, sync::Arc};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Handler for `GET /events/calls`.
///
/// Streams every call status transition as a `call_status` event whose data
/// is `{"call_id": ..., "status": ...}`.
pub async fn call_status_stream_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.events.subscribe());

    let mapped_stream = stream.filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(data) => Some(Ok(Event::default()
                .event(CallStatusEvent::EVENT_NAME)
                .data(data))),
            Err(e) => {
                tracing::error!("failed to serialize call status event: {}", e);
                None
            }
        },
        Err(broadcast_error) => {
            tracing::warn!(
                error = %broadcast_error,
                "call status SSE stream lagged; events were dropped for this subscriber"
            );
            None
        }
    });

    Sse::new(mapped_stream).keep_alive(KeepAlive::default())
}
