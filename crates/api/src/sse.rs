//! Server-Sent Events (SSE) for real-time updates.
//!
//! Carries the same broadcast events as the WebSocket channel, one SSE
//! message per event, named after the event.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::stream::{self, Stream};
use gofarm_core::BroadcastEvent;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};

use crate::middleware::AppState;
use crate::streaming::encode_event;

fn to_sse(event: &BroadcastEvent) -> Option<Event> {
    encode_event(event).map(|json| Event::default().event(event.name()).data(json))
}

/// Broadcast event SSE stream.
async fn broadcast_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.streaming.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => to_sse(&event).map(Ok),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE connection lagged; events dropped");
            None
        }
    });

    // Add initial connected event
    let initial = stream::once(async { Ok(Event::default().event("connected").data("{}")) });

    Sse::new(initial.chain(stream)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

/// Create SSE router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(broadcast_stream))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_event_converts() {
        let events = [
            BroadcastEvent::ProductDeleted("p1".to_string()),
            BroadcastEvent::PostLiked {
                post_id: "post1".to_string(),
                likes: vec![],
            },
        ];
        for event in &events {
            assert!(to_sse(event).is_some());
        }
    }
}
