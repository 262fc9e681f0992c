//! WebSocket streaming API.
//!
//! Every connected client receives every broadcast event as a JSON text
//! frame `{"event": "<name>", "payload": ...}`. Delivery is at-most-once:
//! there is no replay, and a subscriber that falls more than the channel
//! capacity behind skips the events it missed.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use gofarm_common::AppResult;
use gofarm_core::{BroadcastEvent, EventPublisher};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::middleware::AppState;

const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Shared state for streaming.
#[derive(Clone)]
pub struct StreamingState {
    /// Broadcast sender feeding every WebSocket and SSE connection.
    tx: Arc<broadcast::Sender<BroadcastEvent>>,
}

impl StreamingState {
    /// Create a new streaming state.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a streaming state whose subscribers may lag `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx: Arc::new(tx) }
    }

    /// Register a new connection.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.tx.subscribe()
    }

    /// Number of currently connected clients.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for StreamingState {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EventPublisher for StreamingState {
    async fn publish(&self, event: BroadcastEvent) -> AppResult<()> {
        let name = event.name();
        match self.tx.send(event) {
            Ok(receivers) => debug!(event = name, receivers, "Broadcast event"),
            // No one is connected; nothing to deliver.
            Err(_) => debug!(event = name, "Broadcast event with no connected clients"),
        }
        Ok(())
    }
}

/// Serialize an event as a text frame.
pub(crate) fn encode_event(event: &BroadcastEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!(error = %e, event = event.name(), "Failed to serialize broadcast event");
            None
        }
    }
}

/// WebSocket handler for streaming.
pub async fn streaming_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    info!("New streaming connection");

    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.streaming.subscribe();

    info!(
        connections = state.streaming.connection_count(),
        "Streaming connection established"
    );

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Client closed connection");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    // The channel is server-to-client only.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            event = events.recv() => {
                match event {
                    Ok(event) => {
                        let Some(json) = encode_event(&event) else {
                            continue;
                        };
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Streaming connection lagged; events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    info!("Streaming connection closed");
}
