//! Event publisher service.
//!
//! Provides an abstraction for broadcasting real-time events to every
//! connected client. The production implementation lives in the API crate
//! (a tokio broadcast channel feeding WebSocket and SSE connections).

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use gofarm_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use super::view::{CommentView, PostView, ProductView};

/// Events pushed to connected clients.
///
/// Serialized as `{"event": "<name>", "payload": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum BroadcastEvent {
    /// A post was created.
    NewPost(PostView),
    /// A post's like set changed.
    PostLiked {
        #[serde(rename = "postId")]
        post_id: String,
        likes: Vec<String>,
    },
    /// A comment was appended to a post.
    PostCommented {
        #[serde(rename = "postId")]
        post_id: String,
        comments: Vec<CommentView>,
    },
    /// A product was listed.
    ProductAdded(ProductView),
    /// A product's fields or reviews changed.
    ProductUpdated(ProductView),
    /// A product was removed; the payload is its ID.
    ProductDeleted(String),
}

impl BroadcastEvent {
    /// Wire name of the event.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewPost(_) => "newPost",
            Self::PostLiked { .. } => "postLiked",
            Self::PostCommented { .. } => "postCommented",
            Self::ProductAdded(_) => "productAdded",
            Self::ProductUpdated(_) => "productUpdated",
            Self::ProductDeleted(_) => "productDeleted",
        }
    }
}

/// Trait for publishing real-time events.
///
/// This allows the core services to publish events
/// without directly depending on the transport.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver an event to every currently connected client.
    async fn publish(&self, event: BroadcastEvent) -> AppResult<()>;
}

/// Wrapper for boxed EventPublisher trait object.
pub type EventPublisherService = Arc<dyn EventPublisher>;

/// Publish without surfacing failures; the mutation has already succeeded.
pub(crate) async fn publish_quietly(
    publisher: Option<&EventPublisherService>,
    event: BroadcastEvent,
) {
    let Some(publisher) = publisher else {
        return;
    };
    let name = event.name();
    if let Err(e) = publisher.publish(event).await {
        tracing::warn!(error = %e, event = name, "Failed to publish event");
    }
}

/// Records every published event in memory.
#[derive(Clone, Default)]
pub struct RecordingEventPublisher {
    events: Arc<Mutex<Vec<BroadcastEvent>>>,
    fail: bool,
}

impl RecordingEventPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record events but report every publish as failed.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Events published so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<BroadcastEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wire names of the events published so far.
    #[must_use]
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events().iter().map(BroadcastEvent::name).collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: BroadcastEvent) -> AppResult<()> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        if self.fail {
            return Err(AppError::Internal("No subscribers reachable".to_string()));
        }
        Ok(())
    }
}
