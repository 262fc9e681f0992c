//! Broadcast events as received by a client.

use serde::{Deserialize, Serialize};

use crate::error::ClientResult;
use crate::model::{Comment, Post, Product};

/// A pushed frame: `{"event": "<name>", "payload": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum ServerEvent {
    NewPost(Post),
    PostLiked {
        #[serde(rename = "postId")]
        post_id: String,
        likes: Vec<String>,
    },
    PostCommented {
        #[serde(rename = "postId")]
        post_id: String,
        comments: Vec<Comment>,
    },
    ProductAdded(Product),
    ProductUpdated(Product),
    /// Payload is the deleted product's ID.
    ProductDeleted(String),
}

impl ServerEvent {
    /// Decode a text frame.
    pub fn from_json(frame: &str) -> ClientResult<Self> {
        Ok(serde_json::from_str(frame)?)
    }
}
