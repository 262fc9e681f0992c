//! Values embedded in JSONB columns.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::Json;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A stored attachment.
///
/// `filename` is the storage key; it is what gets released when the owning
/// entity goes away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMedia {
    pub url: String,
    pub filename: String,
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Commenting user ID
    pub user: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Reviewing user ID
    pub user: String,
    /// 1 to 5
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Decode a JSONB array column, treating malformed content as empty.
pub fn decode_list<T: DeserializeOwned>(value: &Json) -> Vec<T> {
    if value.is_null() {
        return Vec::new();
    }
    serde_json::from_value(value.clone()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Malformed JSON list column, treating as empty");
        Vec::new()
    })
}

/// Encode a list for a JSONB column.
pub fn encode_list<T: Serialize>(items: &[T]) -> Json {
    serde_json::to_value(items).unwrap_or_else(|_| Json::Array(Vec::new()))
}
