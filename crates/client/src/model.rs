//! Wire representation of entities as the server sends them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::Identified;

/// A referenced user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub user: Author,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author: Author,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Whether the given user has liked this post.
    #[must_use]
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user: Author,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub seller: Author,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Product {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_decodes_server_shape() {
        let post: Post = serde_json::from_value(json!({
            "id": "post1",
            "author": { "id": "a", "name": "Ravi", "role": "farmer", "avatarUrl": null },
            "content": "Rain finally",
            "images": ["/uploads/posts/a/x.png"],
            "likes": ["b"],
            "comments": [{
                "user": { "id": "b", "name": "Meena", "role": "consumer", "avatarUrl": null },
                "text": "Good news",
                "createdAt": "2025-03-01T10:00:00Z"
            }],
            "createdAt": "2025-03-01T09:00:00Z",
            "updatedAt": "2025-03-01T10:00:00Z"
        }))
        .unwrap();

        assert!(post.is_liked_by("b"));
        assert!(!post.is_liked_by("a"));
        assert_eq!(post.comments[0].user.name, "Meena");
    }

    #[test]
    fn test_product_tolerates_missing_lists() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1",
            "seller": { "id": "a", "name": "Ravi" },
            "name": "Tomatoes",
            "price": 50,
            "createdAt": "2025-03-01T09:00:00Z",
            "updatedAt": "2025-03-01T09:00:00Z"
        }))
        .unwrap();

        assert!(product.images.is_empty());
        assert!(product.reviews.is_empty());
        assert_eq!(product.rating, 0.0);
    }
}
