//! Client-facing representations of posts and products.
//!
//! Views are what HTTP responses and broadcast payloads carry: media as URL
//! strings and user references resolved to author summaries.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use gofarm_common::AppResult;
use gofarm_db::{
    entities::{CropStatus, UserRole, crop, post, product, user},
    repositories::UserRepository,
};
use serde::{Deserialize, Serialize};

/// Display fields of a referenced user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: String,
    pub name: String,
    pub role: Option<UserRole>,
    pub avatar_url: Option<String>,
}

impl AuthorSummary {
    fn from_user(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            role: Some(user.role),
            avatar_url: user.avatar_url.clone(),
        }
    }

    /// Placeholder for a reference whose user no longer exists.
    fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "Unknown user".to_string(),
            role: None,
            avatar_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub user: AuthorSummary,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub author: AuthorSummary,
    pub content: String,
    /// Image URLs in attachment order
    pub images: Vec<String>,
    /// IDs of users who liked the post
    pub likes: Vec<String>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub user: AuthorSummary,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub seller: AuthorSummary,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: Option<String>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub reviews: Vec<ReviewView>,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropView {
    pub id: String,
    pub farmer: AuthorSummary,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub status: CropStatus,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Users referenced by a batch of entities, loaded in one query.
pub(crate) struct Authors {
    users: HashMap<String, user::Model>,
}

impl Authors {
    pub(crate) async fn load(
        user_repo: &UserRepository,
        ids: impl IntoIterator<Item = String>,
    ) -> AppResult<Self> {
        let ids: Vec<String> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let users = user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        Ok(Self { users })
    }

    /// Load for an entity that is already committed. A failed lookup
    /// degrades every reference to an unknown user instead of failing.
    pub(crate) async fn load_or_unknown(
        user_repo: &UserRepository,
        ids: impl IntoIterator<Item = String>,
    ) -> Self {
        match Self::load(user_repo, ids).await {
            Ok(authors) => authors,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load authors; using placeholders");
                Self {
                    users: HashMap::new(),
                }
            }
        }
    }

    fn summary(&self, id: &str) -> AuthorSummary {
        self.users
            .get(id)
            .map_or_else(|| AuthorSummary::unknown(id), AuthorSummary::from_user)
    }
}

/// IDs of every user a post view refers to.
pub(crate) fn post_user_ids(post: &post::Model) -> Vec<String> {
    std::iter::once(post.user_id.clone())
        .chain(post.comment_list().into_iter().map(|c| c.user))
        .collect()
}

/// IDs of every user a product view refers to.
pub(crate) fn product_user_ids(product: &product::Model) -> Vec<String> {
    std::iter::once(product.seller_id.clone())
        .chain(product.review_list().into_iter().map(|r| r.user))
        .collect()
}

impl PostView {
    pub(crate) fn build(post: &post::Model, authors: &Authors) -> Self {
        Self {
            id: post.id.clone(),
            author: authors.summary(&post.user_id),
            content: post.content.clone(),
            images: post.image_list().into_iter().map(|m| m.url).collect(),
            likes: post.like_list(),
            comments: post
                .comment_list()
                .into_iter()
                .map(|c| CommentView {
                    user: authors.summary(&c.user),
                    text: c.text,
                    created_at: c.created_at,
                })
                .collect(),
            created_at: post.created_at.with_timezone(&Utc),
            updated_at: post.updated_at.with_timezone(&Utc),
        }
    }
}

impl ProductView {
    pub(crate) fn build(product: &product::Model, authors: &Authors) -> Self {
        Self {
            id: product.id.clone(),
            seller: authors.summary(&product.seller_id),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            category: product.category.clone(),
            images: product.image_list().into_iter().map(|m| m.url).collect(),
            videos: product.video_list().into_iter().map(|m| m.url).collect(),
            reviews: product
                .review_list()
                .into_iter()
                .map(|r| ReviewView {
                    user: authors.summary(&r.user),
                    rating: r.rating,
                    comment: r.comment,
                    created_at: r.created_at,
                })
                .collect(),
            rating: product.rating,
            created_at: product.created_at.with_timezone(&Utc),
            updated_at: product.updated_at.with_timezone(&Utc),
        }
    }
}

impl CropView {
    pub(crate) fn build(crop: &crop::Model, authors: &Authors) -> Self {
        Self {
            id: crop.id.clone(),
            farmer: authors.summary(&crop.farmer_id),
            name: crop.name.clone(),
            description: crop.description.clone(),
            category: crop.category.clone(),
            status: crop.status,
            quantity: crop.quantity,
            unit: crop.unit.clone(),
            created_at: crop.created_at.with_timezone(&Utc),
            updated_at: crop.updated_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;

    fn user(id: &str, name: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{id}@example.com"),
            role: UserRole::Consumer,
            token: None,
            avatar_url: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_post_view_resolves_comment_authors() {
        let now = Utc::now();
        let post = post::Model {
            id: "post1".to_string(),
            user_id: "farmer".to_string(),
            content: "Rain finally".to_string(),
            images: json!([{ "url": "/uploads/a.png", "filename": "a.png" }]),
            likes: json!(["buyer"]),
            comments: json!([
                { "user": "buyer", "text": "Good news", "createdAt": now },
                { "user": "ghost", "text": "Hello", "createdAt": now }
            ]),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user("farmer", "Ravi"), user("buyer", "Meena")]])
                .into_connection(),
        );
        let authors = Authors::load(&UserRepository::new(db), post_user_ids(&post))
            .await
            .unwrap();

        let view = PostView::build(&post, &authors);
        assert_eq!(view.author.name, "Ravi");
        assert_eq!(view.images, vec!["/uploads/a.png".to_string()]);
        assert_eq!(view.likes, vec!["buyer".to_string()]);
        assert_eq!(view.comments[0].user.name, "Meena");
        assert_eq!(view.comments[1].user.name, "Unknown user");
        assert_eq!(view.comments[1].user.id, "ghost");
    }

    #[tokio::test]
    async fn test_failed_author_lookup_degrades_to_unknown() {
        let post = post::Model {
            id: "post1".to_string(),
            user_id: "farmer".to_string(),
            content: "Rain finally".to_string(),
            images: json!([]),
            likes: json!([]),
            comments: json!([]),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };

        // No result queued: the user query errors.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let authors = Authors::load_or_unknown(&UserRepository::new(db), post_user_ids(&post)).await;

        let view = PostView::build(&post, &authors);
        assert_eq!(view.author, AuthorSummary::unknown("farmer"));
    }

    #[test]
    fn test_product_view_wire_shape() {
        let view = ProductView {
            id: "p1".to_string(),
            seller: AuthorSummary::unknown("s1"),
            name: "Tomatoes".to_string(),
            description: None,
            price: 50.0,
            category: None,
            images: vec![],
            videos: vec![],
            reviews: vec![],
            rating: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["rating"], json!(0.0));
        assert_eq!(value["images"], json!([]));
        assert!(value.get("createdAt").is_some());
        assert!(value["seller"].get("avatarUrl").is_some());
    }
}
