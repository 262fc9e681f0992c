//! Post service.

use chrono::Utc;
use gofarm_common::{AppError, AppResult, IdGenerator};
use gofarm_db::{
    entities::{Comment, embedded::encode_list, post},
    repositories::{PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::event_publisher::{BroadcastEvent, EventPublisherService, publish_quietly};
use super::upload::{Attachment, AttachmentKind, UploadResolver, check_limit};
use super::view::{Authors, PostView, post_user_ids};

/// Maximum number of images attached to a post.
pub const MAX_POST_IMAGES: usize = 4;

/// Maximum size of a single post image.
pub const MAX_POST_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_LIST_LIMIT: u64 = 20;
const MAX_LIST_LIMIT: u64 = 100;

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(max = 5000))]
    pub content: String,
}

/// Input for commenting on a post.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentInput {
    #[validate(length(max = 1000))]
    pub text: String,
}

/// Add `user_id` to `likes` if absent, otherwise remove it.
///
/// Returns whether the user likes the post afterwards.
pub fn toggle_membership(likes: &mut Vec<String>, user_id: &str) -> bool {
    if let Some(pos) = likes.iter().position(|id| id == user_id) {
        likes.remove(pos);
        false
    } else {
        likes.push(user_id.to_string());
        true
    }
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    uploads: UploadResolver,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        uploads: UploadResolver,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            uploads,
            event_publisher: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    async fn view(&self, post: &post::Model) -> AppResult<PostView> {
        let authors = Authors::load(&self.user_repo, post_user_ids(post)).await?;
        Ok(PostView::build(post, &authors))
    }

    /// View of a post that is already persisted. Never fails, so the
    /// mutation is still reported and broadcast.
    async fn committed_view(&self, post: &post::Model) -> PostView {
        let authors = Authors::load_or_unknown(&self.user_repo, post_user_ids(post)).await;
        PostView::build(post, &authors)
    }

    /// Create a post with optional images.
    pub async fn create(
        &self,
        author_id: &str,
        input: CreatePostInput,
        attachments: Vec<Attachment>,
    ) -> AppResult<PostView> {
        input.validate()?;
        let content = input.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Post content is required".to_string()));
        }

        check_limit("images", MAX_POST_IMAGES, attachments.len())?;
        if attachments.iter().any(|a| a.kind != AttachmentKind::Image) {
            return Err(AppError::Validation(
                "Posts only accept image attachments".to_string(),
            ));
        }

        let images = self
            .uploads
            .resolve(author_id, "posts", &attachments, MAX_POST_IMAGE_BYTES)
            .await?;

        let now = Utc::now();
        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(author_id.to_string()),
            content: Set(content.to_string()),
            images: Set(encode_list(&images)),
            likes: Set(encode_list::<String>(&[])),
            comments: Set(encode_list::<Comment>(&[])),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = match self.post_repo.create(model).await {
            Ok(created) => created,
            Err(e) => {
                self.uploads.release(&images).await;
                return Err(e);
            }
        };

        tracing::info!(post_id = %created.id, author_id = %author_id, images = images.len(), "Created post");

        let view = self.committed_view(&created).await;
        publish_quietly(
            self.event_publisher.as_ref(),
            BroadcastEvent::NewPost(view.clone()),
        )
        .await;

        Ok(view)
    }

    /// Get a post by ID.
    pub async fn get(&self, post_id: &str) -> AppResult<PostView> {
        let post = self.post_repo.get_by_id(post_id).await?;
        self.view(&post).await
    }

    /// List posts, newest first.
    pub async fn list(&self, limit: Option<u64>, until_id: Option<&str>) -> AppResult<Vec<PostView>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let posts = self.post_repo.find_recent(limit, until_id).await?;

        let authors = Authors::load(&self.user_repo, posts.iter().flat_map(post_user_ids)).await?;
        Ok(posts.iter().map(|p| PostView::build(p, &authors)).collect())
    }

    /// Like the post if the user hasn't, unlike it if they have.
    pub async fn toggle_like(&self, post_id: &str, user_id: &str) -> AppResult<PostView> {
        let post = self.post_repo.get_by_id(post_id).await?;

        let mut likes = post.like_list();
        let liked = toggle_membership(&mut likes, user_id);

        let mut active: post::ActiveModel = post.into();
        active.likes = Set(encode_list(&likes));
        active.updated_at = Set(Utc::now().into());
        let updated = self.post_repo.update(active).await?;

        tracing::debug!(post_id = %post_id, user_id = %user_id, liked, "Toggled like");

        let view = self.committed_view(&updated).await;
        publish_quietly(
            self.event_publisher.as_ref(),
            BroadcastEvent::PostLiked {
                post_id: view.id.clone(),
                likes: view.likes.clone(),
            },
        )
        .await;

        Ok(view)
    }

    /// Append a comment to a post.
    pub async fn add_comment(
        &self,
        post_id: &str,
        user_id: &str,
        input: AddCommentInput,
    ) -> AppResult<PostView> {
        input.validate()?;
        let text = input.text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Comment text is required".to_string()));
        }

        let comment = Comment {
            user: user_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };

        if !self.post_repo.append_comment(post_id, &comment).await? {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }

        let post = self.post_repo.get_by_id(post_id).await?;
        let view = self.committed_view(&post).await;

        tracing::debug!(post_id = %post_id, user_id = %user_id, comments = view.comments.len(), "Added comment");

        publish_quietly(
            self.event_publisher.as_ref(),
            BroadcastEvent::PostCommented {
                post_id: view.id.clone(),
                comments: view.comments.clone(),
            },
        )
        .await;

        Ok(view)
    }
}
