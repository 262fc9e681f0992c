//! Post repository.

use std::sync::Arc;

use crate::entities::{Comment, Post, post};
use chrono::Utc;
use gofarm_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get posts, newest first.
    pub async fn find_recent(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find().order_by_desc(post::Column::Id).limit(limit);

        if let Some(until) = until_id {
            query = query.filter(post::Column::Id.lt(until));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append a comment in a single UPDATE statement.
    ///
    /// Concurrent appends are linearized by the database; none is lost.
    /// Returns `false` when no post has the given ID.
    pub async fn append_comment(&self, post_id: &str, comment: &Comment) -> AppResult<bool> {
        let entry = serde_json::to_value([comment])
            .map_err(|e| AppError::Internal(format!("Failed to encode comment: {e}")))?;

        let result = Post::update_many()
            .col_expr(
                post::Column::Comments,
                Expr::cust_with_values("\"comments\" || ?", [entry]),
            )
            .col_expr(post::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};
    use serde_json::json;

    fn create_test_post(id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: "user1".to_string(),
            content: "First harvest of the season".to_string(),
            images: json!([]),
            likes: json!([]),
            comments: json!([]),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn comment(text: &str) -> Comment {
        Comment {
            user: "user2".to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_create_post() {
        let post = create_test_post("post1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let active = post::ActiveModel {
            id: Set("post1".to_string()),
            user_id: Set("user1".to_string()),
            content: Set("First harvest of the season".to_string()),
            ..Default::default()
        };

        let result = repo.create(active).await.unwrap();
        assert_eq!(result.id, "post1");
        assert!(result.like_list().is_empty());
    }

    #[tokio::test]
    async fn test_find_recent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("post2"), create_test_post("post1")]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_recent(10, None).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "post2");
    }

    #[tokio::test]
    async fn test_append_comment_reports_missing_post() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = PostRepository::new(db);

        assert!(repo.append_comment("post1", &comment("Looks great")).await.unwrap());
        assert!(!repo.append_comment("missing", &comment("Hello")).await.unwrap());
    }

    #[tokio::test]
    async fn test_append_comment_is_a_single_ordered_update() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostRepository::new(Arc::clone(&db));
        let entry = comment("Looks great");
        assert!(repo.append_comment("post1", &entry).await.unwrap());
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 1);
        let statements = log[0].statements();
        assert_eq!(statements.len(), 1);

        // Existing comments stay first; the new one goes on the end.
        let stmt = &statements[0];
        assert!(stmt.sql.starts_with(r#"UPDATE "post" SET "comments" = "comments" || $1"#));
        assert!(stmt.sql.ends_with(r#"WHERE "post"."id" = $3"#));

        let values = stmt.values.as_ref().unwrap();
        assert_eq!(
            values.0[0],
            sea_orm::Value::Json(Some(Box::new(json!([{
                "user": entry.user,
                "text": "Looks great",
                "createdAt": entry.created_at,
            }]))))
        );
    }
}
