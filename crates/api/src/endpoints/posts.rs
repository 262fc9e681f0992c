//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    response::Response,
    routing::{get, post},
};
use gofarm_common::AppResult;
use gofarm_core::{AddCommentInput, CreatePostInput, PostView};
use serde::Deserialize;

use crate::{
    extractors::{AppJson, AuthUser, MultipartForm},
    middleware::AppState,
    response::created,
};

/// Timeline query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    pub limit: Option<u64>,
    pub until_id: Option<String>,
}

/// Create a post from a multipart form with `content` and up to four
/// `images` files.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = MultipartForm::read(multipart).await?;
    let input = CreatePostInput {
        content: form.text("content").unwrap_or_default().to_string(),
    };

    let post = state
        .post_service
        .create(&user.id, input, form.attachments)
        .await?;

    Ok(created(Json(post)))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<Json<Vec<PostView>>> {
    let posts = state
        .post_service
        .list(query.limit, query.until_id.as_deref())
        .await?;
    Ok(Json(posts))
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<PostView>> {
    Ok(Json(state.post_service.get(&id).await?))
}

async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostView>> {
    Ok(Json(state.post_service.toggle_like(&id, &user.id).await?))
}

async fn comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(input): AppJson<AddCommentInput>,
) -> AppResult<Json<PostView>> {
    Ok(Json(
        state.post_service.add_comment(&id, &user.id, input).await?,
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
        .route("/{id}/like", post(like))
        .route("/{id}/comment", post(comment))
}
