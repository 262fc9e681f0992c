//! Crop endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Response,
    routing::get,
};
use gofarm_common::AppResult;
use gofarm_core::{CreateCropInput, CropView, UpdateCropInput};
use gofarm_db::entities::CropStatus;
use serde::Deserialize;

use crate::{
    extractors::{AppJson, AuthUser},
    middleware::AppState,
    response::{SuccessResponse, created, ok},
};

#[derive(Debug, Deserialize)]
pub struct ListCropsQuery {
    pub status: Option<CropStatus>,
    pub category: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListCropsQuery>,
) -> AppResult<Json<Vec<CropView>>> {
    let crops = state
        .crop_service
        .list(query.status, query.category.as_deref())
        .await?;
    Ok(Json(crops))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCropInput>,
) -> AppResult<Response> {
    let crop = state.crop_service.create(&user.id, input).await?;
    Ok(created(Json(crop)))
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<CropView>> {
    Ok(Json(state.crop_service.get(&id).await?))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(input): AppJson<UpdateCropInput>,
) -> AppResult<Json<CropView>> {
    Ok(Json(state.crop_service.update(&id, &user.id, input).await?))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<SuccessResponse> {
    state.crop_service.delete(&id, &user.id).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(delete))
}
