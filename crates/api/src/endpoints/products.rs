//! Product endpoints.

use axum::{
    Router,
    extract::{Multipart, Path, Query, State},
    response::Response,
    routing::{get, post},
};
use gofarm_common::{AppError, AppResult};
use gofarm_core::{AddReviewInput, CreateProductInput, UpdateProductInput};
use gofarm_db::repositories::ProductFilter;
use serde::Deserialize;

use crate::{
    extractors::{AppJson, AuthUser, MultipartForm},
    middleware::AppState,
    response::{ProductListResponse, ProductResponse, SuccessResponse, created, ok},
};

/// Catalogue filter query.
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    /// Exact seller ID.
    pub seller: Option<String>,
    pub category: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

fn parse_price(raw: Option<&str>) -> AppResult<f64> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation("Price is required".to_string()))?;
    raw.parse::<f64>()
        .map_err(|_| AppError::Validation(format!("Invalid price: {raw}")))
}

/// Build the create input from multipart text fields.
fn create_input(form: &MultipartForm) -> AppResult<CreateProductInput> {
    Ok(CreateProductInput {
        name: form.text("name").unwrap_or_default().to_string(),
        description: form.non_empty("description"),
        price: parse_price(form.text("price"))?,
        category: form.non_empty("category"),
    })
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> AppResult<ProductListResponse> {
    let filter = ProductFilter {
        seller_id: query.seller.filter(|s| !s.is_empty()),
        category: query.category.filter(|c| !c.is_empty()),
    };
    let products = state.product_service.list(&filter, query.limit).await?;
    Ok(ProductListResponse::ok(products))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ProductListResponse> {
    let products = state.product_service.search(&query.q).await?;
    Ok(ProductListResponse::ok(products))
}

async fn show(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<ProductResponse> {
    Ok(ProductResponse::ok(state.product_service.get(&id).await?))
}

/// List a product from a multipart form with `name`, `price`, optional
/// `description`/`category`, and `images`/`videos` files.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = MultipartForm::read(multipart).await?;
    let input = create_input(&form)?;

    let product = state
        .product_service
        .create(&user.id, user.role, input, form.attachments)
        .await?;

    Ok(created(ProductResponse::ok(product)))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<UpdateProductInput>,
) -> AppResult<ProductResponse> {
    let product = state.product_service.update(&id, &user.id, patch).await?;
    Ok(ProductResponse::ok(product))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<SuccessResponse> {
    state.product_service.delete(&id, &user.id).await?;
    Ok(ok())
}

async fn review(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(input): AppJson<AddReviewInput>,
) -> AppResult<Response> {
    let product = state.product_service.add_review(&id, &user.id, input).await?;
    Ok(created(ProductResponse::ok(product)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/search", get(search))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/review", post(review))
}
