//! API endpoints.

mod crops;
mod health;
mod posts;
mod products;

use axum::Router;

use crate::middleware::AppState;
use crate::sse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/health", health::router())
        .nest("/posts", posts::router())
        .nest("/products", products::router())
        .nest("/crops", crops::router())
        .nest("/streaming", sse::router())
}
