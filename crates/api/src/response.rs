//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gofarm_core::ProductView;
use serde::Serialize;

/// Single product envelope: `{"success": true, "product": {...}}`.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: ProductView,
}

impl ProductResponse {
    /// Create a success response.
    #[must_use]
    pub const fn ok(product: ProductView) -> Self {
        Self {
            success: true,
            product,
        }
    }
}

impl IntoResponse for ProductResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Product list envelope: `{"success": true, "count": n, "products": [...]}`.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub count: usize,
    pub products: Vec<ProductView>,
}

impl ProductListResponse {
    /// Create a success response.
    #[must_use]
    pub fn ok(products: Vec<ProductView>) -> Self {
        Self {
            success: true,
            count: products.len(),
            products,
        }
    }
}

impl IntoResponse for ProductListResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Bare success acknowledgement: `{"success": true}`.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl IntoResponse for SuccessResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Success acknowledgement.
#[must_use]
pub const fn ok() -> SuccessResponse {
    SuccessResponse { success: true }
}

/// Wrap a response body with `201 Created`.
pub fn created<T: IntoResponse>(body: T) -> Response {
    (StatusCode::CREATED, body).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_envelope() {
        let value = serde_json::to_value(ProductListResponse::ok(Vec::new())).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "success": true, "count": 0, "products": [] })
        );
    }

    #[test]
    fn test_created_status() {
        let response = created(ok());
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
