//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Multipart, Request, rejection::JsonRejection},
    http::request::Parts,
};
use bytes::Bytes;
use gofarm_common::{AppError, AppResult};
use gofarm_core::{Attachment, AttachmentKind};
use gofarm_db::entities::user;
use std::collections::HashMap;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get user from request extensions (set by auth middleware)
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// JSON body extractor that rejects with the API error envelope.
///
/// A well-formed body that does not fit the target type is a validation
/// error; anything else wrong with the body is a bad request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        Ok(Self(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(e) => AppError::Validation(e.body_text()),
        other => AppError::BadRequest(other.body_text()),
    }
}

/// A multipart form split into text fields and file attachments.
///
/// File fields named `images` and `videos` become attachments of the
/// matching kind, in the order they were sent. Other file fields are
/// rejected. A repeated text field keeps its last value.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    pub attachments: Vec<Attachment>,
}

impl MultipartForm {
    /// Drain a multipart body.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if let Some(file_name) = field.file_name().map(ToString::to_string) {
                let kind = match name.as_str() {
                    "images" => AttachmentKind::Image,
                    "videos" => AttachmentKind::Video,
                    other => {
                        return Err(AppError::BadRequest(format!(
                            "Unexpected file field: {other}"
                        )));
                    }
                };
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data: Bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;

                form.attachments.push(Attachment {
                    kind,
                    file_name,
                    content_type,
                    data,
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read field: {e}")))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Text value of a field, if sent.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Text value of a field, treating blank input as absent.
    #[must_use]
    pub fn non_empty(&self, name: &str) -> Option<String> {
        self.text(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Rating {
        rating: u8,
    }

    fn json_request(content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_app_json_maps_rejections() {
        let out_of_range = AppJson::<Rating>::from_request(
            json_request("application/json", r#"{"rating":-1}"#),
            &(),
        )
        .await;
        assert!(matches!(out_of_range, Err(AppError::Validation(_))));

        let malformed =
            AppJson::<Rating>::from_request(json_request("application/json", "{"), &()).await;
        assert!(matches!(malformed, Err(AppError::BadRequest(_))));

        let wrong_type =
            AppJson::<Rating>::from_request(json_request("text/plain", r#"{"rating":4}"#), &())
                .await;
        assert!(matches!(wrong_type, Err(AppError::BadRequest(_))));

        let ok = AppJson::<Rating>::from_request(
            json_request("application/json", r#"{"rating":4}"#),
            &(),
        )
        .await;
        assert!(matches!(ok, Ok(AppJson(Rating { rating: 4 }))));
    }
}
