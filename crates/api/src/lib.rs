//! HTTP API layer for gofarm-rs.
//!
//! This crate provides the REST API and real-time fan-out:
//!
//! - **Endpoints**: posts, products, crops and health under `/api`
//! - **Extractors**: bearer-token authentication, multipart attachments
//! - **Middleware**: token resolution into request extensions
//! - **Streaming**: WebSocket (`/socket`) and Server-Sent Events
//!   (`/api/streaming`) carrying every broadcast event
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod sse;
pub mod streaming;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
pub use streaming::{StreamingState, streaming_handler};
