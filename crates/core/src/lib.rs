//! Core business logic for gofarm-rs.
//!
//! Services here validate and persist post, product and crop mutations,
//! resolve uploaded attachments, and hand every successful post/product
//! mutation to an [`EventPublisher`] for fan-out.

pub mod services;

pub use services::*;
