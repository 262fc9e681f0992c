//! Client-side state reconciliation for gofarm-rs.
//!
//! A client holds ordered lists of posts and products. Entities reach it
//! two ways: as the response to its own HTTP request, and as broadcast
//! events pushed over the WebSocket or SSE channel. This crate merges both
//! into the local lists by entity ID so that no entity is duplicated or
//! moved, and applying the same payload twice has the same effect as
//! applying it once.
//!
//! - [`model`]: wire representation of posts and products
//! - [`event`]: decoding of broadcast frames
//! - [`feed`]: an ordered list keyed by entity ID
//! - [`store`]: the client's mounted views and the merge policy

pub mod error;
pub mod event;
pub mod feed;
pub mod model;
pub mod store;

pub use error::{ClientError, ClientResult};
pub use event::ServerEvent;
pub use feed::{Feed, Identified};
pub use model::{Author, Comment, Post, Product, Review};
pub use store::{LocalState, Merge};
