//! Error types for the client crate.

use thiserror::Error;

/// Client result type.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A frame was not a known broadcast event.
    #[error("Malformed event frame: {0}")]
    Decode(#[from] serde_json::Error),
}
