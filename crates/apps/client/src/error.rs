use store::{StoreError, ValidationError};
use thiserror::Error;

/// Everything that can go wrong in a session, by how it is handled.
///
/// None of these end the session. Fetch and mutation failures are logged at
/// the call site; validation failures are shown before any request is made.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("fetch failed: {0}")]
    Fetch(#[source] StoreError),
    #[error("mutation failed: {0}")]
    Mutation(#[source] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no post is selected")]
    NoSelection,
    #[error("location unavailable: {0}")]
    Geolocation(String),
    #[error("configuration: {0}")]
    Config(String),
    #[error("line {line}: {message}")]
    Script { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

