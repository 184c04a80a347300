use thiserror::Error;

/// Failure of a remote call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid store configuration: {0}")]
    Config(String),
}

/// Input rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("text must not be empty")]
    EmptyText,
    #[error("please provide both text and an image")]
    MissingImage,
    #[error("image size should be less than 5MB (got {size} bytes)")]
    ImageTooLarge { size: usize },
    #[error("please upload a valid image file (JPEG, PNG, or GIF), got {content_type:?}")]
    UnsupportedImageType { content_type: String },
}
