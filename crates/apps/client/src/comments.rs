//! Comment thread under the detail panel.

use posts::{Comment, PostId};
use store::{PostStore, ValidationError};
use tracing::{info, warn};

use crate::error::ClientError;

/// Blocking notice shown when a comment could not be stored.
pub const COMMENT_FAILED_NOTICE: &str = "Failed to post comment. Please try again.";

#[derive(Debug, Clone)]
pub struct CommentThread {
    post_id: PostId,
    comments: Vec<Comment>,
    draft: String,
    notice: Option<String>,
}

impl CommentThread {
    pub fn new(post_id: PostId) -> Self {
        Self {
            post_id,
            comments: Vec::new(),
            draft: String::new(),
            notice: None,
        }
    }

    pub fn post_id(&self) -> &PostId {
        &self.post_id
    }

    /// Newest first.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Sets the list from a fetch made elsewhere.
    pub fn replace(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
    }

    /// Replaces the list with the stored comments. On failure the old list stays.
    pub async fn load(&mut self, store: &dyn PostStore) -> Result<(), ClientError> {
        match store.fetch_comments(self.post_id.clone()).await {
            Ok(comments) => {
                self.replace(comments);
                Ok(())
            }
            Err(e) => {
                warn!(post = %self.post_id, error = %e, "failed to fetch comments");
                Err(ClientError::Fetch(e))
            }
        }
    }

    /// Posts the trimmed draft, then reloads the thread.
    pub async fn submit(&mut self, store: &dyn PostStore) -> Result<(), ClientError> {
        let text = self.draft.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::EmptyText.into());
        }

        if let Err(e) = store.create_comment(self.post_id.clone(), text).await {
            warn!(post = %self.post_id, error = %e, "failed to post comment");
            self.notice = Some(COMMENT_FAILED_NOTICE.to_string());
            return Err(ClientError::Mutation(e));
        }
        info!(post = %self.post_id, "comment posted");
        self.draft.clear();

        // The comment is stored either way; a failed reload only leaves the list stale.
        let _ = self.load(store).await;
        Ok(())
    }
}
