use std::future::Future;
use std::pin::Pin;

use posts::{Comment, NewPost, Post, PostId};

use crate::error::StoreError;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote persistence for posts, comments and images.
///
/// Implementations must be `Send + Sync` so one store can be shared by every
/// in-flight request. Methods return boxed futures for dyn-compatibility and
/// own their arguments, so a future only borrows the store itself.
pub trait PostStore: Send + Sync {
    /// Top `limit` posts, views descending.
    fn fetch_top_posts(&self, limit: usize) -> BoxFuture<'_, Result<Vec<Post>, StoreError>>;

    /// Writes `views` for the post with `id` and returns the stored row.
    fn update_post_views(&self, id: PostId, views: u64)
        -> BoxFuture<'_, Result<Post, StoreError>>;

    /// Comments on `post_id`, newest first.
    fn fetch_comments(&self, post_id: PostId) -> BoxFuture<'_, Result<Vec<Comment>, StoreError>>;

    fn create_comment(&self, post_id: PostId, text: String)
        -> BoxFuture<'_, Result<(), StoreError>>;

    fn create_post(&self, post: NewPost) -> BoxFuture<'_, Result<Post, StoreError>>;

    /// Stores image bytes under `file_name` and returns the public URL.
    fn upload_image(
        &self,
        bytes: Vec<u8>,
        file_name: String,
        content_type: String,
    ) -> BoxFuture<'_, Result<String, StoreError>>;
}
