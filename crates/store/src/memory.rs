use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::Utc;
use posts::{Comment, CommentId, NewPost, Post, PostId, by_popularity};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::source::{BoxFuture, PostStore};

/// Store operations, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FetchTopPosts,
    UpdateViews,
    FetchComments,
    CreateComment,
    CreatePost,
    UploadImage,
}

#[derive(Default)]
struct State {
    posts: Vec<Post>,
    comments: Vec<Comment>,
    objects: HashMap<String, Vec<u8>>,
    failing: HashSet<Op>,
    view_writes: Vec<(PostId, u64)>,
}

/// In-memory store for tests, demos and replays.
///
/// Behaves like the hosted service: top posts come back views-descending,
/// comments newest-first, and a view write returns the stored row.
pub struct MemoryStore {
    state: RwLock<State>,
    latency: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MemoryStore {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            state: RwLock::new(State {
                posts,
                ..State::default()
            }),
            latency: Duration::ZERO,
        }
    }

    /// Delays every call by `latency` before touching state.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Makes every subsequent `op` fail with [`StoreError::Unavailable`].
    pub async fn fail(&self, op: Op) {
        self.state.write().await.failing.insert(op);
    }

    pub async fn recover(&self, op: Op) {
        self.state.write().await.failing.remove(&op);
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.state.read().await.posts.clone()
    }

    pub async fn comments(&self) -> Vec<Comment> {
        self.state.read().await.comments.clone()
    }

    pub async fn object(&self, file_name: &str) -> Option<Vec<u8>> {
        self.state.read().await.objects.get(file_name).cloned()
    }

    /// Every view write received, in arrival order.
    pub async fn view_writes(&self) -> Vec<(PostId, u64)> {
        self.state.read().await.view_writes.clone()
    }

    async fn enter(&self, op: Op) -> Result<(), StoreError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.state.read().await.failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} disabled")));
        }
        Ok(())
    }
}

impl PostStore for MemoryStore {
    fn fetch_top_posts(&self, limit: usize) -> BoxFuture<'_, Result<Vec<Post>, StoreError>> {
        Box::pin(async move {
            self.enter(Op::FetchTopPosts).await?;
            let mut posts = self.state.read().await.posts.clone();
            posts.sort_by(by_popularity);
            posts.truncate(limit);
            Ok(posts)
        })
    }

    fn update_post_views(
        &self,
        id: PostId,
        views: u64,
    ) -> BoxFuture<'_, Result<Post, StoreError>> {
        Box::pin(async move {
            self.enter(Op::UpdateViews).await?;
            let mut state = self.state.write().await;
            state.view_writes.push((id.clone(), views));
            let post = state
                .posts
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| StoreError::NotFound {
                    what: "post",
                    id: id.to_string(),
                })?;
            post.views = views;
            Ok(post.clone())
        })
    }

    fn fetch_comments(&self, post_id: PostId) -> BoxFuture<'_, Result<Vec<Comment>, StoreError>> {
        Box::pin(async move {
            self.enter(Op::FetchComments).await?;
            let mut out: Vec<Comment> = self
                .state
                .read()
                .await
                .comments
                .iter()
                .filter(|c| c.post_id == post_id)
                .cloned()
                .collect();
            out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(out)
        })
    }

    fn create_comment(
        &self,
        post_id: PostId,
        text: String,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            self.enter(Op::CreateComment).await?;
            let mut state = self.state.write().await;
            if !state.posts.iter().any(|p| p.id == post_id) {
                return Err(StoreError::NotFound {
                    what: "post",
                    id: post_id.to_string(),
                });
            }
            state.comments.push(Comment {
                id: CommentId(uuid::Uuid::new_v4().to_string()),
                created_at: Utc::now(),
                post_id,
                text,
                user_id: None,
            });
            Ok(())
        })
    }

    fn create_post(&self, post: NewPost) -> BoxFuture<'_, Result<Post, StoreError>> {
        Box::pin(async move {
            self.enter(Op::CreatePost).await?;
            let created = Post {
                id: PostId(uuid::Uuid::new_v4().to_string()),
                created_at: Utc::now(),
                latitude: post.latitude,
                longitude: post.longitude,
                image_url: post.image_url,
                text: post.text,
                views: post.views,
                owner_id: None,
            };
            self.state.write().await.posts.push(created.clone());
            Ok(created)
        })
    }

    fn upload_image(
        &self,
        bytes: Vec<u8>,
        file_name: String,
        _content_type: String,
    ) -> BoxFuture<'_, Result<String, StoreError>> {
        Box::pin(async move {
            self.enter(Op::UploadImage).await?;
            let url = format!("memory://post-images/{file_name}");
            self.state.write().await.objects.insert(file_name, bytes);
            Ok(url)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryStore, Op};
    use crate::error::StoreError;
    use crate::source::PostStore;
    use chrono::{TimeZone, Utc};
    use posts::{Post, PostId};

    fn post(id: &str, views: u64) -> Post {
        Post {
            id: PostId::new(id),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            latitude: 37.5,
            longitude: 127.0,
            image_url: String::new(),
            text: id.to_string(),
            views,
            owner_id: None,
        }
    }

    #[tokio::test]
    async fn top_posts_are_ranked_and_limited() {
        let store = MemoryStore::new(vec![post("a", 1), post("b", 9), post("c", 5)]);
        let top = store.fetch_top_posts(2).await.unwrap();
        let ids: Vec<_> = top.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn view_write_returns_stored_row() {
        let store = MemoryStore::new(vec![post("a", 1)]);
        let updated = store.update_post_views(PostId::new("a"), 2).await.unwrap();
        assert_eq!(updated.views, 2);
        assert_eq!(store.view_writes().await, vec![(PostId::new("a"), 2)]);

        let missing = store.update_post_views(PostId::new("zz"), 1).await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn injected_failure_and_recovery() {
        let store = MemoryStore::new(vec![post("a", 1)]);
        store.fail(Op::FetchTopPosts).await;
        assert!(matches!(
            store.fetch_top_posts(15).await,
            Err(StoreError::Unavailable(_))
        ));
        store.recover(Op::FetchTopPosts).await;
        assert_eq!(store.fetch_top_posts(15).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn comments_round_trip_newest_first() {
        let store = MemoryStore::new(vec![post("a", 0)]);
        store
            .create_comment(PostId::new("a"), "first".into())
            .await
            .unwrap();
        store
            .create_comment(PostId::new("a"), "second".into())
            .await
            .unwrap();
        let comments = store.fetch_comments(PostId::new("a")).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert!(comments[0].created_at >= comments[1].created_at);

        let orphan = store.create_comment(PostId::new("nope"), "x".into()).await;
        assert!(orphan.is_err());
    }
}
