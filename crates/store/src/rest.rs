//! REST client for the hosted persistence service.
//!
//! Rows live behind a PostgREST-style API (`/rest/v1/<table>`) and images in
//! an object bucket (`/storage/v1/object/<bucket>/<name>`). Every request
//! carries the anon key both as `apikey` and as a bearer token.

use posts::{Comment, NewComment, NewPost, Post, PostId, ViewsPatch};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::StoreError;
use crate::source::{BoxFuture, PostStore};

pub const DEFAULT_BUCKET: &str = "post-images";

#[derive(Debug)]
pub struct RestStore {
    base_url: String,
    bucket: String,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: &str,
        bucket: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(StoreError::Config("store URL is empty".to_string()));
        }
        if api_key.trim().is_empty() {
            return Err(StoreError::Config("store API key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|e| StoreError::Config(format!("API key is not a valid header: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| StoreError::Config(format!("API key is not a valid header: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url,
            bucket: bucket.into(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn object_url(&self, file_name: &str) -> String {
        format!("{}/storage/v1/object/{}/{file_name}", self.base_url, self.bucket)
    }

    /// Public URL for an object in the post-images bucket.
    pub fn public_url(&self, file_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{file_name}",
            self.base_url, self.bucket
        )
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, StoreError> {
    let resp = check(resp).await?;
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// `return=representation` answers with an array; exactly one row is expected.
fn single_row(rows: Vec<Post>, id: &str) -> Result<Post, StoreError> {
    rows.into_iter().next().ok_or_else(|| StoreError::NotFound {
        what: "post",
        id: id.to_string(),
    })
}

impl PostStore for RestStore {
    fn fetch_top_posts(&self, limit: usize) -> BoxFuture<'_, Result<Vec<Post>, StoreError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.table_url("posts"))
                .query(&[
                    ("select", "*".to_string()),
                    ("order", "views.desc".to_string()),
                    ("limit", limit.to_string()),
                ])
                .send()
                .await?;
            let posts: Vec<Post> = decode(resp).await?;
            debug!(count = posts.len(), "fetched top posts");
            Ok(posts)
        })
    }

    fn update_post_views(
        &self,
        id: PostId,
        views: u64,
    ) -> BoxFuture<'_, Result<Post, StoreError>> {
        Box::pin(async move {
            let resp = self
                .client
                .patch(self.table_url("posts"))
                .query(&[("id", format!("eq.{id}"))])
                .header("Prefer", "return=representation")
                .json(&ViewsPatch { views })
                .send()
                .await?;
            let rows: Vec<Post> = decode(resp).await?;
            single_row(rows, id.as_str())
        })
    }

    fn fetch_comments(&self, post_id: PostId) -> BoxFuture<'_, Result<Vec<Comment>, StoreError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.table_url("comments"))
                .query(&[
                    ("select", "*".to_string()),
                    ("post_id", format!("eq.{post_id}")),
                    ("order", "created_at.desc".to_string()),
                ])
                .send()
                .await?;
            decode(resp).await
        })
    }

    fn create_comment(
        &self,
        post_id: PostId,
        text: String,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.table_url("comments"))
                .header("Prefer", "return=minimal")
                .json(&NewComment { post_id, text })
                .send()
                .await?;
            check(resp).await?;
            Ok(())
        })
    }

    fn create_post(&self, post: NewPost) -> BoxFuture<'_, Result<Post, StoreError>> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.table_url("posts"))
                .header("Prefer", "return=representation")
                .json(&post)
                .send()
                .await?;
            let rows: Vec<Post> = decode(resp).await?;
            single_row(rows, "<new>")
        })
    }

    fn upload_image(
        &self,
        bytes: Vec<u8>,
        file_name: String,
        content_type: String,
    ) -> BoxFuture<'_, Result<String, StoreError>> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.object_url(&file_name))
                .header(CONTENT_TYPE, content_type)
                .body(bytes)
                .send()
                .await?;
            check(resp).await?;
            Ok(self.public_url(&file_name))
        })
    }
}
