//! Wire model shared with the persistence service.
//!
//! Field names follow the service's row layout (`snake_case`, `image_url`,
//! `user_id`), so rows deserialize straight into these types.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use foundation::math::LatLng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

/// A geotagged post.
///
/// Only `views` is ever mutated after creation, and only through a view
/// increment acknowledged by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub created_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
    pub text: String,
    pub views: u64,
    #[serde(rename = "user_id", default)]
    pub owner_id: Option<UserId>,
}

impl Post {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Popularity order: views descending, then newest first.
///
/// Used for the top-posts query and for ranking posts inside a location group.
pub fn by_popularity(a: &Post, b: &Post) -> Ordering {
    b.views
        .cmp(&a.views)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub created_at: DateTime<Utc>,
    pub post_id: PostId,
    pub text: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Insert payload for a post. New posts always start at zero views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub text: String,
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub views: u64,
}

impl NewPost {
    pub fn new(text: impl Into<String>, image_url: impl Into<String>, at: LatLng) -> Self {
        Self {
            text: text.into(),
            image_url: image_url.into(),
            latitude: at.lat,
            longitude: at.lng,
            views: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub text: String,
}

/// Partial update body for a view-count write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewsPatch {
    pub views: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn post(id: &str, views: u64, created_s: i64) -> Post {
        Post {
            id: PostId::new(id),
            created_at: Utc.timestamp_opt(created_s, 0).unwrap(),
            latitude: 0.0,
            longitude: 0.0,
            image_url: String::new(),
            text: String::new(),
            views,
            owner_id: None,
        }
    }

    #[test]
    fn decodes_service_row() {
        let row = r#"{
            "id": "6f1c",
            "created_at": "2024-05-01T10:00:00.123456+00:00",
            "latitude": 37.5665,
            "longitude": 126.978,
            "image_url": "https://cdn.example/p.png",
            "text": "hello",
            "views": 7,
            "user_id": null
        }"#;
        let p: Post = serde_json::from_str(row).unwrap();
        assert_eq!(p.id, PostId::new("6f1c"));
        assert_eq!(p.views, 7);
        assert_eq!(p.owner_id, None);
        assert_eq!(p.position(), LatLng::new(37.5665, 126.978));
    }

    #[test]
    fn new_post_encodes_zero_views() {
        let body = serde_json::to_value(NewPost::new("t", "u", LatLng::new(1.0, 2.0))).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "text": "t",
                "image_url": "u",
                "latitude": 1.0,
                "longitude": 2.0,
                "views": 0
            })
        );
    }

    #[test]
    fn popularity_prefers_views_then_recency() {
        let mut v = vec![post("old", 5, 10), post("hot", 9, 1), post("new", 5, 20)];
        v.sort_by(by_popularity);
        let ids: Vec<_> = v.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["hot", "new", "old"]);
    }
}
