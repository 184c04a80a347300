//! Spatial clustering of posts into location groups.
//!
//! Coordinates are quantized onto a fixed grid (`cell_size_deg`, default
//! `1e-4` degrees, roughly 11 m). Posts that land in the same cell form one
//! group. The grid does not follow zoom: grouping looks the same at every
//! zoom level.

use std::collections::HashMap;

use foundation::math::{LatLng, quantize};
use posts::{Post, PostId, by_popularity};

pub const DEFAULT_CELL_SIZE_DEG: f64 = 1e-4;

/// Quantized `(lat, lng)` cell index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub lat: i64,
    pub lng: i64,
}

impl CellKey {
    pub fn of(position: LatLng, cell_size_deg: f64) -> Self {
        Self {
            lat: quantize(position.lat, cell_size_deg),
            lng: quantize(position.lng, cell_size_deg),
        }
    }
}

/// Posts that share a cell.
///
/// Invariants:
/// - `posts` is non-empty and ranked by views descending, then newest first.
/// - `centroid` is the mean of the members' raw coordinates, not the cell center.
/// - `total_views` is the sum of member views.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationGroup {
    pub cell: CellKey,
    pub posts: Vec<Post>,
    pub centroid: LatLng,
    pub total_views: u64,
}

impl LocationGroup {
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Highest-ranked member; what a bare marker click opens.
    pub fn top(&self) -> Option<&Post> {
        self.posts.first()
    }

    pub fn find(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|p| &p.id == id)
    }
}

/// Groups `posts` by quantized cell.
///
/// Groups come out in order of their first member's position in `posts`, so
/// the same input always yields the same groups in the same order.
pub fn cluster_posts(posts: &[Post], cell_size_deg: f64) -> Vec<LocationGroup> {
    let mut index_by_cell: HashMap<CellKey, usize> = HashMap::new();
    let mut buckets: Vec<(CellKey, Vec<Post>)> = Vec::new();

    for post in posts {
        let cell = CellKey::of(post.position(), cell_size_deg);
        let idx = *index_by_cell.entry(cell).or_insert_with(|| {
            buckets.push((cell, Vec::new()));
            buckets.len() - 1
        });
        buckets[idx].1.push(post.clone());
    }

    buckets
        .into_iter()
        .map(|(cell, mut members)| {
            // Stable sort: exact ties keep arrival order.
            members.sort_by(by_popularity);
            let centroid = LatLng::mean(members.iter().map(Post::position)).unwrap_or_default();
            let total_views = members
                .iter()
                .fold(0u64, |acc, p| acc.saturating_add(p.views));
            LocationGroup {
                cell,
                posts: members,
                centroid,
                total_views,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{CellKey, DEFAULT_CELL_SIZE_DEG, cluster_posts};
    use chrono::{TimeZone, Utc};
    use foundation::math::LatLng;
    use posts::{Post, PostId};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn post(id: &str, lat: f64, lng: f64, views: u64, created_s: i64) -> Post {
        Post {
            id: PostId::new(id),
            created_at: Utc.timestamp_opt(created_s, 0).unwrap(),
            latitude: lat,
            longitude: lng,
            image_url: String::new(),
            text: id.to_string(),
            views,
            owner_id: None,
        }
    }

    #[test]
    fn nearby_posts_share_a_group() {
        let posts = vec![
            post("a", 37.56650, 126.97800, 3, 1),
            post("b", 37.56651, 126.97801, 1, 2),
            post("c", 37.6, 127.0, 0, 3),
        ];
        let groups = cluster_posts(&posts, DEFAULT_CELL_SIZE_DEG);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
        assert_eq!(groups[1].posts[0].id, PostId::new("c"));
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(cluster_posts(&[], DEFAULT_CELL_SIZE_DEG).is_empty());
    }

    #[test]
    fn members_ranked_by_views_then_recency() {
        let posts = vec![
            post("old", 10.0, 10.0, 4, 100),
            post("new", 10.0, 10.0, 4, 200),
            post("hot", 10.0, 10.0, 9, 50),
        ];
        let groups = cluster_posts(&posts, DEFAULT_CELL_SIZE_DEG);
        let ids: Vec<_> = groups[0].posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["hot", "new", "old"]);
        assert_eq!(groups[0].top().map(|p| p.id.as_str()), Some("hot"));
        assert_eq!(groups[0].total_views, 17);
    }

    #[test]
    fn centroid_is_mean_of_raw_coordinates() {
        let posts = vec![
            post("a", 37.56650, 126.97800, 0, 1),
            post("b", 37.56652, 126.97802, 0, 2),
        ];
        let groups = cluster_posts(&posts, DEFAULT_CELL_SIZE_DEG);
        let c = groups[0].centroid;
        assert!((c.lat - 37.56651).abs() < 1e-9);
        assert!((c.lng - 126.97801).abs() < 1e-9);
    }

    #[test]
    fn cell_key_matches_grid() {
        let key = CellKey::of(LatLng::new(37.5665, 126.978), DEFAULT_CELL_SIZE_DEG);
        assert_eq!(
            key,
            CellKey {
                lat: 375_665,
                lng: 1_269_780
            }
        );
    }

    fn arb_posts() -> impl Strategy<Value = Vec<Post>> {
        prop::collection::vec((0u32..40, 0u32..40, 0u64..50, 0i64..1_000), 0..30).prop_map(
            |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (la, ln, views, t))| {
                        // Coarse lattice so collisions are common.
                        let lat = 37.5 + la as f64 * 0.00007;
                        let lng = 127.0 + ln as f64 * 0.00007;
                        post(&format!("p{i}"), lat, lng, views, t)
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn groups_partition_the_input(posts in arb_posts()) {
            let groups = cluster_posts(&posts, DEFAULT_CELL_SIZE_DEG);
            let mut seen: Vec<&str> = groups
                .iter()
                .flat_map(|g| g.posts.iter().map(|p| p.id.as_str()))
                .collect();
            seen.sort();
            let mut expected: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
            expected.sort();
            prop_assert_eq!(seen, expected);
            prop_assert!(groups.iter().all(|g| !g.is_empty()));
        }

        #[test]
        fn same_group_iff_same_cell(posts in arb_posts()) {
            let groups = cluster_posts(&posts, DEFAULT_CELL_SIZE_DEG);
            for (gi, g) in groups.iter().enumerate() {
                for p in &g.posts {
                    prop_assert_eq!(CellKey::of(p.position(), DEFAULT_CELL_SIZE_DEG), g.cell);
                }
                for other in groups.iter().skip(gi + 1) {
                    prop_assert_ne!(g.cell, other.cell);
                }
            }
        }

        #[test]
        fn clustering_is_deterministic(posts in arb_posts()) {
            let a = cluster_posts(&posts, DEFAULT_CELL_SIZE_DEG);
            let b = cluster_posts(&posts, DEFAULT_CELL_SIZE_DEG);
            prop_assert_eq!(a, b);
        }
    }
}
