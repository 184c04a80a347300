//! Marker and popup descriptors for location groups.
//!
//! Pure functions of a group: nothing here holds state between fetches. Every
//! descriptor names its group by a generational `GroupId`, so descriptors
//! from an older fetch cannot be resolved against the current one.

use foundation::math::LatLng;
use posts::PostId;
use scene::{GroupId, LocationGroup, World};

use crate::symbology::{MarkerStyle, Rgb, heat_color};

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDescriptor {
    pub group: GroupId,
    pub position: LatLng,
    /// Member count shown on the badge.
    pub badge: String,
    pub color: Rgb,
    /// Diameter; anchored at the center.
    pub size_px: u32,
    pub border_px: u32,
}

impl MarkerDescriptor {
    /// Markup for the round badge icon.
    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="custom-marker" style="width: {size}px; height: {size}px; border-radius: 50%; background-color: {color}; border: {border}px solid white; cursor: pointer; display: flex; align-items: center; justify-content: center; font-weight: bold; color: white; text-shadow: 1px 1px 2px rgba(0,0,0,0.5);">{badge}</div>"#,
            size = self.size_px,
            color = self.color.to_css(),
            border = self.border_px,
            badge = escape_html(&self.badge),
        )
    }

    /// Icon anchor offset, in pixels from the icon's top-left corner.
    pub fn anchor_px(&self) -> (u32, u32) {
        (self.size_px / 2, self.size_px / 2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupEntry {
    Preview {
        post_id: PostId,
        excerpt: String,
        views: u64,
    },
    /// Footer for members beyond the preview limit.
    More { remaining: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub group: GroupId,
    pub entries: Vec<PopupEntry>,
    pub offset_px: (i32, i32),
    pub max_width_px: u32,
    pub max_height_px: u32,
}

impl PopupContent {
    pub fn previews(&self) -> impl Iterator<Item = &PostId> + '_ {
        self.entries.iter().filter_map(|e| match e {
            PopupEntry::Preview { post_id, .. } => Some(post_id),
            PopupEntry::More { .. } => None,
        })
    }

    /// Markup for the popup body.
    ///
    /// Preview rows carry `data-post-id` so a click inside the popup can be
    /// mapped back to a post. Rows are separated only when there are several.
    pub fn to_html(&self) -> String {
        let rows = self.previews().count();
        let mut html = format!(
            r#"<div class="popup-content" style="width: {}px; max-height: {}px; overflow-y: auto;">"#,
            self.max_width_px, self.max_height_px
        );
        for entry in &self.entries {
            match entry {
                PopupEntry::Preview {
                    post_id,
                    excerpt,
                    views,
                } => {
                    let border = if rows > 1 {
                        " border-bottom: 1px solid #eee;"
                    } else {
                        ""
                    };
                    html.push_str(&format!(
                        r#"<div class="post-preview" data-post-id="{}" style="padding: 8px; cursor: pointer;{border}"><p class="post-text">{}</p><p class="post-views">Views: {views}</p></div>"#,
                        escape_html(post_id.as_str()),
                        escape_html(excerpt),
                    ));
                }
                PopupEntry::More { remaining } => {
                    html.push_str(&format!(
                        r#"<div class="post-more" style="padding: 8px; text-align: center;">+{remaining} more posts</div>"#
                    ));
                }
            }
        }
        html.push_str("</div>");
        html
    }
}

/// Builds the marker and popup descriptors for one group.
pub fn present(
    id: GroupId,
    group: &LocationGroup,
    style: &MarkerStyle,
) -> (MarkerDescriptor, PopupContent) {
    let marker = MarkerDescriptor {
        group: id,
        position: group.centroid,
        badge: group.len().to_string(),
        color: heat_color(group.total_views),
        size_px: style.size_px,
        border_px: style.border_px,
    };

    let mut entries: Vec<PopupEntry> = group
        .posts
        .iter()
        .take(style.max_previews)
        .map(|p| PopupEntry::Preview {
            post_id: p.id.clone(),
            excerpt: excerpt(&p.text, style.excerpt_chars),
            views: p.views,
        })
        .collect();
    if group.len() > style.max_previews {
        entries.push(PopupEntry::More {
            remaining: group.len() - style.max_previews,
        });
    }

    let popup = PopupContent {
        group: id,
        entries,
        offset_px: style.popup_offset_px,
        max_width_px: style.popup_max_width_px,
        max_height_px: style.popup_max_height_px,
    };
    (marker, popup)
}

/// Descriptors for every group of the current generation, in group order.
pub fn present_world(world: &World, style: &MarkerStyle) -> Vec<(MarkerDescriptor, PopupContent)> {
    world
        .groups()
        .map(|(id, group)| present(id, group, style))
        .collect()
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    out.push('…');
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{PopupEntry, excerpt, present, present_world};
    use crate::symbology::{MarkerStyle, Rgb};
    use chrono::{TimeZone, Utc};
    use posts::{Post, PostId};
    use pretty_assertions::assert_eq;
    use scene::{GroupId, World, cluster_posts};

    fn post(id: &str, views: u64, text: &str) -> Post {
        Post {
            id: PostId::new(id),
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
            latitude: 37.5665,
            longitude: 126.978,
            image_url: String::new(),
            text: text.to_string(),
            views,
            owner_id: None,
        }
    }

    #[test]
    fn small_group_lists_every_post() {
        let posts = vec![post("a", 3, "hello"), post("b", 1, "world")];
        let groups = cluster_posts(&posts, 1e-4);
        let (marker, popup) = present(GroupId::new(0, 1), &groups[0], &MarkerStyle::default());

        assert_eq!(marker.badge, "2");
        assert_eq!(marker.color, Rgb::new(255, 247, 0));
        assert_eq!(
            popup.entries,
            vec![
                PopupEntry::Preview {
                    post_id: PostId::new("a"),
                    excerpt: "hello".into(),
                    views: 3
                },
                PopupEntry::Preview {
                    post_id: PostId::new("b"),
                    excerpt: "world".into(),
                    views: 1
                },
            ]
        );
    }

    #[test]
    fn large_group_gets_more_footer() {
        let posts: Vec<Post> = (0..7).map(|i| post(&format!("p{i}"), i, "t")).collect();
        let groups = cluster_posts(&posts, 1e-4);
        let (_, popup) = present(GroupId::new(0, 1), &groups[0], &MarkerStyle::default());

        assert_eq!(popup.previews().count(), 4);
        assert_eq!(popup.entries.last(), Some(&PopupEntry::More { remaining: 3 }));
        // Highest views first.
        assert_eq!(popup.previews().next(), Some(&PostId::new("p6")));
    }

    #[test]
    fn exactly_four_has_no_footer() {
        let posts: Vec<Post> = (0..4).map(|i| post(&format!("p{i}"), 0, "t")).collect();
        let groups = cluster_posts(&posts, 1e-4);
        let (_, popup) = present(GroupId::new(0, 1), &groups[0], &MarkerStyle::default());
        assert!(popup
            .entries
            .iter()
            .all(|e| matches!(e, PopupEntry::Preview { .. })));
    }

    #[test]
    fn html_escapes_text_and_tags_rows() {
        let posts = vec![post("a", 0, "<b>hi</b> & bye")];
        let groups = cluster_posts(&posts, 1e-4);
        let (_, popup) = present(GroupId::new(0, 1), &groups[0], &MarkerStyle::default());
        let html = popup.to_html();
        assert!(html.contains(r#"data-post-id="a""#));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt; &amp; bye"));
        assert!(html.contains("Views: 0"));
        assert!(!html.contains("border-bottom"));
    }

    #[test]
    fn marker_html_draws_bordered_badge() {
        let posts = vec![post("a", 40, "x"), post("b", 0, "y"), post("c", 0, "z")];
        let groups = cluster_posts(&posts, 1e-4);
        let (marker, _) = present(GroupId::new(0, 1), &groups[0], &MarkerStyle::default());

        let html = marker.to_html();
        assert!(html.contains("width: 30px; height: 30px;"));
        assert!(html.contains("border: 2px solid white;"));
        assert!(html.contains("background-color: rgb(255, 175, 0);"));
        assert!(html.ends_with(">3</div>"));
        assert_eq!(marker.anchor_px(), (15, 15));
    }

    #[test]
    fn excerpt_cuts_on_char_boundary() {
        assert_eq!(excerpt("  short ", 10), "short");
        assert_eq!(excerpt("서울특별시 중구", 3), "서울특…");
    }

    #[test]
    fn world_descriptors_use_current_generation() {
        let mut world = World::default();
        let generation = world.replace_posts(vec![post("a", 0, "x")]);
        let items = present_world(&world, &MarkerStyle::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].0.group.generation(), generation);
    }
}
