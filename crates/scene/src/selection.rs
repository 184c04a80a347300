//! The single selected post behind the detail panel, and its view counting.
//!
//! Each `select` dispatches exactly one view increment. Increments carry a
//! ticket; responses are applied only when they are newer than the last
//! response applied for the same post, so a slow early response can never
//! roll a count back. Applied counts always come from the store, never from a
//! local `+1`.

use std::collections::{HashMap, HashSet};

use foundation::ids::{Id, IdAllocator};
use posts::{Post, PostId};
use tracing::debug;

/// Orders view increments by dispatch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewTicket(Id);

impl ViewTicket {
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// A view-count write to send to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewIncrement {
    pub ticket: ViewTicket,
    pub post_id: PostId,
    /// Last known count plus one.
    pub views: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// Nothing was selected before.
    Entered,
    /// Another (or the same) post was already selected.
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    Applied { post_id: PostId, views: u64 },
    /// A newer response for the same post was already applied.
    Stale { post_id: PostId },
    /// The write failed; counts are best-effort so nothing changes.
    Dropped { post_id: PostId },
    /// The ticket was never issued or was already resolved.
    Unknown,
}

#[derive(Debug, Default)]
pub struct SelectionController {
    selected: Option<Post>,
    tickets: IdAllocator,
    in_flight: HashMap<ViewTicket, PostId>,
    last_applied: HashMap<PostId, ViewTicket>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&Post> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, id: &PostId) -> bool {
        self.selected.as_ref().is_some_and(|p| &p.id == id)
    }

    pub fn pending_increments(&self) -> usize {
        self.in_flight.len()
    }

    /// Shows `post` in the detail panel and returns the increment to dispatch.
    ///
    /// The count is read from `posts` (the working list) when the post is in
    /// it, otherwise from the snapshot being selected. The panel shows that
    /// same count until the store answers.
    pub fn select(&mut self, post: &Post, posts: &[Post]) -> (SelectionChange, ViewIncrement) {
        let known = posts
            .iter()
            .find(|p| p.id == post.id)
            .map_or(post.views, |p| p.views);

        let change = if self.selected.is_some() {
            SelectionChange::Replaced
        } else {
            SelectionChange::Entered
        };
        let mut shown = post.clone();
        shown.views = known;
        self.selected = Some(shown);

        let ticket = ViewTicket(self.tickets.next_id());
        self.in_flight.insert(ticket, post.id.clone());
        debug!(post = %post.id, ticket = ticket.get(), "selected post");

        (
            change,
            ViewIncrement {
                ticket,
                post_id: post.id.clone(),
                views: known.saturating_add(1),
            },
        )
    }

    /// Clears the panel. Returns the post that was showing, if any.
    pub fn deselect(&mut self) -> Option<Post> {
        self.selected.take()
    }

    /// Reconciles a successful write with the stored row.
    pub fn apply_stored(
        &mut self,
        ticket: ViewTicket,
        stored: &Post,
        posts: &mut [Post],
    ) -> ViewOutcome {
        let Some(post_id) = self.in_flight.remove(&ticket) else {
            return ViewOutcome::Unknown;
        };

        if self
            .last_applied
            .get(&post_id)
            .is_some_and(|last| *last > ticket)
        {
            debug!(post = %post_id, ticket = ticket.get(), "discarding stale view count");
            return ViewOutcome::Stale { post_id };
        }
        self.last_applied.insert(post_id.clone(), ticket);

        for p in posts.iter_mut().filter(|p| p.id == post_id) {
            p.views = stored.views;
        }
        if let Some(sel) = self.selected.as_mut().filter(|s| s.id == post_id) {
            sel.views = stored.views;
        }

        ViewOutcome::Applied {
            post_id,
            views: stored.views,
        }
    }

    /// Forgets ordering state for posts that left the working list.
    ///
    /// Posts with increments still in flight keep theirs.
    pub fn retain_posts(&mut self, posts: &[Post]) {
        let in_flight: HashSet<&PostId> = self.in_flight.values().collect();
        self.last_applied
            .retain(|id, _| in_flight.contains(id) || posts.iter().any(|p| &p.id == id));
    }

    pub fn tracked_posts(&self) -> usize {
        self.last_applied.len()
    }

    pub fn apply_failed(&mut self, ticket: ViewTicket) -> ViewOutcome {
        match self.in_flight.remove(&ticket) {
            Some(post_id) => {
                debug!(post = %post_id, ticket = ticket.get(), "view increment dropped");
                ViewOutcome::Dropped { post_id }
            }
            None => ViewOutcome::Unknown,
        }
    }
}
