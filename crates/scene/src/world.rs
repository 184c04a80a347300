use posts::{Post, PostId};
use tracing::info;

use crate::cluster::{DEFAULT_CELL_SIZE_DEG, LocationGroup, cluster_posts};
use crate::entity::GroupId;

/// The fetched post snapshot and the location groups derived from it.
///
/// Every call to [`World::replace_posts`] starts a new generation: groups are
/// rebuilt and every `GroupId` handed out before stops resolving.
#[derive(Debug)]
pub struct World {
    cell_size_deg: f64,
    generation: u32,
    posts: Vec<Post>,
    groups: Vec<LocationGroup>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE_DEG)
    }
}

impl World {
    pub fn new(cell_size_deg: f64) -> Self {
        Self {
            cell_size_deg,
            generation: 0,
            posts: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn cell_size_deg(&self) -> f64 {
        self.cell_size_deg
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Swaps in a freshly fetched list and regroups it. Returns the new generation.
    pub fn replace_posts(&mut self, posts: Vec<Post>) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.groups = cluster_posts(&posts, self.cell_size_deg);
        self.posts = posts;
        info!(
            generation = self.generation,
            posts = self.posts.len(),
            groups = self.groups.len(),
            "rebuilt location groups"
        );
        self.generation
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn posts_mut(&mut self) -> &mut [Post] {
        &mut self.posts
    }

    pub fn post(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|p| &p.id == id)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &LocationGroup)> + '_ {
        let generation = self.generation;
        self.groups
            .iter()
            .enumerate()
            .map(move |(i, g)| (GroupId::new(i as u32, generation), g))
    }

    /// Resolves `id`, or `None` when it belongs to a superseded generation.
    pub fn group(&self, id: GroupId) -> Option<&LocationGroup> {
        if !id.is_current(self.generation) {
            return None;
        }
        self.groups.get(id.index() as usize)
    }
}
