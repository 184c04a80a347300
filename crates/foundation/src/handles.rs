/// Generational handle: `(index, generation)`.
///
/// A handle minted for one generation never compares equal to a handle for a
/// later generation, even when the index is reused. Owners bump the generation
/// whenever the indexed set is rebuilt, which turns every outstanding handle
/// into a detectable stale reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32, u32); // (index, generation)

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn generation(self) -> u32 {
        self.1
    }

    pub fn is_current(self, generation: u32) -> bool {
        self.1 == generation
    }
}
