use foundation::handles::Handle;

/// Identity of one location group within one marker-set generation.
///
/// Group ids from a superseded generation never resolve again, so a click or
/// timer carrying one is recognisably stale.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub Handle);

impl GroupId {
    pub fn new(index: u32, generation: u32) -> Self {
        GroupId(Handle::new(index, generation))
    }

    pub fn index(&self) -> u32 {
        self.0.index()
    }

    pub fn generation(&self) -> u32 {
        self.0.generation()
    }

    pub fn is_current(&self, generation: u32) -> bool {
        self.0.is_current(generation)
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}#{}", self.index(), self.generation())
    }
}
