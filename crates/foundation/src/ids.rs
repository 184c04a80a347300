/// Opaque monotonic id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(u64);

impl Id {
    pub fn new(n: u64) -> Self {
        Id(n)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Hands out strictly increasing ids, starting at 1.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> Id {
        self.last = self.last.wrapping_add(1);
        Id(self.last)
    }

    /// The most recently issued id, if any.
    pub fn last(&self) -> Option<Id> {
        (self.last > 0).then_some(Id(self.last))
    }
}

#[cfg(test)]
mod tests {
    use super::IdAllocator;

    #[test]
    fn ids_are_strictly_increasing() {
        let mut ids = IdAllocator::new();
        assert!(ids.last().is_none());
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a < b);
        assert_eq!(ids.last(), Some(b));
    }
}
