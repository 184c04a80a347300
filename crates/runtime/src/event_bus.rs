use std::collections::VecDeque;

use foundation::time::Time;

/// One interaction event, stamped with session time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub at: Time,
    /// Dotted category such as `popup.opened`.
    pub kind: &'static str,
    pub message: String,
}

impl Event {
    /// `popup` matches `popup.opened` and `popup.closed`, not `popups.x`.
    pub fn is_in(&self, category: &str) -> bool {
        self.kind
            .strip_prefix(category)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    }
}

/// Interaction trace kept by a session.
///
/// Bounded: once `capacity` events are held, the oldest are dropped, so a
/// long-running loop does not grow without limit.
#[derive(Debug)]
pub struct EventBus {
    events: VecDeque<Event>,
    capacity: usize,
    dropped: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 4096;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    pub fn emit(&mut self, at: Time, kind: &'static str, message: impl Into<String>) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(Event {
            at,
            kind,
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events evicted to stay within capacity.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.back()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Events whose kind falls under `category`, oldest first.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.is_in(category))
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use foundation::time::Time;

    #[test]
    fn counts_by_kind_and_category() {
        let mut bus = EventBus::new();
        bus.emit(Time(1), "popup.opened", "g0#1");
        bus.emit(Time(2), "popup.closed", "g0#1 Debounced");
        bus.emit(Time(3), "popups.other", "x");
        assert_eq!(bus.count("popup.opened"), 1);
        assert_eq!(bus.count("popup"), 0);

        let at: Vec<u64> = bus.in_category("popup").map(|e| e.at.as_millis()).collect();
        assert_eq!(at, vec![1, 2]);
        assert_eq!(bus.last().map(|e| e.kind), Some("popups.other"));
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut bus = EventBus::with_capacity(2);
        for t in 0..5 {
            bus.emit(Time(t), "tick", t.to_string());
        }
        assert_eq!(bus.len(), 2);
        assert_eq!(bus.dropped(), 3);
        let msgs: Vec<&str> = bus.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(msgs, vec!["3", "4"]);
    }

    #[test]
    fn drain_empties_the_trace() {
        let mut bus = EventBus::new();
        bus.emit(Time(0), "k", "m");
        assert_eq!(bus.drain().len(), 1);
        assert!(bus.is_empty());
    }
}
