use std::collections::{BTreeMap, HashMap};

use foundation::ids::{Id, IdAllocator};
use foundation::time::Time;

/// Identifies one scheduled timer. Never reused within a queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(Id);

impl TimerId {
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// A timer whose deadline has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Due<T> {
    pub id: TimerId,
    pub deadline: Time,
    pub payload: T,
}

/// Deterministic, cancellable one-shot timers.
///
/// Ordering contract:
/// - `pop_due` yields timers by `(deadline, scheduling order)`.
/// - A cancelled timer is removed immediately and can never be yielded.
///
/// The queue holds no clock. Callers pass `now` explicitly, which keeps every
/// owner replayable and lets tests decide which side of a race happens first.
pub struct TimerQueue<T> {
    ids: IdAllocator,
    entries: BTreeMap<(Time, TimerId), T>,
    deadlines: HashMap<TimerId, Time>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            ids: IdAllocator::new(),
            entries: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn schedule(&mut self, deadline: Time, payload: T) -> TimerId {
        let id = TimerId(self.ids.next_id());
        self.entries.insert((deadline, id), payload);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancels `id`, returning its payload if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let deadline = self.deadlines.remove(&id)?;
        self.entries.remove(&(deadline, id))
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<Time> {
        self.deadlines.get(&id).copied()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Time> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Cancels everything. Returns how many timers were pending.
    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        self.deadlines.clear();
        n
    }

    /// Removes and returns every timer with `deadline <= now`, in firing order.
    pub fn pop_due(&mut self, now: Time) -> Vec<Due<T>> {
        let mut out = Vec::new();
        while let Some(((deadline, _), _)) = self.entries.first_key_value() {
            if *deadline > now {
                break;
            }
            let Some(((deadline, id), payload)) = self.entries.pop_first() else {
                break;
            };
            self.deadlines.remove(&id);
            out.push(Due {
                id,
                deadline,
                payload,
            });
        }
        out
    }
}
