//! Popup visibility across a marker and its popup.
//!
//! Two surfaces report hover independently: the marker icon and the popup
//! body. Leaving either one arms a short close timer instead of closing, so the
//! pointer can cross the gap between them. The timer closes the popup only if
//! neither surface is hovered when it fires.
//!
//! At most one popup is open. Every open goes through [`PopupMachine`]'s single
//! `request_open` path, which closes the previous popup first.

use foundation::time::Time;
use runtime::timers::{TimerId, TimerQueue};
use scene::GroupId;
use tracing::trace;

pub const DEFAULT_CLOSE_DELAY_MS: u64 = 120;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Close timer fired with nothing hovered.
    Debounced,
    /// Another marker was entered.
    Superseded,
    /// The popup's visual was removed.
    Removed,
    /// The marker set was rebuilt.
    Teardown,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PopupTransition {
    Opened(GroupId),
    Closed(GroupId, CloseReason),
}

/// Hover and visibility for one group's popup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupState {
    pub marker_hovered: bool,
    pub popup_hovered: bool,
    pub open: bool,
    close_timer: Option<TimerId>,
}

impl PopupState {
    pub fn close_pending(&self) -> bool {
        self.close_timer.is_some()
    }
}

/// Sole owner and writer of every group's [`PopupState`].
///
/// Inputs carrying a `GroupId` from another generation are ignored. A rebuild
/// cancels every timer, so a timer can never outlive its marker set.
pub struct PopupMachine {
    close_delay_ms: u64,
    generation: u32,
    states: Vec<PopupState>,
    open: Option<GroupId>,
    timers: TimerQueue<GroupId>,
}

impl Default for PopupMachine {
    fn default() -> Self {
        Self::new(DEFAULT_CLOSE_DELAY_MS)
    }
}

impl PopupMachine {
    pub fn new(close_delay_ms: u64) -> Self {
        Self {
            close_delay_ms,
            generation: 0,
            states: Vec::new(),
            open: None,
            timers: TimerQueue::new(),
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn open_group(&self) -> Option<GroupId> {
        self.open
    }

    pub fn is_open(&self, id: GroupId) -> bool {
        self.open == Some(id)
    }

    pub fn state(&self, id: GroupId) -> Option<&PopupState> {
        let idx = self.index_of(id)?;
        self.states.get(idx)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<Time> {
        self.timers.next_deadline()
    }

    /// Starts a new marker set of `group_count` groups.
    ///
    /// Closes the open popup and cancels every pending timer of the old set.
    pub fn rebuild(&mut self, generation: u32, group_count: usize) -> Vec<PopupTransition> {
        let mut out = Vec::new();
        if let Some(open) = self.open.take() {
            out.push(PopupTransition::Closed(open, CloseReason::Teardown));
        }
        let cancelled = self.timers.clear();
        if cancelled > 0 {
            trace!(cancelled, "cancelled popup timers on rebuild");
        }
        self.generation = generation;
        self.states = vec![PopupState::default(); group_count];
        out
    }

    pub fn marker_enter(&mut self, id: GroupId) -> Vec<PopupTransition> {
        let Some(idx) = self.index_of(id) else {
            return Vec::new();
        };
        self.states[idx].marker_hovered = true;
        self.cancel_close(idx);
        self.request_open(id)
    }

    pub fn marker_leave(&mut self, id: GroupId, now: Time) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        self.states[idx].marker_hovered = false;
        if self.states[idx].open {
            self.arm_close(idx, id, now);
        }
    }

    /// Pointer entered the popup body. Only meaningful while the popup is shown.
    pub fn popup_enter(&mut self, id: GroupId) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        if !self.states[idx].open {
            return;
        }
        self.states[idx].popup_hovered = true;
        self.cancel_close(idx);
    }

    pub fn popup_leave(&mut self, id: GroupId, now: Time) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        self.states[idx].popup_hovered = false;
        if self.states[idx].open {
            self.arm_close(idx, id, now);
        }
    }

    /// The popup's visual went away; closes regardless of hover.
    pub fn popup_removed(&mut self, id: GroupId) -> Vec<PopupTransition> {
        let Some(idx) = self.index_of(id) else {
            return Vec::new();
        };
        self.cancel_close(idx);
        self.states[idx].popup_hovered = false;
        if self.states[idx].open {
            return vec![self.close(idx, id, CloseReason::Removed)];
        }
        Vec::new()
    }

    /// Fires close timers due at `now`.
    pub fn advance(&mut self, now: Time) -> Vec<PopupTransition> {
        let mut out = Vec::new();
        for due in self.timers.pop_due(now) {
            let id = due.payload;
            let Some(idx) = self.index_of(id) else {
                continue;
            };
            if self.states[idx].close_timer != Some(due.id) {
                continue;
            }
            self.states[idx].close_timer = None;
            let st = &self.states[idx];
            if st.open && !st.marker_hovered && !st.popup_hovered {
                out.push(self.close(idx, id, CloseReason::Debounced));
            }
        }
        out
    }

    fn request_open(&mut self, id: GroupId) -> Vec<PopupTransition> {
        let mut out = Vec::new();
        match self.open {
            Some(current) if current == id => return out,
            Some(current) => {
                if let Some(idx) = self.index_of(current) {
                    out.push(self.close(idx, current, CloseReason::Superseded));
                } else {
                    self.open = None;
                }
            }
            None => {}
        }

        if let Some(idx) = self.index_of(id) {
            self.states[idx].open = true;
            self.open = Some(id);
            trace!(group = %id, "popup opened");
            out.push(PopupTransition::Opened(id));
        }
        out
    }

    fn close(&mut self, idx: usize, id: GroupId, reason: CloseReason) -> PopupTransition {
        self.cancel_close(idx);
        let st = &mut self.states[idx];
        st.open = false;
        st.popup_hovered = false;
        if self.open == Some(id) {
            self.open = None;
        }
        trace!(group = %id, ?reason, "popup closed");
        PopupTransition::Closed(id, reason)
    }

    fn arm_close(&mut self, idx: usize, id: GroupId, now: Time) {
        self.cancel_close(idx);
        let timer = self.timers.schedule(now.after(self.close_delay_ms), id);
        self.states[idx].close_timer = Some(timer);
    }

    fn cancel_close(&mut self, idx: usize) {
        if let Some(timer) = self.states[idx].close_timer.take() {
            self.timers.cancel(timer);
        }
    }

    fn index_of(&self, id: GroupId) -> Option<usize> {
        if !id.is_current(self.generation) {
            return None;
        }
        let idx = id.index() as usize;
        (idx < self.states.len()).then_some(idx)
    }
}
