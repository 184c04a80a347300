/// Session timebase in milliseconds.
///
/// Every timer deadline and input event is stamped with a `Time`. It is a plain
/// integer so deadlines order totally and replays are exact.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(pub u64); // milliseconds since session start

impl Time {
    pub const ZERO: Time = Time(0);

    pub fn from_millis(ms: u64) -> Self {
        Time(ms)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Returns the instant `delay_ms` after `self`, saturating at `u64::MAX`.
    pub fn after(self, delay_ms: u64) -> Self {
        Time(self.0.saturating_add(delay_ms))
    }

    /// Milliseconds from `earlier` to `self`, or zero if `earlier` is later.
    pub fn since(self, earlier: Time) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}
