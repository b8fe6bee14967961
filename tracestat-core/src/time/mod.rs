//! ## tracestat-core::time
//! **Trace time and epoch windows**
//!
//! Time is a signed nanosecond count taken from the trace itself. Nothing in
//! this crate reads the wall clock.

/// Nanosecond timestamp or duration.
pub type TimeNs = i64;

pub const NANOS_PER_MICRO: TimeNs = 1_000;
pub const NANOS_PER_MILLI: TimeNs = 1_000_000;
pub const NANOS_PER_SEC: TimeNs = 1_000_000_000;

/// Signals when a fixed-length epoch has elapsed.
///
/// The first tick arms the clock and never fires; every later tick at or
/// past the alarm fires once and re-arms the alarm relative to that tick.
#[derive(Debug, Clone)]
pub struct EpochClock {
    epoch_duration: TimeNs,
    alarm: Option<TimeNs>,
}

impl EpochClock {
    pub fn new(epoch_duration: TimeNs) -> Self {
        Self {
            epoch_duration,
            alarm: None,
        }
    }

    #[inline]
    pub fn epoch_duration(&self) -> TimeNs {
        self.epoch_duration
    }

    /// Time at which the next tick will fire, once armed.
    #[inline]
    pub fn next_alarm(&self) -> Option<TimeNs> {
        self.alarm
    }

    /// Feeds the current time; returns `true` when an epoch boundary was
    /// crossed.
    pub fn tick(&mut self, now: TimeNs) -> bool {
        match self.alarm {
            None => {
                self.alarm = Some(now.saturating_add(self.epoch_duration));
                false
            }
            Some(alarm) if now >= alarm => {
                self.alarm = Some(now.saturating_add(self.epoch_duration));
                true
            }
            Some(_) => false,
        }
    }
}
