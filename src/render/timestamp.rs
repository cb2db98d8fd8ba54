//! Wall-clock timestamps for chat lines.

use chrono::{Local, Timelike};

/// Source of the local wall-clock time of day.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current local time as `(hour, minute, second)`.
    fn now(&self) -> (u32, u32, u32);
}

/// Reads the local time from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> (u32, u32, u32) {
        let now = Local::now();
        (now.hour(), now.minute(), now.second())
    }
}

/// A clock frozen at one time of day, for tests and replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl FixedClock {
    #[must_use]
    pub const fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> (u32, u32, u32) {
        (self.hour, self.minute, self.second)
    }
}

/// Format a time of day as `H:MM:SS` (hour unpadded).
#[must_use]
pub fn format_timestamp(hour: u32, minute: u32, second: u32) -> String {
    format!("{hour}:{minute:02}:{second:02}")
}

/// Current time from `clock`, formatted with [`format_timestamp`].
#[must_use]
pub fn timestamp(clock: &dyn Clock) -> String {
    let (hour, minute, second) = clock.now();
    format_timestamp(hour, minute, second)
}
