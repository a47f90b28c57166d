//! Time management for the node
//!
//! The core only ever needs one clock: a monotonic millisecond counter that
//! keeps running through low-power halt (RTC-backed on real boards). Wall
//! clock time is the board's business; the core is told when it changes.

use crate::constants::counter::HISTORY_SLOTS;
use crate::constants::time::MS_PER_SECOND;

/// Milliseconds since boot on the monotonic clock
pub type Timestamp = u64;

/// Source of time for the system
pub trait TimeSource {
    /// Current monotonic timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Smallest step this clock can resolve, in milliseconds
    fn precision_ms(&self) -> u32 {
        1
    }
}

/// Manually driven clock for tests and simulations
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    timestamp: Timestamp,
}

impl ManualClock {
    /// Clock starting at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute time; never moves backwards
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = self.timestamp.max(timestamp);
    }

    /// Move forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp = self.timestamp.saturating_add(ms);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// History slot for an absolute hour number
pub const fn hour_slot(hour: u32) -> usize {
    hour as usize % HISTORY_SLOTS
}

/// Deadline `duration_ms` after `now`, saturating at the end of time
pub fn deadline_after(now: Timestamp, duration_ms: u64) -> Timestamp {
    now.saturating_add(duration_ms)
}

/// Operator-facing seconds to milliseconds, saturating
pub fn seconds_to_ms(seconds: u32) -> u32 {
    u32::try_from(u64::from(seconds) * MS_PER_SECOND).unwrap_or(u32::MAX)
}
