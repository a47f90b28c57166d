//! Rolling Hourly Count History
//!
//! ## Overview
//!
//! Each counter channel keeps the raw count observed at the last twelve hour
//! boundaries. Slots are addressed by absolute hour number modulo twelve, so
//! the slot for "now" and the slot for "six hours ago" are plain index
//! arithmetic with no search:
//!
//! ```text
//! hour:   …  13  14  15  16  17  18  19 …
//! slot:       1   2   3   4   5   6   7
//!                         ↑           ↑
//!              six_hour_delta ──────── latest
//! ```
//!
//! Counts are monotonic but wrap at `u32::MAX`, so all deltas use wrapping
//! subtraction.
//!
//! ## Skipped Hours
//!
//! If the RTC jumps forward by more than one hour (a downlink set the clock,
//! or ticks were lost while the node was busy) the skipped slots are filled
//! with the last known count. The whole change since the previous tick is
//! then attributed to the newest hour. A jump backwards re-seeds the history.

use crate::constants::counter::{HISTORY_SLOTS, SIX_HOUR_SPAN};
use crate::time::hour_slot;

/// Twelve-slot hourly count history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlyHistory {
    slots: [u32; HISTORY_SLOTS],
    latest_hour: Option<u32>,
}

impl Default for HourlyHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HourlyHistory {
    /// Empty history; the first record seeds every slot
    pub const fn new() -> Self {
        Self {
            slots: [0; HISTORY_SLOTS],
            latest_hour: None,
        }
    }

    /// Restore persisted slots
    pub fn from_parts(slots: [u32; HISTORY_SLOTS], latest_hour: Option<u32>) -> Self {
        Self { slots, latest_hour }
    }

    /// Raw slots in index order
    pub fn slots(&self) -> &[u32; HISTORY_SLOTS] {
        &self.slots
    }

    /// Hour of the most recent record
    pub fn latest_hour(&self) -> Option<u32> {
        self.latest_hour
    }

    /// Fill every slot with `count` so all deltas start at zero
    pub fn seed(&mut self, hour: u32, count: u32) {
        self.slots = [count; HISTORY_SLOTS];
        self.latest_hour = Some(hour);
    }

    /// Record `count` for `hour`; returns the delta from the previous hour
    pub fn record(&mut self, hour: u32, count: u32) -> u32 {
        let Some(latest) = self.latest_hour else {
            self.seed(hour, count);
            return 0;
        };

        if hour < latest {
            self.seed(hour, count);
            return 0;
        }

        // Carry the last known count through any skipped hours
        let carried = self.slots[hour_slot(latest)];
        let gap = (hour - latest).min(HISTORY_SLOTS as u32);
        for skipped in 1..gap {
            self.slots[hour_slot(hour - gap + skipped)] = carried;
        }

        self.slots[hour_slot(hour)] = count;
        self.latest_hour = Some(hour);
        self.delta(1)
    }

    /// Change over the last `hours` recorded hours (at most eleven)
    pub fn delta(&self, hours: u32) -> u32 {
        let Some(latest) = self.latest_hour else {
            return 0;
        };
        let span = hours.min(HISTORY_SLOTS as u32 - 1) as usize;
        let now = hour_slot(latest);
        let then = (now + HISTORY_SLOTS - span) % HISTORY_SLOTS;
        self.slots[now].wrapping_sub(self.slots[then])
    }

    /// Change during the last completed hour
    pub fn one_hour_delta(&self) -> u32 {
        self.delta(1)
    }

    /// Change over the last six completed hours
    pub fn six_hour_delta(&self) -> u32 {
        self.delta(SIX_HOUR_SPAN)
    }

    /// Change since the most recent hour boundary
    pub fn since_latest(&self, count: u32) -> u32 {
        match self.latest_hour {
            Some(latest) => count.wrapping_sub(self.slots[hour_slot(latest)]),
            None => 0,
        }
    }
}
