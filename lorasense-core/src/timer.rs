//! Software one-shot timers
//!
//! The board gives the core one hardware wake source (the halt deadline), and
//! the core multiplexes its own timers on top of it: the transmit alarm plus a
//! debounce and a leak timer per count input. Every timer supports
//! cancel-and-reissue, which is how "restart the timeout on every new edge"
//! is implemented.
//!
//! Expired timers are popped in deadline order. Equal deadlines pop in slot
//! order (debounce, then leak, then the alarm) so a count that settles on the
//! same millisecond as the transmit alarm is included in that uplink.

use crate::constants::counter::CHANNEL_COUNT;
use crate::events::Channel;
use crate::time::{deadline_after, Timestamp};

/// Handle of a software timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    /// Settling time after the last edge on a channel
    Debounce(Channel),
    /// Quiet period that clears a channel's leak flag
    Leak(Channel),
    /// Periodic transmit alarm
    Alarm,
}

impl TimerId {
    /// Number of timer slots
    pub const COUNT: usize = 2 * CHANNEL_COUNT + 1;

    const fn slot(self) -> usize {
        match self {
            TimerId::Debounce(ch) => ch.index(),
            TimerId::Leak(ch) => CHANNEL_COUNT + ch.index(),
            TimerId::Alarm => 2 * CHANNEL_COUNT,
        }
    }

    const fn from_slot(slot: usize) -> Option<Self> {
        if slot < CHANNEL_COUNT {
            match Channel::from_index(slot) {
                Some(ch) => Some(TimerId::Debounce(ch)),
                None => None,
            }
        } else if slot < 2 * CHANNEL_COUNT {
            match Channel::from_index(slot - CHANNEL_COUNT) {
                Some(ch) => Some(TimerId::Leak(ch)),
                None => None,
            }
        } else if slot == 2 * CHANNEL_COUNT {
            Some(TimerId::Alarm)
        } else {
            None
        }
    }
}

/// Fixed bank of one-shot timers
#[derive(Debug, Clone, Default)]
pub struct TimerBank {
    deadlines: [Option<Timestamp>; TimerId::COUNT],
}

impl TimerBank {
    /// All timers stopped
    pub const fn new() -> Self {
        Self {
            deadlines: [None; TimerId::COUNT],
        }
    }

    /// Arm `id` to fire `duration_ms` after `now`, replacing any pending deadline
    pub fn arm(&mut self, id: TimerId, duration_ms: u64, now: Timestamp) -> Timestamp {
        let deadline = deadline_after(now, duration_ms);
        self.arm_at(id, deadline);
        deadline
    }

    /// Arm `id` for an absolute deadline
    pub fn arm_at(&mut self, id: TimerId, deadline: Timestamp) {
        self.deadlines[id.slot()] = Some(deadline);
    }

    /// Cancel `id`; returns whether it was pending
    pub fn stop(&mut self, id: TimerId) -> bool {
        self.deadlines[id.slot()].take().is_some()
    }

    /// Whether `id` is pending
    pub fn is_armed(&self, id: TimerId) -> bool {
        self.deadlines[id.slot()].is_some()
    }

    /// Pending deadline of `id`
    pub fn deadline(&self, id: TimerId) -> Option<Timestamp> {
        self.deadlines[id.slot()]
    }

    /// Whether `id` is pending with a deadline at or before `now`
    pub fn expired(&self, id: TimerId, now: Timestamp) -> bool {
        matches!(self.deadlines[id.slot()], Some(d) if d <= now)
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.deadlines.iter().flatten().copied().min()
    }

    /// Disarm and return the earliest timer due at `now`
    pub fn pop_expired(&mut self, now: Timestamp) -> Option<(TimerId, Timestamp)> {
        let mut best: Option<(usize, Timestamp)> = None;
        for (slot, deadline) in self.deadlines.iter().enumerate() {
            if let Some(d) = *deadline {
                if d <= now && best.map_or(true, |(_, b)| d < b) {
                    best = Some((slot, d));
                }
            }
        }

        let (slot, deadline) = best?;
        self.deadlines[slot] = None;
        TimerId::from_slot(slot).map(|id| (id, deadline))
    }
}
