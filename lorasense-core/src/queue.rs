//! Lock-Free Wake Queue Between Interrupt and Scheduler Context
//!
//! ## Overview
//!
//! Interrupt handlers (pin change, RTC alarm, transmit alarm) tell the
//! scheduler *why* it should run by pushing a [`WakeCause`]. The scheduler is
//! the single consumer and drains causes once per loop pass.
//!
//! ```text
//! Producers (ISRs)                     Consumer (scheduler)
//!      ↓                                      ↓
//!   fetch_or ──────→ pending bitmap ←──── fetch_and / swap
//!      ↓                                      ↓
//!   Never blocks                         Never blocks
//! ```
//!
//! ## Capacity
//!
//! The queue holds one slot per cause type, so "at most one pending cause of
//! each type" is a property of the container rather than of interrupt timing.
//! Pushing a cause that is already pending coalesces into the existing slot
//! and is recorded in [`WakeStats::coalesced`]. Nothing is lost by coalescing:
//! counts live in the counter engine, the queue only carries the reason to
//! look at them.
//!
//! ## Memory Ordering
//!
//! - **AcqRel** on the bitmap so state written before a push (a new count, a
//!   history slot) is visible to the consumer that takes the cause.
//! - **Relaxed** for statistics that don't affect correctness.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::events::{WakeCause, WakeSet};

/// Fixed-capacity wake queue, one slot per [`WakeCause`]
///
/// ```rust
/// use lorasense_core::queue::WakeQueue;
/// use lorasense_core::events::WakeCause;
///
/// static WAKES: WakeQueue = WakeQueue::new();
///
/// // RTC ISR
/// WAKES.push(WakeCause::HourlyAlarm);
///
/// // Scheduler
/// assert!(WAKES.take(WakeCause::HourlyAlarm));
/// assert!(WAKES.is_empty());
/// ```
pub struct WakeQueue {
    pending: AtomicU8,
    stats: WakeStats,
}

/// Queue health counters
pub struct WakeStats {
    /// Causes that took a free slot
    pub raised: AtomicU32,
    /// Causes merged into an already pending slot
    pub coalesced: AtomicU32,
    /// Causes taken by the scheduler
    pub serviced: AtomicU32,
}

impl WakeStats {
    const fn new() -> Self {
        Self {
            raised: AtomicU32::new(0),
            coalesced: AtomicU32::new(0),
            serviced: AtomicU32::new(0),
        }
    }
}

impl WakeQueue {
    /// Empty queue; usable in a `static`
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(0),
            stats: WakeStats::new(),
        }
    }

    /// Raise `cause`
    ///
    /// Returns false if the cause was already pending and has been coalesced.
    pub fn push(&self, cause: WakeCause) -> bool {
        let previous = self.pending.fetch_or(cause.bit(), Ordering::AcqRel);
        if previous & cause.bit() != 0 {
            self.stats.coalesced.fetch_add(1, Ordering::Relaxed);
            false
        } else {
            self.stats.raised.fetch_add(1, Ordering::Relaxed);
            true
        }
    }

    /// Clear `cause`; returns whether it was pending
    pub fn take(&self, cause: WakeCause) -> bool {
        let previous = self.pending.fetch_and(!cause.bit(), Ordering::AcqRel);
        let was_pending = previous & cause.bit() != 0;
        if was_pending {
            self.stats.serviced.fetch_add(1, Ordering::Relaxed);
        }
        was_pending
    }

    /// Whether `cause` is pending, without clearing it
    pub fn is_pending(&self, cause: WakeCause) -> bool {
        self.pending.load(Ordering::Acquire) & cause.bit() != 0
    }

    /// Snapshot of pending causes
    pub fn pending(&self) -> WakeSet {
        WakeSet::from_bits(self.pending.load(Ordering::Acquire))
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.load(Ordering::Acquire) == 0
    }

    /// Take every pending cause at once
    pub fn drain(&self) -> WakeSet {
        let taken = WakeSet::from_bits(self.pending.swap(0, Ordering::AcqRel));
        let count = taken.iter().count() as u32;
        if count > 0 {
            self.stats.serviced.fetch_add(count, Ordering::Relaxed);
        }
        taken
    }

    /// Queue statistics
    pub fn stats(&self) -> &WakeStats {
        &self.stats
    }
}

impl Default for WakeQueue {
    fn default() -> Self {
        Self::new()
    }
}
