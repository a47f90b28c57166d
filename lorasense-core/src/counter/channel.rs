//! One pulse input: debounce, leak and burst state

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::config::CounterConfig;
use super::history::HourlyHistory;
use crate::events::{Channel, PinEdge};
use crate::timer::{TimerBank, TimerId};
use crate::time::Timestamp;

/// Which register an accepted pulse went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Counted {
    /// Forward register
    Forward(u32),
    /// Reverse register (direction pin said reverse)
    Reverse(u32),
}

/// Edge waiting for its debounce window to close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingEdge {
    level: bool,
    direction: bool,
}

/// Consecutive-hour burst detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BurstTracker {
    consecutive_hours: u8,
    latched_hour: Option<u32>,
    alarm: bool,
}

impl BurstTracker {
    /// Feed one hour's delta; returns true when the alarm is newly raised
    pub fn observe(&mut self, hour: u32, delta: u32, threshold: u32, required: u8) -> bool {
        if self.latched_hour != Some(hour) {
            self.latched_hour = None;
        }

        if threshold == 0 || delta <= threshold {
            self.consecutive_hours = 0;
            return false;
        }

        if self.latched_hour.is_some() {
            return false;
        }

        self.latched_hour = Some(hour);
        self.consecutive_hours = self.consecutive_hours.saturating_add(1);
        if self.consecutive_hours == required {
            self.alarm = true;
            return true;
        }
        false
    }

    /// Consecutive burst hours so far
    pub fn consecutive_hours(&self) -> u8 {
        self.consecutive_hours
    }

    /// Whether this hour already counted as a burst
    pub fn is_latched(&self, hour: u32) -> bool {
        self.latched_hour == Some(hour)
    }

    /// Consume a raised alarm
    pub fn take_alarm(&mut self) -> bool {
        core::mem::take(&mut self.alarm)
    }

    /// Alarm raised but not yet consumed
    pub fn alarm_pending(&self) -> bool {
        self.alarm
    }

    /// Hour that last counted as a burst
    pub fn latched_hour(&self) -> Option<u32> {
        self.latched_hour
    }

    pub(crate) fn from_parts(consecutive_hours: u8, latched_hour: Option<u32>, alarm: bool) -> Self {
        Self {
            consecutive_hours,
            latched_hour,
            alarm,
        }
    }
}

/// State of one count input
#[derive(Debug)]
pub struct CounterChannel {
    channel: Channel,
    config: CounterConfig,
    count: AtomicU32,
    reverse: AtomicU32,
    leak: AtomicBool,
    pending: Option<PendingEdge>,
    history: HourlyHistory,
    burst: BurstTracker,
}

impl CounterChannel {
    /// Fresh channel; the leak flag starts suspected
    pub fn new(channel: Channel, config: CounterConfig) -> Self {
        Self {
            channel,
            config,
            count: AtomicU32::new(0),
            reverse: AtomicU32::new(0),
            leak: AtomicBool::new(true),
            pending: None,
            history: HourlyHistory::new(),
            burst: BurstTracker::default(),
        }
    }

    /// Which input this is
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Active configuration
    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    /// Replace the configuration after validation; keeps the old one on error
    pub fn set_config(&mut self, config: CounterConfig) -> crate::errors::ConfigResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Forward count
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    /// Reverse count
    pub fn reverse_count(&self) -> u32 {
        self.reverse.load(Ordering::Acquire)
    }

    /// Overwrite both registers (CLI / persisted data)
    pub fn set_counts(&self, forward: u32, reverse: u32) {
        self.count.store(forward, Ordering::Release);
        self.reverse.store(reverse, Ordering::Release);
    }

    /// Whether a leak is currently suspected
    pub fn leak_detected(&self) -> bool {
        self.leak.load(Ordering::Acquire)
    }

    /// Rolling hourly history
    pub fn history(&self) -> &HourlyHistory {
        &self.history
    }

    pub(crate) fn restore_history(&mut self, history: HourlyHistory) {
        self.history = history;
    }

    pub(crate) fn restore_burst(&mut self, burst: BurstTracker) {
        self.burst = burst;
    }

    /// Burst detector state
    pub fn burst(&self) -> &BurstTracker {
        &self.burst
    }

    /// Whether an edge is waiting on its debounce timer
    pub fn is_settling(&self) -> bool {
        self.pending.is_some()
    }

    /// Raw edge from the ISR: restart debounce and leak timers, never count
    pub fn on_edge(&mut self, edge: &PinEdge, timers: &mut TimerBank) {
        self.pending = Some(PendingEdge {
            level: edge.level,
            direction: edge.direction,
        });
        timers.arm(TimerId::Debounce(self.channel), self.config.debounce_ms as u64, edge.at);
        timers.arm(TimerId::Leak(self.channel), self.config.leak_timeout_ms as u64, edge.at);
    }

    /// Debounce window closed; count if the settled level is accepted
    pub fn on_debounce_expire(&mut self) -> Option<Counted> {
        let edge = self.pending.take()?;
        if !self.config.polarity.accepts(edge.level) {
            return None;
        }

        let forward = self
            .config
            .direction
            .map_or(true, |direction| direction.is_forward(edge.direction));

        if forward {
            Some(Counted::Forward(self.count.fetch_add(1, Ordering::AcqRel).wrapping_add(1)))
        } else {
            Some(Counted::Reverse(self.reverse.fetch_add(1, Ordering::AcqRel).wrapping_add(1)))
        }
    }

    /// Leak timer expired with no edge in the window
    pub fn leak_check(&self) {
        self.leak.store(false, Ordering::Release);
    }

    /// Report the leak flag and re-latch it as suspected
    pub fn relatch_leak(&self, timers: &mut TimerBank, now: Timestamp) -> bool {
        let reported = self.leak.swap(true, Ordering::AcqRel);
        timers.arm(TimerId::Leak(self.channel), self.config.leak_timeout_ms as u64, now);
        reported
    }

    /// Start counting at `hour`; counts and the burst run carry over
    pub fn activate(&mut self, hour: Option<u32>, timers: &mut TimerBank, now: Timestamp) {
        self.pending = None;
        if let Some(hour) = hour {
            self.history.seed(hour, self.count());
        }
        self.relatch_leak(timers, now);
    }

    /// Stop the channel's timers
    pub fn deactivate(&mut self, timers: &mut TimerBank) {
        self.pending = None;
        timers.stop(TimerId::Debounce(self.channel));
        timers.stop(TimerId::Leak(self.channel));
    }

    /// Hour boundary; returns true when the burst alarm is newly raised
    pub fn on_hour_tick(&mut self, hour: u32) -> bool {
        let delta = self.history.record(hour, self.count());
        self.burst.observe(
            hour,
            delta,
            self.config.burst_threshold,
            self.config.burst_hours_required,
        )
    }

    /// Consume a raised burst alarm
    pub fn take_burst_alarm(&mut self) -> bool {
        self.burst.take_alarm()
    }
}
