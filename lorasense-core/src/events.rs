//! Wake Causes and Interrupt Events
//!
//! ## Overview
//!
//! Everything that can pull the node out of low-power halt is described here:
//!
//! ```text
//! Pin change ISR ──→ PinEdge ──→ counter engine ──→ WakeCause::CounterEdge ─┐
//! RTC hour ISR   ──→ HourTick ─→ counter engine ──→ WakeCause::HourlyAlarm ─┼─→ WakeQueue ─→ scheduler
//! Alarm timer    ─────────────────────────────────→ WakeCause::Scheduled ───┘
//! ```
//!
//! An [`Interrupt`] is what the board reports when halt returns. The node turns
//! it into counter-engine updates and, where appropriate, a [`WakeCause`] on the
//! wake queue. The scheduler only ever looks at wake causes.
//!
//! ## Service Order
//!
//! The discriminant of [`WakeCause`] is its service priority. When several
//! causes are pending in one pass the scheduler handles them in that order,
//! so count-driven alarm state is visible to the hourly hook and both are
//! visible to the each-wakeup hook.

use crate::constants::counter::CHANNEL_COUNT;
use crate::time::Timestamp;

/// One of the three physical count inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    /// First count input
    One = 0,
    /// Second count input
    Two = 1,
    /// Third count input (shares an EXTI line with the radio on legacy boards)
    Three = 2,
}

impl Channel {
    /// All channels in index order
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::One, Channel::Two, Channel::Three];

    /// Zero-based index
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Channel for a zero-based index
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Channel::One),
            1 => Some(Channel::Two),
            2 => Some(Channel::Three),
            _ => None,
        }
    }

    /// Channel for the operator-facing number (1..=3)
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=3 => Self::from_index(number as usize - 1),
            _ => None,
        }
    }

    /// Bit for this channel in status bitmaps
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Reason the scheduler was woken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum WakeCause {
    /// A debounced count was accepted
    CounterEdge = 0,
    /// The RTC crossed an hour boundary
    HourlyAlarm = 1,
    /// The transmit alarm fired
    Scheduled = 2,
}

impl WakeCause {
    /// All causes in service order
    pub const ALL: [WakeCause; 3] = [
        WakeCause::CounterEdge,
        WakeCause::HourlyAlarm,
        WakeCause::Scheduled,
    ];

    /// Bit for this cause in a [`WakeSet`]
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Short name for logs
    pub const fn name(self) -> &'static str {
        match self {
            WakeCause::CounterEdge => "counter",
            WakeCause::HourlyAlarm => "hourly",
            WakeCause::Scheduled => "scheduled",
        }
    }
}

/// Set of pending wake causes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WakeSet(u8);

impl WakeSet {
    /// No causes
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build from raw bits, ignoring unknown ones
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b111)
    }

    /// Raw bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Add a cause
    pub fn insert(&mut self, cause: WakeCause) {
        self.0 |= cause.bit();
    }

    /// Whether `cause` is in the set
    pub const fn contains(self, cause: WakeCause) -> bool {
        self.0 & cause.bit() != 0
    }

    /// Whether no cause is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Causes in service order
    pub fn iter(self) -> impl Iterator<Item = WakeCause> {
        WakeCause::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

/// A pin transition captured by the pin-change ISR
///
/// Carries the level the pin settled at and the direction pin sampled at the
/// same instant, so the count decision on debounce expiry does not depend on
/// when the main context gets around to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinEdge {
    /// Input that changed
    pub channel: Channel,
    /// Pin level after the transition (`true` = high)
    pub level: bool,
    /// Companion direction pin level (`true` = forward before inversion)
    pub direction: bool,
    /// When the ISR ran
    pub at: Timestamp,
}

impl PinEdge {
    /// Edge without a direction pin
    pub const fn new(channel: Channel, level: bool, at: Timestamp) -> Self {
        Self { channel, level, direction: true, at }
    }

    /// Edge with an explicit direction sample
    pub const fn with_direction(channel: Channel, level: bool, direction: bool, at: Timestamp) -> Self {
        Self { channel, level, direction, at }
    }
}

/// Hour boundary reported by the RTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HourTick {
    /// Absolute hour number (hours since the RTC epoch)
    pub hour: u32,
    /// Monotonic time of the tick
    pub at: Timestamp,
}

/// What ended a low-power halt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interrupt {
    /// The requested wake time was reached
    Timer,
    /// A count input changed level
    Pin(PinEdge),
    /// The RTC hour alarm
    Rtc(HourTick),
    /// Console activity (UART RX)
    Console,
    /// Radio activity outside a transmit (class C receive)
    Radio,
}
