//! Pulse Counter Constants
//!
//! Floors here are enforced at the point of configuration. A value below its
//! floor is rejected and the previous setting stays active.

/// Physical count inputs on the board.
pub const CHANNEL_COUNT: usize = 3;

/// Hourly history slots per channel (index = hour mod 12).
pub const HISTORY_SLOTS: usize = 12;

/// Span used for the six-hour delta reported in payloads.
pub const SIX_HOUR_SPAN: u32 = 6;

// ===== DEBOUNCE =====

/// Smallest accepted debounce interval (milliseconds).
///
/// Below this a chattering reed switch can keep the MCU in interrupt
/// context continuously.
pub const DEBOUNCE_MIN_MS: u32 = 10;

/// Debounce interval for a fresh channel (milliseconds).
pub const DEFAULT_DEBOUNCE_MS: u32 = 50;

// ===== LEAK =====

/// Smallest accepted leak timeout (milliseconds).
pub const LEAK_TIMEOUT_MIN_MS: u32 = 1;

/// Quiet period that clears the leak flag on a fresh channel (milliseconds).
pub const DEFAULT_LEAK_TIMEOUT_MS: u32 = 30 * 60 * 1000;

// ===== BURST =====

/// Smallest accepted number of consecutive burst hours before alarming.
pub const BURST_HOURS_MIN: u8 = 1;

/// Consecutive burst hours before alarming on a fresh channel.
pub const DEFAULT_BURST_HOURS: u8 = 2;

/// Hourly delta above which an hour counts as a burst.
///
/// Zero disables burst detection for the channel.
pub const DEFAULT_BURST_THRESHOLD: u32 = 0;
