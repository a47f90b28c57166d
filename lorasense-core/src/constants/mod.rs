//! Constants for the Node Core
//!
//! Every floor, default and wire number the core relies on lives here so the
//! CLI, downlink handlers and persistence codec agree on them.
//!
//! ## Organization
//!
//! - **Time**: unit conversions
//! - **Counter**: debounce, leak and burst limits for pulse inputs
//! - **Schedule**: transmit cadence, boot retry and CLI window timings
//! - **Payload**: LoRaWAN ports, payload sizes and sentinels
//! - **Device**: defaults for individual device modes

/// Time unit conversions.
pub mod time;

/// Pulse counter floors and defaults.
pub mod counter;

/// Transmit schedule and boot timing.
pub mod schedule;

/// LoRaWAN ports and payload layout.
pub mod payload;

/// Device mode defaults.
pub mod device;

pub use time::{MS_PER_SECOND, MS_PER_MINUTE, MS_PER_HOUR};

pub use counter::{
    CHANNEL_COUNT, HISTORY_SLOTS, DEBOUNCE_MIN_MS, LEAK_TIMEOUT_MIN_MS, BURST_HOURS_MIN,
};

pub use schedule::{
    DEFAULT_TRANSMIT_INTERVAL_MS, TRANSMIT_INTERVAL_MIN_MS, BOOT_RETRY_PENALTY_MS,
};

pub use payload::{DATA_PORT, ALARM_PORT, MAX_PAYLOAD_LEN, READING_SENTINEL};
