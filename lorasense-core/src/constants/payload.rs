//! LoRaWAN Ports and Payload Layout

// ===== UPLINK PORTS =====

/// Routine data uplinks.
pub const DATA_PORT: u8 = 2;

/// Alarm uplinks: counter bursts and door contact changes.
///
/// Leak flags and out-of-window probe readings ride the data uplink instead.
pub const ALARM_PORT: u8 = 3;

// ===== DOWNLINK PORTS HANDLED BY THE CORE =====

/// Transmit interval in seconds, u32 big-endian.
pub const INTERVAL_PORT: u8 = 10;

/// Device mode index, u8.
pub const MODE_PORT: u8 = 11;

/// Scheduled wakes per uplink, u16 big-endian.
pub const WAKEUPS_PORT: u8 = 12;

/// RTC set, seconds since epoch as u32 big-endian.
pub const RTC_PORT: u8 = 13;

// ===== DOWNLINK PORTS HANDLED BY DEVICE MODES =====

/// Relay output command: output index u8, state u8.
pub const RELAY_PORT: u8 = 20;

/// Thermostat setpoint, centi-degrees as i16 big-endian.
pub const SETPOINT_PORT: u8 = 21;

// ===== ALARM KINDS (second byte of an alarm uplink) =====

/// Consecutive-hour burst on one or more counters.
pub const ALARM_BURST: u8 = 0x01;

/// Door contact changed state.
pub const ALARM_DOOR: u8 = 0x02;

// ===== SIZES =====

/// Largest uplink payload (EU868 DR0 application payload).
pub const MAX_PAYLOAD_LEN: usize = 51;

/// Largest downlink payload kept by the core.
pub const MAX_DOWNLINK_LEN: usize = 64;

/// Value substituted for a reading whose sensor failed.
pub const READING_SENTINEL: i32 = 0x7FFF_FFFF;
