//! Schedule and Boot Timing Constants

/// Scheduled wake period for a fresh node (milliseconds).
pub const DEFAULT_TRANSMIT_INTERVAL_MS: u32 = 15 * 60 * 1000;

/// Smallest accepted transmit interval (milliseconds).
pub const TRANSMIT_INTERVAL_MIN_MS: u32 = 1000;

/// Scheduled wakes per uplink for a fresh node.
pub const DEFAULT_WAKEUPS_PER_UPLINK: u16 = 1;

/// Sleep between failed self-test/join attempts at boot (milliseconds).
pub const BOOT_RETRY_PENALTY_MS: u32 = 5 * 60 * 1000;

/// Longest a single join attempt may busy-wait (milliseconds).
pub const JOIN_TIMEOUT_MS: u64 = 30_000;

/// Window after boot during which console commands are accepted (milliseconds).
pub const CLI_WINDOW_MS: u64 = 30_000;

/// Minimum spacing between repeated configuration diagnostics (milliseconds).
pub const DIAGNOSTIC_INTERVAL_MS: u64 = 10_000;
