//! Error Types for the Node Core
//!
//! ## Design Philosophy
//!
//! Errors are returned from interrupt-adjacent code and from the CLI/downlink
//! configuration paths, so they follow the same rules as everything else on
//! the node:
//!
//! 1. **Small and `Copy`**: no heap, only `&'static str` for context.
//! 2. **Rejected at the point of change**: a configuration error never leaves
//!    partially applied state behind. The previous valid value stays in force
//!    and the caller decides whether to print or drop the diagnostic.
//! 3. **Never fatal**: nothing in the core halts on an error. Boot failures
//!    retry forever; runtime failures degrade to sentinel payloads.
//!
//! ## Error Categories
//!
//! ### Configuration
//! - [`ConfigError`]: a requested setting is below its floor or unsupported.
//! - [`ModeError`]: a device-mode change was refused.
//!
//! ### Collaborators
//! - [`StorageError`]: a persisted page is missing or unreadable.
//! - [`RadioError`]: the LoRaWAN stack refused or failed a request.
//! - [`SensorError`]: a peripheral read failed after driver retries.
//!
//! ```rust
//! use lorasense_core::errors::{ConfigError, ModeError};
//!
//! fn report(err: ModeError) -> &'static str {
//!     match err {
//!         ModeError::OutOfRange { .. } => "no such mode",
//!         ModeError::LegacyCounterConflict { .. } => "board cannot run this mode",
//!         ModeError::LoadFailed(_) => "mode config unreadable",
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for configuration changes
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Rejected configuration change
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Debounce interval below the interrupt-storm floor
    #[error("Debounce {requested} ms below floor {floor} ms")]
    DebounceBelowFloor {
        /// Interval that was asked for
        requested: u32,
        /// Smallest accepted interval
        floor: u32,
    },

    /// Leak timeout below its floor
    #[error("Leak timeout {requested} ms below floor {floor} ms")]
    LeakTimeoutBelowFloor {
        /// Timeout that was asked for
        requested: u32,
        /// Smallest accepted timeout
        floor: u32,
    },

    /// Consecutive burst hours required below its floor
    #[error("Burst hours {requested} below floor {floor}")]
    BurstHoursBelowFloor {
        /// Hours that were asked for
        requested: u8,
        /// Smallest accepted value
        floor: u8,
    },

    /// Transmit interval below its floor
    #[error("Transmit interval {requested} ms below floor {floor} ms")]
    IntervalBelowFloor {
        /// Interval that was asked for
        requested: u32,
        /// Smallest accepted interval
        floor: u32,
    },

    /// Wakeups per uplink must be at least one
    #[error("Wakeups per uplink must be non-zero")]
    WakeupsPerUplinkZero,

    /// Direction inversion requested on a channel without a direction pin
    #[error("Channel has no direction input")]
    DirectionUnsupported,

    /// Channel number outside 1..=3
    #[error("Unknown counter channel")]
    UnknownChannel,

    /// Active device mode does not expose this setting
    #[error("Not supported by the active mode")]
    Unsupported,

    /// Argument missing or unparsable
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with it
        reason: &'static str,
    },
}

/// Refused device-mode change
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeError {
    /// Mode index outside the table
    #[error("Mode index {index} out of range")]
    OutOfRange {
        /// Index that was asked for
        index: u8,
    },

    /// Mode needs a counter input that this board revision shares with the radio
    #[error("Mode {mode} conflicts with board counter wiring")]
    LegacyCounterConflict {
        /// Name of the refused mode
        mode: &'static str,
    },

    /// The incoming mode's persisted configuration could not be read
    #[error("Mode configuration unreadable: {0}")]
    LoadFailed(StorageError),
}

/// Persistence failure
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Page has never been written
    #[error("Page not found")]
    NotFound,

    /// Page contents failed validation
    #[error("Page corrupt")]
    Corrupt,

    /// Record does not fit in the page
    #[error("Record too large")]
    TooLarge,

    /// Flash driver reported a failure
    #[error("Storage I/O failure")]
    Io,
}

/// LoRaWAN collaborator failure
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// No session with the network yet
    #[error("Not joined")]
    NotJoined,

    /// Join or transmit did not complete in time
    #[error("Radio timeout")]
    Timeout,

    /// Duty-cycle or stack busy
    #[error("Radio busy")]
    Busy,

    /// Payload larger than the current data rate allows
    #[error("Payload too large")]
    PayloadTooLarge,
}

/// Peripheral read failure after driver-level retries
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Device did not answer in time
    #[error("Sensor timeout")]
    Timeout,

    /// Bus transaction was not acknowledged
    #[error("Sensor NACK")]
    Nack,

    /// Board has no such peripheral
    #[error("Sensor unsupported")]
    Unsupported,
}

/// Any error surfaced to the CLI or downlink handlers
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeError {
    /// Configuration change rejected
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Mode change rejected
    #[error("{0}")]
    Mode(#[from] ModeError),

    /// Persistence failed
    #[error("{0}")]
    Storage(#[from] StorageError),
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::DebounceBelowFloor { requested, floor } =>
                defmt::write!(fmt, "Debounce {} ms below floor {} ms", requested, floor),
            Self::LeakTimeoutBelowFloor { requested, floor } =>
                defmt::write!(fmt, "Leak timeout {} ms below floor {} ms", requested, floor),
            Self::BurstHoursBelowFloor { requested, floor } =>
                defmt::write!(fmt, "Burst hours {} below floor {}", requested, floor),
            Self::IntervalBelowFloor { requested, floor } =>
                defmt::write!(fmt, "Interval {} ms below floor {} ms", requested, floor),
            Self::WakeupsPerUplinkZero =>
                defmt::write!(fmt, "Wakeups per uplink is zero"),
            Self::DirectionUnsupported =>
                defmt::write!(fmt, "No direction input"),
            Self::UnknownChannel =>
                defmt::write!(fmt, "Unknown channel"),
            Self::Unsupported =>
                defmt::write!(fmt, "Unsupported by mode"),
            Self::InvalidArgument { reason } =>
                defmt::write!(fmt, "Invalid argument: {}", reason),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ModeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::OutOfRange { index } => defmt::write!(fmt, "Mode {} out of range", index),
            Self::LegacyCounterConflict { mode } =>
                defmt::write!(fmt, "Mode {} conflicts with counter wiring", mode),
            Self::LoadFailed(e) => defmt::write!(fmt, "Mode config: {}", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StorageError {
    fn format(&self, fmt: defmt::Formatter) {
        let s = match self {
            Self::NotFound => "not found",
            Self::Corrupt => "corrupt",
            Self::TooLarge => "too large",
            Self::Io => "io",
        };
        defmt::write!(fmt, "{}", s)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RadioError {
    fn format(&self, fmt: defmt::Formatter) {
        let s = match self {
            Self::NotJoined => "not joined",
            Self::Timeout => "timeout",
            Self::Busy => "busy",
            Self::PayloadTooLarge => "payload too large",
        };
        defmt::write!(fmt, "{}", s)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SensorError {
    fn format(&self, fmt: defmt::Formatter) {
        let s = match self {
            Self::Timeout => "timeout",
            Self::Nack => "nack",
            Self::Unsupported => "unsupported",
        };
        defmt::write!(fmt, "{}", s)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for NodeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Config(e) => defmt::write!(fmt, "{}", e),
            Self::Mode(e) => defmt::write!(fmt, "{}", e),
            Self::Storage(e) => defmt::write!(fmt, "{}", e),
        }
    }
}
