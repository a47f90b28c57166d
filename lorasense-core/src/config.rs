//! Node Configuration
//!
//! ## Overview
//!
//! [`NodeConfig`] is everything the node needs to come back up in the same
//! state after a reset: the selected device mode, the transmit schedule and
//! the three counter configurations. Device modes persist their own settings
//! (probe thresholds, setpoints) on their own pages.
//!
//! ## Persisted Layout
//!
//! Config page 0 holds a framed record (see [`crate::record`]), version 1:
//!
//! | field                   | type |
//! |-------------------------|------|
//! | mode index              | u8   |
//! | transmit interval (ms)  | u32  |
//! | wakeups per uplink      | u16  |
//! | per channel ×3: flags   | u8   |
//! |   debounce (ms)         | u32  |
//! |   leak timeout (ms)     | u32  |
//! |   burst threshold       | u32  |
//! |   burst hours required  | u8   |
//!
//! Channel flags: bit 0 = count on low level, bit 1 = direction pin present,
//! bit 2 = direction inverted.
//!
//! A record that decodes but fails validation is treated as corrupt, so a
//! half-valid configuration never reaches the running node.
//!
//! ## Example
//!
//! ```rust
//! use lorasense_core::config::NodeConfig;
//! use lorasense_core::mode::ModeId;
//!
//! let config = NodeConfig::default()
//!     .with_mode(ModeId::Counter2)
//!     .with_transmit_interval_ms(60_000)
//!     .unwrap();
//!
//! assert!(config.validate().is_ok());
//! ```

use crate::constants::counter::CHANNEL_COUNT;
use crate::constants::schedule::{
    DEFAULT_TRANSMIT_INTERVAL_MS, DEFAULT_WAKEUPS_PER_UPLINK, TRANSMIT_INTERVAL_MIN_MS,
};
use crate::counter::{CounterConfig, Direction, Polarity};
use crate::errors::{ConfigError, ConfigResult, StorageError};
use crate::events::Channel;
use crate::mode::ModeId;
use crate::record::{RecordReader, RecordWriter};

const CONFIG_MAGIC: u16 = 0x4C53;
const CONFIG_VERSION: u8 = 1;

const FLAG_POLARITY_LOW: u8 = 1 << 0;
const FLAG_DIRECTION: u8 = 1 << 1;
const FLAG_INVERT: u8 = 1 << 2;

/// Board facts that constrain which modes may run
///
/// Supplied by the board support package at construction, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HardwareCaps {
    /// The third counter input and the direction pin have their own EXTI
    /// lines (not shared with the radio DIO)
    pub legacy_counter_compatible: bool,
}

impl Default for HardwareCaps {
    fn default() -> Self {
        Self {
            legacy_counter_compatible: true,
        }
    }
}

/// Persisted node configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    /// Selected device mode
    pub mode: ModeId,

    /// Scheduled wake period
    pub transmit_interval_ms: u32,

    /// Scheduled wakes per uplink
    pub wakeups_per_uplink: u16,

    /// Per-channel counter settings
    pub counters: [CounterConfig; CHANNEL_COUNT],
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            mode: ModeId::Unconfigured,
            transmit_interval_ms: DEFAULT_TRANSMIT_INTERVAL_MS,
            wakeups_per_uplink: DEFAULT_WAKEUPS_PER_UPLINK,
            counters: [CounterConfig::default(); CHANNEL_COUNT],
        }
    }
}

impl NodeConfig {
    /// Check every field
    pub fn validate(&self) -> ConfigResult<()> {
        if self.transmit_interval_ms < TRANSMIT_INTERVAL_MIN_MS {
            return Err(ConfigError::IntervalBelowFloor {
                requested: self.transmit_interval_ms,
                floor: TRANSMIT_INTERVAL_MIN_MS,
            });
        }
        if self.wakeups_per_uplink == 0 {
            return Err(ConfigError::WakeupsPerUplinkZero);
        }
        for counter in &self.counters {
            counter.validate()?;
        }
        Ok(())
    }

    /// Copy with another device mode
    pub fn with_mode(mut self, mode: ModeId) -> Self {
        self.mode = mode;
        self
    }

    /// Copy with another transmit interval
    pub fn with_transmit_interval_ms(mut self, interval_ms: u32) -> ConfigResult<Self> {
        self.transmit_interval_ms = interval_ms;
        self.validate()?;
        Ok(self)
    }

    /// Copy with another wakeups-per-uplink ratio
    pub fn with_wakeups_per_uplink(mut self, wakeups: u16) -> ConfigResult<Self> {
        self.wakeups_per_uplink = wakeups;
        self.validate()?;
        Ok(self)
    }

    /// Copy with one channel's counter settings replaced
    pub fn with_counter(mut self, channel: Channel, config: CounterConfig) -> ConfigResult<Self> {
        config.validate()?;
        self.counters[channel.index()] = config;
        Ok(self)
    }

    /// Serialize into a config page buffer
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, StorageError> {
        let mut writer = RecordWriter::new(buf, CONFIG_MAGIC, CONFIG_VERSION)?;
        writer
            .put_u8(self.mode.index())?
            .put_u32(self.transmit_interval_ms)?
            .put_u16(self.wakeups_per_uplink)?;

        for counter in &self.counters {
            let mut flags = 0;
            if counter.polarity == Polarity::Low {
                flags |= FLAG_POLARITY_LOW;
            }
            if let Some(direction) = counter.direction {
                flags |= FLAG_DIRECTION;
                if direction.invert {
                    flags |= FLAG_INVERT;
                }
            }
            writer
                .put_u8(flags)?
                .put_u32(counter.debounce_ms)?
                .put_u32(counter.leak_timeout_ms)?
                .put_u32(counter.burst_threshold)?
                .put_u8(counter.burst_hours_required)?;
        }
        writer.finish()
    }

    /// Parse and validate a config page
    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        let mut reader = RecordReader::open(bytes, CONFIG_MAGIC, CONFIG_VERSION)?;
        let mode = ModeId::from_index(reader.get_u8()?).ok_or(StorageError::Corrupt)?;
        let transmit_interval_ms = reader.get_u32()?;
        let wakeups_per_uplink = reader.get_u16()?;

        let mut counters = [CounterConfig::default(); CHANNEL_COUNT];
        for counter in counters.iter_mut() {
            let flags = reader.get_u8()?;
            counter.polarity = if flags & FLAG_POLARITY_LOW != 0 {
                Polarity::Low
            } else {
                Polarity::High
            };
            counter.direction = (flags & FLAG_DIRECTION != 0).then_some(Direction {
                invert: flags & FLAG_INVERT != 0,
            });
            counter.debounce_ms = reader.get_u32()?;
            counter.leak_timeout_ms = reader.get_u32()?;
            counter.burst_threshold = reader.get_u32()?;
            counter.burst_hours_required = reader.get_u8()?;
        }

        let config = Self {
            mode,
            transmit_interval_ms,
            wakeups_per_uplink,
            counters,
        };
        config.validate().map_err(|_| StorageError::Corrupt)?;
        Ok(config)
    }
}
