//! Per-channel counter configuration

use crate::constants::counter::{
    BURST_HOURS_MIN, DEBOUNCE_MIN_MS, DEFAULT_BURST_HOURS, DEFAULT_BURST_THRESHOLD,
    DEFAULT_DEBOUNCE_MS, DEFAULT_LEAK_TIMEOUT_MS, LEAK_TIMEOUT_MIN_MS,
};
use crate::errors::{ConfigError, ConfigResult};

/// Settled level that produces a count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Count when the input settles high
    #[default]
    High,
    /// Count when the input settles low
    Low,
}

impl Polarity {
    /// Whether a settled `level` is countable
    pub const fn accepts(self, level: bool) -> bool {
        match self {
            Polarity::High => level,
            Polarity::Low => !level,
        }
    }
}

/// Companion direction pin settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Direction {
    /// Swap forward and reverse
    pub invert: bool,
}

impl Direction {
    /// Whether a sampled direction level means forward flow
    pub const fn is_forward(self, level: bool) -> bool {
        level != self.invert
    }
}

/// Configuration of one count input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterConfig {
    /// Settling time after the last edge before a level is trusted
    pub debounce_ms: u32,

    /// Level that produces a count
    pub polarity: Polarity,

    /// Direction pin, when the channel has one
    pub direction: Option<Direction>,

    /// Quiet period that clears the leak flag
    pub leak_timeout_ms: u32,

    /// Hourly delta above which the hour is a burst (0 = disabled)
    pub burst_threshold: u32,

    /// Consecutive burst hours that raise the burst alarm
    pub burst_hours_required: u8,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            polarity: Polarity::High,
            direction: None,
            leak_timeout_ms: DEFAULT_LEAK_TIMEOUT_MS,
            burst_threshold: DEFAULT_BURST_THRESHOLD,
            burst_hours_required: DEFAULT_BURST_HOURS,
        }
    }
}

impl CounterConfig {
    /// Check every field against its floor
    pub fn validate(&self) -> ConfigResult<()> {
        check_debounce(self.debounce_ms)?;
        check_leak_timeout(self.leak_timeout_ms)?;
        check_burst_hours(self.burst_hours_required)?;
        Ok(())
    }

    /// Copy with a new debounce interval
    pub fn with_debounce_ms(mut self, debounce_ms: u32) -> ConfigResult<Self> {
        check_debounce(debounce_ms)?;
        self.debounce_ms = debounce_ms;
        Ok(self)
    }

    /// Copy with a new leak timeout
    pub fn with_leak_timeout_ms(mut self, leak_timeout_ms: u32) -> ConfigResult<Self> {
        check_leak_timeout(leak_timeout_ms)?;
        self.leak_timeout_ms = leak_timeout_ms;
        Ok(self)
    }

    /// Copy with new burst detection settings
    pub fn with_burst(mut self, threshold: u32, hours_required: u8) -> ConfigResult<Self> {
        check_burst_hours(hours_required)?;
        self.burst_threshold = threshold;
        self.burst_hours_required = hours_required;
        Ok(self)
    }

    /// Copy with a direction pin declared
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Copy with direction inversion changed
    ///
    /// Only channels that declare a direction pin accept this.
    pub fn with_direction_inverted(mut self, invert: bool) -> ConfigResult<Self> {
        match self.direction.as_mut() {
            Some(direction) => {
                direction.invert = invert;
                Ok(self)
            }
            None => Err(ConfigError::DirectionUnsupported),
        }
    }

    /// Copy with a new accept polarity
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }
}

fn check_debounce(debounce_ms: u32) -> ConfigResult<()> {
    if debounce_ms < DEBOUNCE_MIN_MS {
        return Err(ConfigError::DebounceBelowFloor {
            requested: debounce_ms,
            floor: DEBOUNCE_MIN_MS,
        });
    }
    Ok(())
}

fn check_leak_timeout(leak_timeout_ms: u32) -> ConfigResult<()> {
    if leak_timeout_ms < LEAK_TIMEOUT_MIN_MS {
        return Err(ConfigError::LeakTimeoutBelowFloor {
            requested: leak_timeout_ms,
            floor: LEAK_TIMEOUT_MIN_MS,
        });
    }
    Ok(())
}

fn check_burst_hours(hours: u8) -> ConfigResult<()> {
    if hours < BURST_HOURS_MIN {
        return Err(ConfigError::BurstHoursBelowFloor {
            requested: hours,
            floor: BURST_HOURS_MIN,
        });
    }
    Ok(())
}
