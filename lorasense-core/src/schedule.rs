//! Transmit schedule: how often the node wakes and how many wakes per uplink

use crate::config::NodeConfig;
use crate::constants::schedule::{DEFAULT_TRANSMIT_INTERVAL_MS, DEFAULT_WAKEUPS_PER_UPLINK, TRANSMIT_INTERVAL_MIN_MS};
use crate::errors::{ConfigError, ConfigResult};

/// Scheduled-wake cadence and the running wake counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitSchedule {
    interval_ms: u32,
    wakeups_per_uplink: u16,
    wakeup_count: u32,
}

impl Default for TransmitSchedule {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_TRANSMIT_INTERVAL_MS,
            wakeups_per_uplink: DEFAULT_WAKEUPS_PER_UPLINK,
            wakeup_count: 0,
        }
    }
}

impl TransmitSchedule {
    /// Schedule from persisted configuration
    pub fn from_config(config: &NodeConfig) -> Self {
        Self {
            interval_ms: config.transmit_interval_ms.max(TRANSMIT_INTERVAL_MIN_MS),
            wakeups_per_uplink: config.wakeups_per_uplink.max(1),
            wakeup_count: 0,
        }
    }

    /// Scheduled wake period
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Scheduled wakes per uplink
    pub fn wakeups_per_uplink(&self) -> u16 {
        self.wakeups_per_uplink
    }

    /// Scheduled wakes since boot
    pub fn wakeup_count(&self) -> u32 {
        self.wakeup_count
    }

    /// Change the wake period; the old value stays on error
    pub fn set_interval(&mut self, interval_ms: u32) -> ConfigResult<()> {
        if interval_ms < TRANSMIT_INTERVAL_MIN_MS {
            return Err(ConfigError::IntervalBelowFloor {
                requested: interval_ms,
                floor: TRANSMIT_INTERVAL_MIN_MS,
            });
        }
        self.interval_ms = interval_ms;
        Ok(())
    }

    /// Change wakes per uplink; the old value stays on error
    pub fn set_wakeups_per_uplink(&mut self, wakeups: u16) -> ConfigResult<()> {
        if wakeups == 0 {
            return Err(ConfigError::WakeupsPerUplinkZero);
        }
        self.wakeups_per_uplink = wakeups;
        Ok(())
    }

    /// Count one scheduled wake
    pub fn record_wakeup(&mut self) -> u32 {
        self.wakeup_count = self.wakeup_count.wrapping_add(1);
        self.wakeup_count
    }

    /// Whether the current scheduled wake should send data
    pub fn uplink_due(&self) -> bool {
        self.wakeup_count % self.wakeups_per_uplink as u32 == 0
    }
}
