//! Device Modes
//!
//! ## Overview
//!
//! One firmware image drives 21 sensor personalities. Each personality is a
//! *device mode*: a type implementing [`DeviceMode`]. The scheduler only ever
//! talks to the trait, so the wake loop is identical whether the node is
//! counting pulses, reading a CO2 sensor or driving a relay.
//!
//! ```text
//!                 ┌─────────────────────┐
//!  mode index ──→ │ MODE_TABLE[index]   │ ──→ ModeDescriptor { name, caps, class C, legacy, build }
//!                 └─────────────────────┘                                                   │
//!                                                                                           ↓
//!  scheduler ──→ ActiveDevice ──→ match Behaviour { Counter(..), Probe(..), Relay(..), … } ──→ hook
//! ```
//!
//! ## Hook Contract
//!
//! Every hook has a no-op default, so a mode only writes the hooks it cares
//! about. Per scheduler pass the order is fixed:
//!
//! 1. [`DeviceMode::on_count_wakeup`] if a debounced count was accepted
//! 2. [`DeviceMode::on_hourly_alarm`] if an hour boundary passed
//! 3. [`DeviceMode::on_each_wakeup`], always, exactly once
//!
//! [`DeviceMode::on_scheduled_wakeup`] runs once per transmit interval, after
//! the scheduler returns. Hooks must return promptly: a hook that never
//! returns starves the scheduler until the watchdog resets the node.
//!
//! ## Persistence
//!
//! Modes that have settings of their own (thresholds, setpoints, register
//! addresses) persist them through [`DeviceMode::save_config`] on the page
//! [`PageId::for_mode`] gives for their index. The core saves after every CLI
//! or downlink change it routes to the mode.

mod active;
mod counter;
mod digital;
mod modbus;
mod payload;
mod probe;
mod table;
mod thermostat;

pub use active::{ActiveDevice, Behaviour, Unconfigured};
pub use counter::{CounterAlarmMode, CounterMode};
pub use digital::{DigitalInputsMode, DoorContactMode, RelayMode};
pub use modbus::ModbusMode;
pub use payload::{Payload, PayloadResult};
pub use probe::{ProbeMode, Thresholds};
pub use table::{ModeDescriptor, ModeId, MODE_TABLE};
pub use thermostat::ThermostatMode;

use crate::board::{Board, Downlink, PageId, SensorKind, Storage};
use crate::counter::{ChannelMask, CounterEngine};
use crate::errors::{ConfigError, ConfigResult, SensorError, StorageError};
use crate::events::Channel;
use crate::schedule::TransmitSchedule;
use crate::time::Timestamp;
use crate::timer::TimerBank;

/// CLI command groups a mode accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CliCaps(u8);

impl CliCaps {
    /// Only the core commands
    pub const NONE: CliCaps = CliCaps(0);
    /// debounce / leak / burst / count / invert
    pub const COUNTERS: CliCaps = CliCaps(1 << 0);
    /// thresholds
    pub const THRESHOLDS: CliCaps = CliCaps(1 << 1);
    /// device
    pub const DEVICE: CliCaps = CliCaps(1 << 2);

    /// Both sets of commands
    pub const fn union(self, other: CliCaps) -> CliCaps {
        CliCaps(self.0 | other.0)
    }

    /// Whether every command in `other` is accepted
    pub const fn contains(self, other: CliCaps) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bitmask
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// What a hook may touch while it runs
pub struct ModeContext<'a, B> {
    /// Hardware collaborators
    pub board: &'a mut B,
    /// Shared pulse counters
    pub counters: &'a mut CounterEngine,
    /// Software timers (leak re-latch restarts a timer)
    pub timers: &'a mut TimerBank,
    /// Transmit cadence
    pub schedule: &'a TransmitSchedule,
    /// Monotonic time at hook entry
    pub now: Timestamp,
}

impl<'a, B: Board> ModeContext<'a, B> {
    /// Send `payload`; failures are logged and reported as `false`
    pub fn uplink(&mut self, port: u8, payload: &Payload) -> bool {
        match self.board.uplink(port, payload.as_bytes()) {
            Ok(()) => {
                debug!("uplink port {} ({} bytes)", port, payload.len());
                true
            }
            Err(err) => {
                warn!("uplink port {} failed: {:?}", port, err);
                false
            }
        }
    }

    /// Report leak flags and re-latch them for the next interval
    pub fn relatch_leaks(&mut self) -> ChannelMask {
        self.counters.relatch_leaks(self.timers, self.now)
    }

    /// Read a sensor, logging failures
    pub fn read(&mut self, kind: SensorKind) -> Result<i32, SensorError> {
        self.board.read(kind).map_err(|err| {
            warn!("sensor {:?} read failed: {:?}", kind, err);
            err
        })
    }
}

/// Behaviour of one sensor personality
///
/// All hooks default to doing nothing; `self_test` defaults to passing.
pub trait DeviceMode {
    /// Counter inputs this mode uses
    fn counter_channels(&self) -> &'static [Channel] {
        &[]
    }

    /// Counter inputs qualified by a direction pin; the others count forward only
    fn direction_channels(&self) -> &'static [Channel] {
        &[]
    }

    /// Mode became active
    fn init<B: Board>(&mut self, _ctx: &mut ModeContext<'_, B>) {}

    /// Every scheduler pass, after any cause-specific hook
    fn on_each_wakeup<B: Board>(&mut self, _ctx: &mut ModeContext<'_, B>) {}

    /// Once per transmit interval; usually sends data
    fn on_scheduled_wakeup<B: Board>(&mut self, _ctx: &mut ModeContext<'_, B>) {}

    /// An RTC hour boundary passed
    fn on_hourly_alarm<B: Board>(&mut self, _ctx: &mut ModeContext<'_, B>) {}

    /// A debounced count was accepted
    fn on_count_wakeup<B: Board>(&mut self, _ctx: &mut ModeContext<'_, B>) {}

    /// Downlink on a port the core does not handle
    fn on_downlink<B: Board>(&mut self, _ctx: &mut ModeContext<'_, B>, _downlink: &Downlink) {}

    /// Check the mode's peripherals at boot
    fn self_test<B: Board>(&mut self, _board: &mut B) -> bool {
        true
    }

    /// Persist mode settings
    fn save_config<S: Storage>(&self, _storage: &mut S, _page: PageId) -> Result<(), StorageError> {
        Ok(())
    }

    /// Restore mode settings
    fn load_config<S: Storage>(&mut self, _storage: &mut S, _page: PageId) -> Result<(), StorageError> {
        Ok(())
    }

    /// Persist mode runtime data
    fn save_data<S: Storage>(&self, _storage: &mut S, _page: PageId) -> Result<(), StorageError> {
        Ok(())
    }

    /// Restore mode runtime data
    fn load_data<S: Storage>(&mut self, _storage: &mut S, _page: PageId) -> Result<(), StorageError> {
        Ok(())
    }

    /// `thresholds …` console command
    fn cli_set_thresholds(&mut self, _args: &[&str]) -> ConfigResult<()> {
        Err(ConfigError::Unsupported)
    }

    /// `device …` console command
    fn cli_device_specific<B: Board>(
        &mut self,
        _ctx: &mut ModeContext<'_, B>,
        _args: &[&str],
    ) -> ConfigResult<()> {
        Err(ConfigError::Unsupported)
    }
}

/// Parse positional argument `index`
pub(crate) fn arg<T: core::str::FromStr>(args: &[&str], index: usize, reason: &'static str) -> ConfigResult<T> {
    args.get(index)
        .and_then(|raw| raw.parse().ok())
        .ok_or(ConfigError::InvalidArgument { reason })
}

/// Parse a `0`/`1`/`on`/`off` flag
pub(crate) fn flag_arg(args: &[&str], index: usize, reason: &'static str) -> ConfigResult<bool> {
    match args.get(index).copied() {
        Some("1") | Some("on") => Ok(true),
        Some("0") | Some("off") => Ok(false),
        _ => Err(ConfigError::InvalidArgument { reason }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_union_and_contains() {
        let caps = CliCaps::COUNTERS.union(CliCaps::DEVICE);
        assert!(caps.contains(CliCaps::COUNTERS));
        assert!(caps.contains(CliCaps::DEVICE));
        assert!(!caps.contains(CliCaps::THRESHOLDS));
        assert!(caps.contains(CliCaps::NONE));
    }

    #[test]
    fn argument_parsing() {
        let args = ["12", "x", "on"];
        assert_eq!(arg::<u32>(&args, 0, "n"), Ok(12));
        assert_eq!(arg::<u32>(&args, 1, "n"), Err(ConfigError::InvalidArgument { reason: "n" }));
        assert_eq!(arg::<u32>(&args, 5, "n"), Err(ConfigError::InvalidArgument { reason: "n" }));
        assert_eq!(flag_arg(&args, 2, "f"), Ok(true));
    }
}
