//! The active device: selected descriptor plus its behaviour state

use super::counter::{CounterAlarmMode, CounterMode};
use super::digital::{DigitalInputsMode, DoorContactMode, RelayMode};
use super::modbus::ModbusMode;
use super::probe::ProbeMode;
use super::table::{ModeDescriptor, ModeId};
use super::thermostat::ThermostatMode;
use super::{CliCaps, DeviceMode, ModeContext};
use crate::board::{Board, Downlink, PageId, Storage};
use crate::errors::{ConfigResult, StorageError};
use crate::events::Channel;

/// Mode 0: nothing configured yet, only the CLI works
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unconfigured;

impl DeviceMode for Unconfigured {}

/// Closed set of behaviours the mode table can build
#[derive(Debug)]
#[allow(missing_docs)]
pub enum Behaviour {
    Unconfigured(Unconfigured),
    Counter(CounterMode),
    CounterAlarms(CounterAlarmMode),
    DoorContact(DoorContactMode),
    DigitalInputs(DigitalInputsMode),
    Relay(RelayMode),
    Probe(ProbeMode),
    Modbus(ModbusMode),
    Thermostat(ThermostatMode),
}

macro_rules! dispatch {
    ($behaviour:expr, $mode:ident => $call:expr) => {
        match $behaviour {
            Behaviour::Unconfigured($mode) => $call,
            Behaviour::Counter($mode) => $call,
            Behaviour::CounterAlarms($mode) => $call,
            Behaviour::DoorContact($mode) => $call,
            Behaviour::DigitalInputs($mode) => $call,
            Behaviour::Relay($mode) => $call,
            Behaviour::Probe($mode) => $call,
            Behaviour::Modbus($mode) => $call,
            Behaviour::Thermostat($mode) => $call,
        }
    };
}

/// Selected mode descriptor and its live behaviour
///
/// Replaced as a whole by a mode change, so the scheduler never sees a
/// descriptor paired with another mode's state.
#[derive(Debug)]
pub struct ActiveDevice {
    descriptor: &'static ModeDescriptor,
    behaviour: Behaviour,
}

impl Default for ActiveDevice {
    fn default() -> Self {
        Self::new(ModeId::Unconfigured)
    }
}

impl ActiveDevice {
    /// Fresh behaviour for `mode`
    pub fn new(mode: ModeId) -> Self {
        let descriptor = mode.descriptor();
        Self {
            descriptor,
            behaviour: (descriptor.build)(),
        }
    }

    /// Table entry of the active mode
    pub fn descriptor(&self) -> &'static ModeDescriptor {
        self.descriptor
    }

    /// Active mode
    pub fn id(&self) -> ModeId {
        self.descriptor.id
    }

    /// CLI command groups of the active mode
    pub fn cli_commands(&self) -> CliCaps {
        self.descriptor.cli_commands
    }

    /// Live behaviour state
    pub fn behaviour(&self) -> &Behaviour {
        &self.behaviour
    }
}

impl DeviceMode for ActiveDevice {
    fn counter_channels(&self) -> &'static [Channel] {
        dispatch!(&self.behaviour, mode => mode.counter_channels())
    }

    fn direction_channels(&self) -> &'static [Channel] {
        dispatch!(&self.behaviour, mode => mode.direction_channels())
    }

    fn init<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        dispatch!(&mut self.behaviour, mode => mode.init(ctx))
    }

    fn on_each_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        dispatch!(&mut self.behaviour, mode => mode.on_each_wakeup(ctx))
    }

    fn on_scheduled_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        dispatch!(&mut self.behaviour, mode => mode.on_scheduled_wakeup(ctx))
    }

    fn on_hourly_alarm<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        dispatch!(&mut self.behaviour, mode => mode.on_hourly_alarm(ctx))
    }

    fn on_count_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        dispatch!(&mut self.behaviour, mode => mode.on_count_wakeup(ctx))
    }

    fn on_downlink<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>, downlink: &Downlink) {
        dispatch!(&mut self.behaviour, mode => mode.on_downlink(ctx, downlink))
    }

    fn self_test<B: Board>(&mut self, board: &mut B) -> bool {
        dispatch!(&mut self.behaviour, mode => mode.self_test(board))
    }

    fn save_config<S: Storage>(&self, storage: &mut S, page: PageId) -> Result<(), StorageError> {
        dispatch!(&self.behaviour, mode => mode.save_config(storage, page))
    }

    fn load_config<S: Storage>(&mut self, storage: &mut S, page: PageId) -> Result<(), StorageError> {
        dispatch!(&mut self.behaviour, mode => mode.load_config(storage, page))
    }

    fn save_data<S: Storage>(&self, storage: &mut S, page: PageId) -> Result<(), StorageError> {
        dispatch!(&self.behaviour, mode => mode.save_data(storage, page))
    }

    fn load_data<S: Storage>(&mut self, storage: &mut S, page: PageId) -> Result<(), StorageError> {
        dispatch!(&mut self.behaviour, mode => mode.load_data(storage, page))
    }

    fn cli_set_thresholds(&mut self, args: &[&str]) -> ConfigResult<()> {
        dispatch!(&mut self.behaviour, mode => mode.cli_set_thresholds(args))
    }

    fn cli_device_specific<B: Board>(
        &mut self,
        ctx: &mut ModeContext<'_, B>,
        args: &[&str],
    ) -> ConfigResult<()> {
        dispatch!(&mut self.behaviour, mode => mode.cli_device_specific(ctx, args))
    }
}
