//! Thermostat mode
//!
//! Class C so a setpoint downlink takes effect without waiting for the next
//! uplink. Output 0 drives the heater with a symmetric dead band around the
//! setpoint. Uplink: `[mode][temperature i32][setpoint i32][heating u8]`.

use super::payload::Payload;
use super::table::ModeId;
use super::{arg, DeviceMode, ModeContext};
use crate::board::{Board, Downlink, PageId, SensorKind, Storage};
use crate::constants::device::{DEFAULT_SETPOINT_CENTI, THERMOSTAT_HYSTERESIS_CENTI};
use crate::constants::payload::{DATA_PORT, SETPOINT_PORT};
use crate::errors::{ConfigError, ConfigResult, RadioError, SensorError, StorageError};
use crate::record::{RecordReader, RecordWriter, PAGE_SIZE};

const SETPOINT_MAGIC: u16 = 0x5448;
const SETPOINT_VERSION: u8 = 1;
const HEATER_OUTPUT: u8 = 0;

/// Heater controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThermostatMode {
    setpoint: i32,
    heating: bool,
}

impl Default for ThermostatMode {
    fn default() -> Self {
        Self::new()
    }
}

impl ThermostatMode {
    /// Default setpoint, heater off
    pub fn new() -> Self {
        Self {
            setpoint: DEFAULT_SETPOINT_CENTI,
            heating: false,
        }
    }

    /// Target temperature, centi-degrees
    pub fn setpoint(&self) -> i32 {
        self.setpoint
    }

    /// Whether the heater output is on
    pub fn heating(&self) -> bool {
        self.heating
    }

    /// Heater state wanted for `temperature`
    pub fn demand(&self, temperature: i32) -> bool {
        if temperature < self.setpoint - THERMOSTAT_HYSTERESIS_CENTI {
            true
        } else if temperature > self.setpoint + THERMOSTAT_HYSTERESIS_CENTI {
            false
        } else {
            self.heating
        }
    }

    fn regulate<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) -> Result<i32, SensorError> {
        let temperature = match ctx.read(SensorKind::Temperature) {
            Ok(temperature) => temperature,
            Err(err) => {
                // Heater stays off while the temperature is unknown
                self.switch(ctx, false);
                return Err(err);
            }
        };
        let wanted = self.demand(temperature);
        self.switch(ctx, wanted);
        Ok(temperature)
    }

    fn switch<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>, on: bool) {
        if on == self.heating {
            return;
        }
        match ctx.board.set_output(HEATER_OUTPUT, on) {
            Ok(()) => {
                info!("heater {}", if on { "on" } else { "off" });
                self.heating = on;
            }
            Err(err) => warn!("heater output: {:?}", err),
        }
    }

    fn encode(&self, temperature: Result<i32, SensorError>) -> Result<Payload, RadioError> {
        let mut payload = Payload::for_mode(ModeId::Thermostat);
        payload
            .push_reading(temperature)?
            .push_i32(self.setpoint)?
            .push_u8(self.heating as u8)?;
        Ok(payload)
    }
}

impl DeviceMode for ThermostatMode {
    fn init<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        self.heating = false;
        if let Err(err) = ctx.board.set_output(HEATER_OUTPUT, false) {
            warn!("heater output: {:?}", err);
        }
    }

    fn on_scheduled_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        let temperature = self.regulate(ctx);
        if !ctx.schedule.uplink_due() {
            return;
        }
        match self.encode(temperature) {
            Ok(payload) => {
                ctx.uplink(DATA_PORT, &payload);
            }
            Err(err) => error!("thermostat payload: {:?}", err),
        }
    }

    fn on_downlink<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>, downlink: &Downlink) {
        match (downlink.port, downlink.data.as_slice()) {
            (SETPOINT_PORT, [hi, lo]) => {
                self.setpoint = i16::from_be_bytes([*hi, *lo]) as i32;
                info!("setpoint {}", self.setpoint);
                let _ = self.regulate(ctx);
            }
            (port, _) => warn!("thermostat ignores downlink on port {}", port),
        }
    }

    fn self_test<B: Board>(&mut self, board: &mut B) -> bool {
        board.read(SensorKind::Temperature).is_ok()
    }

    fn save_config<S: Storage>(&self, storage: &mut S, page: PageId) -> Result<(), StorageError> {
        let mut buf = [0u8; PAGE_SIZE];
        let mut writer = RecordWriter::new(&mut buf, SETPOINT_MAGIC, SETPOINT_VERSION)?;
        writer.put_i32(self.setpoint)?;
        let len = writer.finish()?;
        storage.save_config_page(page, &buf[..len])
    }

    fn load_config<S: Storage>(&mut self, storage: &mut S, page: PageId) -> Result<(), StorageError> {
        let mut buf = [0u8; PAGE_SIZE];
        let len = storage.load_config_page(page, &mut buf)?;
        let mut reader = RecordReader::open(&buf[..len], SETPOINT_MAGIC, SETPOINT_VERSION)?;
        self.setpoint = reader.get_i32()?;
        Ok(())
    }

    fn cli_device_specific<B: Board>(
        &mut self,
        ctx: &mut ModeContext<'_, B>,
        args: &[&str],
    ) -> ConfigResult<()> {
        match args.first().copied() {
            Some("setpoint") => {
                self.setpoint = arg(args, 1, "setpoint (centi-degrees)")?;
                let _ = self.regulate(ctx);
                Ok(())
            }
            _ => Err(ConfigError::InvalidArgument { reason: "expected: setpoint <centi-degrees>" }),
        }
    }
}
