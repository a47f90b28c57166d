//! Modbus meter modes
//!
//! The modbus transport lives in the sensor layer; these modes only choose
//! which registers to poll and how to lay them out:
//!
//! ```text
//! [mode] then one i32 per register (sentinel when the meter did not answer)
//! ```

use heapless::Vec;

use super::payload::Payload;
use super::table::ModeId;
use super::{arg, DeviceMode, ModeContext};
use crate::board::{Board, PageId, SensorKind, Storage};
use crate::constants::device::DEFAULT_MODBUS_REGISTER;
use crate::constants::payload::DATA_PORT;
use crate::errors::{ConfigError, ConfigResult, RadioError, StorageError};
use crate::record::{RecordReader, RecordWriter, PAGE_SIZE};

const REGISTER_MAGIC: u16 = 0x4D42;
const REGISTER_VERSION: u8 = 1;
const MAX_REGISTERS: usize = 4;

/// Meter polled over modbus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModbusMode {
    id: ModeId,
    registers: Vec<SensorKind, MAX_REGISTERS>,
    configurable: bool,
}

impl ModbusMode {
    /// Meter with a fixed register map
    pub fn fixed(id: ModeId, registers: &[SensorKind]) -> Self {
        let mut map = Vec::new();
        for register in registers.iter().take(MAX_REGISTERS) {
            let _ = map.push(*register);
        }
        Self {
            id,
            registers: map,
            configurable: false,
        }
    }

    /// Single holding register chosen from the console
    pub fn generic(id: ModeId) -> Self {
        let mut mode = Self::fixed(id, &[SensorKind::Register(DEFAULT_MODBUS_REGISTER)]);
        mode.configurable = true;
        mode
    }

    /// Registers polled on each uplink
    pub fn registers(&self) -> &[SensorKind] {
        &self.registers
    }

    fn set_register(&mut self, address: u16) {
        self.registers.clear();
        let _ = self.registers.push(SensorKind::Register(address));
    }

    fn register_address(&self) -> Option<u16> {
        match self.registers.first() {
            Some(SensorKind::Register(address)) => Some(*address),
            _ => None,
        }
    }

    fn encode<B: Board>(&self, ctx: &mut ModeContext<'_, B>) -> Result<Payload, RadioError> {
        let mut payload = Payload::for_mode(self.id);
        for register in &self.registers {
            payload.push_reading(ctx.read(*register))?;
        }
        Ok(payload)
    }
}

impl DeviceMode for ModbusMode {
    fn on_scheduled_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        if !ctx.schedule.uplink_due() {
            return;
        }
        match self.encode(ctx) {
            Ok(payload) => {
                ctx.uplink(DATA_PORT, &payload);
            }
            Err(err) => error!("modbus payload: {:?}", err),
        }
    }

    fn self_test<B: Board>(&mut self, board: &mut B) -> bool {
        self.registers.first().map_or(true, |register| board.read(*register).is_ok())
    }

    fn save_config<S: Storage>(&self, storage: &mut S, page: PageId) -> Result<(), StorageError> {
        let Some(address) = self.register_address().filter(|_| self.configurable) else {
            return Ok(());
        };
        let mut buf = [0u8; PAGE_SIZE];
        let mut writer = RecordWriter::new(&mut buf, REGISTER_MAGIC, REGISTER_VERSION)?;
        writer.put_u16(address)?;
        let len = writer.finish()?;
        storage.save_config_page(page, &buf[..len])
    }

    fn load_config<S: Storage>(&mut self, storage: &mut S, page: PageId) -> Result<(), StorageError> {
        if !self.configurable {
            return Ok(());
        }
        let mut buf = [0u8; PAGE_SIZE];
        let len = storage.load_config_page(page, &mut buf)?;
        let mut reader = RecordReader::open(&buf[..len], REGISTER_MAGIC, REGISTER_VERSION)?;
        let address = reader.get_u16()?;
        self.set_register(address);
        Ok(())
    }

    fn cli_device_specific<B: Board>(
        &mut self,
        _ctx: &mut ModeContext<'_, B>,
        args: &[&str],
    ) -> ConfigResult<()> {
        if !self.configurable {
            return Err(ConfigError::Unsupported);
        }
        match args.first().copied() {
            Some("register") => {
                let address = arg(args, 1, "register address")?;
                self.set_register(address);
                Ok(())
            }
            _ => Err(ConfigError::InvalidArgument { reason: "expected: register <address>" }),
        }
    }
}
