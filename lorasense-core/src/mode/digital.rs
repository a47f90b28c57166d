//! Digital I/O modes: door contact, input bitmap, relay outputs

use super::payload::Payload;
use super::table::ModeId;
use super::{arg, flag_arg, DeviceMode, ModeContext};
use crate::board::{Board, Downlink, PageId, SensorKind, Storage};
use crate::constants::device::RELAY_OUTPUTS;
use crate::constants::payload::{ALARM_DOOR, ALARM_PORT, DATA_PORT, RELAY_PORT};
use crate::errors::{ConfigError, ConfigResult, StorageError};
use crate::events::Channel;
use crate::record::{RecordReader, RecordWriter, PAGE_SIZE};

const RELAY_MAGIC: u16 = 0x524C;
const RELAY_VERSION: u8 = 1;

// ===== DOOR CONTACT =====

/// Reed contact on input 1; every settled change is uplinked at once
///
/// Openings are also counted by the counter engine, so the periodic uplink
/// carries the number of openings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DoorContactMode {
    open: Option<bool>,
}

impl DoorContactMode {
    /// Contact state unknown until the first sample
    pub fn new() -> Self {
        Self::default()
    }

    /// Last settled contact state
    pub fn is_open(&self) -> Option<bool> {
        self.open
    }

    fn sample<B: Board>(ctx: &mut ModeContext<'_, B>) -> Option<bool> {
        ctx.read(SensorKind::DigitalInputs).ok().map(|bits| bits & 1 != 0)
    }
}

impl DeviceMode for DoorContactMode {
    fn counter_channels(&self) -> &'static [Channel] {
        &[Channel::One]
    }

    fn init<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        self.open = Self::sample(ctx);
    }

    fn on_each_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        // Wait for the input to settle before trusting the level
        if ctx.counters.channel(Channel::One).is_settling() {
            return;
        }
        let Some(open) = Self::sample(ctx) else {
            return;
        };
        let previous = self.open.replace(open);
        if previous.is_none() || previous == Some(open) {
            return;
        }

        let openings = ctx.counters.channel(Channel::One).count();
        let mut payload = Payload::for_mode(ModeId::DoorContact);
        let built = payload
            .push_u8(ALARM_DOOR)
            .and_then(|p| p.push_u8(open as u8))
            .and_then(|p| p.push_u32(openings))
            .is_ok();
        if built {
            info!("door {}", if open { "opened" } else { "closed" });
            ctx.uplink(ALARM_PORT, &payload);
        }
    }

    fn on_scheduled_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        if !ctx.schedule.uplink_due() {
            return;
        }
        let openings = ctx.counters.channel(Channel::One).count();
        let mut payload = Payload::for_mode(ModeId::DoorContact);
        let state = self.open.map_or(0xFF, |open| open as u8);
        if payload.push_u8(state).and_then(|p| p.push_u32(openings)).is_ok() {
            ctx.uplink(DATA_PORT, &payload);
        }
    }
}

// ===== DIGITAL INPUTS =====

/// Periodic bitmap of all digital inputs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DigitalInputsMode;

impl DigitalInputsMode {
    /// Input bitmap reporter
    pub fn new() -> Self {
        Self
    }
}

impl DeviceMode for DigitalInputsMode {
    fn on_scheduled_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        if !ctx.schedule.uplink_due() {
            return;
        }
        let inputs = ctx.read(SensorKind::DigitalInputs);
        let mut payload = Payload::for_mode(ModeId::DigitalInputs);
        if payload.push_reading(inputs).is_ok() {
            ctx.uplink(DATA_PORT, &payload);
        }
    }
}

// ===== RELAY OUTPUT =====

/// Class C relay board driven by downlinks on [`RELAY_PORT`]
///
/// Output states are persisted as runtime data and re-applied on init.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelayMode {
    outputs: u8,
}

impl RelayMode {
    /// All outputs off
    pub fn new() -> Self {
        Self::default()
    }

    /// Output bitmap, bit n = output n
    pub fn outputs(&self) -> u8 {
        self.outputs
    }

    fn drive<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>, index: u8, on: bool) -> ConfigResult<()> {
        if index >= RELAY_OUTPUTS {
            return Err(ConfigError::InvalidArgument { reason: "relay index" });
        }
        ctx.board
            .set_output(index, on)
            .map_err(|_| ConfigError::Unsupported)?;
        if on {
            self.outputs |= 1 << index;
        } else {
            self.outputs &= !(1 << index);
        }
        debug!("relay {} -> {}", index, on);
        Ok(())
    }
}

impl DeviceMode for RelayMode {
    fn init<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        for index in 0..RELAY_OUTPUTS {
            let on = self.outputs & (1 << index) != 0;
            if let Err(err) = self.drive(ctx, index, on) {
                warn!("relay {} restore failed: {:?}", index, err);
            }
        }
    }

    fn on_scheduled_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        if !ctx.schedule.uplink_due() {
            return;
        }
        let mut payload = Payload::for_mode(ModeId::RelayOutput);
        if payload.push_u8(self.outputs).is_ok() {
            ctx.uplink(DATA_PORT, &payload);
        }
    }

    fn on_downlink<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>, downlink: &Downlink) {
        if downlink.port != RELAY_PORT {
            debug!("relay ignores port {}", downlink.port);
            return;
        }
        match downlink.data.as_slice() {
            [index, state] => {
                if let Err(err) = self.drive(ctx, *index, *state != 0) {
                    warn!("relay downlink rejected: {:?}", err);
                }
            }
            _ => warn!("relay downlink length {}", downlink.data.len()),
        }
    }

    fn save_data<S: Storage>(&self, storage: &mut S, page: PageId) -> Result<(), StorageError> {
        let mut buf = [0u8; PAGE_SIZE];
        let mut writer = RecordWriter::new(&mut buf, RELAY_MAGIC, RELAY_VERSION)?;
        writer.put_u8(self.outputs)?;
        let len = writer.finish()?;
        storage.save_data_page(page, &buf[..len])
    }

    fn load_data<S: Storage>(&mut self, storage: &mut S, page: PageId) -> Result<(), StorageError> {
        let mut buf = [0u8; PAGE_SIZE];
        let len = storage.load_data_page(page, &mut buf)?;
        let mut reader = RecordReader::open(&buf[..len], RELAY_MAGIC, RELAY_VERSION)?;
        self.outputs = reader.get_u8()?;
        Ok(())
    }

    fn cli_device_specific<B: Board>(
        &mut self,
        ctx: &mut ModeContext<'_, B>,
        args: &[&str],
    ) -> ConfigResult<()> {
        match args.first().copied() {
            Some("relay") => {
                let index = arg(args, 1, "relay index")?;
                let on = flag_arg(args, 2, "relay state")?;
                self.drive(ctx, index, on)
            }
            _ => Err(ConfigError::InvalidArgument { reason: "expected: relay <index> <on|off>" }),
        }
    }
}
