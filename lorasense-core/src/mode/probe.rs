//! Probe modes: temperature, humidity, CO2, light, pressure, analog, distance
//!
//! A probe reads its quantities on every scheduled wake but only uplinks on
//! every Nth wake (`wakeups_per_uplink`), unless the primary reading leaves
//! the configured low/high window, in which case it uplinks immediately.
//!
//! Data uplink layout (port [`DATA_PORT`]):
//!
//! ```text
//! [mode][flags] then one i32 per quantity (sentinel on failure)
//! climate-counter adds [leak mask][count u32]
//! ```
//!
//! Flags: bit 0 = primary reading outside the threshold window.

use heapless::Vec;

use super::payload::Payload;
use super::table::ModeId;
use super::{arg, DeviceMode, ModeContext};
use crate::board::{Board, PageId, SensorKind, Storage};
use crate::constants::payload::DATA_PORT;
use crate::errors::{ConfigError, ConfigResult, RadioError, SensorError, StorageError};
use crate::events::Channel;
use crate::record::{RecordReader, RecordWriter, PAGE_SIZE};

const THRESHOLD_MAGIC: u16 = 0x5052;
const THRESHOLD_VERSION: u8 = 1;
const MAX_QUANTITIES: usize = 4;

const FLAG_OUT_OF_WINDOW: u8 = 1 << 0;

/// Low/high window on the primary reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thresholds {
    /// Readings below this leave the window
    pub low: i32,
    /// Readings above this leave the window
    pub high: i32,
    /// Whether the window is checked at all
    pub enabled: bool,
}

impl Thresholds {
    /// Enabled window `[low, high]`
    pub fn window(low: i32, high: i32) -> ConfigResult<Self> {
        if low > high {
            return Err(ConfigError::InvalidArgument { reason: "low above high" });
        }
        Ok(Self { low, high, enabled: true })
    }

    /// Whether `reading` should force an uplink
    pub fn breached(&self, reading: Result<i32, SensorError>) -> bool {
        match reading {
            Ok(value) if self.enabled => value < self.low || value > self.high,
            _ => false,
        }
    }
}

/// Periodic sensor probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeMode {
    id: ModeId,
    quantities: &'static [SensorKind],
    counter: &'static [Channel],
    thresholds: Thresholds,
}

impl ProbeMode {
    /// Probe reading `quantities`; the first one is checked against thresholds
    pub fn new(id: ModeId, quantities: &'static [SensorKind]) -> Self {
        Self {
            id,
            quantities,
            counter: &[],
            thresholds: Thresholds::default(),
        }
    }

    /// Also count pulses on `channels` and report them with the readings
    pub fn with_counter(mut self, channels: &'static [Channel]) -> Self {
        self.counter = channels;
        self
    }

    /// Active threshold window
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    fn encode<B: Board>(
        &self,
        ctx: &mut ModeContext<'_, B>,
        flags: u8,
        readings: &[Result<i32, SensorError>],
    ) -> Result<Payload, RadioError> {
        let mut payload = Payload::for_mode(self.id);
        payload.push_u8(flags)?;
        for reading in readings {
            payload.push_reading(*reading)?;
        }
        if !self.counter.is_empty() {
            payload.push_u8(ctx.relatch_leaks())?;
            for ch in self.counter {
                payload.push_u32(ctx.counters.channel(*ch).count())?;
            }
        }
        Ok(payload)
    }
}

impl DeviceMode for ProbeMode {
    fn counter_channels(&self) -> &'static [Channel] {
        self.counter
    }

    fn on_scheduled_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        let mut readings: Vec<Result<i32, SensorError>, MAX_QUANTITIES> = Vec::new();
        for kind in self.quantities.iter().take(MAX_QUANTITIES) {
            let _ = readings.push(ctx.read(*kind));
        }

        let breached = readings
            .first()
            .map_or(false, |primary| self.thresholds.breached(*primary));

        if !ctx.schedule.uplink_due() && !breached {
            trace!("probe uplink skipped");
            return;
        }

        let flags = if breached { FLAG_OUT_OF_WINDOW } else { 0 };
        match self.encode(ctx, flags, &readings) {
            Ok(payload) => {
                ctx.uplink(DATA_PORT, &payload);
            }
            Err(err) => error!("probe payload: {:?}", err),
        }
    }

    fn self_test<B: Board>(&mut self, board: &mut B) -> bool {
        match self.quantities.first() {
            Some(kind) => board.read(*kind).is_ok(),
            None => true,
        }
    }

    fn save_config<S: Storage>(&self, storage: &mut S, page: PageId) -> Result<(), StorageError> {
        let mut buf = [0u8; PAGE_SIZE];
        let mut writer = RecordWriter::new(&mut buf, THRESHOLD_MAGIC, THRESHOLD_VERSION)?;
        writer
            .put_bool(self.thresholds.enabled)?
            .put_i32(self.thresholds.low)?
            .put_i32(self.thresholds.high)?;
        let len = writer.finish()?;
        storage.save_config_page(page, &buf[..len])
    }

    fn load_config<S: Storage>(&mut self, storage: &mut S, page: PageId) -> Result<(), StorageError> {
        let mut buf = [0u8; PAGE_SIZE];
        let len = storage.load_config_page(page, &mut buf)?;
        let mut reader = RecordReader::open(&buf[..len], THRESHOLD_MAGIC, THRESHOLD_VERSION)?;
        let enabled = reader.get_bool()?;
        let low = reader.get_i32()?;
        let high = reader.get_i32()?;
        if low > high {
            return Err(StorageError::Corrupt);
        }
        self.thresholds = Thresholds { low, high, enabled };
        Ok(())
    }

    fn cli_set_thresholds(&mut self, args: &[&str]) -> ConfigResult<()> {
        if args.first() == Some(&"off") {
            self.thresholds.enabled = false;
            return Ok(());
        }
        let low = arg(args, 0, "low")?;
        let high = arg(args, 1, "high")?;
        self.thresholds = Thresholds::window(low, high)?;
        Ok(())
    }
}
