//! Debounce / Leak / Burst Counter Engine
//!
//! ## Overview
//!
//! Every counter-based device mode shares one engine with three inputs. The
//! engine never looks at a clock or a pin itself; it is driven by events:
//!
//! ```text
//! PinEdge ──→ on_edge ──→ (re)arm debounce + leak timers
//!                               │
//! debounce timer ───────────────┴─→ on_debounce_expire ──→ count++ ──→ CounterEdge wake
//! leak timer ──────────────────────→ leak_check ──→ leak flag cleared
//! HourTick ──→ on_hour_tick ──→ history slot + burst detector ──→ HourlyAlarm wake
//! uplink ────→ relatch_leaks ──→ leak flag reported, set, timer restarted
//! ```
//!
//! ## Guarantees
//!
//! - A count only increments once the debounce window has fully elapsed since
//!   the *last* edge. Every edge cancels and reissues the debounce timer.
//! - The leak flag only clears when a full leak-timeout window passes with no
//!   raw edge at all.
//! - An hour's delta counts as a burst only if it is strictly above the
//!   threshold. A non-burst hour resets the run. Each channel contributes at
//!   most one burst increment per hour.
//!
//! Counts are atomics, so a reader in the main context never sees a torn
//! value while an ISR-side update is in flight.
//!
//! ## Activation
//!
//! Only channels the active device mode uses take part. Edges on inactive
//! channels are ignored and their timers stay stopped. A direction pin only
//! applies on channels the mode declares as directional; activation keeps
//! counts, history and any burst run already in progress.

mod channel;
mod config;
mod history;

pub use channel::{BurstTracker, CounterChannel, Counted};
pub use config::{CounterConfig, Direction, Polarity};
pub use history::HourlyHistory;

use crate::constants::counter::{CHANNEL_COUNT, HISTORY_SLOTS};
use crate::errors::{ConfigError, ConfigResult, StorageError};
use crate::events::{Channel, PinEdge};
use crate::record::{RecordReader, RecordWriter};
use crate::time::Timestamp;
use crate::timer::TimerBank;

const DATA_MAGIC: u16 = 0x4344;
const DATA_VERSION: u8 = 2;
const NO_HOUR: u32 = u32::MAX;

/// Bitmap of channels, bit n = channel n+1
pub type ChannelMask = u8;

/// The three pulse inputs and their shared bookkeeping
#[derive(Debug)]
pub struct CounterEngine {
    channels: [CounterChannel; CHANNEL_COUNT],
    active: [bool; CHANNEL_COUNT],
    current_hour: Option<u32>,
}

impl Default for CounterEngine {
    fn default() -> Self {
        Self::new([CounterConfig::default(); CHANNEL_COUNT])
    }
}

impl CounterEngine {
    /// Engine with every channel inactive
    pub fn new(configs: [CounterConfig; CHANNEL_COUNT]) -> Self {
        Self {
            channels: Channel::ALL.map(|ch| CounterChannel::new(ch, configs[ch.index()])),
            active: [false; CHANNEL_COUNT],
            current_hour: None,
        }
    }

    /// Channel state
    pub fn channel(&self, ch: Channel) -> &CounterChannel {
        &self.channels[ch.index()]
    }

    /// Whether `ch` is used by the active mode
    pub fn is_active(&self, ch: Channel) -> bool {
        self.active[ch.index()]
    }

    /// Channels used by the active mode
    pub fn active_channels(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL.into_iter().filter(|ch| self.is_active(*ch))
    }

    /// Most recent RTC hour seen
    pub fn current_hour(&self) -> Option<u32> {
        self.current_hour
    }

    /// Enable exactly `channels`, stopping everything else
    pub fn activate(&mut self, channels: &[Channel], timers: &mut TimerBank, now: Timestamp) {
        for ch in Channel::ALL {
            self.active[ch.index()] = false;
            self.channels[ch.index()].deactivate(timers);
        }
        for ch in channels {
            self.active[ch.index()] = true;
            self.channels[ch.index()].activate(self.current_hour, timers, now);
        }
        debug!("counter channels active: {}", self.active_mask());
    }

    /// Bitmap of active channels
    pub fn active_mask(&self) -> ChannelMask {
        self.active_channels().fold(0, |mask, ch| mask | ch.bit())
    }

    /// Raw edge from the pin-change ISR; returns false if the channel is inactive
    pub fn on_edge(&mut self, edge: &PinEdge, timers: &mut TimerBank) -> bool {
        if !self.is_active(edge.channel) {
            return false;
        }
        self.channels[edge.channel.index()].on_edge(edge, timers);
        true
    }

    /// Debounce timer for `ch` expired
    pub fn on_debounce_expire(&mut self, ch: Channel) -> Option<Counted> {
        if !self.is_active(ch) {
            return None;
        }
        let counted = self.channels[ch.index()].on_debounce_expire();
        if let Some(counted) = counted {
            trace!("channel {} counted {:?}", ch.index() + 1, counted);
        }
        counted
    }

    /// Leak timer for `ch` expired
    pub fn leak_check(&self, ch: Channel) {
        if self.is_active(ch) {
            self.channels[ch.index()].leak_check();
        }
    }

    /// Report leak flags of active channels and re-latch them
    pub fn relatch_leaks(&self, timers: &mut TimerBank, now: Timestamp) -> ChannelMask {
        self.active_channels().fold(0, |mask, ch| {
            if self.channels[ch.index()].relatch_leak(timers, now) {
                mask | ch.bit()
            } else {
                mask
            }
        })
    }

    /// Leak flags of active channels without re-latching
    pub fn leak_mask(&self) -> ChannelMask {
        self.active_channels()
            .filter(|ch| self.channel(*ch).leak_detected())
            .fold(0, |mask, ch| mask | ch.bit())
    }

    /// RTC hour boundary; returns channels whose burst alarm was newly raised
    pub fn on_hour_tick(&mut self, hour: u32) -> ChannelMask {
        self.current_hour = Some(hour);
        let mut raised = 0;
        for ch in Channel::ALL {
            if self.active[ch.index()] && self.channels[ch.index()].on_hour_tick(hour) {
                info!("channel {} burst alarm", ch.index() + 1);
                raised |= ch.bit();
            }
        }
        raised
    }

    /// Consume raised burst alarms
    pub fn take_burst_alarms(&mut self) -> ChannelMask {
        let mut taken = 0;
        for ch in Channel::ALL {
            if self.channels[ch.index()].take_burst_alarm() {
                taken |= ch.bit();
            }
        }
        taken
    }

    /// Current configuration of every channel
    pub fn configs(&self) -> [CounterConfig; CHANNEL_COUNT] {
        Channel::ALL.map(|ch| *self.channel(ch).config())
    }

    /// Apply a full set of configs; nothing changes if any is invalid
    pub fn apply_configs(&mut self, configs: &[CounterConfig; CHANNEL_COUNT]) -> ConfigResult<()> {
        for config in configs {
            config.validate()?;
        }
        for ch in Channel::ALL {
            self.channels[ch.index()].set_config(configs[ch.index()])?;
        }
        Ok(())
    }

    fn update(
        &mut self,
        ch: Channel,
        change: impl FnOnce(CounterConfig) -> ConfigResult<CounterConfig>,
    ) -> ConfigResult<()> {
        let channel = &mut self.channels[ch.index()];
        let updated = change(*channel.config()).map_err(|err| {
            warn!("channel {} config rejected: {:?}", ch.index() + 1, err);
            err
        })?;
        channel.set_config(updated)
    }

    /// Change the debounce interval of `ch`
    pub fn set_debounce(&mut self, ch: Channel, debounce_ms: u32) -> ConfigResult<()> {
        self.update(ch, |c| c.with_debounce_ms(debounce_ms))
    }

    /// Change the leak timeout of `ch`
    pub fn set_leak_timeout(&mut self, ch: Channel, leak_timeout_ms: u32) -> ConfigResult<()> {
        self.update(ch, |c| c.with_leak_timeout_ms(leak_timeout_ms))
    }

    /// Change burst detection on `ch`
    pub fn set_burst(&mut self, ch: Channel, threshold: u32, hours_required: u8) -> ConfigResult<()> {
        self.update(ch, |c| c.with_burst(threshold, hours_required))
    }

    /// Change direction inversion on `ch`
    pub fn set_direction_inverted(&mut self, ch: Channel, invert: bool) -> ConfigResult<()> {
        self.update(ch, |c| c.with_direction_inverted(invert))
    }

    /// Declare or remove the direction pin on `ch`
    pub fn set_direction(&mut self, ch: Channel, direction: Option<Direction>) {
        let mut config = *self.channel(ch).config();
        config.direction = direction;
        // Direction does not take part in validation
        let _ = self.channels[ch.index()].set_config(config);
    }

    /// Keep a direction pin only where the mode declares one
    ///
    /// Declared channels keep their inversion (or get the default); every
    /// other active channel loses its direction and counts forward only.
    pub fn declare_direction(&mut self, directional: &[Channel]) {
        for ch in Channel::ALL {
            if directional.contains(&ch) {
                let direction = self.channel(ch).config().direction.unwrap_or_default();
                self.set_direction(ch, Some(direction));
            } else if self.is_active(ch) {
                self.set_direction(ch, None);
            }
        }
    }

    /// Overwrite the forward count of `ch`
    pub fn set_count(&mut self, ch: Channel, count: u32) -> ConfigResult<()> {
        if !self.is_active(ch) {
            return Err(ConfigError::UnknownChannel);
        }
        let channel = &self.channels[ch.index()];
        channel.set_counts(count, channel.reverse_count());
        Ok(())
    }

    /// Serialize counts, history and burst runs for the data page
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, StorageError> {
        let mut writer = RecordWriter::new(buf, DATA_MAGIC, DATA_VERSION)?;
        for channel in &self.channels {
            writer
                .put_u32(channel.count())?
                .put_u32(channel.reverse_count())?
                .put_u32(channel.history().latest_hour().unwrap_or(NO_HOUR))?;
            for slot in channel.history().slots() {
                writer.put_u32(*slot)?;
            }
            let burst = channel.burst();
            writer
                .put_u8(burst.consecutive_hours())?
                .put_u32(burst.latched_hour().unwrap_or(NO_HOUR))?
                .put_bool(burst.alarm_pending())?;
        }
        writer.finish()
    }

    /// Restore counts, history and burst runs from the data page
    pub fn decode(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        let mut reader = RecordReader::open(bytes, DATA_MAGIC, DATA_VERSION)?;
        let mut restored = [(0u32, 0u32, HourlyHistory::new(), BurstTracker::default()); CHANNEL_COUNT];
        for entry in restored.iter_mut() {
            let forward = reader.get_u32()?;
            let reverse = reader.get_u32()?;
            let latest = reader.get_u32()?;
            let mut slots = [0u32; HISTORY_SLOTS];
            for slot in slots.iter_mut() {
                *slot = reader.get_u32()?;
            }
            let latest = (latest != NO_HOUR).then_some(latest);
            let consecutive = reader.get_u8()?;
            let latched = reader.get_u32()?;
            let alarm = reader.get_bool()?;
            let burst = BurstTracker::from_parts(consecutive, (latched != NO_HOUR).then_some(latched), alarm);
            *entry = (forward, reverse, HourlyHistory::from_parts(slots, latest), burst);
        }

        for (channel, (forward, reverse, history, burst)) in self.channels.iter_mut().zip(restored) {
            channel.set_counts(forward, reverse);
            channel.restore_history(history);
            channel.restore_burst(burst);
        }
        Ok(())
    }
}
