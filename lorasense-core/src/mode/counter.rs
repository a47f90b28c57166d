//! Pulse counting modes (counter-1/2/3, directional, two-counter-alarms)
//!
//! Data uplink layout (port [`DATA_PORT`]):
//!
//! ```text
//! [mode][leak mask] then per active channel: [count u32][six-hour delta u32]
//! directional adds [reverse count u32] after the forward count
//! ```
//!
//! The leak mask carries the flags as they stood at the end of the interval;
//! reporting them re-latches every flag to "suspected".

use super::payload::Payload;
use super::table::ModeId;
use super::{DeviceMode, ModeContext};
use crate::board::Board;
use crate::constants::payload::{ALARM_BURST, ALARM_PORT, DATA_PORT};
use crate::counter::{ChannelMask, CounterEngine};
use crate::errors::RadioError;
use crate::events::Channel;

/// Plain pulse counter on one to three inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterMode {
    id: ModeId,
    channels: &'static [Channel],
    directional: bool,
}

impl CounterMode {
    /// Counter on `channels`
    pub fn new(id: ModeId, channels: &'static [Channel]) -> Self {
        Self {
            id,
            channels,
            directional: false,
        }
    }

    /// Single counter qualified by a direction pin
    pub fn directional(id: ModeId, channel: Channel) -> Self {
        let channels: &'static [Channel] = match channel {
            Channel::One => &[Channel::One],
            Channel::Two => &[Channel::Two],
            Channel::Three => &[Channel::Three],
        };
        Self {
            id,
            channels,
            directional: true,
        }
    }

    fn encode(&self, counters: &CounterEngine, leaks: ChannelMask) -> Result<Payload, RadioError> {
        let mut payload = Payload::for_mode(self.id);
        payload.push_u8(leaks)?;
        for ch in self.channels {
            let channel = counters.channel(*ch);
            payload.push_u32(channel.count())?;
            if self.directional {
                payload.push_u32(channel.reverse_count())?;
            }
            payload.push_u32(channel.history().six_hour_delta())?;
        }
        Ok(payload)
    }

    fn send_data<B: Board>(&self, ctx: &mut ModeContext<'_, B>) {
        let leaks = ctx.relatch_leaks();
        match self.encode(ctx.counters, leaks) {
            Ok(payload) => {
                ctx.uplink(DATA_PORT, &payload);
            }
            Err(err) => error!("counter payload: {:?}", err),
        }
    }
}

impl DeviceMode for CounterMode {
    fn counter_channels(&self) -> &'static [Channel] {
        self.channels
    }

    fn direction_channels(&self) -> &'static [Channel] {
        if self.directional {
            self.channels
        } else {
            &[]
        }
    }

    fn on_scheduled_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        if ctx.schedule.uplink_due() {
            self.send_data(ctx);
        }
    }
}

/// Two counters that also uplink burst alarms as soon as they are raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterAlarmMode {
    counter: CounterMode,
    pending_alarms: ChannelMask,
}

impl CounterAlarmMode {
    /// Alarm-reporting counter on `channels`
    pub fn new(id: ModeId, channels: &'static [Channel]) -> Self {
        Self {
            counter: CounterMode::new(id, channels),
            pending_alarms: 0,
        }
    }

    /// Burst alarms collected but not yet sent
    pub fn pending_alarms(&self) -> ChannelMask {
        self.pending_alarms
    }

    fn collect<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        self.pending_alarms |= ctx.counters.take_burst_alarms();
    }
}

impl DeviceMode for CounterAlarmMode {
    fn counter_channels(&self) -> &'static [Channel] {
        self.counter.counter_channels()
    }

    fn direction_channels(&self) -> &'static [Channel] {
        self.counter.direction_channels()
    }

    fn init<B: Board>(&mut self, _ctx: &mut ModeContext<'_, B>) {
        self.pending_alarms = 0;
    }

    fn on_count_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        self.collect(ctx);
    }

    fn on_hourly_alarm<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        self.collect(ctx);
    }

    fn on_each_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        if self.pending_alarms == 0 {
            return;
        }
        let alarms = core::mem::take(&mut self.pending_alarms);
        let mut payload = Payload::for_mode(self.counter.id);
        let built = payload.push_u8(ALARM_BURST).and_then(|p| p.push_u8(alarms)).is_ok();
        if built {
            info!("burst alarm uplink, channels {}", alarms);
            ctx.uplink(ALARM_PORT, &payload);
        }
    }

    fn on_scheduled_wakeup<B: Board>(&mut self, ctx: &mut ModeContext<'_, B>) {
        self.counter.on_scheduled_wakeup(ctx);
    }
}
