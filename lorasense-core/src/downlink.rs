//! Downlink routing
//!
//! Core ports change the node itself; every other port belongs to the active
//! device mode.
//!
//! | port | payload | effect |
//! |------|---------|--------|
//! | [`INTERVAL_PORT`] | u32 BE seconds | transmit interval |
//! | [`MODE_PORT`] | u8 | device mode |
//! | [`WAKEUPS_PORT`] | u16 BE | scheduled wakes per uplink |
//! | [`RTC_PORT`] | u32 BE epoch seconds | wall clock |
//!
//! A rejected downlink leaves the node exactly as it was.

use crate::board::{Board, Downlink};
use crate::constants::payload::{INTERVAL_PORT, MODE_PORT, RTC_PORT, WAKEUPS_PORT};
use crate::errors::{ConfigError, NodeError};
use crate::mode::{ActiveDevice, DeviceMode};
use crate::node::Node;
use crate::time::seconds_to_ms;

impl<B: Board> Node<B, ActiveDevice> {
    /// Apply every downlink the radio has queued; returns how many were seen
    pub fn process_downlinks(&mut self) -> usize {
        let mut seen = 0;
        while let Some(downlink) = self.board.take_downlink() {
            seen += 1;
            if let Err(err) = self.handle_downlink(&downlink) {
                self.report(err);
            }
        }
        seen
    }

    /// Apply one downlink
    pub fn handle_downlink(&mut self, downlink: &Downlink) -> Result<(), NodeError> {
        let data = downlink.data.as_slice();
        debug!("downlink port {} ({} bytes)", downlink.port, data.len());

        match downlink.port {
            INTERVAL_PORT => {
                let seconds = u32::from_be_bytes(exact(data)?);
                self.schedule.set_interval(seconds_to_ms(seconds))?;
                info!("interval {} s", seconds);
            }
            MODE_PORT => {
                let [index] = exact::<1>(data)?;
                self.select_mode(index)?;
            }
            WAKEUPS_PORT => {
                let wakeups = u16::from_be_bytes(exact(data)?);
                self.schedule.set_wakeups_per_uplink(wakeups)?;
                info!("wakeups per uplink {}", wakeups);
            }
            RTC_PORT => {
                let epoch = u32::from_be_bytes(exact(data)?);
                self.board.set_rtc(epoch);
                self.mark_rtc_modified();
                info!("rtc set to {}", epoch);
                return Ok(());
            }
            _ => {
                self.run_hook(|device, ctx| device.on_downlink(ctx, downlink));
                self.save_device_data()?;
            }
        }

        self.save_config()?;
        Ok(())
    }
}

fn exact<const N: usize>(data: &[u8]) -> Result<[u8; N], ConfigError> {
    data.try_into()
        .map_err(|_| ConfigError::InvalidArgument { reason: "downlink length" })
}
