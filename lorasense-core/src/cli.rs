//! Console command routing
//!
//! Lines are split on whitespace and routed by their first word. Counter,
//! threshold and device commands are only accepted when the active mode
//! advertises the matching [`CliCaps`] group.
//!
//! ```text
//! mode <index>                       interval <seconds>
//! wakeups <n>                        save
//! debounce <ch> <ms>                 leak <ch> <ms>
//! burst <ch> <threshold> <hours>     count <ch> <value>
//! invert <ch> <on|off>               thresholds <low> <high> | off
//! device <mode-specific words…>      status
//! ```
//!
//! Channels are numbered 1 to 3. Every accepted change is persisted at once.

use heapless::Vec;

use crate::board::Board;
use crate::errors::{ConfigError, ConfigResult, NodeError};
use crate::events::Channel;
use crate::mode::{arg, flag_arg, ActiveDevice, CliCaps, DeviceMode};
use crate::node::Node;
use crate::time::seconds_to_ms;

/// Most words accepted on one command line
pub const MAX_CLI_ARGS: usize = 8;

impl<B: Board> Node<B, ActiveDevice> {
    /// Run one console command line
    pub fn execute_command(&mut self, line: &str) -> Result<(), NodeError> {
        let mut words: Vec<&str, MAX_CLI_ARGS> = Vec::new();
        for word in line.split_whitespace() {
            words
                .push(word)
                .map_err(|_| ConfigError::InvalidArgument { reason: "too many arguments" })?;
        }
        let Some((&command, args)) = words.split_first() else {
            return Ok(());
        };
        let caps = self.device.cli_commands();

        match command {
            "mode" => {
                self.select_mode(arg(args, 0, "mode index")?)?;
                self.save_config()?;
            }
            "interval" => {
                let seconds: u32 = arg(args, 0, "interval (seconds)")?;
                self.schedule.set_interval(seconds_to_ms(seconds))?;
                self.save_config()?;
            }
            "wakeups" => {
                self.schedule.set_wakeups_per_uplink(arg(args, 0, "wakeups per uplink")?)?;
                self.save_config()?;
            }
            "debounce" | "leak" | "burst" | "invert" => {
                require(caps, CliCaps::COUNTERS)?;
                let ch = channel_arg(args)?;
                match command {
                    "debounce" => self.counters.set_debounce(ch, arg(args, 1, "debounce (ms)")?)?,
                    "leak" => self.counters.set_leak_timeout(ch, arg(args, 1, "leak timeout (ms)")?)?,
                    "burst" => self.counters.set_burst(
                        ch,
                        arg(args, 1, "burst threshold")?,
                        arg(args, 2, "burst hours")?,
                    )?,
                    _ => self.counters.set_direction_inverted(ch, flag_arg(args, 1, "invert")?)?,
                }
                self.save_config()?;
            }
            "count" => {
                require(caps, CliCaps::COUNTERS)?;
                let ch = channel_arg(args)?;
                self.counters.set_count(ch, arg(args, 1, "count")?)?;
                self.save_counter_data()?;
            }
            "thresholds" => {
                require(caps, CliCaps::THRESHOLDS)?;
                self.device.cli_set_thresholds(args)?;
                self.save_config()?;
            }
            "device" => {
                require(caps, CliCaps::DEVICE)?;
                self.run_hook(|device, ctx| device.cli_device_specific(ctx, args))?;
                self.save_config()?;
                self.save_device_data()?;
            }
            "save" => {
                self.save_config()?;
                self.save_counter_data()?;
                self.save_device_data()?;
            }
            "status" => self.log_status(),
            _ => return Err(ConfigError::InvalidArgument { reason: "unknown command" }.into()),
        }
        Ok(())
    }

    fn log_status(&self) {
        info!(
            "mode {} ({}), interval {} ms, {} wakes/uplink, error {}",
            self.mode.index(),
            self.mode.descriptor().name,
            self.schedule.interval_ms(),
            self.schedule.wakeups_per_uplink(),
            self.error_flag
        );
        for ch in self.counters.active_channels() {
            let channel = self.counters.channel(ch);
            info!(
                "ch{}: count {} reverse {} leak {}",
                ch.index() + 1,
                channel.count(),
                channel.reverse_count(),
                channel.leak_detected()
            );
        }
    }
}

fn require(caps: CliCaps, group: CliCaps) -> ConfigResult<()> {
    if caps.contains(group) {
        Ok(())
    } else {
        Err(ConfigError::Unsupported)
    }
}

fn channel_arg(args: &[&str]) -> ConfigResult<Channel> {
    let number: u8 = arg(args, 0, "channel (1-3)")?;
    Channel::from_number(number).ok_or(ConfigError::UnknownChannel)
}
