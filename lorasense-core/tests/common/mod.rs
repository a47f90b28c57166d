//! Common test utilities for integration tests
//!
//! This module provides:
//! - `SimBoard`: a scripted board implementing every collaborator trait
//! - `SpyMode`: a device mode that records which hooks ran
//! - Builders for nodes in a known state

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};

use lorasense_core::board::{
    CommandLine, Console, Indication, Indicator, Power, Radio, ResetCause, Sensors, Storage,
    Watchdog,
};
use lorasense_core::{
    Channel, Class, DeviceMode, Downlink, HardwareCaps, HourTick, Interrupt, ManualClock,
    ModeContext, Node, NodeConfig, PageId, PinEdge, RadioError, SensorError, SensorKind,
    StorageError, TimeSource, Timestamp,
};

/// One uplink as the network would see it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uplink {
    pub port: u8,
    pub data: Vec<u8>,
    pub at: Timestamp,
}

/// Simulated board
///
/// `halt` jumps the clock to whichever comes first: the requested wake time
/// or the next scripted interrupt.
pub struct SimBoard {
    pub clock: ManualClock,
    pub script: VecDeque<(Timestamp, Interrupt)>,
    pub halts: Vec<(Timestamp, Option<Timestamp>)>,

    pub radio_present: bool,
    pub join_results: VecDeque<nb::Result<(), RadioError>>,
    pub join_attempts: u32,
    pub uplinks: Vec<Uplink>,
    pub class: Option<Class>,
    pub downlinks: VecDeque<Downlink>,

    pub config_pages: HashMap<PageId, Vec<u8>>,
    pub data_pages: HashMap<PageId, Vec<u8>>,
    pub corrupt_config_pages: HashSet<PageId>,
    pub failing_saves: bool,

    pub sensors: HashMap<SensorKind, i32>,
    /// Reflect scripted input 1 levels in bit 0 of the digital input bitmap
    pub mirror_pins: bool,
    pub outputs: HashMap<u8, bool>,

    pub indications: Vec<Indication>,
    pub commands: VecDeque<CommandLine>,
    pub reset_cause: ResetCause,
    pub watchdog_kicks: u32,
    pub rtc: Option<u32>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self {
            clock: ManualClock::new(0),
            script: VecDeque::new(),
            halts: Vec::new(),
            radio_present: true,
            join_results: VecDeque::new(),
            join_attempts: 0,
            uplinks: Vec::new(),
            class: None,
            downlinks: VecDeque::new(),
            config_pages: HashMap::new(),
            data_pages: HashMap::new(),
            corrupt_config_pages: HashSet::new(),
            failing_saves: false,
            sensors: HashMap::new(),
            mirror_pins: false,
            outputs: HashMap::new(),
            indications: Vec::new(),
            commands: VecDeque::new(),
            reset_cause: ResetCause::PowerOn,
            watchdog_kicks: 0,
            rtc: None,
        }
    }

    /// Schedule a settled pin level on `channel` at `at`
    pub fn edge_at(&mut self, channel: Channel, level: bool, at: Timestamp) {
        self.script.push_back((at, Interrupt::Pin(PinEdge::new(channel, level, at))));
    }

    /// Schedule a short pulse: rising at `at`, falling `width` later
    pub fn pulse_at(&mut self, channel: Channel, at: Timestamp, width: u64) {
        self.edge_at(channel, true, at);
        self.edge_at(channel, false, at + width);
    }

    /// Schedule an RTC hour boundary
    pub fn hour_at(&mut self, hour: u32, at: Timestamp) {
        self.script.push_back((at, Interrupt::Rtc(HourTick { hour, at })));
    }

    pub fn queue_command(&mut self, line: &str) {
        let mut command = CommandLine::new();
        command.push_str(line).unwrap();
        self.commands.push_back(command);
    }

    pub fn queue_downlink(&mut self, port: u8, bytes: &[u8]) {
        self.downlinks.push_back(Downlink::new(port, bytes).unwrap());
    }

    pub fn uplinks_on(&self, port: u8) -> Vec<&Uplink> {
        self.uplinks.iter().filter(|u| u.port == port).collect()
    }

    fn mirror_pin(&mut self, edge: &PinEdge) {
        if !self.mirror_pins || edge.channel != Channel::One {
            return;
        }
        let bits = self.sensors.entry(SensorKind::DigitalInputs).or_insert(0);
        if edge.level {
            *bits |= 1;
        } else {
            *bits &= !1;
        }
    }
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SimBoard {
    fn now(&self) -> Timestamp {
        self.clock.now()
    }
}

impl Power for SimBoard {
    fn halt(&mut self, wake_at: Option<Timestamp>) -> Interrupt {
        self.halts.push((self.clock.now(), wake_at));
        match (self.script.front().map(|(at, _)| *at), wake_at) {
            (Some(next), Some(deadline)) if deadline < next => {
                self.clock.set(deadline);
                Interrupt::Timer
            }
            (Some(_), _) => {
                let (at, interrupt) = self.script.pop_front().unwrap();
                self.clock.set(at);
                if let Interrupt::Pin(edge) = &interrupt {
                    self.mirror_pin(edge);
                }
                interrupt
            }
            (None, Some(deadline)) => {
                self.clock.set(deadline);
                Interrupt::Timer
            }
            (None, None) => panic!("halt with no wake source at {}", self.clock.now()),
        }
    }

    fn reset_cause(&self) -> ResetCause {
        self.reset_cause
    }

    fn set_rtc(&mut self, epoch_seconds: u32) {
        self.rtc = Some(epoch_seconds);
    }
}

impl Radio for SimBoard {
    fn is_present(&self) -> bool {
        self.radio_present
    }

    fn join(&mut self) -> nb::Result<(), RadioError> {
        self.join_attempts += 1;
        let result = self.join_results.pop_front().unwrap_or(Ok(()));
        if matches!(result, Err(nb::Error::WouldBlock)) {
            self.clock.advance(1000);
        }
        result
    }

    fn uplink(&mut self, port: u8, payload: &[u8]) -> Result<(), RadioError> {
        self.uplinks.push(Uplink {
            port,
            data: payload.to_vec(),
            at: self.clock.now(),
        });
        Ok(())
    }

    fn set_class(&mut self, class: Class) {
        self.class = Some(class);
    }

    fn take_downlink(&mut self) -> Option<Downlink> {
        self.downlinks.pop_front()
    }
}

fn load(pages: &HashMap<PageId, Vec<u8>>, page: PageId, buf: &mut [u8]) -> Result<usize, StorageError> {
    let record = pages.get(&page).ok_or(StorageError::NotFound)?;
    if record.len() > buf.len() {
        return Err(StorageError::TooLarge);
    }
    buf[..record.len()].copy_from_slice(record);
    Ok(record.len())
}

impl Storage for SimBoard {
    fn load_config_page(&mut self, page: PageId, buf: &mut [u8]) -> Result<usize, StorageError> {
        if self.corrupt_config_pages.contains(&page) {
            return Err(StorageError::Corrupt);
        }
        load(&self.config_pages, page, buf)
    }

    fn save_config_page(&mut self, page: PageId, record: &[u8]) -> Result<(), StorageError> {
        if self.failing_saves {
            return Err(StorageError::Io);
        }
        self.config_pages.insert(page, record.to_vec());
        Ok(())
    }

    fn load_data_page(&mut self, page: PageId, buf: &mut [u8]) -> Result<usize, StorageError> {
        load(&self.data_pages, page, buf)
    }

    fn save_data_page(&mut self, page: PageId, record: &[u8]) -> Result<(), StorageError> {
        if self.failing_saves {
            return Err(StorageError::Io);
        }
        self.data_pages.insert(page, record.to_vec());
        Ok(())
    }
}

impl Watchdog for SimBoard {
    fn reset_watchdog(&mut self) {
        self.watchdog_kicks += 1;
    }
}

impl Sensors for SimBoard {
    fn read(&mut self, kind: SensorKind) -> Result<i32, SensorError> {
        self.sensors.get(&kind).copied().ok_or(SensorError::Timeout)
    }

    fn set_output(&mut self, index: u8, on: bool) -> Result<(), SensorError> {
        self.outputs.insert(index, on);
        Ok(())
    }
}

impl Indicator for SimBoard {
    fn indicate(&mut self, indication: Indication) {
        self.indications.push(indication);
    }
}

impl Console for SimBoard {
    fn poll_command(&mut self) -> Option<CommandLine> {
        self.commands.pop_front()
    }
}

/// Device mode that records hook calls
#[derive(Debug, Default)]
pub struct SpyMode {
    pub calls: Vec<&'static str>,
    pub channels: &'static [Channel],
}

impl SpyMode {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn counting() -> Self {
        Self {
            calls: Vec::new(),
            channels: &[Channel::One],
        }
    }

    /// Hook calls other than the each-wakeup hook
    pub fn cause_hooks(&self) -> Vec<&'static str> {
        self.calls.iter().copied().filter(|c| *c != "each").collect()
    }
}

impl DeviceMode for SpyMode {
    fn counter_channels(&self) -> &'static [Channel] {
        self.channels
    }

    fn on_each_wakeup<B: lorasense_core::Board>(&mut self, _ctx: &mut ModeContext<'_, B>) {
        self.calls.push("each");
    }

    fn on_scheduled_wakeup<B: lorasense_core::Board>(&mut self, _ctx: &mut ModeContext<'_, B>) {
        self.calls.push("scheduled");
    }

    fn on_hourly_alarm<B: lorasense_core::Board>(&mut self, _ctx: &mut ModeContext<'_, B>) {
        self.calls.push("hourly");
    }

    fn on_count_wakeup<B: lorasense_core::Board>(&mut self, _ctx: &mut ModeContext<'_, B>) {
        self.calls.push("count");
    }
}

/// Node running `SpyMode` with default settings
pub fn spy_node(mode: SpyMode) -> Node<SimBoard, SpyMode> {
    Node::with_device(SimBoard::new(), HardwareCaps::default(), &NodeConfig::default(), mode)
}

/// Node running `SpyMode` with `config`
pub fn spy_node_with(config: &NodeConfig, mode: SpyMode) -> Node<SimBoard, SpyMode> {
    Node::with_device(SimBoard::new(), HardwareCaps::default(), config, mode)
}
