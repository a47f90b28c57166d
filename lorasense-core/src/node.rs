//! The Node: all core state in one owned struct
//!
//! ## Overview
//!
//! [`Node`] owns the board, the active device mode, the counter engine, the
//! software timers, the transmit schedule and the wake queue. There is no
//! global mutable state: interrupt handlers on real hardware reach the node
//! through the board support package, which forwards to the entry points
//! below ([`Node::on_pin_edge`], [`Node::on_rtc_hour`], [`Node::dispatch`]).
//!
//! ```text
//! ┌──────────────────────────── Node ────────────────────────────┐
//! │ board ──→ halt() ──→ Interrupt ──→ dispatch()                │
//! │                                      │                       │
//! │          ┌───────────────────────────┼─────────────┐         │
//! │          ↓                           ↓             ↓         │
//! │   service_timers()            counters.on_edge  on_hour_tick │
//! │   debounce → count            (re)arm timers    history/burst│
//! │   leak → flag clear                                 │        │
//! │   alarm → Scheduled                                 │        │
//! │          │                                          │        │
//! │          └──────────→ wakes (WakeQueue) ←───────────┘        │
//! │                              │                               │
//! │                         sleep() loop ──→ device hooks        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Event Ordering
//!
//! Before an interrupt is applied, every software timer whose deadline lies
//! at or before the interrupt's timestamp is serviced. A debounce window that
//! closed before a new edge arrived therefore counts before that edge
//! restarts the window.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::board::{Board, Class, PageId};
use crate::config::{HardwareCaps, NodeConfig};
use crate::constants::schedule::DIAGNOSTIC_INTERVAL_MS;
use crate::counter::CounterEngine;
use crate::errors::{ModeError, NodeError, StorageError};
use crate::events::{HourTick, Interrupt, PinEdge, WakeCause};
use crate::mode::{ActiveDevice, DeviceMode, ModeContext, ModeId};
use crate::queue::WakeQueue;
use crate::record::PAGE_SIZE;
use crate::schedule::TransmitSchedule;
use crate::time::Timestamp;
use crate::timer::{TimerBank, TimerId};

/// Rate limiter for repeated local diagnostics
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    last: Option<Timestamp>,
    suppressed: u32,
}

impl Diagnostics {
    /// Whether a diagnostic at `now` should be emitted
    pub fn allow(&mut self, now: Timestamp) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < DIAGNOSTIC_INTERVAL_MS => {
                self.suppressed = self.suppressed.saturating_add(1);
                false
            }
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Diagnostics dropped by the limiter
    pub fn suppressed(&self) -> u32 {
        self.suppressed
    }
}

/// The sensor node
pub struct Node<B: Board, D: DeviceMode = ActiveDevice> {
    pub(crate) board: B,
    pub(crate) device: D,
    pub(crate) mode: ModeId,
    pub(crate) counters: CounterEngine,
    pub(crate) timers: TimerBank,
    pub(crate) schedule: TransmitSchedule,
    pub(crate) wakes: WakeQueue,
    pub(crate) armed_interval: Option<u32>,
    pub(crate) rtc_modified: AtomicBool,
    pub(crate) hardware: HardwareCaps,
    pub(crate) error_flag: bool,
    pub(crate) diagnostics: Diagnostics,
}

impl<B: Board, D: DeviceMode> Node<B, D> {
    /// Node running `device` with `config` applied
    ///
    /// Invalid counter settings in `config` fall back to defaults.
    pub fn with_device(board: B, hardware: HardwareCaps, config: &NodeConfig, device: D) -> Self {
        let mut counters = CounterEngine::default();
        if let Err(err) = counters.apply_configs(&config.counters) {
            warn!("counter config rejected: {:?}", err);
        }

        let mut node = Self {
            board,
            device,
            mode: config.mode,
            counters,
            timers: TimerBank::new(),
            schedule: TransmitSchedule::from_config(config),
            wakes: WakeQueue::new(),
            armed_interval: None,
            rtc_modified: AtomicBool::new(false),
            hardware,
            error_flag: false,
            diagnostics: Diagnostics::default(),
        };
        node.activate_counters();
        node
    }

    // ===== ACCESSORS =====

    /// Hardware collaborators
    pub fn board(&self) -> &B {
        &self.board
    }

    /// Hardware collaborators, mutably
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Active device mode
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Index of the active mode
    pub fn mode(&self) -> ModeId {
        self.mode
    }

    /// Pulse counters
    pub fn counters(&self) -> &CounterEngine {
        &self.counters
    }

    /// Pulse counters, mutably
    pub fn counters_mut(&mut self) -> &mut CounterEngine {
        &mut self.counters
    }

    /// Software timers
    pub fn timers(&self) -> &TimerBank {
        &self.timers
    }

    /// Transmit schedule
    pub fn schedule(&self) -> &TransmitSchedule {
        &self.schedule
    }

    /// Pending wake causes
    pub fn wakes(&self) -> &WakeQueue {
        &self.wakes
    }

    /// Board capabilities
    pub fn hardware(&self) -> HardwareCaps {
        self.hardware
    }

    /// Whether boot hit a self-test or join failure
    pub fn error_flag(&self) -> bool {
        self.error_flag
    }

    /// Local diagnostics limiter
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Flag that the wall clock was set from outside the scheduler
    pub fn mark_rtc_modified(&self) {
        self.rtc_modified.store(true, Ordering::Release);
    }

    /// Current configuration as it would be persisted
    pub fn config(&self) -> NodeConfig {
        NodeConfig {
            mode: self.mode,
            transmit_interval_ms: self.schedule.interval_ms(),
            wakeups_per_uplink: self.schedule.wakeups_per_uplink(),
            counters: self.counters.configs(),
        }
    }

    // ===== INTERRUPT ENTRY POINTS =====

    /// Pin-change ISR
    pub fn on_pin_edge(&mut self, edge: PinEdge) {
        self.service_timers(edge.at);
        if !self.counters.on_edge(&edge, &mut self.timers) {
            trace!("edge on inactive channel {}", edge.channel.index() + 1);
        }
    }

    /// RTC hour-alarm ISR
    pub fn on_rtc_hour(&mut self, tick: HourTick) {
        self.service_timers(tick.at);
        self.counters.on_hour_tick(tick.hour);
        self.wakes.push(WakeCause::HourlyAlarm);
    }

    /// Apply whatever ended a halt
    pub fn dispatch(&mut self, interrupt: Interrupt) {
        match interrupt {
            Interrupt::Pin(edge) => self.on_pin_edge(edge),
            Interrupt::Rtc(tick) => self.on_rtc_hour(tick),
            Interrupt::Timer | Interrupt::Console | Interrupt::Radio => {
                let now = self.board.now();
                self.service_timers(now);
            }
        }
    }

    /// Fire every software timer due at `now`, earliest first
    pub fn service_timers(&mut self, now: Timestamp) {
        while let Some((id, deadline)) = self.timers.pop_expired(now) {
            match id {
                TimerId::Debounce(ch) => {
                    if self.counters.on_debounce_expire(ch).is_some() {
                        self.wakes.push(WakeCause::CounterEdge);
                    }
                }
                TimerId::Leak(ch) => self.counters.leak_check(ch),
                TimerId::Alarm => {
                    self.rearm_periodic(deadline, now);
                    self.wakes.push(WakeCause::Scheduled);
                }
            }
        }
    }

    /// Keep the alarm cadence anchored to its previous deadline
    fn rearm_periodic(&mut self, deadline: Timestamp, now: Timestamp) {
        let Some(interval) = self.armed_interval.map(u64::from).filter(|i| *i > 0) else {
            return;
        };
        let mut next = deadline.saturating_add(interval);
        if next <= now {
            let missed = (now - next) / interval + 1;
            next = next.saturating_add(missed.saturating_mul(interval));
        }
        self.timers.arm_at(TimerId::Alarm, next);
    }

    /// Arm the transmit alarm a full `interval_ms` from `now`
    pub(crate) fn arm_alarm(&mut self, interval_ms: u32, now: Timestamp) {
        let deadline = self.timers.arm(TimerId::Alarm, interval_ms as u64, now);
        self.armed_interval = Some(interval_ms);
        trace!("alarm armed for {} ({} ms)", deadline, interval_ms);
    }

    /// Enable the device's counter inputs and its direction pins
    pub(crate) fn activate_counters(&mut self) {
        let now = self.board.now();
        self.counters.activate(self.device.counter_channels(), &mut self.timers, now);
        self.counters.declare_direction(self.device.direction_channels());
    }

    // ===== HOOKS =====

    /// Run `hook` against the device with a fresh context
    pub(crate) fn run_hook<R>(&mut self, hook: impl FnOnce(&mut D, &mut ModeContext<'_, B>) -> R) -> R {
        let now = self.board.now();
        let mut ctx = ModeContext {
            board: &mut self.board,
            counters: &mut self.counters,
            timers: &mut self.timers,
            schedule: &self.schedule,
            now,
        };
        hook(&mut self.device, &mut ctx)
    }

    // ===== PERSISTENCE =====

    /// Write counts and history to the counter data page
    pub fn save_counter_data(&mut self) -> Result<(), StorageError> {
        let mut buf = [0u8; PAGE_SIZE];
        let len = self.counters.encode(&mut buf)?;
        self.board.save_data_page(PageId::COUNTERS, &buf[..len])
    }

    /// Restore counts and history from the counter data page
    pub fn load_counter_data(&mut self) -> Result<(), StorageError> {
        let mut buf = [0u8; PAGE_SIZE];
        let len = self.board.load_data_page(PageId::COUNTERS, &mut buf)?;
        self.counters.decode(&buf[..len])
    }

    /// Persist the node configuration and the active mode's settings
    pub fn save_config(&mut self) -> Result<(), StorageError> {
        let mut buf = [0u8; PAGE_SIZE];
        let len = self.config().encode(&mut buf)?;
        self.board.save_config_page(PageId::NODE, &buf[..len])?;
        self.device.save_config(&mut self.board, PageId::for_mode(self.mode.index()))
    }

    /// Persist the active mode's runtime data
    pub fn save_device_data(&mut self) -> Result<(), StorageError> {
        self.device.save_data(&mut self.board, PageId::for_mode(self.mode.index()))
    }

    /// Emit a rate-limited diagnostic for a rejected change
    pub(crate) fn report(&mut self, err: NodeError) {
        let now = self.board.now();
        if self.diagnostics.allow(now) {
            warn!("rejected: {}", err);
        }
    }
}

impl<B: Board> Node<B, ActiveDevice> {
    /// Node in the unconfigured mode with default settings
    pub fn new(board: B, hardware: HardwareCaps) -> Self {
        Self::with_device(board, hardware, &NodeConfig::default(), ActiveDevice::default())
    }

    /// Switch to mode `index`
    ///
    /// The incoming mode is built and loaded completely before it replaces
    /// the active one. On any error the previous mode keeps running untouched.
    pub fn select_mode(&mut self, index: u8) -> Result<(), ModeError> {
        let id = ModeId::from_index(index).ok_or(ModeError::OutOfRange { index })?;
        let descriptor = id.descriptor();
        if descriptor.legacy_counter && !self.hardware.legacy_counter_compatible {
            warn!("mode {} needs legacy counter wiring", descriptor.name);
            return Err(ModeError::LegacyCounterConflict { mode: descriptor.name });
        }

        let page = PageId::for_mode(index);
        let mut candidate = ActiveDevice::new(id);
        match candidate.load_config(&mut self.board, page) {
            Ok(()) | Err(StorageError::NotFound) => {}
            Err(err) => {
                warn!("mode {} config unreadable: {:?}", descriptor.name, err);
                return Err(ModeError::LoadFailed(err));
            }
        }

        if let Err(err) = self.save_device_data() {
            warn!("mode {} data not saved: {:?}", self.mode.descriptor().name, err);
        }
        match candidate.load_data(&mut self.board, page) {
            Ok(()) | Err(StorageError::NotFound) => {}
            Err(err) => warn!("mode {} data discarded: {:?}", descriptor.name, err),
        }

        self.device = candidate;
        self.mode = id;
        self.activate_counters();
        self.run_hook(|device, ctx| device.init(ctx));

        if self.board.is_present() {
            self.board.set_class(if descriptor.class_c { Class::C } else { Class::A });
        }
        info!("mode {} ({})", index, descriptor.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_are_rate_limited() {
        let mut diagnostics = Diagnostics::default();
        assert!(diagnostics.allow(0));
        assert!(!diagnostics.allow(DIAGNOSTIC_INTERVAL_MS - 1));
        assert!(diagnostics.allow(DIAGNOSTIC_INTERVAL_MS));
        assert_eq!(diagnostics.suppressed(), 1);
    }
}
