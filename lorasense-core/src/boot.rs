//! Boot and Recovery Orchestration
//!
//! ## Boot Sequence
//!
//! ```text
//! reset cause ──→ node config ──→ counter data ──→ select mode
//!                                                     │
//!        ┌────────────── CLI window ←─────────────────┘
//!        ↓
//!   self-test + join ── fail ──→ error flag, LED, penalty sleep ──┐
//!        │ ok                                                     │
//!        ↓                      ←─────────────── retry ───────────┘
//!   program loop: sleep → scheduled hook → downlinks
//! ```
//!
//! Nothing here gives up. A missing or corrupt configuration falls back to
//! the unconfigured mode, and a failing self-test or join is retried forever
//! with a penalty sleep in between. Only the watchdog can restart the node.

use crate::board::{Board, Indication, PageId, ResetCause};
use crate::config::{HardwareCaps, NodeConfig};
use crate::constants::schedule::{BOOT_RETRY_PENALTY_MS, CLI_WINDOW_MS, JOIN_TIMEOUT_MS};
use crate::errors::{RadioError, StorageError};
use crate::mode::{ActiveDevice, DeviceMode, ModeId};
use crate::node::Node;
use crate::record::PAGE_SIZE;
use crate::time::deadline_after;

impl<B: Board> Node<B, ActiveDevice> {
    /// Bring the node up from reset
    ///
    /// Returns once the node has a working mode and, for configured modes, a
    /// network session.
    pub fn boot(mut board: B, hardware: HardwareCaps) -> Self {
        board.indicate(Indication::Booting);
        let config = load_node_config(&mut board);

        let mut node = Self::with_device(
            board,
            hardware,
            &config.with_mode(ModeId::Unconfigured),
            ActiveDevice::default(),
        );
        if node.watchdog_reset_occurred() {
            warn!("recovering from watchdog reset");
        }

        match node.load_counter_data() {
            Ok(()) => debug!("counter data restored"),
            Err(StorageError::NotFound) => debug!("no counter data"),
            Err(err) => warn!("counter data discarded: {:?}", err),
        }

        node.update_device_behaviour(config.mode);
        node.cli_window();
        node.bring_up();
        node
    }

    /// Whether the last reset came from the watchdog
    pub fn watchdog_reset_occurred(&self) -> bool {
        self.board.reset_cause() == ResetCause::Watchdog
    }

    /// Select `mode`, dropping to unconfigured if it cannot run
    pub fn update_device_behaviour(&mut self, mode: ModeId) {
        if let Err(err) = self.select_mode(mode.index()) {
            warn!("mode {} unavailable: {:?}", mode.index(), err);
            if let Err(err) = self.select_mode(ModeId::Unconfigured.index()) {
                error!("unconfigured mode unavailable: {:?}", err);
            }
        }
    }

    /// Self-test and join until both pass
    fn bring_up(&mut self) {
        if self.mode == ModeId::Unconfigured {
            info!("unconfigured, skipping join");
            return;
        }

        loop {
            self.board.reset_watchdog();
            let indication = if !self.device.self_test(&mut self.board) {
                Indication::SelfTestFailed
            } else {
                match self.join() {
                    Ok(()) => break,
                    Err(err) => {
                        warn!("join failed: {:?}", err);
                        Indication::JoinFailed
                    }
                }
            };

            self.error_flag = true;
            self.board.indicate(indication);
            info!("boot retry in {} ms", BOOT_RETRY_PENALTY_MS);
            self.sleep(BOOT_RETRY_PENALTY_MS);
        }

        self.board.indicate(Indication::Joined);
        info!("joined, mode {}", self.mode.descriptor().name);
    }

    /// One join attempt, polled until it completes or times out
    pub fn join(&mut self) -> Result<(), RadioError> {
        if !self.board.is_present() {
            return Ok(());
        }

        let deadline = deadline_after(self.board.now(), JOIN_TIMEOUT_MS);
        loop {
            self.board.reset_watchdog();
            match self.board.join() {
                Ok(()) => return Ok(()),
                Err(nb::Error::Other(err)) => return Err(err),
                Err(nb::Error::WouldBlock) if self.board.now() >= deadline => {
                    return Err(RadioError::Timeout)
                }
                Err(nb::Error::WouldBlock) => {}
            }
        }
    }

    /// Accept console commands for a short window after boot
    fn cli_window(&mut self) {
        let end = deadline_after(self.board.now(), CLI_WINDOW_MS);
        while self.board.now() < end {
            self.board.reset_watchdog();
            if let Some(line) = self.board.poll_command() {
                match self.execute_command(&line) {
                    Ok(()) => debug!("cli ok: {}", line.as_str()),
                    Err(err) => self.report(err),
                }
                continue;
            }

            let wake_at = self.timers.next_deadline().map_or(end, |deadline| deadline.min(end));
            let interrupt = self.board.halt(Some(wake_at));
            self.dispatch(interrupt);
        }
    }

    /// One transmit interval: sleep, scheduled hook, downlinks
    pub fn run_cycle(&mut self) {
        self.sleep(self.schedule.interval_ms());
        let wakeup = self.schedule.record_wakeup();
        trace!("scheduled wakeup {}", wakeup);
        self.run_hook(|device, ctx| device.on_scheduled_wakeup(ctx));
        self.process_downlinks();
    }

    /// Run forever
    pub fn program_loop(mut self) -> ! {
        loop {
            self.run_cycle();
        }
    }
}

/// Persisted node configuration, or defaults when none is usable
fn load_node_config<B: Board>(board: &mut B) -> NodeConfig {
    let mut buf = [0u8; PAGE_SIZE];
    let loaded = board
        .load_config_page(PageId::NODE, &mut buf)
        .and_then(|len| NodeConfig::decode(&buf[..len]));
    match loaded {
        Ok(config) => config,
        Err(StorageError::NotFound) => {
            info!("no node config, starting unconfigured");
            NodeConfig::default()
        }
        Err(err) => {
            warn!("node config unusable ({:?}), starting unconfigured", err);
            NodeConfig::default()
        }
    }
}
