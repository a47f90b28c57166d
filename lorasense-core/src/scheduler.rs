//! Sleep/Wake Scheduler
//!
//! ## Overview
//!
//! [`Node::sleep`] is the only place the node halts. It returns once the
//! periodic transmit alarm has fired, after servicing every other wake cause
//! that arrived in between:
//!
//! ```text
//!        ┌──────────────── pass ────────────────┐
//! entry ─┤ CounterEdge → save data, count hook  │
//!        │ HourlyAlarm → save data, hourly hook │
//!        │ each-wakeup hook                     │
//!        │ watchdog, flush debug                │
//!        └──── alarm fired? ── yes ──→ return   │
//!                   │ no                        │
//!                 halt ──→ dispatch ──→ next pass
//! ```
//!
//! ## Alarm Cadence
//!
//! The alarm is periodic and anchored to its own deadline, so a slow pass
//! does not drift the schedule. The only exceptions are:
//!
//! - a changed interval or an externally modified RTC, which re-arm a full
//!   interval from the moment `sleep` is entered;
//! - an overrun (the alarm fired again while the caller was busy between two
//!   `sleep` calls), which also restarts a full interval rather than returning
//!   at once. The node never sleeps a zero or negative amount.
//!
//! Intervals below the transmit floor are raised to it, and the alarm is
//! always armed before the first halt.

use core::sync::atomic::Ordering;

use crate::board::Board;
use crate::constants::TRANSMIT_INTERVAL_MIN_MS;
use crate::events::WakeCause;
use crate::mode::DeviceMode;
use crate::node::Node;
use crate::timer::TimerId;

impl<B: Board, D: DeviceMode> Node<B, D> {
    /// Sleep until the transmit alarm fires, servicing other wakes meanwhile
    pub fn sleep(&mut self, interval_ms: u32) {
        let interval_ms = interval_ms.max(TRANSMIT_INTERVAL_MIN_MS);
        let now = self.board.now();
        self.service_timers(now);

        let rtc_modified = self.rtc_modified.swap(false, Ordering::AcqRel);
        let alarm_lost = !self.timers.is_armed(TimerId::Alarm);
        if self.armed_interval != Some(interval_ms) || rtc_modified || alarm_lost {
            debug!("alarm re-armed: {} ms", interval_ms);
            self.arm_alarm(interval_ms, now);
            self.wakes.take(WakeCause::Scheduled);
        } else if self.wakes.take(WakeCause::Scheduled) {
            warn!("schedule overrun at {}, restarting interval", now);
            self.arm_alarm(interval_ms, now);
        }

        loop {
            self.run_pass();

            if self.wakes.take(WakeCause::Scheduled) {
                trace!("scheduled wake at {}", self.board.now());
                return;
            }
            if !self.wakes.is_empty() {
                continue;
            }

            let wake_at = self.timers.next_deadline();
            let interrupt = self.board.halt(wake_at);
            self.dispatch(interrupt);
        }
    }

    /// One scheduler pass over the pending wake causes
    fn run_pass(&mut self) {
        let now = self.board.now();
        self.service_timers(now);

        if self.wakes.take(WakeCause::CounterEdge) {
            if let Err(err) = self.save_counter_data() {
                warn!("counter data not saved: {:?}", err);
            }
            self.run_hook(|device, ctx| device.on_count_wakeup(ctx));
        }
        if self.wakes.take(WakeCause::HourlyAlarm) {
            if let Err(err) = self.save_counter_data() {
                warn!("counter data not saved: {:?}", err);
            }
            self.run_hook(|device, ctx| device.on_hourly_alarm(ctx));
        }
        self.run_hook(|device, ctx| device.on_each_wakeup(ctx));

        self.board.reset_watchdog();
        self.board.flush_debug();
    }
}
