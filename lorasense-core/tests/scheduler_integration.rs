//! Sleep/wake scheduler behaviour against the simulated board

mod common;

use common::{spy_node, spy_node_with, SpyMode};
use lorasense_core::constants::TRANSMIT_INTERVAL_MIN_MS;
use lorasense_core::{Channel, HourTick, NodeConfig, PinEdge, TimeSource, WakeCause};

#[test]
fn hooks_run_in_cause_order_then_each_wakeup() {
    let mut node = spy_node(SpyMode::counting());

    // Count settles at 50, hour tick at 100; both pending before sleep
    node.on_pin_edge(PinEdge::new(Channel::One, true, 0));
    node.board_mut().clock.set(100);
    node.on_rtc_hour(HourTick { hour: 1, at: 100 });
    assert!(node.wakes().is_pending(WakeCause::CounterEdge));
    assert!(node.wakes().is_pending(WakeCause::HourlyAlarm));

    node.sleep(60_000);

    assert_eq!(&node.device().calls[..3], &["count", "hourly", "each"]);
    assert_eq!(node.counters().channel(Channel::One).count(), 1);
}

#[test]
fn each_wakeup_runs_once_per_pass() {
    let mut node = spy_node(SpyMode::counting());
    node.board_mut().pulse_at(Channel::One, 1_000, 200);
    node.board_mut().hour_at(7, 5_000);

    node.sleep(10_000);

    let calls = &node.device().calls;
    for (i, call) in calls.iter().enumerate() {
        if *call != "each" {
            assert_eq!(calls.get(i + 1), Some(&"each"), "cause hook not followed by each: {calls:?}");
        }
    }
    assert_eq!(node.device().cause_hooks(), vec!["count", "hourly"]);
}

#[test]
fn counter_wake_persists_counts_before_hook() {
    let mut node = spy_node(SpyMode::counting());
    node.board_mut().pulse_at(Channel::One, 500, 100);

    node.sleep(5_000);

    assert!(!node.board().data_pages.is_empty());
    assert_eq!(node.counters().channel(Channel::One).count(), 1);
}

#[test]
fn returns_when_alarm_fires() {
    let mut node = spy_node(SpyMode::idle());

    node.sleep(1_000);
    assert_eq!(node.board().now(), 1_000);

    node.sleep(1_000);
    assert_eq!(node.board().now(), 2_000);
}

#[test]
fn cadence_is_anchored_to_deadline() {
    let mut node = spy_node(SpyMode::idle());

    node.sleep(1_000);
    // Caller busy for 200 ms
    node.board_mut().clock.advance(200);
    node.sleep(1_000);

    assert_eq!(node.board().now(), 2_000);
}

#[test]
fn overrun_restarts_a_full_interval() {
    let mut node = spy_node(SpyMode::idle());

    node.sleep(1_000);
    assert_eq!(node.board().now(), 1_000);

    // Busy past the next deadline
    node.board_mut().clock.set(2_500);
    node.sleep(1_000);

    assert_eq!(node.board().now(), 3_500);
    for (at, wake_at) in &node.board().halts {
        if let Some(wake_at) = wake_at {
            assert!(wake_at > at, "non-positive sleep: halt at {at} until {wake_at}");
        }
    }
}

#[test]
fn interval_change_rearms_from_entry() {
    let mut node = spy_node(SpyMode::idle());

    node.sleep(1_000);
    node.sleep(5_000);

    assert_eq!(node.board().now(), 6_000);
}

#[test]
fn rtc_change_rearms_from_entry() {
    let mut node = spy_node(SpyMode::idle());

    node.sleep(1_000);
    node.board_mut().clock.advance(300);
    node.mark_rtc_modified();
    node.sleep(1_000);

    assert_eq!(node.board().now(), 2_300);
}

#[test]
fn watchdog_serviced_every_pass() {
    let mut node = spy_node(SpyMode::counting());
    node.board_mut().pulse_at(Channel::One, 100, 100);

    node.sleep(1_000);

    let passes = node.device().calls.iter().filter(|c| **c == "each").count() as u32;
    assert!(passes >= 2);
    assert!(node.board().watchdog_kicks >= passes);
}

#[test]
fn debounce_and_alarm_on_same_millisecond_counts_first() {
    let config = NodeConfig::default();
    let debounce = config.counters[0].debounce_ms as u64;
    let mut node = spy_node_with(&config, SpyMode::counting());
    node.board_mut().edge_at(Channel::One, true, 1_000 - debounce);

    node.sleep(1_000);

    assert_eq!(node.board().now(), 1_000);
    assert_eq!(node.counters().channel(Channel::One).count(), 1);
    assert_eq!(node.device().cause_hooks(), vec!["count"]);
}

#[test]
fn zero_interval_sleeps_the_floor() {
    let mut node = spy_node(SpyMode::idle());
    node.board_mut().clock.set(500);

    node.sleep(0);
    assert_eq!(node.board().now(), 500 + TRANSMIT_INTERVAL_MIN_MS as u64);

    node.sleep(0);
    assert_eq!(node.board().now(), 500 + 2 * TRANSMIT_INTERVAL_MIN_MS as u64);

    for (at, wake_at) in &node.board().halts {
        let wake_at = wake_at.expect("halt without the transmit alarm armed");
        assert!(wake_at > *at, "non-positive sleep: halt at {at} until {wake_at}");
    }
}

#[test]
fn short_interval_is_raised_to_the_floor() {
    let mut node = spy_node(SpyMode::idle());

    node.sleep(10);
    node.sleep(10);

    assert_eq!(node.board().now(), 2 * TRANSMIT_INTERVAL_MIN_MS as u64);
}
