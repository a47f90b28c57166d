//! Boot, mode switching, downlinks and console commands on a simulated board

mod common;

use common::SimBoard;
use lorasense_core::board::Indication;
use lorasense_core::constants::payload::{
    ALARM_BURST, ALARM_DOOR, ALARM_PORT, DATA_PORT, INTERVAL_PORT, MODE_PORT, RELAY_PORT, RTC_PORT,
    WAKEUPS_PORT,
};
use lorasense_core::constants::MS_PER_HOUR;
use lorasense_core::mode::{Behaviour, Thresholds};
use lorasense_core::{
    Channel, Class, ConfigError, Direction, Downlink, HardwareCaps, ModeError, ModeId, Node,
    NodeConfig, NodeError, PageId, RadioError, SensorKind, StorageError, TimeSource,
};

fn fresh_node() -> Node<SimBoard> {
    Node::new(SimBoard::new(), HardwareCaps::default())
}

fn node_in(mode: ModeId) -> Node<SimBoard> {
    let mut node = fresh_node();
    node.select_mode(mode.index()).unwrap();
    node
}

fn store_config(board: &mut SimBoard, config: &NodeConfig) {
    let mut page = [0u8; 256];
    let len = config.encode(&mut page).unwrap();
    board.config_pages.insert(PageId::NODE, page[..len].to_vec());
}

fn stored_config(node: &Node<SimBoard>) -> NodeConfig {
    NodeConfig::decode(&node.board().config_pages[&PageId::NODE]).unwrap()
}

fn downlink(port: u8, bytes: &[u8]) -> Downlink {
    Downlink::new(port, bytes).unwrap()
}

// ===== BOOT =====

#[test]
fn fresh_board_boots_unconfigured_without_joining() {
    let node = Node::boot(SimBoard::new(), HardwareCaps::default());

    assert_eq!(node.mode(), ModeId::Unconfigured);
    assert_eq!(node.board().join_attempts, 0);
    assert_eq!(node.board().indications, vec![Indication::Booting]);
    assert!(!node.error_flag());
}

#[test]
fn corrupt_config_falls_back_to_unconfigured() {
    let mut board = SimBoard::new();
    board.config_pages.insert(PageId::NODE, vec![0xFF; 12]);

    let node = Node::boot(board, HardwareCaps::default());

    assert_eq!(node.mode(), ModeId::Unconfigured);
}

#[test]
fn join_failure_retries_after_penalty() {
    let mut board = SimBoard::new();
    store_config(&mut board, &NodeConfig::default().with_mode(ModeId::OneWireTemperature));
    board.sensors.insert(SensorKind::Temperature, 2100);
    board.join_results.push_back(Err(nb::Error::Other(RadioError::Busy)));

    let node = Node::boot(board, HardwareCaps::default());

    assert_eq!(node.mode(), ModeId::OneWireTemperature);
    assert!(node.error_flag());
    assert_eq!(node.board().join_attempts, 2);
    assert_eq!(
        node.board().indications,
        vec![Indication::Booting, Indication::JoinFailed, Indication::Joined]
    );
    // CLI window, then one penalty sleep
    assert_eq!(node.board().now(), 30_000 + 300_000);
}

#[test]
fn unavailable_stored_mode_falls_back_to_unconfigured() {
    let caps = HardwareCaps { legacy_counter_compatible: false };
    let mut node = Node::new(SimBoard::new(), caps);

    node.update_device_behaviour(ModeId::Counter3);

    assert_eq!(node.mode(), ModeId::Unconfigured);
    assert_eq!(node.counters().active_mask(), 0);
}

#[test]
fn join_without_radio_succeeds() {
    let mut board = SimBoard::new();
    board.radio_present = false;
    let mut node = Node::new(board, HardwareCaps::default());

    assert_eq!(node.join(), Ok(()));
    assert_eq!(node.board().join_attempts, 0);
}

#[test]
fn join_times_out_while_kicking_watchdog() {
    let mut board = SimBoard::new();
    store_config(&mut board, &NodeConfig::default().with_mode(ModeId::Counter1));
    for _ in 0..30 {
        board.join_results.push_back(Err(nb::Error::WouldBlock));
    }

    let node = Node::boot(board, HardwareCaps::default());

    assert!(node.error_flag());
    assert_eq!(node.board().join_attempts, 31);
    assert!(node.board().watchdog_kicks >= 31);
    assert_eq!(
        node.board().indications,
        vec![Indication::Booting, Indication::JoinFailed, Indication::Joined]
    );
}

#[test]
fn boot_restores_counts() {
    let mut board = SimBoard::new();
    store_config(&mut board, &NodeConfig::default().with_mode(ModeId::Counter1));
    {
        let mut node = node_in(ModeId::Counter1);
        node.counters_mut().set_count(Channel::One, 4242).unwrap();
        node.save_counter_data().unwrap();
        board.data_pages = node.board().data_pages.clone();
    }

    let node = Node::boot(board, HardwareCaps::default());

    assert_eq!(node.counters().channel(Channel::One).count(), 4242);
}

#[test]
fn cli_window_accepts_mode_change() {
    let mut board = SimBoard::new();
    board.queue_command("mode 1");

    let node = Node::boot(board, HardwareCaps::default());

    assert_eq!(node.mode(), ModeId::Counter1);
    assert_eq!(stored_config(&node).mode, ModeId::Counter1);
    assert_eq!(node.board().join_attempts, 1);
}

#[test]
fn watchdog_reset_is_reported() {
    let mut board = SimBoard::new();
    board.reset_cause = lorasense_core::board::ResetCause::Watchdog;
    let node = Node::new(board, HardwareCaps::default());
    assert!(node.watchdog_reset_occurred());
}

// ===== MODE SWITCHING =====

#[test]
fn unreadable_mode_config_rolls_back() {
    let mut node = node_in(ModeId::OneWireTemperature);
    node.board_mut().corrupt_config_pages.insert(PageId::for_mode(ModeId::Light.index()));

    assert_eq!(
        node.select_mode(ModeId::Light.index()),
        Err(ModeError::LoadFailed(StorageError::Corrupt))
    );
    assert_eq!(node.mode(), ModeId::OneWireTemperature);
    assert_eq!(node.device().id(), ModeId::OneWireTemperature);
}

#[test]
fn legacy_modes_refused_on_incompatible_board() {
    let caps = HardwareCaps { legacy_counter_compatible: false };
    let mut node = Node::new(SimBoard::new(), caps);
    node.select_mode(ModeId::Counter2.index()).unwrap();

    assert_eq!(
        node.select_mode(ModeId::Counter3.index()),
        Err(ModeError::LegacyCounterConflict { mode: "counter-3" })
    );
    assert!(matches!(
        node.select_mode(ModeId::DirectionalCounter.index()),
        Err(ModeError::LegacyCounterConflict { .. })
    ));
    assert_eq!(node.mode(), ModeId::Counter2);
    assert!(!node.counters().is_active(Channel::Three));
}

#[test]
fn out_of_range_mode_rejected() {
    let mut node = fresh_node();
    assert_eq!(node.select_mode(21), Err(ModeError::OutOfRange { index: 21 }));
    assert_eq!(node.mode(), ModeId::Unconfigured);
}

#[test]
fn class_follows_mode() {
    let mut node = node_in(ModeId::RelayOutput);
    assert_eq!(node.board().class, Some(Class::C));

    node.select_mode(ModeId::Counter1.index()).unwrap();
    assert_eq!(node.board().class, Some(Class::A));
}

#[test]
fn mode_switch_activates_only_its_channels() {
    let node = node_in(ModeId::Counter2);
    assert!(node.counters().is_active(Channel::One));
    assert!(node.counters().is_active(Channel::Two));
    assert!(!node.counters().is_active(Channel::Three));

    let node = node_in(ModeId::OneWireTemperature);
    assert_eq!(node.counters().active_mask(), 0);
}

#[test]
fn mode_data_survives_a_round_trip_through_another_mode() {
    let mut node = node_in(ModeId::RelayOutput);
    node.execute_command("device relay 1 on").unwrap();

    node.select_mode(ModeId::Counter1.index()).unwrap();
    node.board_mut().outputs.clear();
    node.select_mode(ModeId::RelayOutput.index()).unwrap();

    match node.device().behaviour() {
        Behaviour::Relay(relay) => assert_eq!(relay.outputs(), 0b10),
        other => panic!("unexpected behaviour {other:?}"),
    }
    assert_eq!(node.board().outputs.get(&1), Some(&true));
}

// ===== SCHEDULED UPLINKS =====

#[test]
fn counter_uplink_carries_counts_and_leak_flags() {
    let mut node = node_in(ModeId::Counter1);
    node.board_mut().pulse_at(Channel::One, 1_000, 200);
    node.board_mut().pulse_at(Channel::One, 5_000, 200);

    node.run_cycle();

    let uplinks = node.board().uplinks_on(DATA_PORT);
    assert_eq!(uplinks.len(), 1);
    assert_eq!(uplinks[0].data, vec![1, 0x01, 0, 0, 0, 2, 0, 0, 0, 0]);
}

#[test]
fn probe_uplinks_every_nth_wake_unless_out_of_window() {
    let mut node = node_in(ModeId::OneWireTemperature);
    node.board_mut().sensors.insert(SensorKind::Temperature, 2000);
    node.execute_command("wakeups 3").unwrap();
    node.execute_command("thresholds -500 3000").unwrap();

    for _ in 0..3 {
        node.run_cycle();
    }
    let uplinks = node.board().uplinks_on(DATA_PORT);
    assert_eq!(uplinks.len(), 1);
    assert_eq!(uplinks[0].data, vec![9, 0, 0, 0, 0x07, 0xD0]);

    node.board_mut().sensors.insert(SensorKind::Temperature, 5000);
    node.run_cycle();
    let uplinks = node.board().uplinks_on(DATA_PORT);
    assert_eq!(uplinks.len(), 2);
    assert_eq!(uplinks[1].data, vec![9, 1, 0, 0, 0x13, 0x88]);
}

#[test]
fn failed_read_sends_sentinel() {
    let mut node = node_in(ModeId::OneWireTemperature);
    node.run_cycle();

    let uplinks = node.board().uplinks_on(DATA_PORT);
    assert_eq!(uplinks[0].data, vec![9, 0, 0x7F, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn thermostat_heats_below_setpoint() {
    let mut node = node_in(ModeId::Thermostat);
    node.board_mut().sensors.insert(SensorKind::Temperature, 1000);

    node.run_cycle();

    assert_eq!(node.board().outputs.get(&0), Some(&true));
    let uplinks = node.board().uplinks_on(DATA_PORT);
    assert_eq!(uplinks[0].data, vec![20, 0, 0, 0x03, 0xE8, 0, 0, 0x07, 0xD0, 1]);
}

/// Six pulses on input 1 during `hour`, then the next hour boundary
fn busy_hour(board: &mut SimBoard, hour: u64) {
    for k in 0..6u64 {
        board.pulse_at(Channel::One, hour * MS_PER_HOUR + 60_000 + k * 1_000, 200);
    }
    board.hour_at(hour as u32 + 1, (hour + 1) * MS_PER_HOUR);
}

fn drain(node: &mut Node<SimBoard>) {
    while !node.board().script.is_empty() {
        node.run_cycle();
    }
}

fn burst_node() -> Node<SimBoard> {
    let mut node = node_in(ModeId::TwoCounterAlarms);
    node.counters_mut().set_debounce(Channel::One, 100).unwrap();
    node.counters_mut().set_burst(Channel::One, 5, 2).unwrap();
    node.board_mut().hour_at(0, 1_000);
    node
}

#[test]
fn burst_alarm_end_to_end() {
    let mut node = burst_node();

    busy_hour(node.board_mut(), 0);
    drain(&mut node);

    let burst = node.counters().channel(Channel::One).burst();
    assert_eq!(burst.consecutive_hours(), 1);
    assert!(burst.is_latched(1));
    assert!(node.board().uplinks_on(ALARM_PORT).is_empty());

    busy_hour(node.board_mut(), 1);
    drain(&mut node);

    assert_eq!(node.counters().channel(Channel::One).burst().consecutive_hours(), 2);
    let alarms = node.board().uplinks_on(ALARM_PORT);
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms[0].data, vec![ModeId::TwoCounterAlarms.index(), ALARM_BURST, 0x01]);
    assert_eq!(alarms[0].at, 2 * MS_PER_HOUR);

    // A run that keeps going does not alarm again
    busy_hour(node.board_mut(), 2);
    drain(&mut node);

    assert_eq!(node.counters().channel(Channel::One).count(), 18);
    assert_eq!(node.board().uplinks_on(ALARM_PORT).len(), 1);
}

#[test]
fn burst_run_survives_a_watchdog_reset() {
    let mut node = burst_node();
    busy_hour(node.board_mut(), 0);
    drain(&mut node);

    let mut board = SimBoard::new();
    store_config(&mut board, &node.config());
    board.data_pages = node.board().data_pages.clone();
    board.reset_cause = lorasense_core::board::ResetCause::Watchdog;
    board.clock.set(MS_PER_HOUR + 1_000);

    let mut node = Node::boot(board, HardwareCaps::default());

    let burst = node.counters().channel(Channel::One).burst();
    assert_eq!(burst.consecutive_hours(), 1);
    assert!(burst.is_latched(1));

    busy_hour(node.board_mut(), 1);
    drain(&mut node);

    let alarms = node.board().uplinks_on(ALARM_PORT);
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms[0].at, 2 * MS_PER_HOUR);
}

#[test]
fn leak_state_rides_data_uplinks_not_alarms() {
    let mut node = node_in(ModeId::TwoCounterAlarms);

    node.run_cycle();
    node.run_cycle();

    let uplinks = node.board().uplinks_on(DATA_PORT);
    assert_eq!(uplinks.len(), 2);
    for uplink in uplinks {
        assert_eq!(&uplink.data[..2], &[ModeId::TwoCounterAlarms.index(), 0x03]);
    }
    assert!(node.board().uplinks_on(ALARM_PORT).is_empty());
}

#[test]
fn door_contact_alarms_once_the_input_settles() {
    let mut node = fresh_node();
    node.board_mut().sensors.insert(SensorKind::DigitalInputs, 0);
    node.board_mut().mirror_pins = true;
    node.select_mode(ModeId::DoorContact.index()).unwrap();
    let debounce = node.counters().channel(Channel::One).config().debounce_ms as u64;

    node.board_mut().edge_at(Channel::One, true, 1_000);
    node.board_mut().edge_at(Channel::One, false, 5_000);
    node.run_cycle();

    let door = ModeId::DoorContact.index();
    let alarms = node.board().uplinks_on(ALARM_PORT);
    assert_eq!(alarms.len(), 2);
    assert_eq!(alarms[0].data, vec![door, ALARM_DOOR, 1, 0, 0, 0, 1]);
    assert_eq!(alarms[0].at, 1_000 + debounce);
    assert_eq!(alarms[1].data, vec![door, ALARM_DOOR, 0, 0, 0, 0, 1]);
    assert_eq!(alarms[1].at, 5_000 + debounce);

    let uplinks = node.board().uplinks_on(DATA_PORT);
    assert_eq!(uplinks.len(), 1);
    assert_eq!(uplinks[0].data, vec![door, 0, 0, 0, 0, 1]);
}

#[test]
fn digital_inputs_uplink_the_bitmap() {
    let mut node = node_in(ModeId::DigitalInputs);
    node.board_mut().sensors.insert(SensorKind::DigitalInputs, 5);

    node.run_cycle();

    let uplinks = node.board().uplinks_on(DATA_PORT);
    assert_eq!(uplinks[0].data, vec![ModeId::DigitalInputs.index(), 0, 0, 0, 5]);
}

#[test]
fn modbus_meter_sends_sentinel_for_silent_register() {
    let mut node = node_in(ModeId::ModbusEnergy);
    node.board_mut().sensors.insert(SensorKind::EnergyWh, 1_234);

    node.run_cycle();

    let uplinks = node.board().uplinks_on(DATA_PORT);
    assert_eq!(
        uplinks[0].data,
        vec![ModeId::ModbusEnergy.index(), 0, 0, 0x04, 0xD2, 0x7F, 0xFF, 0xFF, 0xFF]
    );
}

#[test]
fn climate_counter_appends_leak_mask_and_count() {
    let mut node = node_in(ModeId::ClimateCounter);
    node.board_mut().sensors.insert(SensorKind::Temperature, 2150);
    node.board_mut().sensors.insert(SensorKind::Humidity, 4500);
    node.board_mut().pulse_at(Channel::One, 1_000, 200);
    node.board_mut().pulse_at(Channel::One, 3_000, 200);

    node.run_cycle();

    let uplinks = node.board().uplinks_on(DATA_PORT);
    assert_eq!(
        uplinks[0].data,
        vec![
            ModeId::ClimateCounter.index(),
            0,
            0, 0, 0x08, 0x66,
            0, 0, 0x11, 0x94,
            0x01,
            0, 0, 0, 2,
        ]
    );
}

// ===== DOWNLINKS =====

#[test]
fn interval_downlink_updates_and_persists() {
    let mut node = fresh_node();
    node.handle_downlink(&downlink(INTERVAL_PORT, &3600u32.to_be_bytes())).unwrap();

    assert_eq!(node.schedule().interval_ms(), 3_600_000);
    assert_eq!(stored_config(&node).transmit_interval_ms, 3_600_000);
}

#[test]
fn malformed_downlinks_change_nothing() {
    let mut node = fresh_node();
    let before = node.schedule().interval_ms();

    assert_eq!(
        node.handle_downlink(&downlink(INTERVAL_PORT, &[0, 1])),
        Err(NodeError::Config(ConfigError::InvalidArgument { reason: "downlink length" }))
    );
    assert_eq!(
        node.handle_downlink(&downlink(INTERVAL_PORT, &0u32.to_be_bytes())),
        Err(NodeError::Config(ConfigError::IntervalBelowFloor { requested: 0, floor: 1000 }))
    );
    assert_eq!(
        node.handle_downlink(&downlink(WAKEUPS_PORT, &0u16.to_be_bytes())),
        Err(NodeError::Config(ConfigError::WakeupsPerUplinkZero))
    );
    assert_eq!(node.schedule().interval_ms(), before);
    assert!(node.board().config_pages.is_empty());
}

#[test]
fn mode_and_wakeups_downlinks() {
    let mut node = fresh_node();
    node.board_mut().queue_downlink(MODE_PORT, &[ModeId::RelayOutput.index()]);
    node.board_mut().queue_downlink(WAKEUPS_PORT, &4u16.to_be_bytes());

    assert_eq!(node.process_downlinks(), 2);
    assert_eq!(node.mode(), ModeId::RelayOutput);
    assert_eq!(node.board().class, Some(Class::C));
    assert_eq!(node.schedule().wakeups_per_uplink(), 4);

    let stored = stored_config(&node);
    assert_eq!(stored.mode, ModeId::RelayOutput);
    assert_eq!(stored.wakeups_per_uplink, 4);
}

#[test]
fn refused_mode_downlink_keeps_mode() {
    let caps = HardwareCaps { legacy_counter_compatible: false };
    let mut node = Node::new(SimBoard::new(), caps);

    assert_eq!(
        node.handle_downlink(&downlink(MODE_PORT, &[ModeId::Counter3.index()])),
        Err(NodeError::Mode(ModeError::LegacyCounterConflict { mode: "counter-3" }))
    );
    assert_eq!(node.mode(), ModeId::Unconfigured);
}

#[test]
fn rtc_downlink_rearms_the_alarm() {
    let mut node = fresh_node();
    node.sleep(1_000);
    node.board_mut().clock.advance(100);

    node.handle_downlink(&downlink(RTC_PORT, &1_700_000_000u32.to_be_bytes())).unwrap();
    assert_eq!(node.board().rtc, Some(1_700_000_000));

    node.sleep(1_000);
    assert_eq!(node.board().now(), 2_100);
}

#[test]
fn device_ports_go_to_the_mode() {
    let mut node = node_in(ModeId::RelayOutput);
    node.board_mut().queue_downlink(RELAY_PORT, &[2, 1]);

    node.process_downlinks();

    assert_eq!(node.board().outputs.get(&2), Some(&true));
    let page = PageId::for_mode(ModeId::RelayOutput.index());
    assert!(node.board().data_pages.contains_key(&page));
}

#[test]
fn repeated_rejections_are_rate_limited() {
    let mut node = fresh_node();
    node.board_mut().queue_downlink(INTERVAL_PORT, &[1]);
    node.board_mut().queue_downlink(INTERVAL_PORT, &[2]);

    assert_eq!(node.process_downlinks(), 2);
    assert_eq!(node.diagnostics().suppressed(), 1);
}

// ===== CONSOLE =====

#[test]
fn counter_commands_need_a_counting_mode() {
    let mut node = fresh_node();
    assert_eq!(
        node.execute_command("debounce 1 80"),
        Err(NodeError::Config(ConfigError::Unsupported))
    );

    node.execute_command("mode 1").unwrap();
    node.execute_command("debounce 1 80").unwrap();
    assert_eq!(node.counters().channel(Channel::One).config().debounce_ms, 80);
    assert_eq!(stored_config(&node).counters[0].debounce_ms, 80);
}

#[test]
fn rejected_counter_setting_keeps_previous() {
    let mut node = node_in(ModeId::Counter1);
    node.execute_command("debounce 1 80").unwrap();

    assert_eq!(
        node.execute_command("debounce 1 5"),
        Err(NodeError::Config(ConfigError::DebounceBelowFloor { requested: 5, floor: 10 }))
    );
    assert_eq!(
        node.execute_command("debounce 4 80"),
        Err(NodeError::Config(ConfigError::UnknownChannel))
    );
    assert_eq!(node.counters().channel(Channel::One).config().debounce_ms, 80);
}

#[test]
fn count_command_sets_and_persists() {
    let mut node = node_in(ModeId::Counter1);
    node.execute_command("count 1 500").unwrap();

    assert_eq!(node.counters().channel(Channel::One).count(), 500);
    assert!(node.board().data_pages.contains_key(&PageId::COUNTERS));

    assert_eq!(
        node.execute_command("count 2 1"),
        Err(NodeError::Config(ConfigError::UnknownChannel))
    );
}

#[test]
fn invert_on_directional_counter() {
    let mut node = node_in(ModeId::DirectionalCounter);
    node.execute_command("invert 1 on").unwrap();

    assert_eq!(
        node.counters().channel(Channel::One).config().direction,
        Some(Direction { invert: true })
    );
}

#[test]
fn leaving_directional_mode_drops_the_direction_pin() {
    let mut node = node_in(ModeId::DirectionalCounter);
    node.execute_command("invert 1 on").unwrap();

    node.select_mode(ModeId::ClimateCounter.index()).unwrap();
    node.board_mut().pulse_at(Channel::One, 1_000, 200);
    node.board_mut().pulse_at(Channel::One, 3_000, 200);
    node.sleep(60_000);

    let channel = node.counters().channel(Channel::One);
    assert_eq!(channel.config().direction, None);
    assert_eq!(channel.count(), 2);
    assert_eq!(channel.reverse_count(), 0);
    assert_eq!(
        node.execute_command("invert 1 on"),
        Err(NodeError::Config(ConfigError::DirectionUnsupported))
    );
}

#[test]
fn directional_inversion_survives_a_reboot() {
    let mut board = SimBoard::new();
    {
        let mut node = node_in(ModeId::DirectionalCounter);
        node.execute_command("invert 1 on").unwrap();
        store_config(&mut board, &node.config());
    }

    let node = Node::boot(board, HardwareCaps::default());

    assert_eq!(
        node.counters().channel(Channel::One).config().direction,
        Some(Direction { invert: true })
    );
}

#[test]
fn thresholds_persist_per_mode() {
    let mut node = node_in(ModeId::Light);
    node.execute_command("thresholds 10 900").unwrap();

    node.execute_command("mode 1").unwrap();
    node.execute_command("mode 12").unwrap();

    match node.device().behaviour() {
        Behaviour::Probe(probe) => assert_eq!(
            probe.thresholds(),
            Thresholds { low: 10, high: 900, enabled: true }
        ),
        other => panic!("unexpected behaviour {other:?}"),
    }
}

#[test]
fn device_command_reaches_thermostat() {
    let mut node = node_in(ModeId::Thermostat);
    node.execute_command("device setpoint 2150").unwrap();

    match node.device().behaviour() {
        Behaviour::Thermostat(thermostat) => assert_eq!(thermostat.setpoint(), 2150),
        other => panic!("unexpected behaviour {other:?}"),
    }
}

#[test]
fn unknown_and_empty_lines() {
    let mut node = fresh_node();
    assert_eq!(
        node.execute_command("frobnicate"),
        Err(NodeError::Config(ConfigError::InvalidArgument { reason: "unknown command" }))
    );
    assert_eq!(node.execute_command("   "), Ok(()));
}

#[test]
fn interval_command_takes_seconds() {
    let mut node = fresh_node();
    node.execute_command("interval 60").unwrap();
    assert_eq!(node.schedule().interval_ms(), 60_000);
}
