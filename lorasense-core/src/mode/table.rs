//! The device mode table
//!
//! One descriptor per supported sensor type. The table index is the mode
//! index used by the CLI, the mode downlink and the persisted config.

use super::active::{Behaviour, Unconfigured};
use super::counter::{CounterAlarmMode, CounterMode};
use super::digital::{DigitalInputsMode, DoorContactMode, RelayMode};
use super::modbus::ModbusMode;
use super::probe::ProbeMode;
use super::thermostat::ThermostatMode;
use super::CliCaps;
use crate::board::SensorKind;
use crate::events::Channel;

/// Index into the mode table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ModeId {
    Unconfigured = 0,
    Counter1 = 1,
    Counter2 = 2,
    Counter3 = 3,
    TwoCounterAlarms = 4,
    DirectionalCounter = 5,
    DoorContact = 6,
    DigitalInputs = 7,
    RelayOutput = 8,
    OneWireTemperature = 9,
    TemperatureHumidity = 10,
    Co2 = 11,
    Light = 12,
    Pressure = 13,
    AnalogInput = 14,
    Distance = 15,
    ModbusEnergy = 16,
    ModbusWater = 17,
    ModbusGeneric = 18,
    ClimateCounter = 19,
    Thermostat = 20,
}

impl ModeId {
    /// Number of modes in the table
    pub const COUNT: usize = 21;

    /// Every mode in table order
    pub const ALL: [ModeId; Self::COUNT] = [
        ModeId::Unconfigured,
        ModeId::Counter1,
        ModeId::Counter2,
        ModeId::Counter3,
        ModeId::TwoCounterAlarms,
        ModeId::DirectionalCounter,
        ModeId::DoorContact,
        ModeId::DigitalInputs,
        ModeId::RelayOutput,
        ModeId::OneWireTemperature,
        ModeId::TemperatureHumidity,
        ModeId::Co2,
        ModeId::Light,
        ModeId::Pressure,
        ModeId::AnalogInput,
        ModeId::Distance,
        ModeId::ModbusEnergy,
        ModeId::ModbusWater,
        ModeId::ModbusGeneric,
        ModeId::ClimateCounter,
        ModeId::Thermostat,
    ];

    /// Mode for a table index
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Table index
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Descriptor for this mode
    pub fn descriptor(self) -> &'static ModeDescriptor {
        &MODE_TABLE[self as usize]
    }
}

/// Fixed description of a device mode
pub struct ModeDescriptor {
    /// Which mode this is
    pub id: ModeId,
    /// Name shown on the console
    pub name: &'static str,
    /// CLI command groups the mode accepts
    pub cli_commands: CliCaps,
    /// Keeps the receiver on (relay, thermostat)
    pub class_c: bool,
    /// Needs the counter input legacy boards share with the radio
    pub legacy_counter: bool,
    /// Fresh behaviour state
    pub build: fn() -> Behaviour,
}

impl core::fmt::Debug for ModeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModeDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

const COUNTING: CliCaps = CliCaps::COUNTERS;
const PROBE: CliCaps = CliCaps::THRESHOLDS;
const PROBE_COUNTING: CliCaps = CliCaps::THRESHOLDS.union(CliCaps::COUNTERS);

const fn entry(id: ModeId, name: &'static str, cli_commands: CliCaps, build: fn() -> Behaviour) -> ModeDescriptor {
    ModeDescriptor {
        id,
        name,
        cli_commands,
        class_c: false,
        legacy_counter: false,
        build,
    }
}

const fn class_c(mut descriptor: ModeDescriptor) -> ModeDescriptor {
    descriptor.class_c = true;
    descriptor
}

const fn legacy(mut descriptor: ModeDescriptor) -> ModeDescriptor {
    descriptor.legacy_counter = true;
    descriptor
}

/// All device modes, indexed by [`ModeId`]
pub static MODE_TABLE: [ModeDescriptor; ModeId::COUNT] = [
    entry(ModeId::Unconfigured, "unconfigured", CliCaps::NONE, unconfigured),
    entry(ModeId::Counter1, "counter-1", COUNTING, counter_1),
    entry(ModeId::Counter2, "counter-2", COUNTING, counter_2),
    legacy(entry(ModeId::Counter3, "counter-3", COUNTING, counter_3)),
    entry(ModeId::TwoCounterAlarms, "two-counter-alarms", COUNTING, two_counter_alarms),
    legacy(entry(ModeId::DirectionalCounter, "directional-counter", COUNTING, directional_counter)),
    entry(ModeId::DoorContact, "door-contact", COUNTING, door_contact),
    entry(ModeId::DigitalInputs, "digital-inputs", CliCaps::NONE, digital_inputs),
    class_c(entry(ModeId::RelayOutput, "relay-output", CliCaps::DEVICE, relay_output)),
    entry(ModeId::OneWireTemperature, "one-wire-temperature", PROBE, one_wire_temperature),
    entry(ModeId::TemperatureHumidity, "temperature-humidity", PROBE, temperature_humidity),
    entry(ModeId::Co2, "co2", PROBE, co2),
    entry(ModeId::Light, "light", PROBE, light),
    entry(ModeId::Pressure, "pressure", PROBE, pressure),
    entry(ModeId::AnalogInput, "analog-input", PROBE, analog_input),
    entry(ModeId::Distance, "distance", PROBE, distance),
    entry(ModeId::ModbusEnergy, "modbus-energy", CliCaps::NONE, modbus_energy),
    entry(ModeId::ModbusWater, "modbus-water", CliCaps::NONE, modbus_water),
    entry(ModeId::ModbusGeneric, "modbus-generic", CliCaps::DEVICE, modbus_generic),
    entry(ModeId::ClimateCounter, "climate-counter", PROBE_COUNTING, climate_counter),
    class_c(entry(ModeId::Thermostat, "thermostat", CliCaps::DEVICE, thermostat)),
];

fn unconfigured() -> Behaviour {
    Behaviour::Unconfigured(Unconfigured)
}

fn counter_1() -> Behaviour {
    Behaviour::Counter(CounterMode::new(ModeId::Counter1, &[Channel::One]))
}

fn counter_2() -> Behaviour {
    Behaviour::Counter(CounterMode::new(ModeId::Counter2, &[Channel::One, Channel::Two]))
}

fn counter_3() -> Behaviour {
    Behaviour::Counter(CounterMode::new(
        ModeId::Counter3,
        &[Channel::One, Channel::Two, Channel::Three],
    ))
}

fn two_counter_alarms() -> Behaviour {
    Behaviour::CounterAlarms(CounterAlarmMode::new(ModeId::TwoCounterAlarms, &[Channel::One, Channel::Two]))
}

fn directional_counter() -> Behaviour {
    Behaviour::Counter(CounterMode::directional(ModeId::DirectionalCounter, Channel::One))
}

fn door_contact() -> Behaviour {
    Behaviour::DoorContact(DoorContactMode::new())
}

fn digital_inputs() -> Behaviour {
    Behaviour::DigitalInputs(DigitalInputsMode::new())
}

fn relay_output() -> Behaviour {
    Behaviour::Relay(RelayMode::new())
}

fn one_wire_temperature() -> Behaviour {
    Behaviour::Probe(ProbeMode::new(ModeId::OneWireTemperature, &[SensorKind::Temperature]))
}

fn temperature_humidity() -> Behaviour {
    Behaviour::Probe(ProbeMode::new(
        ModeId::TemperatureHumidity,
        &[SensorKind::Temperature, SensorKind::Humidity],
    ))
}

fn co2() -> Behaviour {
    Behaviour::Probe(ProbeMode::new(
        ModeId::Co2,
        &[SensorKind::Co2, SensorKind::Temperature, SensorKind::Humidity],
    ))
}

fn light() -> Behaviour {
    Behaviour::Probe(ProbeMode::new(ModeId::Light, &[SensorKind::Lux]))
}

fn pressure() -> Behaviour {
    Behaviour::Probe(ProbeMode::new(ModeId::Pressure, &[SensorKind::Pressure]))
}

fn analog_input() -> Behaviour {
    Behaviour::Probe(ProbeMode::new(ModeId::AnalogInput, &[SensorKind::Analog]))
}

fn distance() -> Behaviour {
    Behaviour::Probe(ProbeMode::new(ModeId::Distance, &[SensorKind::Distance]))
}

fn modbus_energy() -> Behaviour {
    Behaviour::Modbus(ModbusMode::fixed(ModeId::ModbusEnergy, &[SensorKind::EnergyWh, SensorKind::PowerW]))
}

fn modbus_water() -> Behaviour {
    Behaviour::Modbus(ModbusMode::fixed(ModeId::ModbusWater, &[SensorKind::VolumeL, SensorKind::FlowLph]))
}

fn modbus_generic() -> Behaviour {
    Behaviour::Modbus(ModbusMode::generic(ModeId::ModbusGeneric))
}

fn climate_counter() -> Behaviour {
    Behaviour::Probe(
        ProbeMode::new(
            ModeId::ClimateCounter,
            &[SensorKind::Temperature, SensorKind::Humidity],
        )
        .with_counter(&[Channel::One]),
    )
}

fn thermostat() -> Behaviour {
    Behaviour::Thermostat(ThermostatMode::new())
}
