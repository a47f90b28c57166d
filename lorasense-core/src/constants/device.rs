//! Device Mode Defaults

/// Thermostat setpoint for a fresh node (centi-degrees Celsius).
pub const DEFAULT_SETPOINT_CENTI: i32 = 2000;

/// Dead band either side of the setpoint (centi-degrees Celsius).
pub const THERMOSTAT_HYSTERESIS_CENTI: i32 = 50;

/// Holding register polled by the generic modbus mode until configured.
pub const DEFAULT_MODBUS_REGISTER: u16 = 0;

/// Relay outputs a relay-output board drives.
pub const RELAY_OUTPUTS: u8 = 4;
