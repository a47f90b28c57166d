//! Collaborator Traits
//!
//! The core never touches hardware. Everything it needs from the board is
//! reached through the small traits in this module, and a board support
//! package implements all of them on one type. The blanket [`Board`] impl
//! then lets the scheduler take a single generic parameter.
//!
//! Keep implementations boring: the core calls these from its main context
//! only, never from interrupt context.

use heapless::{String, Vec};

use crate::constants::payload::MAX_DOWNLINK_LEN;
use crate::errors::{RadioError, SensorError, StorageError};
use crate::events::Interrupt;
use crate::time::{TimeSource, Timestamp};

// ===== RADIO =====

/// LoRaWAN device class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Class {
    /// Receive windows only after an uplink
    A,
    /// Continuous receive
    C,
}

/// Application downlink handed over by the LoRaWAN stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downlink {
    /// FPort the frame arrived on
    pub port: u8,
    /// Decrypted application payload
    pub data: Vec<u8, MAX_DOWNLINK_LEN>,
}

impl Downlink {
    /// Copy `bytes` into a downlink; `None` if they do not fit
    pub fn new(port: u8, bytes: &[u8]) -> Option<Self> {
        Some(Self {
            port,
            data: Vec::from_slice(bytes).ok()?,
        })
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Downlink {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Downlink {{ port: {}, data: ", self.port);
        for byte in self.data.iter() {
            defmt::write!(f, "{:02x}", byte);
        }
        defmt::write!(f, " }}")
    }
}

/// LoRaWAN stack
pub trait Radio {
    /// Whether a radio is fitted (bench boards may have none)
    fn is_present(&self) -> bool {
        true
    }

    /// Drive an OTAA join; `WouldBlock` while it is in progress
    fn join(&mut self) -> nb::Result<(), RadioError>;

    /// Send an unconfirmed uplink
    fn uplink(&mut self, port: u8, payload: &[u8]) -> Result<(), RadioError>;

    /// Switch device class
    fn set_class(&mut self, class: Class);

    /// Next queued application downlink
    fn take_downlink(&mut self) -> Option<Downlink>;
}

// ===== STORAGE =====

/// Small key for a persisted page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PageId(pub u8);

impl PageId {
    /// Node configuration (config page)
    pub const NODE: PageId = PageId(0);

    /// Counter engine counts and history (data page)
    pub const COUNTERS: PageId = PageId(0);

    /// Page holding a device mode's own config or data
    pub const fn for_mode(mode_index: u8) -> PageId {
        PageId(mode_index.saturating_add(1))
    }
}

/// Durable config and data slots
///
/// Each save is atomic: a later load returns either the old or the new record,
/// never a mix.
pub trait Storage {
    /// Read a config page into `buf`; returns the record length
    fn load_config_page(&mut self, page: PageId, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Replace a config page
    fn save_config_page(&mut self, page: PageId, record: &[u8]) -> Result<(), StorageError>;

    /// Read a data page into `buf`; returns the record length
    fn load_data_page(&mut self, page: PageId, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Replace a data page
    fn save_data_page(&mut self, page: PageId, record: &[u8]) -> Result<(), StorageError>;
}

// ===== WATCHDOG =====

/// Independent watchdog
pub trait Watchdog {
    /// Pet the watchdog
    fn reset_watchdog(&mut self);
}

// ===== POWER =====

/// Why the MCU last reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetCause {
    /// Cold start
    PowerOn,
    /// Independent or window watchdog
    Watchdog,
    /// Firmware requested reset
    Software,
    /// External reset pin
    Pin,
    /// Supply dropped below the brown-out level
    BrownOut,
}

/// Low-power control and the monotonic clock
pub trait Power: TimeSource {
    /// Enter the deepest halt that still keeps the wake sources alive
    ///
    /// Returns when `wake_at` is reached (`Interrupt::Timer`) or any other
    /// wake source fires first. `None` means no timer wake.
    fn halt(&mut self, wake_at: Option<Timestamp>) -> Interrupt;

    /// Cause of the last reset
    fn reset_cause(&self) -> ResetCause;

    /// Drain buffered debug output before halting
    fn flush_debug(&mut self) {}

    /// Set the wall clock
    fn set_rtc(&mut self, _epoch_seconds: u32) {}
}

// ===== SENSORS =====

/// Quantity a device mode can ask the sensor layer for
///
/// Readings are fixed-point integers in the unit named on each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    /// Temperature, centi-degrees Celsius
    Temperature,
    /// Relative humidity, centi-percent
    Humidity,
    /// CO2, ppm
    Co2,
    /// Illuminance, lux
    Lux,
    /// Pressure, pascal
    Pressure,
    /// Raw ADC counts
    Analog,
    /// Distance, millimetres
    Distance,
    /// Digital input bitmap
    DigitalInputs,
    /// Energy register, watt-hours
    EnergyWh,
    /// Instantaneous power, watts
    PowerW,
    /// Volume register, litres
    VolumeL,
    /// Flow, litres per hour
    FlowLph,
    /// Raw modbus holding register
    Register(u16),
}

/// Sensor drivers and outputs
pub trait Sensors {
    /// Read one quantity; drivers retry internally before failing
    fn read(&mut self, kind: SensorKind) -> Result<i32, SensorError>;

    /// Drive output `index`
    fn set_output(&mut self, _index: u8, _on: bool) -> Result<(), SensorError> {
        Err(SensorError::Unsupported)
    }
}

// ===== INDICATOR =====

/// LED pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indication {
    /// Boot started
    Booting,
    /// Device self-test failed
    SelfTestFailed,
    /// Join attempt failed
    JoinFailed,
    /// Joined the network
    Joined,
}

/// Status LED
pub trait Indicator {
    /// Show a pattern
    fn indicate(&mut self, indication: Indication);
}

// ===== CONSOLE =====

/// One line received on the console
pub type CommandLine = String<64>;

/// Serial console
pub trait Console {
    /// Next complete command line, if any
    fn poll_command(&mut self) -> Option<CommandLine>;
}

/// Everything the core needs from the hardware
pub trait Board: Radio + Storage + Watchdog + Power + Sensors + Indicator + Console {}

impl<T> Board for T where T: Radio + Storage + Watchdog + Power + Sensors + Indicator + Console {}
