//! Core firmware for LoRaSense battery-powered sensor nodes
//!
//! Owns the sleep/wake scheduler, the pulse counter engine and the
//! device-mode dispatch. Everything hardware-facing is reached through the
//! collaborator traits in [`board`], so the same core runs on the target and
//! against a simulated board in tests.
//!
//! Key constraints:
//! - No heap; fixed-capacity `heapless` containers only
//! - Interrupt-touched state is atomic
//! - The node never gives up: errors degrade, retry or fall back
//!
//! ```no_run
//! use lorasense_core::{Board, HardwareCaps, Node};
//!
//! fn firmware_main<B: Board>(board: B) -> ! {
//!     let node = Node::boot(board, HardwareCaps::default());
//!     node.program_loop()
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// Must come first so the logging macros are visible to every module
mod fmt;

pub mod board;
pub mod boot;
pub mod cli;
pub mod config;
pub mod constants;
pub mod counter;
pub mod downlink;
pub mod errors;
pub mod events;
pub mod mode;
pub mod node;
pub mod queue;
pub mod record;
pub mod schedule;
pub mod scheduler;
pub mod time;
pub mod timer;

// Public API
pub use board::{Board, Class, Downlink, PageId, SensorKind};
pub use config::{HardwareCaps, NodeConfig};
pub use counter::{Counted, CounterConfig, CounterEngine, Direction, HourlyHistory, Polarity};
pub use errors::{ConfigError, ModeError, NodeError, RadioError, SensorError, StorageError};
pub use events::{Channel, HourTick, Interrupt, PinEdge, WakeCause};
pub use mode::{ActiveDevice, DeviceMode, ModeContext, ModeId, MODE_TABLE};
pub use node::Node;
pub use queue::WakeQueue;
pub use schedule::TransmitSchedule;
pub use time::{ManualClock, TimeSource, Timestamp};
pub use timer::{TimerBank, TimerId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
