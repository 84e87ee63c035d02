//! dhcpspy - DHCP assignment monitor
//!
//! Watches DHCP traffic on a bridge (and optionally a wireless interface)
//! and reports MAC to IP assignments. Every ACK is shown on the console and
//! the display; only new or changed assignments are written to the logs.

pub mod capture;
pub mod classifier;
pub mod config;
pub mod display;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod monitor;
pub mod notifier;
pub mod parser;
pub mod utils;

pub use config::Config;
pub use error::{CaptureError, ConfigError, DisplayError, MonitorError, ParseError};
pub use ledger::{AssignmentLedger, LedgerOutcome};
pub use monitor::{ControlEvent, Monitor};
