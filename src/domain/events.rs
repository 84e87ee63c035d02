//! Domain events for DHCP assignment monitoring.

use std::fmt;
use std::net::Ipv4Addr;

use chrono::{DateTime, Local};
use macaddr::MacAddr6;

/// Format used for durable log timestamps.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A DHCP ACK observed on one interface.
///
/// Built per captured frame and consumed by the same call.
#[derive(Debug, Clone)]
pub struct AssignmentObservation {
    /// Interface the frame arrived on
    pub interface: String,
    /// Client hardware address
    pub mac: MacAddr6,
    /// Address the server assigned
    pub ip: Ipv4Addr,
    /// Local time the frame was handled
    pub observed_at: DateTime<Local>,
}

impl AssignmentObservation {
    pub fn new(interface: impl Into<String>, mac: MacAddr6, ip: Ipv4Addr) -> Self {
        Self {
            interface: interface.into(),
            mac,
            ip,
            observed_at: Local::now(),
        }
    }

    /// Lowercase colon-separated rendering of the hardware address.
    pub fn mac_string(&self) -> String {
        format_mac(self.mac)
    }

    /// Durable log line, without the trailing newline.
    ///
    /// Format: `timestamp,mac,ip,DHCP,interface`
    pub fn to_log_line(&self) -> String {
        format!(
            "{},{},{},DHCP,{}",
            self.observed_at.format(LOG_TIMESTAMP_FORMAT),
            self.mac_string(),
            self.ip,
            self.interface
        )
    }
}

impl fmt::Display for AssignmentObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DHCP ASSIGNMENT ({}): {} → {}",
            self.interface,
            self.mac_string(),
            self.ip
        )
    }
}

/// A message bound for the transient sinks.
#[derive(Debug, Clone)]
pub enum Notification {
    /// A DHCP assignment; always important.
    Assignment(AssignmentObservation),
    /// Startup, warning and shutdown messages.
    Status { message: String, important: bool },
}

impl Notification {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
            important: false,
        }
    }

    pub fn important(&self) -> bool {
        match self {
            Self::Assignment(_) => true,
            Self::Status { important, .. } => *important,
        }
    }

    /// Rendered message text.
    pub fn text(&self) -> String {
        match self {
            Self::Assignment(observation) => observation.to_string(),
            Self::Status { message, .. } => message.clone(),
        }
    }
}

/// Format a MAC address as lowercase colon-separated hex.
pub fn format_mac(mac: MacAddr6) -> String {
    mac.as_bytes()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}
