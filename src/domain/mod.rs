//! Domain models for DHCP assignment monitoring.
//!
//! These types are independent of capture, display and file concerns.

mod dhcp;
mod events;

pub use dhcp::{DhcpMessageType, DhcpOption, DhcpPacket};
pub use events::{format_mac, AssignmentObservation, Notification, LOG_TIMESTAMP_FORMAT};
