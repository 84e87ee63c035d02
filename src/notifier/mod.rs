//! Notification fan-out for assignment events.
//!
//! Transient sinks (console, display) see every DHCP ACK. Durable sinks
//! (log files) only see assignments the ledger reports as new or changed.

mod assignment_log;
mod console_reporter;
mod display_buffer;
mod fan_out;

pub use assignment_log::AssignmentLog;
pub use console_reporter::ConsoleReporter;
pub use display_buffer::{display_label, DisplayBuffer, DEFAULT_DISPLAY_LINES};
pub use fan_out::{Delivery, Notifier};

use std::path::Path;
use std::sync::Arc;

use crate::domain::{AssignmentObservation, Notification};
use crate::error::MonitorError;

/// A best-effort sink shown to an operator; never persisted.
pub trait TransientSink: Send + Sync {
    fn show(&self, notification: &Notification);
}

/// An append-only record of assignments.
pub trait DurableSink: Send + Sync {
    /// Append one observation.
    fn append(&self, observation: &AssignmentObservation) -> Result<(), MonitorError>;

    /// Where the sink writes, for diagnostics.
    fn location(&self) -> &Path;
}

impl<T: TransientSink + ?Sized> TransientSink for Arc<T> {
    fn show(&self, notification: &Notification) {
        (**self).show(notification)
    }
}

impl<T: DurableSink + ?Sized> DurableSink for Arc<T> {
    fn append(&self, observation: &AssignmentObservation) -> Result<(), MonitorError> {
        (**self).append(observation)
    }

    fn location(&self) -> &Path {
        (**self).location()
    }
}
