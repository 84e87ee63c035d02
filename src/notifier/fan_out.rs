//! Fan-out of notifications to transient and durable sinks.

use std::thread;
use std::time::Duration;

use tracing::warn;

use super::{DurableSink, TransientSink};
use crate::domain::{AssignmentObservation, Notification};
use crate::error::MonitorError;
use crate::ledger::LedgerOutcome;

/// Pause between attempts at a failed durable write.
const LOG_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Which sinks an assignment goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Console and display only.
    TransientOnly,
    /// Console, display and log files.
    TransientAndDurable,
}

impl Delivery {
    pub fn for_outcome(outcome: LedgerOutcome) -> Self {
        if outcome.is_novel() {
            Self::TransientAndDurable
        } else {
            Self::TransientOnly
        }
    }
}

/// Sends notifications to every configured sink.
pub struct Notifier {
    transient: Vec<Box<dyn TransientSink>>,
    durable: Vec<Box<dyn DurableSink>>,
    log_write_attempts: u32,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            transient: Vec::new(),
            durable: Vec::new(),
            log_write_attempts: 1,
        }
    }

    pub fn with_transient(mut self, sink: impl TransientSink + 'static) -> Self {
        self.transient.push(Box::new(sink));
        self
    }

    pub fn with_durable(mut self, sink: impl DurableSink + 'static) -> Self {
        self.durable.push(Box::new(sink));
        self
    }

    /// How many times a durable write is tried before it is reported.
    pub fn with_log_write_attempts(mut self, attempts: u32) -> Self {
        self.log_write_attempts = attempts.max(1);
        self
    }

    /// Report an assignment.
    ///
    /// Transient sinks always see it; durable sinks only when the ledger
    /// reported it as new or changed. A failed durable write is reported
    /// and does not stop the remaining sinks.
    pub fn notify(&self, observation: &AssignmentObservation, outcome: LedgerOutcome) -> Delivery {
        let delivery = Delivery::for_outcome(outcome);

        self.broadcast(&Notification::Assignment(observation.clone()));

        if delivery == Delivery::TransientAndDurable {
            for sink in &self.durable {
                if let Err(e) = self.append_with_retry(sink.as_ref(), observation) {
                    warn!("{}", e);
                    self.broadcast(&Notification::status(format!("Error writing to log: {e}")));
                }
            }
        }

        delivery
    }

    /// Show a non-assignment message on the transient sinks.
    pub fn status(&self, message: impl Into<String>, important: bool) {
        self.broadcast(&Notification::Status {
            message: message.into(),
            important,
        });
    }

    fn broadcast(&self, notification: &Notification) {
        for sink in &self.transient {
            sink.show(notification);
        }
    }

    fn append_with_retry(
        &self,
        sink: &dyn DurableSink,
        observation: &AssignmentObservation,
    ) -> Result<(), MonitorError> {
        let mut attempt = 1;
        loop {
            match sink.append(observation) {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= self.log_write_attempts => return Err(e),
                Err(e) => {
                    tracing::debug!(
                        "Write to {:?} failed (attempt {}): {}",
                        sink.location(),
                        attempt,
                        e
                    );
                    attempt += 1;
                    thread::sleep(LOG_RETRY_DELAY);
                }
            }
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
