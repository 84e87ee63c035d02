//! Process-lifetime monitor context.
//!
//! Owns the ledger, the notifier and the running capture sessions, and
//! wires them together: classify, decide, notify.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::capture::{CaptureSession, PacketCapture};
use crate::classifier::{Classification, FrameClassifier};
use crate::domain::AssignmentObservation;
use crate::error::MonitorError;
use crate::ledger::{AssignmentLedger, LedgerOutcome};
use crate::notifier::Notifier;

/// Messages that wake the main thread while it waits on the sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    /// A termination signal arrived.
    Shutdown,
    /// The capture on this interface ended on its own.
    SessionEnded(String),
}

/// State shared with every capture thread.
struct MonitorCore {
    classifier: FrameClassifier,
    ledger: AssignmentLedger,
    notifier: Notifier,
    /// Held from the ledger decision through delivery, so durable lines
    /// are appended in the order the ledger recorded them.
    delivery: Mutex<()>,
}

impl MonitorCore {
    fn handle_frame(&self, interface: &str, frame: &[u8]) -> Option<LedgerOutcome> {
        let (mac, ip) = match self.classifier.classify(frame) {
            Ok(Classification::DhcpAck { mac, ip }) => (mac, ip),
            Ok(_) => return None,
            Err(e) => {
                debug!("Skipping malformed DHCP frame on {}: {}", interface, e);
                return None;
            }
        };

        let observation = AssignmentObservation::new(interface, mac, ip);
        let _delivery = self
            .delivery
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let outcome = self.ledger.observe(mac, ip);
        if let LedgerOutcome::Changed { previous } = outcome {
            info!(
                "{} moved from {} to {}",
                observation.mac_string(),
                previous,
                ip
            );
        }
        self.notifier.notify(&observation, outcome);
        Some(outcome)
    }
}

pub struct Monitor {
    core: Arc<MonitorCore>,
    sessions: Vec<CaptureSession>,
}

impl Monitor {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            core: Arc::new(MonitorCore {
                classifier: FrameClassifier::new(),
                ledger: AssignmentLedger::new(),
                notifier,
                delivery: Mutex::new(()),
            }),
            sessions: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &AssignmentLedger {
        &self.core.ledger
    }

    pub fn notifier(&self) -> &Notifier {
        &self.core.notifier
    }

    /// Run one frame through classify, decide and notify.
    ///
    /// Returns the ledger outcome for DHCP ACKs and `None` for everything
    /// else, including frames that fail to parse.
    pub fn handle_frame(&self, interface: &str, frame: &[u8]) -> Option<LedgerOutcome> {
        self.core.handle_frame(interface, frame)
    }

    /// Start a capture session that feeds this monitor.
    ///
    /// `events` receives `SessionEnded` when the capture stops on its own.
    pub fn start_session<C>(
        &mut self,
        capture: C,
        events: Sender<ControlEvent>,
    ) -> Result<(), MonitorError>
    where
        C: PacketCapture + 'static,
    {
        let interface = capture.interface_name().to_string();
        let core = Arc::clone(&self.core);
        let ended = interface.clone();

        let session = CaptureSession::start(
            capture,
            move |iface, frame| {
                core.handle_frame(iface, &frame.data);
            },
            move || {
                let _ = events.send(ControlEvent::SessionEnded(ended));
            },
        )
        .map_err(|source| MonitorError::CaptureStart {
            interface: interface.clone(),
            source,
        })?;

        info!("Capturing DHCP traffic on {}", interface);
        self.sessions.push(session);
        Ok(())
    }

    /// Interfaces with a started session.
    pub fn interfaces(&self) -> Vec<&str> {
        self.sessions.iter().map(|s| s.interface()).collect()
    }

    /// Block until a shutdown is requested or every session has ended.
    pub fn wait(&self, events: &Receiver<ControlEvent>) {
        let mut ended = 0;
        while ended < self.sessions.len() {
            match events.recv() {
                Ok(ControlEvent::Shutdown) | Err(_) => return,
                Ok(ControlEvent::SessionEnded(interface)) => {
                    warn!("Capture on {} ended", interface);
                    ended += 1;
                }
            }
        }
    }

    /// Stop every session and wait up to `timeout` in total for them.
    ///
    /// Returns the interfaces whose capture did not finish in time.
    pub fn shutdown(&mut self, timeout: Duration) -> Vec<String> {
        for session in &self.sessions {
            session.stop();
        }

        let deadline = Instant::now() + timeout;
        let mut stragglers = Vec::new();
        for mut session in self.sessions.drain(..) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !session.join(remaining) {
                warn!(
                    "Capture on {} did not stop within {:?}",
                    session.interface(),
                    timeout
                );
                stragglers.push(session.interface().to_string());
            }
        }
        stragglers
    }
}
