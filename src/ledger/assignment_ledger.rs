//! In-memory MAC to IP ledger.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Mutex, MutexGuard};

use macaddr::MacAddr6;

/// Result of recording an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// First time this hardware address has been seen.
    New,
    /// The hardware address moved to a different address.
    Changed { previous: Ipv4Addr },
    /// Same address as last time; nothing recorded.
    Unchanged,
}

impl LedgerOutcome {
    /// True for outcomes that must be persisted.
    pub fn is_novel(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Last-known assigned address per hardware address.
///
/// Shared between capture sessions. There is no expiry and no capacity
/// bound; the map starts empty on every run.
#[derive(Debug, Default)]
pub struct AssignmentLedger {
    assignments: Mutex<HashMap<MacAddr6, Ipv4Addr>>,
}

impl AssignmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation and report whether it is new.
    ///
    /// The lookup and the update happen under one lock, so two sessions
    /// racing on the same unseen address produce exactly one `New`.
    pub fn observe(&self, mac: MacAddr6, ip: Ipv4Addr) -> LedgerOutcome {
        let mut assignments = self.lock();
        match assignments.insert(mac, ip) {
            None => LedgerOutcome::New,
            Some(previous) if previous == ip => LedgerOutcome::Unchanged,
            Some(previous) => LedgerOutcome::Changed { previous },
        }
    }

    /// Last address recorded for `mac`.
    pub fn get(&self, mac: MacAddr6) -> Option<Ipv4Addr> {
        self.lock().get(&mac).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panicking sink must not take the ledger down with it.
    fn lock(&self) -> MutexGuard<'_, HashMap<MacAddr6, Ipv4Addr>> {
        self.assignments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
