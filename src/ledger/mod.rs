//! Assignment ledger module.
//!
//! Remembers the last address seen for every hardware address during
//! the lifetime of the process.

mod assignment_ledger;

pub use assignment_ledger::{AssignmentLedger, LedgerOutcome};
