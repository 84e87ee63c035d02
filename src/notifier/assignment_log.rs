//! Append-only assignment log file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::DurableSink;
use crate::domain::AssignmentObservation;
use crate::error::MonitorError;

/// Appends one CSV line per recorded assignment.
///
/// The file is opened, appended and closed on every write; no handle is
/// held between calls, so concurrent sessions rely on O_APPEND only.
#[derive(Debug, Clone)]
pub struct AssignmentLog {
    path: PathBuf,
}

impl AssignmentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DurableSink for AssignmentLog {
    fn append(&self, observation: &AssignmentObservation) -> Result<(), MonitorError> {
        let to_error = |source| MonitorError::LogWrite {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_error)?;

        // One write call per line keeps lines from interleaving
        let line = format!("{}\n", observation.to_log_line());
        file.write_all(line.as_bytes()).map_err(to_error)
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
