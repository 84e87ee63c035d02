use crate::error::MonitorError;

/// True when running with an effective UID of 0.
#[cfg(unix)]
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Raw capture is only supported on Unix.
#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}

/// Fail with `MonitorError::Privilege` unless running as root.
#[must_use = "privilege check result must be checked"]
pub fn ensure_root() -> Result<(), MonitorError> {
    if is_root() {
        Ok(())
    } else {
        Err(MonitorError::Privilege)
    }
}
