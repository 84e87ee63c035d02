//! Packet capture abstraction.
//!
//! This module defines the `PacketCapture` trait, a pnet-based
//! implementation, and `CaptureSession`, which runs one capture on its own
//! thread. Tests drive sessions with in-memory captures.

mod pnet_capture;
mod session;

pub use pnet_capture::PnetCapture;
pub use session::CaptureSession;

#[cfg(test)]
pub(crate) use session::tests::ScriptedCapture;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::error::CaptureError;

/// A raw Ethernet frame captured from the wire.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// The complete frame, starting at the Ethernet header
    pub data: Vec<u8>,
}

/// Trait for packet capture implementations.
///
/// Lets the monitor run against pnet in production and against scripted
/// frame sources in tests.
pub trait PacketCapture: Send {
    /// Open the capture and return an iterator over DHCP frames
    /// (UDP on ports 67/68).
    ///
    /// The iterator returns `None` once the running flag is cleared.
    fn capture_dhcp_frames(
        &mut self,
    ) -> Result<Box<dyn Iterator<Item = RawFrame> + '_>, CaptureError>;

    /// Get the name of the interface being captured.
    fn interface_name(&self) -> &str;

    /// Set the running flag for graceful shutdown.
    fn set_running(&mut self, running: Arc<AtomicBool>);
}
