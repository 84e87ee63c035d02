//! pnet-based packet capture implementation.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pnet::datalink::{self, Channel, Config, NetworkInterface};

use super::{PacketCapture, RawFrame};
use crate::classifier::dhcp_payload;
use crate::error::CaptureError;

/// How long a read blocks before the running flag is checked again.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Consecutive failed reads (other than timeouts) before the capture is
/// given up, e.g. after the interface went down.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 10;

/// Packet capture using the pnet library.
pub struct PnetCapture {
    interface: NetworkInterface,
    running: Arc<AtomicBool>,
}

impl PnetCapture {
    /// Create a new capture on the specified interface.
    pub fn new(interface_name: &str) -> Result<Self, CaptureError> {
        let interface = find_interface(interface_name)
            .ok_or_else(|| CaptureError::InterfaceNotFound(interface_name.to_string()))?;

        Ok(Self {
            interface,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// List all available network interfaces.
    pub fn list_interfaces() -> Vec<String> {
        datalink::interfaces()
            .into_iter()
            .map(|iface| {
                let status = if iface.is_up() { "UP" } else { "DOWN" };
                let ips: Vec<_> = iface.ips.iter().map(|ip| ip.to_string()).collect();
                format!(
                    "{}: {} [{}]",
                    iface.name,
                    status,
                    if ips.is_empty() {
                        "no IP".to_string()
                    } else {
                        ips.join(", ")
                    }
                )
            })
            .collect()
    }

    /// First IPv4 address assigned to an interface, if any.
    pub fn interface_ipv4(interface_name: &str) -> Option<Ipv4Addr> {
        find_interface(interface_name)?
            .ips
            .iter()
            .find_map(|network| match network.ip() {
                IpAddr::V4(ip) => Some(ip),
                IpAddr::V6(_) => None,
            })
    }
}

impl PacketCapture for PnetCapture {
    fn capture_dhcp_frames(
        &mut self,
    ) -> Result<Box<dyn Iterator<Item = RawFrame> + '_>, CaptureError> {
        let config = Config {
            read_timeout: Some(READ_TIMEOUT),
            ..Config::default()
        };

        let rx = match datalink::channel(&self.interface, config) {
            Ok(Channel::Ethernet(_tx, rx)) => rx,
            Ok(_) => {
                return Err(CaptureError::ChannelCreation(
                    "unsupported channel type".to_string(),
                ))
            }
            Err(e) => {
                let msg = e.to_string();
                if e.kind() == std::io::ErrorKind::PermissionDenied
                    || msg.contains("Operation not permitted")
                {
                    return Err(CaptureError::InsufficientPermissions);
                }
                return Err(CaptureError::ChannelCreation(msg));
            }
        };

        Ok(Box::new(DhcpFrameIterator::new(
            &self.interface.name,
            rx,
            Arc::clone(&self.running),
        )))
    }

    fn interface_name(&self) -> &str {
        &self.interface.name
    }

    fn set_running(&mut self, running: Arc<AtomicBool>) {
        self.running = running;
    }
}

/// Iterator that yields DHCP frames until the running flag is cleared or
/// the interface keeps failing.
struct DhcpFrameIterator {
    interface: String,
    rx: Box<dyn datalink::DataLinkReceiver>,
    running: Arc<AtomicBool>,
    error_backoff: Duration,
    consecutive_errors: u32,
}

impl DhcpFrameIterator {
    fn new(
        interface: &str,
        rx: Box<dyn datalink::DataLinkReceiver>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            interface: interface.to_string(),
            rx,
            running,
            error_backoff: READ_TIMEOUT,
            consecutive_errors: 0,
        }
    }
}

impl Iterator for DhcpFrameIterator {
    type Item = RawFrame;

    fn next(&mut self) -> Option<Self::Item> {
        while self.running.load(Ordering::SeqCst) {
            match self.rx.next() {
                Ok(frame) => {
                    self.consecutive_errors = 0;
                    if dhcp_payload(frame).is_some() {
                        return Some(RawFrame {
                            data: frame.to_vec(),
                        });
                    }
                    // Not DHCP, keep listening
                }
                // Timeout is expected; it lets us re-check the flag
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    self.consecutive_errors = 0;
                }
                Err(e) => {
                    self.consecutive_errors += 1;
                    if self.consecutive_errors >= MAX_CONSECUTIVE_READ_ERRORS {
                        tracing::warn!(
                            "Giving up capture on {} after {} failed reads: {}",
                            self.interface,
                            self.consecutive_errors,
                            e
                        );
                        return None;
                    }
                    tracing::debug!("Capture error on {}: {}", self.interface, e);
                    std::thread::sleep(self.error_backoff);
                }
            }
        }
        None
    }
}

fn find_interface(name: &str) -> Option<NetworkInterface> {
    datalink::interfaces()
        .into_iter()
        .find(|iface| iface.name == name)
}
