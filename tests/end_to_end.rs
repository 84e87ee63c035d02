//! Frame-to-log scenarios for the monitor.

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dhcpspy::classifier::{Classification, FrameClassifier};
use dhcpspy::notifier::{AssignmentLog, DisplayBuffer, Notifier};
use dhcpspy::parser::{option_codes, DHCP_MAGIC_COOKIE};
use dhcpspy::{LedgerOutcome, Monitor};
use macaddr::MacAddr6;
use tempfile::TempDir;

const DISCOVER: u8 = 1;
const ACK: u8 = 5;
const MAC: [u8; 6] = [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff];

fn dhcp_frame(msg_type: u8, mac: [u8; 6], yiaddr: Ipv4Addr) -> Vec<u8> {
    let mut dhcp = vec![0u8; 244];
    dhcp[0] = if msg_type == DISCOVER { 1 } else { 2 };
    dhcp[1] = 1;
    dhcp[2] = 6;
    dhcp[16..20].copy_from_slice(&yiaddr.octets());
    dhcp[28..34].copy_from_slice(&mac);
    dhcp[236..240].copy_from_slice(&DHCP_MAGIC_COOKIE);
    dhcp[240..244].copy_from_slice(&[option_codes::MESSAGE_TYPE, 1, msg_type, option_codes::END]);

    let (src_port, dst_port) = if msg_type == DISCOVER { (68u16, 67u16) } else { (67, 68) };
    let udp_len = (8 + dhcp.len()) as u16;

    let mut frame = Vec::new();
    frame.extend_from_slice(&[0xff; 6]);
    frame.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
    frame.extend_from_slice(&[0x08, 0x00]);
    frame.extend_from_slice(&[0x45, 0x00]);
    frame.extend_from_slice(&(udp_len + 20).to_be_bytes());
    frame.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 64, 17, 0x00, 0x00]);
    frame.extend_from_slice(&[192, 168, 1, 1]);
    frame.extend_from_slice(&[255, 255, 255, 255]);
    frame.extend_from_slice(&src_port.to_be_bytes());
    frame.extend_from_slice(&dst_port.to_be_bytes());
    frame.extend_from_slice(&udp_len.to_be_bytes());
    frame.extend_from_slice(&[0x00, 0x00]);
    frame.extend_from_slice(&dhcp);
    frame
}

struct Harness {
    _temp: TempDir,
    logs: [PathBuf; 2],
    display: Arc<DisplayBuffer>,
    monitor: Monitor,
}

impl Harness {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let logs = [
            temp.path().join("device_ip.txt"),
            temp.path().join("ip_assignments.log"),
        ];
        let display = Arc::new(DisplayBuffer::new(5, None));
        let notifier = Notifier::new()
            .with_transient(Arc::clone(&display))
            .with_durable(AssignmentLog::new(&logs[0]))
            .with_durable(AssignmentLog::new(&logs[1]));

        Self {
            _temp: temp,
            logs,
            display,
            monitor: Monitor::new(notifier),
        }
    }

    fn log_lines(&self, path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn assert_log_lines(&self, expected: usize) {
        for path in &self.logs {
            assert_eq!(self.log_lines(path).len(), expected, "{:?}", path);
        }
    }
}

/// Strip the timestamp column from a log line.
fn without_timestamp(line: &str) -> &str {
    line.split_once(',').map(|(_, rest)| rest).unwrap()
}

#[test]
fn scenario_a_new_assignment_is_logged() {
    let h = Harness::new();
    let frame = dhcp_frame(ACK, MAC, Ipv4Addr::new(192, 168, 1, 50));

    assert_eq!(h.monitor.handle_frame("br0", &frame), Some(LedgerOutcome::New));

    for path in &h.logs {
        let lines = h.log_lines(path);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            without_timestamp(&lines[0]),
            "aa:bb:cc:dd:ee:ff,192.168.1.50,DHCP,br0"
        );
        // YYYY-MM-DD HH:MM:SS
        let timestamp = lines[0].split(',').next().unwrap();
        assert_eq!(timestamp.len(), 19);
        assert_eq!(&timestamp[4..5], "-");
        assert_eq!(&timestamp[10..11], " ");
    }
}

#[test]
fn scenario_b_repeat_is_shown_but_not_logged() {
    let h = Harness::new();
    let frame = dhcp_frame(ACK, MAC, Ipv4Addr::new(192, 168, 1, 50));

    h.monitor.handle_frame("br0", &frame);
    let outcome = h.monitor.handle_frame("br0", &frame);

    assert_eq!(outcome, Some(LedgerOutcome::Unchanged));
    h.assert_log_lines(1);
    assert_eq!(
        h.display.lines(),
        vec![
            "LAN: 192.168.1.50",
            "MAC: aa:bb:cc:dd:ee:ff",
            "LAN: 192.168.1.50",
            "MAC: aa:bb:cc:dd:ee:ff",
        ]
    );
}

#[test]
fn scenario_c_changed_address_is_logged() {
    let h = Harness::new();

    h.monitor
        .handle_frame("br0", &dhcp_frame(ACK, MAC, Ipv4Addr::new(192, 168, 1, 50)));
    let outcome = h
        .monitor
        .handle_frame("br0", &dhcp_frame(ACK, MAC, Ipv4Addr::new(192, 168, 1, 77)));

    assert_eq!(
        outcome,
        Some(LedgerOutcome::Changed {
            previous: Ipv4Addr::new(192, 168, 1, 50)
        })
    );
    h.assert_log_lines(2);
    let lines = h.log_lines(&h.logs[0]);
    assert_eq!(
        without_timestamp(&lines[1]),
        "aa:bb:cc:dd:ee:ff,192.168.1.77,DHCP,br0"
    );
    assert_eq!(
        h.monitor.ledger().get(MacAddr6::from(MAC)),
        Some(Ipv4Addr::new(192, 168, 1, 77))
    );
}

#[test]
fn scenario_d_discover_never_reaches_ledger() {
    let h = Harness::new();
    let frame = dhcp_frame(DISCOVER, MAC, Ipv4Addr::UNSPECIFIED);

    assert_eq!(h.monitor.handle_frame("br0", &frame), None);

    assert!(h.monitor.ledger().is_empty());
    h.assert_log_lines(0);
    assert!(h.display.lines().is_empty());
}

#[test]
fn ack_without_address_is_ignored() {
    let h = Harness::new();
    let frame = dhcp_frame(ACK, MAC, Ipv4Addr::UNSPECIFIED);

    assert_eq!(
        FrameClassifier::new().classify(&frame),
        Ok(Classification::DhcpOther(Some(
            dhcpspy::domain::DhcpMessageType::Ack
        )))
    );
    assert_eq!(h.monitor.handle_frame("br0", &frame), None);
    h.assert_log_lines(0);
}

#[test]
fn interfaces_are_labelled_on_the_display() {
    let h = Harness::new();

    h.monitor
        .handle_frame("wlan0", &dhcp_frame(ACK, MAC, Ipv4Addr::new(10, 0, 0, 9)));

    assert_eq!(h.display.lines()[0], "WIFI: 10.0.0.9");
    assert!(h.log_lines(&h.logs[1])[0].ends_with(",DHCP,wlan0"));
}
