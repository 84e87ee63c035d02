//! DHCP ACK classification of captured Ethernet frames.

use std::net::Ipv4Addr;

use macaddr::MacAddr6;
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::udp::UdpPacket;
use pnet::packet::Packet;
use tracing::debug;

use crate::domain::DhcpMessageType;
use crate::error::ParseError;
use crate::parser::DhcpParser;

/// DHCP server port
pub const DHCP_SERVER_PORT: u16 = 67;
/// DHCP client port
pub const DHCP_CLIENT_PORT: u16 = 68;

/// What a captured frame turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Not UDP on the DHCP ports.
    NotDhcp,
    /// A DHCP message that does not confirm an address.
    DhcpOther(Option<DhcpMessageType>),
    /// A DHCP ACK carrying a non-zero assigned address.
    DhcpAck { mac: MacAddr6, ip: Ipv4Addr },
}

/// Classifies frames; a pure function of its input.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameClassifier {
    parser: DhcpParser,
}

impl FrameClassifier {
    pub fn new() -> Self {
        Self {
            parser: DhcpParser::new(),
        }
    }

    /// Classify one Ethernet frame.
    ///
    /// Returns an error only when the frame is UDP on a DHCP port but its
    /// payload is not a well-formed DHCP message.
    pub fn classify(&self, frame: &[u8]) -> Result<Classification, ParseError> {
        let Some(payload) = dhcp_payload(frame) else {
            return Ok(Classification::NotDhcp);
        };

        let packet = self.parser.parse(&payload)?;

        match packet.message_type() {
            Some(DhcpMessageType::Ack) if !packet.yiaddr.is_unspecified() => {
                debug!(
                    "ACK {} for {} from server {} (host name {})",
                    packet.yiaddr,
                    packet.chaddr,
                    packet
                        .server_identifier()
                        .map_or_else(|| "unknown".to_string(), |ip| ip.to_string()),
                    packet.host_name().unwrap_or("-")
                );
                Ok(Classification::DhcpAck {
                    mac: packet.chaddr,
                    ip: packet.yiaddr,
                })
            }
            other => Ok(Classification::DhcpOther(other)),
        }
    }
}

/// Extract the UDP payload from an Ethernet frame carrying DHCP traffic.
///
/// Equivalent to the capture filter `udp and (port 67 or 68)`.
pub fn dhcp_payload(frame: &[u8]) -> Option<Vec<u8>> {
    let ethernet = EthernetPacket::new(frame)?;

    // We only care about IPv4
    if ethernet.get_ethertype() != EtherTypes::Ipv4 {
        return None;
    }

    let ipv4 = Ipv4Packet::new(ethernet.payload())?;

    if ipv4.get_next_level_protocol() != IpNextHeaderProtocols::Udp {
        return None;
    }

    let udp = UdpPacket::new(ipv4.payload())?;

    if !is_dhcp_port(udp.get_source()) && !is_dhcp_port(udp.get_destination()) {
        return None;
    }

    Some(udp.payload().to_vec())
}

fn is_dhcp_port(port: u16) -> bool {
    port == DHCP_SERVER_PORT || port == DHCP_CLIENT_PORT
}
