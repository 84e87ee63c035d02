//! DHCP packet parser implementation.
//!
//! Parses raw DHCP packets according to RFC 2131.

use std::net::Ipv4Addr;

use macaddr::MacAddr6;

use crate::domain::{DhcpMessageType, DhcpOption, DhcpPacket};
use crate::error::ParseError;

/// DHCP magic cookie: 0x63825363
pub const DHCP_MAGIC_COOKIE: [u8; 4] = [0x63, 0x82, 0x53, 0x63];

/// Fixed BOOTP header size (without cookie or options)
const MIN_DHCP_SIZE: usize = 236;

/// Offset of the first option, right after the magic cookie
const OPTIONS_OFFSET: usize = 240;

/// DHCP option codes
pub mod option_codes {
    pub const PAD: u8 = 0;
    pub const HOST_NAME: u8 = 12;
    pub const REQUESTED_IP: u8 = 50;
    pub const LEASE_TIME: u8 = 51;
    pub const MESSAGE_TYPE: u8 = 53;
    pub const SERVER_ID: u8 = 54;
    pub const CLIENT_ID: u8 = 61;
    pub const END: u8 = 255;
}

/// Parser for DHCP packets.
///
/// Stateless; turns the UDP payload of a DHCP datagram into a [`DhcpPacket`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DhcpParser;

impl DhcpParser {
    /// Create a new DHCP parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a DHCP packet from raw bytes.
    ///
    /// The input should be the UDP payload (not including IP/UDP headers).
    pub fn parse(&self, data: &[u8]) -> Result<DhcpPacket, ParseError> {
        if data.len() < MIN_DHCP_SIZE {
            return Err(ParseError::PacketTooShort {
                expected: MIN_DHCP_SIZE,
                actual: data.len(),
            });
        }

        let op = data[0];
        let htype = data[1];
        let hlen = data[2];
        // hops at [3]
        let xid = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        // secs at [8..10], flags at [10..12]

        let ciaddr = ipv4_at(data, 12);
        let yiaddr = ipv4_at(data, 16);
        let siaddr = ipv4_at(data, 20);
        let giaddr = ipv4_at(data, 24);

        // chaddr is 16 bytes at offset 28; only the first 6 are kept
        let chaddr = MacAddr6::new(data[28], data[29], data[30], data[31], data[32], data[33]);

        // sname (44..108) and file (108..236) are not used

        if data.len() < OPTIONS_OFFSET {
            return Err(ParseError::PacketTooShort {
                expected: OPTIONS_OFFSET,
                actual: data.len(),
            });
        }

        if data[MIN_DHCP_SIZE..OPTIONS_OFFSET] != DHCP_MAGIC_COOKIE {
            return Err(ParseError::InvalidMagicCookie);
        }

        let options = self.parse_options(&data[OPTIONS_OFFSET..])?;

        Ok(DhcpPacket {
            op,
            htype,
            hlen,
            xid,
            ciaddr,
            yiaddr,
            siaddr,
            giaddr,
            chaddr,
            options,
        })
    }

    /// Parse DHCP options from the options section.
    fn parse_options(&self, data: &[u8]) -> Result<Vec<DhcpOption>, ParseError> {
        let mut options = Vec::new();
        let mut offset = 0;

        while offset < data.len() {
            let code = data[offset];

            if code == option_codes::PAD {
                offset += 1;
                continue;
            }

            if code == option_codes::END {
                break;
            }

            if offset + 1 >= data.len() {
                return Err(ParseError::InvalidOption {
                    offset,
                    message: "option length missing".to_string(),
                });
            }

            let len = data[offset + 1] as usize;

            if offset + 2 + len > data.len() {
                return Err(ParseError::InvalidOption {
                    offset,
                    message: format!(
                        "option data truncated: expected {} bytes, have {}",
                        len,
                        data.len() - offset - 2
                    ),
                });
            }

            let option_data = &data[offset + 2..offset + 2 + len];

            if let Some(option) = self.parse_option(code, option_data) {
                options.push(option);
            }

            offset += 2 + len;
        }

        Ok(options)
    }

    /// Parse a single DHCP option. Malformed known options are dropped.
    fn parse_option(&self, code: u8, data: &[u8]) -> Option<DhcpOption> {
        match code {
            option_codes::MESSAGE_TYPE => {
                let value = *data.first()?;
                DhcpMessageType::from_u8(value).map(DhcpOption::MessageType)
            }

            option_codes::HOST_NAME => String::from_utf8(data.to_vec())
                .ok()
                .map(DhcpOption::HostName),

            option_codes::REQUESTED_IP => {
                if data.len() < 4 {
                    return None;
                }
                Some(DhcpOption::RequestedIp(ipv4_at(data, 0)))
            }

            option_codes::LEASE_TIME => {
                if data.len() < 4 {
                    return None;
                }
                Some(DhcpOption::LeaseTime(u32::from_be_bytes([
                    data[0], data[1], data[2], data[3],
                ])))
            }

            option_codes::SERVER_ID => {
                if data.len() < 4 {
                    return None;
                }
                Some(DhcpOption::ServerIdentifier(ipv4_at(data, 0)))
            }

            option_codes::CLIENT_ID => Some(DhcpOption::ClientId(data.to_vec())),

            _ => Some(DhcpOption::Unknown(code, data.to_vec())),
        }
    }
}

fn ipv4_at(data: &[u8], offset: usize) -> Ipv4Addr {
    Ipv4Addr::new(
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    )
}
