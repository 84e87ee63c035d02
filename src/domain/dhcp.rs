//! DHCP packet domain models.
//!
//! These types represent the logical structure of a DHCP message,
//! independent of wire format parsing.

use std::net::Ipv4Addr;

use macaddr::MacAddr6;

/// DHCP message types as defined in RFC 2131.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhcpMessageType {
    Discover,
    Offer,
    Request,
    Decline,
    Ack,
    Nak,
    Release,
    Inform,
}

impl DhcpMessageType {
    /// Parse from the DHCP option 53 value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Discover),
            2 => Some(Self::Offer),
            3 => Some(Self::Request),
            4 => Some(Self::Decline),
            5 => Some(Self::Ack),
            6 => Some(Self::Nak),
            7 => Some(Self::Release),
            8 => Some(Self::Inform),
            _ => None,
        }
    }
}

impl std::fmt::Display for DhcpMessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discover => write!(f, "DISCOVER"),
            Self::Offer => write!(f, "OFFER"),
            Self::Request => write!(f, "REQUEST"),
            Self::Decline => write!(f, "DECLINE"),
            Self::Ack => write!(f, "ACK"),
            Self::Nak => write!(f, "NAK"),
            Self::Release => write!(f, "RELEASE"),
            Self::Inform => write!(f, "INFORM"),
        }
    }
}

/// DHCP options decoded by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DhcpOption {
    /// Option 12: Host Name
    HostName(String),
    /// Option 50: Requested IP Address
    RequestedIp(Ipv4Addr),
    /// Option 51: IP Address Lease Time, in seconds
    LeaseTime(u32),
    /// Option 53: DHCP Message Type
    MessageType(DhcpMessageType),
    /// Option 54: Server Identifier
    ServerIdentifier(Ipv4Addr),
    /// Option 61: Client Identifier
    ClientId(Vec<u8>),
    /// Unknown option (code, data)
    Unknown(u8, Vec<u8>),
}

/// A parsed DHCP message.
#[derive(Debug, Clone)]
pub struct DhcpPacket {
    /// Operation: 1 = BOOTREQUEST, 2 = BOOTREPLY
    pub op: u8,
    /// Hardware type (1 = Ethernet)
    pub htype: u8,
    /// Hardware address length
    pub hlen: u8,
    /// Transaction ID
    pub xid: u32,
    /// Client IP address (if already known)
    pub ciaddr: Ipv4Addr,
    /// 'Your' IP address (assigned by server)
    pub yiaddr: Ipv4Addr,
    /// Server IP address
    pub siaddr: Ipv4Addr,
    /// Gateway IP address
    pub giaddr: Ipv4Addr,
    /// Client hardware address, first 6 octets of chaddr
    pub chaddr: MacAddr6,
    /// DHCP options
    pub options: Vec<DhcpOption>,
}

impl DhcpPacket {
    /// Get the DHCP message type from options.
    pub fn message_type(&self) -> Option<DhcpMessageType> {
        self.options.iter().find_map(|opt| {
            if let DhcpOption::MessageType(msg_type) = opt {
                Some(*msg_type)
            } else {
                None
            }
        })
    }

    /// Get the client host name (Option 12).
    pub fn host_name(&self) -> Option<&str> {
        self.options.iter().find_map(|opt| {
            if let DhcpOption::HostName(ref name) = opt {
                Some(name.as_str())
            } else {
                None
            }
        })
    }

    /// Get the server identifier (Option 54).
    pub fn server_identifier(&self) -> Option<Ipv4Addr> {
        self.options.iter().find_map(|opt| {
            if let DhcpOption::ServerIdentifier(ip) = opt {
                Some(*ip)
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_packet(op: u8, options: Vec<DhcpOption>) -> DhcpPacket {
        DhcpPacket {
            op,
            htype: 1,
            hlen: 6,
            xid: 0x12345678,
            ciaddr: Ipv4Addr::UNSPECIFIED,
            yiaddr: Ipv4Addr::UNSPECIFIED,
            siaddr: Ipv4Addr::UNSPECIFIED,
            giaddr: Ipv4Addr::UNSPECIFIED,
            chaddr: MacAddr6::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff),
            options,
        }
    }

    mod dhcp_message_type_tests {
        use super::*;

        #[test]
        fn test_from_u8_valid_values() {
            assert_eq!(DhcpMessageType::from_u8(1), Some(DhcpMessageType::Discover));
            assert_eq!(DhcpMessageType::from_u8(3), Some(DhcpMessageType::Request));
            assert_eq!(DhcpMessageType::from_u8(5), Some(DhcpMessageType::Ack));
            assert_eq!(DhcpMessageType::from_u8(6), Some(DhcpMessageType::Nak));
            assert_eq!(DhcpMessageType::from_u8(8), Some(DhcpMessageType::Inform));
        }

        #[test]
        fn test_from_u8_invalid_values() {
            assert_eq!(DhcpMessageType::from_u8(0), None);
            assert_eq!(DhcpMessageType::from_u8(9), None);
            assert_eq!(DhcpMessageType::from_u8(255), None);
        }

        #[test]
        fn test_display() {
            assert_eq!(DhcpMessageType::Ack.to_string(), "ACK");
            assert_eq!(DhcpMessageType::Discover.to_string(), "DISCOVER");
        }
    }

    mod dhcp_packet_tests {
        use super::*;

        #[test]
        fn test_message_type_among_other_options() {
            let packet = create_test_packet(
                2,
                vec![
                    DhcpOption::ServerIdentifier(Ipv4Addr::new(192, 168, 1, 1)),
                    DhcpOption::MessageType(DhcpMessageType::Ack),
                    DhcpOption::LeaseTime(86400),
                ],
            );
            assert_eq!(packet.message_type(), Some(DhcpMessageType::Ack));
            assert_eq!(
                packet.server_identifier(),
                Some(Ipv4Addr::new(192, 168, 1, 1))
            );
        }

        #[test]
        fn test_message_type_absent() {
            let packet = create_test_packet(2, vec![]);
            assert_eq!(packet.message_type(), None);
            assert_eq!(packet.host_name(), None);
        }

        #[test]
        fn test_host_name_present() {
            let packet = create_test_packet(1, vec![DhcpOption::HostName("printer".into())]);
            assert_eq!(packet.host_name(), Some("printer"));
        }
    }
}
