//! Frame classification module.
//!
//! Decides whether a captured frame is a DHCP ACK worth recording.

mod frame_classifier;

pub use frame_classifier::{
    dhcp_payload, Classification, FrameClassifier, DHCP_CLIENT_PORT, DHCP_SERVER_PORT,
};
