use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while decoding a DHCP payload.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("packet too short: expected at least {expected} bytes, got {actual}")]
    PacketTooShort { expected: usize, actual: usize },

    #[error("invalid DHCP magic cookie")]
    InvalidMagicCookie,

    #[error("invalid option at offset {offset}: {message}")]
    InvalidOption { offset: usize, message: String },
}

/// Errors raised while opening a capture channel.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("insufficient permissions to capture packets (run as root)")]
    InsufficientPermissions,

    #[error("failed to create capture channel: {0}")]
    ChannelCreation(String),
}

/// Errors raised by the display collaborator.
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("display I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("root privileges required for packet capture")]
    Privilege,

    #[error("could not start capture on {interface}: {source}")]
    CaptureStart {
        interface: String,
        #[source]
        source: CaptureError,
    },

    #[error("failed to write {path:?}: {source}")]
    LogWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no capture session could be started")]
    NoSessions,
}
