use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::notifier::DEFAULT_DISPLAY_LINES;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/dhcpspy.conf";
const DEFAULT_BRIDGE_INTERFACE: &str = "br0";
const DEFAULT_WIFI_INTERFACE: &str = "wlan0";
const DEFAULT_DEVICE_LOG: &str = "/home/pi/device_ip.txt";
const DEFAULT_ASSIGNMENTS_LOG: &str = "/home/pi/ip_assignments.log";
const DEFAULT_DISPLAY_PATH: &str = "/run/dhcpspy/panel.txt";
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;
const DEFAULT_LOG_FILTER: &str = "info";

/// Prefix for environment variable overrides, e.g. `DHCPSPY_BRIDGE_INTERFACE`.
const ENV_PREFIX: &str = "DHCPSPY_";

const KEYS: &[&str] = &[
    "bridge_interface",
    "wifi_interface",
    "wifi",
    "device_log",
    "assignments_log",
    "display_enabled",
    "display_path",
    "display_max_lines",
    "log_write_attempts",
    "shutdown_timeout_secs",
    "log_filter",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bridge_interface: String,
    pub wifi_interface: String,
    /// Monitor the wireless interface even without `--wifi`.
    pub wifi: bool,
    pub device_log: PathBuf,
    pub assignments_log: PathBuf,
    pub display_enabled: bool,
    pub display_path: PathBuf,
    pub display_max_lines: usize,
    pub log_write_attempts: u32,
    pub shutdown_timeout: Duration,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge_interface: DEFAULT_BRIDGE_INTERFACE.to_string(),
            wifi_interface: DEFAULT_WIFI_INTERFACE.to_string(),
            wifi: false,
            device_log: PathBuf::from(DEFAULT_DEVICE_LOG),
            assignments_log: PathBuf::from(DEFAULT_ASSIGNMENTS_LOG),
            display_enabled: true,
            display_path: PathBuf::from(DEFAULT_DISPLAY_PATH),
            display_max_lines: DEFAULT_DISPLAY_LINES,
            log_write_attempts: 1,
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Starts from defaults, applies `path` (or the default config file if
    /// it exists), then `DHCPSPY_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let path = path
            .map(Path::to_path_buf)
            .or_else(|| Some(PathBuf::from(DEFAULT_CONFIG_PATH)).filter(|p| p.exists()));

        if let Some(path) = path {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            config.apply_file(&content)?;
        }

        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `key = value` lines. Blank lines, `#` comments and unknown
    /// keys are ignored.
    pub fn apply_file(&mut self, content: &str) -> Result<(), ConfigError> {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                self.set(key.trim(), value.trim())?;
            }
        }
        Ok(())
    }

    /// Apply overrides from environment variables looked up via `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in KEYS {
            let name = format!("{}{}", ENV_PREFIX, key.to_uppercase());
            if let Some(value) = lookup(&name) {
                self.set(key, value.trim())?;
            }
        }
        Ok(())
    }

    /// Interfaces to monitor: the bridge, plus the wireless interface when
    /// `wifi` is requested or enabled in the configuration.
    pub fn interfaces(&self, wifi: bool) -> Vec<String> {
        let mut interfaces = vec![self.bridge_interface.clone()];
        if (wifi || self.wifi) && self.wifi_interface != self.bridge_interface {
            interfaces.push(self.wifi_interface.clone());
        }
        interfaces
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "bridge_interface" => self.bridge_interface = value.to_string(),
            "wifi_interface" => self.wifi_interface = value.to_string(),
            "wifi" => self.wifi = parse_bool(value).ok_or_else(invalid)?,
            "device_log" => self.device_log = PathBuf::from(value),
            "assignments_log" => self.assignments_log = PathBuf::from(value),
            "display_enabled" => self.display_enabled = parse_bool(value).ok_or_else(invalid)?,
            "display_path" => self.display_path = PathBuf::from(value),
            "display_max_lines" => {
                self.display_max_lines = value
                    .parse()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(invalid)?;
            }
            "log_write_attempts" => {
                self.log_write_attempts = value
                    .parse()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(invalid)?;
            }
            "shutdown_timeout_secs" => {
                let secs: u64 = value.parse().map_err(|_| invalid())?;
                self.shutdown_timeout = Duration::from_secs(secs);
            }
            "log_filter" => self.log_filter = value.to_string(),
            _ => {}
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
