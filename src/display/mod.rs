//! Small-display abstraction.
//!
//! This module defines the `DisplayPanel` trait and a file-backed
//! implementation. A hardware renderer (e.g. an SSD1306 driver) can watch
//! the panel file and mirror it to the screen.

mod panel_file;

pub use panel_file::PanelFile;

use crate::error::DisplayError;

/// Width of one display line, in characters.
pub const DISPLAY_CHAR_WIDTH: usize = 21;

/// A display that renders a short list of text lines.
pub trait DisplayPanel: Send {
    /// Prepare the display. Failure means the monitor runs console-only.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Replace everything on screen with `lines`, top to bottom.
    fn draw(&mut self, lines: &[String]) -> Result<(), DisplayError>;

    /// Blank the display and release it.
    fn deinit(&mut self);
}

/// Lines shown on the panel before the first assignment arrives.
pub fn startup_screen(bridge_ip: Option<std::net::Ipv4Addr>) -> Vec<String> {
    let ip_line = match bridge_ip {
        Some(ip) => format!("My IP: {ip}"),
        None => "My IP: DISCONNECTED".to_string(),
    };
    vec![
        ip_line,
        "IP Spy".to_string(),
        "Reboot a device to".to_string(),
        "see Mac & IP address".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn startup_screen_shows_bridge_address() {
        let lines = startup_screen(Some(Ipv4Addr::new(192, 168, 1, 2)));
        assert_eq!(lines[0], "My IP: 192.168.1.2");
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|line| line.chars().count() <= DISPLAY_CHAR_WIDTH));
    }

    #[test]
    fn startup_screen_without_address() {
        assert_eq!(startup_screen(None)[0], "My IP: DISCONNECTED");
    }
}
