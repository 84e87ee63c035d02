//! Rolling line buffer mirrored to the small display.

use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::{Mutex, MutexGuard};

use super::TransientSink;
use crate::display::{DisplayPanel, DISPLAY_CHAR_WIDTH};
use crate::domain::Notification;

/// Number of lines that fit on a 128x64 panel with the default font.
pub const DEFAULT_DISPLAY_LINES: usize = 5;

/// Status messages contribute at most this many lines.
const STATUS_MAX_LINES: usize = 2;

struct DisplayState {
    lines: VecDeque<String>,
    panel: Option<Box<dyn DisplayPanel>>,
}

/// The most recent `max_lines` display lines.
///
/// Every update redraws the whole visible buffer; older lines fall off the
/// top. Without a panel the buffer is still maintained, just not drawn.
pub struct DisplayBuffer {
    max_lines: usize,
    state: Mutex<DisplayState>,
}

impl DisplayBuffer {
    pub fn new(max_lines: usize, panel: Option<Box<dyn DisplayPanel>>) -> Self {
        Self {
            max_lines: max_lines.max(1),
            state: Mutex::new(DisplayState {
                lines: VecDeque::with_capacity(max_lines + STATUS_MAX_LINES),
                panel,
            }),
        }
    }

    /// Whether a panel is attached.
    pub fn has_panel(&self) -> bool {
        self.lock().panel.is_some()
    }

    /// Currently visible lines, top first.
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.iter().cloned().collect()
    }

    /// Append lines, trim to capacity and redraw, under one lock.
    pub fn push_lines(&self, new_lines: Vec<String>) {
        let mut state = self.lock();
        state.lines.extend(new_lines);
        while state.lines.len() > self.max_lines {
            state.lines.pop_front();
        }

        let visible: Vec<String> = state.lines.iter().cloned().collect();
        if let Some(panel) = state.panel.as_mut() {
            if let Err(e) = panel.draw(&visible) {
                tracing::debug!("Display update failed: {}", e);
            }
        }
    }

    /// Blank the panel and detach it. Later updates only touch the buffer.
    pub fn release(&self) {
        if let Some(mut panel) = self.lock().panel.take() {
            panel.deinit();
        }
    }

    fn render(notification: &Notification) -> Vec<String> {
        match notification {
            Notification::Assignment(observation) => vec![
                display_label(&observation.interface, observation.ip),
                format!("MAC: {}", observation.mac_string()),
            ],
            Notification::Status { message, .. } => message
                .lines()
                .take(STATUS_MAX_LINES)
                .map(|line| line.chars().take(DISPLAY_CHAR_WIDTH).collect())
                .collect(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DisplayState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TransientSink for DisplayBuffer {
    fn show(&self, notification: &Notification) {
        self.push_lines(Self::render(notification));
    }
}

/// Display label for an address, based on the interface naming scheme.
///
/// Wired and bridge interfaces (`br*`, `eth*`) read `LAN`, wireless
/// (`wl*`) read `WIFI`; anything else shows the interface name.
pub fn display_label(interface: &str, ip: Ipv4Addr) -> String {
    if interface.starts_with("br") || interface.starts_with("eth") {
        format!("LAN: {ip}")
    } else if interface.starts_with("wl") {
        format!("WIFI: {ip}")
    } else {
        format!("{}: {ip}", interface.to_uppercase())
    }
}
