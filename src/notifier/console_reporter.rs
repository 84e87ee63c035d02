//! Console-based event reporter.

use std::io::{self, Write};

use chrono::{DateTime, Local};

use super::TransientSink;
use crate::domain::Notification;

/// Width of the rule printed around important messages.
const BANNER_WIDTH: usize = 50;

/// Reports notifications to stdout.
///
/// Every line is prefixed with the local time; important messages are
/// framed by a rule so assignments stand out in a scrolling terminal.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    fn format_notification(&self, notification: &Notification, now: DateTime<Local>) -> String {
        let line = format!("[{}] {}", now.format("%H:%M:%S"), notification.text());

        if notification.important() {
            let rule = "=".repeat(BANNER_WIDTH);
            format!("\n{rule}\n{line}\n{rule}")
        } else {
            line
        }
    }
}

impl TransientSink for ConsoleReporter {
    fn show(&self, notification: &Notification) {
        let output = self.format_notification(notification, Local::now());
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", output);
    }
}
