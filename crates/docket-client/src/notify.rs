use std::sync::Mutex;

use crate::analysis::reminders::DocumentReminder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Push,
}

impl Channel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Push => "push",
        }
    }
}

/// Delivery seam for due reminders.
///
/// The core only schedules and counts; whatever actually sends an email or
/// a push notification lives behind this trait. Implementations must not
/// panic on failure; return the failure reason instead.
pub trait Notifier {
    fn deliver(&self, reminder: &DocumentReminder, channel: Channel) -> Result<(), String>;
}

/// Accepts every delivery without doing anything. Useful when reminder
/// bookkeeping should advance without a real transport configured.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn deliver(&self, _reminder: &DocumentReminder, _channel: Channel) -> Result<(), String> {
        Ok(())
    }
}

/// Test double that records every delivery attempt.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<(String, &'static str)>>,
    fail_all: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            fail_all: true,
        }
    }

    pub fn deliveries(&self) -> Vec<(String, &'static str)> {
        match self.deliveries.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => Vec::new(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn deliver(&self, reminder: &DocumentReminder, channel: Channel) -> Result<(), String> {
        if let Ok(mut guard) = self.deliveries.lock() {
            guard.push((reminder.id.clone(), channel.as_str()));
        }
        if self.fail_all {
            return Err("delivery refused by test notifier".to_string());
        }
        Ok(())
    }
}
