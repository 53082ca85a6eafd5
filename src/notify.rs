//! User notification channel
//!
//! The map never talks to a dialog API directly; it sends messages through a
//! [`Notifier`] supplied by the host environment.

use std::sync::{Arc, Mutex};

/// Something that can show a message to the user
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Writes alerts to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        log::info!("alert: {}", message);
    }
}

/// Keeps every alert it receives; clones share the same record
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the alerts received so far, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().map(|messages| messages.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        log::debug!("recorded alert: {}", message);
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_shares_state() {
        let notifier = RecordingNotifier::new();
        let handle: Arc<dyn Notifier> = Arc::new(notifier.clone());

        handle.alert("first");
        handle.alert("second");

        assert_eq!(notifier.count(), 2);
        assert_eq!(notifier.messages(), vec!["first", "second"]);

        notifier.clear();
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn test_log_notifier_does_not_panic() {
        LogNotifier.alert("hello");
    }
}
