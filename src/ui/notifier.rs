use crate::notify::Notifier;
use egui::{Align2, Context};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// Shows alerts as a modal egui window
///
/// Alerts raised while one is already open are queued and shown in order.
/// Clones share the same queue, so the copy handed to the map and the copy
/// kept by the UI see the same alerts.
#[derive(Debug, Clone, Default)]
pub struct ModalNotifier {
    queue: Arc<Mutex<VecDeque<String>>>,
}

impl ModalNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while an alert is waiting to be dismissed
    pub fn is_open(&self) -> bool {
        self.len() > 0
    }

    pub fn len(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn current(&self) -> Option<String> {
        self.queue.lock().ok().and_then(|q| q.front().cloned())
    }

    /// Closes the alert on screen
    pub fn dismiss(&self) -> Option<String> {
        self.queue.lock().ok().and_then(|mut q| q.pop_front())
    }

    /// Draws the current alert, if any
    pub fn show(&self, ctx: &Context) {
        let Some(message) = self.current() else {
            return;
        };

        egui::Window::new("Alert")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&message);
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    self.dismiss();
                }
            });
    }
}

impl Notifier for ModalNotifier {
    fn alert(&self, message: &str) {
        log::info!("alert: {}", message);
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alerts_queue_until_dismissed() {
        let notifier = ModalNotifier::new();
        assert!(!notifier.is_open());

        let shared = notifier.clone();
        shared.alert("first");
        shared.alert("second");

        assert!(notifier.is_open());
        assert_eq!(notifier.current().as_deref(), Some("first"));
        assert_eq!(notifier.dismiss().as_deref(), Some("first"));
        assert_eq!(notifier.current().as_deref(), Some("second"));
        notifier.dismiss();
        assert!(!notifier.is_open());
        assert_eq!(notifier.dismiss(), None);
    }
}
