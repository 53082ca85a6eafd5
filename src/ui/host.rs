use super::notifier::ModalNotifier;
use crate::{
    core::{
        constants::DEFAULT_TARGET,
        geo::Point,
        host::{Container, Host},
    },
    notify::Notifier,
};
use std::sync::Arc;

/// Host backed by an egui window
///
/// The window exposes a single map container; alerts go to a
/// [`ModalNotifier`] the widget draws on top of the map.
#[derive(Debug, Clone)]
pub struct EguiHost {
    container: Container,
    modal: ModalNotifier,
}

impl EguiHost {
    /// Host with the standard `"map"` container of `size` pixels
    pub fn new(size: Point) -> Self {
        Self::with_target(DEFAULT_TARGET, size)
    }

    pub fn with_target(id: impl Into<String>, size: Point) -> Self {
        Self {
            container: Container::new(id, size),
            modal: ModalNotifier::new(),
        }
    }

    pub fn modal(&self) -> &ModalNotifier {
        &self.modal
    }
}

impl Host for EguiHost {
    fn container(&self, id: &str) -> Option<Container> {
        (self.container.id == id).then(|| self.container.clone())
    }

    fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::new(self.modal.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_egui_host_exposes_map_container() {
        let host = EguiHost::new(Point::new(1024.0, 768.0));
        assert_eq!(host.container("map").map(|c| c.size), Some(Point::new(1024.0, 768.0)));
        assert!(host.container("other").is_none());
    }

    #[test]
    fn test_alerts_reach_the_modal() {
        let host = EguiHost::new(Point::new(10.0, 10.0));
        host.notifier().alert("click over marker");
        assert_eq!(host.modal().current().as_deref(), Some("click over marker"));
    }
}
