//! The host UI environment a map is embedded in
//!
//! A host exposes named containers the map can render into and the channel
//! used to notify the user.

use crate::{
    core::geo::Point,
    notify::{Notifier, RecordingNotifier},
    prelude::HashMap,
};
use std::sync::Arc;

/// A container element the map can be bound to
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: String,
    /// Size in pixels
    pub size: Point,
}

impl Container {
    pub fn new(id: impl Into<String>, size: Point) -> Self {
        Self {
            id: id.into(),
            size,
        }
    }
}

pub trait Host {
    /// Looks up a container by id
    fn container(&self, id: &str) -> Option<Container>;

    /// Channel used for user-facing alerts
    fn notifier(&self) -> Arc<dyn Notifier>;
}

/// Host without a real UI, for tests and batch runs
pub struct HeadlessHost {
    containers: HashMap<String, Container>,
    notifier: RecordingNotifier,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self {
            containers: HashMap::default(),
            notifier: RecordingNotifier::new(),
        }
    }

    /// Registers (or resizes) a container
    pub fn with_container(mut self, id: impl Into<String>, size: Point) -> Self {
        let container = Container::new(id, size);
        self.containers.insert(container.id.clone(), container);
        self
    }

    /// The alerts delivered through this host
    pub fn alerts(&self) -> &RecordingNotifier {
        &self.notifier
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for HeadlessHost {
    fn container(&self, id: &str) -> Option<Container> {
        self.containers.get(id).cloned()
    }

    fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::new(self.notifier.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_lookup() {
        let host = HeadlessHost::new().with_container("map", Point::new(800.0, 600.0));
        let container = host.container("map").unwrap();
        assert_eq!(container.size, Point::new(800.0, 600.0));
        assert!(host.container("sidebar").is_none());
    }

    #[test]
    fn test_notifier_reports_to_host() {
        let host = HeadlessHost::new();
        host.notifier().alert("hi");
        assert_eq!(host.alerts().messages(), vec!["hi"]);
    }
}
