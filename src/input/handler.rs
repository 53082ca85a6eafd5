use crate::{input::events::MapEvent, prelude::HashMap};
use std::collections::VecDeque;

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Queue of map events with string-keyed subscribers
///
/// Events are queued by `emit` and only delivered to listeners when
/// `process_events` runs, so listeners never observe a half-updated map.
#[derive(Default)]
pub struct EventManager {
    listeners: HashMap<String, Vec<EventCallback>>,
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for events whose `event_type()` is `event_type`
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    pub fn emit(&mut self, event: MapEvent) {
        self.event_queue.push_back(event);
    }

    /// Delivers all queued events and returns them
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let events: Vec<_> = self.event_queue.drain(..).collect();

        for event in &events {
            if let Some(callbacks) = self.listeners.get(event.event_type()) {
                for callback in callbacks {
                    callback(event);
                }
            }
        }

        events
    }

    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn test_listeners_receive_matching_events() {
        let mut manager = EventManager::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        manager.on("moveend", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.emit(MapEvent::MoveEnd {
            center: LatLng::new(0.0, 0.0),
        });
        manager.emit(MapEvent::ZoomEnd { zoom: 2.0 });
        assert_eq!(manager.pending_events(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        let events = manager.process_events();
        assert_eq!(events.len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(manager.pending_events(), 0);
    }
}
