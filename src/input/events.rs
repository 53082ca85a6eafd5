use crate::{
    core::geo::{LatLng, Point},
    interaction::InteractionHandle,
    layers::vector::FeatureId,
};
use serde::{Deserialize, Serialize};

/// Pointer and window input delivered to the map by the UI backend.
/// Positions are container pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Single click/tap
    Click {
        position: Point,
        button: MouseButton,
    },
    DoubleClick { position: Point },
    MouseMove { position: Point },
    DragStart { position: Point },
    /// Drag in progress, by `delta` pixels since the last event
    Drag { delta: Point },
    DragEnd,
    /// Scroll wheel; positive `delta` zooms in
    Scroll { delta: f64, position: Point },
    Resize { size: Point },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Whether an event was consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl InputEvent {
    /// Left-button click at `position`
    pub fn click(position: Point) -> Self {
        InputEvent::Click {
            position,
            button: MouseButton::Left,
        }
    }

    /// The primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::Click { position, .. }
            | InputEvent::DoubleClick { position }
            | InputEvent::MouseMove { position }
            | InputEvent::DragStart { position }
            | InputEvent::Scroll { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn is_pointer_event(&self) -> bool {
        !matches!(self, InputEvent::Resize { .. })
    }
}

/// Events emitted by the map for subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    ViewChanged { center: LatLng, zoom: f64 },
    Click { lat_lng: LatLng, pixel: Point },
    ZoomEnd { zoom: f64 },
    MoveEnd { center: LatLng },
    LayerAdd { layer_id: String },
    LayerRemove { layer_id: String },
    /// A select interaction changed its selection
    Select {
        interaction: InteractionHandle,
        selected: Vec<FeatureId>,
        deselected: Vec<FeatureId>,
    },
}

impl MapEvent {
    /// Key used to subscribe to this kind of event
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::ViewChanged { .. } => "viewchanged",
            MapEvent::Click { .. } => "click",
            MapEvent::ZoomEnd { .. } => "zoomend",
            MapEvent::MoveEnd { .. } => "moveend",
            MapEvent::LayerAdd { .. } => "layeradd",
            MapEvent::LayerRemove { .. } => "layerremove",
            MapEvent::Select { .. } => "select",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_event_position() {
        let click = InputEvent::click(Point::new(100.0, 200.0));
        assert_eq!(click.position(), Some(Point::new(100.0, 200.0)));
        assert_eq!(InputEvent::DragEnd.position(), None);
    }

    #[test]
    fn test_pointer_classification() {
        assert!(InputEvent::click(Point::default()).is_pointer_event());
        assert!(!InputEvent::Resize {
            size: Point::new(1.0, 1.0)
        }
        .is_pointer_event());
    }

    #[test]
    fn test_event_type_keys() {
        let event = MapEvent::LayerAdd {
            layer_id: "osm".to_string(),
        };
        assert_eq!(event.event_type(), "layeradd");
        assert_eq!(MapEvent::ZoomEnd { zoom: 3.0 }.event_type(), "zoomend");
    }
}
