//! # Mapa
//!
//! An interactive slippy map with one selectable marker.
//!
//! The crate is split in two halves: a small map engine (viewport and
//! Web Mercator projection, tile and vector layers, input events, select
//! interaction, draw-command rendering) and [`view::MapView`], which composes
//! that engine into the marker map: an OpenStreetMap base layer, a marker at
//! a fixed coordinate and a click selection that raises an alert.

pub mod core;
pub mod input;
pub mod interaction;
pub mod layers;
pub mod notify;
pub mod prelude;
pub mod rendering;
pub mod startup;
pub mod tiles;
#[cfg(feature = "egui")]
pub mod ui;
pub mod view;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    host::{Container, HeadlessHost, Host},
    map::Map,
    viewport::Viewport,
};

pub use layers::{
    base::{LayerHandle, LayerTrait},
    tile::TileLayer,
    vector::{Color, Feature, PointStyle, VectorLayer},
};

pub use input::{events::InputEvent, events::MapEvent};

pub use interaction::{
    select::{Select, SelectCondition, SelectEvent, SelectionState},
    Interaction, InteractionHandle,
};

pub use notify::{LogNotifier, Notifier, RecordingNotifier};

pub use rendering::context::{DrawCommand, RenderContext};

pub use view::MapView;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Interaction error: {0}")]
    Interaction(String),

    #[error("Target container not found: {0}")]
    TargetNotFound(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Error type alias for convenience
pub type Error = MapError;
