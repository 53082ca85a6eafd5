//! Prelude module for common mapa types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapa::prelude::*;`

pub use crate::core::{
    config::{MapConfig, MapOptions, MapProfile, TileLoadingConfig},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    host::{Container, HeadlessHost, Host},
    map::Map,
    viewport::Viewport,
};

pub use crate::layers::{
    base::{LayerHandle, LayerTrait},
    manager::LayerManager,
    tile::TileLayer,
    vector::{Color, Feature, FeatureId, PointStyle, VectorLayer},
};

pub use crate::input::{
    events::{EventHandled, InputEvent, MapEvent, MouseButton},
    handler::EventManager,
};

pub use crate::interaction::{
    Interaction, InteractionHandle, Select, SelectCondition, SelectEvent, SelectedFeature,
    SelectionState,
};

pub use crate::notify::{LogNotifier, Notifier, RecordingNotifier};

pub use crate::tiles::{OpenStreetMapSource, TileCache, TileLoader, TileSource, XyzSource};

pub use crate::rendering::context::{DrawCommand, RenderContext};

pub use crate::view::MapView;

#[cfg(feature = "egui")]
pub use crate::ui::{EguiHost, MapWidget, ModalNotifier};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
