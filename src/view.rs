//! The marker map
//!
//! [`MapView`] composes the engine into a single interactive map: an
//! OpenStreetMap base layer, marker layers built from lon/lat pairs and a
//! click selection that alerts the user and then clears itself.

use crate::{
    core::{
        config::{MapConfig, MapProfile},
        constants::MARKER_CLICK_MESSAGE,
        geo::{LatLng, Point},
        host::Host,
        map::Map,
    },
    input::events::{EventHandled, InputEvent},
    interaction::{InteractionHandle, Select, SelectCondition},
    layers::{
        base::{LayerHandle, LayerTrait, LayerType},
        tile::TileLayer,
        vector::{Color, Feature, PointStyle, VectorLayer},
    },
    notify::Notifier,
    rendering::context::RenderContext,
    MapError, Result,
};
use std::{fmt, sync::Arc};

/// Z-index of the base layer; vector layers sit above it at 0
pub const BASE_LAYER_Z_INDEX: i32 = -1;

pub struct MapView {
    map: Map,
    config: MapConfig,
    notifier: Arc<dyn Notifier>,
    next_marker_id: u64,
}

impl MapView {
    /// Binds a new map to the host container `target_id`
    ///
    /// Fails with [`MapError::TargetNotFound`] when the host has no such
    /// container.
    pub fn initialize(host: &dyn Host, target_id: &str, center: LatLng, zoom: f64) -> Result<Self> {
        Self::with_profile(host, target_id, center, zoom, MapProfile::default())
    }

    pub fn with_profile(
        host: &dyn Host,
        target_id: &str,
        center: LatLng,
        zoom: f64,
        profile: MapProfile,
    ) -> Result<Self> {
        let container = host
            .container(target_id)
            .ok_or_else(|| MapError::TargetNotFound(target_id.to_string()))?;
        let config = profile.resolve();
        let map = Map::with_config(container.id, center, zoom, container.size, &config)?;

        log::info!(
            "map bound to '{}' at ({}, {}) zoom {}",
            target_id,
            center.lat,
            center.lng,
            zoom
        );

        Ok(Self {
            map,
            config,
            notifier: host.notifier(),
            next_marker_id: 1,
        })
    }

    /// Adds the OpenStreetMap raster layer at the bottom of the stack
    pub fn add_base_layer(&mut self) -> Result<LayerHandle> {
        let handle = LayerHandle::new("osm");
        let mut layer = TileLayer::openstreetmap(handle.id().to_string(), self.config.tile_loader.clone());
        layer.set_z_index(BASE_LAYER_Z_INDEX);
        self.map.add_layer(Box::new(layer))?;
        log::info!("base layer '{}' added", handle);
        Ok(handle)
    }

    /// Adds a layer holding one marker at `(lon, lat)` degrees
    pub fn add_marker(&mut self, lon: f64, lat: f64, style: PointStyle) -> Result<LayerHandle> {
        let id = self.next_marker_id;
        let feature = Feature::from_lon_lat(id, lon, lat)?;
        let handle = LayerHandle::new(format!("marker-{}", id));

        let layer = VectorLayer::new(handle.id().to_string(), vec![feature], style).with_name("Marker");
        self.map.add_layer(Box::new(layer))?;
        self.next_marker_id += 1;

        log::info!("marker '{}' placed at lon {} lat {}", handle, lon, lat);
        Ok(handle)
    }

    /// Makes features of `layer` selectable by click
    ///
    /// Each click that selects a feature sends [`MARKER_CLICK_MESSAGE`]
    /// through the host notifier and empties the selection again before
    /// returning, so every hit notifies once and misses never do. Calling
    /// this twice for one layer registers two interactions and two alerts
    /// per click.
    pub fn enable_click_selection(&mut self, layer: &LayerHandle, style: PointStyle) -> Result<InteractionHandle> {
        match self.map.get_layer(layer.id()).map(|l| l.layer_type()) {
            Some(LayerType::Vector) => {}
            Some(other) => {
                return Err(MapError::Interaction(format!(
                    "cannot select on {} layer '{}'",
                    other, layer
                )))
            }
            None => return Err(MapError::Layer(format!("unknown layer '{}'", layer))),
        }

        let notifier = self.notifier.clone();
        let mut select = Select::new(SelectCondition::Click)
            .with_layer(layer)
            .with_style(style);
        select.on_select(move |event, selection| {
            if event.selected.is_empty() {
                return;
            }
            log::debug!("{} feature(s) selected", selection.len());
            notifier.alert(MARKER_CLICK_MESSAGE);
            selection.clear();
        });

        let handle = self.map.add_interaction(Box::new(select));
        log::info!("click selection {:?} enabled on '{}'", handle, layer);
        Ok(handle)
    }

    /// Red marker with a yellow outline
    pub fn default_marker_style() -> PointStyle {
        PointStyle::new(Color::RED, Color::YELLOW, 10.0)
    }

    pub fn handle_input(&mut self, input: InputEvent) -> Result<EventHandled> {
        let handled = self.map.handle_input(input)?;
        self.map.process_events();
        Ok(handled)
    }

    /// Drives tile loading; true when something new can be drawn
    pub fn update(&mut self) -> Result<bool> {
        self.map.update()
    }

    /// Tiles requested but not yet arrived, across all tile layers
    pub fn pending_tiles(&self) -> usize {
        self.map
            .layers()
            .layers()
            .into_iter()
            .filter_map(|layer| layer.as_any().downcast_ref::<TileLayer>())
            .map(TileLayer::pending_count)
            .sum()
    }

    pub fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        self.map.render(context)
    }

    /// Resizes the map to its container
    pub fn resize(&mut self, size: Point) {
        self.map.viewport_mut().set_size(size);
    }

    pub fn center(&self) -> LatLng {
        self.map.viewport().center
    }

    pub fn zoom(&self) -> f64 {
        self.map.viewport().zoom
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }
}

impl fmt::Debug for MapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapView")
            .field("target", &self.map.target())
            .field("center", &self.center())
            .field("zoom", &self.zoom())
            .field("layers", &self.map.list_layers())
            .field("interactions", &self.map.interaction_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{config::MapProfile, host::HeadlessHost};

    fn host() -> HeadlessHost {
        HeadlessHost::new().with_container("map", Point::new(800.0, 600.0))
    }

    fn view(host: &HeadlessHost) -> MapView {
        MapView::with_profile(host, "map", LatLng::new(0.0, 0.0), 2.0, MapProfile::Offline).unwrap()
    }

    #[test]
    fn test_initialize_binds_container() {
        let host = host();
        let view = view(&host);
        assert_eq!(view.map().target(), "map");
        assert_eq!(view.zoom(), 2.0);
        assert_eq!(view.center(), LatLng::new(0.0, 0.0));
        assert_eq!(view.map().viewport().size, Point::new(800.0, 600.0));
    }

    #[test]
    fn test_missing_container_is_an_error() {
        let host = HeadlessHost::new();
        let result = MapView::initialize(&host, "map", LatLng::new(0.0, 0.0), 2.0);
        assert!(matches!(result, Err(MapError::TargetNotFound(id)) if id == "map"));
    }

    #[test]
    fn test_base_layer_stays_at_the_bottom() {
        let host = host();
        let mut view = view(&host);
        let marker = view.add_marker(2.8, 41.9, MapView::default_marker_style()).unwrap();
        let base = view.add_base_layer().unwrap();
        assert_eq!(
            view.map().list_layers(),
            vec![base.id().to_string(), marker.id().to_string()]
        );
        assert!(view.add_base_layer().is_err());
    }

    #[test]
    fn test_markers_get_distinct_layers() {
        let host = host();
        let mut view = view(&host);
        let a = view.add_marker(2.8, 41.9, MapView::default_marker_style()).unwrap();
        let b = view.add_marker(-3.7, 40.4, MapView::default_marker_style()).unwrap();
        assert_ne!(a, b);
        assert_eq!(view.map().list_layers().len(), 2);
    }

    #[test]
    fn test_invalid_marker_is_rejected() {
        let host = host();
        let mut view = view(&host);
        let result = view.add_marker(2.8, 123.0, MapView::default_marker_style());
        assert!(matches!(result, Err(MapError::InvalidCoordinates(_))));
        assert!(view.map().list_layers().is_empty());
    }

    #[test]
    fn test_selection_requires_vector_layer() {
        let host = host();
        let mut view = view(&host);
        let base = view.add_base_layer().unwrap();
        assert!(matches!(
            view.enable_click_selection(&base, MapView::default_marker_style()),
            Err(MapError::Interaction(_))
        ));
        assert!(matches!(
            view.enable_click_selection(&LayerHandle::new("nope"), MapView::default_marker_style()),
            Err(MapError::Layer(_))
        ));
    }

    #[test]
    fn test_click_alerts_and_clears() {
        let host = host();
        let mut view = view(&host);
        let marker = view.add_marker(2.8, 41.9, MapView::default_marker_style()).unwrap();
        let handle = view
            .enable_click_selection(&marker, MapView::default_marker_style())
            .unwrap();

        view.handle_input(InputEvent::click(Point::new(408.0, 168.5))).unwrap();
        assert_eq!(host.alerts().messages(), vec![MARKER_CLICK_MESSAGE.to_string()]);

        let remaining = view
            .map_mut()
            .with_interaction_mut(handle, |i| {
                i.as_any().downcast_ref::<Select>().map(|s| s.selection().len())
            })
            .flatten();
        assert_eq!(remaining, Some(0));

        // Clicking again alerts again
        view.handle_input(InputEvent::click(Point::new(408.0, 168.5))).unwrap();
        assert_eq!(host.alerts().count(), 2);
    }

    #[test]
    fn test_debug_lists_target_and_layers() {
        let host = host();
        let mut view = view(&host);
        view.add_marker(2.8, 41.9, MapView::default_marker_style()).unwrap();
        let text = format!("{:?}", view);
        assert!(text.starts_with("MapView"));
        assert!(text.contains("\"map\""));
        assert!(text.contains("marker-1"));
    }
}
