//! Raster tile layer
//!
//! The layer works out which slippy-map tiles cover the view, asks the
//! [`TileLoader`] for the ones it does not have, and draws whatever is in its
//! cache. Downloads never block rendering: a missing tile is simply not drawn
//! until it arrives, and a failed tile stays blank.

use crate::{
    core::{
        config::TileLoadingConfig,
        constants::TILE_SIZE,
        geo::{Point, TileCoord},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    rendering::context::{RenderContext, TextAnchor},
    prelude::HashSet,
    tiles::{OpenStreetMapSource, TileCache, TileLoader, TileSource},
    Result,
};

/// A tile covering part of the view, with its screen rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleTile {
    pub coord: TileCoord,
    /// min, max in container pixels
    pub bounds: (Point, Point),
}

pub struct TileLayer {
    properties: LayerProperties,
    source: Box<dyn TileSource>,
    loader: TileLoader,
    cache: TileCache,
    /// Tiles that gave up downloading; not requested again
    failed: HashSet<TileCoord>,
}

impl TileLayer {
    pub fn new(id: String, source: Box<dyn TileSource>, config: TileLoadingConfig) -> Self {
        let properties = LayerProperties::new(id, "Tile Layer".to_string(), LayerType::Tile);
        let cache = TileCache::new(config.cache_size);
        Self {
            properties,
            source,
            loader: TileLoader::new(config),
            cache,
            failed: HashSet::default(),
        }
    }

    /// Base layer backed by the OpenStreetMap tile server
    pub fn openstreetmap(id: String, config: TileLoadingConfig) -> Self {
        Self::new(id, Box::new(OpenStreetMapSource::new()), config).with_name("OpenStreetMap")
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.properties.name = name.into();
        self
    }

    pub fn source(&self) -> &dyn TileSource {
        self.source.as_ref()
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn pending_count(&self) -> usize {
        self.loader.pending_count()
    }

    /// Number of tiles that could not be downloaded
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Integer zoom of the tiles used for the current view
    pub fn tile_zoom(&self, viewport: &Viewport) -> u8 {
        let max = self.source.max_zoom() as f64;
        viewport.zoom.round().clamp(0.0, max) as u8
    }

    /// Tiles covering the view, nearest to the center first
    pub fn visible_tiles(&self, viewport: &Viewport) -> Vec<VisibleTile> {
        let zoom = self.tile_zoom(viewport);
        let tiles_per_axis = TileCoord::tiles_per_axis(zoom) as i64;
        let tile_size = TILE_SIZE as f64 * 2_f64.powf(viewport.zoom - zoom as f64);

        let center = viewport.project(&viewport.center, None);
        let top_left = Point::new(center.x - viewport.size.x / 2.0, center.y - viewport.size.y / 2.0);
        let bottom_right = Point::new(top_left.x + viewport.size.x, top_left.y + viewport.size.y);

        let min_x = (top_left.x / tile_size).floor() as i64;
        let max_x = ((bottom_right.x / tile_size).ceil() as i64) - 1;
        let min_y = ((top_left.y / tile_size).floor() as i64).max(0);
        let max_y = (((bottom_right.y / tile_size).ceil() as i64) - 1).min(tiles_per_axis - 1);

        let mut tiles = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let min = Point::new(x as f64 * tile_size - top_left.x, y as f64 * tile_size - top_left.y);
                let max = Point::new(min.x + tile_size, min.y + tile_size);
                // The world repeats horizontally
                let wrapped_x = x.rem_euclid(tiles_per_axis) as u32;
                tiles.push(VisibleTile {
                    coord: TileCoord::new(wrapped_x, y as u32, zoom),
                    bounds: (min, max),
                });
            }
        }

        let middle = Point::new(viewport.size.x / 2.0, viewport.size.y / 2.0);
        tiles.sort_by(|a, b| {
            let da = tile_center(a).distance_to(&middle);
            let db = tile_center(b).distance_to(&middle);
            da.total_cmp(&db)
        });
        tiles
    }

    /// Moves finished downloads into the cache; returns how many arrived
    fn process_tile_results(&mut self) -> usize {
        let mut arrived = 0;
        for result in self.loader.try_recv_results() {
            match result.data {
                Ok(data) => {
                    self.cache.insert(result.coord, data);
                    arrived += 1;
                }
                Err(e) => {
                    log::warn!("failed to load tile {:?}: {}", result.coord, e);
                    self.failed.insert(result.coord);
                }
            }
        }
        arrived
    }
}

fn tile_center(tile: &VisibleTile) -> Point {
    let (min, max) = tile.bounds;
    Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0)
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);

    fn update(&mut self, viewport: &Viewport) -> Result<bool> {
        let arrived = self.process_tile_results();

        for tile in self.visible_tiles(viewport) {
            if !self.cache.contains(&tile.coord) && !self.failed.contains(&tile.coord) {
                self.loader.request(self.source.as_ref(), tile.coord)?;
            }
        }

        Ok(arrived > 0)
    }

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let opacity = self.properties.opacity;
        for tile in self.visible_tiles(viewport) {
            if let Some(data) = self.cache.get(&tile.coord) {
                context.render_tile(tile.coord, data, tile.bounds, opacity)?;
            }
        }

        if let Some(attribution) = self.source.attribution() {
            context.render_text(&viewport.size, attribution, TextAnchor::BottomRight);
        }
        Ok(())
    }

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.properties.id,
            "type": self.properties.layer_type.to_string(),
            "attribution": self.source.attribution(),
            "max_zoom": self.source.max_zoom(),
            "cached_tiles": self.cache.len(),
            "fetch_enabled": self.loader.config().fetch_enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::geo::LatLng, rendering::context::DrawCommand};

    fn offline_layer() -> TileLayer {
        TileLayer::openstreetmap(
            "osm".to_string(),
            TileLoadingConfig {
                fetch_enabled: false,
                ..TileLoadingConfig::default()
            },
        )
    }

    fn viewport() -> Viewport {
        Viewport::new(LatLng::new(0.0, 0.0), 2.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_visible_tiles_at_zoom_two() {
        let layer = offline_layer();
        let tiles = layer.visible_tiles(&viewport());

        // The 1024px world covers x 112..912, y 212..812 of it
        assert_eq!(tiles.len(), 16);
        assert!(tiles.iter().all(|t| t.coord.z == 2 && t.coord.is_valid()));

        // Nearest to the middle of the view first
        let first = tiles[0];
        assert!(first.bounds.0.x <= 400.0 && first.bounds.1.x >= 400.0);
        assert!(first.bounds.0.y <= 300.0 && first.bounds.1.y >= 300.0);
    }

    #[test]
    fn test_visible_tiles_wrap_horizontally() {
        let layer = offline_layer();
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0));
        let tiles = layer.visible_tiles(&viewport);

        // Only one row exists at zoom 0 and it repeats across the view
        assert_eq!(tiles.len(), 5);
        assert!(tiles.iter().all(|t| t.coord == TileCoord::new(0, 0, 0)));
    }

    #[test]
    fn test_fractional_zoom_scales_tiles() {
        let layer = offline_layer();
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 2.4, Point::new(800.0, 600.0));
        assert_eq!(layer.tile_zoom(&viewport), 2);
        let tile = layer.visible_tiles(&viewport)[0];
        let width = tile.bounds.1.x - tile.bounds.0.x;
        assert!((width - 256.0 * 2_f64.powf(0.4)).abs() < 1e-9);
    }

    #[test]
    fn test_offline_update_requests_nothing() {
        let mut layer = offline_layer();
        let repaint = layer.update(&viewport()).unwrap();
        assert!(!repaint);
        assert_eq!(layer.pending_count(), 0);
    }

    #[test]
    fn test_render_draws_cached_tiles_and_attribution() {
        let mut layer = offline_layer();
        layer.cache().insert(TileCoord::new(2, 1, 2), vec![0u8; 8]);

        let mut ctx = RenderContext::new(800, 600);
        layer.render(&mut ctx, &viewport()).unwrap();

        assert_eq!(ctx.tile_count(), 1);
        assert!(ctx.get_drawing_queue().iter().any(|cmd| matches!(
            cmd,
            DrawCommand::Text { text, .. } if text == "© OpenStreetMap contributors"
        )));
    }

    #[test]
    fn test_arrivals_fill_cache_and_failures_are_counted() {
        use crate::tiles::TileResult;

        let mut layer = offline_layer();
        let sender = layer.loader.sender();
        sender
            .send(TileResult {
                coord: TileCoord::new(1, 1, 2),
                data: Ok(vec![1, 2, 3]),
            })
            .unwrap();
        sender
            .send(TileResult {
                coord: TileCoord::new(2, 1, 2),
                data: Err("404".to_string()),
            })
            .unwrap();

        assert!(layer.update(&viewport()).unwrap());
        assert!(layer.cache().contains(&TileCoord::new(1, 1, 2)));
        assert_eq!(layer.failed_count(), 1);
    }

    #[test]
    fn test_options_snapshot() {
        let layer = offline_layer();
        let options = layer.options();
        assert_eq!(options["type"], "tile");
        assert_eq!(options["fetch_enabled"], false);
        assert_eq!(layer.name(), "OpenStreetMap");
    }
}
