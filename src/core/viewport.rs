use crate::core::{
    constants::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, EARTH_RADIUS, MAX_LATITUDE, TILE_SIZE},
    geo::{LatLng, LatLngBounds, Point},
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The current view of the map: center, zoom and container size
///
/// All pixel coordinates returned by the conversion methods are relative to
/// the top-left corner of the container the map renders into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    pub zoom: f64,
    /// The size of the container in pixels
    pub size: Point,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM),
            size,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }

    /// Sets the center, clamped to the representable world
    pub fn set_center(&mut self, center: LatLng) {
        self.center = Self::clamp_center(center);
    }

    /// Sets the zoom level, clamping to the configured limits
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    /// Scale factor for the current zoom level
    pub fn scale(&self) -> f64 {
        2_f64.powf(self.zoom)
    }

    /// Size of the whole world in pixels at `zoom`
    fn world_size(zoom: f64) -> f64 {
        TILE_SIZE as f64 * 2_f64.powf(zoom)
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        self.project_coordinate(&lat_lng.to_mercator(), zoom)
    }

    /// Projects EPSG:3857 metres to world pixel coordinates
    pub fn project_coordinate(&self, coordinate: &Point, zoom: Option<f64>) -> Point {
        let world = Self::world_size(zoom.unwrap_or(self.zoom));
        let extent = 2.0 * PI * EARTH_RADIUS;
        Point::new(
            (coordinate.x + PI * EARTH_RADIUS) / extent * world,
            (PI * EARTH_RADIUS - coordinate.y) / extent * world,
        )
    }

    /// Unprojects world pixel coordinates back to EPSG:3857 metres
    pub fn unproject_coordinate(&self, pixel: &Point, zoom: Option<f64>) -> Point {
        let world = Self::world_size(zoom.unwrap_or(self.zoom));
        let extent = 2.0 * PI * EARTH_RADIUS;
        Point::new(
            pixel.x / world * extent - PI * EARTH_RADIUS,
            PI * EARTH_RADIUS - pixel.y / world * extent,
        )
    }

    /// Unprojects world pixel coordinates back to LatLng
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        LatLng::from_mercator(self.unproject_coordinate(pixel, zoom))
    }

    /// The view center in EPSG:3857 metres
    pub fn projected_center(&self) -> Point {
        self.center.to_mercator()
    }

    /// Geographic coordinate to container pixel
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        self.coordinate_to_pixel(&lat_lng.to_mercator())
    }

    /// Container pixel to geographic coordinate
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        LatLng::from_mercator(self.pixel_to_coordinate(pixel))
    }

    /// EPSG:3857 metres to container pixel
    pub fn coordinate_to_pixel(&self, coordinate: &Point) -> Point {
        let world = self.project_coordinate(coordinate, None);
        let origin = self.project_coordinate(&self.projected_center(), None);
        world.subtract(&origin).add(&self.half_size())
    }

    /// Container pixel to EPSG:3857 metres
    pub fn pixel_to_coordinate(&self, pixel: &Point) -> Point {
        let origin = self.project_coordinate(&self.projected_center(), None);
        let world = pixel.subtract(&self.half_size()).add(&origin);
        self.unproject_coordinate(&world, None)
    }

    fn half_size(&self) -> Point {
        Point::new(self.size.x / 2.0, self.size.y / 2.0)
    }

    /// Moves the map content by `delta` pixels and returns the new center
    pub fn pan(&mut self, delta: Point) -> LatLng {
        let new_center_pixel = self.half_size().subtract(&delta);
        let new_center = self.pixel_to_lat_lng(&new_center_pixel);
        self.set_center(new_center);
        self.center
    }

    /// Zooms to `zoom`, keeping `focus_point` fixed on screen when given
    pub fn zoom_to(&mut self, zoom: f64, focus_point: Option<Point>) {
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < 0.001 {
            return;
        }

        match focus_point {
            Some(focus) => {
                let focus_lat_lng = self.pixel_to_lat_lng(&focus);
                self.zoom = new_zoom;
                let moved_to = self.lat_lng_to_pixel(&focus_lat_lng);
                self.pan(focus.subtract(&moved_to));
            }
            None => self.zoom = new_zoom,
        }
    }

    /// Geographic bounds of the container
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&self.size);
        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    /// Metres per pixel at the equator for the current zoom
    pub fn resolution(&self) -> f64 {
        2.0 * PI * EARTH_RADIUS / Self::world_size(self.zoom)
    }

    fn clamp_center(center: LatLng) -> LatLng {
        LatLng::new(
            center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            center.lng.clamp(-180.0, 180.0),
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(LatLng::new(0.0, 0.0), 2.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(LatLng::new(40.7128, -74.0060), 10.0, Point::new(800.0, 600.0));
        assert_eq!(viewport.zoom, 10.0);
        assert_eq!(viewport.center.lat, 40.7128);
        assert_eq!(viewport.size.x, 800.0);
    }

    #[test]
    fn test_center_maps_to_container_middle() {
        let viewport = viewport();
        let pixel = viewport.lat_lng_to_pixel(&LatLng::new(0.0, 0.0));
        assert!((pixel.x - 400.0).abs() < 1e-9);
        assert!((pixel.y - 300.0).abs() < 1e-9);

        let center = viewport.pixel_to_lat_lng(&Point::new(400.0, 300.0));
        assert!(center.lat.abs() < 1e-9);
        assert!(center.lng.abs() < 1e-9);
    }

    #[test]
    fn test_marker_screen_position() {
        let viewport = viewport();
        let pixel = viewport.lat_lng_to_pixel(&LatLng::new(41.9, 2.8));
        assert!((pixel.x - 407.964).abs() < 0.01);
        assert!((pixel.y - 168.509).abs() < 0.01);
    }

    #[test]
    fn test_coordinate_round_trip() {
        let viewport = viewport();
        let coordinate = Point::new(311_694.574, 5_146_011.679);
        let pixel = viewport.coordinate_to_pixel(&coordinate);
        let back = viewport.pixel_to_coordinate(&pixel);
        assert!((back.x - coordinate.x).abs() < 1e-3);
        assert!((back.y - coordinate.y).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(2.0, 15.0);

        viewport.set_zoom(1.0);
        assert_eq!(viewport.zoom, 2.0);

        viewport.set_zoom(20.0);
        assert_eq!(viewport.zoom, 15.0);
    }

    #[test]
    fn test_pan_moves_content() {
        let mut viewport = viewport();
        let before = viewport.lat_lng_to_pixel(&LatLng::new(41.9, 2.8));
        viewport.pan(Point::new(10.0, -20.0));
        let after = viewport.lat_lng_to_pixel(&LatLng::new(41.9, 2.8));
        assert!((after.x - before.x - 10.0).abs() < 1e-6);
        assert!((after.y - before.y + 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_around_focus_point() {
        let mut viewport = viewport();
        let focus = Point::new(600.0, 200.0);
        let focus_lat_lng = viewport.pixel_to_lat_lng(&focus);

        viewport.zoom_to(3.0, Some(focus));
        assert_eq!(viewport.zoom, 3.0);

        let pixel = viewport.lat_lng_to_pixel(&focus_lat_lng);
        assert!((pixel.x - focus.x).abs() < 1e-6);
        assert!((pixel.y - focus.y).abs() < 1e-6);
    }

    #[test]
    fn test_resolution() {
        let viewport = Viewport::default();
        assert!((viewport.resolution() - 156_543.033_928).abs() < 1e-3);
    }

    #[test]
    fn test_bounds_contain_center() {
        let viewport = viewport();
        assert!(viewport.bounds().contains(&viewport.center));
    }
}
