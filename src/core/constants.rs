//! Engine-wide constants from Web Mercator and common web-map conventions.

/// Square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// WGS84 semi-major axis used by EPSG:3857, in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude at which Web Mercator becomes a square world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Zoom range supported by the standard OpenStreetMap tile server.
pub const DEFAULT_MIN_ZOOM: f64 = 0.0;
pub const DEFAULT_MAX_ZOOM: f64 = 19.0;

/// Programmatic +/- zoom step for scroll and double click.
pub const DEFAULT_ZOOM_DELTA: f64 = 1.0;

/// Standard OpenStreetMap tile URL template.
pub const OSM_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Attribution required by the OpenStreetMap tile usage policy.
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Id of the host container the map renders into.
pub const DEFAULT_TARGET: &str = "map";

/// Message shown when the marker is clicked.
pub const MARKER_CLICK_MESSAGE: &str = "click over marker";
