use crate::core::{
    constants::{OSM_ATTRIBUTION, OSM_TILE_URL},
    geo::TileCoord,
};

/// Anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;

    /// Text that must be displayed while tiles from this source are shown
    fn attribution(&self) -> Option<&str> {
        None
    }

    fn max_zoom(&self) -> u8 {
        19
    }
}

/// Source driven by an XYZ URL template with `{z}`, `{x}`, `{y}` and an
/// optional `{s}` subdomain placeholder.
#[derive(Debug, Clone)]
pub struct XyzSource {
    template: String,
    subdomains: Vec<String>,
    attribution: Option<String>,
    max_zoom: u8,
}

impl XyzSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            subdomains: Vec::new(),
            attribution: None,
            max_zoom: 19,
        }
    }

    pub fn with_subdomains(mut self, subdomains: &[&str]) -> Self {
        self.subdomains = subdomains.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = Some(attribution.into());
        self
    }

    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom;
        self
    }
}

impl TileSource for XyzSource {
    fn url(&self, coord: TileCoord) -> String {
        let mut url = self
            .template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string());

        if !self.subdomains.is_empty() {
            let idx = ((coord.x + coord.y) % self.subdomains.len() as u32) as usize;
            url = url.replace("{s}", &self.subdomains[idx]);
        }
        url
    }

    fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}

/// The standard OpenStreetMap tile server
#[derive(Debug, Clone)]
pub struct OpenStreetMapSource {
    inner: XyzSource,
}

impl OpenStreetMapSource {
    pub fn new() -> Self {
        Self {
            inner: XyzSource::new(OSM_TILE_URL)
                .with_attribution(OSM_ATTRIBUTION)
                .with_max_zoom(19),
        }
    }
}

impl Default for OpenStreetMapSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for OpenStreetMapSource {
    fn url(&self, coord: TileCoord) -> String {
        self.inner.url(coord)
    }

    fn attribution(&self) -> Option<&str> {
        self.inner.attribution()
    }

    fn max_zoom(&self) -> u8 {
        self.inner.max_zoom()
    }
}
