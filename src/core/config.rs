//! Configuration for map behaviour and tile loading
//!
//! Configuration is plain data: every struct has a sensible `Default`, can be
//! serialized with serde, and can be produced from a [`MapProfile`] preset.

use crate::{
    core::constants::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_ZOOM_DELTA},
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// Preset configurations
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MapProfile {
    /// Interactive map fetching tiles from the network
    #[default]
    Online,
    /// No network traffic; tiles are only drawn if already cached
    Offline,
    Custom(MapConfig),
}

impl MapProfile {
    pub fn resolve(&self) -> MapConfig {
        match self {
            Self::Online => MapConfig::default(),
            Self::Offline => MapConfig {
                tile_loader: TileLoadingConfig {
                    fetch_enabled: false,
                    ..TileLoadingConfig::default()
                },
                ..MapConfig::default()
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapConfig {
    pub options: MapOptions,
    pub tile_loader: TileLoadingConfig,
}

impl MapConfig {
    /// Rejects configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        self.options.validate()?;
        self.tile_loader.validate()
    }
}

/// Interaction and view limits of a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapOptions {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_delta: f64,
    pub dragging: bool,
    pub scroll_wheel_zoom: bool,
    pub double_click_zoom: bool,
    /// Extra pixels around a feature that still count as a hit
    pub hit_tolerance: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_delta: DEFAULT_ZOOM_DELTA,
            dragging: true,
            scroll_wheel_zoom: true,
            double_click_zoom: true,
            hit_tolerance: 0.0,
        }
    }
}

impl MapOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_zoom.is_finite() && self.max_zoom.is_finite()) {
            return Err(MapError::Config("zoom limits must be finite".to_string()));
        }
        if self.min_zoom < 0.0 || self.min_zoom > self.max_zoom {
            return Err(MapError::Config(format!(
                "invalid zoom range {}..{}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.hit_tolerance < 0.0 {
            return Err(MapError::Config("hit tolerance cannot be negative".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLoadingConfig {
    pub cache_size: usize,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub user_agent: String,
    /// When false tiles are never requested
    pub fetch_enabled: bool,
}

impl Default for TileLoadingConfig {
    fn default() -> Self {
        Self {
            cache_size: 512,
            max_retries: 2,
            retry_delay_ms: 100,
            user_agent: concat!("mapa/", env!("CARGO_PKG_VERSION")).to_string(),
            fetch_enabled: true,
        }
    }
}

impl TileLoadingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cache_size == 0 {
            return Err(MapError::Config("tile cache size must be positive".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            // Public tile servers reject anonymous clients
            return Err(MapError::Config("user agent must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MapConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.tile_loader.fetch_enabled);
        assert_eq!(config.options.max_zoom, 19.0);
    }

    #[test]
    fn test_offline_profile_disables_fetching() {
        let config = MapProfile::Offline.resolve();
        assert!(!config.tile_loader.fetch_enabled);
        assert_eq!(config.options, MapOptions::default());
    }

    #[test]
    fn test_custom_profile() {
        let mut custom = MapConfig::default();
        custom.options.hit_tolerance = 4.0;
        let resolved = MapProfile::Custom(custom.clone()).resolve();
        assert_eq!(resolved, custom);
    }

    #[test]
    fn test_invalid_zoom_range() {
        let options = MapOptions {
            min_zoom: 10.0,
            max_zoom: 2.0,
            ..MapOptions::default()
        };
        assert!(matches!(options.validate(), Err(MapError::Config(_))));
    }

    #[test]
    fn test_invalid_tile_loading() {
        let config = TileLoadingConfig {
            cache_size: 0,
            ..TileLoadingConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TileLoadingConfig {
            user_agent: "  ".to_string(),
            ..TileLoadingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serializes() {
        let config = MapConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: MapConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
