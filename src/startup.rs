//! Startup sequence of the marker map
//!
//! Any failure here is fatal: the caller is expected to abort with the
//! returned error.

use crate::{
    core::{
        config::MapProfile,
        constants::DEFAULT_TARGET,
        geo::LatLng,
        host::Host,
    },
    view::MapView,
};
use anyhow::Context;

/// Initial view
pub const START_CENTER: LatLng = LatLng { lat: 0.0, lng: 0.0 };
pub const START_ZOOM: f64 = 2.0;

/// Marker position as (lon, lat) degrees
pub const MARKER_LON_LAT: (f64, f64) = (2.8, 41.9);

/// Builds the marker map in the host's `"map"` container
pub fn build_marker_map(host: &dyn Host, profile: MapProfile) -> anyhow::Result<MapView> {
    let mut view = MapView::with_profile(host, DEFAULT_TARGET, START_CENTER, START_ZOOM, profile)
        .with_context(|| format!("failed to bind map to container '{}'", DEFAULT_TARGET))?;

    view.add_base_layer().context("failed to add base layer")?;

    let (lon, lat) = MARKER_LON_LAT;
    let marker = view
        .add_marker(lon, lat, MapView::default_marker_style())
        .context("failed to add marker")?;

    view.enable_click_selection(&marker, MapView::default_marker_style())
        .context("failed to enable click selection")?;

    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{geo::Point, host::HeadlessHost};

    #[test]
    fn test_startup_builds_layers_and_interaction() {
        let host = HeadlessHost::new().with_container("map", Point::new(800.0, 600.0));
        let view = build_marker_map(&host, MapProfile::Offline).unwrap();
        assert_eq!(view.map().list_layers().len(), 2);
        assert_eq!(view.map().interaction_count(), 1);
    }

    #[test]
    fn test_startup_fails_without_container() {
        let host = HeadlessHost::new();
        let Err(err) = build_marker_map(&host, MapProfile::Offline) else {
            panic!("startup succeeded without a container");
        };
        assert!(err.to_string().contains("container 'map'"));
        assert!(err.chain().any(|cause| cause.to_string().contains("map")));
    }
}
