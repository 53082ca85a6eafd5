use crate::{
    core::{
        geo::{LatLng, LatLngBounds, Point},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    rendering::context::{RenderContext, StyleConversion},
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// RGBA colour that converts to the UI backend's colour type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Copy of this colour with its alpha scaled by `opacity`
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}

impl FromStr for Color {
    type Err = MapError;

    /// Parses a CSS colour keyword or a `#rrggbb` / `#rrggbbaa` hex string
    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_ascii_lowercase();
        let named = match value.as_str() {
            "red" => Some(Color::RED),
            "yellow" => Some(Color::YELLOW),
            "white" => Some(Color::WHITE),
            "blue" => Some(Color::BLUE),
            "black" => Some(Color::rgb(0, 0, 0)),
            "green" => Some(Color::rgb(0, 128, 0)),
            "orange" => Some(Color::rgb(255, 165, 0)),
            "transparent" => Some(Color::new(0, 0, 0, 0)),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let hex = value
            .strip_prefix('#')
            .ok_or_else(|| MapError::Render(format!("unknown colour '{}'", s)))?;
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .ok_or_else(|| MapError::Render(format!("invalid hex colour '{}'", s)))
        };
        match hex.len() {
            6 => Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Color::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(MapError::Render(format!("invalid hex colour '{}'", s))),
        }
    }
}

#[cfg(feature = "egui")]
impl From<Color> for egui::Color32 {
    fn from(color: Color) -> Self {
        egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
    }
}

/// Style for point features: a filled circle with an outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    pub fill_color: Color,
    pub stroke_color: Color,
    pub stroke_width: f32,
    /// Circle radius in pixels
    pub radius: f32,
    /// Opacity (0.0 to 1.0)
    pub opacity: f32,
}

impl PointStyle {
    pub fn new(fill_color: Color, stroke_color: Color, radius: f32) -> Self {
        Self {
            fill_color,
            stroke_color,
            radius,
            ..Self::default()
        }
    }

    /// Pixel distance from the center that still hits the drawn circle
    pub fn hit_radius(&self) -> f64 {
        (self.radius + self.stroke_width / 2.0) as f64
    }
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            fill_color: Color::rgb(255, 255, 255).with_opacity(0.4),
            stroke_color: Color::rgb(51, 153, 204),
            stroke_width: 1.25,
            radius: 5.0,
            opacity: 1.0,
        }
    }
}

/// Identifier of a feature, unique within its layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(pub u64);

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "feature-{}", self.0)
    }
}

/// A point feature; its projected coordinate is fixed at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    id: FeatureId,
    position: LatLng,
    /// EPSG:3857 metres
    coordinate: Point,
}

impl Feature {
    /// Builds a feature at `(lon, lat)` degrees
    pub fn from_lon_lat(id: u64, lon: f64, lat: f64) -> Result<Self> {
        let position = LatLng::from_lon_lat(lon, lat);
        if !position.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "lon {} / lat {} is outside the valid range",
                lon, lat
            )));
        }
        Ok(Self {
            id: FeatureId(id),
            position,
            coordinate: position.to_mercator(),
        })
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    /// Projected coordinate in EPSG:3857 metres
    pub fn coordinate(&self) -> Point {
        self.coordinate
    }
}

/// A layer of point features sharing one style
///
/// The feature set is fixed when the layer is built.
pub struct VectorLayer {
    properties: LayerProperties,
    features: Vec<Feature>,
    style: PointStyle,
}

impl VectorLayer {
    pub fn new(id: String, features: Vec<Feature>, style: PointStyle) -> Self {
        let properties = LayerProperties::new(id, "Vector Layer".to_string(), LayerType::Vector);
        Self {
            properties,
            features,
            style,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.properties.name = name.into();
        self
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.iter().find(|feature| feature.id == id)
    }

    pub fn style(&self) -> &PointStyle {
        &self.style
    }

    /// Features drawn under `pixel`, topmost first
    pub fn features_at_pixel(&self, viewport: &Viewport, pixel: &Point, tolerance: f64) -> Vec<&Feature> {
        if !self.is_visible() {
            return Vec::new();
        }
        let reach = self.style.hit_radius() + tolerance;
        self.features
            .iter()
            .rev()
            .filter(|feature| {
                let screen = viewport.coordinate_to_pixel(&feature.coordinate);
                screen.distance_to(pixel) <= reach
            })
            .collect()
    }
}

impl LayerTrait for VectorLayer {
    crate::impl_layer_trait!(VectorLayer, properties);

    fn render(&mut self, context: &mut RenderContext, viewport: &Viewport) -> Result<()> {
        let style = self.style.to_render_style(self.properties.opacity);
        let margin = self.style.hit_radius();

        for feature in &self.features {
            let position = viewport.coordinate_to_pixel(&feature.coordinate);
            let off_screen = position.x < -margin
                || position.y < -margin
                || position.x > viewport.size.x + margin
                || position.y > viewport.size.y + margin;
            if !off_screen {
                context.render_point(&position, &style);
            }
        }
        Ok(())
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        let first = self.features.first()?.position;
        let mut bounds = LatLngBounds::new(first, first);
        for feature in &self.features[1..] {
            bounds.extend(&feature.position);
        }
        Some(bounds)
    }

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.properties.id,
            "type": self.properties.layer_type.to_string(),
            "feature_count": self.features.len(),
            "style": self.style,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker_layer() -> VectorLayer {
        VectorLayer::new(
            "marker".to_string(),
            vec![Feature::from_lon_lat(1, 2.8, 41.9).unwrap()],
            PointStyle::new(Color::RED, Color::YELLOW, 10.0),
        )
    }

    fn viewport() -> Viewport {
        Viewport::new(LatLng::new(0.0, 0.0), 2.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!("red".parse::<Color>().unwrap(), Color::RED);
        assert_eq!(" Yellow ".parse::<Color>().unwrap(), Color::YELLOW);
        assert_eq!("#3399cc".parse::<Color>().unwrap(), Color::rgb(0x33, 0x99, 0xcc));
        assert_eq!("#00000080".parse::<Color>().unwrap(), Color::new(0, 0, 0, 0x80));
        assert!("#12".parse::<Color>().is_err());
        assert!("mauve-ish".parse::<Color>().is_err());
    }

    #[test]
    fn test_feature_projection() {
        let feature = Feature::from_lon_lat(7, 2.8, 41.9).unwrap();
        assert_eq!(feature.id(), FeatureId(7));
        assert!((feature.coordinate().x - 311_694.574).abs() < 0.01);
        assert!((feature.coordinate().y - 5_146_011.679).abs() < 0.01);
    }

    #[test]
    fn test_invalid_feature_coordinates() {
        assert!(matches!(
            Feature::from_lon_lat(1, 200.0, 0.0),
            Err(MapError::InvalidCoordinates(_))
        ));
        assert!(Feature::from_lon_lat(1, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_hit_testing() {
        let layer = marker_layer();
        let viewport = viewport();

        let on_marker = Point::new(408.0, 168.5);
        assert_eq!(layer.features_at_pixel(&viewport, &on_marker, 0.0).len(), 1);

        // radius 10 + half of the 1.25 stroke
        let edge = Point::new(407.964 + 10.5, 168.509);
        assert_eq!(layer.features_at_pixel(&viewport, &edge, 0.0).len(), 1);

        let miss = Point::new(100.0, 500.0);
        assert!(layer.features_at_pixel(&viewport, &miss, 0.0).is_empty());
        assert!(layer.features_at_pixel(&viewport, &Point::new(430.0, 168.5), 0.0).is_empty());
        assert_eq!(layer.features_at_pixel(&viewport, &Point::new(430.0, 168.5), 15.0).len(), 1);
    }

    #[test]
    fn test_hit_testing_topmost_first() {
        let layer = VectorLayer::new(
            "pair".to_string(),
            vec![
                Feature::from_lon_lat(1, 0.0, 0.0).unwrap(),
                Feature::from_lon_lat(2, 0.0, 0.0).unwrap(),
            ],
            PointStyle::default(),
        );
        let hits = layer.features_at_pixel(&viewport(), &Point::new(400.0, 300.0), 0.0);
        let ids: Vec<_> = hits.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec![FeatureId(2), FeatureId(1)]);
    }

    #[test]
    fn test_hidden_layer_is_not_hit() {
        let mut layer = marker_layer();
        layer.set_visible(false);
        assert!(layer
            .features_at_pixel(&viewport(), &Point::new(408.0, 168.5), 0.0)
            .is_empty());
    }

    #[test]
    fn test_render_points() {
        let mut layer = marker_layer();
        let mut ctx = RenderContext::new(800, 600);
        layer.render(&mut ctx, &viewport()).unwrap();
        assert_eq!(ctx.point_count(), 1);

        // Marker scrolled out of view
        let far = Viewport::new(LatLng::new(-40.0, -120.0), 6.0, Point::new(800.0, 600.0));
        ctx.begin_frame();
        layer.render(&mut ctx, &far).unwrap();
        assert_eq!(ctx.point_count(), 0);
    }

    #[test]
    fn test_layer_bounds_and_options() {
        let layer = marker_layer();
        let bounds = layer.bounds().unwrap();
        assert!(bounds.contains(&LatLng::new(41.9, 2.8)));

        let options = layer.options();
        assert_eq!(options["feature_count"], 1);
        assert_eq!(options["type"], "vector");
    }
}
