use crate::{
    core::geo::{Point, TileCoord},
    layers::vector::{Color, PointStyle},
    MapError, Result,
};
use std::sync::Arc;

/// Unified style conversion for layer styles
pub trait StyleConversion<T> {
    fn to_render_style(&self, opacity_multiplier: f32) -> T;
}

/// Resolved style of a point primitive
#[derive(Debug, Clone, PartialEq)]
pub struct PointRenderStyle {
    pub fill_color: Color,
    pub stroke_color: Color,
    pub stroke_width: f32,
    pub radius: f32,
    pub opacity: f32,
}

impl StyleConversion<PointRenderStyle> for PointStyle {
    fn to_render_style(&self, opacity_multiplier: f32) -> PointRenderStyle {
        PointRenderStyle {
            fill_color: self.fill_color,
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width,
            radius: self.radius,
            opacity: self.opacity * opacity_multiplier,
        }
    }
}

/// Where a text primitive is anchored relative to its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    TopLeft,
    BottomRight,
}

/// Commands issued by layers and interactions, replayed by a UI backend
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Tile {
        coord: TileCoord,
        data: Arc<Vec<u8>>,
        bounds: (Point, Point), // min, max screen coordinates
        opacity: f32,
    },
    Point {
        position: Point,
        style: PointRenderStyle,
    },
    Text {
        position: Point,
        text: String,
        anchor: TextAnchor,
    },
}

/// Collects the draw commands of one frame
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    pub drawing_queue: Vec<DrawCommand>,
    /// Clipping bounds (min, max) in screen coordinates
    pub clip_bounds: Option<(Point, Point)>,
}

impl RenderContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            drawing_queue: Vec::new(),
            clip_bounds: None,
        }
    }

    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
    }

    pub fn set_clip_bounds(&mut self, min: Point, max: Point) {
        self.clip_bounds = Some((min, max));
    }

    pub fn clear_clip_bounds(&mut self) {
        self.clip_bounds = None;
    }

    pub fn render_point(&mut self, position: &Point, style: &PointRenderStyle) {
        self.drawing_queue.push(DrawCommand::Point {
            position: *position,
            style: style.clone(),
        });
    }

    pub fn render_text(&mut self, position: &Point, text: &str, anchor: TextAnchor) {
        self.drawing_queue.push(DrawCommand::Text {
            position: *position,
            text: text.to_string(),
            anchor,
        });
    }

    /// Queues a tile; tiles entirely outside the clip bounds are dropped
    pub fn render_tile(
        &mut self,
        coord: TileCoord,
        data: Arc<Vec<u8>>,
        bounds: (Point, Point),
        opacity: f32,
    ) -> Result<()> {
        if bounds.0.x >= bounds.1.x || bounds.0.y >= bounds.1.y {
            return Err(MapError::Render(format!("invalid tile bounds for {:?}", coord)));
        }
        if !(0.0..=1.0).contains(&opacity) {
            return Err(MapError::Render("opacity must be between 0.0 and 1.0".to_string()));
        }

        if self.is_outside_clip(bounds) {
            return Ok(());
        }

        self.drawing_queue.push(DrawCommand::Tile {
            coord,
            data,
            bounds,
            opacity,
        });
        Ok(())
    }

    fn is_outside_clip(&self, bounds: (Point, Point)) -> bool {
        match self.clip_bounds {
            Some((clip_min, clip_max)) => {
                let (min, max) = bounds;
                max.x <= clip_min.x || min.x >= clip_max.x || max.y <= clip_min.y || min.y >= clip_max.y
            }
            None => false,
        }
    }

    pub fn get_drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    /// Number of queued point primitives
    pub fn point_count(&self) -> usize {
        self.drawing_queue
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Point { .. }))
            .count()
    }

    pub fn tile_count(&self) -> usize {
        self.drawing_queue
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Tile { .. }))
            .count()
    }
}
