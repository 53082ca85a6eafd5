use super::notifier::ModalNotifier;
use crate::{
    core::geo::{Point, TileCoord},
    input::events::InputEvent,
    prelude::{HashMap, HashSet},
    rendering::context::{DrawCommand, PointRenderStyle, RenderContext, TextAnchor},
    view::MapView,
};
use egui::{
    Align2, Color32, ColorImage, CursorIcon, FontId, Painter, Pos2, Rect, Response, Sense, Stroke, TextureHandle, Ui,
};
use std::time::Duration;

/// Delay between repaints while tiles are still loading
const TILE_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapCursor {
    Default,
    Grab,
    Grabbing,
}

impl From<MapCursor> for CursorIcon {
    fn from(cursor: MapCursor) -> Self {
        match cursor {
            MapCursor::Default => CursorIcon::Default,
            MapCursor::Grab => CursorIcon::Grab,
            MapCursor::Grabbing => CursorIcon::Grabbing,
        }
    }
}

/// Paints a [`MapView`] into an egui `Ui` and feeds pointer input back to it
///
/// Decoded tiles are kept as textures between frames. While the attached
/// [`ModalNotifier`] has an alert open the map is dimmed and ignores input.
pub struct MapWidget {
    textures: HashMap<TileCoord, TextureHandle>,
    /// Tiles whose bytes could not be decoded; never retried
    undecodable: HashSet<TileCoord>,
    modal: Option<ModalNotifier>,
    background: Color32,
}

impl MapWidget {
    pub fn new() -> Self {
        Self {
            textures: HashMap::default(),
            undecodable: HashSet::default(),
            modal: None,
            background: Color32::from_rgb(221, 221, 221),
        }
    }

    /// Draws `modal` over the map and blocks input while it is open
    pub fn with_modal(mut self, modal: ModalNotifier) -> Self {
        self.modal = Some(modal);
        self
    }

    pub fn cached_textures(&self) -> usize {
        self.textures.len()
    }

    /// Lays out the map over all available space
    pub fn show(&mut self, ui: &mut Ui, view: &mut MapView) -> Response {
        let desired_size = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(desired_size, Sense::click_and_drag());

        let size = Point::new(rect.width() as f64, rect.height() as f64);
        if view.map().viewport().size != size {
            view.resize(size);
        }

        let blocked = self.modal.as_ref().map_or(false, ModalNotifier::is_open);
        if !blocked {
            for event in Self::collect_input(ui, &response, rect) {
                if let Err(e) = view.handle_input(event) {
                    log::warn!("map input failed: {}", e);
                }
            }
            let cursor = if response.dragged() {
                MapCursor::Grabbing
            } else if response.hovered() {
                MapCursor::Grab
            } else {
                MapCursor::Default
            };
            if cursor != MapCursor::Default {
                ui.ctx().set_cursor_icon(cursor.into());
            }
        }

        match view.update() {
            Ok(true) => ui.ctx().request_repaint(),
            Ok(false) => {}
            Err(e) => log::warn!("map update failed: {}", e),
        }
        if view.pending_tiles() > 0 {
            ui.ctx().request_repaint_after(TILE_POLL_INTERVAL);
        }

        let mut render_ctx = RenderContext::new(size.x as u32, size.y as u32);
        if let Err(e) = view.render(&mut render_ctx) {
            log::warn!("map render failed: {}", e);
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, self.background);
        self.paint(ui, &painter, rect, render_ctx.get_drawing_queue());

        if let Some(modal) = &self.modal {
            if modal.is_open() {
                painter.rect_filled(rect, 0.0, Color32::from_black_alpha(96));
            }
            modal.show(ui.ctx());
        }

        response
    }

    /// Translates this frame's pointer activity into map input events
    fn collect_input(ui: &Ui, response: &Response, rect: Rect) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let local = |pos: Pos2| to_map_point(rect, pos);

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                events.push(InputEvent::DragStart { position: local(pos) });
            }
        }
        if response.dragged() {
            let delta = response.drag_delta();
            if delta != egui::Vec2::ZERO {
                events.push(InputEvent::Drag {
                    delta: Point::new(delta.x as f64, delta.y as f64),
                });
            }
        }
        if response.drag_released() {
            events.push(InputEvent::DragEnd);
        }

        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                events.push(InputEvent::DoubleClick { position: local(pos) });
            }
        } else if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                events.push(InputEvent::click(local(pos)));
            }
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1 {
                if let Some(pos) = response.hover_pos() {
                    events.push(InputEvent::Scroll {
                        delta: scroll.signum() as f64,
                        position: local(pos),
                    });
                }
            }
        }

        events
    }

    fn paint(&mut self, ui: &Ui, painter: &Painter, rect: Rect, commands: &[DrawCommand]) {
        let mut drawn = HashSet::default();

        for cmd in commands {
            match cmd {
                DrawCommand::Tile {
                    coord,
                    data,
                    bounds,
                    opacity,
                } => {
                    drawn.insert(*coord);
                    if let Some(texture) = self.tile_texture(ui, *coord, data) {
                        painter.image(
                            texture.id(),
                            screen_rect(rect, bounds),
                            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                            Color32::WHITE.gamma_multiply(*opacity),
                        );
                    }
                }
                DrawCommand::Point { position, style } => {
                    paint_point(painter, to_screen(rect, position), style);
                }
                DrawCommand::Text { position, text, anchor } => {
                    let align = match anchor {
                        TextAnchor::TopLeft => Align2::LEFT_TOP,
                        TextAnchor::BottomRight => Align2::RIGHT_BOTTOM,
                    };
                    let pos = to_screen(rect, position) + attribution_margin(*anchor);
                    painter.text(pos, align, text, FontId::proportional(11.0), Color32::from_gray(40));
                }
            }
        }

        // Tiles scrolled out of view are decoded again if they come back
        self.textures.retain(|coord, _| drawn.contains(coord));
    }

    fn tile_texture(&mut self, ui: &Ui, coord: TileCoord, data: &[u8]) -> Option<&TextureHandle> {
        if self.undecodable.contains(&coord) {
            return None;
        }
        if !self.textures.contains_key(&coord) {
            match decode_tile(data) {
                Some(image) => {
                    let name = format!("tile_{}_{}_{}", coord.z, coord.x, coord.y);
                    let texture = ui.ctx().load_texture(name, image, egui::TextureOptions::default());
                    self.textures.insert(coord, texture);
                }
                None => {
                    log::warn!("could not decode tile {:?}", coord);
                    self.undecodable.insert(coord);
                    return None;
                }
            }
        }
        self.textures.get(&coord)
    }
}

impl Default for MapWidget {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_tile(bytes: &[u8]) -> Option<ColorImage> {
    let img = image::load_from_memory(bytes).ok()?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Some(ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        rgba.as_raw(),
    ))
}

fn paint_point(painter: &Painter, center: Pos2, style: &PointRenderStyle) {
    let fill: Color32 = style.fill_color.with_opacity(style.opacity).into();
    let stroke: Color32 = style.stroke_color.with_opacity(style.opacity).into();
    painter.circle(center, style.radius, fill, Stroke::new(style.stroke_width, stroke));
}

fn attribution_margin(anchor: TextAnchor) -> egui::Vec2 {
    match anchor {
        TextAnchor::TopLeft => egui::Vec2::new(4.0, 4.0),
        TextAnchor::BottomRight => egui::Vec2::new(-4.0, -4.0),
    }
}

/// Container pixel to screen position
fn to_screen(rect: Rect, point: &Point) -> Pos2 {
    Pos2::new(rect.min.x + point.x as f32, rect.min.y + point.y as f32)
}

/// Screen position to container pixel
fn to_map_point(rect: Rect, pos: Pos2) -> Point {
    Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64)
}

fn screen_rect(rect: Rect, bounds: &(Point, Point)) -> Rect {
    Rect::from_two_pos(to_screen(rect, &bounds.0), to_screen(rect, &bounds.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect::from_min_size(Pos2::new(10.0, 20.0), egui::Vec2::new(800.0, 600.0))
    }

    #[test]
    fn test_screen_and_map_points_are_inverse() {
        let point = Point::new(408.0, 168.5);
        let screen = to_screen(rect(), &point);
        assert_eq!(screen, Pos2::new(418.0, 188.5));
        assert_eq!(to_map_point(rect(), screen), point);
    }

    #[test]
    fn test_tile_bounds_to_screen_rect() {
        let bounds = (Point::new(0.0, 0.0), Point::new(256.0, 256.0));
        let tile = screen_rect(rect(), &bounds);
        assert_eq!(tile.min, Pos2::new(10.0, 20.0));
        assert_eq!(tile.width(), 256.0);
    }

    #[test]
    fn test_decode_tile_rejects_garbage() {
        assert!(decode_tile(&[0u8; 10]).is_none());
        assert!(decode_tile(&[]).is_none());
    }

    #[test]
    fn test_decode_tile_png() {
        let mut bytes = Vec::new();
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();

        let decoded = decode_tile(&bytes).unwrap();
        assert_eq!(decoded.size, [2, 2]);
        assert_eq!(decoded.pixels[0], Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn test_map_cursor_conversion() {
        assert_eq!(CursorIcon::from(MapCursor::Default), CursorIcon::Default);
        assert_eq!(CursorIcon::from(MapCursor::Grab), CursorIcon::Grab);
        assert_eq!(CursorIcon::from(MapCursor::Grabbing), CursorIcon::Grabbing);
    }
}
