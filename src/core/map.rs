use crate::{
    core::{
        config::{MapConfig, MapOptions},
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    input::{
        events::{EventHandled, InputEvent, MapEvent},
        handler::EventManager,
    },
    interaction::{Interaction, InteractionContext, InteractionHandle},
    layers::{base::LayerTrait, manager::LayerManager},
    rendering::context::RenderContext,
    MapError, Result,
};

/// A map bound to a target container
///
/// The map owns its viewport, layers and interactions. Input events are
/// offered to every interaction in registration order; only what none of
/// them consumes falls through to the default pan and zoom handling.
pub struct Map {
    target: String,
    pub viewport: Viewport,
    layer_manager: LayerManager,
    interactions: Vec<(InteractionHandle, Box<dyn Interaction>)>,
    next_interaction_id: u64,
    event_manager: EventManager,
    options: MapOptions,
    dragging: bool,
}

impl Map {
    pub fn new(target: impl Into<String>, center: LatLng, zoom: f64, size: Point) -> Self {
        let viewport = Viewport::new(center, zoom, size);
        Self::with_options(target, viewport, MapOptions::default())
    }

    pub fn with_options(target: impl Into<String>, viewport: Viewport, options: MapOptions) -> Self {
        let mut map = Self {
            target: target.into(),
            viewport,
            layer_manager: LayerManager::new(),
            interactions: Vec::new(),
            next_interaction_id: 1,
            event_manager: EventManager::new(),
            options,
            dragging: false,
        };
        map.viewport
            .set_zoom_limits(map.options.min_zoom, map.options.max_zoom);
        map
    }

    /// Validates `config` and builds a map from it
    pub fn with_config(
        target: impl Into<String>,
        center: LatLng,
        zoom: f64,
        size: Point,
        config: &MapConfig,
    ) -> Result<Self> {
        config.validate()?;
        if !center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "map center {:?} is outside the valid range",
                center
            )));
        }
        let viewport = Viewport::new(center, zoom, size);
        Ok(Self::with_options(target, viewport, config.options.clone()))
    }

    /// Id of the container this map renders into
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        if !center.is_valid() || !zoom.is_finite() {
            return Err(MapError::InvalidCoordinates(format!(
                "cannot view {:?} at zoom {}",
                center, zoom
            )));
        }
        let old_center = self.viewport.center;
        let old_zoom = self.viewport.zoom;

        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);

        if self.viewport.center != old_center || self.viewport.zoom != old_zoom {
            self.event_manager.emit(MapEvent::ViewChanged {
                center: self.viewport.center,
                zoom: self.viewport.zoom,
            });
        }
        Ok(())
    }

    pub fn zoom_to(&mut self, zoom: f64, focus_point: Option<Point>) {
        let old_zoom = self.viewport.zoom;
        self.viewport.zoom_to(zoom, focus_point);

        if self.viewport.zoom != old_zoom {
            self.event_manager.emit(MapEvent::ZoomEnd {
                zoom: self.viewport.zoom,
            });
        }
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        self.layer_manager.add_layer(layer)?;
        log::debug!("layer '{}' added to map '{}'", layer_id, self.target);
        self.event_manager.emit(MapEvent::LayerAdd { layer_id });
        Ok(())
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        let removed = self.layer_manager.remove_layer(layer_id);
        if removed.is_some() {
            self.event_manager.emit(MapEvent::LayerRemove {
                layer_id: layer_id.to_string(),
            });
        }
        removed
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layer_manager.get_layer(layer_id)
    }

    pub fn with_layer_mut<F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layer_manager.with_layer_mut(layer_id, f)
    }

    pub fn list_layers(&self) -> Vec<String> {
        self.layer_manager.list_layers()
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layer_manager
    }

    /// Attaches an interaction and returns its handle
    pub fn add_interaction(&mut self, mut interaction: Box<dyn Interaction>) -> InteractionHandle {
        let handle = InteractionHandle(self.next_interaction_id);
        self.next_interaction_id += 1;
        interaction.on_add(handle);
        log::debug!("interaction '{}' added as {:?}", interaction.name(), handle);
        self.interactions.push((handle, interaction));
        handle
    }

    pub fn remove_interaction(&mut self, handle: InteractionHandle) -> Option<Box<dyn Interaction>> {
        let index = self.interactions.iter().position(|(h, _)| *h == handle)?;
        Some(self.interactions.remove(index).1)
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    pub fn with_interaction_mut<F, R>(&mut self, handle: InteractionHandle, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn Interaction) -> R,
    {
        self.interactions
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .map(|(_, interaction)| f(interaction.as_mut()))
    }

    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.event_manager.on(event_type, callback);
    }

    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.event_manager.process_events()
    }

    /// Dispatches one input event
    pub fn handle_input(&mut self, input: InputEvent) -> Result<EventHandled> {
        if let InputEvent::Resize { size } = input {
            self.viewport.set_size(size);
            return Ok(EventHandled::Handled);
        }

        let ctx = InteractionContext {
            viewport: &self.viewport,
            layers: &self.layer_manager,
            hit_tolerance: self.options.hit_tolerance,
        };
        let mut consumed = false;
        for (_, interaction) in self.interactions.iter_mut() {
            let response = interaction.handle_event(&input, &ctx)?;
            for event in response.events {
                self.event_manager.emit(event);
            }
            consumed |= response.handled == EventHandled::Handled;
        }
        if consumed {
            return Ok(EventHandled::Handled);
        }

        Ok(self.handle_default(input))
    }

    fn handle_default(&mut self, input: InputEvent) -> EventHandled {
        match input {
            InputEvent::Click { position, .. } => {
                self.event_manager.emit(MapEvent::Click {
                    lat_lng: self.viewport.pixel_to_lat_lng(&position),
                    pixel: position,
                });
                EventHandled::Handled
            }
            InputEvent::DragStart { .. } if self.options.dragging => {
                self.dragging = true;
                EventHandled::Handled
            }
            InputEvent::Drag { delta } if self.dragging => {
                self.viewport.pan(delta);
                EventHandled::Handled
            }
            InputEvent::DragEnd if self.dragging => {
                self.dragging = false;
                self.event_manager.emit(MapEvent::MoveEnd {
                    center: self.viewport.center,
                });
                EventHandled::Handled
            }
            InputEvent::Scroll { delta, position } if self.options.scroll_wheel_zoom && delta != 0.0 => {
                let step = self.options.zoom_delta * delta.signum();
                self.zoom_to(self.viewport.zoom + step, Some(position));
                EventHandled::Handled
            }
            InputEvent::DoubleClick { position } if self.options.double_click_zoom => {
                self.zoom_to(self.viewport.zoom + self.options.zoom_delta, Some(position));
                EventHandled::Handled
            }
            _ => EventHandled::NotHandled,
        }
    }

    /// Lets layers refresh for the current view; true when a repaint is due
    pub fn update(&mut self) -> Result<bool> {
        let viewport = &self.viewport;
        let mut changed = false;
        let mut result = Ok(());
        self.layer_manager.for_each_layer_mut(|layer| {
            if result.is_err() || !layer.is_visible() {
                return;
            }
            match layer.update(viewport) {
                Ok(updated) => changed |= updated,
                Err(e) => result = Err(e),
            }
        });
        result.map(|_| changed)
    }

    /// Renders layers, then interaction overlays, into `context`
    pub fn render(&mut self, context: &mut RenderContext) -> Result<()> {
        context.begin_frame();
        context.set_clip_bounds(Point::new(0.0, 0.0), self.viewport.size);
        self.layer_manager.render(context, &self.viewport)?;

        let ctx = InteractionContext {
            viewport: &self.viewport,
            layers: &self.layer_manager,
            hit_tolerance: self.options.hit_tolerance,
        };
        for (_, interaction) in self.interactions.iter_mut() {
            interaction.render(context, &ctx)?;
        }
        context.clear_clip_bounds();
        Ok(())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }
}
