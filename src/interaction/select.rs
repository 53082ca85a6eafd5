//! Feature selection driven by pointer input
//!
//! On every event that satisfies its [`SelectCondition`], a [`Select`]
//! hit-tests the vector layers it is scoped to and replaces its selection
//! with the topmost feature under the pointer (or with nothing on a miss).
//! Listeners only run when the selection actually changed. They receive the
//! live [`SelectionState`] and may edit it before the dispatch returns.

use super::{Interaction, InteractionContext, InteractionHandle, InteractionResponse};
use crate::{
    core::geo::{LatLng, Point},
    input::events::{EventHandled, InputEvent, MapEvent, MouseButton},
    layers::{
        base::{LayerHandle, LayerTrait},
        vector::{Color, FeatureId, PointStyle, VectorLayer},
    },
    rendering::context::{RenderContext, StyleConversion},
    Result,
};

/// Which input events trigger selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectCondition {
    /// Left click
    #[default]
    Click,
    DoubleClick,
    /// Hover
    PointerMove,
}

impl SelectCondition {
    /// Pointer position when `event` satisfies the condition
    pub fn matches(&self, event: &InputEvent) -> Option<Point> {
        match (self, event) {
            (
                SelectCondition::Click,
                InputEvent::Click {
                    position,
                    button: MouseButton::Left,
                },
            ) => Some(*position),
            (SelectCondition::DoubleClick, InputEvent::DoubleClick { position }) => Some(*position),
            (SelectCondition::PointerMove, InputEvent::MouseMove { position }) => Some(*position),
            _ => None,
        }
    }
}

/// A feature and the layer it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectedFeature {
    pub layer_id: String,
    pub feature: FeatureId,
}

/// The features a select interaction currently holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    features: Vec<SelectedFeature>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn features(&self) -> &[SelectedFeature] {
        &self.features
    }

    pub fn contains(&self, feature: &SelectedFeature) -> bool {
        self.features.contains(feature)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn clear(&mut self) {
        self.features.clear();
    }

    fn replace(&mut self, features: Vec<SelectedFeature>) {
        self.features = features;
    }
}

/// Payload delivered to select listeners
#[derive(Debug, Clone, PartialEq)]
pub struct SelectEvent {
    pub selected: Vec<SelectedFeature>,
    pub deselected: Vec<SelectedFeature>,
    /// Pointer position in container pixels
    pub pixel: Point,
    pub lat_lng: LatLng,
}

pub type SelectListener = Box<dyn Fn(&SelectEvent, &mut SelectionState) + Send + Sync>;

pub struct Select {
    handle: Option<InteractionHandle>,
    condition: SelectCondition,
    /// Layers in scope; empty means every vector layer
    layers: Vec<String>,
    style: PointStyle,
    selection: SelectionState,
    listeners: Vec<SelectListener>,
}

impl Select {
    pub fn new(condition: SelectCondition) -> Self {
        Self {
            handle: None,
            condition,
            layers: Vec::new(),
            style: Self::default_style(),
            selection: SelectionState::new(),
            listeners: Vec::new(),
        }
    }

    /// Restricts selection to `layer`; may be called for several layers
    pub fn with_layer(mut self, layer: &LayerHandle) -> Self {
        self.layers.push(layer.id().to_string());
        self
    }

    /// Style used to draw selected features
    pub fn with_style(mut self, style: PointStyle) -> Self {
        self.style = style;
        self
    }

    pub fn default_style() -> PointStyle {
        PointStyle {
            stroke_width: 1.5,
            ..PointStyle::new(Color::rgb(51, 153, 204), Color::WHITE, 7.0)
        }
    }

    /// Registers a listener for selection changes
    pub fn on_select<F>(&mut self, listener: F)
    where
        F: Fn(&SelectEvent, &mut SelectionState) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn condition(&self) -> SelectCondition {
        self.condition
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn in_scope(&self, layer_id: &str) -> bool {
        self.layers.is_empty() || self.layers.iter().any(|id| id == layer_id)
    }

    /// Topmost feature under `pixel` among the layers in scope
    fn hit_test(&self, pixel: &Point, ctx: &InteractionContext<'_>) -> Option<SelectedFeature> {
        ctx.layers
            .layers()
            .into_iter()
            .rev()
            .filter(|layer| self.in_scope(layer.id()))
            .filter_map(|layer| layer.as_any().downcast_ref::<VectorLayer>())
            .find_map(|layer| {
                layer
                    .features_at_pixel(ctx.viewport, pixel, ctx.hit_tolerance)
                    .first()
                    .map(|feature| SelectedFeature {
                        layer_id: layer.id().to_string(),
                        feature: feature.id(),
                    })
            })
    }
}

impl Interaction for Select {
    fn name(&self) -> &str {
        "select"
    }

    fn on_add(&mut self, handle: InteractionHandle) {
        self.handle = Some(handle);
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &InteractionContext<'_>) -> Result<InteractionResponse> {
        let Some(pixel) = self.condition.matches(event) else {
            return Ok(InteractionResponse::ignored());
        };

        let hit = self.hit_test(&pixel, ctx);
        let next: Vec<SelectedFeature> = hit.iter().cloned().collect();

        let selected: Vec<_> = next.iter().filter(|f| !self.selection.contains(f)).cloned().collect();
        let deselected: Vec<_> = self
            .selection
            .features()
            .iter()
            .filter(|f| !next.contains(f))
            .cloned()
            .collect();

        let handled = if hit.is_some() {
            EventHandled::Handled
        } else {
            EventHandled::NotHandled
        };

        if selected.is_empty() && deselected.is_empty() {
            log::debug!("select: selection unchanged at {:?}", pixel);
            return Ok(InteractionResponse {
                handled,
                events: Vec::new(),
            });
        }

        self.selection.replace(next);
        let select_event = SelectEvent {
            selected: selected.clone(),
            deselected: deselected.clone(),
            pixel,
            lat_lng: ctx.viewport.pixel_to_lat_lng(&pixel),
        };
        log::debug!(
            "select: {} selected, {} deselected",
            select_event.selected.len(),
            select_event.deselected.len()
        );

        for listener in &self.listeners {
            listener(&select_event, &mut self.selection);
        }

        let events = match self.handle {
            Some(interaction) => vec![MapEvent::Select {
                interaction,
                selected: selected.into_iter().map(|f| f.feature).collect(),
                deselected: deselected.into_iter().map(|f| f.feature).collect(),
            }],
            None => Vec::new(),
        };

        Ok(InteractionResponse { handled, events })
    }

    fn render(&mut self, context: &mut RenderContext, ctx: &InteractionContext<'_>) -> Result<()> {
        let style = self.style.to_render_style(1.0);
        for selected in self.selection.features() {
            let feature = ctx
                .layers
                .get_layer(&selected.layer_id)
                .and_then(|layer| layer.as_any().downcast_ref::<VectorLayer>())
                .and_then(|layer| layer.feature(selected.feature));

            if let Some(feature) = feature {
                let position = ctx.viewport.coordinate_to_pixel(&feature.coordinate());
                context.render_point(&position, &style);
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
