//! User interactions attached to a map
//!
//! An interaction sees every input event before the map's default handling
//! (panning, zooming) and may consume it.

pub mod select;

use crate::{
    core::viewport::Viewport,
    input::events::{EventHandled, InputEvent, MapEvent},
    layers::manager::LayerManager,
    rendering::context::RenderContext,
    Result,
};
use serde::{Deserialize, Serialize};

pub use select::{Select, SelectCondition, SelectEvent, SelectedFeature, SelectionState};

/// Handle to an interaction registered on a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionHandle(pub u64);

/// Read-only view of the map handed to interactions
pub struct InteractionContext<'a> {
    pub viewport: &'a Viewport,
    pub layers: &'a LayerManager,
    /// Extra hit radius in pixels
    pub hit_tolerance: f64,
}

/// What an interaction did with an event
#[derive(Debug)]
pub struct InteractionResponse {
    pub handled: EventHandled,
    /// Events to publish on the map
    pub events: Vec<MapEvent>,
}

impl InteractionResponse {
    pub fn ignored() -> Self {
        Self {
            handled: EventHandled::NotHandled,
            events: Vec::new(),
        }
    }
}

pub trait Interaction: Send + Sync {
    fn name(&self) -> &str;

    /// Called once when the interaction is added to a map
    fn on_add(&mut self, _handle: InteractionHandle) {}

    fn handle_event(&mut self, event: &InputEvent, ctx: &InteractionContext<'_>) -> Result<InteractionResponse>;

    /// Draws interaction overlays on top of the layers
    fn render(&mut self, _context: &mut RenderContext, _ctx: &InteractionContext<'_>) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
