pub mod context;

pub use context::{DrawCommand, PointRenderStyle, RenderContext, TextAnchor};
