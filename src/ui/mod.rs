//! egui front end: map widget, modal alerts and the window host

pub mod app;
pub mod host;
pub mod notifier;
pub mod widget;

pub use app::MarkerMapApp;
pub use host::EguiHost;
pub use notifier::ModalNotifier;
pub use widget::{MapCursor, MapWidget};
