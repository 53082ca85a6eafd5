use super::{notifier::ModalNotifier, widget::MapWidget};
use crate::view::MapView;

/// eframe application showing one map over the whole window
pub struct MarkerMapApp {
    view: MapView,
    widget: MapWidget,
}

impl MarkerMapApp {
    pub fn new(view: MapView, modal: ModalNotifier) -> Self {
        Self {
            view,
            widget: MapWidget::new().with_modal(modal),
        }
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }
}

impl eframe::App for MarkerMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.widget.show(ui, &mut self.view);
            });
    }
}
