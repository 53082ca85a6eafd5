use mapa::{
    core::{config::MapProfile, geo::Point},
    startup::build_marker_map,
    ui::{EguiHost, MarkerMapApp},
};

const WINDOW_SIZE: [f32; 2] = [1024.0, 768.0];

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let host = EguiHost::new(Point::new(WINDOW_SIZE[0] as f64, WINDOW_SIZE[1] as f64));
    let view = build_marker_map(&host, MapProfile::Online)?;
    log::info!("starting viewer with layers {:?}", view.map().list_layers());

    let app = MarkerMapApp::new(view, host.modal().clone());
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_title("Mapa"),
        ..Default::default()
    };

    eframe::run_native("mapa-app", options, Box::new(move |_cc| Box::new(app)))
        .map_err(|e| anyhow::anyhow!("viewer exited with error: {e}"))
}
