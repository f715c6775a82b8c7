mod app;
mod color;
mod state;
mod ui;

use app::RustyEdaApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    let initial = std::env::args_os().nth(1).map(std::path::PathBuf::from);

    eframe::run_native(
        "Rusty EDA – CSV Explorer",
        options,
        Box::new(move |_cc| {
            let mut app = RustyEdaApp::default();
            // Optional path on the command line, loaded like File → Open….
            if let Some(path) = initial {
                app.state.open(&path);
            }
            Ok(Box::new(app))
        }),
    )
}
