use anyhow::Result;
use eframe::egui;

use photism::app::PhotismApp;
use photism::config::AppSettings;

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Starting Photism");

    let settings = AppSettings::load();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 1000.0])
            .with_title("Photism"),
        ..Default::default()
    };

    eframe::run_native(
        "Photism",
        options,
        Box::new(move |cc| Ok(Box::new(PhotismApp::new(cc, settings)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))
}
