#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let native_options = eframe::NativeOptions {
        renderer: eframe::Renderer::Wgpu,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "trailfield",
        native_options,
        Box::new(|cc| Ok(Box::new(trailfield::TrailApp::new(cc)?))),
    );
    if let Err(err) = &result {
        log::error!("trailfield failed to start: {err}");
    }
    result
}
