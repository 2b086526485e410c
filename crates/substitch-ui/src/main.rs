#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;
mod context;
mod helpers;
mod modules;
mod theme;

fn main() -> eframe::Result {
    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("SubStitch")
            .with_inner_size([1180.0, 820.0])
            .with_min_inner_size([760.0, 560.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "SubStitch",
        native_options,
        Box::new(|cc| Ok(Box::new(app::SubStitchApp::new(cc)))),
    )
}
