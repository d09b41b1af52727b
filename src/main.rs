//! Storybook Lens - Main Entry Point
//!
//! Camera preview + live book genre classification overlay.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod api;
mod logic;
pub mod constants;

use api::commands;
use logic::state::AppState;
use tauri::Manager;

use constants::{APP_NAME, APP_VERSION};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    tauri::Builder::default()
        .setup(|app| {
            // Initialize event system with AppHandle
            logic::events::init(app.handle().clone());

            let state = AppState::new();

            // Bridge published state -> webview events
            tauri::async_runtime::spawn(logic::events::forward_readouts(state.readout.subscribe()));
            tauri::async_runtime::spawn(logic::events::forward_previews(state.preview.subscribe()));

            app.manage(state);

            // Model load and camera open block (permission prompt included),
            // so they run off the main thread and the window shows up right away
            let handle = app.handle().clone();
            let resource_dir = app.path().resource_dir().ok();
            tauri::async_runtime::spawn_blocking(move || {
                let state = handle.state::<AppState>();
                logic::launcher::launch(&state, resource_dir.as_deref());

                let report = state.startup.read().clone();
                if report.has_errors() {
                    logic::events::emit_pipeline_error(report);
                }
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Presentation
            commands::get_readout,
            commands::get_preview_frame,

            // Status
            commands::get_engine_status,
            commands::get_model_metadata,
            commands::verify_model_checksum,
        ])
        .run(tauri::generate_context!())
        .expect("error while running Storybook Lens");
}
