//! Tauri Commands - API cho Frontend
//!
//! Readout, preview frame, engine status và model integrity.

use std::path::Path;

use tauri::ipc::Response;
use tauri::State;

use crate::constants::APP_VERSION;
use crate::logic::model::{guard, inference, ModelMetadata};
use crate::logic::readout::ReadoutView;
use crate::logic::state::AppState;
use super::engine_status::{CameraStatus, EngineStatus, ModelStatus};

// ============================================================================
// PRESENTATION COMMANDS
// ============================================================================

/// Readout hiện tại (placeholder hoặc prediction mới nhất)
#[tauri::command]
pub async fn get_readout(state: State<'_, AppState>) -> Result<ReadoutView, String> {
    Ok(state.readout.current().view())
}

/// Latest preview frame as raw JPEG bytes
#[tauri::command]
pub async fn get_preview_frame(state: State<'_, AppState>) -> Result<Response, String> {
    match state.preview.current() {
        Some(frame) => Ok(Response::new((*frame.jpeg).clone())),
        None => Err("No preview frame yet".to_string()),
    }
}

// ============================================================================
// STATUS COMMANDS
// ============================================================================

#[tauri::command]
pub async fn get_engine_status(state: State<'_, AppState>) -> Result<EngineStatus, String> {
    let startup = state.startup.read().clone();
    let metadata = inference::get_metadata();

    Ok(EngineStatus {
        app_version: APP_VERSION.to_string(),
        model: ModelStatus {
            engine: (if metadata.is_some() { "onnx" } else { "none" }).to_string(),
            loaded: inference::is_model_loaded(),
            model_path: startup.model_path,
            label_count: metadata.map(|m| m.label_count).unwrap_or(0),
            error: startup.model_error,
        },
        camera: CameraStatus {
            running: state.is_capturing(),
            device: startup.camera_device,
            error: startup.camera_error,
        },
        pipeline: state.stats.snapshot(),
    })
}

#[tauri::command]
pub async fn get_model_metadata() -> Result<Option<ModelMetadata>, String> {
    Ok(inference::get_metadata())
}

/// Xác minh checksum của model đang dùng
#[tauri::command]
pub async fn verify_model_checksum(state: State<'_, AppState>) -> Result<bool, String> {
    let model_path = state.startup.read().model_path.clone()
        .ok_or_else(|| "No model loaded".to_string())?;

    guard::check_model(Path::new(&model_path)).map_err(|e| e.to_string())
}
