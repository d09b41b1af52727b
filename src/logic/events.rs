//! Event Emitter - Global Tauri Event System
//!
//! Cho phép emit events từ bất kỳ đâu trong codebase.
//! Webview nhận event trên UI thread của nó.

use parking_lot::RwLock;
use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tokio::sync::watch;

use super::preview::PreviewFrame;
use super::readout::Readout;

/// Global AppHandle reference
static APP_HANDLE: RwLock<Option<AppHandle>> = RwLock::new(None);

/// Event names
pub mod events {
    pub const PREDICTION_UPDATED: &str = "prediction:updated";
    pub const PREVIEW_FRAME: &str = "preview:frame";
    pub const PIPELINE_ERROR: &str = "pipeline:error";
}

/// Initialize event system with AppHandle
pub fn init(app_handle: AppHandle) {
    let mut handle = APP_HANDLE.write();
    *handle = Some(app_handle);
    log::info!("Event emitter initialized");
}

/// Emit event to all listeners
pub fn emit<S: Serialize + Clone>(event: &str, payload: S) -> Result<(), String> {
    let handle = APP_HANDLE.read();
    if let Some(app) = handle.as_ref() {
        app.emit(event, payload)
            .map_err(|e| format!("Emit error: {}", e))
    } else {
        log::warn!("Event system not initialized, event '{}' dropped", event);
        Ok(())
    }
}

pub fn emit_prediction_updated<S: Serialize + Clone>(payload: S) {
    if let Err(e) = emit(events::PREDICTION_UPDATED, payload) {
        log::error!("Failed to emit prediction: {}", e);
    }
}

pub fn emit_preview_frame<S: Serialize + Clone>(payload: S) {
    if let Err(e) = emit(events::PREVIEW_FRAME, payload) {
        log::error!("Failed to emit preview frame: {}", e);
    }
}

pub fn emit_pipeline_error<S: Serialize + Clone>(payload: S) {
    if let Err(e) = emit(events::PIPELINE_ERROR, payload) {
        log::error!("Failed to emit pipeline error: {}", e);
    }
}

// ============================================================================
// BRIDGES (watch channel -> webview)
// ============================================================================

/// Forward every observed readout change to the webview.
/// Intermediate values written faster than this loop runs are skipped.
pub async fn forward_readouts(mut rx: watch::Receiver<Readout>) {
    while rx.changed().await.is_ok() {
        let view = rx.borrow_and_update().view();
        emit_prediction_updated(view);
    }
    log::debug!("Readout channel closed, bridge stopped");
}

/// Notify the webview that a new preview frame is available
pub async fn forward_previews(mut rx: watch::Receiver<Option<PreviewFrame>>) {
    while rx.changed().await.is_ok() {
        let notice = rx.borrow_and_update().as_ref().map(PreviewFrame::notice);
        if let Some(notice) = notice {
            emit_preview_frame(notice);
        }
    }
    log::debug!("Preview channel closed, bridge stopped");
}
