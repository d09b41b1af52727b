//! Launcher - wire model, camera and pipeline together at startup
//!
//! Thứ tự: load model -> mở camera -> capture thread chạy pipeline.
//! Lỗi ở bước nào thì ghi vào StartupReport, log, và bỏ qua bước đó; process vẫn chạy.
//! Blocking (model load, camera open): gọi từ background thread, không phải từ Tauri `setup`.

use std::path::{Path, PathBuf};

use super::capture::{self, CaptureConfig, CaptureError, FrameSource, WebcamSource};
use super::model::inference::locate_model;
use super::model::{ImageClassifier, InferenceError, OnnxClassifier};
use super::pipeline::FramePipeline;
use super::state::AppState;

/// Production startup: bundled ONNX model + default webcam
pub fn launch(state: &AppState, resource_dir: Option<&Path>) {
    let classifier = locate_model(resource_dir)
        .and_then(|path| OnnxClassifier::load(&path).map(|c| (path, c)));

    launch_with(state, classifier, CaptureConfig::default(), WebcamSource::open);
}

/// Startup with an injected classifier result and device opener.
/// Outcomes are written into `state`, which may already be shared.
pub fn launch_with<C, S, O>(
    state: &AppState,
    classifier: Result<(PathBuf, C), InferenceError>,
    config: CaptureConfig,
    open: O,
) where
    C: ImageClassifier + Send + 'static,
    S: FrameSource,
    O: FnOnce(&CaptureConfig) -> Result<S, CaptureError> + Send + 'static,
{
    let classifier = match classifier {
        Ok((path, classifier)) => {
            state.startup.write().model_path = Some(path.display().to_string());
            Some(classifier)
        }
        Err(e) => {
            log::error!("Failed to load ML model: {}", e);
            state.startup.write().model_error = Some(e.to_string());
            None
        }
    };

    let pipeline = FramePipeline::new(classifier, state.readout.clone(), state.stats.clone())
        .with_preview(state.preview.clone());

    match capture::start(config, open, pipeline.into_consumer()) {
        Ok(handle) => {
            state.startup.write().camera_device = Some(handle.device().to_string());
            *state.capture.lock() = Some(handle);
        }
        Err(e) => {
            log::error!("Could not access camera: {}", e);
            state.startup.write().camera_error = Some(e.to_string());
        }
    }
}
