//! App State - shared between the capture thread, UI bridge and commands

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::constants::{PREVIEW_JPEG_QUALITY, PREVIEW_MAX_EDGE};
use super::capture::CaptureHandle;
use super::pipeline::PipelineStats;
use super::preview::PreviewChannel;
use super::readout::ReadoutChannel;

/// Outcome of startup, kept so failures stay observable after the log line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartupReport {
    pub model_path: Option<String>,
    pub model_error: Option<String>,
    pub camera_device: Option<String>,
    pub camera_error: Option<String>,
}

impl StartupReport {
    pub fn has_errors(&self) -> bool {
        self.model_error.is_some() || self.camera_error.is_some()
    }
}

pub struct AppState {
    pub readout: Arc<ReadoutChannel>,
    pub preview: Arc<PreviewChannel>,
    pub stats: Arc<PipelineStats>,
    pub capture: Mutex<Option<CaptureHandle>>,
    pub startup: RwLock<StartupReport>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            readout: Arc::new(ReadoutChannel::new()),
            preview: Arc::new(PreviewChannel::new(PREVIEW_JPEG_QUALITY, PREVIEW_MAX_EDGE)),
            stats: Arc::new(PipelineStats::default()),
            capture: Mutex::new(None),
            startup: RwLock::new(StartupReport::default()),
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capture
            .lock()
            .as_ref()
            .map(|h| h.is_running())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_is_idle() {
        let state = AppState::new();

        assert!(!state.is_capturing());
        assert!(!state.startup.read().has_errors());
        assert_eq!(state.readout.current().text(), "Detecting...");
    }

    #[test]
    fn test_report_errors() {
        let report = StartupReport {
            camera_error: Some("no device".to_string()),
            ..StartupReport::default()
        };
        assert!(report.has_errors());
    }
}
