//! Capture Types - config, presets, errors, frame source trait

use std::time::Duration;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CAMERA_OPEN_TIMEOUT_SECS, CAPTURE_THREAD_NAME, DEFAULT_CAMERA_INDEX, MAX_CONSECUTIVE_FRAME_ERRORS,
};

// ============================================================================
// CONFIG
// ============================================================================

/// Capture quality preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CapturePreset {
    /// Highest resolution the device offers (still-photo quality)
    #[default]
    Photo,
    /// ~1280x720
    High,
    /// ~640x480
    Medium,
}

impl CapturePreset {
    /// Target resolution, None = device maximum
    pub fn resolution_hint(&self) -> Option<(u32, u32)> {
        match self {
            CapturePreset::Photo => None,
            CapturePreset::High => Some((1280, 720)),
            CapturePreset::Medium => Some((640, 480)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub camera_index: u32,
    pub preset: CapturePreset,
    pub thread_name: String,
    pub max_consecutive_errors: u32,
    /// Upper bound on the device open, after which `start` gives up
    pub open_timeout: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            camera_index: DEFAULT_CAMERA_INDEX,
            preset: CapturePreset::Photo,
            thread_name: CAPTURE_THREAD_NAME.to_string(),
            max_consecutive_errors: MAX_CONSECUTIVE_FRAME_ERRORS,
            open_timeout: Duration::from_secs(CAMERA_OPEN_TIMEOUT_SECS),
        }
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Device missing, permission denied, format rejected
    Open(String),
    /// One frame could not be read or decoded
    Frame(String),
    /// Device went away, capture loop ends
    Disconnected(String),
    /// Capture thread could not be spawned or died early
    Thread(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::Open(msg) => write!(f, "CaptureError: could not open camera: {}", msg),
            CaptureError::Frame(msg) => write!(f, "CaptureError: bad frame: {}", msg),
            CaptureError::Disconnected(msg) => write!(f, "CaptureError: disconnected: {}", msg),
            CaptureError::Thread(msg) => write!(f, "CaptureError: thread: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {}

// ============================================================================
// FRAME SOURCE TRAIT
// ============================================================================

/// Trait cho nguồn frame (webcam, test stub, ...)
///
/// Instances are created and used on the capture thread only, so they need
/// not be `Send`.
pub trait FrameSource {
    /// Block until the next frame is available
    fn next_frame(&mut self) -> Result<RgbImage, CaptureError>;

    /// Human readable device description for logs/status
    fn describe(&self) -> String;
}
