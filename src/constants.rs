//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! There is no runtime configuration: to change a default, edit this file.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Storybook Lens";

// ============================================
// Presentation
// ============================================

/// Overlay text shown until the first prediction arrives
pub const PLACEHOLDER_TEXT: &str = "Detecting...";

/// JPEG quality for preview frames sent to the webview (1-100)
pub const PREVIEW_JPEG_QUALITY: u8 = 75;

/// Longest edge of preview frames; larger frames are downscaled before encoding
pub const PREVIEW_MAX_EDGE: u32 = 640;

// ============================================
// Model
// ============================================

/// Bundled classifier, relative to the resource dir (or working dir)
pub const MODEL_RELATIVE_PATH: &str = "models/storybook_classifier.onnx";

/// Sidecar metadata suffix: `<model>.onnx.json`
pub const METADATA_SUFFIX: &str = ".json";

/// Default square input edge when metadata does not say otherwise
pub const DEFAULT_INPUT_SIZE: u32 = 224;

// ============================================
// Camera
// ============================================

/// Default camera device (first enumerated, usually back/built-in)
pub const DEFAULT_CAMERA_INDEX: u32 = 0;

/// Name of the dedicated capture thread
pub const CAPTURE_THREAD_NAME: &str = "video-queue";

/// Consecutive frame read failures tolerated before the device is
/// considered gone
pub const MAX_CONSECUTIVE_FRAME_ERRORS: u32 = 30;

/// How long startup waits for the device to open (includes the OS permission prompt)
pub const CAMERA_OPEN_TIMEOUT_SECS: u64 = 60;
