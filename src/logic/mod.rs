//! Logic Module - Capture, Inference & Presentation state
//!
//! ## Architecture
//! - `capture/` - Camera frames on a dedicated thread (nokhwa)
//! - `model/` - Image classification (ONNX, preprocess, postprocess, guard)
//! - `pipeline/` - Frame consumer gluing capture -> model -> readout
//! - `readout`, `preview`, `latest` - Last-write-wins published state
//! - `events` - Tauri event bridge to the webview

pub mod latest;
pub mod readout;
pub mod preview;
pub mod events;

pub mod capture;
pub mod model;
pub mod pipeline;

pub mod state;
pub mod launcher;
