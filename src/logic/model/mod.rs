//! Model Module - Image classification
//!
//! Tách inference khỏi capture: preprocess, ONNX session, postprocess, integrity guard.

pub mod inference;
pub mod manifest;
pub mod preprocess;
pub mod postprocess;
pub mod guard;

// Re-export common types
pub use inference::{Classification, ImageClassifier, InferenceError, ModelMetadata, OnnxClassifier};
