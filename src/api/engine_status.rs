use serde::{Serialize, Deserialize};

use crate::logic::pipeline::PipelineStatsSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub app_version: String,

    pub model: ModelStatus,
    pub camera: CameraStatus,
    pub pipeline: PipelineStatsSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub engine: String, // "onnx" | "none"
    pub loaded: bool,
    pub model_path: Option<String>,
    pub label_count: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraStatus {
    pub running: bool,
    pub device: Option<String>,
    pub error: Option<String>,
}
