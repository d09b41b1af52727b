//! Inference Engine - ONNX Runtime Integration
//!
//! Load classifier một lần lúc startup, mỗi frame gọi `classify` độc lập.
//! Không batching, không cache.

use std::path::{Path, PathBuf};

use image::RgbImage;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use crate::constants::MODEL_RELATIVE_PATH;
use super::manifest::{self, ModelManifest};
use super::{guard, postprocess, preprocess};

// ============================================================================
// STATE
// ============================================================================

/// Metadata of the loaded model (for status commands)
static MODEL_METADATA: RwLock<Option<ModelMetadata>> = RwLock::new(None);

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub input_size: u32,
    pub label_count: usize,
    pub output_name: String,
    pub checksum_verified: bool,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Best class for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,         // 0.0 - 1.0
    pub class_index: usize,
    pub inference_time_us: u64,  // Microseconds
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug)]
pub struct InferenceError(pub String);

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InferenceError: {}", self.0)
    }
}

impl std::error::Error for InferenceError {}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait cho image classifiers (ONNX, test stubs, ...)
pub trait ImageClassifier {
    fn classify(&mut self, frame: &RgbImage) -> Result<Classification, InferenceError>;
    fn labels(&self) -> &[String];
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

pub struct OnnxClassifier {
    session: Session,
    manifest: ModelManifest,
    output_name: String,
}

impl OnnxClassifier {
    /// Load ONNX model + sidecar manifest từ file
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(InferenceError(format!("Model not found: {}", model_path.display())));
        }

        let manifest = manifest::load_manifest(&manifest::manifest_path(model_path))?;

        let checksum_verified = match manifest.sha256.as_deref() {
            Some(expected) => {
                guard::verify_checksum(model_path, expected)
                    .map_err(|e| InferenceError(format!("Integrity check failed: {}", e)))?;
                true
            }
            None => false,
        };

        let session = Session::builder()
            .map_err(|e| InferenceError(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| InferenceError(format!("Failed to load model: {}", e)))?;

        let output_name = session.outputs.first()
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError("No output defined".to_string()))?;

        log::info!("ONNX model loaded successfully (output '{}')", output_name);

        *MODEL_METADATA.write() = Some(ModelMetadata {
            model_path: model_path.display().to_string(),
            input_size: manifest.input_size,
            label_count: manifest.labels.len(),
            output_name: output_name.clone(),
            checksum_verified,
            loaded_at: chrono::Utc::now(),
        });

        Ok(Self {
            session,
            manifest,
            output_name,
        })
    }
}

impl ImageClassifier for OnnxClassifier {
    fn classify(&mut self, frame: &RgbImage) -> Result<Classification, InferenceError> {
        let start_time = std::time::Instant::now();

        let input_array = preprocess::to_input_tensor(frame, &self.manifest);

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError(format!("Tensor error: {}", e)))?;

        let outputs = self.session.run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError(format!("Inference failed: {}", e)))?;

        let output = outputs.get(self.output_name.as_str())
            .ok_or_else(|| InferenceError("No output".to_string()))?;

        let output_tensor = output.try_extract_tensor::<f32>()
            .map_err(|e| InferenceError(format!("Extract error: {}", e)))?;

        let scores = postprocess::to_probabilities(output_tensor.1, self.manifest.apply_softmax);

        let (class_index, confidence) = postprocess::best_class(&scores)
            .ok_or_else(|| InferenceError("Empty model output".to_string()))?;

        Ok(Classification {
            label: postprocess::label_for(&self.manifest.labels, class_index),
            confidence,
            class_index,
            inference_time_us: start_time.elapsed().as_micros() as u64,
        })
    }

    fn labels(&self) -> &[String] {
        &self.manifest.labels
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Find the bundled model: resource dir first, then working dir
pub fn locate_model(resource_dir: Option<&Path>) -> Result<PathBuf, InferenceError> {
    let mut candidates = Vec::new();
    if let Some(dir) = resource_dir {
        candidates.push(dir.join(MODEL_RELATIVE_PATH));
    }
    candidates.push(PathBuf::from(MODEL_RELATIVE_PATH));

    candidates
        .iter()
        .find(|p| p.exists())
        .cloned()
        .ok_or_else(|| {
            let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
            InferenceError(format!("Model not found, tried: {}", tried.join(", ")))
        })
}

/// Check if model is loaded
pub fn is_model_loaded() -> bool {
    MODEL_METADATA.read().is_some()
}

/// Get model metadata
pub fn get_metadata() -> Option<ModelMetadata> {
    MODEL_METADATA.read().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_model() {
        let err = OnnxClassifier::load(Path::new("/nonexistent/storybook.onnx")).err().unwrap();
        assert!(err.0.contains("Model not found"));
    }

    #[test]
    fn test_load_rejects_checksum_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.onnx");
        std::fs::write(&model_path, b"not really onnx").unwrap();

        let mut sidecar = std::fs::File::create(manifest::manifest_path(&model_path)).unwrap();
        write!(sidecar, r#"{{ "sha256": "{}" }}"#, "00".repeat(32)).unwrap();

        let err = OnnxClassifier::load(&model_path).err().unwrap();
        assert!(err.0.contains("Integrity check failed"));
    }

    #[test]
    fn test_load_rejects_bad_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.onnx");
        std::fs::write(&model_path, b"onnx").unwrap();
        std::fs::write(manifest::manifest_path(&model_path), b"{ broken").unwrap();

        let err = OnnxClassifier::load(&model_path).err().unwrap();
        assert!(err.0.contains("Failed to parse manifest"));
    }

    #[test]
    fn test_locate_model_prefers_resource_dir() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = dir.path().join(MODEL_RELATIVE_PATH);
        std::fs::create_dir_all(bundled.parent().unwrap()).unwrap();
        std::fs::write(&bundled, b"onnx").unwrap();

        assert_eq!(locate_model(Some(dir.path())).unwrap(), bundled);
    }

    #[test]
    fn test_locate_model_reports_candidates() {
        let dir = tempfile::tempdir().unwrap();

        match locate_model(Some(dir.path())) {
            // a real model dropped into the working dir wins the fallback
            Ok(path) => assert_eq!(path, PathBuf::from(MODEL_RELATIVE_PATH)),
            Err(err) => {
                assert!(err.0.contains("Model not found, tried"));
                assert!(err.0.contains(&dir.path().display().to_string()));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Real ONNX session: tests/fixtures/channel_mean.onnx
    // ReduceMean over H,W then Softmax -> one probability per RGB channel
    // ------------------------------------------------------------------------

    fn fixture_model() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/channel_mean.onnx")
    }

    #[test]
    fn test_classify_with_onnx_session() {
        let mut classifier = OnnxClassifier::load(&fixture_model()).unwrap();
        assert_eq!(classifier.labels(), ["Adventure", "Fairy Tale", "Mystery"]);

        // green dominates -> class 1, softmax([0, 1, 0]) = e / (e + 2)
        let green = RgbImage::from_pixel(8, 6, image::Rgb([0, 255, 0]));
        let result = classifier.classify(&green).unwrap();

        let expected = std::f32::consts::E / (std::f32::consts::E + 2.0);
        assert_eq!(result.label, "Fairy Tale");
        assert_eq!(result.class_index, 1);
        assert!((result.confidence - expected).abs() < 1e-3, "confidence {}", result.confidence);

        let blue = RgbImage::from_pixel(6, 8, image::Rgb([0, 0, 255]));
        assert_eq!(classifier.classify(&blue).unwrap().label, "Mystery");

        let metadata = get_metadata().unwrap();
        assert_eq!(metadata.output_name, "probabilities");
        assert_eq!(metadata.input_size, 4);
        assert_eq!(metadata.label_count, 3);
        assert!(metadata.checksum_verified);
        assert!(is_model_loaded());
    }
}
