//! Model Manifest - sidecar JSON bundled next to the ONNX file
//!
//! `models/storybook_classifier.onnx.json`:
//! ```json
//! { "labels": ["Adventure", "Fairy Tale"], "input_size": 224,
//!   "mean": [0.485, 0.456, 0.406], "std": [0.229, 0.224, 0.225],
//!   "apply_softmax": true, "sha256": "..." }
//! ```
//! Mọi field đều optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_INPUT_SIZE, METADATA_SUFFIX};
use super::inference::InferenceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelManifest {
    /// Class index -> display label
    pub labels: Vec<String>,
    /// Square input edge in pixels
    pub input_size: u32,
    /// Per-channel mean, applied after scaling to [0,1]
    pub mean: [f32; 3],
    /// Per-channel std
    pub std: [f32; 3],
    /// None = detect from the output values
    pub apply_softmax: Option<bool>,
    /// Expected SHA256 of the model file
    pub sha256: Option<String>,
}

impl Default for ModelManifest {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            input_size: DEFAULT_INPUT_SIZE,
            mean: [0.0; 3],
            std: [1.0; 3],
            apply_softmax: None,
            sha256: None,
        }
    }
}

/// `<model path>.json`
pub fn manifest_path(model_path: &Path) -> PathBuf {
    let mut name = model_path.as_os_str().to_os_string();
    name.push(METADATA_SUFFIX);
    PathBuf::from(name)
}

/// Load the manifest; a missing file yields defaults
pub fn load_manifest(path: &Path) -> Result<ModelManifest, InferenceError> {
    if !path.exists() {
        log::warn!("No model manifest at {} - using defaults", path.display());
        return Ok(ModelManifest::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| InferenceError(format!("Failed to read manifest: {}", e)))?;

    let manifest: ModelManifest = serde_json::from_str(&content)
        .map_err(|e| InferenceError(format!("Failed to parse manifest: {}", e)))?;

    if manifest.input_size == 0 {
        return Err(InferenceError("Manifest input_size must be > 0".to_string()));
    }

    if manifest.std.iter().any(|s| s.is_nan() || *s <= 0.0) {
        return Err(InferenceError(format!("Manifest std must be > 0, got {:?}", manifest.std)));
    }

    log::info!(
        "Model manifest loaded: {} labels, input {}x{}",
        manifest.labels.len(),
        manifest.input_size,
        manifest.input_size
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_manifest_path_appends_suffix() {
        let path = manifest_path(Path::new("models/storybook_classifier.onnx"));
        assert_eq!(path, PathBuf::from("models/storybook_classifier.onnx.json"));
    }

    #[test]
    fn test_missing_manifest_uses_defaults() {
        let manifest = load_manifest(Path::new("/nonexistent/model.onnx.json")).unwrap();
        assert_eq!(manifest, ModelManifest::default());
        assert_eq!(manifest.input_size, 224);
    }

    #[test]
    fn test_partial_manifest_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "labels": ["Fantasy", "Mystery"], "input_size": 299 }}"#).unwrap();

        let manifest = load_manifest(file.path()).unwrap();
        assert_eq!(manifest.labels, vec!["Fantasy", "Mystery"]);
        assert_eq!(manifest.input_size, 299);
        assert_eq!(manifest.std, [1.0; 3]);
        assert!(manifest.apply_softmax.is_none());
        assert!(manifest.sha256.is_none());
    }

    #[test]
    fn test_invalid_manifest_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = load_manifest(file.path()).unwrap_err();
        assert!(err.0.contains("Failed to parse manifest"));
    }

    #[test]
    fn test_zero_input_size_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "input_size": 0 }}"#).unwrap();

        assert!(load_manifest(file.path()).is_err());
    }

    #[test]
    fn test_non_positive_std_rejected() {
        for std in ["[0.229, 0.0, 0.225]", "[0.229, -0.224, 0.225]"] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, r#"{{ "std": {} }}"#, std).unwrap();

            let err = load_manifest(file.path()).unwrap_err();
            assert!(err.0.contains("std must be > 0"), "{}", err);
        }
    }
}
