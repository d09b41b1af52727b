//! Model Guard - SHA256 integrity check for the bundled classifier

use std::fs::File;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::manifest::{load_manifest, manifest_path};

#[derive(Debug)]
pub struct GuardError(pub String);

impl std::fmt::Display for GuardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GuardError: {}", self.0)
    }
}

impl std::error::Error for GuardError {}

/// Compute SHA256 hash of file (lowercase hex)
pub fn compute_file_hash(path: &Path) -> Result<String, GuardError> {
    let mut file = File::open(path)
        .map_err(|e| GuardError(format!("Cannot open {}: {}", path.display(), e)))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)
        .map_err(|e| GuardError(format!("Cannot read {}: {}", path.display(), e)))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Verify file against an expected hex digest (case-insensitive)
pub fn verify_checksum(path: &Path, expected: &str) -> Result<(), GuardError> {
    let actual = compute_file_hash(path)?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        log::info!("Model checksum verified: {}", path.display());
        Ok(())
    } else {
        Err(GuardError(format!(
            "Checksum mismatch for {}: expected {}, got {}",
            path.display(),
            expected,
            actual
        )))
    }
}

/// Re-check a model against the digest in its manifest.
/// Ok(false) on mismatch, Err when there is nothing to compare against.
pub fn check_model(model_path: &Path) -> Result<bool, GuardError> {
    let manifest = load_manifest(&manifest_path(model_path))
        .map_err(|e| GuardError(e.0))?;
    let expected = manifest.sha256
        .ok_or_else(|| GuardError("Manifest has no sha256".to_string()))?;

    let actual = compute_file_hash(model_path)?;
    Ok(actual.eq_ignore_ascii_case(expected.trim()))
}
