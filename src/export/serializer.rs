//! Model file reading and writing

use super::ModelRecord;
use crate::error::{LinfitError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Extension of model files
pub const MODEL_EXTENSION: &str = "linmodel";

/// Append the model extension when `path` has none
pub fn model_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(MODEL_EXTENSION)
    }
}

/// Write a record as JSON.
///
/// The record goes to a temporary file next to the destination which is then
/// renamed over it, so a failed save never leaves a truncated model behind.
/// Returns the path actually written.
pub fn save_model(record: &ModelRecord, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = model_path(path);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, record)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| LinfitError::IoError(e.error))?;

    info!(path = %path.display(), output = %record.columns.output, "Saved model");
    Ok(path)
}

/// Read and validate a record.
///
/// A file missing any required key is rejected before a model can be built
/// from it.
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelRecord> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let record = ModelRecord::from_json(&json)?;

    info!(path = %path.display(), output = %record.columns.output, "Loaded model");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_path_extension() {
        assert_eq!(model_path("out/model"), PathBuf::from("out/model.linmodel"));
        assert_eq!(model_path("model.json"), PathBuf::from("model.json"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(dir.path().join("absent.linmodel")).unwrap_err();
        assert!(matches!(err, LinfitError::IoError(_)));
    }
}
