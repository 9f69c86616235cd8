//! Model location: where model directories live on disk.

use std::path::{Path, PathBuf};

use crate::error::VoiceError;

/// Model used when none is given: the sherpa-onnx Kokoro English bundle.
pub const DEFAULT_MODEL_ID: &str = "kokoro-en-v0_19";

/// Default directory holding model bundles.
///
/// Returns `{data_local_dir}/ttsd/models` (e.g. `~/.local/share/ttsd/models`).
pub fn default_models_dir() -> Result<PathBuf, VoiceError> {
    let data_dir = dirs::data_local_dir().ok_or(VoiceError::NoModelsDir)?;
    Ok(data_dir.join("ttsd").join("models"))
}

/// Resolve a model id to a directory.
///
/// Absolute paths and paths that exist relative to the working directory are
/// used as given; anything else is looked up inside `models_dir`.
#[must_use]
pub fn resolve_model_dir(model_id: &str, models_dir: &Path) -> PathBuf {
    let candidate = PathBuf::from(model_id);
    if candidate.is_absolute() || candidate.exists() {
        return candidate;
    }
    models_dir.join(model_id)
}
