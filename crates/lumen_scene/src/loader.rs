use std::path::Path;

use thiserror::Error;

use crate::SceneDesc;

/// Errors from loading a scene description.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scene JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a scene description from a JSON file.
pub fn load_scene(path: impl AsRef<Path>) -> Result<SceneDesc, SceneError> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)?;
    let scene = parse_scene(&data)?;
    log::debug!(
        "loaded scene '{}' from {}: {} objects, {} lights",
        scene.name,
        path.display(),
        scene.objects.len(),
        scene.lights.len()
    );
    Ok(scene)
}

/// Parse a scene description from a JSON string.
pub fn parse_scene(json: &str) -> Result<SceneDesc, SceneError> {
    Ok(serde_json::from_str(json)?)
}
