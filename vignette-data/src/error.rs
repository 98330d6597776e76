//! Error types for data loading.

use thiserror::Error;

/// Errors that can occur while loading scene tables and models.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scene table is empty")]
    EmptySceneTable,

    #[error("Duplicate scene id: {0}")]
    DuplicateSceneId(String),

    #[error("Mesh '{name}' has {len} position components, not a multiple of 3")]
    MalformedPositions { name: String, len: usize },

    #[error("Model contains no meshes")]
    EmptyModel,
}
