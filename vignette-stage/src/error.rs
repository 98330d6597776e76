//! Error types for stage operations.
//!
//! Per-frame errors never abort a frame: callers log them and keep the last
//! good state. `Config` and `NoScenes` are only raised during startup.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    /// Deformation asked for a baseline that was never recorded.
    #[error("No original positions captured for handle {0}")]
    NotCaptured(usize),

    /// Working and original buffers diverged in length.
    #[error("Geometry mismatch: original has {expected} vertices, working has {actual}")]
    GeometryMismatch { expected: usize, actual: usize },

    #[error("Unknown representation variant: {0}")]
    UnknownVariant(String),

    #[error("Invalid stage config: {0}")]
    Config(String),

    #[error("Scene director needs at least one scene")]
    NoScenes,

    #[error("Environment capture failed: {0}")]
    CaptureFailure(String),
}
