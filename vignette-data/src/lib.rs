//! Vignette Data Crate
//!
//! Data types and loaders for the vignette stage: camera/object poses, mesh
//! geometry, the scene descriptor table and effect preset records.
//! This crate is renderer-agnostic and focuses on parsing and plain geometry.

mod error;
pub mod mesh;
pub mod primitives;
pub mod scenes;
pub mod types;

pub use error::DataError;
pub use mesh::{load_model, parse_model, MeshGeometry, Model};
pub use scenes::{
    builtin_scene_table, load_scene_table, parse_scene_table, EffectEntry, EffectPreset,
    SceneDescriptor,
};
pub use types::{CameraPose, ObjectPose};
