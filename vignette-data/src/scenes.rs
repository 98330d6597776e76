//! Scene descriptor table.
//!
//! The table is immutable configuration read at startup: an ordered list of
//! named scenes, each with a camera pose, an object pose, an environment
//! capture source and an optional effect preset.

use crate::types::{CameraPose, ObjectPose};
use crate::DataError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const BUILTIN_SCENES: &str = include_str!("../assets/scenes.json");

/// Write applied to one post-processing effect by a preset.
///
/// `enabled: None` leaves the effect at its reset state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, alias = "parameters", skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f32>,
}

impl EffectEntry {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: f32) -> Self {
        self.params.insert(name.into(), value);
        self
    }
}

/// Effect name to entry. An empty preset means "default look".
pub type EffectPreset = BTreeMap<String, EffectEntry>;

/// One record of the scene descriptor table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescriptor {
    pub id: String,
    #[serde(alias = "splatUrl")]
    pub environment_source: String,
    pub camera: CameraPose,
    #[serde(alias = "sofa")]
    pub object: ObjectPose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover_representation: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub effects: EffectPreset,
}

/// Parse and validate a scene table from JSON text.
pub fn parse_scene_table(text: &str) -> Result<Vec<SceneDescriptor>, DataError> {
    let scenes: Vec<SceneDescriptor> = serde_json::from_str(text)?;
    if scenes.is_empty() {
        return Err(DataError::EmptySceneTable);
    }

    let mut seen = HashSet::with_capacity(scenes.len());
    for scene in &scenes {
        if !seen.insert(scene.id.as_str()) {
            return Err(DataError::DuplicateSceneId(scene.id.clone()));
        }
    }

    debug!("Parsed {} scene descriptors", scenes.len());
    Ok(scenes)
}

/// Load a scene table from a JSON file.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_scene_table(path: impl AsRef<Path>) -> Result<Vec<SceneDescriptor>, DataError> {
    let text = fs::read_to_string(path.as_ref())?;
    let scenes = parse_scene_table(&text)?;
    info!("Scene table loaded: {} scenes", scenes.len());
    Ok(scenes)
}

/// The three captures the showcase ships with.
pub fn builtin_scene_table() -> Result<Vec<SceneDescriptor>, DataError> {
    parse_scene_table(BUILTIN_SCENES)
}
