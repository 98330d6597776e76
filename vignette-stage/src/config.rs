//! Stage configuration.
//!
//! Every field has a default so a config file only needs to name what it
//! changes.

use crate::deform::{DeformPasses, IdleWave, PointerWarp};
use crate::director::TransitionConfig;
use crate::representation::Representation;
use crate::StageError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub idle: IdleWave,
    pub warp: PointerWarp,
    /// Representations that receive idle oscillation and pointer warp.
    pub deformed: Vec<Representation>,
    pub transition: TransitionConfig,
    /// Accumulated wheel delta that produces one discrete scene step.
    pub wheel_threshold: f32,
    /// Blur applied to a captured environment shown as background.
    pub environment_blurriness: f32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            idle: IdleWave::default(),
            warp: PointerWarp::default(),
            deformed: vec![Representation::Points],
            transition: TransitionConfig::default(),
            wheel_threshold: 100.0,
            environment_blurriness: 0.5,
        }
    }
}

impl StageConfig {
    /// Deformation passes for a visible representation.
    pub fn passes_for(&self, representation: Representation) -> DeformPasses {
        let deformed = self.deformed.contains(&representation);
        DeformPasses {
            idle: deformed,
            ripple: representation == Representation::Points,
            warp: deformed,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StageError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| StageError::Config(e.to_string()))?;
        let config = Self::from_json(&text).map_err(|e| StageError::Config(e.to_string()))?;
        info!("Stage config loaded");
        Ok(config)
    }
}
