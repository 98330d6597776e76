//! Vignette Stage Crate
//!
//! Renderer-agnostic core of the showcase: exclusive representation switching,
//! per-vertex deformation from captured originals, eased scene transitions,
//! post-processing presets and asynchronous environment capture.
//! A renderer drives [`Stage::tick`] and draws from [`Stage::snapshot`].

pub mod capture;
pub mod config;
pub mod deform;
pub mod director;
pub mod effects;
mod error;
pub mod offsets;
pub mod representation;
pub mod stage;
pub mod tween;

pub use capture::{
    CaptureOutcome, CaptureRequest, CaptureTicket, EnvironmentCapturer, EnvironmentMap,
    EnvironmentSlot,
};
pub use config::StageConfig;
pub use deform::{DeformPasses, DeformationEngine, IdleWave, PointerWarp};
pub use director::{
    DirectorEvent, Flourish, Scene, SceneDirector, StepDirection, TransitionConfig,
};
pub use effects::{EffectKind, EffectPresetController, EffectState};
pub use error::StageError;
pub use offsets::{OffsetHandle, VertexOffsetBuffer};
pub use representation::{MaterialDescriptor, Representation, RepresentationSet, Variant};
pub use stage::{FrameSnapshot, Stage, StageInput};
pub use tween::{Easing, Tween};
