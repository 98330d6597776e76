//! Per-frame composition of the showcase.
//!
//! `Stage` is the single owner of the mutable showcase state: pointer
//! position, scene director, representation set, effect presets and the
//! environment slot. Input handlers write through [`Stage::handle`]; the frame
//! loop calls [`Stage::tick`] once per display refresh and the renderer reads
//! [`Stage::snapshot`] afterwards.

use crate::capture::{EnvironmentCapturer, EnvironmentMap, EnvironmentSlot};
use crate::config::StageConfig;
use crate::deform::DeformationEngine;
use crate::director::{DirectorEvent, Scene, SceneDirector, StepDirection};
use crate::effects::EffectPresetController;
use crate::offsets::VertexOffsetBuffer;
use crate::representation::{MaterialDescriptor, Representation, RepresentationSet};
use crate::StageError;
use glam::{Vec2, Vec3};
use tracing::{debug, warn};
use vignette_data::{CameraPose, Model, ObjectPose, SceneDescriptor};

/// Already-normalized input delivered by the embedding application.
#[derive(Debug, Clone, PartialEq)]
pub enum StageInput {
    /// Pointer in normalized device coordinates, `[-1, 1]` on both axes.
    PointerMoved(Vec2),
    /// Discrete scroll step.
    Step(StepDirection),
    /// A click resolved by ray intersection to the representation it hit.
    Select(String),
    /// Direct request to show a representation.
    Show(String),
}

/// Everything the renderer polls after a tick.
#[derive(Debug)]
pub struct FrameSnapshot<'a> {
    pub frame: u64,
    pub elapsed: f32,
    pub scene_id: &'a str,
    pub transitioning: bool,
    pub camera: CameraPose,
    pub object: ObjectPose,
    pub flash: f32,
    pub representation: Option<Representation>,
    pub material: Option<&'a MaterialDescriptor>,
    /// Local rotation of the visible variant inside the object group.
    pub variant_rotation: Vec3,
    pub meshes: Vec<&'a [Vec3]>,
    pub effects: &'a EffectPresetController,
    pub environment: Option<&'a EnvironmentMap>,
}

pub struct Stage {
    config: StageConfig,
    director: SceneDirector,
    effects: EffectPresetController,
    environment: EnvironmentSlot,
    offsets: VertexOffsetBuffer,
    representations: Option<RepresentationSet>,
    /// Scene whose state was last swapped in. Leads `director.current()`
    /// while a transition is still moving towards it.
    presented: usize,
    engine: DeformationEngine,
    pointer: Vec2,
    elapsed: f32,
    frame: u64,
}

impl Stage {
    pub fn new(scenes: Vec<SceneDescriptor>, config: StageConfig) -> Result<Self, StageError> {
        let director = SceneDirector::from_descriptors(scenes, config.transition)?;
        Ok(Self {
            effects: EffectPresetController::new(),
            environment: EnvironmentSlot::new(config.environment_blurriness),
            offsets: VertexOffsetBuffer::new(),
            representations: None,
            presented: 0,
            engine: DeformationEngine::new(config.idle, config.warp),
            pointer: Vec2::ZERO,
            elapsed: 0.0,
            frame: 0,
            director,
            config,
        })
    }

    /// Apply the first scene's preset and request its environment.
    pub fn begin(&mut self, capturer: &mut dyn EnvironmentCapturer) {
        let scene = self.director.current();
        self.effects.apply(&scene.effects);
        self.environment.request(
            capturer,
            self.director.current_index(),
            &scene.environment_source,
        );
    }

    /// Hook up a freshly loaded model. Baselines are captured here, once.
    pub fn attach_model(&mut self, model: &Model) {
        if self.representations.is_some() {
            warn!("Model already attached; ignoring second load");
            return;
        }
        self.representations = Some(RepresentationSet::from_model(model, &mut self.offsets));
    }

    pub fn handle(&mut self, input: StageInput, capturer: &mut dyn EnvironmentCapturer) {
        match input {
            StageInput::PointerMoved(p) => {
                self.pointer = p.clamp(Vec2::NEG_ONE, Vec2::ONE);
            }
            StageInput::Step(direction) => {
                if self.director.advance(direction) {
                    // Without a flourish the swap is due immediately.
                    self.dispatch(capturer);
                }
            }
            StageInput::Select(name) => self.select(&name),
            StageInput::Show(name) => self.show(&name),
        }
    }

    fn select(&mut self, name: &str) {
        let hit: Representation = match name.parse() {
            Ok(r) => r,
            Err(e) => {
                warn!("Selection ignored: {}", e);
                return;
            }
        };
        let alternate = self
            .presented_scene()
            .alternate
            .unwrap_or(Representation::Points);
        let Some(set) = self.representations.as_mut() else {
            debug!("Selection before model load ignored");
            return;
        };
        if !set.is_active(hit) {
            debug!("Selection hit hidden representation '{}'", hit);
            return;
        }
        if let Err(e) = set.toggle(Representation::Default, alternate) {
            warn!("Toggle failed: {}", e);
        }
    }

    fn show(&mut self, name: &str) {
        let Some(set) = self.representations.as_mut() else {
            debug!("Show before model load ignored");
            return;
        };
        if let Err(e) = set.set_visible_by_name(name) {
            warn!("{}; visibility unchanged", e);
        }
    }

    /// Advance one frame by `dt` seconds.
    pub fn tick(&mut self, dt: f32, capturer: &mut dyn EnvironmentCapturer) {
        self.frame += 1;
        self.elapsed += dt;

        let events = self.director.update(dt);
        self.react(events, capturer);
        self.environment.poll();

        let Some(set) = self.representations.as_mut() else {
            return;
        };
        set.animate(self.elapsed, dt);

        let Some(current) = set.current() else {
            return;
        };
        let passes = self.config.passes_for(current);
        let Some(variant) = set.variant_mut(current) else {
            return;
        };
        for mesh in variant.meshes_mut() {
            let original = match self.offsets.get(mesh.handle) {
                Ok(original) => original,
                Err(e) => {
                    warn!("{}; skipping mesh this frame", e);
                    continue;
                }
            };
            let result = self.engine.deform(
                self.elapsed,
                self.pointer,
                original,
                &mut mesh.working,
                passes,
            );
            if let Err(e) = result {
                warn!("{}; skipping mesh this frame", e);
            }
        }
    }

    fn dispatch(&mut self, capturer: &mut dyn EnvironmentCapturer) {
        let events = self.director.update(0.0);
        self.react(events, capturer);
    }

    fn react(&mut self, events: Vec<DirectorEvent>, capturer: &mut dyn EnvironmentCapturer) {
        for event in events {
            match event {
                DirectorEvent::Swap { index } => {
                    let Some(scene) = self.director.scene(index) else {
                        continue;
                    };
                    self.effects.apply(&scene.effects);
                    self.presented = index;
                    if let Some(set) = self.representations.as_mut() {
                        if let Err(e) = set.set_visible(Representation::Default) {
                            warn!("{}", e);
                        }
                    }
                    self.environment
                        .request(capturer, index, &scene.environment_source);
                }
                DirectorEvent::Arrived { index } => {
                    debug!("Stage settled on scene {}", index);
                }
            }
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        let variant = self
            .representations
            .as_ref()
            .and_then(RepresentationSet::active_variant);
        FrameSnapshot {
            frame: self.frame,
            elapsed: self.elapsed,
            scene_id: &self.director.current().id,
            transitioning: self.director.is_transitioning(),
            camera: self.director.camera(),
            object: self.director.object(),
            flash: self.director.flash_intensity(),
            representation: self.representations.as_ref().and_then(|s| s.current()),
            material: variant.map(|v| v.material()),
            variant_rotation: variant.map_or(Vec3::ZERO, |v| v.rotation()),
            meshes: variant
                .map(|v| v.meshes().iter().map(|m| &m.working[..]).collect())
                .unwrap_or_default(),
            effects: &self.effects,
            environment: self.environment.current(),
        }
    }

    /// Scene whose preset and environment are live. Switches at the swap
    /// point, before the director arrives.
    pub fn presented_scene(&self) -> &Scene {
        self.director
            .scene(self.presented)
            .unwrap_or_else(|| self.director.current())
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn director(&self) -> &SceneDirector {
        &self.director
    }

    pub fn effects(&self) -> &EffectPresetController {
        &self.effects
    }

    pub fn environment(&self) -> &EnvironmentSlot {
        &self.environment
    }

    pub fn representations(&self) -> Option<&RepresentationSet> {
        self.representations.as_ref()
    }

    pub fn offsets(&self) -> &VertexOffsetBuffer {
        &self.offsets
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureOutcome, CaptureRequest};
    use crate::director::TransitionConfig;
    use crate::tween::Easing;
    use crossbeam_channel::Sender;
    use vignette_data::{EffectEntry, EffectPreset, MeshGeometry};

    /// Answers every request immediately with a texture named after the source.
    struct Instant;

    impl EnvironmentCapturer for Instant {
        fn request(&mut self, request: CaptureRequest, reply: Sender<CaptureOutcome>) {
            let texture = format!("env:{}", request.source);
            reply
                .send(CaptureOutcome {
                    ticket: request.ticket,
                    result: Ok(texture),
                })
                .unwrap();
        }
    }

    fn descriptor(id: &str, alternate: Option<&str>, effects: EffectPreset) -> SceneDescriptor {
        SceneDescriptor {
            id: id.to_string(),
            environment_source: format!("capture://{id}"),
            camera: CameraPose::default(),
            object: ObjectPose::default(),
            hover_representation: alternate.map(str::to_string),
            effects,
        }
    }

    fn stage() -> Stage {
        let mut glitchy = EffectPreset::new();
        glitchy.insert("glitch".into(), EffectEntry::enabled(true));
        let scenes = vec![
            descriptor("a", Some("neon"), EffectPreset::new()),
            descriptor("b", None, glitchy),
        ];
        let config = StageConfig {
            transition: TransitionConfig {
                duration: 0.5,
                easing: Easing::Linear,
                flourish: None,
            },
            ..StageConfig::default()
        };
        let mut stage = Stage::new(scenes, config).unwrap();
        stage.attach_model(&Model::new(vec![MeshGeometry::new(
            "m",
            vec![Vec3::new(0.1, 0.2, 0.3), Vec3::new(-0.4, 0.5, 0.0)],
        )]));
        stage
    }

    #[test]
    fn test_pointer_is_clamped() {
        let mut s = stage();
        s.handle(StageInput::PointerMoved(Vec2::new(3.0, -2.0)), &mut Instant);
        assert_eq!(s.pointer(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_select_toggles_to_scene_alternate() {
        let mut s = stage();
        s.handle(StageInput::Select("default".into()), &mut Instant);
        assert_eq!(s.snapshot().representation, Some(Representation::Neon));
        s.handle(StageInput::Select("neon".into()), &mut Instant);
        assert_eq!(s.snapshot().representation, Some(Representation::Default));
    }

    #[test]
    fn test_select_of_hidden_or_unknown_is_ignored() {
        let mut s = stage();
        s.handle(StageInput::Select("wireframe".into()), &mut Instant);
        s.handle(StageInput::Select("hologram".into()), &mut Instant);
        assert_eq!(s.snapshot().representation, Some(Representation::Default));
    }

    #[test]
    fn test_show_unknown_keeps_visibility() {
        let mut s = stage();
        s.handle(StageInput::Show("glitch".into()), &mut Instant);
        s.handle(StageInput::Show("sparkle".into()), &mut Instant);
        assert_eq!(s.snapshot().representation, Some(Representation::Glitch));
        assert_eq!(s.representations().unwrap().active_count(), 1);
    }

    #[test]
    fn test_step_swaps_preset_and_environment() {
        let mut s = stage();
        s.begin(&mut Instant);
        s.tick(0.016, &mut Instant);
        assert_eq!(s.snapshot().environment.unwrap().texture, "env:capture://a");

        s.handle(StageInput::Show("points".into()), &mut Instant);
        s.handle(StageInput::Step(StepDirection::Forward), &mut Instant);
        assert!(s.effects().is_enabled(crate::effects::EffectKind::Glitch));
        assert_eq!(s.snapshot().representation, Some(Representation::Default));
        assert_eq!(s.snapshot().scene_id, "a");

        s.tick(0.6, &mut Instant);
        let snap = s.snapshot();
        assert_eq!(snap.scene_id, "b");
        assert!(!snap.transitioning);
        assert_eq!(snap.environment.unwrap().scene_index, 1);
    }

    #[test]
    fn test_default_representation_is_not_deformed() {
        let mut s = stage();
        s.handle(StageInput::PointerMoved(Vec2::new(0.1, 0.2)), &mut Instant);
        s.tick(0.5, &mut Instant);
        let snap = s.snapshot();
        assert_eq!(snap.meshes[0][0], Vec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_points_deform_from_originals() {
        let mut s = stage();
        s.handle(StageInput::Show("points".into()), &mut Instant);
        for _ in 0..10 {
            s.tick(0.1, &mut Instant);
        }
        let set = s.representations().unwrap();
        let handle = set.variant(Representation::Points).unwrap().meshes()[0].handle;
        let original = s.offsets().get(handle).unwrap()[0];
        assert_eq!(original, Vec3::new(0.1, 0.2, 0.3));

        let working = s.snapshot().meshes[0][0];
        assert_ne!(working, original);
        // Idle amplitude, ripple and pointer strength bound the drift.
        assert!((working - original).length() < 0.2);
    }

    #[test]
    fn test_tick_without_model_is_harmless() {
        let mut s = Stage::new(
            vec![descriptor("a", None, EffectPreset::new())],
            StageConfig::default(),
        )
        .unwrap();
        s.tick(0.016, &mut Instant);
        let snap = s.snapshot();
        assert!(snap.representation.is_none());
        assert!(snap.meshes.is_empty());
    }
}
