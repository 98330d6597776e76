//! Scene sequencing and timed transitions.
//!
//! The director walks a cyclic list of scenes. A step request starts one
//! transition that interpolates the camera and object poses towards the next
//! scene; further requests are dropped until it completes. With a flourish
//! configured, a brightness flash ramps up first, the scene swap happens at
//! its peak, and the flash decays while the poses move.

use crate::representation::Representation;
use crate::tween::{Easing, Tween};
use crate::StageError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vignette_data::{CameraPose, EffectPreset, ObjectPose, SceneDescriptor};

/// Discrete step from a wheel or scroll adaptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Forward,
    Backward,
}

impl StepDirection {
    pub fn offset(self) -> isize {
        match self {
            StepDirection::Forward => 1,
            StepDirection::Backward => -1,
        }
    }

    /// Direction of a signed amount, `None` for zero.
    pub fn from_sign(amount: f32) -> Option<Self> {
        if amount > 0.0 {
            Some(StepDirection::Forward)
        } else if amount < 0.0 {
            Some(StepDirection::Backward)
        } else {
            None
        }
    }
}

/// Runtime view of a scene descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: String,
    pub environment_source: String,
    pub camera: CameraPose,
    pub object: ObjectPose,
    /// Representation a selection toggles to from the default one.
    pub alternate: Option<Representation>,
    pub effects: EffectPreset,
}

impl Scene {
    pub fn from_descriptor(descriptor: SceneDescriptor) -> Self {
        let alternate = descriptor
            .hover_representation
            .as_deref()
            .and_then(|name| match name.parse::<Representation>() {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!("Scene '{}': {}", descriptor.id, e);
                    None
                }
            });
        Self {
            id: descriptor.id,
            environment_source: descriptor.environment_source,
            camera: descriptor.camera,
            object: descriptor.object,
            alternate,
            effects: descriptor.effects,
        }
    }
}

/// Brightness flash bracketing the scene swap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flourish {
    /// Seconds from zero to peak.
    pub rise: f32,
    /// Seconds from peak back to zero.
    pub fall: f32,
    pub peak: f32,
}

impl Default for Flourish {
    fn default() -> Self {
        Self {
            rise: 0.25,
            fall: 0.75,
            peak: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Seconds for the pose interpolation.
    pub duration: f32,
    pub easing: Easing,
    pub flourish: Option<Flourish>,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration: 1.5,
            easing: Easing::CubicInOut,
            flourish: None,
        }
    }
}

/// Something the stage must react to, emitted by `advance` and `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorEvent {
    /// The target scene's state should be swapped in now: effect preset,
    /// object visibility, environment capture. Emitted once per transition.
    Swap { index: usize },
    /// The transition finished and `index` is now current.
    Arrived { index: usize },
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    /// Flash ramping up; poses have not started moving.
    Rising(Tween),
    /// Poses interpolating, flash (if any) decaying.
    Moving { pose: Tween, fall: Option<Tween> },
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    target: usize,
    from_camera: CameraPose,
    from_object: ObjectPose,
    phase: Phase,
}

#[derive(Debug)]
pub struct SceneDirector {
    scenes: Vec<Scene>,
    current_index: usize,
    transition: Option<Transition>,
    config: TransitionConfig,
    camera: CameraPose,
    object: ObjectPose,
    flash: f32,
    events: Vec<DirectorEvent>,
}

impl SceneDirector {
    /// Start at the first scene, posed exactly on it.
    pub fn new(scenes: Vec<Scene>, config: TransitionConfig) -> Result<Self, StageError> {
        let first = scenes.first().ok_or(StageError::NoScenes)?;
        let camera = first.camera;
        let object = first.object;
        Ok(Self {
            scenes,
            current_index: 0,
            transition: None,
            config,
            camera,
            object,
            flash: 0.0,
            events: Vec::new(),
        })
    }

    pub fn from_descriptors(
        descriptors: Vec<SceneDescriptor>,
        config: TransitionConfig,
    ) -> Result<Self, StageError> {
        Self::new(
            descriptors.into_iter().map(Scene::from_descriptor).collect(),
            config,
        )
    }

    /// Begin a transition one step in `direction`. Returns false, doing
    /// nothing, while another transition is still running.
    pub fn advance(&mut self, direction: StepDirection) -> bool {
        if let Some(active) = &self.transition {
            debug!(
                "Step {:?} dropped: transition to scene {} in progress",
                direction, active.target
            );
            return false;
        }

        let n = self.scenes.len() as isize;
        let target = (self.current_index as isize + direction.offset()).rem_euclid(n) as usize;

        let phase = match self.config.flourish {
            Some(flourish) => Phase::Rising(Tween::new(flourish.rise, Easing::Linear)),
            None => {
                self.events.push(DirectorEvent::Swap { index: target });
                Phase::Moving {
                    pose: Tween::new(self.config.duration, self.config.easing),
                    fall: None,
                }
            }
        };

        info!(
            "Transition {} -> {} ('{}')",
            self.current_index, target, self.scenes[target].id
        );
        self.transition = Some(Transition {
            target,
            from_camera: self.camera,
            from_object: self.object,
            phase,
        });
        true
    }

    /// Step the running transition by `dt` seconds and hand back the events
    /// produced since the last call.
    pub fn update(&mut self, dt: f32) -> Vec<DirectorEvent> {
        if let Some(mut transition) = self.transition.take() {
            let finished = self.step(&mut transition, dt);
            if finished {
                self.finish(&transition);
            } else {
                self.transition = Some(transition);
            }
        }
        std::mem::take(&mut self.events)
    }

    fn step(&mut self, transition: &mut Transition, dt: f32) -> bool {
        let mut dt = dt;

        if let Phase::Rising(rise) = &mut transition.phase {
            let peak = self.config.flourish.map_or(0.0, |f| f.peak);
            let before = rise.duration() - rise.progress() * rise.duration();
            self.flash = peak * rise.advance(dt);
            if !rise.is_finished() {
                return false;
            }
            // Carry leftover frame time into the next phase.
            dt = (dt - before).max(0.0);
            self.events.push(DirectorEvent::Swap {
                index: transition.target,
            });
            transition.phase = Phase::Moving {
                pose: Tween::new(self.config.duration, self.config.easing),
                fall: self
                    .config
                    .flourish
                    .map(|f| Tween::new(f.fall, Easing::Linear)),
            };
        }

        let Phase::Moving { pose, fall } = &mut transition.phase else {
            return false;
        };

        let t = pose.advance(dt);
        let target = &self.scenes[transition.target];
        self.camera = transition.from_camera.lerp(&target.camera, t);
        self.object = transition.from_object.lerp(&target.object, t);

        let mut flash_done = true;
        if let Some(fall) = fall {
            let peak = self.config.flourish.map_or(0.0, |f| f.peak);
            self.flash = peak * (1.0 - fall.advance(dt));
            flash_done = fall.is_finished();
        }

        pose.is_finished() && flash_done
    }

    fn finish(&mut self, transition: &Transition) {
        let target = &self.scenes[transition.target];
        self.camera = target.camera;
        self.object = target.object;
        self.flash = 0.0;
        self.current_index = transition.target;
        self.events.push(DirectorEvent::Arrived {
            index: transition.target,
        });
        info!("Arrived at scene {} ('{}')", self.current_index, target.id);
    }

    /// Scene the director is settled on. Changes only when a transition
    /// completes.
    pub fn current(&self) -> &Scene {
        &self.scenes[self.current_index]
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Scene being transitioned to, if any.
    pub fn target(&self) -> Option<&Scene> {
        self.transition.as_ref().map(|t| &self.scenes[t.target])
    }

    pub fn target_index(&self) -> Option<usize> {
        self.transition.as_ref().map(|t| t.target)
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn camera(&self) -> CameraPose {
        self.camera
    }

    pub fn object(&self) -> ObjectPose {
        self.object
    }

    /// Flourish brightness, zero outside transitions.
    pub fn flash_intensity(&self) -> f32 {
        self.flash
    }

    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn scene(id: &str, x: f32) -> Scene {
        Scene {
            id: id.to_string(),
            environment_source: format!("capture://{id}"),
            camera: CameraPose::new(Vec3::new(x, 0.0, 5.0), Vec3::ZERO),
            object: ObjectPose::new(Vec3::new(0.0, x, 0.0), Vec3::ZERO, Vec3::ONE),
            alternate: None,
            effects: EffectPreset::new(),
        }
    }

    fn director(n: usize, config: TransitionConfig) -> SceneDirector {
        let scenes = (0..n).map(|i| scene(&format!("s{i}"), i as f32)).collect();
        SceneDirector::new(scenes, config).unwrap()
    }

    fn linear(duration: f32) -> TransitionConfig {
        TransitionConfig {
            duration,
            easing: Easing::Linear,
            flourish: None,
        }
    }

    #[test]
    fn test_empty_scene_list_is_rejected() {
        assert_eq!(
            SceneDirector::new(Vec::new(), TransitionConfig::default()).unwrap_err(),
            StageError::NoScenes
        );
    }

    #[test]
    fn test_backward_from_first_wraps_to_last() {
        let mut d = director(4, linear(0.5));
        assert!(d.advance(StepDirection::Backward));
        assert_eq!(d.target_index(), Some(3));
        d.update(1.0);
        assert_eq!(d.current_index(), 3);
    }

    #[test]
    fn test_forward_cycle_returns_to_start() {
        let mut d = director(3, linear(0.5));
        for _ in 0..3 {
            assert!(d.advance(StepDirection::Forward));
            d.update(0.5);
        }
        assert_eq!(d.current_index(), 0);
        assert!(!d.is_transitioning());
    }

    #[test]
    fn test_second_step_mid_transition_is_dropped() {
        let mut d = director(3, linear(1.0));
        assert!(d.advance(StepDirection::Forward));
        d.update(0.25);
        assert!(!d.advance(StepDirection::Forward));
        assert_eq!(d.target_index(), Some(1));
        d.update(1.0);
        assert_eq!(d.current_index(), 1);
    }

    #[test]
    fn test_poses_interpolate_linearly() {
        let mut d = director(2, linear(1.0));
        d.advance(StepDirection::Forward);
        d.update(0.25);
        assert!((d.camera().position.x - 0.25).abs() < 1e-6);
        assert!((d.object().position.y - 0.25).abs() < 1e-6);
        assert_eq!(d.current_index(), 0);
    }

    #[test]
    fn test_swap_emitted_at_start_without_flourish() {
        let mut d = director(2, linear(1.0));
        d.advance(StepDirection::Forward);
        assert_eq!(d.update(0.1), vec![DirectorEvent::Swap { index: 1 }]);
        assert_eq!(d.update(1.0), vec![DirectorEvent::Arrived { index: 1 }]);
        assert!(d.update(1.0).is_empty());
    }

    #[test]
    fn test_flourish_swaps_once_at_peak() {
        let config = TransitionConfig {
            duration: 1.0,
            easing: Easing::Linear,
            flourish: Some(Flourish {
                rise: 0.5,
                fall: 1.0,
                peak: 2.0,
            }),
        };
        let mut d = director(2, config);
        d.advance(StepDirection::Forward);

        assert!(d.update(0.25).is_empty());
        assert!((d.flash_intensity() - 1.0).abs() < 1e-6);
        assert_eq!(d.camera().position.x, 0.0);

        assert_eq!(d.update(0.25), vec![DirectorEvent::Swap { index: 1 }]);
        assert!((d.flash_intensity() - 2.0).abs() < 1e-6);

        assert!(d.update(0.5).is_empty());
        assert!((d.flash_intensity() - 1.0).abs() < 1e-6);
        assert!((d.camera().position.x - 0.5).abs() < 1e-6);

        assert_eq!(d.update(0.5), vec![DirectorEvent::Arrived { index: 1 }]);
        assert_eq!(d.flash_intensity(), 0.0);
        assert_eq!(d.current_index(), 1);
    }

    #[test]
    fn test_unknown_alternate_is_dropped() {
        let descriptor = SceneDescriptor {
            id: "x".into(),
            environment_source: "capture://x".into(),
            camera: CameraPose::default(),
            object: ObjectPose::default(),
            hover_representation: Some("hologram".into()),
            effects: EffectPreset::new(),
        };
        assert_eq!(Scene::from_descriptor(descriptor).alternate, None);
    }
}
