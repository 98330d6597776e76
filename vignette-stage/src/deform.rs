//! Per-vertex procedural deformation.
//!
//! Each transform is a pure function of the captured original position (plus
//! time or pointer) returning a delta. `DeformationEngine::deform` composes
//! them explicitly:
//!
//! `working = original + idle + ripple + warp`
//!
//! so the result never depends on what the working buffer held last frame.

use crate::StageError;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Idle oscillation parameters. The wave phase advances with time in
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleWave {
    pub amplitude: f32,
    pub speed: f32,
}

impl Default for IdleWave {
    fn default() -> Self {
        Self {
            amplitude: 0.03,
            speed: 0.002,
        }
    }
}

/// Pointer warp parameters. `radius` is measured in the XY plane of the
/// original positions, in the same units as the normalized pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerWarp {
    pub strength: f32,
    pub radius: f32,
}

impl Default for PointerWarp {
    fn default() -> Self {
        Self {
            strength: 0.06,
            radius: 0.2,
        }
    }
}

const RIPPLE_FREQUENCY: f32 = 2.0;
const RIPPLE_SPATIAL: f32 = 0.0005;
const RIPPLE_AMPLITUDE: f32 = 0.0002;

/// Idle displacement of vertex `vertex` at `time_ms`.
///
/// The phase uses the flat component index (`vertex * 3`), so neighbouring
/// vertices drift out of step with each other.
pub fn idle_wave_delta(vertex: usize, time_ms: f32, wave: &IdleWave) -> Vec3 {
    let offset = ((vertex * 3) as f32 + time_ms) * wave.speed;
    Vec3::new(offset.sin(), (offset * 1.1).sin(), (offset * 1.2).sin()) * wave.amplitude
}

/// Linear falloff from 1 at the pointer to 0 at `radius` and beyond.
pub fn pointer_influence(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / radius).max(0.0)
}

/// Pointer displacement for a vertex whose original position is `original`.
pub fn pointer_warp_delta(original: Vec3, pointer: Vec2, warp: &PointerWarp) -> Vec3 {
    let distance = original.truncate().distance(pointer);
    let influence = pointer_influence(distance, warp.radius);
    if influence == 0.0 {
        return Vec3::ZERO;
    }
    let k = influence * warp.strength;
    Vec3::new(pointer.x * k, pointer.y * k, (distance * 10.0).sin() * k)
}

/// Vertical ripple used by the point-cloud representation; `time` in seconds.
pub fn ripple_delta(original: Vec3, time: f32) -> Vec3 {
    Vec3::new(
        0.0,
        (time * RIPPLE_FREQUENCY + original.x * RIPPLE_SPATIAL).sin() * RIPPLE_AMPLITUDE,
        0.0,
    )
}

fn check_lengths(original: &[Vec3], working: &[Vec3]) -> Result<(), StageError> {
    if original.len() != working.len() {
        return Err(StageError::GeometryMismatch {
            expected: original.len(),
            actual: working.len(),
        });
    }
    Ok(())
}

/// `working = original + idle`. Resets the working buffer, so repeated calls
/// with the same time give the same result.
pub fn apply_idle_wave(
    time_ms: f32,
    original: &[Vec3],
    working: &mut [Vec3],
    wave: &IdleWave,
) -> Result<(), StageError> {
    check_lengths(original, working)?;
    for (i, (w, o)) in working.iter_mut().zip(original).enumerate() {
        *w = *o + idle_wave_delta(i, time_ms, wave);
    }
    Ok(())
}

/// `working += warp`. Cumulative across calls unless the caller resets first.
pub fn apply_pointer_warp(
    pointer: Vec2,
    original: &[Vec3],
    working: &mut [Vec3],
    warp: &PointerWarp,
) -> Result<(), StageError> {
    check_lengths(original, working)?;
    for (w, o) in working.iter_mut().zip(original) {
        *w += pointer_warp_delta(*o, pointer, warp);
    }
    Ok(())
}

/// Which deltas to layer on top of the original positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeformPasses {
    pub idle: bool,
    pub ripple: bool,
    pub warp: bool,
}

impl DeformPasses {
    pub const NONE: DeformPasses = DeformPasses {
        idle: false,
        ripple: false,
        warp: false,
    };

    pub fn any(&self) -> bool {
        self.idle || self.ripple || self.warp
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeformationEngine {
    pub idle: IdleWave,
    pub warp: PointerWarp,
}

impl DeformationEngine {
    pub fn new(idle: IdleWave, warp: PointerWarp) -> Self {
        Self { idle, warp }
    }

    /// Recompute `working` from `original` with the requested passes.
    ///
    /// `time` is elapsed seconds. With no passes the working buffer is reset
    /// to the original.
    pub fn deform(
        &self,
        time: f32,
        pointer: Vec2,
        original: &[Vec3],
        working: &mut [Vec3],
        passes: DeformPasses,
    ) -> Result<(), StageError> {
        check_lengths(original, working)?;
        let time_ms = time * 1000.0;
        for (i, (w, o)) in working.iter_mut().zip(original).enumerate() {
            let mut p = *o;
            if passes.idle {
                p += idle_wave_delta(i, time_ms, &self.idle);
            }
            if passes.ripple {
                p += ripple_delta(*o, time);
            }
            if passes.warp {
                p += pointer_warp_delta(*o, pointer, &self.warp);
            }
            *w = p;
        }
        Ok(())
    }
}
