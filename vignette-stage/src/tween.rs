//! Easing curves and fixed-duration tweens.

use serde::{Deserialize, Serialize};

/// Shape of a tween's progress curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    /// power2.inOut
    QuadInOut,
    /// power3.inOut
    #[default]
    CubicInOut,
    /// Slight overshoot at both ends.
    BackInOut,
}

const BACK_OVERSHOOT: f32 = 1.70158;

impl Easing {
    /// Map linear progress `t` in `[0, 1]` onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::BackInOut => {
                let c = BACK_OVERSHOOT * 1.525;
                if t < 0.5 {
                    let x = 2.0 * t;
                    x * x * ((c + 1.0) * x - c) / 2.0
                } else {
                    let x = 2.0 * t - 2.0;
                    (x * x * ((c + 1.0) * x + c) + 2.0) / 2.0
                }
            }
        }
    }
}

/// Progress through a fixed duration, advanced by frame deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    /// Advance by `dt` seconds and return the eased progress.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    /// Linear progress in `[0, 1]`. Zero-length tweens are always complete.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    /// Eased progress.
    pub fn value(&self) -> f32 {
        self.easing.apply(self.progress())
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easings_hit_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::QuadInOut,
            Easing::CubicInOut,
            Easing::BackInOut,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at 1");
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-6, "{easing:?} at 0.5");
        }
    }

    #[test]
    fn test_back_overshoots() {
        assert!(Easing::BackInOut.apply(0.1) < 0.0);
        assert!(Easing::BackInOut.apply(0.9) > 1.0);
    }

    #[test]
    fn test_tween_finishes_after_duration() {
        let mut tween = Tween::new(1.0, Easing::Linear);
        assert!((tween.advance(0.25) - 0.25).abs() < 1e-6);
        assert!(!tween.is_finished());
        assert_eq!(tween.advance(5.0), 1.0);
        assert!(tween.is_finished());
    }

    #[test]
    fn test_zero_duration_is_complete() {
        let tween = Tween::new(0.0, Easing::CubicInOut);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), 1.0);
    }

    #[test]
    fn test_easing_names() {
        let e: Easing = serde_json::from_str("\"back-in-out\"").unwrap();
        assert_eq!(e, Easing::BackInOut);
    }
}
