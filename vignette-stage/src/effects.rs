//! Post-processing preset control.
//!
//! The renderer owns the effect passes; this module only decides which are
//! enabled and with what parameters. Applying a preset always starts from the
//! canonical look, so nothing set by an earlier preset survives unless the new
//! one names it again.

use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};
use vignette_data::EffectPreset;

/// Known post-processing passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffectKind {
    Bloom,
    Pixel,
    Afterimage,
    Glitch,
    DepthOfField,
}

impl EffectKind {
    pub fn all() -> &'static [EffectKind] {
        &[
            EffectKind::Bloom,
            EffectKind::Pixel,
            EffectKind::Afterimage,
            EffectKind::Glitch,
            EffectKind::DepthOfField,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Bloom => "bloom",
            EffectKind::Pixel => "pixel",
            EffectKind::Afterimage => "afterimage",
            EffectKind::Glitch => "glitch",
            EffectKind::DepthOfField => "dof",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bloom" => Some(EffectKind::Bloom),
            "pixel" | "pixelate" => Some(EffectKind::Pixel),
            "afterimage" => Some(EffectKind::Afterimage),
            "glitch" => Some(EffectKind::Glitch),
            "dof" | "bokeh" => Some(EffectKind::DepthOfField),
            _ => None,
        }
    }

    /// Reset state. Bloom stays on at a low strength as the base look.
    fn canonical(self) -> EffectState {
        match self {
            EffectKind::Bloom => EffectState::with(
                true,
                &[("strength", 0.1), ("radius", 0.0), ("threshold", 0.0)],
            ),
            EffectKind::Pixel => EffectState::with(
                false,
                &[
                    ("pixel_size", 12.0),
                    ("normal_edge_strength", 2.0),
                    ("depth_edge_strength", 0.4),
                ],
            ),
            EffectKind::Afterimage => EffectState::with(false, &[("damp", 0.99)]),
            EffectKind::Glitch => EffectState::with(false, &[("wild", 0.0)]),
            EffectKind::DepthOfField => EffectState::with(
                false,
                &[("focus", 1.0), ("aperture", 0.025), ("max_blur", 0.01)],
            ),
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current configuration of one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectState {
    pub enabled: bool,
    pub params: BTreeMap<String, f32>,
}

impl EffectState {
    fn with(enabled: bool, params: &[(&str, f32)]) -> Self {
        Self {
            enabled,
            params: params.iter().map(|&(k, v)| (k.to_string(), v)).collect(),
        }
    }

    pub fn param(&self, name: &str) -> Option<f32> {
        self.params.get(name).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectPresetController {
    states: BTreeMap<EffectKind, EffectState>,
}

impl EffectPresetController {
    /// Create a controller at the default look.
    pub fn new() -> Self {
        Self {
            states: EffectKind::all()
                .iter()
                .map(|&kind| (kind, kind.canonical()))
                .collect(),
        }
    }

    /// Return every effect to its canonical state.
    pub fn reset(&mut self) {
        for (kind, state) in self.states.iter_mut() {
            *state = kind.canonical();
        }
    }

    /// Reset, then write only what `preset` names. Unknown effect and
    /// parameter names are skipped.
    pub fn apply(&mut self, preset: &EffectPreset) {
        self.reset();
        for (name, entry) in preset {
            let Some(kind) = EffectKind::from_name(name) else {
                warn!("Ignoring unknown effect '{}' in preset", name);
                continue;
            };
            let Some(state) = self.states.get_mut(&kind) else {
                continue;
            };
            if let Some(enabled) = entry.enabled {
                state.enabled = enabled;
            }
            for (param, &value) in &entry.params {
                match state.params.get_mut(param) {
                    Some(slot) => *slot = value,
                    None => warn!("Ignoring unknown parameter '{}.{}'", kind, param),
                }
            }
        }
        debug!("Applied effect preset with {} entries", preset.len());
    }

    pub fn state(&self, kind: EffectKind) -> &EffectState {
        // Every kind is inserted at construction and never removed.
        &self.states[&kind]
    }

    pub fn is_enabled(&self, kind: EffectKind) -> bool {
        self.state(kind).enabled
    }

    pub fn param(&self, kind: EffectKind, name: &str) -> Option<f32> {
        self.state(kind).param(name)
    }

    /// True when every effect matches its reset state.
    pub fn is_default(&self) -> bool {
        self.states.iter().all(|(kind, state)| *state == kind.canonical())
    }

    pub fn iter(&self) -> impl Iterator<Item = (EffectKind, &EffectState)> {
        self.states.iter().map(|(k, s)| (*k, s))
    }
}

impl Default for EffectPresetController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_data::EffectEntry;

    fn preset(entries: &[(&str, EffectEntry)]) -> EffectPreset {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_default_look() {
        let effects = EffectPresetController::new();
        assert!(effects.is_enabled(EffectKind::Bloom));
        assert_eq!(effects.param(EffectKind::Bloom, "strength"), Some(0.1));
        for kind in [
            EffectKind::Pixel,
            EffectKind::Afterimage,
            EffectKind::Glitch,
            EffectKind::DepthOfField,
        ] {
            assert!(!effects.is_enabled(kind));
        }
        assert!(effects.is_default());
    }

    #[test]
    fn test_reset_law() {
        let mut effects = EffectPresetController::new();
        effects.apply(&EffectPreset::new());
        effects.apply(&preset(&[("glitch", EffectEntry::enabled(true))]));
        assert!(effects.is_enabled(EffectKind::Glitch));
        effects.apply(&EffectPreset::new());
        assert!(effects.is_default());
    }

    #[test]
    fn test_absent_entries_fall_back_to_default() {
        let mut effects = EffectPresetController::new();
        effects.apply(&preset(&[
            ("afterimage", EffectEntry::enabled(true).with_param("damp", 0.8)),
            ("bloom", EffectEntry::default().with_param("strength", 1.5)),
        ]));
        assert_eq!(effects.param(EffectKind::Afterimage, "damp"), Some(0.8));
        assert_eq!(effects.param(EffectKind::Bloom, "strength"), Some(1.5));
        assert!(effects.is_enabled(EffectKind::Bloom));

        effects.apply(&preset(&[("dof", EffectEntry::enabled(true))]));
        assert!(!effects.is_enabled(EffectKind::Afterimage));
        assert_eq!(effects.param(EffectKind::Afterimage, "damp"), Some(0.99));
        assert_eq!(effects.param(EffectKind::Bloom, "strength"), Some(0.1));
        assert!(effects.is_enabled(EffectKind::DepthOfField));
    }

    #[test]
    fn test_unknown_names_do_not_fail_the_preset() {
        let mut effects = EffectPresetController::new();
        effects.apply(&preset(&[
            ("chromatic", EffectEntry::enabled(true)),
            ("pixel", EffectEntry::enabled(true).with_param("hue", 3.0)),
        ]));
        assert!(effects.is_enabled(EffectKind::Pixel));
        assert_eq!(effects.param(EffectKind::Pixel, "hue"), None);
    }

    #[test]
    fn test_bloom_can_be_disabled_explicitly() {
        let mut effects = EffectPresetController::new();
        effects.apply(&preset(&[("bloom", EffectEntry::enabled(false))]));
        assert!(!effects.is_enabled(EffectKind::Bloom));
        effects.apply(&EffectPreset::new());
        assert!(effects.is_enabled(EffectKind::Bloom));
    }
}
