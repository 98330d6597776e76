//! Input normalization and scripted playback.
//!
//! The stage only accepts discrete, already-normalized events. Continuous
//! wheel deltas go through [`WheelAdaptor`]; timed events come from an
//! [`InputScript`] file standing in for a live window.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::debug;
use vignette_stage::{StageInput, StepDirection};

/// Turns continuous wheel deltas into discrete steps.
///
/// Deltas accumulate until their magnitude reaches `threshold`, then one
/// step is emitted and the accumulator is cleared. Reversing direction
/// discards whatever had built up the other way.
#[derive(Debug, Clone, Copy)]
pub struct WheelAdaptor {
    threshold: f32,
    accumulated: f32,
}

impl WheelAdaptor {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.abs(),
            accumulated: 0.0,
        }
    }

    pub fn push(&mut self, delta: f32) -> Option<StepDirection> {
        if delta * self.accumulated < 0.0 {
            self.accumulated = 0.0;
        }
        self.accumulated += delta;
        if self.accumulated.abs() < self.threshold || self.accumulated == 0.0 {
            return None;
        }
        let step = StepDirection::from_sign(self.accumulated);
        self.accumulated = 0.0;
        step
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Pointer in normalized device coordinates.
    Pointer { x: f32, y: f32 },
    /// Raw wheel delta, fed through the adaptor.
    Wheel { delta: f32 },
    /// Representation name a click resolved to.
    Select { target: String },
    Show { representation: String },
}

impl ScriptEvent {
    /// Normalize into stage input. Wheel events below threshold yield nothing.
    pub fn into_input(self, wheel: &mut WheelAdaptor) -> Option<StageInput> {
        match self {
            ScriptEvent::Pointer { x, y } => Some(StageInput::PointerMoved(Vec2::new(x, y))),
            ScriptEvent::Wheel { delta } => wheel.push(delta).map(StageInput::Step),
            ScriptEvent::Select { target } => Some(StageInput::Select(target)),
            ScriptEvent::Show { representation } => Some(StageInput::Show(representation)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Seconds since start.
    pub at: f32,
    pub event: ScriptEvent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputScript {
    events: Vec<TimedEvent>,
    #[serde(skip)]
    cursor: usize,
}

const DEMO_SCRIPT: &str = include_str!("../assets/demo_script.json");

impl InputScript {
    pub fn new(mut events: Vec<TimedEvent>) -> Self {
        events.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { events, cursor: 0 }
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let script: InputScript = serde_json::from_str(text)?;
        Ok(Self::new(script.events))
    }

    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let script = Self::parse(&text)?;
        debug!("Loaded {} scripted events", script.len());
        Ok(script)
    }

    /// Script that tours every scene and representation.
    pub fn demo() -> Result<Self, serde_json::Error> {
        Self::parse(DEMO_SCRIPT)
    }

    /// Events scheduled at or before `time` that have not been taken yet.
    pub fn due(&mut self, time: f32) -> Vec<ScriptEvent> {
        let start = self.cursor;
        while self.cursor < self.events.len() && self.events[self.cursor].at <= time {
            self.cursor += 1;
        }
        self.events[start..self.cursor]
            .iter()
            .map(|e| e.event.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Time of the last event, zero for an empty script.
    pub fn duration(&self) -> f32 {
        self.events.last().map_or(0.0, |e| e.at)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }
}
