//! `Animate` tracks.
//!
//! Each object owns at most one track: an ordered queue of steps played
//! one after another on [`Bridge::tick`](crate::Bridge::tick). A new
//! `Animate` message replaces the running track.
//!
//! ```text
//! { "path": "transform/position", "to": {"x": 0, "y": 5, "z": 0},
//!   "duration": 0.5, "delay": 0.1, "ease": "easeOut", "emit": "Arrived" }
//! ```
//!
//! Numeric leaves (numbers, objects and equal-length arrays of numbers)
//! are interpolated. Anything else snaps to `to` when the step finishes.
//! The start value is sampled when the step begins, after its delay.

use scenebridge_event::{value_kind, EventError};
use scenebridge_object::number;
use scenebridge_types::ObjectId;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};

/// Easing curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ease {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Ease {
    /// Maps linear progress `t` in `[0, 1]` onto the curve.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// One step of an `Animate` message. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationStep {
    pub path: String,
    pub to: Value,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub ease: Ease,
    /// Event emitted from the object when the step finishes.
    #[serde(default)]
    pub emit: Option<String>,
}

impl AnimationStep {
    /// Parses the `data` array of an `Animate` message.
    ///
    /// # Errors
    ///
    /// [`EventError::InvalidField`] naming the first malformed step.
    pub fn parse_all(data: &Value) -> Result<Vec<Self>, EventError> {
        let Value::Array(items) = data else {
            return Err(EventError::invalid_field("data", "array", value_kind(data)));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                serde_json::from_value(item.clone())
                    .map_err(|e| EventError::invalid_field(format!("data[{i}]"), "animation step", e.to_string()))
            })
            .collect()
    }

    /// Prefixes the step's path with a subject path.
    #[must_use]
    pub fn rooted_at(mut self, subject: &str) -> Self {
        if !subject.is_empty() {
            self.path = if self.path.is_empty() {
                subject.to_string()
            } else {
                format!("{subject}/{}", self.path)
            };
        }
        self
    }
}

/// A value to write this tick.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Frame {
    pub object: ObjectId,
    pub path: String,
    pub value: Value,
    /// Set on the frame that finishes a step with `emit`.
    pub emit: Option<String>,
}

#[derive(Debug)]
struct Running {
    step: AnimationStep,
    from: Option<Value>,
    elapsed: f64,
}

#[derive(Debug, Default)]
struct Track {
    queued: VecDeque<AnimationStep>,
    current: Option<Running>,
}

#[derive(Debug, Default)]
pub(crate) struct Animations {
    tracks: BTreeMap<ObjectId, Track>,
}

impl Animations {
    /// Replaces the track of `id`.
    pub(crate) fn start(&mut self, id: ObjectId, steps: Vec<AnimationStep>) {
        if steps.is_empty() {
            self.tracks.remove(&id);
            return;
        }
        self.tracks.insert(
            id,
            Track {
                queued: steps.into(),
                current: None,
            },
        );
    }

    pub(crate) fn cancel(&mut self, id: &ObjectId) {
        self.tracks.remove(id);
    }

    pub(crate) fn is_animating(&self, id: &ObjectId) -> bool {
        self.tracks.contains_key(id)
    }

    /// Advances every track by `dt` seconds.
    ///
    /// `sample` reads a step's start value the first time the step is
    /// active. Finished tracks are dropped.
    pub(crate) fn advance(
        &mut self,
        dt: f64,
        mut sample: impl FnMut(&ObjectId, &str) -> Option<Value>,
    ) -> Vec<Frame> {
        let mut frames = Vec::new();
        for (id, track) in &mut self.tracks {
            advance_track(id, track, dt.max(0.0), &mut sample, &mut frames);
        }
        self.tracks
            .retain(|_, t| t.current.is_some() || !t.queued.is_empty());
        frames
    }
}

fn advance_track(
    id: &ObjectId,
    track: &mut Track,
    dt: f64,
    sample: &mut impl FnMut(&ObjectId, &str) -> Option<Value>,
    frames: &mut Vec<Frame>,
) {
    let mut budget = dt;
    loop {
        let running = match track.current.as_mut() {
            Some(running) => running,
            None => match track.queued.pop_front() {
                Some(step) => track.current.insert(Running {
                    step,
                    from: None,
                    elapsed: 0.0,
                }),
                None => return,
            },
        };

        running.elapsed += budget;
        budget = 0.0;
        if running.elapsed < running.step.delay {
            return;
        }

        let from = running
            .from
            .get_or_insert_with(|| sample(id, &running.step.path).unwrap_or(Value::Null))
            .clone();
        let active = running.elapsed - running.step.delay;
        let t = if running.step.duration <= 0.0 {
            1.0
        } else {
            (active / running.step.duration).min(1.0)
        };
        let finished = t >= 1.0;
        frames.push(Frame {
            object: id.clone(),
            path: running.step.path.clone(),
            value: interpolate(&from, &running.step.to, running.step.ease.apply(t), finished),
            emit: if finished { running.step.emit.clone() } else { None },
        });

        if !finished {
            return;
        }
        budget = (active - running.step.duration.max(0.0)).max(0.0);
        track.current = None;
    }
}

/// Interpolates numeric leaves; everything else holds `from` until done.
fn interpolate(from: &Value, to: &Value, t: f64, finished: bool) -> Value {
    if finished {
        return to.clone();
    }
    match (from, to) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => number(a + (b - a) * t),
            _ => from.clone(),
        },
        (Value::Object(a), Value::Object(b)) if b.keys().all(|k| a.contains_key(k)) => {
            let mut out: Map<String, Value> = a.clone();
            for (key, target) in b {
                if let Some(start) = a.get(key) {
                    out.insert(key.clone(), interpolate(start, target, t, false));
                }
            }
            Value::Object(out)
        }
        (Value::Array(a), Value::Array(b)) if a.len() == b.len() => Value::Array(
            a.iter()
                .zip(b)
                .map(|(start, target)| interpolate(start, target, t, false))
                .collect(),
        ),
        _ => from.clone(),
    }
}
