//! Scores: timed note lists that drive the engine offline or in real time.
//!
//! A score is converted once into a sorted list of input events stamped
//! with absolute sample positions; a [`ScoreCursor`] then slices that list
//! into block-relative events as blocks are processed.

use serde::{Deserialize, Serialize};
use std::path::Path;

use particula_engine::{Event, EventKind};

use crate::error::{ConfigError, write_with_parents};
use crate::validation::{ValidationResult, collect, validate_range};

/// Seconds rendered after the last note-off when no length is given.
pub const DEFAULT_TAIL: f64 = 2.0;

/// One note in a score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreNote {
    /// Start time in seconds.
    pub time: f64,
    /// Note number, 0..=127.
    pub note: u8,
    /// Velocity, 0..=1.
    #[serde(default = "default_velocity")]
    pub velocity: f32,
    /// Seconds until the note-off.
    #[serde(default = "default_duration")]
    pub duration: f64,
}

fn default_velocity() -> f32 {
    1.0
}

fn default_duration() -> f64 {
    1.0
}

/// A timed list of notes.
///
/// # TOML Format
///
/// ```toml
/// name = "Arpeggio"
/// length = 6.0
///
/// [[notes]]
/// time = 0.0
/// note = 48
/// velocity = 0.8
/// duration = 1.5
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Score {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Total length in seconds. Defaults to the last note-off plus
    /// [`DEFAULT_TAIL`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Notes in any order.
    #[serde(default)]
    pub notes: Vec<ScoreNote>,
}

/// An input event at an absolute sample position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent {
    /// Absolute sample position.
    pub sample: u64,
    /// The event; its `time` is filled in per block.
    pub event: Event,
}

impl Score {
    /// Load a score from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a score from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_with_parents(path.as_ref(), &toml::to_string_pretty(self)?)
    }

    /// Append a note.
    pub fn with_note(mut self, time: f64, note: u8, velocity: f32, duration: f64) -> Self {
        self.notes.push(ScoreNote {
            time,
            note,
            velocity,
            duration,
        });
        self
    }

    /// Check every note.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();
        for (i, n) in self.notes.iter().enumerate() {
            let checks = [
                ("time", n.time, 0.0, f64::MAX),
                ("note", f64::from(n.note), 0.0, 127.0),
                ("velocity", f64::from(n.velocity), 0.0, 1.0),
                ("duration", n.duration, 0.0, f64::MAX),
            ];
            for (field, v, min, max) in checks {
                if let Err(e) = validate_range(&format!("notes[{i}].{field}"), v, min, max) {
                    errors.push(e);
                }
            }
        }
        if let Some(length) = self.length
            && let Err(e) = validate_range("length", length, 0.0, f64::MAX)
        {
            errors.push(e);
        }
        collect(errors)
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.length.unwrap_or_else(|| {
            self.notes
                .iter()
                .map(|n| n.time + n.duration)
                .fold(0.0, f64::max)
                + DEFAULT_TAIL
        })
    }

    /// Length in samples at `sample_rate`.
    pub fn duration_samples(&self, sample_rate: f32) -> u64 {
        to_samples(self.duration(), sample_rate)
    }

    /// Note-on and note-off events in time order. At equal positions
    /// note-offs come first so a repeated note retriggers cleanly.
    ///
    /// A note's off lands at least one sample after its on, so a
    /// zero-length note still releases what it spawned.
    pub fn events(&self, sample_rate: f32) -> Vec<TimedEvent> {
        let mut events: Vec<TimedEvent> = self
            .notes
            .iter()
            .flat_map(|n| {
                let on = to_samples(n.time, sample_rate);
                let off = on + to_samples(n.duration, sample_rate).max(1);
                [
                    TimedEvent {
                        sample: on,
                        event: Event::note_on(0, n.note, n.velocity),
                    },
                    TimedEvent {
                        sample: off,
                        event: Event::note_off(0, n.note),
                    },
                ]
            })
            .collect();
        events.sort_by_key(|t| (t.sample, u8::from(matches!(t.event.kind, EventKind::NoteOn { .. }))));
        events
    }
}

fn to_samples(seconds: f64, sample_rate: f32) -> u64 {
    (seconds.max(0.0) * f64::from(sample_rate)).round() as u64
}

/// Walks a sorted event list block by block.
#[derive(Debug, Clone)]
pub struct ScoreCursor {
    events: Vec<TimedEvent>,
    next: usize,
}

impl ScoreCursor {
    /// Cursor over events sorted by sample.
    pub fn new(events: Vec<TimedEvent>) -> Self {
        Self { events, next: 0 }
    }

    /// Fill `out` with the events in `[start, start + len)`, timed relative
    /// to `start`. Events before `start` that were never taken are
    /// delivered at time 0.
    pub fn take_block(&mut self, start: u64, len: usize, out: &mut Vec<Event>) {
        out.clear();
        let end = start + len as u64;
        while let Some(t) = self.events.get(self.next) {
            if t.sample >= end {
                break;
            }
            out.push(Event {
                time: t.sample.saturating_sub(start) as u32,
                ..t.event
            });
            self.next += 1;
        }
    }

    /// Whether every event has been taken.
    pub fn is_finished(&self) -> bool {
        self.next >= self.events.len()
    }

    /// Start again from the first event.
    pub fn rewind(&mut self) {
        self.next = 0;
    }
}
