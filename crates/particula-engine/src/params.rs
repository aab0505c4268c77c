//! Named, thread-safe engine parameters.
//!
//! Every user-facing control has a stable [`ParamId`] and a
//! [`ParamDescriptor`] carrying its display name, range, default and step.
//! A [`ParamStore`] holds the current values as `f32` bit patterns in
//! atomics so any thread can write them; the audio thread collects a whole
//! [`EngineParams`] snapshot with [`ParamStore::take_pending`] at the top of
//! a block, so a block never sees half of a multi-parameter change.
//!
//! # Example
//!
//! ```rust
//! use particula_engine::{ParamId, ParamStore};
//!
//! let store = ParamStore::new();
//! store.set_by_name("gravity", 2.5).unwrap();
//! assert_eq!(store.get(ParamId::Gravity), 2.5);
//!
//! let params = store.take_pending().unwrap();
//! assert_eq!(params.gravity, 2.5);
//! assert!(store.take_pending().is_none());
//! ```

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use particula_core::SpawnOrigin;
use thiserror::Error;

/// Number of parameters in the table.
pub const PARAM_COUNT: usize = 9;

/// Errors from the named-parameter layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    /// No parameter has this name.
    #[error("unknown parameter '{0}'")]
    UnknownName(String),

    /// NaN or infinite value.
    #[error("parameter '{name}' cannot be set to {value}")]
    NonFinite {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f32,
    },
}

/// Display unit for a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUnit {
    /// Decibels.
    Decibels,
    /// Seconds.
    Seconds,
    /// Plain number.
    None,
}

impl ParamUnit {
    /// Suffix appended when formatting a value.
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Decibels => " dB",
            Self::Seconds => " s",
            Self::None => "",
        }
    }
}

/// Metadata for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Stable snake_case name used in config files and on the command line.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Minimum value.
    pub min: f32,
    /// Maximum value.
    pub max: f32,
    /// Initial value.
    pub default: f32,
    /// Suggested increment.
    pub step: f32,
    /// Values are whole numbers.
    pub stepped: bool,
}

impl ParamDescriptor {
    /// Clamp `value` into range, rounding stepped parameters.
    pub fn clamp(&self, value: f32) -> f32 {
        let value = if self.stepped {
            value.round()
        } else {
            value
        };
        value.clamp(self.min, self.max)
    }

    /// Whether `value` lies within `[min, max]`.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Format `value` with its unit.
    pub fn format(&self, value: f32) -> String {
        if self.stepped {
            format!("{}{}", value as i64, self.unit.suffix())
        } else {
            format!("{:.3}{}", value, self.unit.suffix())
        }
    }
}

const fn continuous(
    name: &'static str,
    description: &'static str,
    unit: ParamUnit,
    min: f32,
    max: f32,
    default: f32,
    step: f32,
) -> ParamDescriptor {
    ParamDescriptor {
        name,
        description,
        unit,
        min,
        max,
        default,
        step,
        stepped: false,
    }
}

const fn stepped(
    name: &'static str,
    description: &'static str,
    min: f32,
    max: f32,
    default: f32,
) -> ParamDescriptor {
    ParamDescriptor {
        name,
        description,
        unit: ParamUnit::None,
        min,
        max,
        default,
        step: 1.0,
        stepped: true,
    }
}

/// Parameter table, indexed by [`ParamId`].
pub const PARAMS: [ParamDescriptor; PARAM_COUNT] = [
    stepped(
        "particle_multiplier",
        "particles spawned per note-on",
        1.0,
        20.0,
        5.0,
    ),
    continuous(
        "gravity",
        "downward acceleration",
        ParamUnit::None,
        -10.0,
        10.0,
        0.0,
        0.1,
    ),
    continuous(
        "attack_time",
        "voice attack ramp",
        ParamUnit::Seconds,
        0.001,
        1.0,
        0.01,
        0.001,
    ),
    continuous(
        "decay_half_life",
        "time for a voice to lose half its level",
        ParamUnit::Seconds,
        0.001,
        2.0,
        0.05,
        0.001,
    ),
    continuous(
        "master_gain",
        "output gain",
        ParamUnit::Decibels,
        -60.0,
        6.0,
        -6.0,
        0.5,
    ),
    continuous(
        "waveform",
        "sine (0) to saw (1) blend",
        ParamUnit::None,
        0.0,
        1.0,
        0.0,
        0.01,
    ),
    stepped(
        "spawn_origin",
        "0 corner-cluster, 1 uniform-interior, 2 ring-exterior, 3 top-band",
        0.0,
        3.0,
        1.0,
    ),
    continuous(
        "size_scale",
        "particle mass scale",
        ParamUnit::None,
        0.1,
        4.0,
        1.0,
        0.1,
    ),
    stepped("size_by_note", "mass follows pitch (1) or is fixed (0)", 0.0, 1.0, 1.0),
];

/// Stable parameter identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParamId {
    /// Particles spawned per note-on.
    ParticleMultiplier = 0,
    /// Gravity.
    Gravity = 1,
    /// Voice attack time in seconds.
    AttackTime = 2,
    /// Voice decay half-life in seconds.
    DecayHalfLife = 3,
    /// Master gain in dB.
    MasterGain = 4,
    /// Sine/saw blend.
    Waveform = 5,
    /// Spawn origin index.
    SpawnOrigin = 6,
    /// Mass scale.
    SizeScale = 7,
    /// Size-by-note toggle.
    SizeByNote = 8,
}

impl ParamId {
    /// All parameters in table order.
    pub const ALL: [ParamId; PARAM_COUNT] = [
        Self::ParticleMultiplier,
        Self::Gravity,
        Self::AttackTime,
        Self::DecayHalfLife,
        Self::MasterGain,
        Self::Waveform,
        Self::SpawnOrigin,
        Self::SizeScale,
        Self::SizeByNote,
    ];

    /// Table index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parameter for a table index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parameter with the given name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }

    /// Metadata.
    pub const fn descriptor(self) -> &'static ParamDescriptor {
        &PARAMS[self as usize]
    }

    /// Stable name.
    pub const fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A complete, typed set of parameter values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineParams {
    /// Particles spawned per note-on.
    pub particle_multiplier: u32,
    /// Gravity.
    pub gravity: f32,
    /// Voice attack time in seconds.
    pub attack_time: f32,
    /// Voice decay half-life in seconds.
    pub decay_half_life: f32,
    /// Master gain in dB.
    pub master_gain: f32,
    /// Sine (0) to saw (1) blend.
    pub waveform: f32,
    /// Where new particles appear.
    pub spawn_origin: SpawnOrigin,
    /// Mass scale.
    pub size_scale: f32,
    /// Whether mass follows pitch.
    pub size_by_note: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        let mut values = [0.0; PARAM_COUNT];
        for (v, d) in values.iter_mut().zip(PARAMS.iter()) {
            *v = d.default;
        }
        Self::from_values(&values)
    }
}

impl EngineParams {
    /// Build from raw values in table order, clamping each into range.
    pub fn from_values(values: &[f32; PARAM_COUNT]) -> Self {
        let v = |id: ParamId| id.descriptor().clamp(values[id.index()]);
        Self {
            particle_multiplier: v(ParamId::ParticleMultiplier) as u32,
            gravity: v(ParamId::Gravity),
            attack_time: v(ParamId::AttackTime),
            decay_half_life: v(ParamId::DecayHalfLife),
            master_gain: v(ParamId::MasterGain),
            waveform: v(ParamId::Waveform),
            spawn_origin: SpawnOrigin::from_index(v(ParamId::SpawnOrigin) as usize),
            size_scale: v(ParamId::SizeScale),
            size_by_note: v(ParamId::SizeByNote) >= 0.5,
        }
    }

    /// Raw values in table order.
    pub fn to_values(&self) -> [f32; PARAM_COUNT] {
        [
            self.particle_multiplier as f32,
            self.gravity,
            self.attack_time,
            self.decay_half_life,
            self.master_gain,
            self.waveform,
            self.spawn_origin.index() as f32,
            self.size_scale,
            if self.size_by_note { 1.0 } else { 0.0 },
        ]
    }

    /// Value of one parameter.
    pub fn get(&self, id: ParamId) -> f32 {
        self.to_values()[id.index()]
    }
}

/// Lock-free parameter storage shared between control and audio threads.
#[derive(Debug)]
pub struct ParamStore {
    values: [AtomicU32; PARAM_COUNT],
    dirty: AtomicBool,
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamStore {
    /// Store holding the defaults, marked dirty so the first block applies
    /// them.
    pub fn new() -> Self {
        Self::from_params(&EngineParams::default())
    }

    /// Store holding `params`, marked dirty.
    pub fn from_params(params: &EngineParams) -> Self {
        let values = params.to_values().map(|v| AtomicU32::new(v.to_bits()));
        Self {
            values,
            dirty: AtomicBool::new(true),
        }
    }

    /// Current value.
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Relaxed))
    }

    /// Set one parameter. The value is clamped into range; the stored value
    /// is returned.
    pub fn set(&self, id: ParamId, value: f32) -> Result<f32, ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NonFinite {
                name: id.name(),
                value,
            });
        }
        let clamped = id.descriptor().clamp(value);
        self.values[id.index()].store(clamped.to_bits(), Ordering::Relaxed);
        self.dirty.store(true, Ordering::Release);
        Ok(clamped)
    }

    /// Set a parameter by its stable name.
    pub fn set_by_name(&self, name: &str, value: f32) -> Result<f32, ParamError> {
        let id = ParamId::from_name(name).ok_or_else(|| ParamError::UnknownName(name.to_owned()))?;
        self.set(id, value)
    }

    /// Replace every value.
    pub fn store(&self, params: &EngineParams) {
        for (slot, v) in self.values.iter().zip(params.to_values()) {
            slot.store(v.to_bits(), Ordering::Relaxed);
        }
        self.dirty.store(true, Ordering::Release);
    }

    /// Current values as a typed snapshot.
    pub fn snapshot(&self) -> EngineParams {
        let values = core::array::from_fn(|i| f32::from_bits(self.values[i].load(Ordering::Relaxed)));
        EngineParams::from_values(&values)
    }

    /// Snapshot if anything changed since the last call.
    pub fn take_pending(&self) -> Option<EngineParams> {
        if self.dirty.swap(false, Ordering::Acquire) {
            Some(self.snapshot())
        } else {
            None
        }
    }
}
