//! Engine configuration file format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use particula_core::SpawnOrigin;
use particula_engine::{EngineParams, EngineSettings, ParamId};

use crate::error::{ConfigError, write_with_parents};
use crate::validation::{ValidationError, ValidationResult, collect, validate_param, validate_range};

/// A complete engine setup: construction settings plus parameter values.
///
/// Every field has a default, so an empty file is a valid configuration.
///
/// # TOML Format
///
/// ```toml
/// name = "Gas"
/// description = "Dense field, no gravity"
///
/// [engine]
/// sample_rate = 48000
/// block_size = 512
/// step_interval = 256
/// reference_interval = 256
/// note_length = 0.1
/// collision_note_offset = 33
/// event_horizon = 1.0
/// seed = 1
///
/// [params]
/// particle_multiplier = 5
/// gravity = 0.0
/// spawn_origin = "uniform-interior"
/// size_by_note = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Construction settings.
    pub engine: EngineSection,

    /// Parameter values.
    pub params: ParamsSection,
}

/// The `[engine]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSection {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per processing block.
    pub block_size: usize,
    /// Samples between physics steps.
    pub step_interval: u32,
    /// Interval the physics was tuned against.
    pub reference_interval: u32,
    /// Seconds between a generated note-on and its note-off.
    pub note_length: f32,
    /// Semitones added to a particle's note when it collides.
    pub collision_note_offset: i32,
    /// Seconds; deferred events beyond are dropped.
    pub event_horizon: f32,
    /// Seed for spawning and chorus detune.
    pub seed: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        let s = EngineSettings::default();
        Self {
            sample_rate: 48000,
            block_size: 512,
            step_interval: s.step_interval,
            reference_interval: s.reference_interval,
            note_length: s.note_length,
            collision_note_offset: s.collision_note_offset,
            event_horizon: s.event_horizon,
            seed: s.seed,
        }
    }
}

/// The `[params]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParamsSection {
    /// Particles spawned per note-on.
    pub particle_multiplier: u32,
    /// Gravity.
    pub gravity: f32,
    /// Voice attack in seconds.
    pub attack_time: f32,
    /// Voice decay half-life in seconds.
    pub decay_half_life: f32,
    /// Output gain in dB.
    pub master_gain: f32,
    /// Sine (0) to saw (1) blend.
    pub waveform: f32,
    /// Origin name, e.g. `"top-band"`.
    pub spawn_origin: String,
    /// Mass scale.
    pub size_scale: f32,
    /// Whether mass follows pitch.
    pub size_by_note: bool,
}

impl Default for ParamsSection {
    fn default() -> Self {
        Self::from(&EngineParams::default())
    }
}

impl From<&EngineParams> for ParamsSection {
    fn from(p: &EngineParams) -> Self {
        Self {
            particle_multiplier: p.particle_multiplier,
            gravity: p.gravity,
            attack_time: p.attack_time,
            decay_half_life: p.decay_half_life,
            master_gain: p.master_gain,
            waveform: p.waveform,
            spawn_origin: p.spawn_origin.name().to_string(),
            size_scale: p.size_scale,
            size_by_note: p.size_by_note,
        }
    }
}

impl ParamsSection {
    fn origin(&self) -> ValidationResult<SpawnOrigin> {
        self.spawn_origin
            .parse()
            .map_err(|_| ValidationError::InvalidFormat {
                param: ParamId::SpawnOrigin.name().to_string(),
                reason: format!(
                    "'{}' is not one of {}",
                    self.spawn_origin,
                    SpawnOrigin::ALL.map(SpawnOrigin::name).join(", ")
                ),
            })
    }

    /// Check every value against the parameter table.
    pub fn validate(&self) -> ValidationResult<()> {
        let numeric = [
            (ParamId::ParticleMultiplier, self.particle_multiplier as f32),
            (ParamId::Gravity, self.gravity),
            (ParamId::AttackTime, self.attack_time),
            (ParamId::DecayHalfLife, self.decay_half_life),
            (ParamId::MasterGain, self.master_gain),
            (ParamId::Waveform, self.waveform),
            (ParamId::SizeScale, self.size_scale),
        ];
        let mut errors: Vec<ValidationError> = numeric
            .into_iter()
            .filter_map(|(id, v)| validate_param(id.name(), v).err())
            .collect();
        if let Err(e) = self.origin() {
            errors.push(e);
        }
        collect(errors)
    }

    /// Typed engine parameters.
    pub fn to_engine_params(&self) -> ValidationResult<EngineParams> {
        Ok(EngineParams {
            particle_multiplier: self.particle_multiplier,
            gravity: self.gravity,
            attack_time: self.attack_time,
            decay_half_life: self.decay_half_life,
            master_gain: self.master_gain,
            waveform: self.waveform,
            spawn_origin: self.origin()?,
            size_scale: self.size_scale,
            size_by_note: self.size_by_note,
        })
    }
}

impl EngineSection {
    /// Check construction settings.
    pub fn validate(&self) -> ValidationResult<()> {
        let checks = [
            ("sample_rate", f64::from(self.sample_rate), 8000.0, 384_000.0),
            ("block_size", self.block_size as f64, 1.0, 65536.0),
            ("step_interval", f64::from(self.step_interval), 1.0, 65536.0),
            ("reference_interval", f64::from(self.reference_interval), 1.0, 65536.0),
            ("note_length", f64::from(self.note_length), 0.0, 10.0),
            ("collision_note_offset", f64::from(self.collision_note_offset), -127.0, 127.0),
            ("event_horizon", f64::from(self.event_horizon), 0.0, 60.0),
        ];
        collect(
            checks
                .into_iter()
                .filter_map(|(name, v, min, max)| validate_range(name, v, min, max).err())
                .collect(),
        )
    }

    /// Engine construction settings.
    pub fn to_settings(&self) -> EngineSettings {
        EngineSettings {
            sample_rate: self.sample_rate as f32,
            step_interval: self.step_interval,
            reference_interval: self.reference_interval,
            note_length: self.note_length,
            collision_note_offset: self.collision_note_offset,
            event_horizon: self.event_horizon,
            seed: self.seed,
            ..EngineSettings::default()
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save to a TOML file, creating the parent directory if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_with_parents(path.as_ref(), &self.to_toml()?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check both tables, reporting every problem found.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();
        for result in [self.engine.validate(), self.params.validate()] {
            match result {
                Ok(()) => {}
                Err(ValidationError::Multiple(v)) => errors.extend(v),
                Err(e) => errors.push(e),
            }
        }
        collect(errors)
    }

    /// Engine construction settings.
    pub fn settings(&self) -> EngineSettings {
        self.engine.to_settings()
    }

    /// Typed engine parameters.
    pub fn engine_params(&self) -> Result<EngineParams, ConfigError> {
        Ok(self.params.to_engine_params()?)
    }
}
