//! Configuration, scores and scenes for the particula engine.
//!
//! # Features
//!
//! - **Engine config**: `[engine]` construction settings and `[params]`
//!   values in one TOML file, every field optional
//! - **Scores**: timed `[[notes]]` lists converted to sample-accurate input
//!   events
//! - **Validation**: ranges checked against the engine's parameter table
//! - **Factory scenes**: built-in configs (`gas`, `rain`, `burst`,
//!   `orbit-ring`)
//!
//! # Example
//!
//! ```rust
//! use particula_config::{EngineConfig, get_factory_scene};
//! use particula_engine::ParticleEngine;
//!
//! let config = get_factory_scene("rain").unwrap();
//! config.validate().unwrap();
//! let engine = ParticleEngine::with_params(config.settings(), &config.engine_params().unwrap());
//! assert_eq!(engine.params().gravity, 2.0);
//! ```

mod config;
mod error;
mod score;

/// Factory scenes bundled with the library.
pub mod scenes;

/// Range and format validation.
pub mod validation;

pub use config::{EngineConfig, EngineSection, ParamsSection};
pub use error::ConfigError;
pub use scenes::{FACTORY_SCENE_NAMES, factory_scenes, get_factory_scene, is_factory_scene};
pub use score::{DEFAULT_TAIL, Score, ScoreCursor, ScoreNote, TimedEvent};
pub use validation::{
    ValidationError, ValidationResult, parse_param_value, validate_param, validate_range,
};
