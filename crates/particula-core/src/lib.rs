//! Particula Core - particle physics for a collision-driven synthesizer
//!
//! This crate holds everything that moves: a fixed-capacity particle pool,
//! the integrator that steps it, the elastic collision pass that turns
//! contacts into performance data, and the spawn strategies that decide
//! where new particles appear. It runs on the audio thread, so nothing here
//! allocates after construction.
//!
//! # Building blocks
//!
//! - [`Vec2`] - 2-D vector arithmetic in `f64`
//! - [`Particle`] / [`ParticleView`] - slot state and its display copy
//! - [`SpawnOrigin`] - the four initial position/velocity distributions
//! - [`ParticleSimulation`] - the pool, integrator and collision pass
//! - [`Collision`] - `(note, intensity, pan)` reported per colliding particle
//!
//! ## Utilities
//!
//! - Gain and pan: [`db_to_linear`], [`linear_to_db`], [`equal_power_pan`]
//! - Envelopes: [`half_life_decay_factor`]
//! - Notes: [`midi_to_freq`], [`hue_for_note`], [`NoteName`]
//!
//! # no_std Support
//!
//! Disable the default `std` feature to use the crate on embedded targets:
//!
//! ```toml
//! [dependencies]
//! particula-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use particula_core::{Simulation, SpawnOrigin};
//!
//! let mut sim = Simulation::new(7);
//! sim.set_origin(SpawnOrigin::TopBand);
//! sim.set_gravity(1.0);
//! sim.note_on(48, 0.8);
//!
//! for _ in 0..1000 {
//!     sim.advance(1.0, |hit| {
//!         // forward hit.note / hit.intensity / hit.pan to a synth
//!         let _ = hit;
//!     });
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod math;
pub mod note;
pub mod particle;
pub mod simulation;
pub mod spawn;
pub mod vec2;

pub use math::{clamp_unit, db_to_linear, equal_power_pan, half_life_decay_factor, linear_to_db};
pub use note::{MAX_NOTE, NoteName, hue_for_note, is_valid_note, midi_to_freq};
pub use particle::{NEVER_COLLIDED, Particle, ParticleView, mass_for_note};
pub use simulation::{
    COLLISION_NOTE_OFFSET, Collision, MAX_PARTICLES, ParticleSimulation, Simulation,
    resolve_collision,
};
pub use spawn::{Domain, SpawnOrigin, UnknownOrigin};
pub use vec2::Vec2;
