//! Particula Synth - the oscillator bank that voices particle collisions
//!
//! Every collision becomes a short note: a sine/saw oscillator with a linear
//! attack and an exponential half-life decay, panned with an equal-power law
//! from the channel's last pan value. There is no sustain stage; voices ring
//! out and free themselves.
//!
//! # Core Components
//!
//! - [`PhaseOscillator`] / [`blend`] - radian phase accumulator and waveform blend
//! - [`DecayEnvelope`] / [`EnvelopeRates`] - attack ramp with half-life decay
//! - [`Voice`] / [`VoiceParams`] - one panned voice and the shared settings
//! - [`PolySynth`] / [`ParticleSynth`] - fixed voice bank with stealing
//!
//! ```rust
//! use particula_synth::{PolySynth, StealPolicy};
//!
//! let mut synth: PolySynth<16> = PolySynth::new(44100.0, 3);
//! synth.set_steal_policy(StealPolicy::Oldest);
//! synth.note_on(0, 60, 1.0);
//! synth.note_on(1, 67, 0.5);
//!
//! let mut left = vec![0.0f32; 256];
//! let mut right = vec![0.0f32; 256];
//! synth.render(&mut left, &mut right);
//! ```
//!
//! # no_std Support
//!
//! ```toml
//! [dependencies]
//! particula-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod envelope;
pub mod oscillator;
pub mod synth;
pub mod voice;

pub use envelope::{DecayEnvelope, EnvelopeRates, SILENCE_THRESHOLD};
pub use oscillator::{PhaseOscillator, blend, saw};
pub use synth::{CHANNELS, CHORUS_DEPTH, MAX_VOICES, ParticleSynth, PolySynth};
pub use voice::{HEADROOM, StealPolicy, Voice, VoiceParams};
