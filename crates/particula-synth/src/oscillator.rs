//! Phase-accumulating oscillator with a sine/saw blend.
//!
//! The phase runs in radians over `[0, TAU)`. The sawtooth is the phase
//! mapped linearly onto `[-1, 1)`, so the blend shares one phase with the
//! sine and stays continuous across frequency changes.

use core::f32::consts::TAU;
use libm::{floorf, sinf};

/// Euclidean remainder for f32, usable without std.
#[inline]
fn rem_euclid_f32(a: f32, b: f32) -> f32 {
    let r = a - b * floorf(a / b);
    if r < 0.0 { r + b } else { r }
}

/// Sawtooth for a phase in `[0, TAU)`: `2 * phase / TAU - 1`.
#[inline]
pub fn saw(phase: f32) -> f32 {
    2.0 * (phase / TAU) - 1.0
}

/// Linear blend between sine (`waveform = 0`) and saw (`waveform = 1`).
///
/// ```rust
/// use particula_synth::blend;
///
/// let p = core::f32::consts::FRAC_PI_2;
/// assert!((blend(p, 0.0) - 1.0).abs() < 1e-6);
/// assert!((blend(p, 1.0) - (-0.5)).abs() < 1e-6);
/// ```
#[inline]
pub fn blend(phase: f32, waveform: f32) -> f32 {
    (1.0 - waveform) * sinf(phase) + waveform * saw(phase)
}

/// Radian phase accumulator.
#[derive(Debug, Clone, Default)]
pub struct PhaseOscillator {
    phase: f32,
    increment: f32,
    frequency: f32,
}

impl PhaseOscillator {
    /// Oscillator at phase 0 with no frequency.
    pub const fn new() -> Self {
        Self {
            phase: 0.0,
            increment: 0.0,
            frequency: 0.0,
        }
    }

    /// Set frequency in Hz. A non-positive sample rate stops the phase.
    pub fn set_frequency(&mut self, frequency: f32, sample_rate: f32) {
        self.frequency = frequency.max(0.0);
        self.update_increment(sample_rate);
    }

    /// Re-derive the phase increment after a sample-rate change.
    pub fn update_increment(&mut self, sample_rate: f32) {
        self.increment = if sample_rate > 0.0 {
            self.frequency / sample_rate * TAU
        } else {
            0.0
        };
    }

    /// Frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Current phase in radians.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Advance one sample and return the new phase.
    #[inline]
    pub fn next_phase(&mut self) -> f32 {
        self.phase += self.increment;
        if self.phase >= TAU {
            // The increment can exceed a full turn above the sample rate.
            self.phase = rem_euclid_f32(self.phase, TAU);
            if self.phase >= TAU {
                self.phase = 0.0;
            }
        }
        self.phase
    }
}
