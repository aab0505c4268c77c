//! Attack ramp plus half-life decay.
//!
//! Unlike an ADSR there is no sustain or release stage: the level starts at
//! the trigger velocity and halves every `decay_half_life` seconds, while a
//! linear attack ramp fades the start in. The ramp and the decay run
//! concurrently from the first sample.

use particula_core::half_life_decay_factor;

/// Level below which a voice is considered silent.
pub const SILENCE_THRESHOLD: f32 = 0.001;

/// Per-sample coefficients derived from the sample rate and envelope times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeRates {
    /// Added to the attack progress each sample.
    pub attack_increment: f32,
    /// Multiplies the level each sample.
    pub decay_factor: f32,
}

impl EnvelopeRates {
    /// Derive rates for `sample_rate`.
    ///
    /// A non-positive attack time gives an instant attack; a non-positive
    /// half-life or sample rate gives a decay factor of zero (silence).
    pub fn new(sample_rate: f32, attack_time: f32, decay_half_life: f32) -> Self {
        let attack_samples = sample_rate * attack_time;
        let attack_increment = if attack_samples > 1.0 && attack_samples.is_finite() {
            1.0 / attack_samples
        } else {
            1.0
        };
        Self {
            attack_increment,
            decay_factor: half_life_decay_factor(sample_rate, decay_half_life),
        }
    }
}

impl Default for EnvelopeRates {
    fn default() -> Self {
        Self::new(48_000.0, 0.01, 0.05)
    }
}

/// Envelope state for one voice.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecayEnvelope {
    level: f32,
    attack: f32,
}

impl DecayEnvelope {
    /// A silent envelope.
    pub const fn new() -> Self {
        Self {
            level: 0.0,
            attack: 0.0,
        }
    }

    /// Start from `velocity` with the attack ramp at zero.
    pub fn trigger(&mut self, velocity: f32) {
        self.level = velocity.max(0.0);
        self.attack = 0.0;
    }

    /// Drop to silence immediately.
    pub fn kill(&mut self) {
        self.level = 0.0;
    }

    /// Current decaying level, before the attack ramp.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Attack ramp progress; values above 1 are treated as 1.
    pub fn attack_progress(&self) -> f32 {
        self.attack
    }

    /// Whether the level has fallen below [`SILENCE_THRESHOLD`].
    pub fn is_silent(&self) -> bool {
        self.level < SILENCE_THRESHOLD
    }

    /// Gain for this sample, then step the ramp and the decay.
    #[inline]
    pub fn advance(&mut self, rates: EnvelopeRates) -> f32 {
        let gain = self.level * self.attack.min(1.0);
        self.level *= rates.decay_factor;
        if self.attack < 1.0 {
            self.attack += rates.attack_increment;
        }
        gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_ramps_linearly() {
        let rates = EnvelopeRates::new(1000.0, 0.01, 1000.0);
        let mut env = DecayEnvelope::default();
        env.trigger(1.0);
        let gains: [f32; 12] = core::array::from_fn(|_| env.advance(rates));
        assert_eq!(gains[0], 0.0);
        assert!((gains[5] - 0.5).abs() < 1e-3);
        assert!((gains[11] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn level_halves_after_half_life() {
        let rates = EnvelopeRates::new(48_000.0, 0.001, 0.05);
        let mut env = DecayEnvelope::default();
        env.trigger(0.8);
        for _ in 0..2400 {
            env.advance(rates);
        }
        assert!((env.level() - 0.4).abs() < 1e-3, "level {}", env.level());
    }

    #[test]
    fn degenerate_rates() {
        let rates = EnvelopeRates::new(48_000.0, 0.0, 0.0);
        assert_eq!(rates.attack_increment, 1.0);
        assert_eq!(rates.decay_factor, 0.0);

        let rates = EnvelopeRates::new(0.0, 0.01, 0.05);
        assert_eq!(rates.decay_factor, 0.0);
    }

    #[test]
    fn kill_is_silent() {
        let mut env = DecayEnvelope::default();
        env.trigger(1.0);
        assert!(!env.is_silent());
        env.kill();
        assert!(env.is_silent());
    }
}
