//! One oscillator voice and the parameters shared by every voice.
//!
//! A voice owns a [`PhaseOscillator`], a [`DecayEnvelope`] and the stereo
//! gains captured when it was triggered. It frees itself once the envelope
//! decays below [`SILENCE_THRESHOLD`](crate::SILENCE_THRESHOLD).

use particula_core::equal_power_pan;

use crate::envelope::{DecayEnvelope, EnvelopeRates};
use crate::oscillator::{PhaseOscillator, blend};

/// Fixed output scaling applied to every voice.
pub const HEADROOM: f32 = 0.2;

/// Parameters shared by every voice in a bank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    /// Attack ramp length in seconds.
    pub attack_time: f32,
    /// Seconds for the level to halve.
    pub decay_half_life: f32,
    /// Sine (0) to saw (1) blend.
    pub waveform: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            attack_time: 0.01,
            decay_half_life: 0.05,
            waveform: 0.0,
        }
    }
}

/// Which voice to take over when the whole bank is busy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StealPolicy {
    /// Steal the voice triggered longest ago.
    #[default]
    Oldest,
    /// Steal the voice with the lowest current level.
    Quietest,
}

/// One polyphonic voice.
#[derive(Debug, Clone)]
pub struct Voice {
    osc: PhaseOscillator,
    env: DecayEnvelope,
    gains: (f32, f32),
    note: u8,
    channel: u8,
    age: u64,
    active: bool,
    released: bool,
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}

impl Voice {
    /// An idle voice.
    pub const fn new() -> Self {
        Self {
            osc: PhaseOscillator::new(),
            env: DecayEnvelope::new(),
            gains: (0.0, 0.0),
            note: 0,
            channel: 0,
            age: 0,
            active: false,
            released: false,
        }
    }

    /// Start `note` at `frequency` Hz with a panned, velocity-scaled envelope.
    pub fn trigger(
        &mut self,
        channel: u8,
        note: u8,
        frequency: f32,
        velocity: f32,
        pan: f32,
        sample_rate: f32,
    ) {
        self.osc.set_frequency(frequency, sample_rate);
        self.osc.reset();
        self.env.trigger(velocity);
        self.gains = equal_power_pan(pan);
        self.note = note;
        self.channel = channel;
        self.active = true;
        self.released = false;
    }

    /// Mark the note as released. The envelope keeps decaying untouched.
    pub fn release(&mut self) {
        self.released = true;
    }

    /// Stop immediately and free the voice.
    pub fn kill(&mut self) {
        self.env.kill();
        self.active = false;
        self.released = false;
    }

    /// Whether the voice is sounding.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a note-off has been received for the sounding note.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Note being played.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Channel the note arrived on.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Trigger order stamp used for stealing.
    pub fn age(&self) -> u64 {
        self.age
    }

    pub(crate) fn set_age(&mut self, age: u64) {
        self.age = age;
    }

    /// Current envelope level.
    pub fn level(&self) -> f32 {
        self.env.level()
    }

    /// Oscillator frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.osc.frequency()
    }

    /// `(left, right)` gains captured at trigger time.
    pub fn gains(&self) -> (f32, f32) {
        self.gains
    }

    /// Re-derive the phase increment after a sample-rate change.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.osc.update_increment(sample_rate);
    }

    /// Add this voice into `left`/`right`, sample by sample.
    ///
    /// Stops early and frees the voice when the level falls below the
    /// silence threshold.
    #[inline]
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32], rates: EnvelopeRates, waveform: f32) {
        if !self.active {
            return;
        }
        let (gain_l, gain_r) = self.gains;
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let phase = self.osc.next_phase();
            let sample = blend(phase, waveform) * self.env.advance(rates) * HEADROOM;
            *l += gain_l * sample;
            *r += gain_r * sample;
            if self.env.is_silent() {
                self.kill();
                return;
            }
        }
    }
}
