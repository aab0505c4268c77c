//! Fixed-size polyphonic voice bank.
//!
//! [`PolySynth`] owns `N` voices, the shared [`VoiceParams`] and the last pan
//! value received on each of the 16 channels. A note-on picks the first idle
//! voice (stealing per [`StealPolicy`] when all are busy), detunes it by a
//! random factor in `[0.995, 1.005]` and captures its channel's pan. Render
//! calls add every active voice into the given stereo slices; callers split
//! a block at event timestamps to keep triggers sample-accurate.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use particula_core::midi_to_freq;

use crate::envelope::EnvelopeRates;
use crate::voice::{StealPolicy, Voice, VoiceParams};

/// Default bank size.
pub const MAX_VOICES: usize = 128;

/// Channels with independent pan state.
pub const CHANNELS: usize = 16;

/// Largest relative deviation of the per-trigger detune.
pub const CHORUS_DEPTH: f32 = 0.005;

/// Default-size voice bank.
pub type ParticleSynth = PolySynth<MAX_VOICES>;

/// A bank of `N` sine/saw voices.
///
/// # Example
///
/// ```rust
/// use particula_synth::{ParticleSynth, VoiceParams};
///
/// let mut synth = ParticleSynth::new(48000.0, 1);
/// synth.set_params(VoiceParams { waveform: 0.5, ..VoiceParams::default() });
/// synth.set_pan(0, -0.5);
/// synth.note_on(0, 69, 0.8);
///
/// let mut left = [0.0f32; 512];
/// let mut right = [0.0f32; 512];
/// synth.render(&mut left, &mut right);
/// assert!(left.iter().any(|s| *s != 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct PolySynth<const N: usize> {
    voices: [Voice; N],
    params: VoiceParams,
    rates: EnvelopeRates,
    sample_rate: f32,
    channel_pan: [f32; CHANNELS],
    steal_policy: StealPolicy,
    age_counter: u64,
    stolen: u64,
    rng: SmallRng,
}

impl<const N: usize> PolySynth<N> {
    /// Create an idle bank. `seed` drives the chorus detune.
    pub fn new(sample_rate: f32, seed: u64) -> Self {
        let params = VoiceParams::default();
        Self {
            voices: core::array::from_fn(|_| Voice::new()),
            params,
            rates: EnvelopeRates::new(sample_rate, params.attack_time, params.decay_half_life),
            sample_rate,
            channel_pan: [0.0; CHANNELS],
            steal_policy: StealPolicy::default(),
            age_counter: 0,
            stolen: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Change the sample rate and re-derive every rate-dependent coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_rates();
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Replace the shared voice parameters.
    ///
    /// Sounding voices pick up the new attack, decay and waveform from the
    /// next rendered sample.
    pub fn set_params(&mut self, params: VoiceParams) {
        self.params = VoiceParams {
            waveform: params.waveform.clamp(0.0, 1.0),
            ..params
        };
        self.update_rates();
    }

    /// Shared voice parameters.
    pub fn params(&self) -> VoiceParams {
        self.params
    }

    /// Set how a voice is chosen when the bank is full.
    pub fn set_steal_policy(&mut self, policy: StealPolicy) {
        self.steal_policy = policy;
    }

    /// Current stealing policy.
    pub fn steal_policy(&self) -> StealPolicy {
        self.steal_policy
    }

    /// Record the pan for future notes on `channel` (`-1` left to `1` right).
    ///
    /// Voices already sounding keep their gains.
    pub fn set_pan(&mut self, channel: u8, pan: f32) {
        if let Some(slot) = self.channel_pan.get_mut(usize::from(channel)) {
            *slot = pan.clamp(-1.0, 1.0);
        }
    }

    /// Last pan received on `channel`.
    pub fn pan(&self, channel: u8) -> f32 {
        self.channel_pan
            .get(usize::from(channel))
            .copied()
            .unwrap_or(0.0)
    }

    /// Start a voice for `note` on `channel` at `velocity` in `[0, 1]`.
    ///
    /// A velocity of zero is a note-off.
    pub fn note_on(&mut self, channel: u8, note: u8, velocity: f32) {
        if velocity <= 0.0 || N == 0 {
            self.note_off(channel, note);
            return;
        }
        let idx = self.allocate_voice();
        let detune = 1.0 - CHORUS_DEPTH + 2.0 * CHORUS_DEPTH * self.rng.r#gen::<f32>();
        let pan = self.pan(channel);
        self.age_counter += 1;
        let voice = &mut self.voices[idx];
        voice.set_age(self.age_counter);
        voice.trigger(
            channel,
            note,
            midi_to_freq(note) * detune,
            velocity.min(1.0),
            pan,
            self.sample_rate,
        );
    }

    /// Release `note` on `channel`: matching voices tail off on their own.
    pub fn note_off(&mut self, channel: u8, note: u8) {
        for voice in self.matching(channel, note) {
            voice.release();
        }
    }

    /// Silence `note` on `channel` immediately.
    pub fn stop_note(&mut self, channel: u8, note: u8) {
        for voice in self.matching(channel, note) {
            voice.kill();
        }
    }

    /// Silence every voice immediately.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
    }

    /// Silence every voice and forget channel pans.
    pub fn reset(&mut self) {
        self.all_notes_off();
        self.channel_pan = [0.0; CHANNELS];
        self.age_counter = 0;
    }

    /// Number of voices.
    pub fn voice_count(&self) -> usize {
        N
    }

    /// Number of sounding voices.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Read access to all voices.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    /// Voices taken over while still sounding.
    pub fn stolen_voices(&self) -> u64 {
        self.stolen
    }

    /// Add every active voice into `left`/`right`.
    ///
    /// Both slices are rendered over their common length. Renders nothing
    /// when the sample rate is not positive.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        if self.sample_rate <= 0.0 {
            return;
        }
        let len = left.len().min(right.len());
        let (left, right) = (&mut left[..len], &mut right[..len]);
        for voice in &mut self.voices {
            voice.render(left, right, self.rates, self.params.waveform);
        }
    }

    fn matching(&mut self, channel: u8, note: u8) -> impl Iterator<Item = &mut Voice> {
        self.voices
            .iter_mut()
            .filter(move |v| v.is_active() && v.note() == note && v.channel() == channel)
    }

    fn update_rates(&mut self) {
        self.rates = EnvelopeRates::new(
            self.sample_rate,
            self.params.attack_time,
            self.params.decay_half_life,
        );
    }

    fn allocate_voice(&mut self) -> usize {
        if let Some(idx) = self.voices.iter().position(|v| !v.is_active()) {
            return idx;
        }
        self.stolen += 1;
        let victim = match self.steal_policy {
            StealPolicy::Oldest => self
                .voices
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| v.age())
                .map(|(i, _)| i),
            StealPolicy::Quietest => self
                .voices
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.level().total_cmp(&b.level()))
                .map(|(i, _)| i),
        };
        victim.unwrap_or(0)
    }
}
