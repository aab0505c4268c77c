//! Block processor tying the particle field, scheduler and voice bank
//! together.
//!
//! [`ParticleEngine::process`] is the single real-time entry point. It
//! renders one block of stereo audio from a time-ordered list of input
//! note events, emitting the generated pan/note-on/note-off stream to an
//! [`EventSink`]. Within the block it walks from event to event, rendering
//! the voice bank in runs between them, so every input, physics step and
//! generated event lands on its exact sample.
//!
//! # Example
//!
//! ```rust
//! use particula_engine::{EngineSettings, Event, ParticleEngine};
//!
//! let mut engine = ParticleEngine::new(EngineSettings::default());
//! let mut left = vec![0.0f32; 512];
//! let mut right = vec![0.0f32; 512];
//! let mut generated = Vec::new();
//!
//! engine.process(&mut left, &mut right, &[Event::note_on(0, 60, 1.0)], &mut generated);
//! assert_eq!(engine.simulation().active_count(), 5);
//! ```

use std::sync::Arc;

use particula_core::{Simulation, db_to_linear};
use particula_synth::{ParticleSynth, StealPolicy, VoiceParams};

use crate::event::{Event, EventKind};
use crate::params::{EngineParams, ParamStore};
use crate::queue::DEFAULT_QUEUE_CAPACITY;
use crate::scheduler::{EventScheduler, SchedulerSettings};
use crate::snapshot::SnapshotPublisher;

/// Receiver for the generated event stream.
pub trait EventSink {
    /// Called once per generated event, in time order, with the event's
    /// time relative to the current block.
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

/// Discards every event.
impl EventSink for () {
    fn emit(&mut self, _event: Event) {}
}

/// Construction-time configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Samples between physics steps.
    pub step_interval: u32,
    /// Step interval the physics constants were tuned for.
    pub reference_interval: u32,
    /// Seconds between a generated note-on and its note-off.
    pub note_length: f32,
    /// Semitones added to a particle's note when it collides.
    pub collision_note_offset: i32,
    /// Seconds past a block end after which deferred events are dropped.
    pub event_horizon: f32,
    /// Event queue capacity.
    pub queue_capacity: usize,
    /// Seed for spawning and chorus detune.
    pub seed: u64,
    /// Which voice to take over when the bank is full.
    pub steal_policy: StealPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            step_interval: 256,
            reference_interval: 256,
            note_length: 0.1,
            collision_note_offset: particula_core::COLLISION_NOTE_OFFSET,
            event_horizon: 1.0,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            seed: 1,
            steal_policy: StealPolicy::Oldest,
        }
    }
}

impl EngineSettings {
    fn scheduler(&self) -> SchedulerSettings {
        SchedulerSettings {
            step_interval: self.step_interval,
            reference_interval: self.reference_interval,
            note_length: self.note_length,
            horizon: self.event_horizon,
            queue_capacity: self.queue_capacity,
        }
    }
}

/// Counters for silently absorbed conditions, read by the host between
/// blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Blocks processed.
    pub blocks: u64,
    /// Physics steps run.
    pub steps: u64,
    /// Collisions turned into events.
    pub collisions: u64,
    /// Spawns refused by a full particle pool.
    pub dropped_spawns: u64,
    /// Events refused by a full queue.
    pub queue_overflows: u64,
    /// Deferred events dropped beyond the horizon.
    pub horizon_drops: u64,
    /// Input or derived notes outside 0..=127.
    pub ignored_notes: u64,
    /// Voices taken over while still sounding.
    pub stolen_voices: u64,
}

/// The generative engine: particle field, event bridge and voice bank.
#[derive(Debug)]
pub struct ParticleEngine {
    settings: EngineSettings,
    sim: Simulation,
    synth: ParticleSynth,
    scheduler: EventScheduler,
    params: Arc<ParamStore>,
    applied: EngineParams,
    gain: f32,
    sample_rate: f32,
    blocks: u64,
    ignored_inputs: u64,
    snapshot: Option<SnapshotPublisher>,
}

impl ParticleEngine {
    /// Engine with default parameters.
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_params(settings, &EngineParams::default())
    }

    /// Engine starting from `params`.
    pub fn with_params(settings: EngineSettings, params: &EngineParams) -> Self {
        let mut sim = Simulation::new(settings.seed);
        sim.set_note_offset(settings.collision_note_offset);
        let mut synth = ParticleSynth::new(settings.sample_rate, settings.seed.rotate_left(32) ^ 0x5EED);
        synth.set_steal_policy(settings.steal_policy);

        let mut engine = Self {
            settings,
            sim,
            synth,
            scheduler: EventScheduler::new(settings.scheduler(), settings.sample_rate),
            params: Arc::new(ParamStore::from_params(params)),
            applied: *params,
            gain: 1.0,
            sample_rate: settings.sample_rate,
            blocks: 0,
            ignored_inputs: 0,
            snapshot: None,
        };
        engine.apply_pending();
        tracing::debug!(
            sample_rate = settings.sample_rate,
            step_interval = settings.step_interval,
            time_scale = engine.scheduler.time_scale(),
            "particle engine created"
        );
        engine
    }

    /// Construction settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Shared handle for setting parameters from other threads.
    pub fn param_store(&self) -> Arc<ParamStore> {
        Arc::clone(&self.params)
    }

    /// Parameters applied to the current block.
    pub fn params(&self) -> &EngineParams {
        &self.applied
    }

    /// Queue a full parameter set for the next block.
    pub fn set_params(&self, params: &EngineParams) {
        self.params.store(params);
    }

    /// Publish the particle field to `publisher` after every block.
    pub fn attach_snapshot(&mut self, publisher: SnapshotPublisher) {
        self.snapshot = Some(publisher);
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Change the sample rate between blocks, re-deriving note length,
    /// horizon and voice rates.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate == self.sample_rate {
            return;
        }
        self.sample_rate = sample_rate;
        self.synth.set_sample_rate(sample_rate);
        self.scheduler.set_sample_rate(sample_rate);
        tracing::debug!(sample_rate, "sample rate changed");
    }

    /// Apply parameters written to the store since the last block.
    ///
    /// Called automatically at the top of [`process`](Self::process).
    pub fn apply_pending(&mut self) {
        if let Some(params) = self.params.take_pending() {
            self.apply(&params);
        }
    }

    fn apply(&mut self, params: &EngineParams) {
        self.sim.set_multiplier(params.particle_multiplier);
        self.sim.set_gravity(f64::from(params.gravity));
        self.sim.set_origin(params.spawn_origin);
        self.sim.set_size_scale(f64::from(params.size_scale));
        self.sim.set_size_by_note(params.size_by_note);
        self.synth.set_params(VoiceParams {
            attack_time: params.attack_time,
            decay_half_life: params.decay_half_life,
            waveform: params.waveform,
        });
        self.gain = db_to_linear(params.master_gain);
        self.applied = *params;
    }

    /// Render one block.
    ///
    /// Both buffers are cleared and then filled; only the common length is
    /// rendered. `input` holds note-on/note-off events with block-relative
    /// times in `[0, len)`, in time order; later times are treated as the
    /// last sample. Generated events are passed to `sink` with
    /// block-relative times. A sample rate of zero produces silence.
    pub fn process<S: EventSink + ?Sized>(
        &mut self,
        left: &mut [f32],
        right: &mut [f32],
        input: &[Event],
        sink: &mut S,
    ) {
        left.fill(0.0);
        right.fill(0.0);
        self.apply_pending();

        let len = left.len().min(right.len());
        let Ok(block) = u32::try_from(len) else {
            return;
        };
        if block == 0 || self.sample_rate <= 0.0 {
            return;
        }
        let left = &mut left[..len];
        let right = &mut right[..len];
        let last = block - 1;

        let mut inputs = input.iter().peekable();
        let mut pos = 0u32;
        while pos < block {
            while let Some(event) = inputs.next_if(|e| e.time.min(last) <= pos) {
                self.dispatch_input(event);
            }

            if self.scheduler.samples_until_step() == 0 {
                self.scheduler.step(pos, &mut self.sim);
            }

            while let Some(event) = self.scheduler.pop_due(pos) {
                self.deliver(event, sink);
            }

            let mut next = block.min(pos.saturating_add(self.scheduler.samples_until_step()));
            if let Some(event) = inputs.peek() {
                next = next.min(event.time.min(last));
            }
            if let Some(time) = self.scheduler.next_event_time() {
                next = next.min(time);
            }
            let next = next.max(pos + 1);

            self.synth
                .render(&mut left[pos as usize..next as usize], &mut right[pos as usize..next as usize]);
            self.scheduler.elapse(next - pos);
            pos = next;
        }

        self.scheduler.end_block(block);

        if self.gain != 1.0 {
            for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                *l *= self.gain;
                *r *= self.gain;
            }
        }

        self.blocks += 1;
        if let Some(publisher) = &self.snapshot {
            publisher.publish(&self.sim, self.blocks);
        }
    }

    fn dispatch_input(&mut self, event: &Event) {
        match event.kind {
            EventKind::NoteOn { note, .. } | EventKind::NoteOff { note } if note > 127 => {
                self.ignored_inputs += 1;
            }
            EventKind::NoteOn { note, velocity } if velocity > 0.0 => {
                self.sim.note_on(note, velocity.min(1.0));
            }
            EventKind::NoteOn { note, .. } | EventKind::NoteOff { note } => {
                self.sim.release(note);
            }
            EventKind::Pan { .. } => {}
        }
    }

    fn deliver<S: EventSink + ?Sized>(&mut self, event: Event, sink: &mut S) {
        match event.kind {
            EventKind::NoteOn { note, velocity } => self.synth.note_on(event.channel, note, velocity),
            EventKind::NoteOff { note } => self.synth.note_off(event.channel, note),
            EventKind::Pan { value } => self.synth.set_pan(event.channel, value),
        }
        sink.emit(event);
    }

    /// Silence every voice, clear the field and drop every deferred event.
    pub fn reset(&mut self) {
        self.sim.clear();
        self.synth.reset();
        self.scheduler.reset();
    }

    /// Counters since construction.
    pub fn stats(&self) -> EngineStats {
        let sched = self.scheduler.stats();
        EngineStats {
            blocks: self.blocks,
            steps: sched.steps,
            collisions: sched.collisions,
            dropped_spawns: self.sim.dropped_spawns(),
            queue_overflows: sched.queue_overflows,
            horizon_drops: sched.horizon_drops,
            ignored_notes: sched.ignored_notes + self.ignored_inputs,
            stolen_voices: self.synth.stolen_voices(),
        }
    }

    /// The particle field.
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Mutable access to the particle field between blocks.
    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    /// The voice bank.
    pub fn synth(&self) -> &ParticleSynth {
        &self.synth
    }

    /// The event bridge.
    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }
}
