//! The bridge between physics steps and sample-accurate events.
//!
//! The scheduler runs the physics every `step_interval` samples on a
//! free-running countdown that carries across blocks. Each collision
//! reported by a step becomes three events on one rotated channel: a pan
//! change and a note-on at the step's sample, and a note-off
//! `note_length` seconds later. Everything goes into one time-ordered
//! [`EventQueue`]; the engine pops what is due as it renders, and at the end
//! of a block [`end_block`](EventScheduler::end_block) rebases whatever is
//! left to the next block's origin, dropping events beyond the horizon.

use particula_core::{Collision, ParticleSimulation, is_valid_note};

use crate::channel::ChannelRotator;
use crate::event::Event;
use crate::queue::EventQueue;

/// Timing configuration for the bridge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerSettings {
    /// Samples between physics steps.
    pub step_interval: u32,
    /// Step interval the physics constants were tuned for.
    pub reference_interval: u32,
    /// Seconds between a generated note-on and its note-off.
    pub note_length: f32,
    /// Seconds past the block end after which deferred events are dropped.
    pub horizon: f32,
    /// Event queue capacity.
    pub queue_capacity: usize,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            step_interval: 256,
            reference_interval: 256,
            note_length: 0.1,
            horizon: 1.0,
            queue_capacity: crate::queue::DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Counters for conditions the real-time path absorbs silently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Physics steps run.
    pub steps: u64,
    /// Collisions turned into events.
    pub collisions: u64,
    /// Collisions whose derived note fell outside 0..=127.
    pub ignored_notes: u64,
    /// Events refused by a full queue.
    pub queue_overflows: u64,
    /// Deferred events dropped beyond the horizon.
    pub horizon_drops: u64,
}

/// Sample-accurate step clock, event synthesizer and deferred store.
#[derive(Debug, Clone)]
pub struct EventScheduler {
    settings: SchedulerSettings,
    queue: EventQueue,
    rotator: ChannelRotator,
    countdown: u32,
    note_duration: u32,
    horizon: u32,
    stats: SchedulerStats,
}

impl EventScheduler {
    /// Create a scheduler for `sample_rate`. The first step happens on the
    /// last sample of the first interval.
    pub fn new(settings: SchedulerSettings, sample_rate: f32) -> Self {
        let settings = SchedulerSettings {
            step_interval: settings.step_interval.max(1),
            reference_interval: settings.reference_interval.max(1),
            ..settings
        };
        let mut scheduler = Self {
            settings,
            queue: EventQueue::with_capacity(settings.queue_capacity),
            rotator: ChannelRotator::new(),
            countdown: settings.step_interval - 1,
            note_duration: 0,
            horizon: 0,
            stats: SchedulerStats::default(),
        };
        scheduler.set_sample_rate(sample_rate);
        scheduler
    }

    /// Re-derive the note duration and horizon in samples.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let rate = sample_rate.max(0.0);
        self.note_duration = (self.settings.note_length.max(0.0) * rate).round() as u32;
        self.horizon = (self.settings.horizon.max(0.0) * rate).round() as u32;
    }

    /// Active settings.
    pub fn settings(&self) -> SchedulerSettings {
        self.settings
    }

    /// Physics time per step in reference steps.
    pub fn time_scale(&self) -> f64 {
        f64::from(self.settings.step_interval) / f64::from(self.settings.reference_interval)
    }

    /// Note length in samples.
    pub fn note_duration(&self) -> u32 {
        self.note_duration
    }

    /// Horizon in samples.
    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    /// Samples from the current position until the next step; 0 means the
    /// current sample steps.
    pub fn samples_until_step(&self) -> u32 {
        self.countdown
    }

    /// Run one physics step at sample `pos` and queue the derived events.
    ///
    /// Restarts the countdown for the next step.
    pub fn step<const N: usize>(&mut self, pos: u32, sim: &mut ParticleSimulation<N>) {
        self.stats.steps += 1;
        sim.advance(self.time_scale(), |c| self.push_collision(pos, c));
        self.countdown = self.settings.step_interval;
    }

    /// Account for `samples` rendered since the last call.
    pub fn elapse(&mut self, samples: u32) {
        self.countdown = self.countdown.saturating_sub(samples);
    }

    /// Time of the earliest queued event.
    pub fn next_event_time(&self) -> Option<u32> {
        self.queue.peek_time()
    }

    /// Pop the earliest queued event at or before `pos`.
    pub fn pop_due(&mut self, pos: u32) -> Option<Event> {
        self.queue.pop_due(pos)
    }

    /// Queued events, in time order.
    pub fn pending(&self) -> impl Iterator<Item = &Event> {
        self.queue.iter()
    }

    /// Close a block of `block_len` samples: rebase the remaining events to
    /// the next block's origin and drop those beyond the horizon.
    pub fn end_block(&mut self, block_len: u32) {
        let dropped = self.queue.rebase(block_len, self.horizon);
        self.stats.horizon_drops += dropped as u64;
        self.stats.queue_overflows = self.queue.overflows();
    }

    /// Counters since construction.
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            queue_overflows: self.queue.overflows(),
            ..self.stats
        }
    }

    /// Drop every queued event and restart rotation and the step clock.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.rotator.reset();
        self.countdown = self.settings.step_interval - 1;
    }

    fn push_collision(&mut self, pos: u32, collision: Collision) {
        if !is_valid_note(collision.note) {
            self.stats.ignored_notes += 1;
            return;
        }
        self.stats.collisions += 1;
        let note = collision.note as u8;
        let channel = self.rotator.assign(note);
        let off_time = pos.saturating_add(self.note_duration);
        self.queue
            .push(Event::pan(pos, collision.pan.clamp(-1.0, 1.0)).on_channel(channel));
        self.queue
            .push(Event::note_on(pos, note, collision.intensity).on_channel(channel));
        self.queue
            .push(Event::note_off(off_time, note).on_channel(channel));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use particula_core::{Particle, Vec2};

    fn colliding_pair() -> ParticleSimulation<4> {
        let mut sim = ParticleSimulation::new(0);
        sim.insert(Particle::new(30, Vec2::new(300.0, 400.0), Vec2::new(2.0, 0.0), 4.0));
        sim.insert(Particle::new(40, Vec2::new(310.0, 400.0), Vec2::new(-2.0, 0.0), 1.0));
        sim
    }

    #[test]
    fn collision_becomes_pan_note_on_note_off() {
        let mut sched = EventScheduler::new(SchedulerSettings::default(), 1000.0);
        let mut sim = colliding_pair();
        sched.step(17, &mut sim);
        let events: Vec<Event> = sched.pending().copied().collect();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0].kind, EventKind::Pan { .. }));
        assert!(matches!(events[1].kind, EventKind::NoteOn { note: 63, .. }));
        assert_eq!(events[0].channel, events[1].channel);
        let off = events.iter().find(|e| matches!(e.kind, EventKind::NoteOff { note: 63 })).unwrap();
        assert_eq!(off.time, 17 + 100);
        assert_eq!(off.channel, events[0].channel);
    }

    #[test]
    fn out_of_range_notes_are_ignored() {
        let mut sched = EventScheduler::new(SchedulerSettings::default(), 1000.0);
        let mut sim = ParticleSimulation::<4>::new(0);
        sim.insert(Particle::new(120, Vec2::new(300.0, 400.0), Vec2::new(2.0, 0.0), 4.0));
        sim.insert(Particle::new(121, Vec2::new(310.0, 400.0), Vec2::new(-2.0, 0.0), 1.0));
        sched.step(0, &mut sim);
        assert!(sched.pending().next().is_none());
        assert_eq!(sched.stats().ignored_notes, 2);
    }

    #[test]
    fn time_scale_tracks_interval_ratio() {
        let sched = EventScheduler::new(
            SchedulerSettings {
                step_interval: 128,
                ..SchedulerSettings::default()
            },
            48_000.0,
        );
        assert_eq!(sched.time_scale(), 0.5);
        assert_eq!(sched.samples_until_step(), 127);
        assert_eq!(sched.note_duration(), 4800);
        assert_eq!(sched.horizon(), 48_000);
    }

    #[test]
    fn end_block_defers_and_drops() {
        let mut sched = EventScheduler::new(
            SchedulerSettings {
                note_length: 3.0,
                horizon: 1.0,
                ..SchedulerSettings::default()
            },
            100.0,
        );
        let mut sim = colliding_pair();
        sched.step(10, &mut sim);
        while sched.pop_due(63).is_some() {}
        sched.end_block(64);
        // note-offs at 310 rebase to 246, beyond the 100-sample horizon
        assert!(sched.pending().next().is_none());
        assert_eq!(sched.stats().horizon_drops, 2);
    }
}
