//! Integration tests for the particula-engine block processor.
//!
//! Covers deferred events across block boundaries, channel rotation,
//! horizon drops, parameter delivery from another thread, snapshot
//! publishing and interval-independent physics.

use particula_core::{Particle, Simulation, Vec2, db_to_linear};
use particula_engine::{
    EngineParams, EngineSettings, Event, EventKind, EventScheduler, ParamId, ParticleEngine,
    SchedulerSettings, SnapshotPublisher,
};

fn settings(sample_rate: f32) -> EngineSettings {
    EngineSettings {
        sample_rate,
        ..EngineSettings::default()
    }
}

/// A 4:1 pair on a head-on course that collides on the first step.
fn insert_pair(sim: &mut Simulation) {
    sim.insert(Particle::new(30, Vec2::new(300.0, 400.0), Vec2::new(2.0, 0.0), 4.0));
    sim.insert(Particle::new(40, Vec2::new(310.0, 400.0), Vec2::new(-2.0, 0.0), 1.0));
}

fn process_block(engine: &mut ParticleEngine, len: usize, input: &[Event]) -> (Vec<f32>, Vec<Event>) {
    let mut left = vec![0.0; len];
    let mut right = vec![0.0; len];
    let mut out = Vec::new();
    engine.process(&mut left, &mut right, input, &mut out);
    (left, out)
}

fn note_offs(events: &[Event]) -> Vec<&Event> {
    events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::NoteOff { .. }))
        .collect()
}

// ============================================================================
// 1. Deferred events
// ============================================================================

#[test]
fn note_off_crossing_block_boundary_fires_once() {
    // 1 kHz: first step at sample 255, note-offs 100 samples later
    let mut engine = ParticleEngine::new(settings(1000.0));
    insert_pair(engine.simulation_mut());

    let (_, first) = process_block(&mut engine, 300, &[]);
    assert_eq!(first.len(), 4, "pan + note-on per particle");
    assert!(first.iter().all(|e| e.time == 255));
    assert!(note_offs(&first).is_empty());

    let (_, second) = process_block(&mut engine, 300, &[]);
    let offs = note_offs(&second);
    assert_eq!(offs.len(), 2);
    assert!(offs.iter().all(|e| e.time == 55));

    // note-offs pair with the note-ons' channels
    for off in &offs {
        assert!(
            first
                .iter()
                .any(|on| on.note() == off.note() && on.channel == off.channel)
        );
    }

    let (_, third) = process_block(&mut engine, 300, &[]);
    assert!(note_offs(&third).is_empty());
    assert_eq!(engine.stats().horizon_drops, 0);
}

#[test]
fn events_beyond_horizon_are_dropped() {
    let mut engine = ParticleEngine::new(EngineSettings {
        sample_rate: 1000.0,
        note_length: 2.0,
        event_horizon: 0.5,
        ..EngineSettings::default()
    });
    insert_pair(engine.simulation_mut());

    let (_, first) = process_block(&mut engine, 256, &[]);
    assert_eq!(first.len(), 4);
    for _ in 0..10 {
        let (_, later) = process_block(&mut engine, 256, &[]);
        assert!(note_offs(&later).is_empty());
    }
    assert_eq!(engine.stats().horizon_drops, 2);
}

#[test]
fn voices_sound_after_collision() {
    let mut engine = ParticleEngine::new(settings(1000.0));
    insert_pair(engine.simulation_mut());
    let (left, _) = process_block(&mut engine, 512, &[]);
    assert!(left[..255].iter().all(|s| *s == 0.0));
    assert!(left[256..].iter().any(|s| s.abs() > 1e-4));
    assert_eq!(engine.stats().collisions, 2);
}

// ============================================================================
// 2. Channel rotation
// ============================================================================

#[test]
fn repeated_collisions_of_one_note_rotate_channels() {
    let mut sched = EventScheduler::new(SchedulerSettings::default(), 1000.0);
    let mut channels = Vec::new();
    for k in 0..20 {
        let mut sim = Simulation::new(0);
        insert_pair(&mut sim);
        sched.step(k, &mut sim);
        while let Some(event) = sched.pop_due(k) {
            if let EventKind::NoteOn { note: 63, .. } = event.kind {
                channels.push(event.channel);
            }
        }
    }
    let expected: Vec<u8> = (0..20).map(|k| (k % 16) as u8).collect();
    assert_eq!(channels, expected);
}

// ============================================================================
// 3. Parameters
// ============================================================================

#[test]
fn params_set_from_another_thread_apply_next_block() {
    let mut engine = ParticleEngine::new(settings(48000.0));
    let store = engine.param_store();
    std::thread::spawn(move || {
        store.set_by_name("particle_multiplier", 3.0).unwrap();
        store.set_by_name("gravity", -2.0).unwrap();
    })
    .join()
    .unwrap();

    process_block(&mut engine, 64, &[Event::note_on(0, 50, 1.0)]);
    assert_eq!(engine.params().particle_multiplier, 3);
    assert_eq!(engine.simulation().gravity(), -2.0);
    assert_eq!(engine.simulation().active_count(), 3);
}

#[test]
fn master_gain_scales_output() {
    let render = |gain_db: f32| {
        let params = EngineParams {
            master_gain: gain_db,
            ..EngineParams::default()
        };
        let mut engine = ParticleEngine::with_params(settings(1000.0), &params);
        insert_pair(engine.simulation_mut());
        let (left, _) = process_block(&mut engine, 512, &[]);
        left.iter().map(|s| s.abs()).sum::<f32>()
    };
    let unity = render(0.0);
    let quiet = render(-12.0);
    assert!(unity > 0.0);
    let ratio = quiet / unity;
    assert!((ratio - db_to_linear(-12.0)).abs() < 1e-3, "ratio {ratio}");
}

#[test]
fn param_store_rejects_unknown_names() {
    let engine = ParticleEngine::new(settings(48000.0));
    assert!(engine.param_store().set_by_name("reverb", 1.0).is_err());
    assert_eq!(ParamId::from_name("waveform"), Some(ParamId::Waveform));
}

// ============================================================================
// 4. Physics timing
// ============================================================================

#[test]
fn step_interval_does_not_change_motion() {
    let run = |interval: u32| {
        let mut engine = ParticleEngine::new(EngineSettings {
            sample_rate: 1000.0,
            step_interval: interval,
            reference_interval: 256,
            ..EngineSettings::default()
        });
        engine
            .simulation_mut()
            .insert(Particle::new(60, Vec2::new(300.0, 300.0), Vec2::new(2.0, 1.0), 1.0));
        process_block(&mut engine, 512, &[]);
        engine.simulation().particles().next().map(|p| p.position())
    };
    let coarse = run(256).unwrap();
    let fine = run(128).unwrap();
    assert_eq!(coarse, fine);
    assert_eq!(coarse, Vec2::new(304.0, 302.0));
}

#[test]
fn sample_rate_change_rederives_note_length() {
    let mut engine = ParticleEngine::new(settings(1000.0));
    assert_eq!(engine.scheduler().note_duration(), 100);
    engine.set_sample_rate(2000.0);
    assert_eq!(engine.scheduler().note_duration(), 200);
    assert_eq!(engine.scheduler().horizon(), 2000);
}

// ============================================================================
// 5. Snapshots
// ============================================================================

#[test]
fn snapshot_follows_the_field() {
    let mut engine = ParticleEngine::new(settings(48000.0));
    let publisher = SnapshotPublisher::new();
    engine.attach_snapshot(publisher.clone());

    process_block(&mut engine, 128, &[Event::note_on(0, 64, 0.5)]);
    let frame = publisher.latest();
    assert_eq!(frame.block, 1);
    assert_eq!(frame.particles.len(), 5);

    process_block(&mut engine, 128, &[Event::note_off(0, 64)]);
    let frame = publisher.latest();
    assert_eq!(frame.block, 2);
    assert!(frame.particles.is_empty());
}
