//! Property-based tests for particula-engine.
//!
//! The central property: feeding one input timeline through the engine in
//! differently sized blocks yields the same audio and the same generated
//! event timeline, sample for sample.

use particula_engine::{EngineSettings, Event, EventQueue, ParticleEngine};
use proptest::prelude::*;

const TOTAL: usize = 3000;

fn settings() -> EngineSettings {
    EngineSettings {
        sample_rate: 8000.0,
        step_interval: 64,
        reference_interval: 256,
        seed: 11,
        queue_capacity: 1 << 16,
        ..EngineSettings::default()
    }
}

/// Render `TOTAL` samples, cutting blocks from `sizes` in a cycle. Returns
/// left, right and the generated events with absolute times.
fn run(inputs: &[Event], sizes: &[usize]) -> (Vec<f32>, Vec<f32>, Vec<Event>) {
    let mut engine = ParticleEngine::new(settings());
    let mut left = vec![0.0; TOTAL];
    let mut right = vec![0.0; TOTAL];
    let mut timeline = Vec::new();
    let mut start = 0;
    for &size in sizes.iter().cycle() {
        if start >= TOTAL {
            break;
        }
        let end = (start + size).min(TOTAL);
        let block_inputs: Vec<Event> = inputs
            .iter()
            .filter(|e| (start..end).contains(&(e.time as usize)))
            .map(|e| Event {
                time: e.time - start as u32,
                ..*e
            })
            .collect();
        let mut out = Vec::new();
        engine.process(&mut left[start..end], &mut right[start..end], &block_inputs, &mut out);
        timeline.extend(out.into_iter().map(|e| Event {
            time: e.time + start as u32,
            ..e
        }));
        start = end;
    }
    (left, right, timeline)
}

fn input_strategy() -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec((0u32..TOTAL as u32, 30u8..90, 0.2f32..1.0, any::<bool>()), 1..24).prop_map(
        |raw| {
            let mut events: Vec<Event> = raw
                .into_iter()
                .map(|(time, note, velocity, off)| {
                    if off {
                        Event::note_off(time, note)
                    } else {
                        Event::note_on(time, note, velocity)
                    }
                })
                .collect();
            events.sort_by_key(|e| e.time);
            events
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn block_split_does_not_change_output(
        inputs in input_strategy(),
        sizes in prop::collection::vec(1usize..700, 1..8),
    ) {
        let (ref_l, ref_r, ref_events) = run(&inputs, &[TOTAL]);
        let (l, r, events) = run(&inputs, &sizes);
        prop_assert_eq!(ref_events, events);
        prop_assert_eq!(ref_l, l);
        prop_assert_eq!(ref_r, r);
    }

    #[test]
    fn queue_pops_in_time_order(times in prop::collection::vec(0u32..1000, 1..64)) {
        let mut queue = EventQueue::with_capacity(64);
        for (i, &t) in times.iter().enumerate() {
            queue.push(Event::note_off(t, (i % 128) as u8));
        }
        let mut last = 0;
        let mut popped = 0;
        while let Some(event) = queue.pop_due(u32::MAX) {
            prop_assert!(event.time >= last);
            last = event.time;
            popped += 1;
        }
        prop_assert_eq!(popped, times.len());
    }

    #[test]
    fn rebase_never_exceeds_horizon(
        times in prop::collection::vec(0u32..5000, 1..64),
        offset in 0u32..2000,
        horizon in 0u32..3000,
    ) {
        let mut queue = EventQueue::with_capacity(64);
        for &t in &times {
            queue.push(Event::note_off(t, 60));
        }
        let dropped = queue.rebase(offset, horizon);
        prop_assert_eq!(dropped + queue.len(), times.len());
        prop_assert!(queue.iter().all(|e| e.time <= horizon));
    }
}
