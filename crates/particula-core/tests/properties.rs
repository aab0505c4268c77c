//! Property-based tests for particula-core.
//!
//! Pool capacity, release completeness, collision conservation and the
//! boundary reflection bound, using proptest for randomized scenarios.

use particula_core::{Particle, ParticleSimulation, SpawnOrigin, Vec2, resolve_collision};
use proptest::prelude::*;

fn origin_strategy() -> impl Strategy<Value = SpawnOrigin> {
    (0usize..4).prop_map(SpawnOrigin::from_index)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any sequence of note-ons and releases keeps the active count within
    /// capacity, interleaved with physics steps.
    #[test]
    fn active_count_never_exceeds_capacity(
        ops in prop::collection::vec((any::<bool>(), 0u8..128, 0.0f32..=1.0), 1..120),
        multiplier in 1u32..8,
        origin in origin_strategy(),
        seed in any::<u64>(),
    ) {
        let mut sim = ParticleSimulation::<32>::new(seed);
        sim.set_multiplier(multiplier);
        sim.set_origin(origin);
        for (on, note, velocity) in ops {
            if on {
                sim.note_on(note, velocity);
            } else {
                sim.release(note);
            }
            sim.advance(1.0, |_| {});
            prop_assert!(sim.active_count() <= 32);
        }
    }

    /// After `release(note)` no active particle carries that note.
    #[test]
    fn release_is_complete(
        notes in prop::collection::vec(0u8..16, 1..40),
        target in 0u8..16,
        seed in any::<u64>(),
    ) {
        let mut sim = ParticleSimulation::<64>::new(seed);
        sim.set_multiplier(2);
        for note in notes {
            sim.note_on(note, 0.5);
        }
        sim.release(target);
        prop_assert!(sim.particles().all(|p| p.note() != target));
    }

    /// One elastic impulse conserves the pair's momentum and kinetic energy.
    #[test]
    fn collision_conserves_momentum_and_energy(
        m1 in 0.1f64..1000.0,
        m2 in 0.1f64..1000.0,
        ax in -50.0f64..50.0, ay in -50.0f64..50.0,
        bx in -50.0f64..50.0, by in -50.0f64..50.0,
        avx in -10.0f64..10.0, avy in -10.0f64..10.0,
        bvx in -10.0f64..10.0, bvy in -10.0f64..10.0,
    ) {
        let mut a = Particle::new(1, Vec2::new(ax, ay), Vec2::new(avx, avy), m1);
        let mut b = Particle::new(2, Vec2::new(bx, by), Vec2::new(bvx, bvy), m2);
        prop_assume!(a.position().distance(b.position()) > 1e-3);

        let p0 = a.momentum() + b.momentum();
        let e0 = a.kinetic_energy() + b.kinetic_energy();
        resolve_collision(&mut a, &mut b);
        let p1 = a.momentum() + b.momentum();
        let e1 = a.kinetic_energy() + b.kinetic_energy();

        let scale = 1.0 + p0.magnitude();
        prop_assert!((p1.x - p0.x).abs() < 1e-9 * scale, "px {} -> {}", p0.x, p1.x);
        prop_assert!((p1.y - p0.y).abs() < 1e-9 * scale, "py {} -> {}", p0.y, p1.y);
        prop_assert!((e1 - e0).abs() < 1e-9 * (1.0 + e0), "energy {} -> {}", e0, e1);
    }

    /// A lone particle starting inside the domain never strays further
    /// outside than one step's travel.
    #[test]
    fn boundary_overshoot_is_bounded_by_one_step(
        x in 0.0f64..=1000.0,
        y in 0.0f64..=1000.0,
        vx in -40.0f64..40.0,
        vy in -40.0f64..40.0,
        time_scale in 0.1f64..4.0,
        steps in 1usize..400,
    ) {
        let mut sim = ParticleSimulation::<1>::new(0);
        sim.insert(Particle::new(60, Vec2::new(x, y), Vec2::new(vx, vy), 1.0));
        let bound = Vec2::new(vx, vy).magnitude() * time_scale + 1e-9;
        for _ in 0..steps {
            sim.advance(time_scale, |_| {});
            let p = sim.particles().next().map(Particle::position).unwrap_or_default();
            let outside_x = (-p.x).max(p.x - 1000.0).max(0.0);
            let outside_y = (-p.y).max(p.y - 1000.0).max(0.0);
            prop_assert!(outside_x <= bound && outside_y <= bound, "{:?} beyond {}", p, bound);
        }
    }
}
