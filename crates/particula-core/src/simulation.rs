//! Fixed-capacity particle pool and physics integrator.
//!
//! [`ParticleSimulation`] owns every particle slot up front. Spawning takes
//! the first inactive slot found by linear scan; releasing clears the
//! `active` flag. Nothing on this path allocates, logs per step, or fails:
//! capacity limits saturate silently and are only counted.
//!
//! One call to [`ParticleSimulation::advance`] performs one physics step:
//!
//! 1. Integrate every active particle (position, gravity bias, boundary
//!    reflection, collision age).
//! 2. Test every ordered pair of distinct active particles for overlap and
//!    resolve those that are still approaching with an elastic impulse.
//!    Each resolved pair reports one [`Collision`] per particle.
//!
//! The approach test uses the particles' current velocities projected one
//! reference step ahead. Once a pair is resolved its reversed ordering sees
//! separating velocities and is skipped, so each contact fires once.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::math::clamp_unit;
use crate::particle::{Particle, ParticleView, mass_for_note};
use crate::spawn::{Domain, SpawnOrigin};
use crate::vec2::Vec2;

/// Default particle pool capacity.
pub const MAX_PARTICLES: usize = 256;

/// Semitones added to a particle's note when reporting a collision.
pub const COLLISION_NOTE_OFFSET: i32 = 33;

/// Vertical velocity added per reference step per unit of gravity.
pub const GRAVITY_PER_STEP: f64 = 0.05;

/// Speed that maps to full collision intensity.
pub const FULL_INTENSITY_SPEED: f64 = 10.0;

/// Default notes spawned per note-on.
pub const DEFAULT_MULTIPLIER: u32 = 5;

/// Performance data derived from one particle taking part in a collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Particle note plus the collision offset. May fall outside 0..=127.
    pub note: i32,
    /// `|velocity| / 10`, clamped to `[0, 1]`.
    pub intensity: f32,
    /// Horizontal position mapped to `[-1, 1]` (unclamped outside the domain).
    pub pan: f32,
}

/// Default-capacity simulation.
pub type Simulation = ParticleSimulation<MAX_PARTICLES>;

/// A pool of `N` particle slots plus the physics that moves them.
///
/// # Example
///
/// ```rust
/// use particula_core::{Simulation, SpawnOrigin};
///
/// let mut sim = Simulation::new(42);
/// sim.set_origin(SpawnOrigin::UniformInterior);
/// sim.set_multiplier(3);
/// sim.note_on(60, 1.0);
/// assert_eq!(sim.active_count(), 3);
///
/// let mut hits = 0;
/// for _ in 0..100 {
///     sim.advance(1.0, |_| hits += 1);
/// }
///
/// sim.release(60);
/// assert_eq!(sim.active_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ParticleSimulation<const N: usize> {
    particles: [Particle; N],
    domain: Domain,
    origin: SpawnOrigin,
    gravity: f64,
    multiplier: u32,
    size_by_note: bool,
    size_scale: f64,
    note_offset: i32,
    rng: SmallRng,
    dropped_spawns: u64,
}

impl<const N: usize> ParticleSimulation<N> {
    /// Create an empty pool over the default 1000×1000 domain.
    pub fn new(seed: u64) -> Self {
        Self::with_domain(Domain::default(), seed)
    }

    /// Create an empty pool over a custom domain.
    pub fn with_domain(domain: Domain, seed: u64) -> Self {
        Self {
            particles: [Particle::default(); N],
            domain,
            origin: SpawnOrigin::default(),
            gravity: 0.0,
            multiplier: DEFAULT_MULTIPLIER,
            size_by_note: true,
            size_scale: 1.0,
            note_offset: COLLISION_NOTE_OFFSET,
            rng: SmallRng::seed_from_u64(seed),
            dropped_spawns: 0,
        }
    }

    /// Pool capacity.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Domain the particles move in.
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Active spawn origin.
    pub fn origin(&self) -> SpawnOrigin {
        self.origin
    }

    /// Select where new particles appear. Existing particles are unaffected.
    pub fn set_origin(&mut self, origin: SpawnOrigin) {
        if origin != self.origin {
            #[cfg(feature = "tracing")]
            tracing::debug!("spawn origin: {} -> {}", self.origin, origin);
            self.origin = origin;
        }
    }

    /// Current gravity.
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Set the uniform downward bias (negative pulls upward).
    pub fn set_gravity(&mut self, gravity: f64) {
        #[cfg(feature = "tracing")]
        if gravity != self.gravity {
            tracing::debug!("gravity: {} -> {}", self.gravity, gravity);
        }
        self.gravity = gravity;
    }

    /// Particles spawned per note-on.
    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    /// Set particles spawned per note-on, at least 1.
    pub fn set_multiplier(&mut self, multiplier: u32) {
        let multiplier = multiplier.max(1);
        #[cfg(feature = "tracing")]
        if multiplier != self.multiplier {
            tracing::debug!("particle multiplier: {} -> {}", self.multiplier, multiplier);
        }
        self.multiplier = multiplier;
    }

    /// Whether mass follows the note (lower notes heavier).
    pub fn size_by_note(&self) -> bool {
        self.size_by_note
    }

    /// Toggle note-dependent mass for subsequently spawned particles.
    pub fn set_size_by_note(&mut self, enabled: bool) {
        self.size_by_note = enabled;
    }

    /// Mass scale factor.
    pub fn size_scale(&self) -> f64 {
        self.size_scale
    }

    /// Set the mass scale for subsequently spawned particles.
    ///
    /// Non-positive or non-finite values are ignored.
    pub fn set_size_scale(&mut self, scale: f64) {
        if scale > 0.0 && scale.is_finite() {
            self.size_scale = scale;
        }
    }

    /// Semitones added to collision notes.
    pub fn note_offset(&self) -> i32 {
        self.note_offset
    }

    /// Set the semitone offset applied to collision notes.
    pub fn set_note_offset(&mut self, offset: i32) {
        self.note_offset = offset;
    }

    /// Spawn one particle for `note` using the active origin.
    ///
    /// Returns `false` (and counts a drop) when every slot is occupied.
    pub fn spawn(&mut self, note: u8, velocity: f32) -> bool {
        let Some(slot) = self.free_slot() else {
            self.dropped_spawns += 1;
            return false;
        };
        let (position, velocity) = self.origin.sample(clamp_unit(velocity), self.domain, &mut self.rng);
        let mass = mass_for_note(note, self.size_by_note, self.size_scale);
        self.particles[slot] = Particle::new(note, position, velocity, mass);
        true
    }

    /// Spawn [`multiplier`](Self::multiplier) particles for a note-on.
    ///
    /// Returns how many were actually created.
    pub fn note_on(&mut self, note: u8, velocity: f32) -> u32 {
        let mut created = 0;
        for _ in 0..self.multiplier {
            if self.spawn(note, velocity) {
                created += 1;
            }
        }
        created
    }

    /// Place a fully specified particle in the first free slot.
    ///
    /// Returns the slot index, or `None` if the pool is full.
    pub fn insert(&mut self, particle: Particle) -> Option<usize> {
        let slot = self.free_slot()?;
        self.particles[slot] = Particle {
            active: true,
            ..particle
        };
        Some(slot)
    }

    /// Deactivate every active particle spawned from `note`.
    ///
    /// Returns how many were removed.
    pub fn release(&mut self, note: u8) -> usize {
        let mut removed = 0;
        for p in self.particles.iter_mut().filter(|p| p.active && p.note == note) {
            p.active = false;
            removed += 1;
        }
        removed
    }

    /// Deactivate every particle.
    pub fn clear(&mut self) {
        for p in &mut self.particles {
            p.active = false;
        }
    }

    /// Spawns refused because the pool was full.
    pub fn dropped_spawns(&self) -> u64 {
        self.dropped_spawns
    }

    /// Number of occupied slots.
    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.active).count()
    }

    /// Iterate over the active particles.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.active)
    }

    /// Iterate over display views of the active particles.
    pub fn views(&self) -> impl Iterator<Item = ParticleView> + '_ {
        self.particles().map(Particle::view)
    }

    /// Total momentum of the active particles.
    pub fn total_momentum(&self) -> Vec2 {
        self.particles().fold(Vec2::ZERO, |acc, p| acc + p.momentum())
    }

    /// Total kinetic energy of the active particles.
    pub fn total_kinetic_energy(&self) -> f64 {
        self.particles().map(Particle::kinetic_energy).sum()
    }

    /// Run one physics step scaled by `time_scale` reference steps.
    ///
    /// `on_collision` is called twice per resolved pair, first for the pair's
    /// lower-index particle.
    pub fn advance<F: FnMut(Collision)>(&mut self, time_scale: f64, mut on_collision: F) {
        let Domain { width, height } = self.domain;
        let gravity = GRAVITY_PER_STEP * self.gravity * time_scale;
        let age = time_scale as f32;

        for p in self.particles.iter_mut().filter(|p| p.active) {
            p.position += p.velocity * time_scale;
            p.velocity.y += gravity;
            if p.position.x < 0.0 {
                p.velocity.x = p.velocity.x.abs();
            }
            if p.position.y < 0.0 {
                p.velocity.y = p.velocity.y.abs();
            }
            if p.position.x > width {
                p.velocity.x = -p.velocity.x.abs();
            }
            if p.position.y > height {
                p.velocity.y = -p.velocity.y.abs();
            }
            p.time_since_collision += age;
        }

        let half_width = width / 2.0;
        for i in 0..N {
            if !self.particles[i].active {
                continue;
            }
            for j in 0..N {
                if i == j || !self.particles[j].active {
                    continue;
                }
                let (a, b) = pair_mut(&mut self.particles, i, j);
                if !in_contact(a, b) || !approaching(a, b) {
                    continue;
                }
                resolve_collision(a, b);
                a.time_since_collision = 0.0;
                b.time_since_collision = 0.0;
                on_collision(collision_for(a, self.note_offset, half_width));
                on_collision(collision_for(b, self.note_offset, half_width));
            }
        }
    }

    fn free_slot(&self) -> Option<usize> {
        self.particles.iter().position(|p| !p.active)
    }
}

/// Apply the elastic impulse along the line of centres to both particles.
///
/// Conserves the pair's momentum and kinetic energy. Coincident centres
/// have no defined normal and are left untouched.
pub fn resolve_collision(a: &mut Particle, b: &mut Particle) {
    let dif = a.position - b.position;
    let dist_sq = dif.magnitude_squared();
    if dist_sq == 0.0 {
        return;
    }
    let total = a.mass + b.mass;
    let weight_a = 2.0 * b.mass / total;
    let weight_b = 2.0 * a.mass / total;
    let dot = (a.velocity - b.velocity).dot(dif) / dist_sq;
    a.velocity -= dif * (weight_a * dot);
    b.velocity += dif * (weight_b * dot);
}

#[inline]
fn in_contact(a: &Particle, b: &Particle) -> bool {
    a.position.distance(b.position) < a.radius + b.radius
}

#[inline]
fn approaching(a: &Particle, b: &Particle) -> bool {
    a.position.distance(b.position) > (a.position + a.velocity).distance(b.position + b.velocity)
}

#[inline]
fn collision_for(p: &Particle, note_offset: i32, half_width: f64) -> Collision {
    Collision {
        note: i32::from(p.note) + note_offset,
        intensity: clamp_unit((p.velocity.magnitude() / FULL_INTENSITY_SPEED) as f32),
        pan: (p.position.x / half_width - 1.0) as f32,
    }
}

/// Mutable references to two distinct slots.
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}
