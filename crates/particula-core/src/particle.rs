//! Particle state and the read-only view handed to visual consumers.

use crate::note::hue_for_note;
use crate::vec2::Vec2;

/// Mass used for every particle when size-by-note is disabled (before scaling).
pub const FIXED_MASS: f64 = 300.0;

/// Radius per square root of mass.
pub const RADIUS_PER_SQRT_MASS: f64 = 4.0;

/// `time_since_collision` of a freshly spawned particle, well past any fade.
pub const NEVER_COLLIDED: f32 = 1000.0;

/// Mass for a particle spawned from `note`.
///
/// With size-by-note, lower notes are heavier:
/// `scale * 100000 / (110 * 2^(note/12))`. Otherwise every particle weighs
/// `300 * scale`.
///
/// ```rust
/// use particula_core::mass_for_note;
///
/// let m = mass_for_note(60, true, 1.0);
/// assert!((m - 100000.0 / (110.0 * 32.0)).abs() < 1e-9);
/// assert_eq!(mass_for_note(60, false, 2.0), 600.0);
/// ```
#[inline]
pub fn mass_for_note(note: u8, size_by_note: bool, scale: f64) -> f64 {
    if size_by_note {
        scale * 100_000.0 / (110.0 * libm::pow(2.0, f64::from(note) / 12.0))
    } else {
        FIXED_MASS * scale
    }
}

/// One simulated point mass.
///
/// Particles live in fixed slots of a [`ParticleSimulation`](crate::ParticleSimulation)
/// and are never individually allocated. Fields are read through accessors;
/// only the simulation moves them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) mass: f64,
    pub(crate) radius: f64,
    pub(crate) hue: f32,
    pub(crate) time_since_collision: f32,
    pub(crate) note: u8,
    pub(crate) active: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass: 1.0,
            radius: RADIUS_PER_SQRT_MASS,
            hue: 0.0,
            time_since_collision: NEVER_COLLIDED,
            note: 0,
            active: false,
        }
    }
}

impl Particle {
    /// Build an active particle with an explicit mass.
    ///
    /// Radius and hue are derived from `mass` and `note`. Used for scripted
    /// placement; spawning goes through [`ParticleSimulation::spawn`](crate::ParticleSimulation::spawn).
    pub fn new(note: u8, position: Vec2, velocity: Vec2, mass: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
            radius: libm::sqrt(mass) * RADIUS_PER_SQRT_MASS,
            hue: hue_for_note(note),
            time_since_collision: NEVER_COLLIDED,
            note,
            active: true,
        }
    }

    /// Current position.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current velocity in domain units per reference step.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Mass.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Collision and display radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Display hue in degrees.
    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Reference steps since the last resolved collision.
    pub fn time_since_collision(&self) -> f32 {
        self.time_since_collision
    }

    /// Note number this particle was spawned from.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// Whether the slot is occupied.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Kinetic energy `½mv²`.
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.magnitude_squared()
    }

    /// Momentum `mv`.
    pub fn momentum(&self) -> Vec2 {
        self.velocity * self.mass
    }

    /// Display-only copy of this particle.
    pub fn view(&self) -> ParticleView {
        ParticleView {
            x: self.position.x as f32,
            y: self.position.y as f32,
            radius: self.radius as f32,
            hue: self.hue,
            time_since_collision: self.time_since_collision,
            note: self.note,
        }
    }
}

/// What a renderer needs to draw one particle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParticleView {
    /// Horizontal position in domain units.
    pub x: f32,
    /// Vertical position in domain units (down is positive).
    pub y: f32,
    /// Radius in domain units.
    pub radius: f32,
    /// Hue in degrees.
    pub hue: f32,
    /// Reference steps since the last collision, for flash/fade effects.
    pub time_since_collision: f32,
    /// Source note.
    pub note: u8,
}
