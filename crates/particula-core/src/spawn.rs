//! Initial position/velocity distributions for newly spawned particles.
//!
//! The set of origins is closed: each variant maps to a pure sampling
//! function taking the trigger velocity and a random source. Selection is a
//! configuration value, dispatched with a plain `match`.

use core::fmt;
use core::str::FromStr;

use rand::Rng;

use crate::vec2::Vec2;

/// Speed per unit of trigger velocity.
pub const SPEED_PER_VELOCITY: f64 = 4.0;

/// Side of the square used by [`SpawnOrigin::CornerCluster`].
pub const CORNER_SIZE: f64 = 200.0;

/// Depth of the bands used by the exterior and top-band origins.
pub const BAND_DEPTH: f64 = 100.0;

/// Logical size of the simulation plane, `[0, width] × [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    /// Width in domain units.
    pub width: f64,
    /// Height in domain units.
    pub height: f64,
}

impl Default for Domain {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
        }
    }
}

impl Domain {
    /// Whether `p` lies inside the closed domain rectangle.
    pub fn contains(&self, p: Vec2) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }
}

/// Where new particles appear and which way they head.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SpawnOrigin {
    /// Small square at the top-left corner, heading into the domain.
    CornerCluster,
    /// Anywhere inside the domain, any direction.
    #[default]
    UniformInterior,
    /// A band just outside a randomly chosen edge, any direction.
    RingExterior,
    /// A band above the top edge, heading downwards.
    TopBand,
}

impl SpawnOrigin {
    /// All origins, in parameter-index order.
    pub const ALL: [Self; 4] = [
        Self::CornerCluster,
        Self::UniformInterior,
        Self::RingExterior,
        Self::TopBand,
    ];

    /// Stable parameter name.
    pub fn name(self) -> &'static str {
        match self {
            Self::CornerCluster => "corner-cluster",
            Self::UniformInterior => "uniform-interior",
            Self::RingExterior => "ring-exterior",
            Self::TopBand => "top-band",
        }
    }

    /// Index used by the numeric parameter layer.
    pub fn index(self) -> usize {
        match self {
            Self::CornerCluster => 0,
            Self::UniformInterior => 1,
            Self::RingExterior => 2,
            Self::TopBand => 3,
        }
    }

    /// Origin for a parameter index; out-of-range indices clamp to the last variant.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Sample an initial `(position, velocity)` for a trigger velocity in `[0, 1]`.
    pub fn sample<R: Rng + ?Sized>(self, velocity: f32, domain: Domain, rng: &mut R) -> (Vec2, Vec2) {
        let speed = SPEED_PER_VELOCITY * f64::from(velocity);
        match self {
            Self::CornerCluster => corner_cluster(speed, rng),
            Self::UniformInterior => uniform_interior(speed, domain, rng),
            Self::RingExterior => ring_exterior(speed, domain, rng),
            Self::TopBand => top_band(speed, domain, rng),
        }
    }
}

impl fmt::Display for SpawnOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognised origin name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownOrigin;

impl fmt::Display for UnknownOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown spawn origin (expected corner-cluster, uniform-interior, ring-exterior or top-band)")
    }
}

impl FromStr for SpawnOrigin {
    type Err = UnknownOrigin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownOrigin)
    }
}

#[inline]
fn unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.r#gen::<f64>()
}

fn corner_cluster<R: Rng + ?Sized>(speed: f64, rng: &mut R) -> (Vec2, Vec2) {
    let position = Vec2::new(unit(rng) * CORNER_SIZE, unit(rng) * CORNER_SIZE);
    let direction = Vec2::new(unit(rng), unit(rng)).normalize();
    (position, direction * speed)
}

fn uniform_interior<R: Rng + ?Sized>(speed: f64, domain: Domain, rng: &mut R) -> (Vec2, Vec2) {
    let position = Vec2::new(unit(rng) * domain.width, unit(rng) * domain.height);
    let direction = Vec2::new(unit(rng) - 0.5, unit(rng) - 0.5).normalize();
    (position, direction * speed)
}

fn ring_exterior<R: Rng + ?Sized>(speed: f64, domain: Domain, rng: &mut R) -> (Vec2, Vec2) {
    let position = if rng.gen_bool(0.5) {
        let offset = if rng.gen_bool(0.5) { -BAND_DEPTH } else { domain.width };
        Vec2::new(unit(rng) * BAND_DEPTH + offset, unit(rng) * domain.height)
    } else {
        let offset = if rng.gen_bool(0.5) { -BAND_DEPTH } else { domain.height };
        Vec2::new(unit(rng) * domain.width, unit(rng) * BAND_DEPTH + offset)
    };
    let direction = Vec2::new(unit(rng) - 0.5, unit(rng) - 0.5).normalize();
    (position, direction * speed)
}

fn top_band<R: Rng + ?Sized>(speed: f64, domain: Domain, rng: &mut R) -> (Vec2, Vec2) {
    let position = Vec2::new(unit(rng) * domain.width, -unit(rng) * BAND_DEPTH);
    let direction = Vec2::new(unit(rng) - 0.5, unit(rng)).normalize();
    (position, direction * speed)
}
