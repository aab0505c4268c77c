//! Particle field snapshots for display.
//!
//! The audio thread publishes a copy of every active particle after each
//! block; a display thread reads the latest complete copy. Publishing uses
//! `try_lock` and skips the block when a reader holds the lock, so the audio
//! thread never waits. The buffer is sized for the full pool up front and
//! never reallocates while publishing.

use std::sync::Arc;

use parking_lot::Mutex;
use particula_core::{MAX_PARTICLES, ParticleView, Simulation};

/// One published frame of the particle field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    /// Active particles at the end of the block.
    pub particles: Vec<ParticleView>,
    /// Number of blocks processed when the frame was taken.
    pub block: u64,
}

impl Default for FieldSnapshot {
    fn default() -> Self {
        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
            block: 0,
        }
    }
}

/// Shared handle to the latest [`FieldSnapshot`].
///
/// Cloning gives another handle to the same frame.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPublisher {
    frame: Arc<Mutex<FieldSnapshot>>,
}

impl SnapshotPublisher {
    /// Empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the frame with the current field. Returns `false` if a
    /// reader held the lock and the frame was skipped.
    pub fn publish(&self, sim: &Simulation, block: u64) -> bool {
        let Some(mut frame) = self.frame.try_lock() else {
            return false;
        };
        frame.particles.clear();
        frame.particles.extend(sim.views());
        frame.block = block;
        true
    }

    /// Copy the latest frame into `out`, reusing its allocation.
    pub fn read_into(&self, out: &mut FieldSnapshot) {
        let frame = self.frame.lock();
        out.particles.clear();
        out.particles.extend_from_slice(&frame.particles);
        out.block = frame.block;
    }

    /// Copy of the latest frame.
    pub fn latest(&self) -> FieldSnapshot {
        self.frame.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_then_read() {
        let mut sim = Simulation::new(4);
        sim.note_on(60, 1.0);
        let publisher = SnapshotPublisher::new();
        assert!(publisher.publish(&sim, 7));
        let frame = publisher.latest();
        assert_eq!(frame.block, 7);
        assert_eq!(frame.particles.len(), sim.active_count());
        assert!(frame.particles.iter().all(|p| p.note == 60));
    }

    #[test]
    fn contended_publish_is_skipped() {
        let sim = Simulation::new(4);
        let publisher = SnapshotPublisher::new();
        let reader = publisher.clone();
        let guard = reader.frame.lock();
        assert!(!publisher.publish(&sim, 1));
        drop(guard);
        assert!(publisher.publish(&sim, 2));
        let mut out = FieldSnapshot::default();
        reader.read_into(&mut out);
        assert_eq!(out.block, 2);
    }
}
