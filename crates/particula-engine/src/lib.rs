//! Particula Engine - the real-time block processor
//!
//! Couples the particle field from `particula-core` to the voice bank from
//! `particula-synth` through a sample-accurate event bridge:
//!
//! - [`Event`] - timed note-on, note-off and pan events with a 3-byte MIDI
//!   encoding
//! - [`EventQueue`] - bounded, time-ordered store that carries events
//!   across block boundaries
//! - [`ChannelRotator`] - per-note round-robin over 16 channels
//! - [`EventScheduler`] - steps the physics every `step_interval` samples
//!   and turns collisions into events
//! - [`ParamStore`] - lock-free named parameters applied at block start
//! - [`SnapshotPublisher`] - particle field copies for a display thread
//! - [`ParticleEngine`] - renders a block from input events
//!
//! The process path does not block and allocates only through the caller's
//! event sink. Conditions it absorbs (full pool, full queue, events past the
//! horizon, out-of-range notes) are counted in [`EngineStats`].

pub mod channel;
pub mod engine;
pub mod event;
pub mod params;
pub mod queue;
pub mod scheduler;
pub mod snapshot;

pub use channel::{ChannelRotator, ROTATION_CHANNELS};
pub use engine::{EngineSettings, EngineStats, EventSink, ParticleEngine};
pub use event::{Event, EventKind, PAN_CC, decode_pan, encode_pan};
pub use params::{
    EngineParams, PARAM_COUNT, PARAMS, ParamDescriptor, ParamError, ParamId, ParamStore, ParamUnit,
};
pub use queue::{DEFAULT_QUEUE_CAPACITY, EventQueue};
pub use scheduler::{EventScheduler, SchedulerSettings, SchedulerStats};
pub use snapshot::{FieldSnapshot, SnapshotPublisher};
