//! Audio I/O for the particula engine.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`write_wav_stereo`], [`read_wav_stereo`] and the
//!   block-at-a-time [`StereoWavWriter`] for offline renders
//! - **Real-time output**: [`OutputStream`] drives a stereo generator from
//!   the default (or a named) output device
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use particula_io::{StereoWavWriter, WavSpec};
//!
//! let mut writer = StereoWavWriter::create("out.wav", WavSpec::default())?;
//! writer.write_block(&left, &right)?;
//! writer.finalize()?;
//! ```

mod stream;
mod wav;

pub use stream::{
    AudioDevice, OutputStream, StopHandle, StreamConfig, default_output_device, list_devices,
};
pub use wav::{
    StereoSamples, StereoWavWriter, WavFormat, WavInfo, WavSpec, read_wav_info, read_wav_stereo,
    write_wav_stereo,
};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
