//! Stereo WAV reading and writing.

use crate::Result;
use hound::{SampleFormat, WavReader, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.len()) / u64::from(spec.channels.max(1));
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// Output file specification. Files are always written as stereo.
#[derive(Debug, Clone, Copy)]
pub struct WavSpec {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// 16 or 24 for PCM, 32 for float.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: 2,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Planar stereo audio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StereoSamples {
    /// Left channel.
    pub left: Vec<f32>,
    /// Right channel.
    pub right: Vec<f32>,
}

impl StereoSamples {
    /// Pair two channels.
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Self {
        Self { left, right }
    }

    /// Frames in the shorter channel.
    pub fn len(&self) -> usize {
        self.left.len().min(self.right.len())
    }

    /// Whether there are no frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest absolute sample in either channel.
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(self.right.iter())
            .fold(0.0f32, |m, s| m.max(s.abs()))
    }
}

/// Writes a stereo file one block at a time.
pub struct StereoWavWriter {
    writer: WavWriter<BufWriter<File>>,
    bits_per_sample: u16,
    frames: u64,
}

impl StereoWavWriter {
    /// Create (or truncate) `path`.
    pub fn create<P: AsRef<Path>>(path: P, spec: WavSpec) -> Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        let writer = WavWriter::new(file, hound::WavSpec::from(spec))?;
        Ok(Self {
            writer,
            bits_per_sample: spec.bits_per_sample,
            frames: 0,
        })
    }

    /// Append frames from two planar buffers of equal length.
    pub fn write_block(&mut self, left: &[f32], right: &[f32]) -> Result<()> {
        if self.bits_per_sample == 32 {
            for (l, r) in left.iter().zip(right.iter()) {
                self.writer.write_sample(*l)?;
                self.writer.write_sample(*r)?;
            }
        } else {
            let max_val = (1i32 << (self.bits_per_sample - 1)) as f32;
            for (l, r) in left.iter().zip(right.iter()) {
                let int_l = (*l * max_val).clamp(-max_val, max_val - 1.0) as i32;
                let int_r = (*r * max_val).clamp(-max_val, max_val - 1.0) as i32;
                self.writer.write_sample(int_l)?;
                self.writer.write_sample(int_r)?;
            }
        }
        self.frames += left.len().min(right.len()) as u64;
        Ok(())
    }

    /// Frames written so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Flush and close the file.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }
}

/// Write a whole stereo buffer to `path`.
pub fn write_wav_stereo<P: AsRef<Path>>(path: P, samples: &StereoSamples, spec: WavSpec) -> Result<()> {
    let mut writer = StereoWavWriter::create(path, spec)?;
    writer.write_block(&samples.left, &samples.right)?;
    writer.finalize()
}

/// Read a WAV file as stereo. Mono files are duplicated to both channels;
/// files with more than two channels keep the first two.
pub fn read_wav_stereo<P: AsRef<Path>>(path: P) -> Result<(StereoSamples, u32)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let all: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let mut out = StereoSamples::default();
    for frame in all.chunks_exact(channels) {
        out.left.push(frame[0]);
        out.right.push(frame.get(1).copied().unwrap_or(frame[0]));
    }
    Ok((out, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn ramp(n: usize) -> StereoSamples {
        StereoSamples::new(
            (0..n).map(|i| (i as f32 / n as f32) - 0.5).collect(),
            (0..n).map(|i| 0.5 - (i as f32 / n as f32)).collect(),
        )
    }

    #[test]
    fn test_stereo_roundtrip_f32() {
        let file = NamedTempFile::new().unwrap();
        let samples = ramp(1000);
        write_wav_stereo(file.path(), &samples, WavSpec::default()).unwrap();

        let (loaded, rate) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(rate, 48000);
        assert_eq!(loaded, samples);
    }

    #[test]
    fn test_stereo_roundtrip_i16() {
        let file = NamedTempFile::new().unwrap();
        let samples = ramp(500);
        let spec = WavSpec {
            sample_rate: 44100,
            bits_per_sample: 16,
        };
        write_wav_stereo(file.path(), &samples, spec).unwrap();

        let (loaded, _) = read_wav_stereo(file.path()).unwrap();
        assert_eq!(loaded.len(), 500);
        for (a, b) in loaded.left.iter().zip(samples.left.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_block_writer_counts_frames() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = StereoWavWriter::create(file.path(), WavSpec::default()).unwrap();
        let block = vec![0.25f32; 256];
        for _ in 0..4 {
            writer.write_block(&block, &block).unwrap();
        }
        assert_eq!(writer.frames(), 1024);
        writer.finalize().unwrap();

        let info = read_wav_info(file.path()).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.num_frames, 1024);
        assert_eq!(info.format, WavFormat::IeeeFloat);
    }

    #[test]
    fn test_peak() {
        let s = StereoSamples::new(vec![0.1, -0.7], vec![0.3, 0.2]);
        assert_eq!(s.peak(), 0.7);
        assert!(StereoSamples::default().is_empty());
    }
}
