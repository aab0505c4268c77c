//! Integration tests for particula-io.

use particula_io::{
    Error, StereoSamples, StereoWavWriter, WavFormat, WavSpec, read_wav_info, read_wav_stereo,
    write_wav_stereo,
};
use tempfile::TempDir;

fn sine(freq: f32, sample_rate: u32, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
        .collect()
}

#[test]
fn block_writer_matches_whole_buffer_write() {
    let dir = TempDir::new().unwrap();
    let whole = dir.path().join("whole.wav");
    let blocks = dir.path().join("blocks.wav");

    let samples = StereoSamples::new(sine(440.0, 48000, 2000), sine(660.0, 48000, 2000));
    write_wav_stereo(&whole, &samples, WavSpec::default()).unwrap();

    let mut writer = StereoWavWriter::create(&blocks, WavSpec::default()).unwrap();
    for (l, r) in samples.left.chunks(300).zip(samples.right.chunks(300)) {
        writer.write_block(l, r).unwrap();
    }
    assert_eq!(writer.frames(), 2000);
    writer.finalize().unwrap();

    let (a, _) = read_wav_stereo(&whole).unwrap();
    let (b, _) = read_wav_stereo(&blocks).unwrap();
    assert_eq!(a, b);
}

#[test]
fn integer_depths_clip_instead_of_wrapping() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hot.wav");
    let samples = StereoSamples::new(vec![2.0, -2.0], vec![1.5, -1.5]);
    let spec = WavSpec {
        sample_rate: 44100,
        bits_per_sample: 24,
    };
    write_wav_stereo(&path, &samples, spec).unwrap();

    let info = read_wav_info(&path).unwrap();
    assert_eq!(info.format, WavFormat::Pcm);
    assert_eq!(info.bits_per_sample, 24);
    assert_eq!(info.sample_rate, 44100);

    let (loaded, rate) = read_wav_stereo(&path).unwrap();
    assert_eq!(rate, 44100);
    assert!(loaded.left[0] > 0.99);
    assert!(loaded.left[1] <= -0.99);
    assert!(loaded.right[0] > 0.99);
}

#[test]
fn info_reports_duration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("second.wav");
    let samples = StereoSamples::new(vec![0.0; 48000], vec![0.0; 48000]);
    write_wav_stereo(&path, &samples, WavSpec::default()).unwrap();

    let info = read_wav_info(&path).unwrap();
    assert_eq!(info.num_frames, 48000);
    assert!((info.duration_secs - 1.0).abs() < 1e-9);
}

#[test]
fn missing_file_is_an_error() {
    let err = read_wav_stereo("/no/such/file.wav").unwrap_err();
    assert!(matches!(err, Error::Wav(_) | Error::Io(_)));
}
