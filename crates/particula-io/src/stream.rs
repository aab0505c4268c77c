//! Real-time audio output via cpal.

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Extract device name via `description()` (cpal 0.17+).
fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
    /// Whether this is the host's default output.
    pub is_default: bool,
}

/// Stream configuration.
#[derive(Debug, Clone, Default)]
pub struct StreamConfig {
    /// Fixed buffer size in frames; the device default if `None`.
    pub buffer_size: Option<u32>,
    /// Output device name, partial name or index; the default if `None`.
    pub output_device: Option<String>,
}

/// List the output devices.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let outputs = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;

    Ok(outputs
        .filter_map(|device| {
            let name = device_name(&device).ok()?;
            let config = device.default_output_config().ok()?;
            Some(AudioDevice {
                is_default: default_name.as_deref() == Some(name.as_str()),
                name,
                default_sample_rate: config.sample_rate(),
                channels: config.channels(),
            })
        })
        .collect())
}

/// The host's default output device, if any.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|d| {
        let name = device_name(&d).ok()?;
        let config = d.default_output_config().ok()?;
        Some(AudioDevice {
            name,
            default_sample_rate: config.sample_rate(),
            channels: config.channels(),
            is_default: true,
        })
    }))
}

/// Cloneable handle that stops a running [`OutputStream`] from another
/// thread or a signal handler.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Ask the stream to stop; [`OutputStream::run_stereo`] returns shortly
    /// after.
    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Output-only stream feeding a stereo generator.
pub struct OutputStream {
    #[allow(dead_code)]
    host: Host,
    device: Device,
    config: StreamConfig,
    running: Arc<AtomicBool>,
}

impl OutputStream {
    /// Open the configured output device.
    pub fn new(config: StreamConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = match &config.output_device {
            Some(name) => find_output_device(&host, name)?,
            None => host.default_output_device().ok_or(Error::NoDevice)?,
        };
        tracing::info!(
            device = device_name(&device).unwrap_or_default(),
            "opened output device"
        );
        Ok(Self {
            host,
            device,
            config,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Device sample rate; the generator must render at this rate.
    pub fn sample_rate(&self) -> u32 {
        self.device
            .default_output_config()
            .map(|c| c.sample_rate())
            .unwrap_or(48000)
    }

    /// Device channel count.
    pub fn channels(&self) -> u16 {
        self.device
            .default_output_config()
            .map(|c| c.channels())
            .unwrap_or(2)
    }

    /// Handle for stopping the stream.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.running))
    }

    /// Whether the stream is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run until stopped, calling `generate` to fill planar left/right
    /// buffers for every device callback. Blocks the calling thread.
    pub fn run_stereo<F>(&mut self, mut generate: F) -> Result<()>
    where
        F: FnMut(&mut [f32], &mut [f32]) + Send + 'static,
    {
        let default_config = self
            .device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?;
        let mut stream_config: cpal::StreamConfig = default_config.into();
        if let Some(frames) = self.config.buffer_size {
            stream_config.buffer_size = cpal::BufferSize::Fixed(frames);
        }
        let channels = usize::from(stream_config.channels.max(1));

        tracing::info!(
            sample_rate = stream_config.sample_rate,
            channels,
            buffer_size = ?stream_config.buffer_size,
            "starting output stream"
        );

        self.running.store(true, Ordering::SeqCst);
        let output_running = Arc::clone(&self.running);
        let mut left: Vec<f32> = Vec::with_capacity(8192);
        let mut right: Vec<f32> = Vec::with_capacity(8192);

        let stream = self
            .device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !output_running.load(Ordering::SeqCst) {
                        data.fill(0.0);
                        return;
                    }
                    let frames = data.len() / channels;
                    left.resize(frames, 0.0);
                    right.resize(frames, 0.0);
                    generate(&mut left, &mut right);
                    interleave_into(&left, &right, data, channels);
                },
                |err| tracing::error!(%err, "output stream error"),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;

        while self.running.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(50));
        }
        tracing::info!("output stream stopped");
        Ok(())
    }
}

/// Interleave planar stereo into a device buffer with `channels` channels.
fn interleave_into(left: &[f32], right: &[f32], output: &mut [f32], channels: usize) {
    match channels {
        1 => {
            for ((out, l), r) in output.iter_mut().zip(left).zip(right) {
                *out = (l + r) * 0.5;
            }
        }
        _ => {
            for ((frame, l), r) in output.chunks_exact_mut(channels).zip(left).zip(right) {
                frame[0] = *l;
                frame[1] = *r;
                frame[2..].fill(0.0);
            }
        }
    }
}

/// Find an output device by index, exact name or case-insensitive partial
/// name.
fn find_output_device(host: &Host, name_or_index: &str) -> Result<Device> {
    let devices: Vec<Device> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    if let Ok(index) = name_or_index.parse::<usize>() {
        return devices.get(index).cloned().ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "output device index {} (only {} devices available)",
                index,
                devices.len()
            ))
        });
    }

    let needle = name_or_index.to_lowercase();
    let named: Vec<(Device, String)> = devices
        .into_iter()
        .filter_map(|d| device_name(&d).ok().map(|n| (d, n)))
        .collect();

    named
        .iter()
        .find(|(_, n)| *n == name_or_index)
        .or_else(|| named.iter().find(|(_, n)| n.to_lowercase().contains(&needle)))
        .map(|(d, _)| d.clone())
        .ok_or_else(|| Error::DeviceNotFound(format!("no output device matching '{name_or_index}'")))
}
