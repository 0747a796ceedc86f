//! Real-time audio playback using cpal

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, Device, SampleFormat, Stream, StreamConfig, SupportedBufferSize, SupportedStreamConfig,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::SharedEngine;

/// Real-time audio player
pub struct Player {
    device: Device,
    config: SupportedStreamConfig,
    buffer_size: Option<u32>,
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl Player {
    /// Open an output device by name, or the default device
    pub fn open(device_name: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match device_name {
            Some(name) => host
                .output_devices()
                .context("failed to list output devices")?
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| anyhow!("Output device '{}' not found", name))?,
            None => host
                .default_output_device()
                .ok_or_else(|| anyhow!("No output device available"))?,
        };
        let config = device
            .default_output_config()
            .context("failed to query output config")?;

        Ok(Self {
            device,
            config,
            buffer_size: None,
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Request a fixed callback size in frames instead of the device default
    pub fn with_buffer_size(mut self, frames: u32) -> Self {
        self.buffer_size = Some(frames);
        self
    }

    /// Sample rate the engine must render at
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate().0
    }

    /// Start pulling audio from the engine
    pub fn start(&mut self, engine: SharedEngine) -> Result<()> {
        let sample_format = self.config.sample_format();
        let stream_config = stream_config(&self.config, self.buffer_size);

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();

        let stream = match sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(&stream_config, engine, running)?,
            SampleFormat::I16 => self.build_stream::<i16>(&stream_config, engine, running)?,
            SampleFormat::U16 => self.build_stream::<u16>(&stream_config, engine, running)?,
            other => return Err(anyhow!("Unsupported sample format {:?}", other)),
        };

        stream.play()?;
        self.stream = Some(stream);

        Ok(())
    }

    /// Stop playback and close the stream
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.stream = None;
    }

    fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
        &self,
        config: &StreamConfig,
        engine: SharedEngine,
        running: Arc<AtomicBool>,
    ) -> Result<Stream> {
        let channels = config.channels as usize;

        let stream = self.device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if !running.load(Ordering::SeqCst) {
                    for sample in data.iter_mut() {
                        *sample = T::from_sample(0.0f32);
                    }
                    return;
                }

                if let Ok(mut eng) = engine.try_lock() {
                    for frame in data.chunks_mut(channels) {
                        let sample = eng.process() as f32;
                        for channel_sample in frame.iter_mut() {
                            *channel_sample = T::from_sample(sample);
                        }
                    }
                } else {
                    // Caller holds the engine; skip this block
                    for sample in data.iter_mut() {
                        *sample = T::from_sample(0.0f32);
                    }
                }
            },
            |err| {
                log::error!(target: "audio", "stream error: {}", err);
            },
            None,
        )?;

        Ok(stream)
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Stream config for `supported`, with `buffer_size` clamped to what the device allows
fn stream_config(supported: &SupportedStreamConfig, buffer_size: Option<u32>) -> StreamConfig {
    let mut config: StreamConfig = supported.clone().into();
    if let Some(frames) = buffer_size {
        let frames = match supported.buffer_size().clone() {
            SupportedBufferSize::Range { min, max } => frames.clamp(min, max),
            SupportedBufferSize::Unknown => frames,
        };
        config.buffer_size = BufferSize::Fixed(frames);
    }
    config
}

/// Default output device name and config
pub fn default_output_config() -> Option<(String, StreamConfig)> {
    let host = cpal::default_host();
    let device = host.default_output_device()?;
    let config = device.default_output_config().ok()?;
    Some((device.name().unwrap_or_default(), config.into()))
}

/// List all available output devices
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
