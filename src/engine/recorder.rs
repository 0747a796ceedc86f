//! WAV file recorder
//!
//! Offline renders of single sounds.

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::AudioEngine;
use crate::params::SoundParameters;

/// Mono 32-bit float WAV writer
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    samples_written: u64,
}

impl Recorder {
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            sample_rate,
            samples_written: 0,
        })
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Length recorded so far in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples_written as f64 / self.sample_rate as f64
    }

    pub fn write_buffer(&mut self, buffer: &[f32]) -> Result<()> {
        for &sample in buffer {
            self.writer
                .write_sample(sample)
                .context("failed to write sample")?;
        }
        self.samples_written += buffer.len() as u64;
        Ok(())
    }

    /// Finalize the WAV file; the header is only correct after this
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("failed to finalize WAV file")?;
        Ok(())
    }
}

/// Render one sound through `engine` into a WAV file at `path`.
///
/// Runs until the playback has been released, so the file includes the
/// release margin. Returns the number of samples written. Fails without
/// creating the file if the sound could not be scheduled.
pub fn record_sound(engine: &mut AudioEngine, params: &SoundParameters, path: &Path) -> Result<u64> {
    let in_flight = engine.playbacks().len();
    engine.play(params);
    if engine.playbacks().len() == in_flight {
        bail!("sound could not be played, nothing recorded");
    }

    let mut recorder = Recorder::new(path, engine.sample_rate() as u32)?;
    let samples = engine.render_until_idle();
    recorder.write_buffer(&samples)?;

    let written = recorder.samples_written();
    log::info!(target: "audio", "recorded {:.2}s to {:?}", recorder.duration_secs(), path);
    recorder.finalize()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_recorder_writes_samples() {
        let file = NamedTempFile::new().unwrap();
        let mut recorder = Recorder::new(file.path(), 44100).unwrap();

        recorder.write_buffer(&[0.0, 0.5, -0.5, 1.0]).unwrap();
        assert_eq!(recorder.samples_written(), 4);
        recorder.finalize().unwrap();

        let reader = hound::WavReader::open(file.path()).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 44100);
        assert_eq!(reader.len(), 4);
    }

    #[test]
    fn test_record_sound_length() {
        let file = NamedTempFile::new().unwrap();
        let mut engine = AudioEngine::new(8000.0, 0.7).with_seed(3);
        let params = SoundParameters { duration_ms: 500.0, ..Default::default() };

        let written = record_sound(&mut engine, &params, file.path()).unwrap();

        // 0.5 s of sound plus the 0.1 s release margin
        assert!((written as i64 - 4800).abs() <= 1, "wrote {}", written);

        let mut reader = hound::WavReader::open(file.path()).unwrap();
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len() as u64, written);
        assert!(samples.iter().any(|s| s.abs() > 0.001));
    }

    #[test]
    fn test_record_unplayable_sound_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        let mut engine = AudioEngine::new(8000.0, 0.7);
        let broken = SoundParameters { frequency: f64::NAN, ..Default::default() };

        assert!(record_sound(&mut engine, &broken, &path).is_err());
        assert!(!path.exists());

        // Playback limit reached
        let mut engine = AudioEngine::new(8000.0, 0.7).with_max_playbacks(1);
        engine.play(&SoundParameters::default());
        assert!(record_sound(&mut engine, &SoundParameters::default(), &path).is_err());
        assert!(!path.exists());
    }
}
