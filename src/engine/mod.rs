//! Audio engine for toneforge
//!
//! Owns the output gain, the audio clock and every sound in flight. Callers
//! fire sounds with [`AudioEngine::play`]; the audio callback pulls samples
//! with [`AudioEngine::process`].

mod player;
mod recorder;

pub use player::{default_output_config, list_output_devices, Player};
pub use recorder::{record_sound, Recorder};

use crate::config::ToneforgeConfig;
use crate::error::{SynthError, SynthResult};
use crate::params::SoundParameters;
use crate::store::{volume_to_percent, VolumeStore};
use crate::synth::Patch;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::sync::{Arc, Mutex};

/// Engine shared between the caller and the audio callback
pub type SharedEngine = Arc<Mutex<AudioEngine>>;

/// Time a playback is kept after its scheduled end
pub const RELEASE_MARGIN_SECS: f64 = 0.1;

/// A sound in flight
#[derive(Debug)]
pub struct Playback {
    patch: Patch,
    issued_at: f64,
    release_at: f64,
}

impl Playback {
    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    /// Engine time at which `play` was called
    pub fn issued_at(&self) -> f64 {
        self.issued_at
    }

    /// Engine time at which the playback's nodes are dropped
    pub fn release_at(&self) -> f64 {
        self.release_at
    }
}

/// The main audio engine
pub struct AudioEngine {
    sample_rate: f64,
    /// Samples rendered so far
    clock: u64,
    volume: f64,
    playbacks: Vec<Playback>,
    max_playbacks: usize,
    rng: Pcg32,
    store: Option<Arc<dyn VolumeStore>>,
}

impl AudioEngine {
    /// Create an engine rendering at `sample_rate`
    pub fn new(sample_rate: f64, volume: f64) -> Self {
        Self {
            sample_rate,
            clock: 0,
            volume,
            playbacks: Vec::new(),
            max_playbacks: 32,
            rng: Pcg32::seed_from_u64(rand::random()),
            store: None,
        }
    }

    /// Create an engine from configuration at the output's sample rate
    pub fn from_config(config: &ToneforgeConfig, sample_rate: f64) -> Self {
        let engine = Self::new(sample_rate, config.master.volume)
            .with_max_playbacks(config.engine.max_playbacks);
        match config.engine.seed {
            Some(seed) => engine.with_seed(seed),
            None => engine,
        }
    }

    /// Use a fixed RNG seed so chaos is reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg32::seed_from_u64(seed);
        self
    }

    pub fn with_max_playbacks(mut self, max_playbacks: usize) -> Self {
        self.max_playbacks = max_playbacks;
        self
    }

    /// Persist volume changes to `store`
    pub fn with_store(mut self, store: Arc<dyn VolumeStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Wrap the engine for sharing with the audio callback
    pub fn shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Current engine time in seconds
    pub fn now(&self) -> f64 {
        self.clock as f64 / self.sample_rate
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Sounds currently in flight
    pub fn playbacks(&self) -> &[Playback] {
        &self.playbacks
    }

    pub fn is_idle(&self) -> bool {
        self.playbacks.is_empty()
    }

    /// Start a sound now.
    ///
    /// Returns immediately. If the graph cannot be built the failure is
    /// logged and nothing plays.
    pub fn play(&mut self, params: &SoundParameters) {
        if let Err(e) = self.schedule(params) {
            log::warn!(target: "synth", "sound not played: {}", e);
        }
    }

    fn schedule(&mut self, params: &SoundParameters) -> SynthResult<()> {
        if self.playbacks.len() >= self.max_playbacks {
            return Err(SynthError::PlaybackLimit { limit: self.max_playbacks });
        }

        let now = self.now();
        let patch = Patch::build(params, &mut self.rng, self.sample_rate, now)?;
        let release_at = now + patch.duration() + RELEASE_MARGIN_SECS;

        self.playbacks.push(Playback {
            patch,
            issued_at: now,
            release_at,
        });
        Ok(())
    }

    /// Set the output gain.
    ///
    /// Does nothing if `level` is already the current volume or is not a
    /// finite number. With `persist` the new level is pushed to the volume
    /// store in the background; the local change stands whatever the store does.
    pub fn set_volume(&mut self, level: f64, persist: bool) {
        if !level.is_finite() {
            log::warn!(target: "audio", "ignoring non-finite volume {}", level);
            return;
        }
        if level == self.volume {
            return;
        }
        self.volume = level;

        if persist {
            match &self.store {
                Some(store) => store.persist(volume_to_percent(level)),
                None => log::debug!(target: "store", "no volume store configured, not persisting"),
            }
        }
    }

    /// Apply a volume loaded from the store without writing it back
    pub fn restore_volume(&mut self, percent: u8) {
        log::info!(target: "store", "restored volume {}%", percent);
        self.set_volume(f64::from(percent.min(100)) / 100.0, false);
    }

    /// Generate the next sample (mix of all playbacks)
    pub fn process(&mut self) -> f64 {
        let t = self.now();

        let mut output = 0.0;
        for playback in &mut self.playbacks {
            output += playback.patch.render(t);
        }

        self.clock += 1;
        let now = self.now();
        self.playbacks.retain(|p| p.release_at > now);

        output * self.volume
    }

    /// Fill a buffer with samples
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process() as f32;
        }
    }

    /// Render until every playback has been released
    pub fn render_until_idle(&mut self) -> Vec<f32> {
        let mut samples = Vec::new();
        while !self.is_idle() {
            samples.push(self.process() as f32);
        }
        samples
    }
}
