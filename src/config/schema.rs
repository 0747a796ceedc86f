//! Configuration schema definitions

use crate::params::{validate, Validation};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main configuration for toneforge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneforgeConfig {
    /// Audio output settings
    pub audio: AudioConfig,

    /// Output level
    pub master: MasterConfig,

    /// Synthesis engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Remote configuration store and unit catalog
    #[serde(default)]
    pub store: Option<StoreConfig>,

    /// Named sounds, each a parameter vector or record
    #[serde(default)]
    pub sounds: BTreeMap<String, serde_json::Value>,
}

impl ToneforgeConfig {
    /// Validate the configuration.
    ///
    /// Sound definitions are not checked here; they are repaired when used.
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if self.audio.buffer_size < 64 || self.audio.buffer_size > 8192 {
            bail!("Buffer size must be between 64 and 8192");
        }

        if !(0.0..=1.0).contains(&self.master.volume) {
            bail!("Master volume must be between 0.0 and 1.0");
        }

        if self.engine.max_playbacks == 0 || self.engine.max_playbacks > 256 {
            bail!("max_playbacks must be between 1 and 256");
        }

        if let Some(store) = &self.store {
            if !(store.base_url.starts_with("http://") || store.base_url.starts_with("https://")) {
                bail!("Store base_url must start with http:// or https://");
            }
            if store.timeout_secs == 0 || store.timeout_secs > 60 {
                bail!("Store timeout_secs must be between 1 and 60");
            }
        }

        Ok(())
    }

    /// Validate a named sound, if it exists
    pub fn sound(&self, name: &str) -> Option<Validation> {
        self.sounds.get(name).map(validate)
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz for offline renders (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Output callback size in frames, clamped to the device's range (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Output device name (None = default device)
    pub device: Option<String>,
}

fn default_sample_rate() -> u32 { 44100 }
fn default_buffer_size() -> usize { 512 }

/// Master output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Output gain 0.0-1.0, used until a stored volume arrives (default: 0.7)
    #[serde(default = "default_volume")]
    pub volume: f64,
}

fn default_volume() -> f64 { 0.7 }

/// Synthesis engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sounds allowed in flight at once (default: 32)
    #[serde(default = "default_max_playbacks")]
    pub max_playbacks: usize,

    /// Fixed RNG seed for reproducible chaos (None = random)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_playbacks: default_max_playbacks(),
            seed: None,
        }
    }
}

fn default_max_playbacks() -> usize { 32 }

/// HTTP backend holding the stored volume and unit records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL, e.g. http://localhost:3000
    pub base_url: String,

    /// Request timeout in seconds (default: 5)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 { 5 }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Waveform;

    fn test_config() -> ToneforgeConfig {
        ToneforgeConfig {
            audio: AudioConfig {
                sample_rate: 44100,
                buffer_size: 512,
                device: None,
            },
            master: MasterConfig { volume: 0.7 },
            engine: EngineConfig::default(),
            store: None,
            sounds: BTreeMap::new(),
        }
    }

    #[test]
    fn test_default_audio_config() {
        let yaml = "sample_rate: 48000";
        let config: AudioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.buffer_size, 512); // default
    }

    #[test]
    fn test_store_config_defaults() {
        let yaml = "base_url: http://localhost:3000";
        let config: StoreConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_sounds_from_yaml() {
        let yaml = r#"
audio:
  sample_rate: 44100
master:
  volume: 0.5
sounds:
  attack: ["square", 440, 1000, 5, 20, 1000, 1, 0, 0, false, false, 0, 0, 0]
  death:
    oscillatorType: sawtooth
    frequency: 110
"#;
        let config: ToneforgeConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());

        let attack = config.sound("attack").unwrap();
        assert!(attack.is_clean());
        assert_eq!(attack.params.waveform, Waveform::Square);
        assert!(!attack.params.harmonizer.enabled);

        let death = config.sound("death").unwrap();
        assert_eq!(death.params.waveform, Waveform::Sawtooth);
        assert_eq!(death.params.frequency, 110.0);
        assert!(!death.is_clean());

        assert!(config.sound("missing").is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_buffer_size() {
        let mut config = test_config();
        config.audio.buffer_size = 32;
        assert!(config.validate().is_err());

        config.audio.buffer_size = 16384;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_volume() {
        let mut config = test_config();
        config.master.volume = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_max_playbacks() {
        let mut config = test_config();
        config.engine.max_playbacks = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_store_url() {
        let mut config = test_config();
        config.store = Some(StoreConfig {
            base_url: "localhost:3000".to_string(),
            timeout_secs: 5,
        });
        assert!(config.validate().is_err());

        config.store = Some(StoreConfig {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 0,
        });
        assert!(config.validate().is_err());
    }
}
