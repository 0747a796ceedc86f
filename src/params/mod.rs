//! Sound parameter sets
//!
//! A sound is described by 14 values. Outside the crate they travel as a
//! positional JSON vector (or a record keyed by field name) with harmonizer
//! gains in percent; inside they are a validated [`SoundParameters`] with
//! harmonizer gains as fractions. [`validate`] is the only place that
//! converts between the two.

mod validate;

pub use validate::{validate, validate_record, validate_vector, Repair, RepairReason, Validation};

use crate::synth::Waveform;
use serde_json::{json, Value};

/// Number of elements in a parameter vector
pub const VECTOR_LEN: usize = 14;

/// Field names in vector order
pub const FIELD_NAMES: [&str; VECTOR_LEN] = [
    "oscillatorType",
    "frequency",
    "durationMs",
    "modFrequency",
    "modDepth",
    "filterFrequency",
    "filterResonance",
    "chaosFrequency",
    "chaosModulation",
    "chaosFilter",
    "harmonizerEnabled",
    "harmonizerOctave",
    "harmonizerFifth",
    "harmonizerThird",
];

/// Overtone voices layered above the carrier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harmonizer {
    pub enabled: bool,
    /// Gain of the voice an octave up (fraction 0-1)
    pub octave: f64,
    /// Gain of the voice a fifth up (fraction 0-1)
    pub fifth: f64,
    /// Gain of the voice a major third up (fraction 0-1)
    pub third: f64,
}

impl Default for Harmonizer {
    fn default() -> Self {
        Self {
            enabled: true,
            octave: 0.5,
            fifth: 0.3,
            third: 0.2,
        }
    }
}

/// A validated sound description
#[derive(Debug, Clone, PartialEq)]
pub struct SoundParameters {
    pub waveform: Waveform,
    /// Carrier frequency in Hz (20-2000)
    pub frequency: f64,
    /// Length of the sound in milliseconds (50-2000)
    pub duration_ms: f64,
    /// Modulator frequency in Hz (0.1-20)
    pub mod_frequency: f64,
    /// FM depth as percent of the carrier (0-100)
    pub mod_depth: f64,
    /// Lowpass cutoff in Hz (20-5000)
    pub filter_frequency: f64,
    /// Lowpass resonance (0-20)
    pub filter_resonance: f64,
    /// Carrier jitter (0-10)
    pub chaos_frequency: f64,
    /// Modulator jitter (0-10)
    pub chaos_modulation: f64,
    /// Re-roll the cutoff on every play
    pub chaos_filter: bool,
    pub harmonizer: Harmonizer,
}

impl Default for SoundParameters {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            frequency: 440.0,
            duration_ms: 200.0,
            mod_frequency: 5.0,
            mod_depth: 20.0,
            filter_frequency: 1000.0,
            filter_resonance: 1.0,
            chaos_frequency: 0.0,
            chaos_modulation: 0.0,
            chaos_filter: false,
            harmonizer: Harmonizer::default(),
        }
    }
}

impl SoundParameters {
    /// Validate a vector or record, repairing anything out of domain
    pub fn from_value(value: &Value) -> Self {
        validate(value).params
    }

    /// Validate a positional vector
    pub fn from_vector(values: &[Value]) -> Self {
        validate_vector(values).params
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_ms / 1000.0
    }

    /// Serialise back to the positional vector form (harmonizer in percent)
    pub fn to_vector(&self) -> Vec<Value> {
        vec![
            json!(self.waveform.as_str()),
            json!(self.frequency),
            json!(self.duration_ms),
            json!(self.mod_frequency),
            json!(self.mod_depth),
            json!(self.filter_frequency),
            json!(self.filter_resonance),
            json!(self.chaos_frequency),
            json!(self.chaos_modulation),
            json!(self.chaos_filter),
            json!(self.harmonizer.enabled),
            json!(self.harmonizer.octave * 100.0),
            json!(self.harmonizer.fifth * 100.0),
            json!(self.harmonizer.third * 100.0),
        ]
    }
}
