//! toneforge - Procedural sound effects for game units
//!
//! Turns a 14-value parameter vector into a short synthesized sound: an FM
//! carrier with optional harmonizer voices, a resonant lowpass, and a fixed
//! attack/decay envelope, with optional random jitter on every play.

pub mod config;
pub mod engine;
pub mod error;
pub mod params;
pub mod store;
pub mod synth;

pub use config::ToneforgeConfig;
pub use engine::{AudioEngine, SharedEngine};
pub use error::SynthError;
pub use params::SoundParameters;
