//! Synthesis building blocks
//!
//! Oscillators, the shared lowpass filter, the scheduled envelope, voices,
//! chaos jitter, and the per-playback patch that wires them together.

pub mod chaos;
pub mod envelope;
mod filter;
mod oscillator;
mod patch;
mod voice;

pub use chaos::apply_chaos;
pub use envelope::{Envelope, EnvelopePoint, Ramp};
pub use filter::LowpassFilter;
pub use oscillator::{Oscillator, Waveform};
pub use patch::Patch;
pub use voice::{Voice, VoiceRole};
