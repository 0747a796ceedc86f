//! Error types for sound synthesis

use thiserror::Error;

/// Result type for graph construction
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors raised while building a playback graph.
///
/// The engine never hands these to callers of `play`; they are logged and the
/// playback is dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// Invalid sample rate
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate { rate: f64 },

    /// A parameter that must be finite (and positive where noted) was not
    #[error("invalid parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Too many sounds already in flight
    #[error("playback limit reached ({limit} sounds in flight)")]
    PlaybackLimit { limit: usize },
}

impl SynthError {
    pub fn invalid_param(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter { name, value }
    }
}
