//! Oscillator + gain pair

use super::{Envelope, Oscillator, Waveform};

/// What a voice contributes to a sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceRole {
    /// The carrier, modulated by the patch's modulator
    Main,
    Octave,
    Fifth,
    Third,
}

impl VoiceRole {
    /// Frequency ratio to the carrier
    pub fn ratio(&self) -> f64 {
        match self {
            VoiceRole::Main => 1.0,
            VoiceRole::Octave => 2.0,
            VoiceRole::Fifth => 1.5,
            VoiceRole::Third => 1.25,
        }
    }
}

/// A single sounding voice.
///
/// Output is `oscillator * envelope * level`: the envelope shapes every voice
/// the same way and `level` is the voice's fixed mix gain.
#[derive(Debug, Clone)]
pub struct Voice {
    role: VoiceRole,
    oscillator: Oscillator,
    envelope: Envelope,
    level: f64,
}

impl Voice {
    pub fn new(
        role: VoiceRole,
        waveform: Waveform,
        carrier: f64,
        level: f64,
        envelope: Envelope,
        sample_rate: f64,
    ) -> Self {
        Self {
            role,
            oscillator: Oscillator::new(waveform, carrier * role.ratio(), sample_rate),
            envelope,
            level,
        }
    }

    pub fn role(&self) -> VoiceRole {
        self.role
    }

    pub fn frequency(&self) -> f64 {
        self.oscillator.frequency()
    }

    pub fn waveform(&self) -> Waveform {
        self.oscillator.waveform()
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Render one sample at engine time `t` with `fm` Hz of frequency offset.
    ///
    /// The oscillator only runs between the envelope's start and end.
    pub fn process(&mut self, t: f64, fm: f64) -> f64 {
        if t < self.envelope.start() || t >= self.envelope.end() {
            return 0.0;
        }
        self.oscillator.generate_modulated(fm) * self.envelope.level_at(t) * self.level
    }
}
