//! Per-playback signal graph
//!
//! One patch is built for every `play` request: a carrier voice frequency
//! modulated by a sine modulator, optional harmonizer voices, and a single
//! lowpass filter that every voice feeds into.

use super::chaos::{apply_chaos, random_cutoff};
use super::{Envelope, LowpassFilter, Oscillator, Voice, VoiceRole, Waveform};
use crate::error::{SynthError, SynthResult};
use crate::params::SoundParameters;
use rand::Rng;

/// A fully scheduled sound
#[derive(Debug, Clone)]
pub struct Patch {
    /// Main voice first, then harmonizer voices
    voices: Vec<Voice>,
    modulator: Oscillator,
    /// Hz of carrier deviation per unit of modulator output
    mod_gain: f64,
    filter: LowpassFilter,
    /// Cutoff as requested, before the filter's own clamping
    filter_cutoff: f64,
    start: f64,
    duration: f64,
}

impl Patch {
    /// Build the graph for `params` starting at engine time `start` (seconds).
    ///
    /// Chaos draws happen in a fixed order (carrier, modulator, cutoff) so a
    /// seeded RNG reproduces the same sound.
    pub fn build<R: Rng + ?Sized>(
        params: &SoundParameters,
        rng: &mut R,
        sample_rate: f64,
        start: f64,
    ) -> SynthResult<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SynthError::InvalidSampleRate { rate: sample_rate });
        }
        check_finite(params)?;
        if params.duration_ms <= 0.0 {
            return Err(SynthError::invalid_param("durationMs", params.duration_ms));
        }
        if !start.is_finite() {
            return Err(SynthError::invalid_param("start", start));
        }

        let duration = params.duration_secs();
        let carrier = apply_chaos(rng, params.frequency, params.chaos_frequency);
        let modulator_frequency = apply_chaos(rng, params.mod_frequency, params.chaos_modulation);
        let filter_cutoff = if params.chaos_filter {
            random_cutoff(rng, params.filter_frequency)
        } else {
            params.filter_frequency
        };

        let envelope = Envelope::new(start, duration);
        let mut voices = vec![Voice::new(
            VoiceRole::Main,
            params.waveform,
            carrier,
            1.0,
            envelope.clone(),
            sample_rate,
        )];

        let harmonizer = &params.harmonizer;
        if harmonizer.enabled {
            let overtones = [
                (VoiceRole::Octave, harmonizer.octave),
                (VoiceRole::Fifth, harmonizer.fifth),
                (VoiceRole::Third, harmonizer.third),
            ];
            for (role, level) in overtones {
                if level > 0.0 {
                    voices.push(Voice::new(
                        role,
                        params.waveform,
                        carrier,
                        level,
                        envelope.clone(),
                        sample_rate,
                    ));
                }
            }
        }

        log::debug!(
            target: "synth",
            "patch: {} at {:.1} Hz, {} voice(s), cutoff {:.1} Hz, {:.0} ms",
            params.waveform,
            carrier,
            voices.len(),
            filter_cutoff,
            params.duration_ms
        );

        Ok(Self {
            voices,
            modulator: Oscillator::new(Waveform::Sine, modulator_frequency, sample_rate),
            mod_gain: carrier * (params.mod_depth / 100.0),
            filter: LowpassFilter::new(sample_rate, filter_cutoff, params.filter_resonance),
            filter_cutoff,
            start,
            duration,
        })
    }

    /// Render one sample at engine time `t`
    pub fn render(&mut self, t: f64) -> f64 {
        if t < self.start {
            return 0.0;
        }

        let fm = if t < self.end() {
            self.modulator.generate() * self.mod_gain
        } else {
            0.0
        };

        let mut sum = 0.0;
        for voice in &mut self.voices {
            let offset = if voice.role() == VoiceRole::Main { fm } else { 0.0 };
            sum += voice.process(t, offset);
        }

        self.filter.process(sum)
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Carrier after jitter
    pub fn carrier_frequency(&self) -> f64 {
        self.voices[0].frequency()
    }

    /// Modulator after jitter
    pub fn modulator_frequency(&self) -> f64 {
        self.modulator.frequency()
    }

    pub fn mod_gain(&self) -> f64 {
        self.mod_gain
    }

    pub fn filter_cutoff(&self) -> f64 {
        self.filter_cutoff
    }

    pub fn filter_resonance(&self) -> f64 {
        self.filter.resonance()
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    /// When every oscillator stops
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}

fn check_finite(params: &SoundParameters) -> SynthResult<()> {
    let fields = [
        ("frequency", params.frequency),
        ("durationMs", params.duration_ms),
        ("modFrequency", params.mod_frequency),
        ("modDepth", params.mod_depth),
        ("filterFrequency", params.filter_frequency),
        ("filterResonance", params.filter_resonance),
        ("chaosFrequency", params.chaos_frequency),
        ("chaosModulation", params.chaos_modulation),
        ("harmonizerOctave", params.harmonizer.octave),
        ("harmonizerFifth", params.harmonizer.fifth),
        ("harmonizerThird", params.harmonizer.third),
    ];
    for (name, value) in fields {
        if !value.is_finite() {
            return Err(SynthError::invalid_param(name, value));
        }
    }
    Ok(())
}
