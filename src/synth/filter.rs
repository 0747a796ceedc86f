//! Resonant lowpass biquad
//!
//! Shared by every voice of one playback. Resonance is given in decibels of
//! peak gain at the cutoff, so a resonance of 0 is a plain Q of 1.

use std::f64::consts::PI;

/// Normalised biquad coefficients (a0 = 1)
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Lowpass biquad filter
#[derive(Debug, Clone)]
pub struct LowpassFilter {
    sample_rate: f64,
    cutoff: f64,
    resonance: f64, // dB

    coeffs: Coefficients,

    // Direct Form II transposed state
    z1: f64,
    z2: f64,
}

impl LowpassFilter {
    /// Lowest cutoff the filter will run at
    pub const MIN_CUTOFF: f64 = 10.0;
    pub const MAX_RESONANCE: f64 = 20.0;

    pub fn new(sample_rate: f64, cutoff: f64, resonance: f64) -> Self {
        let mut filter = Self {
            sample_rate,
            cutoff: 0.0,
            resonance: 0.0,
            coeffs: Coefficients { b0: 1.0, b1: 0.0, b2: 0.0, a1: 0.0, a2: 0.0 },
            z1: 0.0,
            z2: 0.0,
        };
        filter.cutoff = filter.clamp_cutoff(cutoff);
        filter.resonance = resonance.clamp(0.0, Self::MAX_RESONANCE);
        filter.calculate_coefficients();
        filter
    }

    fn clamp_cutoff(&self, hz: f64) -> f64 {
        hz.clamp(Self::MIN_CUTOFF, self.sample_rate * 0.45)
    }

    /// Effective cutoff after clamping
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn resonance(&self) -> f64 {
        self.resonance
    }

    fn calculate_coefficients(&mut self) {
        let omega = 2.0 * PI * self.cutoff / self.sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let q = 10f64.powf(self.resonance / 20.0);
        let alpha = sin_omega / (2.0 * q);

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        self.coeffs = Coefficients {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        };
    }

    /// Process a single sample through the filter
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.z1;

        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_clamping() {
        assert_eq!(LowpassFilter::new(44100.0, 1000.0, 1.0).cutoff(), 1000.0);
        assert_eq!(LowpassFilter::new(44100.0, 0.0, 1.0).cutoff(), LowpassFilter::MIN_CUTOFF);
        assert!(LowpassFilter::new(44100.0, 25000.0, 1.0).cutoff() < 44100.0 * 0.5);
    }

    #[test]
    fn test_resonance_clamping() {
        assert_eq!(LowpassFilter::new(44100.0, 1000.0, -3.0).resonance(), 0.0);
        assert_eq!(
            LowpassFilter::new(44100.0, 1000.0, 100.0).resonance(),
            LowpassFilter::MAX_RESONANCE
        );
    }

    #[test]
    fn test_zero_resonance_stays_finite() {
        let mut filter = LowpassFilter::new(44100.0, 1000.0, 0.0);
        for i in 0..4410 {
            let t = i as f64 / 44100.0;
            let output = filter.process((2.0 * PI * 440.0 * t).sin());
            assert!(output.is_finite());
        }
    }

    #[test]
    fn test_attenuates_high_frequencies() {
        let mut filter = LowpassFilter::new(44100.0, 100.0, 0.0);

        let freq = 5000.0;
        let mut max_input = 0.0f64;
        let mut max_output = 0.0f64;

        for i in 0..1000 {
            let t = i as f64 / 44100.0;
            let input = (2.0 * PI * freq * t).sin();
            let output = filter.process(input);

            max_input = max_input.max(input.abs());
            max_output = max_output.max(output.abs());
        }

        assert!(max_output < max_input * 0.1,
            "Expected attenuation, got output={} input={}", max_output, max_input);
    }

    #[test]
    fn test_passes_low_frequencies() {
        let mut filter = LowpassFilter::new(44100.0, 5000.0, 0.0);

        let freq = 100.0;
        let mut sum_input_sq = 0.0;
        let mut sum_output_sq = 0.0;

        for i in 0..4410 {
            let t = i as f64 / 44100.0;
            let input = (2.0 * PI * freq * t).sin();
            let output = filter.process(input);

            if i > 100 {
                sum_input_sq += input * input;
                sum_output_sq += output * output;
            }
        }

        let ratio = (sum_output_sq / sum_input_sq).sqrt();
        assert!(ratio > 0.9, "Expected passthrough, got ratio={}", ratio);
    }
}
