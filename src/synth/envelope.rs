//! Scheduled gain envelope
//!
//! A fixed automation curve evaluated against the engine clock: silence set at
//! the start time, a linear attack to the peak over the first tenth of the
//! duration, then an exponential decay to a quiet floor at the end.

/// Peak level reached at the end of the attack
pub const PEAK_LEVEL: f64 = 0.25;
/// Level at the end of the sound
pub const FLOOR_LEVEL: f64 = 0.01;
/// Stand-in for zero as the base of an exponential segment
pub const EPSILON_LEVEL: f64 = 0.0001;
/// Share of the duration spent in the attack
pub const ATTACK_FRACTION: f64 = 0.1;

/// How the curve reaches a point from the previous one
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ramp {
    Linear,
    Exponential,
}

/// Target of one envelope segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopePoint {
    /// Engine time in seconds
    pub time: f64,
    pub level: f64,
    pub ramp: Ramp,
}

/// Attack/decay envelope: level 0 at `start`, then two ramped segments
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    start: f64,
    segments: [EnvelopePoint; 2],
}

impl Envelope {
    /// Create the envelope for a sound starting at `start` lasting `duration` seconds
    pub fn new(start: f64, duration: f64) -> Self {
        Self {
            start,
            segments: [
                EnvelopePoint {
                    time: start + ATTACK_FRACTION * duration,
                    level: PEAK_LEVEL,
                    ramp: Ramp::Linear,
                },
                EnvelopePoint {
                    time: start + duration,
                    level: FLOOR_LEVEL,
                    ramp: Ramp::Exponential,
                },
            ],
        }
    }

    /// Attack and decay targets, in time order
    pub fn segments(&self) -> &[EnvelopePoint; 2] {
        &self.segments
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.segments[1].time
    }

    /// Level at engine time `t`
    pub fn level_at(&self, t: f64) -> f64 {
        if t < self.start {
            return 0.0;
        }

        let (mut from_time, mut from_level) = (self.start, 0.0);
        for segment in &self.segments {
            if t < segment.time {
                return interpolate(from_time, from_level, *segment, t);
            }
            from_time = segment.time;
            from_level = segment.level;
        }

        from_level
    }
}

fn interpolate(from_time: f64, from_level: f64, to: EnvelopePoint, t: f64) -> f64 {
    let span = to.time - from_time;
    if span <= 0.0 {
        return to.level;
    }
    let x = (t - from_time) / span;

    match to.ramp {
        Ramp::Linear => from_level + (to.level - from_level) * x,
        Ramp::Exponential => {
            let base = from_level.max(EPSILON_LEVEL);
            let target = to.level.max(EPSILON_LEVEL);
            base * (target / base).powf(x)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_envelope_segments() {
        let env = Envelope::new(2.0, 1.0);
        let [attack, decay] = env.segments();

        assert_eq!(env.start(), 2.0);
        assert!(close(attack.time, 2.1));
        assert_eq!(attack.level, PEAK_LEVEL);
        assert_eq!(attack.ramp, Ramp::Linear);
        assert_eq!(decay.time, 3.0);
        assert_eq!(env.end(), 3.0);
        assert_eq!(decay.level, FLOOR_LEVEL);
        assert_eq!(decay.ramp, Ramp::Exponential);
    }

    #[test]
    fn test_silent_before_start() {
        let env = Envelope::new(1.0, 0.5);
        assert_eq!(env.level_at(0.0), 0.0);
        assert_eq!(env.level_at(0.999), 0.0);
        assert_eq!(env.level_at(1.0), 0.0);
    }

    #[test]
    fn test_linear_attack() {
        let env = Envelope::new(0.0, 1.0);
        assert!(close(env.level_at(0.05), PEAK_LEVEL / 2.0));
        assert!(close(env.level_at(0.1), PEAK_LEVEL));
    }

    #[test]
    fn test_exponential_decay() {
        let env = Envelope::new(0.0, 1.0);

        // Geometric midpoint of the decay segment
        let mid = env.level_at(0.55);
        assert!(close(mid, (PEAK_LEVEL * FLOOR_LEVEL).sqrt()), "mid = {}", mid);

        assert!(close(env.level_at(1.0), FLOOR_LEVEL));
        assert!(close(env.level_at(5.0), FLOOR_LEVEL));
    }

    #[test]
    fn test_decay_is_monotonic() {
        let env = Envelope::new(0.0, 0.2);
        let mut last = env.level_at(0.02);
        for i in 1..=100 {
            let t = 0.02 + 0.18 * i as f64 / 100.0;
            let level = env.level_at(t);
            assert!(level <= last + 1e-12);
            last = level;
        }
    }

    #[test]
    fn test_exponential_from_zero_uses_epsilon() {
        let to = EnvelopePoint { time: 1.0, level: FLOOR_LEVEL, ramp: Ramp::Exponential };

        assert!(close(interpolate(0.0, 0.0, to, 0.0), EPSILON_LEVEL));
        assert!(interpolate(0.0, 0.0, to, 0.5).is_finite());
        assert!(close(interpolate(0.0, 0.0, to, 1.0), FLOOR_LEVEL));
    }
}
