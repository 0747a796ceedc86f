//! Bounded random jitter for sound parameters

use rand::Rng;

/// Jitter `base` by up to `amount` times its own magnitude.
///
/// `amount` is the raw chaos setting (0-10), so an amount of 1 allows the
/// result to land anywhere from 0 to twice the base. Non-positive amounts
/// return `base` untouched without drawing from the RNG.
pub fn apply_chaos<R: Rng + ?Sized>(rng: &mut R, base: f64, amount: f64) -> f64 {
    if !(amount > 0.0) {
        return base;
    }
    let u: f64 = rng.gen_range(-1.0..1.0);
    base + u * (base * amount)
}

/// Draw a filter cutoff uniformly from `[0, max)`
pub fn random_cutoff<R: Rng + ?Sized>(rng: &mut R, max: f64) -> f64 {
    if !(max > 0.0) {
        return 0.0;
    }
    rng.gen_range(0.0..max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_zero_chaos_is_identity() {
        let mut rng = Pcg32::seed_from_u64(7);
        for v in [0.0, 20.0, 440.0, 1999.5, -3.0] {
            assert_eq!(apply_chaos(&mut rng, v, 0.0), v);
            assert_eq!(apply_chaos(&mut rng, v, -1.0), v);
            assert_eq!(apply_chaos(&mut rng, v, f64::NAN), v);
        }
    }

    #[test]
    fn test_zero_chaos_leaves_rng_untouched() {
        let mut a = Pcg32::seed_from_u64(3);
        let mut b = Pcg32::seed_from_u64(3);

        apply_chaos(&mut a, 440.0, 0.0);
        assert_eq!(a.gen::<u32>(), b.gen::<u32>());
    }

    #[test]
    fn test_chaos_stays_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(42);
        for &amount in &[0.1, 1.0, 2.5, 10.0] {
            for &v in &[20.0, 440.0, 2000.0] {
                for _ in 0..500 {
                    let out = apply_chaos(&mut rng, v, amount);
                    assert!(out >= v - v * amount && out <= v + v * amount,
                        "{} out of range for v={} c={}", out, v, amount);
                }
            }
        }
    }

    #[test]
    fn test_chaos_actually_varies() {
        let mut rng = Pcg32::seed_from_u64(42);
        let first = apply_chaos(&mut rng, 440.0, 1.0);
        let varied = (0..20).any(|_| apply_chaos(&mut rng, 440.0, 1.0) != first);
        assert!(varied);
    }

    #[test]
    fn test_random_cutoff_range() {
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..1000 {
            let cutoff = random_cutoff(&mut rng, 1000.0);
            assert!((0.0..1000.0).contains(&cutoff));
        }
        assert_eq!(random_cutoff(&mut rng, 0.0), 0.0);
    }
}
