use rand::rngs::StdRng;
use rand::Rng;

/// Uniform sample from the interval between `a` and `b`, in either order.
pub(super) fn sample(rng: &mut StdRng, a: f64, b: f64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi - lo <= f64::EPSILON {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

/// Jitters `input` downwards by up to `minus` or upwards by up to `plus`,
/// scaled by `randomness`.
pub(super) fn jitter_asymmetric(rng: &mut StdRng, input: f64, minus: f64, plus: f64, randomness: f64) -> f64 {
    let r = sample(rng, -randomness, randomness);
    if r < 0.0 {
        input - r * sample(rng, 0.0, minus)
    } else {
        input + r * sample(rng, 0.0, plus)
    }
}

/// Jitters `input` towards `min` or `max`.
pub(super) fn randomize(rng: &mut StdRng, input: f64, min: f64, max: f64, randomness: f64) -> f64 {
    jitter_asymmetric(rng, input, (input - min).abs(), (input - max).abs(), randomness)
}

pub(super) fn jitter(rng: &mut StdRng, input: f64, delta: f64, randomness: f64) -> f64 {
    let r = sample(rng, -randomness, randomness);
    input + r * sample(rng, -delta, delta)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn sample_accepts_reversed_and_empty_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let x = sample(&mut rng, 1.0, -1.0);
            assert!((-1.0..=1.0).contains(&x));
        }
        assert!((sample(&mut rng, 0.3, 0.3) - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_randomness_leaves_inputs_alone() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!((jitter(&mut rng, 5.0, 2.0, 0.0) - 5.0).abs() < f64::EPSILON);
        assert!((jitter_asymmetric(&mut rng, 5.0, 2.0, 2.0, 0.0) - 5.0).abs() < f64::EPSILON);
        assert!((randomize(&mut rng, 2.0, 0.0, 4.0, 0.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn randomize_stays_between_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let x = randomize(&mut rng, 1.0, 0.0, 3.0, 1.0);
            assert!((0.0..=3.0).contains(&x), "got {x}");
        }
    }
}
