//! Samplers of chance continuums, used to estimate the disorder expected by chance.
pub mod shuffle;
pub mod statistical;

pub use shuffle::ShuffleSampler;
pub use statistical::StatisticalSampler;

use anyhow::Result;
use rand::rngs::StdRng;
use statrs::distribution::Normal;

use crate::continuum::Continuum;

/// Generates random continuums that resemble a reference continuum.
pub trait ContinuumSampler: Send + Sync {
    fn sample(&self, rng: &mut StdRng) -> Result<Continuum>;
}

/// A normal distribution summarized by its mean and standard deviation.  A zero (or invalid)
/// standard deviation always yields the mean.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Spread {
    pub mean: f64,
    pub std_dev: f64,
}

impl Spread {
    pub fn of(values: &[f64]) -> Self {
        Self {
            mean: crate::util::stats::mean(values),
            std_dev: crate::util::stats::std_dev(values),
        }
    }

    pub fn sample(&self, rng: &mut StdRng) -> f64 {
        use rand::distributions::Distribution;
        match Normal::new(self.mean, self.std_dev) {
            Ok(normal) if self.std_dev > 0.0 => normal.sample(rng),
            _ => self.mean,
        }
    }
}

#[cfg(test)]
pub mod tests {
    use float_cmp::assert_approx_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    use super::Spread;

    #[rstest]
    fn test_zero_spread_yields_mean() {
        let mut rng = StdRng::seed_from_u64(42);
        let spread = Spread::of(&[3.0, 3.0, 3.0]);
        for _ in 0..10 {
            assert_approx_eq!(f64, spread.sample(&mut rng), 3.0);
        }
    }

    #[rstest]
    fn test_spread_sampling_is_centered() {
        let mut rng = StdRng::seed_from_u64(7);
        let spread = Spread {
            mean: 10.0,
            std_dev: 2.0,
        };
        let values = (0..5000).map(|_| spread.sample(&mut rng)).collect::<Vec<_>>();
        let sampled = Spread::of(&values);
        assert!((sampled.mean - 10.0).abs() < 0.2);
        assert!((sampled.std_dev - 2.0).abs() < 0.2);
    }
}
