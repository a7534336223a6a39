//! Small summary statistics used by the samplers and the gamma estimator.
use anyhow::{ensure, Result};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// The arithmetic mean, or zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// The sample (n - 1) standard deviation, or zero when fewer than two values are given.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// A symmetric confidence interval `[mean - half_width, mean + half_width]` around a mean.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub half_width: f64,
}

impl ConfidenceInterval {
    /// The Student-t confidence interval of the mean of `values` at the given confidence level.
    pub fn of_mean(values: &[f64], confidence_level: f64) -> Result<Self> {
        ensure!(
            values.len() >= 2,
            "At least two values are needed for a confidence interval, found {}",
            values.len()
        );
        ensure!(
            confidence_level > 0.0 && confidence_level < 1.0,
            "Confidence level must be in (0, 1): {}",
            confidence_level
        );
        let n = values.len() as f64;
        let students_t = StudentsT::new(0.0, 1.0, n - 1.0)?;
        let t = students_t.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0);
        Ok(Self {
            mean: mean(values),
            half_width: t * std_dev(values) / n.sqrt(),
        })
    }

    pub fn low(&self) -> f64 {
        self.mean - self.half_width
    }

    pub fn high(&self) -> f64 {
        self.mean + self.half_width
    }

    /// The half width relative to the mean, infinite when the mean is zero.
    pub fn relative_half_width(&self) -> f64 {
        if self.mean == 0.0 {
            f64::INFINITY
        } else {
            self.half_width / self.mean.abs()
        }
    }
}

#[cfg(test)]
pub mod tests {
    use float_cmp::{approx_eq, assert_approx_eq};
    use rstest::rstest;

    use super::{mean, std_dev, ConfidenceInterval};

    #[rstest]
    fn test_mean_and_std_dev() {
        assert_approx_eq!(f64, mean(&[]), 0.0);
        assert_approx_eq!(f64, mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_approx_eq!(f64, std_dev(&[5.0]), 0.0);
        assert_approx_eq!(f64, std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.138_089_935_299_395, epsilon = 1e-12);
    }

    #[rstest]
    fn test_confidence_interval() {
        // t(0.975, df = 9) = 2.262157
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let ci = ConfidenceInterval::of_mean(&values, 0.95).unwrap();
        assert_approx_eq!(f64, ci.mean, 5.5);
        let expected = 2.262_157 * std_dev(&values) / 10f64.sqrt();
        assert!(approx_eq!(f64, ci.half_width, expected, epsilon = 1e-4));
        assert!(ci.low() < 5.5 && ci.high() > 5.5);
    }

    #[rstest]
    fn test_confidence_interval_constant_values() {
        let ci = ConfidenceInterval::of_mean(&[2.0, 2.0, 2.0], 0.9).unwrap();
        assert_approx_eq!(f64, ci.half_width, 0.0);
        assert_approx_eq!(f64, ci.relative_half_width(), 0.0);
    }

    #[rstest]
    #[case(&[1.0], 0.95)]
    #[case(&[1.0, 2.0], 1.0)]
    #[case(&[1.0, 2.0], 0.0)]
    fn test_confidence_interval_invalid(#[case] values: &[f64], #[case] confidence_level: f64) {
        assert!(ConfidenceInterval::of_mean(values, confidence_level).is_err());
    }
}
