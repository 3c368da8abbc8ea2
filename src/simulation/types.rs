use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Monte Carlo price estimate with its sampling error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    /// Discounted mean payoff
    pub value: f64,
    /// Number of replicates averaged
    pub sample_count: usize,
    /// Discounted standard error of the mean (0 with fewer than two samples)
    pub std_error: f64,
}

impl PriceEstimate {
    /// Estimate known without sampling error, e.g. the payoff at maturity.
    pub fn exact(value: f64, sample_count: usize) -> Self {
        Self {
            value,
            sample_count,
            std_error: 0.0,
        }
    }

    /// Two-sided normal-approximation confidence interval at `level` (e.g. 0.95).
    ///
    /// Returns `None` unless `0 < level < 1`.
    pub fn confidence_interval(&self, level: f64) -> Option<(f64, f64)> {
        if !(level > 0.0 && level < 1.0) {
            return None;
        }
        let normal = Normal::new(0.0, 1.0).ok()?;
        let z = normal.inverse_cdf(0.5 + 0.5 * level);
        let half_width = z * self.std_error;
        Some((self.value - half_width, self.value + half_width))
    }

    /// Distance to `reference` measured in standard errors.
    ///
    /// Infinite when the estimate has no sampling error but misses `reference`.
    pub fn z_score(&self, reference: f64) -> f64 {
        let diff = (self.value - reference).abs();
        if self.std_error > 0.0 {
            diff / self.std_error
        } else if diff == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    }
}

/// Running mean and centred sum of squares of payoffs, mergeable across threads.
///
/// Welford updates per sample and Chan's pairwise combination on merge, so the
/// variance stays accurate when payoffs are large relative to their spread.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PayoffAccumulator {
    pub count: usize,
    pub mean: f64,
    /// Sum of squared deviations from the running mean
    pub m2: f64,
}

impl PayoffAccumulator {
    #[inline]
    pub fn push(mut self, payoff: f64) -> Self {
        self.count += 1;
        let delta = payoff - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (payoff - self.mean);
        self
    }

    pub fn merge(self, other: Self) -> Self {
        if other.count == 0 {
            return self;
        }
        if self.count == 0 {
            return other;
        }
        let count = self.count + other.count;
        let (na, nb, n) = (self.count as f64, other.count as f64, count as f64);
        let delta = other.mean - self.mean;
        Self {
            count,
            mean: self.mean + delta * nb / n,
            m2: self.m2 + other.m2 + delta * delta * na * nb / n,
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance (`n - 1` denominator).
    pub fn sample_variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        self.m2 / (self.count - 1) as f64
    }

    /// Turn the accumulated payoffs into a discounted estimate.
    pub fn into_estimate(self, discount: f64) -> PriceEstimate {
        let std_error = if self.count < 2 {
            0.0
        } else {
            discount * (self.sample_variance() / self.count as f64).sqrt()
        };
        PriceEstimate {
            value: discount * self.mean(),
            sample_count: self.count,
            std_error,
        }
    }
}

/// Analytic and Monte Carlo prices side by side for one spot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Spot price
    pub spot: f64,
    /// Valuation time in years
    pub time: f64,
    /// Closed-form Black-Scholes price
    pub analytic_price: f64,
    /// Monte Carlo estimate
    pub mc_price: f64,
    /// Monte Carlo standard error
    pub mc_std_error: f64,
    /// Replicates used for the Monte Carlo estimate
    pub sample_count: usize,
}

impl PricingResult {
    /// Absolute Monte Carlo error against the analytic price.
    pub fn abs_error(&self) -> f64 {
        (self.mc_price - self.analytic_price).abs()
    }

    /// Monte Carlo error relative to the analytic price (`None` when that is zero).
    pub fn rel_error(&self) -> Option<f64> {
        (self.analytic_price != 0.0).then(|| self.abs_error() / self.analytic_price.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accumulator_statistics() {
        let acc = [1.0, 2.0, 3.0, 4.0]
            .iter()
            .fold(PayoffAccumulator::default(), |acc, &x| acc.push(x));
        assert_eq!(acc.count, 4);
        assert_relative_eq!(acc.mean(), 2.5);
        assert_relative_eq!(acc.sample_variance(), 5.0 / 3.0, epsilon = 1e-12);

        let est = acc.into_estimate(0.5);
        assert_relative_eq!(est.value, 1.25);
        assert_relative_eq!(est.std_error, 0.5 * (5.0f64 / 3.0 / 4.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_accumulator_merge_matches_single_pass() {
        let xs = [0.0, 3.5, 1.25, 8.0, 0.0, 2.0];
        let whole = xs
            .iter()
            .fold(PayoffAccumulator::default(), |acc, &x| acc.push(x));
        let left = xs[..2]
            .iter()
            .fold(PayoffAccumulator::default(), |acc, &x| acc.push(x));
        let right = xs[2..]
            .iter()
            .fold(PayoffAccumulator::default(), |acc, &x| acc.push(x));
        let merged = left.merge(right);
        assert_eq!(merged.count, whole.count);
        assert_relative_eq!(merged.mean, whole.mean, epsilon = 1e-12);
        assert_relative_eq!(merged.m2, whole.m2, epsilon = 1e-12);

        assert_eq!(PayoffAccumulator::default().merge(whole), whole);
        assert_eq!(whole.merge(PayoffAccumulator::default()), whole);
    }

    #[test]
    fn test_variance_survives_large_offset() {
        // Raw sums of squares near 4e18 would leave only a few bits of the spread
        let xs = [1e9 + 1.0, 1e9 + 2.0, 1e9 + 3.0, 1e9 + 4.0];
        let whole = xs
            .iter()
            .fold(PayoffAccumulator::default(), |acc, &x| acc.push(x));
        assert_relative_eq!(whole.sample_variance(), 5.0 / 3.0, epsilon = 1e-9);

        let left = xs[..2]
            .iter()
            .fold(PayoffAccumulator::default(), |acc, &x| acc.push(x));
        let right = xs[2..]
            .iter()
            .fold(PayoffAccumulator::default(), |acc, &x| acc.push(x));
        assert_relative_eq!(
            left.merge(right).sample_variance(),
            5.0 / 3.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_single_sample_has_zero_std_error() {
        let est = PayoffAccumulator::default().push(7.0).into_estimate(1.0);
        assert_eq!(est.sample_count, 1);
        assert_eq!(est.value, 7.0);
        assert_eq!(est.std_error, 0.0);
    }

    #[test]
    fn test_confidence_interval() {
        let est = PriceEstimate {
            value: 10.0,
            sample_count: 100,
            std_error: 0.5,
        };
        let (lo, hi) = est.confidence_interval(0.95).unwrap();
        assert_relative_eq!(hi - 10.0, 1.959_963_984_540_054 * 0.5, epsilon = 1e-6);
        assert_relative_eq!(10.0 - lo, hi - 10.0, epsilon = 1e-12);

        assert!(est.confidence_interval(0.0).is_none());
        assert!(est.confidence_interval(1.0).is_none());
    }

    #[test]
    fn test_z_score() {
        let est = PriceEstimate {
            value: 10.0,
            sample_count: 100,
            std_error: 0.5,
        };
        assert_relative_eq!(est.z_score(11.0), 2.0);
        assert_eq!(PriceEstimate::exact(3.0, 1).z_score(3.0), 0.0);
        assert!(PriceEstimate::exact(3.0, 1).z_score(4.0).is_infinite());
    }

    #[test]
    fn test_pricing_result_errors() {
        let row = PricingResult {
            spot: 150.0,
            time: 0.1,
            analytic_price: 20.0,
            mc_price: 20.5,
            mc_std_error: 0.2,
            sample_count: 1000,
        };
        assert_relative_eq!(row.abs_error(), 0.5);
        assert_relative_eq!(row.rel_error().unwrap(), 0.025);
        let zero = PricingResult {
            analytic_price: 0.0,
            ..row
        };
        assert!(zero.rel_error().is_none());
    }
}
