//! Time discretisation and lazy GBM sample paths.
//!
//! Paths are stepped with the exact log-Euler scheme
//!
//! ```text
//! S_{t+dt} = S_t * exp((r - σ²/2) dt + σ √dt Z),   Z ~ N(0, 1)
//! ```
//!
//! which is exact in law for GBM whenever the steps add up to `T - t`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ensure_positive, Result};
use crate::model_params::ModelParameters;
use crate::simulation::rng::NormalSource;

/// Relative slack when deciding how many steps of size `h` cover a span.
const STEP_COUNT_TOLERANCE: f64 = 1e-9;

/// What to do with the final step when `T - t` is not a multiple of `h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPolicy {
    /// Shorten the last step so every path lands exactly on maturity.
    #[default]
    Clamp,
    /// Take full steps only; the path may end past maturity.
    Overshoot,
}

/// Step layout for one path from `t` to `T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSchedule {
    step_size: f64,
    steps: usize,
    last_step: f64,
    policy: StepPolicy,
}

impl StepSchedule {
    /// Build the schedule covering `span = T - t` with nominal step `step_size`.
    ///
    /// `span == 0` gives an empty schedule. Otherwise the schedule has
    /// `ceil(span / h)` steps, computed with a small relative tolerance so
    /// that an inexact float ratio such as `0.07 / 0.01` does not add a sliver
    /// step.
    pub fn new(span: f64, step_size: f64, policy: StepPolicy) -> Result<Self> {
        ensure_positive("step_size", step_size)?;
        if span <= 0.0 {
            return Ok(Self {
                step_size,
                steps: 0,
                last_step: 0.0,
                policy,
            });
        }

        let ratio = span / step_size;
        let steps = ((ratio - ratio * STEP_COUNT_TOLERANCE).ceil() as usize).max(1);
        let last_step = match policy {
            StepPolicy::Clamp => span - (steps - 1) as f64 * step_size,
            StepPolicy::Overshoot => step_size,
        };

        Ok(Self {
            step_size,
            steps,
            last_step,
            policy,
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn last_step(&self) -> f64 {
        self.last_step
    }

    pub fn policy(&self) -> StepPolicy {
        self.policy
    }

    /// Length of step `i` (0-based).
    pub fn step(&self, i: usize) -> f64 {
        if i + 1 == self.steps {
            self.last_step
        } else {
            self.step_size
        }
    }

    /// Iterate over all step lengths in order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.steps).map(move |i| self.step(i))
    }

    /// Total simulated time covered by the schedule.
    pub fn simulated_time(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            (self.steps - 1) as f64 * self.step_size + self.last_step
        }
    }

    /// Amount by which the schedule runs past `span` (zero under `Clamp`).
    pub fn overshoot(&self, span: f64) -> f64 {
        match self.policy {
            StepPolicy::Clamp => 0.0,
            StepPolicy::Overshoot => (self.simulated_time() - span).max(0.0),
        }
    }

    /// Whether paths end measurably past `span`; round-off on exact multiples
    /// does not count.
    pub fn overshoots(&self, span: f64) -> bool {
        self.overshoot(span) > span * STEP_COUNT_TOLERANCE
    }
}

/// Drift and diffusion of one log-Euler step of length `dt`.
#[derive(Debug, Clone, Copy)]
struct StepCoefficients {
    drift: f64,
    diffusion: f64,
}

impl StepCoefficients {
    fn new(params: &ModelParameters, dt: f64) -> Self {
        Self {
            drift: (params.r - 0.5 * params.sigma * params.sigma) * dt,
            diffusion: params.sigma * dt.sqrt(),
        }
    }

    #[inline]
    fn advance(&self, price: f64, z: f64) -> f64 {
        price * (self.drift + self.diffusion * z).exp()
    }
}

/// One point of a sample path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub time: f64,
    pub price: f64,
}

/// Lazily simulated GBM path from `(S, t)` to maturity.
///
/// Yields the starting point first, then one point per step. Nothing is
/// stored, so the estimator can consume just the terminal value.
pub struct SamplePath<N: NormalSource> {
    source: N,
    schedule: StepSchedule,
    full: StepCoefficients,
    last: StepCoefficients,
    end_time: f64,
    time: f64,
    price: f64,
    step: usize,
    started: bool,
}

impl<N: NormalSource> SamplePath<N> {
    pub fn new(
        spot: f64,
        t: f64,
        params: &ModelParameters,
        schedule: StepSchedule,
        source: N,
    ) -> Self {
        let end_time = match schedule.policy() {
            StepPolicy::Clamp => params.maturity,
            StepPolicy::Overshoot => t + schedule.simulated_time(),
        };
        Self {
            source,
            full: StepCoefficients::new(params, schedule.step_size()),
            last: StepCoefficients::new(params, schedule.last_step()),
            schedule,
            end_time,
            time: t,
            price: spot,
            step: 0,
            started: false,
        }
    }

    /// Run the remaining steps and return the terminal price.
    pub fn terminal_price(mut self) -> f64 {
        while self.advance() {}
        self.price
    }

    fn advance(&mut self) -> bool {
        let steps = self.schedule.steps();
        if self.step >= steps {
            return false;
        }
        let z = self.source.next_standard_normal();
        self.step += 1;
        if self.step == steps {
            self.price = self.last.advance(self.price, z);
            self.time = self.end_time;
        } else {
            self.price = self.full.advance(self.price, z);
            self.time += self.schedule.step_size();
        }
        true
    }
}

impl<N: NormalSource> Iterator for SamplePath<N> {
    type Item = PathPoint;

    fn next(&mut self) -> Option<PathPoint> {
        if !self.started {
            self.started = true;
        } else if !self.advance() {
            return None;
        }
        Some(PathPoint {
            time: self.time,
            price: self.price,
        })
    }
}

/// Build the schedule for `(t, T)`.
///
/// Called once per estimate, so an actual overshoot is only logged at debug
/// level here; curve-level callers warn once.
pub fn schedule_for(
    t: f64,
    params: &ModelParameters,
    step_size: f64,
    policy: StepPolicy,
) -> Result<StepSchedule> {
    let span = params.maturity - t;
    let schedule = StepSchedule::new(span, step_size, policy)?;
    if schedule.overshoots(span) {
        debug!(
            span,
            step_size,
            overshoot = schedule.overshoot(span),
            "paths run past maturity"
        );
    }
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::rng::StdNormalSource;
    use approx::assert_relative_eq;

    struct ZeroSource;

    impl NormalSource for ZeroSource {
        fn next_standard_normal(&mut self) -> f64 {
            0.0
        }
    }

    fn params() -> ModelParameters {
        ModelParameters::new(0.4, 0.02, 140.0, 1.0).unwrap()
    }

    #[test]
    fn test_exact_multiple_has_no_sliver_step() {
        // 0.07 / 0.01 is 7.000000000000001 in floating point
        let schedule = StepSchedule::new(0.07, 0.01, StepPolicy::Clamp).unwrap();
        assert_eq!(schedule.steps(), 7);
        assert_relative_eq!(schedule.last_step(), 0.01, epsilon = 1e-12);

        let schedule = StepSchedule::new(0.56, 0.02, StepPolicy::Overshoot).unwrap();
        assert_eq!(schedule.steps(), 28);

        let schedule = StepSchedule::new(0.9, 0.001, StepPolicy::Clamp).unwrap();
        assert_eq!(schedule.steps(), 900);
    }

    #[test]
    fn test_clamp_lands_on_span() {
        let schedule = StepSchedule::new(1.0, 0.3, StepPolicy::Clamp).unwrap();
        assert_eq!(schedule.steps(), 4);
        assert_relative_eq!(schedule.last_step(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(schedule.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_eq!(schedule.overshoot(1.0), 0.0);
    }

    #[test]
    fn test_overshoot_takes_full_steps() {
        let schedule = StepSchedule::new(1.0, 0.3, StepPolicy::Overshoot).unwrap();
        assert_eq!(schedule.steps(), 4);
        assert!(schedule.iter().all(|dt| dt == 0.3));
        assert_relative_eq!(schedule.simulated_time(), 1.2, epsilon = 1e-12);
        assert_relative_eq!(schedule.overshoot(1.0), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_overshoots_ignores_round_off() {
        let span = 0.56;
        let exact = StepSchedule::new(span, 0.02, StepPolicy::Overshoot).unwrap();
        assert!(!exact.overshoots(span));

        let long = StepSchedule::new(1.0, 0.3, StepPolicy::Overshoot).unwrap();
        assert!(long.overshoots(1.0));
        let clamped = StepSchedule::new(1.0, 0.3, StepPolicy::Clamp).unwrap();
        assert!(!clamped.overshoots(1.0));
    }

    #[test]
    fn test_step_larger_than_span() {
        let clamp = StepSchedule::new(0.25, 1.0, StepPolicy::Clamp).unwrap();
        assert_eq!(clamp.steps(), 1);
        assert_eq!(clamp.last_step(), 0.25);

        let over = StepSchedule::new(0.25, 1.0, StepPolicy::Overshoot).unwrap();
        assert_eq!(over.steps(), 1);
        assert_eq!(over.last_step(), 1.0);
    }

    #[test]
    fn test_empty_schedule_at_maturity() {
        let schedule = StepSchedule::new(0.0, 0.01, StepPolicy::Clamp).unwrap();
        assert_eq!(schedule.steps(), 0);
        assert_eq!(schedule.simulated_time(), 0.0);
    }

    #[test]
    fn test_invalid_step_size() {
        assert!(StepSchedule::new(1.0, 0.0, StepPolicy::Clamp).is_err());
        assert!(StepSchedule::new(1.0, -0.1, StepPolicy::Clamp).is_err());
        assert!(StepSchedule::new(1.0, f64::NAN, StepPolicy::Clamp).is_err());
    }

    #[test]
    fn test_path_points_follow_schedule() {
        let p = params();
        let schedule = StepSchedule::new(0.9, 0.25, StepPolicy::Clamp).unwrap();
        let points: Vec<PathPoint> =
            SamplePath::new(150.0, 0.1, &p, schedule, StdNormalSource::from_seed(3)).collect();

        assert_eq!(points.len(), schedule.steps() + 1);
        assert_eq!(points[0], PathPoint { time: 0.1, price: 150.0 });
        assert_eq!(points.last().unwrap().time, p.maturity);
        assert!(points.windows(2).all(|w| w[1].time > w[0].time));
        assert!(points.iter().all(|pt| pt.price > 0.0));
    }

    #[test]
    fn test_overshoot_path_ends_past_maturity() {
        let p = params();
        let schedule = StepSchedule::new(1.0, 0.3, StepPolicy::Overshoot).unwrap();
        let last = SamplePath::new(140.0, 0.0, &p, schedule, ZeroSource)
            .last()
            .unwrap();
        assert_relative_eq!(last.time, 1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_draws_follow_drift() {
        let p = params();
        let schedule = StepSchedule::new(1.0, 0.3, StepPolicy::Clamp).unwrap();
        let terminal = SamplePath::new(140.0, 0.0, &p, schedule, ZeroSource).terminal_price();
        let expected = 140.0 * ((p.r - 0.5 * p.sigma * p.sigma) * 1.0).exp();
        assert_relative_eq!(terminal, expected, epsilon = 1e-10);
    }

    #[test]
    fn test_terminal_price_matches_iterated_path() {
        let p = params();
        let schedule = StepSchedule::new(1.0, 0.01, StepPolicy::Clamp).unwrap();
        let via_iter = SamplePath::new(140.0, 0.0, &p, schedule, StdNormalSource::from_seed(9))
            .last()
            .unwrap()
            .price;
        let direct =
            SamplePath::new(140.0, 0.0, &p, schedule, StdNormalSource::from_seed(9)).terminal_price();
        assert_eq!(via_iter.to_bits(), direct.to_bits());
    }
}
