use rayon::prelude::*;
use tracing::debug;

use crate::error::{PricingError, Result};
use crate::model_params::{MarketState, ModelParameters};
use crate::models::payoff::Payoff;
use crate::models::traits::OptionPricer;
use crate::simulation::config::{validate_iterations, MonteCarloConfig};
use crate::simulation::path::{schedule_for, SamplePath, StepPolicy, StepSchedule};
use crate::simulation::rng::{NormalSource, StdNormalSource};
use crate::simulation::types::{PayoffAccumulator, PriceEstimate};

/// Monte Carlo pricer for a European payoff under GBM.
///
/// Estimates `V(S, t) = e^{-r(T-t)} E[φ(S_T) | S_t = S]` by averaging the
/// payoff over independent log-Euler paths.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloPricer {
    config: MonteCarloConfig,
}

impl MonteCarloPricer {
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Step layout each path from `t` follows under this configuration.
    pub fn schedule(&self, t: f64, params: &ModelParameters) -> Result<StepSchedule> {
        schedule_for(t, params, self.config.step_size, self.config.step_policy)
    }

    /// Estimate the call price at `(spot, t)` with the configured settings.
    pub fn estimate(&self, spot: f64, t: f64, params: &ModelParameters) -> Result<PriceEstimate> {
        self.estimate_payoff(spot, t, params, &params.call_payoff())
    }

    /// Estimate the price of an arbitrary terminal payoff.
    ///
    /// Each replicate draws from its own generator seeded from
    /// `(seed, replicate index)`, so sequential and parallel runs sample the
    /// same payoffs and differ only in summation order.
    pub fn estimate_payoff<P: Payoff>(
        &self,
        spot: f64,
        t: f64,
        params: &ModelParameters,
        payoff: &P,
    ) -> Result<PriceEstimate> {
        let schedule = self.prepare(spot, t, params)?;
        let n = self.config.iterations;

        if MarketState::new(spot, t).at_maturity(params) {
            return Ok(PriceEstimate::exact(payoff.payoff(spot), n));
        }

        let seed = self.config.seed.unwrap_or_else(rand::random);
        debug!(
            spot,
            t,
            iterations = n,
            steps = schedule.steps(),
            seed,
            parallel = self.config.parallel,
            "monte carlo estimate"
        );

        let replicate = |i: usize| {
            let source = StdNormalSource::for_replicate(seed, i as u64);
            payoff.payoff(SamplePath::new(spot, t, params, schedule, source).terminal_price())
        };

        let acc = if self.config.parallel {
            (0..n)
                .into_par_iter()
                .map(replicate)
                .fold(PayoffAccumulator::default, PayoffAccumulator::push)
                .reduce(PayoffAccumulator::default, PayoffAccumulator::merge)
        } else {
            (0..n)
                .map(replicate)
                .fold(PayoffAccumulator::default(), PayoffAccumulator::push)
        };

        finish(acc, params.discount_factor(params.maturity - t))
    }

    /// Estimate the call price drawing every variate from `source`, in order.
    ///
    /// Always sequential; the configured seed and parallel flag are ignored.
    pub fn estimate_with_source<N: NormalSource>(
        &self,
        spot: f64,
        t: f64,
        params: &ModelParameters,
        source: &mut N,
    ) -> Result<PriceEstimate> {
        let schedule = self.prepare(spot, t, params)?;
        let payoff = params.call_payoff();
        let n = self.config.iterations;

        if MarketState::new(spot, t).at_maturity(params) {
            return Ok(PriceEstimate::exact(payoff.payoff(spot), n));
        }

        let acc = (0..n).fold(PayoffAccumulator::default(), |acc, _| {
            let terminal = SamplePath::new(spot, t, params, schedule, &mut *source).terminal_price();
            acc.push(payoff.payoff(terminal))
        });

        finish(acc, params.discount_factor(params.maturity - t))
    }

    fn prepare(&self, spot: f64, t: f64, params: &ModelParameters) -> Result<StepSchedule> {
        params.validate()?;
        MarketState::new(spot, t).validate(params)?;
        self.config.validate()?;
        self.schedule(t, params)
    }
}

impl OptionPricer for MonteCarloPricer {
    type Output = PriceEstimate;

    fn price_state(&self, state: &MarketState, params: &ModelParameters) -> Result<PriceEstimate> {
        self.estimate(state.spot, state.time, params)
    }
}

fn finish(acc: PayoffAccumulator, discount: f64) -> Result<PriceEstimate> {
    let estimate = acc.into_estimate(discount);
    if !estimate.value.is_finite() {
        return Err(PricingError::NumericOverflow {
            value: estimate.value,
        });
    }
    if !estimate.std_error.is_finite() {
        return Err(PricingError::NumericOverflow {
            value: estimate.std_error,
        });
    }
    Ok(estimate)
}

/// Monte Carlo call price from `(spot, t)` with `iterations` replicates of
/// step `step_size`, drawing from `source`.
///
/// The final step is clamped so every path lands on maturity.
pub fn estimate<N: NormalSource>(
    spot: f64,
    t: f64,
    params: &ModelParameters,
    iterations: usize,
    step_size: f64,
    source: &mut N,
) -> Result<PriceEstimate> {
    validate_iterations(iterations)?;
    let config = MonteCarloConfig::default()
        .with_iterations(iterations)
        .with_step_size(step_size)
        .with_step_policy(StepPolicy::Clamp)
        .with_parallel(false);
    MonteCarloPricer::new(config).estimate_with_source(spot, t, params, source)
}
