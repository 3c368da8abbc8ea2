// Closed-form Black-Scholes call price. Used as the reference the Monte Carlo
// estimator is checked against; Greeks and puts are out of scope here.

use tracing::trace;

use crate::error::{ensure_positive, PricingError, Result};
use crate::model_params::{MarketState, ModelParameters};
use crate::models::payoff::Payoff;
use crate::models::traits::OptionPricer;

/// Standard normal CDF via the error function.
pub fn norm_cdf(x: f64) -> f64 {
    // 0.5 * [1 + erf(x / sqrt(2))]
    0.5 * (1.0 + libm::erf(x / std::f64::consts::SQRT_2))
}

/// Black-Scholes `d1` and `d2` for time to maturity `tau`.
#[allow(non_snake_case)]
pub fn d1_d2(S: f64, K: f64, r: f64, tau: f64, sigma: f64) -> Result<(f64, f64)> {
    ensure_positive("spot", S)?;
    ensure_positive("strike", K)?;
    ensure_positive("sigma", sigma)?;
    if tau.is_nan() || tau <= 0.0 {
        return Err(PricingError::DegenerateTime { tau });
    }
    let sqrt_t = tau.sqrt();
    let vol_sqrt_t = sigma * sqrt_t;
    // Divided through by sigma so sigma^2 never has to be formed
    let d1 = (S / K).ln() / vol_sqrt_t + (r / sigma + 0.5 * sigma) * sqrt_t;
    let d2 = d1 - vol_sqrt_t;
    if !d1.is_finite() {
        return Err(PricingError::NumericOverflow { value: d1 });
    }
    if !d2.is_finite() {
        return Err(PricingError::NumericOverflow { value: d2 });
    }
    Ok((d1, d2))
}

/// Price of a European call option under Black-Scholes assumptions.
///
/// `tau` is the time to maturity `T - t`. Returns
/// [`PricingError::DegenerateTime`] for `tau <= 0`; callers that may sit on
/// maturity go through [`AnalyticPricer`], which returns the payoff there.
/// Inputs whose `d1`, `d2` or price are not representable give
/// [`PricingError::NumericOverflow`].
#[allow(non_snake_case)]
pub fn bs_call_price(S: f64, K: f64, r: f64, tau: f64, sigma: f64) -> Result<f64> {
    let (d1, d2) = d1_d2(S, K, r, tau, sigma)?;
    let price = S * norm_cdf(d1) - K * (-r * tau).exp() * norm_cdf(d2);
    if !price.is_finite() {
        return Err(PricingError::NumericOverflow { value: price });
    }
    // Cancellation deep out of the money can leave a tiny negative residue
    Ok(price.max(0.0))
}

/// Closed-form pricer for the session's European call.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticPricer;

impl AnalyticPricer {
    pub fn new() -> Self {
        Self
    }

    /// Price at `(spot, t)`. At `t == T` the payoff is returned directly.
    pub fn price(&self, spot: f64, t: f64, params: &ModelParameters) -> Result<f64> {
        params.validate()?;
        let state = MarketState::new(spot, t);
        state.validate(params)?;

        if state.at_maturity(params) {
            return Ok(params.call_payoff().payoff(spot));
        }

        let tau = state.time_to_maturity(params);
        let price = bs_call_price(spot, params.strike, params.r, tau, params.sigma)?;
        trace!(spot, tau, price, "analytic call price");
        Ok(price)
    }
}

impl OptionPricer for AnalyticPricer {
    type Output = f64;

    fn price_state(&self, state: &MarketState, params: &ModelParameters) -> Result<f64> {
        self.price(state.spot, state.time, params)
    }
}
