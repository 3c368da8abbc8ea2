//! Value types describing a pricing session: the fixed Black-Scholes model
//! parameters and the per-query market state. Both are validated on
//! construction and passed explicitly to every pricer call.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_positive, PricingError, Result};
use crate::models::payoff::EuropeanCall;

/// Black-Scholes model parameters for a European call.
///
/// Fixed for a pricing session and read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Volatility σ (annualised, as decimal). Must be > 0.
    pub sigma: f64,
    /// Continuously compounded risk-free rate r.
    pub r: f64,
    /// Strike K. Must be > 0.
    pub strike: f64,
    /// Maturity T in years. Must be > 0.
    pub maturity: f64,
}

impl ModelParameters {
    /// Create a validated parameter set.
    pub fn new(sigma: f64, r: f64, strike: f64, maturity: f64) -> Result<Self> {
        let params = Self {
            sigma,
            r,
            strike,
            maturity,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check σ > 0, K > 0, T > 0 and r finite.
    ///
    /// Fields are public (and deserialisable), so pricers call this again at
    /// their boundary.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("sigma", self.sigma)?;
        ensure_finite("r", self.r)?;
        ensure_positive("strike", self.strike)?;
        ensure_positive("maturity", self.maturity)?;
        Ok(())
    }

    /// Call payoff struck at this session's strike.
    pub fn call_payoff(&self) -> EuropeanCall {
        EuropeanCall::new(self.strike)
    }

    /// Discount factor `e^{-r τ}` for a time to maturity `τ`.
    pub fn discount_factor(&self, tau: f64) -> f64 {
        (-self.r * tau).exp()
    }
}

/// Spot and valuation time for a single evaluation point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    /// Spot price S. Must be > 0.
    pub spot: f64,
    /// Valuation time t in years, `0 <= t <= T`.
    pub time: f64,
}

impl MarketState {
    pub fn new(spot: f64, time: f64) -> Self {
        Self { spot, time }
    }

    /// Validate against a parameter set. `time == maturity` is accepted;
    /// pricers short-circuit it to the payoff.
    pub fn validate(&self, params: &ModelParameters) -> Result<()> {
        ensure_positive("spot", self.spot)?;
        ensure_finite("time", self.time)?;
        if self.time < 0.0 {
            return Err(PricingError::InvalidParameter {
                name: "time",
                value: self.time,
                constraint: "must be >= 0",
            });
        }
        if self.time > params.maturity {
            return Err(PricingError::InvalidParameter {
                name: "time",
                value: self.time,
                constraint: "must not exceed maturity",
            });
        }
        Ok(())
    }

    /// Remaining time to maturity `T - t`.
    pub fn time_to_maturity(&self, params: &ModelParameters) -> f64 {
        params.maturity - self.time
    }

    /// True when the valuation time sits exactly on maturity.
    pub fn at_maturity(&self, params: &ModelParameters) -> bool {
        self.time == params.maturity
    }
}
