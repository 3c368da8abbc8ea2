//! Error taxonomy for the pricing core.
//!
//! Every public pricing entry point validates its inputs up front and returns
//! one of these variants instead of letting a NaN escape.

use thiserror::Error;

/// Errors raised by the analytic and Monte Carlo pricers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// An input violates its domain (non-positive volatility, strike, spot, ...).
    #[error("invalid parameter '{name}' = {value}: {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },

    /// The closed-form formula was evaluated with no time left to maturity.
    #[error("degenerate time to maturity {tau}: closed-form price needs T - t > 0")]
    DegenerateTime { tau: f64 },

    /// A price, an intermediate term or a simulated estimate is not finite.
    #[error("numeric overflow: {value} is not finite")]
    NumericOverflow { value: f64 },
}

/// Result alias used throughout the numerical core.
pub type Result<T> = std::result::Result<T, PricingError>;

/// Fails with [`PricingError::InvalidParameter`] unless `value` is finite and `> 0`.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PricingError::InvalidParameter {
            name,
            value,
            constraint: "must be finite and > 0",
        })
    }
}

/// Fails with [`PricingError::InvalidParameter`] unless `value` is finite.
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PricingError::InvalidParameter {
            name,
            value,
            constraint: "must be finite",
        })
    }
}
