//! Terminal payoff functions.

use serde::{Deserialize, Serialize};

/// Maps a terminal asset price to a cash payoff at expiry.
///
/// A NaN terminal price must come back as NaN so the estimator can report it.
pub trait Payoff: Send + Sync {
    fn payoff(&self, terminal: f64) -> f64;
}

/// European call: `max(S_T - K, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EuropeanCall {
    pub strike: f64,
}

impl EuropeanCall {
    pub fn new(strike: f64) -> Self {
        Self { strike }
    }
}

impl Payoff for EuropeanCall {
    #[inline]
    fn payoff(&self, terminal: f64) -> f64 {
        let intrinsic = terminal - self.strike;
        if intrinsic.is_nan() {
            intrinsic
        } else {
            intrinsic.max(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_call_payoff_values() {
        let call = EuropeanCall::new(140.0);
        assert_eq!(call.payoff(150.0), 10.0);
        assert_eq!(call.payoff(140.0), 0.0);
        assert_eq!(call.payoff(100.0), 0.0);
        assert_eq!(call.payoff(0.0), 0.0);
    }

    #[test]
    fn test_non_finite_terminal_is_not_hidden() {
        let call = EuropeanCall::new(140.0);
        assert!(call.payoff(f64::NAN).is_nan());
        assert_eq!(call.payoff(f64::INFINITY), f64::INFINITY);
    }

    proptest! {
        #[test]
        fn prop_call_payoff_non_negative(s in 0.0f64..1e9, k in 1e-6f64..1e6) {
            prop_assert!(EuropeanCall::new(k).payoff(s) >= 0.0);
        }

        #[test]
        fn prop_call_payoff_non_decreasing(a in 0.0f64..1e6, b in 0.0f64..1e6) {
            let call = EuropeanCall::new(100.0);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(call.payoff(lo) <= call.payoff(hi));
        }
    }
}
