
use approx::assert_relative_eq;
use gbm_pricer::{
    bs_call_price, price_analytic, price_analytic_curve, spot_grid, EuropeanCall,
    ModelParameters, Payoff, PricingError,
};
use proptest::prelude::*;
use test_utils::{reference_params, ATM_REFERENCE_PRICE, SCENARIO_REFERENCE_PRICE};

/// At-the-money reference value with d1 = 0.25, d2 = -0.15.
#[test]
fn test_reference_value() {
    let price = price_analytic(140.0, 0.0, &reference_params()).unwrap();
    assert_relative_eq!(price, ATM_REFERENCE_PRICE, epsilon = 1e-9);
}

/// σ = 0.4, r = 0.02, K = 140, T = 1, t = 0.1, S = 150.
#[test]
fn test_scenario_value() {
    let price = price_analytic(150.0, 0.1, &reference_params()).unwrap();
    assert_relative_eq!(price, SCENARIO_REFERENCE_PRICE, epsilon = 1e-9);
}

/// At maturity the price is exactly the payoff.
#[test]
fn test_boundary_at_maturity() {
    let params = reference_params();
    let call = EuropeanCall::new(params.strike);
    for &spot in &[1.0, 100.0, 139.999, 140.0, 140.5, 150.0, 1_000.0] {
        assert_eq!(price_analytic(spot, 1.0, &params).unwrap(), call.payoff(spot));
    }
}

/// As S -> 0+ the call is worthless.
#[test]
fn test_deep_out_of_the_money_limit() {
    let params = reference_params();
    let mut previous = f64::INFINITY;
    for &spot in &[10.0, 1.0, 1e-1, 1e-3, 1e-6] {
        let price = price_analytic(spot, 0.0, &params).unwrap();
        assert!(price >= 0.0);
        assert!(price <= previous);
        previous = price;
    }
    assert!(previous < 1e-12, "price at S=1e-6 is {}", previous);
}

/// Deep in the money the call approaches its forward intrinsic value.
#[test]
fn test_deep_in_the_money_limit() {
    let params = reference_params();
    let spot = 10_000.0;
    let price = price_analytic(spot, 0.0, &params).unwrap();
    let intrinsic = spot - params.strike * params.discount_factor(1.0);
    assert_relative_eq!(price, intrinsic, max_relative = 1e-9);
}

/// Price increases with volatility.
#[test]
fn test_increasing_in_volatility() {
    let low = bs_call_price(150.0, 140.0, 0.02, 0.9, 0.2).unwrap();
    let high = bs_call_price(150.0, 140.0, 0.02, 0.9, 0.4).unwrap();
    assert!(high > low);
}

#[test]
fn test_error_conditions() {
    let params = reference_params();
    assert!(matches!(
        price_analytic(0.0, 0.0, &params),
        Err(PricingError::InvalidParameter { name: "spot", .. })
    ));
    assert!(matches!(
        price_analytic(150.0, 1.1, &params),
        Err(PricingError::InvalidParameter { name: "time", .. })
    ));
    assert!(matches!(
        bs_call_price(150.0, 140.0, 0.02, 0.0, 0.4),
        Err(PricingError::DegenerateTime { .. })
    ));
    assert!(matches!(
        bs_call_price(150.0, -140.0, 0.02, 1.0, 0.4),
        Err(PricingError::InvalidParameter { name: "strike", .. })
    ));
    assert!(ModelParameters::new(0.4, 0.02, 140.0, -1.0).is_err());
}

#[test]
fn test_curve_is_ordered_map() {
    let params = reference_params();
    let spots = spot_grid(50.0, 250.0, 41);
    let prices = price_analytic_curve(&spots, 0.1, &params).unwrap();
    assert_eq!(prices.len(), spots.len());
    for (spot, price) in spots.iter().zip(&prices) {
        assert_eq!(*price, price_analytic(*spot, 0.1, &params).unwrap());
    }
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_empty_curve() {
    let prices = price_analytic_curve(&[], 0.1, &reference_params()).unwrap();
    assert!(prices.is_empty());
}

proptest! {
    /// Non-decreasing in spot for fixed t.
    #[test]
    fn prop_monotone_in_spot(
        s1 in 1e-3f64..1_000.0,
        s2 in 1e-3f64..1_000.0,
        t in 0.0f64..0.999,
    ) {
        let params = reference_params();
        let (lo, hi) = if s1 <= s2 { (s1, s2) } else { (s2, s1) };
        let p_lo = price_analytic(lo, t, &params).unwrap();
        let p_hi = price_analytic(hi, t, &params).unwrap();
        prop_assert!(p_lo <= p_hi + 1e-9, "C({}) = {} > C({}) = {}", lo, p_lo, hi, p_hi);
    }

    /// Never negative and never above the spot.
    #[test]
    fn prop_price_within_bounds(s in 1e-3f64..1_000.0, t in 0.0f64..1.0) {
        let price = price_analytic(s, t, &reference_params()).unwrap();
        prop_assert!(price >= 0.0);
        prop_assert!(price <= s + 1e-9);
    }

    #[test]
    fn prop_payoff_non_negative(s in 0.0f64..1e7) {
        prop_assert!(EuropeanCall::new(140.0).payoff(s) >= 0.0);
    }
}
