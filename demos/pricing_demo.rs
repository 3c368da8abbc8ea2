// demos/pricing_demo.rs

//! Demonstration of analytic vs Monte Carlo call pricing
//!
//! This example shows how to:
//! 1. Set up model parameters for a pricing session
//! 2. Price a call with the closed-form formula
//! 3. Estimate the same price by simulation and watch it converge
//! 4. Compare the two pricers over a grid of spots

use anyhow::Result;
use gbm_pricer::{
    compare_pricers, default_configs, price_analytic, ModelParameters, MonteCarloPricer,
    StepPolicy,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Black-Scholes Call: Analytic vs Monte Carlo");
    println!("===========================================");

    let params = ModelParameters::new(0.4, 0.02, 140.0, 1.0)?;
    let (spot, t) = (150.0, 0.1);

    println!(
        "sigma = {}, r = {}, K = {}, T = {}",
        params.sigma, params.r, params.strike, params.maturity
    );
    println!("Spot: {:.2}, valuation time: {:.2}", spot, t);

    println!("\nStep 1: Closed-form price...");
    let analytic = price_analytic(spot, t, &params)?;
    println!("  Analytic price: {:.6}", analytic);

    println!("\nStep 2: Monte Carlo convergence (h = 0.01)...");
    println!(
        "{:<10} {:<12} {:<12} {:<12}",
        "Paths", "Estimate", "Std error", "Abs error"
    );
    println!("{}", "-".repeat(48));
    for &iterations in &[1_000usize, 4_000, 16_000, 64_000, 256_000] {
        let config = default_configs::fast()
            .with_iterations(iterations)
            .with_step_size(0.01);
        let est = MonteCarloPricer::new(config).estimate(spot, t, &params)?;
        println!(
            "{:<10} {:<12.4} {:<12.4} {:<12.4}",
            iterations,
            est.value,
            est.std_error,
            (est.value - analytic).abs()
        );
    }

    println!("\nStep 3: Final-step policy with h = 0.4 (does not divide T - t = 0.9)...");
    for policy in [StepPolicy::Clamp, StepPolicy::Overshoot] {
        let config = default_configs::production()
            .with_step_size(0.4)
            .with_step_policy(policy);
        let est = MonteCarloPricer::new(config).estimate(spot, t, &params)?;
        let (lo, hi) = est
            .confidence_interval(0.95)
            .unwrap_or((est.value, est.value));
        println!(
            "  {:?}: {:.4} (95% CI {:.4} .. {:.4}), analytic {:.4}",
            policy, est.value, lo, hi, analytic
        );
    }

    println!("\nStep 4: Spot grid comparison...");
    let spots = vec![100.0, 120.0, 140.0, 160.0, 180.0];
    let rows = compare_pricers(&spots, t, &params, &default_configs::fast())?;
    println!(
        "{:<8} {:<12} {:<12} {:<10}",
        "Spot", "Analytic", "MC", "z-score"
    );
    println!("{}", "-".repeat(44));
    for row in &rows {
        println!(
            "{:<8.0} {:<12.4} {:<12.4} {:<10.2}",
            row.spot,
            row.analytic_price,
            row.mc_price,
            row.abs_error() / row.mc_std_error
        );
    }

    Ok(())
}
