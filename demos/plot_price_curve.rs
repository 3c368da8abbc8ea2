// Example: plot_price_curve.rs
// Prices a grid of spots with both pricers and renders the comparison.
//
// Usage:
//     cargo run --example plot_price_curve -- [session.toml]
//
// Without an argument the σ = 0.4, r = 2%, K = 140, T = 1 session is used.
// Writes price_curve.csv and price_curve.svg to the working directory.

use std::env;
use std::error::Error;

use gbm_pricer::{
    compare_pricers, default_configs, load_session, spot_grid, ModelParameters, PricingResult,
    PricingSession,
};
use plotters::prelude::*;
use tracing_subscriber::EnvFilter;

const VALUATION_TIME: f64 = 0.1;

fn write_csv(path: &str, rows: &[PricingResult]) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn plot(path: &str, rows: &[PricingResult], params: &ModelParameters) -> Result<(), Box<dyn Error>> {
    let x_min = rows.iter().map(|r| r.spot).fold(f64::INFINITY, f64::min);
    let x_max = rows.iter().map(|r| r.spot).fold(f64::NEG_INFINITY, f64::max);
    let y_max = rows
        .iter()
        .map(|r| r.analytic_price.max(r.mc_price + 2.0 * r.mc_std_error))
        .fold(0.0, f64::max)
        * 1.05;

    let root = SVGBackend::new(path, (1280, 768)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(
            format!(
                "European call | K={} σ={} r={} T={} t={}",
                params.strike, params.sigma, params.r, params.maturity, VALUATION_TIME
            ),
            ("sans-serif", 30),
        )
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Spot")
        .y_desc("Price")
        .draw()?;

    // Closed form as a line
    chart
        .draw_series(std::iter::once(PathElement::new(
            rows.iter().map(|r| (r.spot, r.analytic_price)).collect::<Vec<_>>(),
            BLUE.stroke_width(2),
        )))?
        .label("analytic")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    // Monte Carlo estimates with ±2 standard error bars
    for row in rows {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                (row.spot, row.mc_price - 2.0 * row.mc_std_error),
                (row.spot, row.mc_price + 2.0 * row.mc_std_error),
            ],
            RED.stroke_width(1),
        )))?;
    }
    chart
        .draw_series(
            rows.iter()
                .map(|r| Circle::new((r.spot, r.mc_price), 3, RED.filled())),
        )?
        .label("monte carlo")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, RED.filled()));

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let session = match args.get(1) {
        Some(path) => load_session(path)?,
        None => PricingSession {
            model: ModelParameters::new(0.4, 0.02, 140.0, 1.0)?,
            monte_carlo: default_configs::fast(),
        },
    };

    let spots = spot_grid(80.0, 220.0, 29);
    let rows = compare_pricers(&spots, VALUATION_TIME, &session.model, &session.monte_carlo)?;

    println!("{:<8} {:<12} {:<12} {:<10}", "Spot", "Analytic", "MC", "Std err");
    println!("{}", "-".repeat(44));
    for row in &rows {
        println!(
            "{:<8.1} {:<12.4} {:<12.4} {:<10.4}",
            row.spot, row.analytic_price, row.mc_price, row.mc_std_error
        );
    }

    write_csv("price_curve.csv", &rows)?;
    plot("price_curve.svg", &rows, &session.model)?;
    println!("Results saved to price_curve.csv and price_curve.svg");
    Ok(())
}
