use gbm_pricer::{
    default_configs, price_analytic, ModelParameters, MonteCarloConfig, MonteCarloPricer,
};

fn describe(name: &str, config: &MonteCarloConfig, use_case: &str) {
    println!("{}:", name);
    println!("   Iterations: {}", config.iterations);
    println!("   Step size: {}", config.step_size);
    println!("   Seed: {:?}", config.seed);
    println!("   Parallel: {}", config.parallel);
    println!("   Step policy: {:?}", config.step_policy);
    println!("   Use case: {}\n", use_case);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let params = ModelParameters::new(0.4, 0.02, 140.0, 1.0)?;
    let (spot, t) = (140.0, 0.0);

    println!("gbm-pricer Default Configuration Examples\n");

    describe("1. Minimal", &default_configs::minimal(), "Quick validation, debugging");
    describe("2. Fast", &default_configs::fast(), "Development, quick prototyping");
    describe("3. Production", &default_configs::production(), "Reported prices");
    describe("4. Research", &default_configs::research(), "Convergence studies");

    // 5. Custom configuration loaded from TOML
    let custom = MonteCarloConfig::from_toml_str(
        r#"
        iterations = 30000
        step_size = 0.05
        seed = 7
        step_policy = "clamp"
        "#,
    )?;
    describe("5. Custom (TOML)", &custom, "Project-specific settings");

    let analytic = price_analytic(spot, t, &params)?;
    println!("Analytic price at S={}: {:.4}", spot, analytic);
    for (name, config) in [
        ("minimal", default_configs::minimal()),
        ("fast", default_configs::fast()),
        ("custom", custom),
    ] {
        let est = MonteCarloPricer::new(config).estimate(spot, t, &params)?;
        println!(
            "  {:<8} {:.4} +/- {:.4}",
            name, est.value, est.std_error
        );
    }

    Ok(())
}
