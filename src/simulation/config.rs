use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use serde::Deserialize;

use crate::error::{ensure_positive, PricingError, Result};
use crate::model_params::ModelParameters;
use crate::simulation::path::StepPolicy;

/// Main configuration struct for a Monte Carlo run
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of independent replicates (>= 1)
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Nominal time step h in years (> 0)
    #[serde(default = "default_step_size")]
    pub step_size: f64,

    /// Random seed for reproducibility (None = seeded from OS entropy)
    #[serde(default = "default_seed")]
    pub seed: Option<u64>,

    /// Whether to simulate replicates in parallel
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Handling of the final step when h does not divide T - t
    #[serde(default)]
    pub step_policy: StepPolicy,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            step_size: default_step_size(),
            seed: default_seed(),
            parallel: default_parallel(),
            step_policy: StepPolicy::default(),
        }
    }
}

impl MonteCarloConfig {
    /// High replicate count and fine steps for reporting prices
    pub fn production() -> Self {
        Self {
            iterations: 200_000,
            step_size: 0.004,
            ..Self::default()
        }
    }

    /// Fast configuration for development and testing
    pub fn fast() -> Self {
        Self {
            iterations: 20_000,
            step_size: 0.02,
            ..Self::default()
        }
    }

    /// Reference-quality runs for convergence studies
    pub fn research() -> Self {
        Self {
            iterations: 1_000_000,
            step_size: 0.001,
            ..Self::default()
        }
    }

    /// Minimal configuration for quick validation and debugging
    pub fn minimal() -> Self {
        Self {
            iterations: 1_000,
            step_size: 0.1,
            parallel: false,
            ..Self::default()
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_step_policy(mut self, step_policy: StepPolicy) -> Self {
        self.step_policy = step_policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_iterations(self.iterations)?;
        ensure_positive("step_size", self.step_size)
    }

    /// Parse from a TOML document; missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> AnyResult<Self> {
        let config: Self = toml::from_str(s).context("failed to parse Monte Carlo config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> AnyResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config in {}", path.display()))
    }
}

/// Model parameters plus the Monte Carlo settings for one pricing session.
///
/// ```toml
/// [model]
/// sigma = 0.4
/// r = 0.02
/// strike = 140.0
/// maturity = 1.0
///
/// [monte_carlo]
/// iterations = 100000
/// step_size = 0.001
/// seed = 42
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PricingSession {
    pub model: ModelParameters,
    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,
}

impl PricingSession {
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.monte_carlo.validate()
    }

    pub fn from_toml_str(s: &str) -> AnyResult<Self> {
        let session: Self = toml::from_str(s).context("failed to parse pricing session")?;
        session.validate()?;
        Ok(session)
    }
}

/// Load and validate a [`PricingSession`] from a TOML file.
pub fn load_session(path: impl AsRef<Path>) -> AnyResult<PricingSession> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    PricingSession::from_toml_str(&text)
        .with_context(|| format!("invalid pricing session in {}", path.display()))
}

pub(crate) fn validate_iterations(iterations: usize) -> Result<()> {
    if iterations < 1 {
        return Err(PricingError::InvalidParameter {
            name: "iterations",
            value: iterations as f64,
            constraint: "must be >= 1",
        });
    }
    Ok(())
}

fn default_iterations() -> usize {
    50_000
}

fn default_step_size() -> f64 {
    0.01
}

fn default_seed() -> Option<u64> {
    Some(123456)
}

fn default_parallel() -> bool {
    true
}
