pub mod bs;
pub mod payoff;

/// Common traits shared by the pricers
pub mod traits {
    use crate::error::Result;
    use crate::model_params::{MarketState, ModelParameters};

    /// A pricer evaluated at a single market state.
    pub trait OptionPricer {
        type Output;

        fn price_state(&self, state: &MarketState, params: &ModelParameters)
            -> Result<Self::Output>;
    }
}

/// Helpers for evaluating pricers over a grid of spots
pub mod utils {
    use crate::error::Result;
    use crate::model_params::{MarketState, ModelParameters};
    use crate::models::traits::OptionPricer;

    /// Validate every spot before any pricing happens.
    pub fn validate_spots(spots: &[f64], t: f64, params: &ModelParameters) -> Result<()> {
        params.validate()?;
        spots
            .iter()
            .try_for_each(|&spot| MarketState::new(spot, t).validate(params))
    }

    /// Apply `pricer` to each spot, preserving order.
    pub fn price_curve<P: OptionPricer>(
        pricer: &P,
        spots: &[f64],
        t: f64,
        params: &ModelParameters,
    ) -> Result<Vec<P::Output>> {
        validate_spots(spots, t, params)?;
        spots
            .iter()
            .map(|&spot| pricer.price_state(&MarketState::new(spot, t), params))
            .collect()
    }

    /// Evenly spaced spots in `[start, end]`, both ends included.
    pub fn spot_grid(start: f64, end: f64, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (end - start) / (count - 1) as f64;
                (0..count).map(|i| start + step * i as f64).collect()
            }
        }
    }
}
