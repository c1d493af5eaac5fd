//! Monte Carlo engine for payoffs exercisable at maturity only.

use crate::MarketInputs;
use lsm_autodiff::Scalar;
use lsm_core::{require, Real, Result};
use lsm_instruments::Payoff;
use lsm_methods::{McResult, PricingConfig};

/// Discounted risk-neutral expectation of a terminal payoff.
///
/// Generic over the scalar type: on [`lsm_autodiff::Var`] the estimate
/// carries pathwise derivatives.
#[derive(Debug, Clone)]
pub struct MonteCarloEuropeanEngine {
    config: PricingConfig,
}

impl MonteCarloEuropeanEngine {
    /// Engine with a validated configuration.
    pub fn new(config: PricingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// `exp(−rT) · mean(payoff(S_T))` over the simulated paths.
    pub fn price<S: Scalar>(&self, payoff: &Payoff, market: &MarketInputs<S>) -> Result<McResult<S>> {
        require!(
            payoff.assets() == market.assets(),
            "payoff on {} underlyings but market of {}",
            payoff.assets(),
            market.assets()
        );
        let (grid, paths) = market.simulate(&self.config)?;
        let terminal = grid.steps();
        let df = market.discount(grid.dt() * terminal as Real);
        let samples: Vec<S> = (0..paths.paths())
            .map(|p| payoff.value(paths.states(p, terminal)) * df)
            .collect();
        let estimate = McResult::from_samples(&samples);
        tracing::debug!(
            payoff = %payoff,
            paths = estimate.paths,
            value = estimate.price(),
            std_error = estimate.std_error,
            "european monte carlo"
        );
        Ok(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::black_scholes_merton;
    use lsm_instruments::{BasketKind, OptionType};

    fn engine(paths: usize, seed: u64) -> MonteCarloEuropeanEngine {
        let config = PricingConfig::builder()
            .paths(paths)
            .steps(10)
            .seed(seed)
            .build()
            .unwrap();
        MonteCarloEuropeanEngine::new(config).unwrap()
    }

    #[test]
    fn converges_to_black_scholes() {
        let market = MarketInputs::new(100.0, 0.25, 0.01, 2.0).unwrap();
        for option_type in [OptionType::Call, OptionType::Put] {
            let payoff = Payoff::vanilla(option_type, 90.0).unwrap();
            let mc = engine(40_000, 7).price(&payoff, &market).unwrap();
            let bs = black_scholes_merton(option_type, 100.0, 90.0, 0.01, 0.0, 0.25, 2.0).price;
            assert!(
                (mc.value - bs).abs() < 4.0 * mc.std_error,
                "{option_type}: mc {} ± {} vs {bs}",
                mc.value,
                mc.std_error
            );
        }
    }

    #[test]
    fn same_seed_same_estimate() {
        let market = MarketInputs::new(100.0, 0.2, 0.05, 1.0).unwrap();
        let payoff = Payoff::vanilla(OptionType::Call, 100.0).unwrap();
        let a = engine(2_000, 11).price(&payoff, &market).unwrap();
        let b = engine(2_000, 11).price(&payoff, &market).unwrap();
        let c = engine(2_000, 12).price(&payoff, &market).unwrap();
        assert_eq!(a.value, b.value);
        assert_ne!(a.value, c.value);
    }

    #[test]
    fn zero_volatility_is_deterministic() {
        let market = MarketInputs::new(100.0, 0.0, 0.05, 1.0).unwrap();
        let payoff = Payoff::vanilla(OptionType::Call, 90.0).unwrap();
        let mc = engine(100, 1).price(&payoff, &market).unwrap();
        let expected: Real = 100.0 - 90.0 * (-0.05f64).exp();
        approx::assert_relative_eq!(mc.value, expected, epsilon = 1e-9);
        assert!(mc.std_error < 1e-9);
    }

    #[test]
    fn asset_count_must_match_payoff() {
        let market = MarketInputs::new(100.0, 0.2, 0.05, 1.0).unwrap();
        let payoff = Payoff::basket(OptionType::Put, 100.0, BasketKind::BestOf, 2).unwrap();
        assert!(engine(10, 1).price(&payoff, &market).is_err());
    }
}
