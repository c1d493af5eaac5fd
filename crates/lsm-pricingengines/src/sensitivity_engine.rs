//! Adjoint (reverse-mode) Greeks of the simulation engines.
//!
//! Each call records one pricing run on a fresh [`Tape`]: spots,
//! volatilities, rate, maturity and, for credit-risky prices, the initial
//! intensity become tape inputs, and a single backward sweep from the
//! estimate yields every sensitivity at once. A parameter the estimate
//! does not depend on structurally is reported as
//! [`Error::GraphDisconnected`] rather than as a zero.

use crate::{
    CreditInputs, CvaEngine, LongstaffSchwartzEngine, MarketInputs, MonteCarloEuropeanEngine,
};
use lsm_autodiff::{Gradients, Tape, Var};
use lsm_core::{Error, Real, Result, Size};
use lsm_instruments::{BermudanOption, Payoff};
use lsm_methods::{McResult, PricingConfig};
use std::collections::BTreeMap;
use std::fmt;

/// A first-order sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Greek {
    /// `∂V/∂S0` of an underlying.
    Delta(Size),
    /// `∂V/∂σ` of an underlying.
    Vega(Size),
    /// `∂V/∂r`.
    Rho,
    /// `∂V/∂T`.
    Theta,
    /// `∂V/∂λ0`.
    IntensityDelta,
}

impl Greek {
    /// Name of the market parameter differentiated against.
    pub fn parameter(&self) -> String {
        match self {
            Self::Delta(i) => format!("spot[{i}]"),
            Self::Vega(i) => format!("volatility[{i}]"),
            Self::Rho => "rate".to_string(),
            Self::Theta => "maturity".to_string(),
            Self::IntensityDelta => "initial_intensity".to_string(),
        }
    }
}

impl fmt::Display for Greek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delta(i) => write!(f, "delta[{i}]"),
            Self::Vega(i) => write!(f, "vega[{i}]"),
            Self::Rho => write!(f, "rho"),
            Self::Theta => write!(f, "theta"),
            Self::IntensityDelta => write!(f, "intensity_delta"),
        }
    }
}

/// Estimate and its sensitivities.
#[derive(Debug, Clone)]
pub struct SensitivityReport {
    /// Estimate.
    pub value: Real,
    /// Standard error of the estimate.
    pub std_error: Real,
    /// Per-parameter derivative, or why it is unavailable.
    pub greeks: BTreeMap<Greek, Result<Real>>,
    /// Nodes recorded on the tape.
    pub tape_len: Size,
}

impl SensitivityReport {
    /// One sensitivity.
    ///
    /// # Errors
    ///
    /// `GraphDisconnected` if the estimate does not depend on the
    /// parameter, `Precondition` if it was not an input of this run.
    pub fn get(&self, greek: Greek) -> Result<Real> {
        match self.greeks.get(&greek) {
            Some(r) => r.clone(),
            None => Err(Error::Precondition(format!("{greek} was not computed"))),
        }
    }

    /// Delta of the first underlying.
    pub fn delta(&self) -> Result<Real> {
        self.get(Greek::Delta(0))
    }

    /// Vega of the first underlying.
    pub fn vega(&self) -> Result<Real> {
        self.get(Greek::Vega(0))
    }

    /// Rho.
    pub fn rho(&self) -> Result<Real> {
        self.get(Greek::Rho)
    }

    /// Sensitivity to maturity.
    pub fn theta(&self) -> Result<Real> {
        self.get(Greek::Theta)
    }
}

/// Reverse-mode Greeks for the Monte Carlo engines.
#[derive(Debug, Clone)]
pub struct SensitivityEngine {
    config: PricingConfig,
}

impl SensitivityEngine {
    /// Engine with a validated configuration.
    pub fn new(config: PricingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Greeks of a European payoff.
    pub fn european(&self, payoff: &Payoff, market: &MarketInputs<Real>) -> Result<SensitivityReport> {
        let engine = MonteCarloEuropeanEngine::new(self.config.clone())?;
        self.differentiate(market, None, |m, _| engine.price(payoff, m))
    }

    /// Greeks of a Longstaff-Schwartz price.
    pub fn longstaff_schwartz(&self, option: &BermudanOption, market: &MarketInputs<Real>) -> Result<SensitivityReport> {
        let engine = LongstaffSchwartzEngine::new(self.config.clone())?;
        self.differentiate(market, None, |m, _| Ok(engine.price(option, m)?.estimate))
    }

    /// Greeks of the CVA of a terminal payoff, including `∂CVA/∂λ0`.
    pub fn cva(
        &self,
        payoff: &Payoff,
        market: &MarketInputs<Real>,
        credit: &CreditInputs<Real>,
    ) -> Result<SensitivityReport> {
        let engine = CvaEngine::new(self.config.clone())?;
        self.differentiate(market, Some(credit.initial_intensity()), |m, lambda| {
            let credit = credit.rebind(lambda.unwrap_or_else(|| Var::constant(credit.initial_intensity())));
            Ok(engine.calculate(payoff, m, &credit)?.cva)
        })
    }

    /// Greeks of a survival-weighted Longstaff-Schwartz price, including
    /// `∂V/∂λ0`.
    pub fn defaultable_longstaff_schwartz(
        &self,
        option: &BermudanOption,
        market: &MarketInputs<Real>,
        credit: &CreditInputs<Real>,
    ) -> Result<SensitivityReport> {
        let engine = CvaEngine::new(self.config.clone())?;
        self.differentiate(market, Some(credit.initial_intensity()), |m, lambda| {
            let credit = credit.rebind(lambda.unwrap_or_else(|| Var::constant(credit.initial_intensity())));
            Ok(engine.defaultable_value(option, m, &credit)?.estimate)
        })
    }

    /// Record `price` on a fresh tape with every market scalar (and the
    /// initial intensity, if given) as an input, then sweep back once.
    fn differentiate<F>(
        &self,
        market: &MarketInputs<Real>,
        intensity: Option<Real>,
        price: F,
    ) -> Result<SensitivityReport>
    where
        F: for<'t> FnOnce(&MarketInputs<Var<'t>>, Option<Var<'t>>) -> Result<McResult<Var<'t>>>,
    {
        let tape = Tape::new();
        let spots: Vec<Var<'_>> = market.spots().iter().map(|&s| tape.input(s)).collect();
        let vols: Vec<Var<'_>> = market.volatilities().iter().map(|&v| tape.input(v)).collect();
        let rate = tape.input(market.rate());
        let maturity = tape.input(market.maturity());
        let lambda = intensity.map(|l| tape.input(l));

        let active = market.rebind(spots.clone(), vols.clone(), rate, maturity);
        let estimate = price(&active, lambda)?;
        let gradients = tape.gradient(&estimate.value);

        let mut greeks = BTreeMap::new();
        for (i, s) in spots.iter().enumerate() {
            greeks.insert(Greek::Delta(i), adjoint(&gradients, s, Greek::Delta(i)));
        }
        for (i, v) in vols.iter().enumerate() {
            greeks.insert(Greek::Vega(i), adjoint(&gradients, v, Greek::Vega(i)));
        }
        greeks.insert(Greek::Rho, adjoint(&gradients, &rate, Greek::Rho));
        greeks.insert(Greek::Theta, adjoint(&gradients, &maturity, Greek::Theta));
        if let Some(l) = &lambda {
            greeks.insert(Greek::IntensityDelta, adjoint(&gradients, l, Greek::IntensityDelta));
        }

        tracing::debug!(
            nodes = tape.len(),
            value = estimate.price(),
            greeks = greeks.len(),
            "adjoint sweep"
        );
        Ok(SensitivityReport {
            value: estimate.price(),
            std_error: estimate.std_error,
            greeks,
            tape_len: tape.len(),
        })
    }
}

fn adjoint(gradients: &Gradients, input: &Var<'_>, greek: Greek) -> Result<Real> {
    gradients.wrt(input).ok_or_else(|| {
        tracing::warn!(%greek, "estimate does not depend on {}", greek.parameter());
        Error::GraphDisconnected {
            parameter: greek.parameter(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{black_scholes_merton, IntensityModel};
    use approx::assert_relative_eq;
    use lsm_instruments::{BasketKind, OptionType};
    use lsm_processes::IntensityProcess;

    fn engine(paths: Size) -> SensitivityEngine {
        SensitivityEngine::new(PricingConfig::builder().paths(paths).steps(8).seed(99).build().unwrap()).unwrap()
    }

    #[test]
    fn european_greeks_match_black_scholes() {
        let market = MarketInputs::new(100.0, 0.25, 0.01, 2.0).unwrap();
        let call = Payoff::vanilla(OptionType::Call, 90.0).unwrap();
        let report = engine(40_000).european(&call, &market).unwrap();
        let bs = black_scholes_merton(OptionType::Call, 100.0, 90.0, 0.01, 0.0, 0.25, 2.0);
        assert_relative_eq!(report.delta().unwrap(), bs.delta, epsilon = 0.02);
        assert_relative_eq!(report.vega().unwrap(), bs.vega, epsilon = 1.5);
        assert_relative_eq!(report.rho().unwrap(), bs.rho, epsilon = 3.0);
        assert_relative_eq!(report.theta().unwrap(), -bs.theta, epsilon = 0.5);
        assert!(report.get(Greek::IntensityDelta).is_err());
        assert!(report.tape_len > 40_000);
    }

    #[test]
    fn unused_underlying_is_disconnected() {
        // the second asset never wins the best-of
        let market = MarketInputs::basket(vec![100.0, 1.0], vec![0.2, 0.1], 0.02, 1.0).unwrap();
        let payoff = Payoff::basket(OptionType::Call, 100.0, BasketKind::BestOf, 2).unwrap();
        let report = engine(2_000).european(&payoff, &market).unwrap();
        assert!(report.get(Greek::Delta(0)).unwrap() > 0.0);
        assert_eq!(
            report.get(Greek::Delta(1)),
            Err(Error::GraphDisconnected {
                parameter: "spot[1]".into()
            })
        );
        assert!(matches!(report.get(Greek::Vega(1)), Err(Error::GraphDisconnected { .. })));
        assert!(report.rho().is_ok());
    }

    #[test]
    fn cva_intensity_delta_has_closed_form() {
        let market = MarketInputs::new(100.0, 0.2, 0.03, 2.0).unwrap();
        let frozen = IntensityModel::Cir(IntensityProcess::new(0.0, 0.0, 0.0).unwrap());
        let credit = CreditInputs::new(0.02, frozen, 0.6).unwrap();
        let call = Payoff::vanilla(OptionType::Call, 100.0).unwrap();
        let sens = engine(2_000);
        let report = sens.cva(&call, &market, &credit).unwrap();
        let undefaulted = MonteCarloEuropeanEngine::new(sens.config().clone())
            .unwrap()
            .price(&call, &market)
            .unwrap()
            .value;
        let expected = 0.6 * 2.0 * (-0.04f64).exp() * undefaulted;
        assert_relative_eq!(
            report.get(Greek::IntensityDelta).unwrap(),
            expected,
            max_relative = 1e-9
        );
        assert!(report.delta().unwrap() > 0.0);
    }

    #[test]
    fn greek_names() {
        assert_eq!(Greek::Delta(2).to_string(), "delta[2]");
        assert_eq!(Greek::Vega(0).parameter(), "volatility[0]");
        assert_eq!(Greek::IntensityDelta.parameter(), "initial_intensity");
        assert!(Greek::Delta(5) < Greek::Vega(0));
    }
}
