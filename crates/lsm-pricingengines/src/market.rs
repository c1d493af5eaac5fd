//! Market data shared by every engine.
//!
//! All quantities a price can be differentiated against live here as
//! scalars: spots and volatilities per underlying, the flat risk-free rate,
//! and the time to maturity. The correlation of the Brownian drivers is
//! plain data.

use lsm_autodiff::Scalar;
use lsm_core::{ensure, Real, Result, Size};
use lsm_methods::{PathSimulator, PathTensor, PricingConfig, SimulationGrid};
use lsm_processes::{Correlation, LogNormalProcess, StochasticProcess};

/// Spots, volatilities, rate and maturity of a (basket) option market.
#[derive(Debug, Clone)]
pub struct MarketInputs<S> {
    spots: Vec<S>,
    volatilities: Vec<S>,
    rate: S,
    maturity: S,
    correlation: Option<Correlation>,
}

impl<S: Scalar> MarketInputs<S> {
    /// A single lognormal underlying.
    pub fn new(spot: S, volatility: S, rate: S, maturity: S) -> Result<Self> {
        Self::basket(vec![spot], vec![volatility], rate, maturity)
    }

    /// Several independent lognormal underlyings; see
    /// [`Self::with_correlation`].
    pub fn basket(spots: Vec<S>, volatilities: Vec<S>, rate: S, maturity: S) -> Result<Self> {
        ensure!(!spots.is_empty(), "at least one underlying is required");
        ensure!(
            spots.len() == volatilities.len(),
            "{} spots but {} volatilities",
            spots.len(),
            volatilities.len()
        );
        for (i, s) in spots.iter().enumerate() {
            ensure!(
                s.value() > 0.0 && s.value().is_finite(),
                "spot[{i}] must be positive and finite, got {}",
                s.value()
            );
        }
        for (i, v) in volatilities.iter().enumerate() {
            ensure!(
                v.value() >= 0.0 && v.value().is_finite(),
                "volatility[{i}] must be non-negative and finite, got {}",
                v.value()
            );
        }
        ensure!(rate.value().is_finite(), "rate must be finite, got {}", rate.value());
        ensure!(
            maturity.value() > 0.0 && maturity.value().is_finite(),
            "maturity must be positive and finite, got {}",
            maturity.value()
        );
        Ok(Self {
            spots,
            volatilities,
            rate,
            maturity,
            correlation: None,
        })
    }

    /// Correlate the underlyings' Brownian drivers.
    pub fn with_correlation(mut self, correlation: Correlation) -> Result<Self> {
        ensure!(
            correlation.dimension() == self.spots.len(),
            "correlation of dimension {} for {} underlyings",
            correlation.dimension(),
            self.spots.len()
        );
        self.correlation = Some(correlation);
        Ok(self)
    }

    /// Number of underlyings.
    pub fn assets(&self) -> Size {
        self.spots.len()
    }

    /// Initial states `S0`.
    pub fn spots(&self) -> &[S] {
        &self.spots
    }

    /// Lognormal volatilities.
    pub fn volatilities(&self) -> &[S] {
        &self.volatilities
    }

    /// Flat continuously compounded risk-free rate.
    pub fn rate(&self) -> S {
        self.rate
    }

    /// Time to maturity in years.
    pub fn maturity(&self) -> S {
        self.maturity
    }

    /// Driver correlation, if any.
    pub fn correlation(&self) -> Option<&Correlation> {
        self.correlation.as_ref()
    }

    /// `exp(−r t)`.
    pub fn discount(&self, t: S) -> S {
        (-(self.rate * t)).exp()
    }

    /// The same market with every scalar replaced. The replacements must
    /// carry the same values; only their scalar type changes.
    pub(crate) fn rebind<T: Scalar>(
        &self,
        spots: Vec<T>,
        volatilities: Vec<T>,
        rate: T,
        maturity: T,
    ) -> MarketInputs<T> {
        MarketInputs {
            spots,
            volatilities,
            rate,
            maturity,
            correlation: self.correlation.clone(),
        }
    }

    /// Risk-neutral GBM per underlying.
    pub fn processes(&self) -> Result<Vec<LogNormalProcess<S>>> {
        self.volatilities
            .iter()
            .map(|&sigma| LogNormalProcess::new(self.rate, sigma))
            .collect()
    }

    /// Grid of `config.steps` steps to maturity and the simulated
    /// risk-neutral paths on it.
    pub fn simulate(&self, config: &PricingConfig) -> Result<(SimulationGrid<S>, PathTensor<S>)> {
        let grid = SimulationGrid::new(self.maturity, config.steps)?;
        let mut simulator = PathSimulator::from_config(config)?;
        if let Some(c) = &self.correlation {
            simulator = simulator.with_correlation(c.clone());
        }
        let processes = self.processes()?;
        let drivers: Vec<&dyn StochasticProcess<S>> = processes
            .iter()
            .map(|p| p as &dyn StochasticProcess<S>)
            .collect();
        let paths = simulator.simulate(&grid, &self.spots, &drivers)?;
        Ok((grid, paths))
    }
}

impl MarketInputs<Real> {
    /// Copy with `spots[asset]` scaled by `1 + rel`.
    pub(crate) fn bump_spot(&self, asset: Size, rel: Real) -> Self {
        let mut out = self.clone();
        out.spots[asset] *= 1.0 + rel;
        out
    }

    /// Copy with `volatilities[asset]` shifted by `h`.
    pub(crate) fn bump_volatility(&self, asset: Size, h: Real) -> Self {
        let mut out = self.clone();
        out.volatilities[asset] += h;
        out
    }

    /// Copy with the rate shifted by `h`.
    pub(crate) fn bump_rate(&self, h: Real) -> Self {
        Self {
            rate: self.rate + h,
            ..self.clone()
        }
    }

    /// Copy with the maturity shifted by `h`.
    pub(crate) fn bump_maturity(&self, h: Real) -> Self {
        Self {
            maturity: self.maturity + h,
            ..self.clone()
        }
    }
}
