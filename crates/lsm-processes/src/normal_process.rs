//! Arithmetic Brownian motion, `dX = μ dt + σ dW`.

use crate::stochastic_process::{check_step, check_volatility, StochasticProcess};
use lsm_autodiff::Scalar;
use lsm_core::{Result, Time};

/// Normal (Bachelier) process with constant drift and volatility.
#[derive(Debug, Clone, Copy)]
pub struct NormalProcess<S> {
    drift: S,
    volatility: S,
}

impl<S: Scalar> NormalProcess<S> {
    /// Create an arithmetic Brownian motion with volatility `σ ≥ 0`.
    pub fn new(drift: S, volatility: S) -> Result<Self> {
        check_volatility("volatility", volatility)?;
        Ok(Self { drift, volatility })
    }
}

impl<S: Scalar> StochasticProcess<S> for NormalProcess<S> {
    fn evolve(&self, state: S, dt: S, dw: S, _t: Time) -> Result<S> {
        check_step(dt)?;
        Ok(state + self.drift * dt + self.volatility * dw)
    }
}
