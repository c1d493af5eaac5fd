//! Geometric Brownian motion.
//!
//! ```text
//! dS = μ S dt + σ S dW
//! ```
//!
//! Evolved with the exact log-Euler step
//! `S(t+Δt) = S(t) · exp((μ − σ²/2) Δt + σ ΔW)`, which keeps the state
//! strictly positive.

use crate::stochastic_process::{check_step, check_volatility, StochasticProcess};
use lsm_autodiff::Scalar;
use lsm_core::{Result, Time};

/// Lognormal (GBM) process with constant drift and volatility.
#[derive(Debug, Clone, Copy)]
pub struct LogNormalProcess<S> {
    drift: S,
    volatility: S,
}

impl<S: Scalar> LogNormalProcess<S> {
    /// Create a GBM with drift `μ` and volatility `σ ≥ 0`.
    pub fn new(drift: S, volatility: S) -> Result<Self> {
        check_volatility("volatility", volatility)?;
        Ok(Self { drift, volatility })
    }

    /// Drift `μ`.
    pub fn drift(&self) -> S {
        self.drift
    }

    /// Volatility `σ`.
    pub fn volatility(&self) -> S {
        self.volatility
    }

    fn log_drift(&self, dt: S) -> S {
        (self.drift - self.volatility * self.volatility * 0.5) * dt
    }
}

impl<S: Scalar> StochasticProcess<S> for LogNormalProcess<S> {
    fn evolve(&self, state: S, dt: S, dw: S, _t: Time) -> Result<S> {
        check_step(dt)?;
        Ok(state * (self.log_drift(dt) + self.volatility * dw).exp())
    }

    fn evolve_column(&self, states: &[S], dt: S, dws: &[S], _t: Time) -> Result<Vec<S>> {
        check_step(dt)?;
        let mu_dt = self.log_drift(dt);
        Ok(states
            .iter()
            .zip(dws)
            .map(|(&x, &dw)| x * (mu_dt + self.volatility * dw).exp())
            .collect())
    }
}
