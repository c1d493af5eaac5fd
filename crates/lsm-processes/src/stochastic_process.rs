//! The one-step evolution interface shared by all processes.
//!
//! A process advances a state `x(t)` to `x(t + Δt)` given a Brownian
//! increment `ΔW ~ N(0, Δt)`. The increment is an input, so the process
//! itself holds no random state and is immutable for the lifetime of a
//! simulation.

use lsm_autodiff::Scalar;
use lsm_core::{ensure, Result, Time};
use std::fmt::Debug;

/// A one-dimensional process evolved by Euler–Maruyama.
pub trait StochasticProcess<S: Scalar>: Debug {
    /// Advance `state` over `dt` with Brownian increment `dw`, starting at
    /// time `t`.
    ///
    /// Fails with `InvalidParameter` if `dt <= 0`.
    fn evolve(&self, state: S, dt: S, dw: S, t: Time) -> Result<S>;

    /// Advance a whole column of path states over the same step.
    ///
    /// The default applies [`evolve`](Self::evolve) path by path;
    /// implementations may hoist path-independent terms.
    fn evolve_column(&self, states: &[S], dt: S, dws: &[S], t: Time) -> Result<Vec<S>> {
        check_step(dt)?;
        states
            .iter()
            .zip(dws)
            .map(|(&x, &dw)| self.evolve(x, dt, dw, t))
            .collect()
    }

    /// Deterministic shift added to the simulated state at time `t`, after
    /// simulation. `None` for unshifted processes.
    fn shift(&self, _t: Time) -> Option<lsm_core::Real> {
        None
    }
}

/// Reject non-positive time steps.
pub(crate) fn check_step<S: Scalar>(dt: S) -> Result<()> {
    ensure!(dt.value() > 0.0, "time step must be positive, got {}", dt.value());
    Ok(())
}

/// Reject negative volatilities.
pub(crate) fn check_volatility<S: Scalar>(name: &str, sigma: S) -> Result<()> {
    ensure!(
        sigma.value() >= 0.0,
        "{name} must be non-negative, got {}",
        sigma.value()
    );
    Ok(())
}
