//! Mean-reverting default intensity (CIR) and its deterministically shifted
//! CIR++ extension.
//!
//! ```text
//! dλ = k (μ − λ) dt + ν √λ dW
//! ```
//!
//! The Euler step can overshoot below zero when the Feller condition
//! `2kμ ≥ ν²` fails. The scheme here truncates: the square root is taken
//! of `max(λ, 0)` and the updated state is floored at zero. This biases the
//! intensity upwards near the origin, and the floored branch carries a zero
//! derivative.

use crate::stochastic_process::{check_step, check_volatility, StochasticProcess};
use lsm_autodiff::Scalar;
use lsm_core::{ensure, Real, Result, Time};
use std::fmt;
use std::sync::Arc;

/// CIR intensity process.
#[derive(Debug, Clone, Copy)]
pub struct IntensityProcess<S> {
    speed: S,
    mean: S,
    volatility: S,
}

impl<S: Scalar> IntensityProcess<S> {
    /// Create a CIR process with reversion speed `k ≥ 0`, long-run level
    /// `μ ≥ 0` and volatility `ν ≥ 0`.
    ///
    /// The Feller condition is not enforced; see [`Self::satisfies_feller`].
    pub fn new(speed: S, mean: S, volatility: S) -> Result<Self> {
        ensure!(
            speed.value() >= 0.0,
            "mean-reversion speed must be non-negative, got {}",
            speed.value()
        );
        ensure!(
            mean.value() >= 0.0,
            "long-run intensity must be non-negative, got {}",
            mean.value()
        );
        check_volatility("volatility of intensity", volatility)?;
        Ok(Self {
            speed,
            mean,
            volatility,
        })
    }

    /// The same process with parameters as passive constants of another
    /// scalar type.
    pub fn lift<T: Scalar>(&self) -> IntensityProcess<T> {
        IntensityProcess {
            speed: T::from_real(self.speed.value()),
            mean: T::from_real(self.mean.value()),
            volatility: T::from_real(self.volatility.value()),
        }
    }

    /// Whether `2kμ ≥ ν²`, i.e. the continuous process never hits zero.
    pub fn satisfies_feller(&self) -> bool {
        let (k, mu, nu) = (self.speed.value(), self.mean.value(), self.volatility.value());
        2.0 * k * mu >= nu * nu
    }

    /// Mean-reversion speed `k`.
    pub fn speed(&self) -> S {
        self.speed
    }

    /// Long-run level `μ`.
    pub fn mean(&self) -> S {
        self.mean
    }

    /// Volatility `ν`.
    pub fn volatility(&self) -> S {
        self.volatility
    }
}

impl<S: Scalar> StochasticProcess<S> for IntensityProcess<S> {
    fn evolve(&self, state: S, dt: S, dw: S, _t: Time) -> Result<S> {
        check_step(dt)?;
        let floored = state.positive_part();
        let next = state
            + self.speed * (self.mean - floored) * dt
            + self.volatility * floored.sqrt() * dw;
        Ok(next.positive_part())
    }
}

/// Deterministic shift `φ(t)` of a CIR++ process.
#[derive(Clone)]
pub struct ShiftFunction(Arc<dyn Fn(Time) -> Real + Send + Sync>);

impl ShiftFunction {
    /// Wrap a shift function.
    pub fn new(f: impl Fn(Time) -> Real + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A constant shift.
    pub fn constant(value: Real) -> Self {
        Self::new(move |_| value)
    }

    /// Evaluate `φ(t)`.
    pub fn at(&self, t: Time) -> Real {
        (self.0)(t)
    }
}

impl fmt::Debug for ShiftFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ShiftFunction(..)")
    }
}

/// CIR++: a CIR base intensity plus a deterministic shift `φ(t)`.
///
/// The base process is simulated unshifted; `φ` is added to each simulated
/// column afterwards, so the base keeps its closed-form CIR moments.
#[derive(Debug, Clone)]
pub struct CirPlusPlusProcess<S> {
    base: IntensityProcess<S>,
    phi: ShiftFunction,
}

impl<S: Scalar> CirPlusPlusProcess<S> {
    /// Shift `base` by `phi`.
    pub fn new(base: IntensityProcess<S>, phi: ShiftFunction) -> Self {
        Self { base, phi }
    }

    /// The unshifted CIR component.
    pub fn base(&self) -> &IntensityProcess<S> {
        &self.base
    }

    /// The same process over another scalar type.
    pub fn lift<T: Scalar>(&self) -> CirPlusPlusProcess<T> {
        CirPlusPlusProcess {
            base: self.base.lift(),
            phi: self.phi.clone(),
        }
    }
}

impl<S: Scalar> StochasticProcess<S> for CirPlusPlusProcess<S> {
    fn evolve(&self, state: S, dt: S, dw: S, t: Time) -> Result<S> {
        self.base.evolve(state, dt, dw, t)
    }

    fn shift(&self, t: Time) -> Option<Real> {
        Some(self.phi.at(t))
    }
}
