//! Cox-Ross-Rubinstein binomial tree.
//!
//! ```text
//! u = exp(σ √Δt),  d = 1/u,  q = (exp(rΔt) − d) / (u − d)
//! ```
//!
//! Node `(i, j)` is the state after `j` up-moves and `i − j` down-moves,
//! `S₀ u^(2j − i)`. Parameters are scalars, so the tree prices on `f64`
//! and differentiates on the tape with the same code.

use lsm_autodiff::Scalar;
use lsm_core::{ensure, Real, Result, Size};
use lsm_instruments::{ExerciseSchedule, Payoff};

/// A CRR tree for one lognormal underlying.
#[derive(Debug, Clone, Copy)]
pub struct BinomialLattice<S> {
    spot: S,
    up: S,
    p_up: S,
    discount: S,
    steps: Size,
}

impl<S: Scalar> BinomialLattice<S> {
    /// Build a CRR tree with `steps` layers over `maturity`.
    ///
    /// Fails if the risk-neutral probability falls outside `[0, 1]`, which
    /// happens when `|r| Δt` is large against `σ √Δt`; more steps fix it.
    pub fn cox_ross_rubinstein(spot: S, volatility: S, rate: S, maturity: S, steps: Size) -> Result<Self> {
        ensure!(steps > 0, "number of tree steps must be positive");
        ensure!(spot.value() > 0.0, "spot must be positive, got {}", spot.value());
        ensure!(
            volatility.value() > 0.0,
            "tree volatility must be positive, got {}",
            volatility.value()
        );
        ensure!(
            maturity.value() > 0.0,
            "maturity must be positive, got {}",
            maturity.value()
        );
        let dt = maturity / steps as Real;
        let up = (volatility * dt.sqrt()).exp();
        let down = S::from_real(1.0) / up;
        let growth = (rate * dt).exp();
        let p_up = (growth - down) / (up - down);
        ensure!(
            (0.0..=1.0).contains(&p_up.value()),
            "CRR: invalid probability {} (try more steps)",
            p_up.value()
        );
        Ok(Self {
            spot,
            up,
            p_up,
            discount: S::from_real(1.0) / growth,
            steps,
        })
    }

    /// Number of time steps.
    pub fn steps(&self) -> Size {
        self.steps
    }

    /// Underlying value at node `(i, j)`.
    pub fn underlying(&self, i: Size, j: Size) -> S {
        self.spot * self.up.powi(2 * j as i32 - i as i32)
    }

    /// Backward induction with exercise allowed at the schedule's steps.
    ///
    /// The schedule must have been resolved on the same number of steps as
    /// the tree.
    pub fn price(&self, payoff: &Payoff, schedule: &ExerciseSchedule) -> Result<S> {
        let n = self.steps;
        ensure!(
            schedule.terminal() == n,
            "exercise schedule ends at step {} but tree has {n} steps",
            schedule.terminal()
        );
        let mut exercisable = vec![false; n + 1];
        for &s in schedule.early_steps() {
            exercisable[s] = true;
        }

        let p_down = S::from_real(1.0) - self.p_up;
        let mut values: Vec<S> = (0..=n)
            .map(|j| payoff.value(&[self.underlying(n, j)]))
            .collect();

        for i in (0..n).rev() {
            for j in 0..=i {
                let hold = (self.p_up * values[j + 1] + p_down * values[j]) * self.discount;
                values[j] = if exercisable[i] {
                    let exercise = payoff.value(&[self.underlying(i, j)]);
                    if exercise.value() > hold.value() {
                        exercise
                    } else {
                        hold
                    }
                } else {
                    hold
                };
            }
        }
        Ok(values[0])
    }
}
