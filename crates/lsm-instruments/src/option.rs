//! An option with early-exercise rights.

use crate::{Exercise, Payoff};

/// A payoff together with its exercise right.
///
/// European and American options are the two limiting cases: no early
/// exercise, and exercise at every (downsampled) grid step.
#[derive(Debug, Clone, PartialEq)]
pub struct BermudanOption {
    /// Exercise payoff.
    pub payoff: Payoff,
    /// When the payoff may be claimed.
    pub exercise: Exercise,
}

impl BermudanOption {
    /// Wrap a payoff and exercise right.
    pub fn new(payoff: Payoff, exercise: Exercise) -> Self {
        Self { payoff, exercise }
    }

    /// Exercisable at maturity only.
    pub fn european(payoff: Payoff) -> Self {
        Self::new(payoff, Exercise::European)
    }

    /// Exercisable on the downsampled grid.
    pub fn american(payoff: Payoff) -> Self {
        Self::new(payoff, Exercise::American)
    }

    /// The same payoff restricted to exercise at maturity.
    pub fn to_european(&self) -> Self {
        Self::european(self.payoff.clone())
    }
}
