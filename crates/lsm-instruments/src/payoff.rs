//! Option payoffs.
//!
//! A payoff maps the state of one or more underlyings at exercise to a
//! cash amount. Single-asset payoffs read the first state; basket payoffs
//! first aggregate all states with `max` or `min`.

use lsm_autodiff::Scalar;
use lsm_core::{ensure, Real, Result, Size};
use std::fmt;

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// A call option (right to buy).
    Call,
    /// A put option (right to sell).
    Put,
}

impl OptionType {
    /// +1 for Call, −1 for Put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// How a basket payoff aggregates its underlyings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasketKind {
    /// The underlying most favourable to the holder: the maximum for a
    /// call, the minimum for a put.
    BestOf,
    /// The underlying least favourable to the holder.
    WorstOf,
}

/// Exercise payoff of an option.
#[derive(Debug, Clone, PartialEq)]
pub enum Payoff {
    /// `max(φ(S − K), 0)` on a single underlying.
    Vanilla {
        /// Call or put.
        option_type: OptionType,
        /// Strike `K`.
        strike: Real,
    },
    /// `max(φ(A(S₁..Sₙ) − K), 0)` with `A` a best-of or worst-of
    /// aggregate over `assets` underlyings.
    Basket {
        /// Call or put.
        option_type: OptionType,
        /// Strike `K`.
        strike: Real,
        /// Aggregation rule.
        kind: BasketKind,
        /// Number of underlyings.
        assets: Size,
    },
}

impl Payoff {
    /// Plain vanilla payoff.
    pub fn vanilla(option_type: OptionType, strike: Real) -> Result<Self> {
        ensure!(strike >= 0.0, "strike must be non-negative, got {strike}");
        Ok(Self::Vanilla {
            option_type,
            strike,
        })
    }

    /// Best-of / worst-of payoff over `assets ≥ 1` underlyings.
    pub fn basket(option_type: OptionType, strike: Real, kind: BasketKind, assets: Size) -> Result<Self> {
        ensure!(strike >= 0.0, "strike must be non-negative, got {strike}");
        ensure!(assets >= 1, "a basket needs at least one underlying");
        Ok(Self::Basket {
            option_type,
            strike,
            kind,
            assets,
        })
    }

    /// Call or put.
    pub fn option_type(&self) -> OptionType {
        match *self {
            Self::Vanilla { option_type, .. } | Self::Basket { option_type, .. } => option_type,
        }
    }

    /// Strike `K`.
    pub fn strike(&self) -> Real {
        match *self {
            Self::Vanilla { strike, .. } | Self::Basket { strike, .. } => strike,
        }
    }

    /// Number of underlyings read by the payoff.
    pub fn assets(&self) -> Size {
        match *self {
            Self::Vanilla { .. } => 1,
            Self::Basket { assets, .. } => assets,
        }
    }

    /// The aggregated underlying `A(S)` the strike is compared against.
    pub fn underlying<S: Scalar>(&self, states: &[S]) -> S {
        match *self {
            Self::Vanilla { .. } => states[0],
            Self::Basket {
                option_type, kind, ..
            } => {
                let take_max = matches!(
                    (option_type, kind),
                    (OptionType::Call, BasketKind::BestOf) | (OptionType::Put, BasketKind::WorstOf)
                );
                states[1..].iter().fold(states[0], |acc, &s| {
                    if take_max {
                        acc.max(s)
                    } else {
                        acc.min(s)
                    }
                })
            }
        }
    }

    /// Payoff value on `states` (one entry per underlying).
    pub fn value<S: Scalar>(&self, states: &[S]) -> S {
        let phi = self.option_type().sign();
        ((self.underlying(states) - self.strike()) * phi).positive_part()
    }

    /// Whether immediate exercise pays a strictly positive amount.
    pub fn in_the_money(&self, states: &[Real]) -> bool {
        self.option_type().sign() * (self.underlying(states) - self.strike()) > 0.0
    }
}

impl fmt::Display for Payoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vanilla {
                option_type,
                strike,
            } => write!(f, "Vanilla {option_type} @ {strike}"),
            Self::Basket {
                option_type,
                strike,
                kind,
                assets,
            } => write!(f, "{kind:?} {assets}-asset {option_type} @ {strike}"),
        }
    }
}
