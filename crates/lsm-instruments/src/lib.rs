//! # lsm-instruments
//!
//! Option payoffs, exercise rights, and the resolved exercise schedule on a
//! simulation grid.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod exercise;
pub mod option;
pub mod payoff;

pub use exercise::{Exercise, ExerciseSchedule};
pub use option::BermudanOption;
pub use payoff::{BasketKind, OptionType, Payoff};
