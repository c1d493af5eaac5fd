//! # lsm-processes
//!
//! One-step evolution rules for the Monte Carlo path simulator.
//!
//! Every model implements [`StochasticProcess`] with the uniform signature
//! `evolve(state, dt, dw, t)`; models that do not depend on calendar time
//! simply ignore `t`. Parameters are generic over [`Scalar`] so that they can
//! be marked differentiable.
//!
//! [`Scalar`]: lsm_autodiff::Scalar

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod correlation;
pub mod intensity_process;
pub mod lognormal_process;
pub mod normal_process;
pub mod stochastic_process;

pub use correlation::Correlation;
pub use intensity_process::{CirPlusPlusProcess, IntensityProcess, ShiftFunction};
pub use lognormal_process::LogNormalProcess;
pub use normal_process::NormalProcess;
pub use stochastic_process::StochasticProcess;
