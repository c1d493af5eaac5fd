//! # lsm-pricingengines
//!
//! Pricing engines over lognormal underlyings. Every simulation engine is
//! generic over [`lsm_autodiff::Scalar`], so the same code prices on `f64`
//! and records on a tape for adjoint Greeks.
//!
//! ## Engines
//!
//! - [`AnalyticEuropeanEngine`]: Black-Scholes-Merton reference prices and Greeks
//! - [`MonteCarloEuropeanEngine`]: discounted terminal payoff
//! - [`LongstaffSchwartzEngine`]: least-squares Monte Carlo for early exercise
//! - [`CvaEngine`]: credit valuation adjustment under CIR / CIR++ intensity
//! - [`SensitivityEngine`]: reverse-mode Greeks of the engines above
//! - [`bump_and_revalue()`]: central finite differences on common random numbers

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_european_engine;
pub mod bump_and_revalue;
pub mod cva_engine;
pub mod longstaff_schwartz_engine;
pub mod market;
pub mod mc_european_engine;
pub mod sensitivity_engine;

pub use analytic_european_engine::{black_scholes_merton, AnalyticEuropeanEngine, BlackScholesGreeks};
pub use bump_and_revalue::{bump_and_revalue, BumpSizes};
pub use cva_engine::{survival_probabilities, CreditInputs, CvaEngine, CvaResult, IntensityModel};
pub use longstaff_schwartz_engine::{ExerciseDateReport, LongstaffSchwartzEngine, LsmResult};
pub use market::MarketInputs;
pub use mc_european_engine::MonteCarloEuropeanEngine;
pub use sensitivity_engine::{Greek, SensitivityEngine, SensitivityReport};
