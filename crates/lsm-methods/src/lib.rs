//! # lsm-methods
//!
//! Numerical methods behind the pricing engines.
//!
//! * [`config`]: pricing-method configuration (serde / TOML)
//! * [`monte_carlo`]: simulation grid, path tensor, path simulator
//! * [`regression`]: least-squares continuation-value estimation
//! * [`lattice`]: Cox-Ross-Rubinstein binomial tree

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Pricing-method configuration.
pub mod config;

/// Binomial lattice with early exercise.
pub mod lattice;

/// Monte Carlo path simulation.
pub mod monte_carlo;

/// Continuation-value regression.
pub mod regression;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use config::{BasisKind, PricingConfig, PricingConfigBuilder, RegressionBasis};
pub use lattice::BinomialLattice;
pub use monte_carlo::{McResult, PathSimulator, PathTensor, SimulationGrid};
pub use regression::{ContinuationRegressor, Regression, RegressionOutcome};
