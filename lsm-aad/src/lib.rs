//! # lsm-aad
//!
//! Least-squares Monte Carlo (Longstaff-Schwartz) pricing of American and
//! Bermudan options on one or more lognormal underlyings, with Greeks from
//! a reverse-mode automatic differentiation tape and a credit valuation
//! adjustment under a CIR / CIR++ default intensity.
//!
//! This crate is a façade that re-exports the workspace crates.
//!
//! ## Quick start
//!
//! ```rust
//! use lsm_aad::instruments::{BermudanOption, OptionType, Payoff};
//! use lsm_aad::methods::PricingConfig;
//! use lsm_aad::pricingengines::{LongstaffSchwartzEngine, MarketInputs, SensitivityEngine};
//!
//! let config = PricingConfig::builder().paths(2_000).steps(20).build()?;
//! let market = MarketInputs::new(36.0, 0.2, 0.06, 1.0)?;
//! let option = BermudanOption::american(Payoff::vanilla(OptionType::Put, 40.0)?);
//!
//! let price = LongstaffSchwartzEngine::new(config.clone())?.price(&option, &market)?;
//! assert!(price.price() > 4.0);
//!
//! let greeks = SensitivityEngine::new(config)?.longstaff_schwartz(&option, &market)?;
//! assert!(greeks.delta()? < 0.0);
//! # Ok::<(), lsm_aad::core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use lsm_core as core;

/// Normal distribution, least squares, Gaussian sources, statistics.
pub use lsm_math as math;

/// Reverse-mode automatic differentiation.
pub use lsm_autodiff as autodiff;

/// Stochastic processes for underlyings and default intensity.
pub use lsm_processes as processes;

/// Payoffs and exercise rights.
pub use lsm_instruments as instruments;

/// Path simulation, regression, lattices, configuration.
pub use lsm_methods as methods;

/// Pricing and sensitivity engines.
pub use lsm_pricingengines as pricingengines;
