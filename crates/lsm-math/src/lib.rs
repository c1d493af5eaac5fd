//! # lsm-math
//!
//! Numerical building blocks for the Monte Carlo engines: a minimum-norm
//! least-squares solver over nalgebra, Cholesky factorisation, Gaussian
//! random sources, the normal distribution (via statrs), and a running
//! statistics accumulator.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Probability distributions.
pub mod distributions;

/// Minimum-norm linear least squares.
pub mod least_squares;

/// Matrix factorisations.
pub mod matrix_utilities;

/// Gaussian random number sources.
pub mod random_numbers;

/// Statistics accumulators.
pub mod statistics;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf};
pub use least_squares::LeastSquaresFit;
pub use matrix_utilities::cholesky_decomposition;
pub use random_numbers::{GaussianSource, GeneratorKind};
pub use statistics::Statistics;

/// Dense matrix type used for design matrices and correlation factors.
pub type Matrix = nalgebra::DMatrix<lsm_core::Real>;
