//! # lsm-autodiff
//!
//! Reverse-mode automatic differentiation for the pricing pipeline.
//!
//! A [`Tape`] is the differentiation context of one sensitivity
//! computation. Parameters are marked differentiable with
//! [`Tape::input`], which returns an active [`Var`]; every arithmetic
//! operation on active variables appends a node holding its local partial
//! derivatives. A single call to [`Tape::gradient`] then sweeps the tape
//! backwards and returns the derivative of one output with respect to every
//! recorded node, together with which nodes the output actually depends on.
//!
//! Numerical code is written once against the [`Scalar`] trait and runs
//! either on plain `f64` (pricing only) or on [`Var`] (pricing plus
//! sensitivities).
//!
//! ```
//! use lsm_autodiff::{Scalar, Tape};
//!
//! fn discounted<S: Scalar>(x: S, r: S, t: S) -> S {
//!     x * (-(r * t)).exp()
//! }
//!
//! let tape = Tape::new();
//! let x = tape.input(100.0);
//! let r = tape.input(0.05);
//! let price = discounted(x, r, Scalar::from_real(1.0));
//! let grads = tape.gradient(&price);
//! assert!((grads.wrt(&x).unwrap() - (-0.05f64).exp()).abs() < 1e-12);
//! assert!(grads.wrt(&r).unwrap() < 0.0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// The generic scalar abstraction.
pub mod scalar;

/// Tape storage and the reverse sweep.
pub mod tape;

/// Active variables and their operator overloads.
pub mod var;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use scalar::{mean, sum, Scalar};
pub use tape::{Gradients, Tape};
pub use var::Var;
