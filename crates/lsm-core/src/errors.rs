//! Error types for the pricing workspace.
//!
//! A single `thiserror`-derived enum covers every fallible call. Parameter
//! validation happens at call entry through the `ensure!` macro and is
//! always fatal; numerical degeneracies inside backward induction are not
//! errors and never reach this type.

use thiserror::Error;

/// The top-level error type used throughout the workspace.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A caller-supplied parameter is outside its domain (negative
    /// volatility or time, non-positive step count, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An internal precondition does not hold (mismatched dimensions, ...).
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// A requested sensitivity has no path through the computation graph.
    #[error("parameter `{parameter}` does not participate in the computation graph")]
    GraphDisconnected {
        /// Name of the disconnected parameter.
        parameter: String,
    },

    /// Configuration text could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// General runtime error.
    #[error("{0}")]
    Runtime(String),
}

/// Shorthand `Result` type used throughout the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::InvalidParameter(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use lsm_core::ensure;
/// fn positive(x: f64) -> lsm_core::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidParameter(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// Used for internal shape checks rather than user-facing parameters.
#[macro_export]
macro_rules! require {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use lsm_core::fail;
/// fn always_err() -> lsm_core::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
