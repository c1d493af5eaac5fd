//! Numeric abstraction shared by the `f64` and [`Var`] code paths.

use crate::var::Var;
use lsm_core::Real;
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A real number the pricing pipeline can run on.
///
/// Comparisons that drive control flow (exercise decisions, in-the-money
/// tests, clamping) are made on [`Scalar::value`], so branch selection is
/// never differentiated; only the selected branch is.
pub trait Scalar:
    Copy
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Add<Real, Output = Self>
    + Sub<Real, Output = Self>
    + Mul<Real, Output = Self>
    + Div<Real, Output = Self>
{
    /// A passive constant.
    fn from_real(x: Real) -> Self;
    /// Plain value.
    fn value(&self) -> Real;
    /// Exponential.
    fn exp(self) -> Self;
    /// Natural logarithm.
    fn ln(self) -> Self;
    /// Square root.
    fn sqrt(self) -> Self;
    /// Integer power.
    fn powi(self, n: i32) -> Self;
    /// `max(self, floor)` for a constant floor.
    fn max_real(self, floor: Real) -> Self;
    /// Larger of two values.
    fn max(self, other: Self) -> Self;
    /// Smaller of two values.
    fn min(self, other: Self) -> Self;

    /// `max(self, 0)`.
    #[inline]
    fn positive_part(self) -> Self {
        self.max_real(0.0)
    }
}

impl Scalar for Real {
    #[inline]
    fn from_real(x: Real) -> Self {
        x
    }
    #[inline]
    fn value(&self) -> Real {
        *self
    }
    #[inline]
    fn exp(self) -> Self {
        f64::exp(self)
    }
    #[inline]
    fn ln(self) -> Self {
        f64::ln(self)
    }
    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
    #[inline]
    fn powi(self, n: i32) -> Self {
        f64::powi(self, n)
    }
    #[inline]
    fn max_real(self, floor: Real) -> Self {
        f64::max(self, floor)
    }
    #[inline]
    fn max(self, other: Self) -> Self {
        f64::max(self, other)
    }
    #[inline]
    fn min(self, other: Self) -> Self {
        f64::min(self, other)
    }
}

impl<'t> Scalar for Var<'t> {
    #[inline]
    fn from_real(x: Real) -> Self {
        Var::constant(x)
    }
    #[inline]
    fn value(&self) -> Real {
        Var::value(self)
    }
    fn exp(self) -> Self {
        Var::exp(self)
    }
    fn ln(self) -> Self {
        Var::ln(self)
    }
    fn sqrt(self) -> Self {
        Var::sqrt(self)
    }
    fn powi(self, n: i32) -> Self {
        Var::powi(self, n)
    }
    fn max_real(self, floor: Real) -> Self {
        Var::max_real(self, floor)
    }
    fn max(self, other: Self) -> Self {
        Var::max(self, other)
    }
    fn min(self, other: Self) -> Self {
        Var::min(self, other)
    }
}

/// Sum of a sequence; zero when empty.
pub fn sum<S: Scalar>(values: impl IntoIterator<Item = S>) -> S {
    values
        .into_iter()
        .fold(S::from_real(0.0), |acc, x| acc + x)
}

/// Arithmetic mean of a slice; zero when empty.
pub fn mean<S: Scalar>(values: &[S]) -> S {
    if values.is_empty() {
        return S::from_real(0.0);
    }
    sum(values.iter().copied()) / values.len() as Real
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tape;
    use approx::assert_relative_eq;

    fn black_scholes_call<S: Scalar>(spot: S, vol: S, rate: S, expiry: S, strike: Real) -> S {
        let sqrt_t = expiry.sqrt();
        let sd = vol * sqrt_t;
        let d1 = ((spot / strike).ln() + (rate + vol * vol * 0.5) * expiry) / sd;
        let d2 = d1 - sd;
        // logistic stand-in for Φ keeps the example self-contained
        let phi = |x: S| S::from_real(1.0) / ((-(x * 1.702)).exp() + 1.0);
        spot * phi(d1) - (-(rate * expiry)).exp() * strike * phi(d2)
    }

    #[test]
    fn generic_code_agrees_across_scalar_types() {
        let plain = black_scholes_call(100.0, 0.2, 0.03, 1.5, 95.0);
        let tape = Tape::new();
        let active = black_scholes_call(
            tape.input(100.0),
            tape.input(0.2),
            tape.input(0.03),
            tape.input(1.5),
            95.0,
        );
        assert_relative_eq!(plain, active.value(), epsilon = 1e-12);
    }

    #[test]
    fn reverse_gradient_matches_central_differences() {
        let (s, v, r, t) = (100.0, 0.2, 0.03, 1.5);
        let tape = Tape::new();
        let xs = [tape.input(s), tape.input(v), tape.input(r), tape.input(t)];
        let price = black_scholes_call(xs[0], xs[1], xs[2], xs[3], 95.0);
        let g = tape.gradient(&price);

        let h = 1e-6;
        let base = [s, v, r, t];
        for (i, x) in xs.iter().enumerate() {
            let mut up = base;
            let mut dn = base;
            up[i] += h;
            dn[i] -= h;
            let fd = (black_scholes_call(up[0], up[1], up[2], up[3], 95.0)
                - black_scholes_call(dn[0], dn[1], dn[2], dn[3], 95.0))
                / (2.0 * h);
            assert_relative_eq!(g.wrt(x).unwrap(), fd, epsilon = 1e-6, max_relative = 1e-6);
        }
    }

    #[test]
    fn mean_of_empty_is_zero() {
        let empty: [Real; 0] = [];
        assert_eq!(mean(&empty), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), 3.0);
    }

    proptest::proptest! {
        #[test]
        fn positive_part_is_non_negative(x in -1e6f64..1e6) {
            proptest::prop_assert!(Scalar::positive_part(x) >= 0.0);
            let tape = Tape::new();
            proptest::prop_assert!(tape.input(x).positive_part().value() >= 0.0);
        }
    }
}
