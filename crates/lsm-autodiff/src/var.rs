//! Active variables.

use crate::tape::{Op, Tape};
use lsm_core::Real;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Clone, Copy)]
pub(crate) struct NodeRef<'t> {
    pub(crate) tape: &'t Tape,
    pub(crate) index: usize,
}

/// A scalar that may be recorded on a [`Tape`].
///
/// A `Var` created with [`Var::constant`] is passive: operations between
/// passive values are evaluated eagerly and never touch a tape. Any
/// operation involving an active operand records exactly one node.
#[derive(Clone, Copy)]
pub struct Var<'t> {
    value: Real,
    node: Option<NodeRef<'t>>,
}

impl fmt::Debug for Var<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Var")
            .field("value", &self.value)
            .field("node", &self.node_index())
            .finish()
    }
}

impl<'t> Var<'t> {
    pub(crate) fn active(value: Real, node: NodeRef<'t>) -> Self {
        Self {
            value,
            node: Some(node),
        }
    }

    /// A passive constant.
    pub fn constant(value: Real) -> Self {
        Self { value, node: None }
    }

    /// Current value.
    #[inline]
    pub fn value(&self) -> Real {
        self.value
    }

    /// Whether this variable is recorded on a tape.
    pub fn is_active(&self) -> bool {
        self.node.is_some()
    }

    pub(crate) fn node_index(&self) -> Option<usize> {
        self.node.map(|n| n.index)
    }

    fn unary(self, value: Real, darg: Real) -> Self {
        match self.node {
            Some(n) => {
                let index = n.tape.push(Op::Unary { arg: n.index, darg });
                Self::active(value, NodeRef { tape: n.tape, index })
            }
            None => Self::constant(value),
        }
    }

    fn binary(lhs: Self, rhs: Self, value: Real, dlhs: Real, drhs: Real) -> Self {
        match (lhs.node, rhs.node) {
            (Some(a), Some(b)) => {
                debug_assert!(std::ptr::eq(a.tape, b.tape), "operands on different tapes");
                let index = a.tape.push(Op::Binary {
                    lhs: a.index,
                    rhs: b.index,
                    dlhs,
                    drhs,
                });
                Self::active(value, NodeRef { tape: a.tape, index })
            }
            (Some(_), None) => lhs.unary(value, dlhs),
            (None, Some(_)) => rhs.unary(value, drhs),
            (None, None) => Self::constant(value),
        }
    }

    /// Exponential.
    pub fn exp(self) -> Self {
        let v = self.value.exp();
        self.unary(v, v)
    }

    /// Natural logarithm.
    pub fn ln(self) -> Self {
        self.unary(self.value.ln(), 1.0 / self.value)
    }

    /// Square root. The derivative at zero is taken as zero so that
    /// absorbed paths do not poison the sweep with infinities.
    pub fn sqrt(self) -> Self {
        let v = self.value.sqrt();
        let d = if v > 0.0 { 0.5 / v } else { 0.0 };
        self.unary(v, d)
    }

    /// Integer power.
    pub fn powi(self, n: i32) -> Self {
        let d = if n == 0 {
            0.0
        } else {
            n as Real * self.value.powi(n - 1)
        };
        self.unary(self.value.powi(n), d)
    }

    /// `max(self, floor)` with the pathwise convention: the derivative is
    /// that of the selected branch, and ties select `floor`.
    pub fn max_real(self, floor: Real) -> Self {
        if self.value > floor {
            self.unary(self.value, 1.0)
        } else {
            self.unary(floor, 0.0)
        }
    }

    /// Larger of two variables; ties select `self`.
    pub fn max(self, other: Self) -> Self {
        if other.value > self.value {
            other
        } else {
            self
        }
    }

    /// Smaller of two variables; ties select `self`.
    pub fn min(self, other: Self) -> Self {
        if other.value < self.value {
            other
        } else {
            self
        }
    }
}

impl From<Real> for Var<'_> {
    fn from(value: Real) -> Self {
        Self::constant(value)
    }
}

// ── Operators ────────────────────────────────────────────────────────────────

impl<'t> Add for Var<'t> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::binary(self, rhs, self.value + rhs.value, 1.0, 1.0)
    }
}

impl<'t> Sub for Var<'t> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::binary(self, rhs, self.value - rhs.value, 1.0, -1.0)
    }
}

impl<'t> Mul for Var<'t> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::binary(self, rhs, self.value * rhs.value, rhs.value, self.value)
    }
}

impl<'t> Div for Var<'t> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        let inv = 1.0 / rhs.value;
        let v = self.value * inv;
        Self::binary(self, rhs, v, inv, -v * inv)
    }
}

impl<'t> Neg for Var<'t> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self.unary(-self.value, -1.0)
    }
}

impl<'t> Add<Real> for Var<'t> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Real) -> Self {
        self.unary(self.value + rhs, 1.0)
    }
}

impl<'t> Sub<Real> for Var<'t> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Real) -> Self {
        self.unary(self.value - rhs, 1.0)
    }
}

impl<'t> Mul<Real> for Var<'t> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Real) -> Self {
        self.unary(self.value * rhs, rhs)
    }
}

impl<'t> Div<Real> for Var<'t> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Real) -> Self {
        self.unary(self.value / rhs, 1.0 / rhs)
    }
}

impl<'t> Add<Var<'t>> for Real {
    type Output = Var<'t>;
    #[inline]
    fn add(self, rhs: Var<'t>) -> Var<'t> {
        rhs + self
    }
}

impl<'t> Sub<Var<'t>> for Real {
    type Output = Var<'t>;
    #[inline]
    fn sub(self, rhs: Var<'t>) -> Var<'t> {
        rhs.unary(self - rhs.value, -1.0)
    }
}

impl<'t> Mul<Var<'t>> for Real {
    type Output = Var<'t>;
    #[inline]
    fn mul(self, rhs: Var<'t>) -> Var<'t> {
        rhs * self
    }
}

impl<'t> Div<Var<'t>> for Real {
    type Output = Var<'t>;
    #[inline]
    fn div(self, rhs: Var<'t>) -> Var<'t> {
        let v = self / rhs.value;
        rhs.unary(v, -v / rhs.value)
    }
}
