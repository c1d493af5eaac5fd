//! The recording tape.
//!
//! Nodes only store their local partial derivatives; values live in the
//! [`Var`] handles. The tape is append-only while variables borrow it, and
//! [`Tape::clear`] takes `&mut self`, so the borrow checker guarantees no
//! live variable outlives a reset.

use crate::var::{NodeRef, Var};
use lsm_core::{Real, Size};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Op {
    Input,
    Unary {
        arg: usize,
        darg: Real,
    },
    Binary {
        lhs: usize,
        rhs: usize,
        dlhs: Real,
        drhs: Real,
    },
}

/// Reverse-mode differentiation context.
#[derive(Debug, Default)]
pub struct Tape {
    ops: RefCell<Vec<Op>>,
}

impl Tape {
    /// Create an empty tape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tape with room for `capacity` nodes.
    pub fn with_capacity(capacity: Size) -> Self {
        Self {
            ops: RefCell::new(Vec::with_capacity(capacity)),
        }
    }

    /// Mark `value` as a differentiable parameter.
    pub fn input(&self, value: Real) -> Var<'_> {
        let index = self.push(Op::Input);
        Var::active(value, NodeRef { tape: self, index })
    }

    /// Number of recorded nodes.
    pub fn len(&self) -> Size {
        self.ops.borrow().len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.ops.borrow().is_empty()
    }

    /// Discard every recorded node.
    pub fn clear(&mut self) {
        self.ops.get_mut().clear();
    }

    pub(crate) fn push(&self, op: Op) -> usize {
        let mut ops = self.ops.borrow_mut();
        ops.push(op);
        ops.len() - 1
    }

    /// Backward pass from `output`.
    ///
    /// Seeds the output adjoint with 1 and accumulates adjoints for every
    /// node in one reverse traversal. Nodes the output does not depend on
    /// are reported as unreached, which is distinct from a zero derivative
    /// (an out-of-the-money kink, say).
    pub fn gradient(&self, output: &Var<'_>) -> Gradients {
        let ops = self.ops.borrow();
        let n = ops.len();
        let mut adjoints = vec![0.0; n];
        let mut reached = vec![false; n];

        let Some(seed) = output.node_index().filter(|&i| i < n) else {
            return Gradients { adjoints, reached };
        };
        adjoints[seed] = 1.0;
        reached[seed] = true;

        for idx in (0..=seed).rev() {
            if !reached[idx] {
                continue;
            }
            let adj = adjoints[idx];
            match ops[idx] {
                Op::Input => {}
                Op::Unary { arg, darg } => {
                    adjoints[arg] += adj * darg;
                    reached[arg] = true;
                }
                Op::Binary {
                    lhs,
                    rhs,
                    dlhs,
                    drhs,
                } => {
                    adjoints[lhs] += adj * dlhs;
                    adjoints[rhs] += adj * drhs;
                    reached[lhs] = true;
                    reached[rhs] = true;
                }
            }
        }

        Gradients { adjoints, reached }
    }
}

/// Adjoints produced by one backward pass.
#[derive(Debug, Clone)]
pub struct Gradients {
    adjoints: Vec<Real>,
    reached: Vec<bool>,
}

impl Gradients {
    /// Derivative of the output with respect to `var`.
    ///
    /// Returns `None` when `var` is a passive constant or when the output
    /// does not depend on it.
    pub fn wrt(&self, var: &Var<'_>) -> Option<Real> {
        let idx = var.node_index()?;
        match self.reached.get(idx) {
            Some(true) => Some(self.adjoints[idx]),
            _ => None,
        }
    }

    /// Whether the output depends on `var` through the recorded graph.
    pub fn depends_on(&self, var: &Var<'_>) -> bool {
        self.wrt(var).is_some()
    }
}
