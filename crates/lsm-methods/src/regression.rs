//! Least-squares estimation of continuation values.
//!
//! At an exercise date the discounted future cash flows `Y` of the
//! in-the-money paths are regressed on basis functions of their current
//! states `X`. States are divided by a scale (the strike) first so that
//! polynomial columns stay comparable in magnitude.
//!
//! Nothing here aborts a pricing run: an empty in-the-money set skips the
//! regression, and a rank-deficient or failed solve is reported through
//! [`RegressionOutcome`] for the caller to log.

use crate::config::{BasisKind, RegressionBasis, MAX_BASIS_ORDER};
use lsm_core::{ensure, Real, Result, Size};
use lsm_math::{LeastSquaresFit, Matrix};
use std::fmt;

/// What happened at one regression date.
#[derive(Debug, Clone, PartialEq)]
pub enum RegressionOutcome {
    /// No path was in the money; nothing was fitted.
    Skipped,
    /// Full-rank fit.
    Fitted {
        /// Observations used.
        observations: Size,
    },
    /// Minimum-norm fit of a rank-deficient design matrix.
    RankDeficient {
        /// Observations used.
        observations: Size,
        /// Numerical rank.
        rank: Size,
        /// Basis columns.
        columns: Size,
    },
    /// The solver failed; no continuation estimate is available.
    Failed {
        /// Solver message.
        reason: String,
    },
}

impl RegressionOutcome {
    /// Whether a continuation estimate is available.
    pub fn has_estimate(&self) -> bool {
        matches!(self, Self::Fitted { .. } | Self::RankDeficient { .. })
    }
}

impl fmt::Display for RegressionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped (no in-the-money paths)"),
            Self::Fitted { observations } => write!(f, "fitted on {observations} paths"),
            Self::RankDeficient {
                observations,
                rank,
                columns,
            } => write!(
                f,
                "rank {rank} of {columns} columns on {observations} paths"
            ),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Builds design matrices for a fixed basis and fits them.
#[derive(Debug, Clone)]
pub struct ContinuationRegressor {
    kind: BasisKind,
    assets: Size,
    scale: Real,
    // exponent tuples of the cross-polynomial basis
    exponents: Vec<Vec<u32>>,
    order: Size,
}

impl ContinuationRegressor {
    /// Regressor for `assets` underlyings with states divided by `scale`.
    pub fn new(basis: RegressionBasis, assets: Size, scale: Real) -> Result<Self> {
        ensure!(assets >= 1, "regression needs at least one state variable");
        ensure!(
            (1..=MAX_BASIS_ORDER).contains(&basis.order),
            "basis order must be in [1, {MAX_BASIS_ORDER}], got {}",
            basis.order
        );
        ensure!(scale > 0.0, "state scale must be positive, got {scale}");
        let exponents = match basis.kind {
            BasisKind::CrossPolynomial => total_degree_exponents(assets, basis.order),
            BasisKind::Monomial | BasisKind::Hermite => Vec::new(),
        };
        Ok(Self {
            kind: basis.kind,
            assets,
            scale,
            exponents,
            order: basis.order,
        })
    }

    /// Number of basis functions (design-matrix columns).
    pub fn columns(&self) -> Size {
        match self.kind {
            BasisKind::CrossPolynomial => self.exponents.len(),
            BasisKind::Monomial | BasisKind::Hermite => 1 + self.assets * self.order,
        }
    }

    /// Basis values of one path's states, written into `row`.
    pub fn basis_row(&self, states: &[Real], row: &mut [Real]) {
        let x: Vec<Real> = states.iter().map(|s| s / self.scale).collect();
        row[0] = 1.0;
        match self.kind {
            BasisKind::Monomial => {
                for (a, &xa) in x.iter().enumerate() {
                    let mut power = 1.0;
                    for k in 0..self.order {
                        power *= xa;
                        row[1 + a * self.order + k] = power;
                    }
                }
            }
            BasisKind::Hermite => {
                for (a, &xa) in x.iter().enumerate() {
                    // H_{k+1} = 2x H_k − 2k H_{k−1}
                    let (mut h_prev, mut h) = (1.0, 2.0 * xa);
                    for k in 0..self.order {
                        row[1 + a * self.order + k] = h;
                        let next = 2.0 * xa * h - 2.0 * (k + 1) as Real * h_prev;
                        h_prev = h;
                        h = next;
                    }
                }
            }
            BasisKind::CrossPolynomial => {
                for (c, exps) in self.exponents.iter().enumerate() {
                    row[c] = exps
                        .iter()
                        .zip(&x)
                        .map(|(&e, &xa)| xa.powi(e as i32))
                        .product();
                }
            }
        }
    }

    /// Regress `y` on the basis of `states` (`assets` entries per
    /// observation, observation-major).
    pub fn fit(&self, states: &[Real], y: &[Real]) -> Regression<'_> {
        let n = y.len();
        if n == 0 {
            return Regression {
                regressor: self,
                fit: None,
                outcome: RegressionOutcome::Skipped,
            };
        }
        let m = self.columns();
        let mut design = Matrix::zeros(n, m);
        let mut row = vec![0.0; m];
        for i in 0..n {
            self.basis_row(&states[i * self.assets..(i + 1) * self.assets], &mut row);
            for (j, &v) in row.iter().enumerate() {
                design[(i, j)] = v;
            }
        }
        match LeastSquaresFit::solve(&design, y) {
            Ok(fit) => {
                let outcome = if fit.is_rank_deficient() {
                    RegressionOutcome::RankDeficient {
                        observations: n,
                        rank: fit.rank(),
                        columns: m,
                    }
                } else {
                    RegressionOutcome::Fitted { observations: n }
                };
                Regression {
                    regressor: self,
                    fit: Some(fit),
                    outcome,
                }
            }
            Err(e) => Regression {
                regressor: self,
                fit: None,
                outcome: RegressionOutcome::Failed {
                    reason: e.to_string(),
                },
            },
        }
    }
}

/// Result of one regression date.
#[derive(Debug)]
pub struct Regression<'r> {
    regressor: &'r ContinuationRegressor,
    fit: Option<LeastSquaresFit>,
    /// What happened.
    pub outcome: RegressionOutcome,
}

impl Regression<'_> {
    /// Fitted continuation value at `states`, if a fit is available.
    pub fn continuation(&self, states: &[Real]) -> Option<Real> {
        let fit = self.fit.as_ref()?;
        let mut row = vec![0.0; self.regressor.columns()];
        self.regressor.basis_row(states, &mut row);
        Some(fit.evaluate(&row))
    }

    /// Fitted coefficients, if any.
    pub fn coefficients(&self) -> Option<&[Real]> {
        self.fit.as_ref().map(LeastSquaresFit::coefficients)
    }
}

/// Exponent tuples of all monomials in `assets` variables with total
/// degree ≤ `order`, constant first.
fn total_degree_exponents(assets: Size, order: Size) -> Vec<Vec<u32>> {
    let mut out = Vec::new();
    for degree in 0..=order as u32 {
        let mut current = vec![0u32; assets];
        push_compositions(&mut out, &mut current, 0, degree);
    }
    out
}

fn push_compositions(out: &mut Vec<Vec<u32>>, current: &mut [u32], idx: usize, remaining: u32) {
    if idx == current.len() - 1 {
        current[idx] = remaining;
        out.push(current.to_vec());
        return;
    }
    for e in (0..=remaining).rev() {
        current[idx] = e;
        push_compositions(out, current, idx + 1, remaining - e);
    }
}
