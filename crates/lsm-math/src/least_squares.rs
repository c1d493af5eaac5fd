//! Linear least squares via singular value decomposition.
//!
//! Solves `min ||A β − y||₂` for `β`. Singular values below
//! `max(n, m) · ε · σ_max` are discarded, so a rank-deficient design matrix
//! yields the minimum-norm solution instead of failing. The number of
//! retained singular values is reported as the numerical rank, letting
//! callers flag degenerate fits without aborting.

use crate::Matrix;
use lsm_core::{require, Error, Real, Result, Size};
use nalgebra::DVector;

/// Iteration cap handed to the SVD; zero would mean "until convergence".
const SVD_MAX_ITERATIONS: usize = 10_000;

/// Result of a linear least-squares fit.
#[derive(Debug, Clone)]
pub struct LeastSquaresFit {
    coefficients: Vec<Real>,
    rank: Size,
    residual_sum_of_squares: Real,
}

impl LeastSquaresFit {
    /// Fit the model given a pre-built *n × m* design matrix.
    ///
    /// Fewer observations than columns is allowed: the system is then
    /// under-determined and the minimum-norm solution is returned with
    /// `rank < m`.
    pub fn solve(a: &Matrix, y: &[Real]) -> Result<Self> {
        let n = a.nrows();
        let m = a.ncols();
        require!(
            y.len() == n,
            "y length ({}) must equal number of rows of A ({n})",
            y.len()
        );
        require!(n > 0 && m > 0, "design matrix must not be empty");

        let svd = a
            .clone()
            .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
            .ok_or_else(|| Error::Runtime("SVD did not converge".into()))?;
        let (u, v_t) = match (svd.u.as_ref(), svd.v_t.as_ref()) {
            (Some(u), Some(v_t)) => (u, v_t),
            _ => return Err(Error::Runtime("SVD factors were not computed".into())),
        };
        let sv = &svd.singular_values;

        let sv_max = sv.iter().copied().fold(0.0_f64, f64::max);
        let threshold = n.max(m) as Real * f64::EPSILON * sv_max;

        // β = V · diag(1/sᵢ) · Uᵀ · y over the retained singular values
        let y_vec = DVector::from_column_slice(y);
        let ut_y = u.transpose() * &y_vec;

        let mut coefficients = vec![0.0; m];
        let mut rank = 0;
        for (k, &s) in sv.iter().enumerate() {
            if s > threshold {
                rank += 1;
                let ratio = ut_y[k] / s;
                for (j, c) in coefficients.iter_mut().enumerate() {
                    *c += ratio * v_t[(k, j)];
                }
            }
        }

        let beta = DVector::from_column_slice(&coefficients);
        let residuals = &y_vec - a * &beta;
        let residual_sum_of_squares = residuals.norm_squared();

        Ok(Self {
            coefficients,
            rank,
            residual_sum_of_squares,
        })
    }

    /// Fitted coefficients β (one per design-matrix column).
    pub fn coefficients(&self) -> &[Real] {
        &self.coefficients
    }

    /// Numerical rank of the design matrix.
    pub fn rank(&self) -> Size {
        self.rank
    }

    /// Whether the design matrix had fewer independent columns than columns.
    pub fn is_rank_deficient(&self) -> bool {
        self.rank < self.coefficients.len()
    }

    /// Sum of squared residuals ‖y − Aβ‖².
    pub fn residual_sum_of_squares(&self) -> Real {
        self.residual_sum_of_squares
    }

    /// Evaluate the fitted linear form on one row of basis values.
    pub fn evaluate(&self, row: &[Real]) -> Real {
        self.coefficients
            .iter()
            .zip(row)
            .map(|(c, x)| c * x)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn design(x: &[Real], degree: usize) -> Matrix {
        Matrix::from_fn(x.len(), degree + 1, |i, j| x[i].powi(j as i32))
    }

    #[test]
    fn linear_fit() {
        // y = 2 + 3x
        let x: Vec<Real> = (0..20).map(|i| i as Real).collect();
        let y: Vec<Real> = x.iter().map(|&xi| 2.0 + 3.0 * xi).collect();

        let fit = LeastSquaresFit::solve(&design(&x, 1), &y).unwrap();
        let c = fit.coefficients();
        assert_abs_diff_eq!(c[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(c[1], 3.0, epsilon = 1e-10);
        assert_eq!(fit.rank(), 2);
        assert!(fit.residual_sum_of_squares() < 1e-16);
    }

    #[test]
    fn quadratic_fit() {
        // y = 1 - 2x + 0.5x²
        let x: Vec<Real> = (0..30).map(|i| -5.0 + i as Real * 0.5).collect();
        let y: Vec<Real> = x.iter().map(|&xi| 1.0 - 2.0 * xi + 0.5 * xi * xi).collect();

        let fit = LeastSquaresFit::solve(&design(&x, 2), &y).unwrap();
        let c = fit.coefficients();
        assert_abs_diff_eq!(c[0], 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(c[1], -2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(c[2], 0.5, epsilon = 1e-8);
        assert!(!fit.is_rank_deficient());
    }

    #[test]
    fn duplicated_column_gives_minimum_norm_solution() {
        // Columns 1 and 2 are identical: y = 4x splits evenly between them.
        let x: Vec<Real> = (1..=10).map(|i| i as Real).collect();
        let a = Matrix::from_fn(x.len(), 3, |i, j| if j == 0 { 1.0 } else { x[i] });
        let y: Vec<Real> = x.iter().map(|&xi| 4.0 * xi).collect();

        let fit = LeastSquaresFit::solve(&a, &y).unwrap();
        assert!(fit.is_rank_deficient());
        assert_eq!(fit.rank(), 2);
        let c = fit.coefficients();
        assert_abs_diff_eq!(c[0], 0.0, epsilon = 1e-8);
        assert_abs_diff_eq!(c[1], 2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(c[2], 2.0, epsilon = 1e-8);
    }

    #[test]
    fn under_determined_system_is_tolerated() {
        let a = Matrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        let fit = LeastSquaresFit::solve(&a, &[14.0]).unwrap();
        assert_eq!(fit.rank(), 1);
        assert_abs_diff_eq!(fit.evaluate(&[1.0, 2.0, 3.0]), 14.0, epsilon = 1e-10);
        // minimum-norm solution is parallel to the row: β = row · 1
        assert_abs_diff_eq!(fit.coefficients()[2], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let a = Matrix::from_row_slice(2, 1, &[1.0, 1.0]);
        assert!(matches!(
            LeastSquaresFit::solve(&a, &[1.0]),
            Err(Error::Precondition(_))
        ));
    }

    proptest::proptest! {
        #[test]
        fn reproduces_exact_quadratics(
            c0 in -5.0f64..5.0,
            c1 in -5.0f64..5.0,
            c2 in -5.0f64..5.0,
        ) {
            let x: Vec<Real> = (0..25).map(|i| 0.5 + i as Real * 0.1).collect();
            let y: Vec<Real> = x.iter().map(|&v| c0 + c1 * v + c2 * v * v).collect();
            let fit = LeastSquaresFit::solve(&design(&x, 2), &y).unwrap();
            for (xi, yi) in x.iter().zip(&y) {
                let fitted = fit.evaluate(&[1.0, *xi, xi * xi]);
                proptest::prop_assert!((fitted - yi).abs() < 1e-7);
            }
        }
    }
}
