//! Correlation of Brownian drivers across assets.

use lsm_core::{ensure, require, Real, Result, Size};
use lsm_math::{cholesky_decomposition, Matrix};

/// A validated correlation matrix and its lower Cholesky factor.
///
/// Independent standard normals `z` become correlated normals `L z`.
#[derive(Debug, Clone)]
pub struct Correlation {
    factor: Matrix,
}

impl Correlation {
    /// Independent drivers for `n` assets.
    pub fn identity(n: Size) -> Self {
        Self {
            factor: Matrix::identity(n, n),
        }
    }

    /// Two assets with correlation `rho` in `[-1, 1]`.
    ///
    /// The factor is written down directly, so perfectly correlated and
    /// anti-correlated pairs are accepted.
    pub fn pair(rho: Real) -> Result<Self> {
        ensure!(
            (-1.0..=1.0).contains(&rho),
            "correlation out of [-1, 1]: {rho}"
        );
        Ok(Self {
            factor: Matrix::from_row_slice(2, 2, &[1.0, 0.0, rho, (1.0 - rho * rho).sqrt()]),
        })
    }

    /// Validate `matrix` (unit diagonal, entries in `[-1, 1]`, positive
    /// definite) and factorise it. Singular matrices are rejected; use
    /// [`Correlation::pair`] for a degenerate pair.
    pub fn new(matrix: Matrix) -> Result<Self> {
        require!(matrix.nrows() == matrix.ncols(), "correlation matrix must be square");
        let n = matrix.nrows();
        for i in 0..n {
            ensure!(
                (matrix[(i, i)] - 1.0).abs() < 1e-12,
                "correlation matrix diagonal must be 1, got {} at {i}",
                matrix[(i, i)]
            );
            for j in 0..n {
                ensure!(
                    matrix[(i, j)].abs() <= 1.0,
                    "correlation out of [-1, 1]: {} at ({i}, {j})",
                    matrix[(i, j)]
                );
            }
        }
        let factor = cholesky_decomposition(&matrix)?;
        Ok(Self { factor })
    }

    /// Number of correlated drivers.
    pub fn dimension(&self) -> Size {
        self.factor.nrows()
    }

    /// Lower-triangular factor `L`.
    pub fn factor(&self) -> &Matrix {
        &self.factor
    }

    /// Write `L z` into `out`.
    pub fn correlate(&self, z: &[Real], out: &mut [Real]) {
        let n = self.dimension();
        for (i, o) in out.iter_mut().enumerate().take(n) {
            *o = (0..=i).map(|j| self.factor[(i, j)] * z[j]).sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_leaves_shocks_unchanged() {
        let c = Correlation::identity(3);
        let mut out = [0.0; 3];
        c.correlate(&[0.1, -0.2, 0.3], &mut out);
        assert_eq!(out, [0.1, -0.2, 0.3]);
    }

    #[test]
    fn pair_correlates_second_driver() {
        let rho = 0.6;
        let c = Correlation::pair(rho).unwrap();
        let mut out = [0.0; 2];
        c.correlate(&[1.0, 2.0], &mut out);
        assert_relative_eq!(out[0], 1.0, epsilon = 1e-15);
        assert_relative_eq!(out[1], rho + 2.0 * (1.0 - rho * rho).sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn perfectly_correlated_pairs() {
        let mut out = [0.0; 2];
        Correlation::pair(1.0).unwrap().correlate(&[0.7, -3.0], &mut out);
        assert_eq!(out, [0.7, 0.7]);
        Correlation::pair(-1.0).unwrap().correlate(&[0.7, -3.0], &mut out);
        assert_eq!(out, [0.7, -0.7]);
        let c = Correlation::pair(0.6).unwrap();
        let full = Correlation::new(Matrix::from_row_slice(2, 2, &[1.0, 0.6, 0.6, 1.0])).unwrap();
        assert_relative_eq!(c.factor()[(1, 1)], full.factor()[(1, 1)], epsilon = 1e-15);
    }

    #[test]
    fn invalid_matrices_rejected() {
        assert!(Correlation::pair(1.5).is_err());
        assert!(Correlation::pair(Real::NAN).is_err());
        assert!(Correlation::new(Matrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 1.0])).is_err());
        let inconsistent = Matrix::from_row_slice(
            3,
            3,
            &[1.0, 0.9, -0.9, 0.9, 1.0, 0.9, -0.9, 0.9, 1.0],
        );
        assert!(Correlation::new(inconsistent).is_err());
    }
}
