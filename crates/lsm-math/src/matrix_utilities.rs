//! Matrix factorisations over nalgebra.

use crate::Matrix;
use lsm_core::{ensure, require, Result};

/// Lower-triangular Cholesky factor `L` with `L · Lᵀ = m`.
///
/// Fails with `InvalidParameter` when `m` is not symmetric positive-definite,
/// which for a correlation matrix means the correlations are inconsistent.
pub fn cholesky_decomposition(m: &Matrix) -> Result<Matrix> {
    require!(m.nrows() == m.ncols(), "matrix must be square");
    ensure!(is_symmetric(m, 1e-12), "matrix must be symmetric");
    match m.clone().cholesky() {
        Some(chol) => Ok(chol.l()),
        None => Err(lsm_core::Error::InvalidParameter(
            "matrix is not positive-definite".into(),
        )),
    }
}

/// Whether `m` equals its transpose within `tolerance`.
pub fn is_symmetric(m: &Matrix, tolerance: f64) -> bool {
    m.nrows() == m.ncols()
        && (0..m.nrows()).all(|i| (0..i).all(|j| (m[(i, j)] - m[(j, i)]).abs() <= tolerance))
}
