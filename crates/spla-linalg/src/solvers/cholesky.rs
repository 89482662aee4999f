use spla_core::{SparseMatrix, SparseVector};

use super::LinearSolver;
use crate::cholesky::cholesky;
use crate::error::LinalgError;
use crate::substitution::{backward_substitution, forward_substitution};

/// Solver for symmetric positive definite systems.
///
/// Factorizes `A = L * L^T`, then solves `L * y = b` by forward and
/// `L^T * x = y` by backward substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct CholeskySolver;

impl CholeskySolver {
    fn solve_factorized(a: &SparseMatrix, b: &SparseVector) -> Result<SparseVector, LinalgError> {
        let l = cholesky(a)?;
        let y = forward_substitution(&l, b)?;
        let x = backward_substitution(&l.transpose(), &y)?;
        // L is keyed by the row keys of `a` on both axes
        Ok(x.rekey(a.col_key_set())?)
    }
}

impl LinearSolver for CholeskySolver {
    fn solve(&self, a: &SparseMatrix, b: &SparseVector) -> Result<SparseVector, LinalgError> {
        log::debug!("cholesky solve: {}x{} system", a.row_count(), a.col_count());
        Self::solve_factorized(a, b)
    }

    /// Solves the normal equations `A^T A x = A^T b` through the Cholesky
    /// factor of `A^T A`.
    fn solve_least_squares(
        &self,
        a: &SparseMatrix,
        b: &SparseVector,
    ) -> Result<SparseVector, LinalgError> {
        log::debug!("cholesky least squares: {}x{} system", a.row_count(), a.col_count());
        let at = a.transpose();
        let c = at.multiply(a)?;
        let d = at.multiply_vector(b)?;
        Self::solve_factorized(&c, &d)
    }
}
