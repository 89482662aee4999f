use spla_core::{SparseMatrix, SparseVector};

use super::LinearSolver;
use crate::error::LinalgError;
use crate::qr_algorithm::QrAlgorithmCriteria;
use crate::svd::svd;

/// Solver based on the SVD pseudo-inverse `A^+ = V * Sigma^+ * U^T`.
///
/// `A^+ * b` is the least squares solution for tall systems and the least
/// norm solution for wide ones, so every entry point reduces to it.
#[derive(Debug, Clone, Default)]
pub struct SvdSolver {
    criteria: QrAlgorithmCriteria,
}

impl SvdSolver {
    /// Creates a solver whose eigen iteration uses `criteria`.
    pub fn new(criteria: QrAlgorithmCriteria) -> Self {
        Self { criteria }
    }

    /// The eigen iteration criteria.
    pub fn criteria(&self) -> &QrAlgorithmCriteria {
        &self.criteria
    }

    fn apply_pseudo_inverse(
        &self,
        a: &SparseMatrix,
        b: &SparseVector,
    ) -> Result<SparseVector, LinalgError> {
        Ok(self.invert(a)?.multiply_vector(b)?)
    }
}

impl LinearSolver for SvdSolver {
    fn solve(&self, a: &SparseMatrix, b: &SparseVector) -> Result<SparseVector, LinalgError> {
        self.apply_pseudo_inverse(a, b)
    }

    fn solve_least_squares(
        &self,
        a: &SparseMatrix,
        b: &SparseVector,
    ) -> Result<SparseVector, LinalgError> {
        self.apply_pseudo_inverse(a, b)
    }

    fn solve_least_norm(
        &self,
        a: &SparseMatrix,
        b: &SparseVector,
    ) -> Result<SparseVector, LinalgError> {
        self.apply_pseudo_inverse(a, b)
    }

    /// The pseudo-inverse of `a`; for a non-square `m x n` input the result is `n x m`.
    fn invert(&self, a: &SparseMatrix) -> Result<SparseMatrix, LinalgError> {
        log::debug!("svd pseudo-inverse: {}x{} matrix", a.row_count(), a.col_count());
        let inverse = svd(a, &self.criteria)?.pseudo_inverse()?;
        Ok(inverse.rekey(a.col_key_set(), a.row_key_set())?)
    }
}
