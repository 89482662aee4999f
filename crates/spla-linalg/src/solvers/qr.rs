use spla_core::{SparseMatrix, SparseVector};

use super::LinearSolver;
use crate::error::LinalgError;
use crate::qr::{qr, QrDecomposition};
use crate::substitution::backward_substitution;

/// Solver based on the Gram-Schmidt QR decomposition.
///
/// With `A = Q * R` the system becomes `R * x = Q^T * b`, solved by backward
/// substitution. For a tall `A` with independent columns this is already the
/// least squares solution.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrSolver;

impl LinearSolver for QrSolver {
    fn solve(&self, a: &SparseMatrix, b: &SparseVector) -> Result<SparseVector, LinalgError> {
        log::debug!("qr solve: {}x{} system", a.row_count(), a.col_count());
        let QrDecomposition { q, r } = qr(a)?;
        let c = q.transpose().multiply_vector(b)?;
        let x = backward_substitution(&r, &c)?;
        // R is keyed by column position
        Ok(x.rekey(a.col_key_set())?)
    }

    /// Factorizes `A^T A = Q * R` and solves `R * x = Q^T A^T b`.
    fn solve_least_squares(
        &self,
        a: &SparseMatrix,
        b: &SparseVector,
    ) -> Result<SparseVector, LinalgError> {
        log::debug!("qr least squares: {}x{} system", a.row_count(), a.col_count());
        let at = a.transpose();
        let QrDecomposition { q, r } = qr(&at.multiply(a)?)?;
        let d = q.transpose().multiply(&at)?.multiply_vector(b)?;
        let x = backward_substitution(&r, &d)?;
        Ok(x.rekey(a.col_key_set())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve() -> Result<(), LinalgError> {
        let a = SparseMatrix::from_rows(&[
            [12.0, -51.0, 4.0],
            [6.0, 167.0, -68.0],
            [-4.0, 24.0, -41.0],
        ])?;
        let x = SparseVector::from_slice(&[1.0, -0.5, 2.0]);
        let b = a.multiply_vector(&x)?;
        assert_eq!(QrSolver.solve(&a, &b)?, x);
        Ok(())
    }

    #[test]
    fn test_least_squares() -> Result<(), LinalgError> {
        let a = SparseMatrix::from_rows(&[[1.0, 0.0], [1.0, 1.0], [1.0, 2.0]])?;
        // residual of the best fit is orthogonal to the columns of A
        let b = SparseVector::from_slice(&[1.0, 2.0, 4.0]);
        let x = QrSolver.solve_least_squares(&a, &b)?;
        let residual = a.multiply_vector(&x)?.subtract(&b)?;
        assert!(a.transpose().multiply_vector(&residual)?.norm(2) < 1e-10);

        // the plain solve agrees on a tall system
        assert_eq!(QrSolver.solve(&a, &b)?, x);
        Ok(())
    }

    #[test]
    fn test_solution_keyed_by_columns() -> Result<(), LinalgError> {
        let mut a = SparseMatrix::from_keys(&[0, 1, 2], &[5, 9], 0.0);
        a.set(0, 5, 1.0)?;
        a.set(1, 5, 1.0)?;
        a.set(1, 9, 1.0)?;
        a.set(2, 5, 1.0)?;
        a.set(2, 9, 2.0)?;
        let b = SparseVector::from_slice(&[1.0, 3.0, 5.0]);

        let x = QrSolver.solve_least_squares(&a, &b)?;
        assert_eq!(x.keys(), &[5, 9]);
        assert_eq!(x, SparseVector::from_slice(&[1.0, 2.0]));

        let square = a.sub_matrix(&[0, 1], &[5, 9])?;
        let x = QrSolver.solve(&square, &SparseVector::from_slice(&[1.0, 3.0]))?;
        assert_eq!(x.keys(), square.col_keys());

        let inverse = QrSolver.invert(&square)?;
        assert_eq!(inverse.row_keys(), &[5, 9]);
        assert_eq!(inverse.col_keys(), &[0, 1]);
        assert_eq!(square.multiply(&inverse)?, SparseMatrix::identity(2));
        Ok(())
    }

    #[test]
    fn test_invert() -> Result<(), LinalgError> {
        let a = SparseMatrix::from_rows(&[[2.0, -1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 4.0]])?;
        let inverse = QrSolver.invert(&a)?;
        assert_eq!(a.multiply(&inverse)?, SparseMatrix::identity(3));
        assert_eq!(inverse.multiply(&a)?, SparseMatrix::identity(3));
        Ok(())
    }
}
