mod cholesky;
mod qr;
mod svd;

pub use cholesky::CholeskySolver;
pub use qr::QrSolver;
pub use svd::SvdSolver;

use spla_core::{SparseMatrix, SparseVector};

use crate::error::{ensure_square, LinalgError};
use crate::qr_algorithm::QrAlgorithmCriteria;

/// Trait for solvers of linear systems `A * x = b`.
///
/// Every solver assumes the matrix it factorizes is invertible or of full rank
/// for the method used. Rank deficiency is not detected; the zero diagonals it
/// causes during substitution leave the affected unknowns at zero.
pub trait LinearSolver {
    /// Solves the square system `A * x = b`.
    fn solve(&self, a: &SparseMatrix, b: &SparseVector) -> Result<SparseVector, LinalgError>;

    /// The least squares solution of an overdetermined `m x n` system (`m >= n`),
    /// i.e. the `x` minimizing `|A * x - b|`.
    fn solve_least_squares(
        &self,
        a: &SparseMatrix,
        b: &SparseVector,
    ) -> Result<SparseVector, LinalgError>;

    /// The least norm solution of an underdetermined `m x n` system (`m < n`),
    /// `x = A^T (A A^T)^-1 b`.
    fn solve_least_norm(
        &self,
        a: &SparseMatrix,
        b: &SparseVector,
    ) -> Result<SparseVector, LinalgError> {
        let at = a.transpose();
        let z = self.solve(&a.multiply(&at)?, b)?;
        Ok(at.multiply_vector(&z)?)
    }

    /// The inverse of a square matrix, solved one standard basis vector at a time.
    ///
    /// The inverse is keyed by the column keys of `a` on its rows and by the row
    /// keys of `a` on its columns.
    fn invert(&self, a: &SparseMatrix) -> Result<SparseMatrix, LinalgError> {
        ensure_square(a)?;
        let mut columns = Vec::with_capacity(a.col_count());
        for &r in a.row_keys() {
            let mut e = SparseVector::from_key_set(a.row_key_set().clone(), a.default_value());
            e.set(r, 1.0)?;
            columns.push(self.solve(a, &e)?);
        }
        if columns.is_empty() {
            return Err(LinalgError::EmptyInput("matrix has no rows"));
        }
        let inverse = SparseMatrix::from_columns(&columns, a.default_value())?;
        Ok(inverse.rekey(a.col_key_set(), a.row_key_set())?)
    }
}

/// Enumeration of the available linear solvers.
#[derive(Debug, Clone)]
pub enum SolverMethod {
    /// Cholesky factorization with forward and backward substitution.
    Cholesky,
    /// Gram-Schmidt QR with backward substitution.
    Qr,
    /// SVD pseudo-inverse with the given eigen iteration criteria.
    Svd(QrAlgorithmCriteria),
}

impl SolverMethod {
    /// The solver implementing this method.
    pub fn solver(&self) -> Box<dyn LinearSolver> {
        match self {
            SolverMethod::Cholesky => Box::new(CholeskySolver),
            SolverMethod::Qr => Box::new(QrSolver),
            SolverMethod::Svd(criteria) => Box::new(SvdSolver::new(criteria.clone())),
        }
    }
}

impl std::str::FromStr for SolverMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cholesky" => Ok(SolverMethod::Cholesky),
            "qr" => Ok(SolverMethod::Qr),
            "svd" => Ok(SolverMethod::Svd(QrAlgorithmCriteria::default())),
            other => Err(format!(
                "unknown solver method '{other}', expected one of: cholesky, qr, svd"
            )),
        }
    }
}

/// Solves `A * x = b` with the chosen method.
pub fn solve_linear_system(
    a: &SparseMatrix,
    b: &SparseVector,
    method: &SolverMethod,
) -> Result<SparseVector, LinalgError> {
    method.solver().solve(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert!(matches!("cholesky".parse::<SolverMethod>(), Ok(SolverMethod::Cholesky)));
        assert!(matches!("QR".parse::<SolverMethod>(), Ok(SolverMethod::Qr)));
        assert!(matches!("svd".parse::<SolverMethod>(), Ok(SolverMethod::Svd(_))));
        assert!("lu".parse::<SolverMethod>().is_err());
    }

    #[test]
    fn test_dispatch() -> Result<(), LinalgError> {
        let a = SparseMatrix::from_rows(&[[4.0, 1.0], [1.0, 3.0]])?;
        let x = SparseVector::from_slice(&[1.0, -1.0]);
        let b = a.multiply_vector(&x)?;
        for method in [
            SolverMethod::Cholesky,
            SolverMethod::Qr,
            SolverMethod::Svd(QrAlgorithmCriteria::default()),
        ] {
            assert_eq!(solve_linear_system(&a, &b, &method)?, x);
        }
        Ok(())
    }
}
