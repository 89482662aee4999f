use spla_core::SparseError;

/// An error type for the factorizations and solvers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// A container operation failed.
    #[error(transparent)]
    Sparse(#[from] SparseError),

    /// The algorithm requires a square matrix.
    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// The number of rows.
        rows: usize,
        /// The number of columns.
        cols: usize,
    },

    /// The algorithm requires a symmetric matrix.
    #[error("Matrix is not symmetric")]
    NotSymmetric,

    /// An eigenvalue is too close to zero for the matrix to be inverted.
    #[error("Matrix is not invertible: eigenvalue {eigenvalue} at position {index}")]
    NotInvertible {
        /// The diagonal position of the eigenvalue.
        index: usize,
        /// The offending eigenvalue.
        eigenvalue: f64,
    },

    /// The input has nothing to operate on.
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),
}

pub(crate) fn ensure_square(a: &spla_core::SparseMatrix) -> Result<(), LinalgError> {
    if a.is_square() {
        Ok(())
    } else {
        Err(LinalgError::NotSquare {
            rows: a.row_count(),
            cols: a.col_count(),
        })
    }
}
