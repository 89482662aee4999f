use spla_core::SparseMatrix;

use crate::error::LinalgError;
use crate::orthogonalization::{normalize_with_norms, orthogonalize_with_coefficients};

/// Result of a QR decomposition `A = Q * R`.
#[derive(Debug, Clone)]
pub struct QrDecomposition {
    /// `m x n` matrix with orthonormal columns, rows keyed like `A`.
    pub q: SparseMatrix,
    /// `n x n` upper triangular factor.
    pub r: SparseMatrix,
}

/// QR decomposition through classical Gram-Schmidt on the columns of `a`.
///
/// The orthogonalized columns `v*_i` are normalized into the columns of `Q`.
/// `R` is assembled from the Gram-Schmidt coefficient columns with row `i`
/// scaled by `|v*_i|`, which turns the unit diagonal coefficients into the
/// proper factor since `v*_i = |v*_i| q_i`.
///
/// `R` is upper triangular and `Q` column orthonormal when `a` has full column
/// rank. A dependent column leaves an empty column in `Q` and a zero on the
/// diagonal of `R`.
///
/// # Example
///
/// ```
/// use spla_core::SparseMatrix;
/// use spla_linalg::qr::qr;
///
/// let a = SparseMatrix::from_rows(&[[3.0, 1.0], [4.0, 2.0]]).unwrap();
/// let qr = qr(&a).unwrap();
/// assert_eq!(qr.q.multiply(&qr.r).unwrap(), a);
/// assert!(!qr.r.has_value(1, 0));
/// ```
///
/// # Errors
///
/// Returns [`LinalgError::EmptyInput`] if `a` has no columns.
pub fn qr(a: &SparseMatrix) -> Result<QrDecomposition, LinalgError> {
    let columns = a.columns();
    if columns.is_empty() {
        return Err(LinalgError::EmptyInput("matrix has no columns"));
    }

    let (vstar, r_columns) = orthogonalize_with_coefficients(&columns)?;
    let (q_columns, norms) = normalize_with_norms(&vstar);

    let q = SparseMatrix::from_columns(&q_columns, a.default_value())?;
    let r = SparseMatrix::from_columns(&r_columns, a.default_value())?.scale_rows_by(&norms)?;

    Ok(QrDecomposition { q, r })
}
