use spla_core::SparseMatrix;

use crate::error::LinalgError;
use crate::qr_algorithm::{eigen_decompose, EigenDecomposition, QrAlgorithmCriteria};

/// Result of a singular value decomposition `A = U * Sigma * V^T`.
#[derive(Debug, Clone)]
pub struct Svd {
    /// `m x m` left factor, computed as `A * V * Sigma^+`.
    pub u: SparseMatrix,
    /// `m x n` diagonal matrix of singular values.
    pub sigma: SparseMatrix,
    /// `n x n` transposed right factor.
    pub v_transpose: SparseMatrix,
}

impl Svd {
    /// The singular values, in the order produced by the eigen iteration.
    pub fn singular_values(&self) -> Vec<f64> {
        self.sigma.diagonal()
    }

    /// The right factor `V`.
    pub fn v(&self) -> SparseMatrix {
        self.v_transpose.transpose()
    }

    /// The Moore-Penrose pseudo-inverse `V * Sigma^+ * U^T`.
    ///
    /// `Sigma^+` reciprocates the non-zero singular values and is transposed,
    /// so the result is `n x m`.
    pub fn pseudo_inverse(&self) -> Result<SparseMatrix, LinalgError> {
        let sigma_plus = reciprocal_transpose(&self.sigma)?;
        Ok(self
            .v()
            .multiply(&sigma_plus)?
            .multiply(&self.u.transpose())?)
    }
}

// the n x m matrix with 1 / sigma_i on the diagonal for every non-zero sigma_i
fn reciprocal_transpose(sigma: &SparseMatrix) -> Result<SparseMatrix, LinalgError> {
    let mut sigma_plus =
        SparseMatrix::with_default(sigma.col_count(), sigma.row_count(), sigma.default_value());
    for (i, s) in sigma.diagonal().into_iter().enumerate() {
        if s != 0.0 {
            sigma_plus.set(i, i, 1.0 / s)?;
        }
    }
    Ok(sigma_plus)
}

/// Singular value decomposition through the eigendecomposition of `A^T A`.
///
/// `A^T A = V T V^T` is computed with the QR algorithm, the singular values
/// are `sqrt(T_ii)` for `i < min(m, n)` and `U = A V Sigma^+`. Eigenvalues that
/// rounding pushed below zero are clamped to zero. The singular values are
/// not sorted.
///
/// # Arguments
///
/// * `a` - The `m x n` matrix to decompose.
/// * `criteria` - Convergence criteria for the eigen iteration.
///
/// # Errors
///
/// Returns [`LinalgError::EmptyInput`] if `a` has no rows or no columns.
pub fn svd(a: &SparseMatrix, criteria: &QrAlgorithmCriteria) -> Result<Svd, LinalgError> {
    let (m, n) = (a.row_count(), a.col_count());
    if m == 0 || n == 0 {
        return Err(LinalgError::EmptyInput("matrix has no rows or columns"));
    }

    let c = a.transpose().multiply(a)?;
    let EigenDecomposition {
        t,
        u: v,
        num_iterations,
        ..
    } = eigen_decompose(&c, criteria)?;
    log::debug!("svd: eigen iteration on A^T A took {num_iterations} iterations");

    let eigenvalues = t.diagonal();
    let mut sigma = SparseMatrix::with_default(m, n, a.default_value());
    for (i, lambda) in eigenvalues.into_iter().take(m.min(n)).enumerate() {
        sigma.set(i, i, lambda.max(0.0).sqrt())?;
    }

    let u = a.multiply(&v)?.multiply(&reciprocal_transpose(&sigma)?)?;

    Ok(Svd {
        u,
        sigma,
        v_transpose: v.transpose(),
    })
}
