use spla_core::{SparseMatrix, SparseVector};

use crate::error::{ensure_square, LinalgError};
use crate::qr::{qr, QrDecomposition};

/// Structure to define the QR algorithm parameters.
#[derive(Debug, Clone)]
pub struct QrAlgorithmCriteria {
    /// Maximum number of QR iterations to perform.
    pub max_iterations: usize,
    /// Convergence tolerance on the sum of absolute off-diagonal entries.
    ///
    /// Also used as the smallest eigenvalue magnitude accepted by [`invert_symmetric`].
    pub tolerance: f64,
}

impl Default for QrAlgorithmCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-10,
        }
    }
}

/// Result of the QR algorithm, `A = U * T * U^T` for symmetric `A`.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Diagonal matrix of eigenvalues, keyed like the input.
    pub t: SparseMatrix,
    /// Matrix whose columns are the eigenvectors, in the order of `t`'s diagonal.
    pub u: SparseMatrix,
    /// The number of iterations performed.
    pub num_iterations: usize,
    /// Sum of the absolute off-diagonal entries of the last iterate.
    pub off_diagonal: f64,
}

impl EigenDecomposition {
    /// The eigenvalues, read from the diagonal of `t`.
    pub fn eigenvalues(&self) -> Vec<f64> {
        self.t.diagonal()
    }
}

// entries are off the diagonal when their row and column positions differ
fn off_diagonal_sum(m: &SparseMatrix) -> f64 {
    m.non_empty_rows()
        .flat_map(|(r, row)| {
            let row_pos = m.row_key_set().position(r);
            row.iter()
                .filter(move |&(c, _)| m.col_key_set().position(c) != row_pos)
                .map(|(_, value)| value.abs())
        })
        .sum()
}

/// Eigendecomposition of a square matrix with the unshifted QR algorithm.
///
/// Starting from `A_0 = A` and `U_0 = I`, every iteration factorizes
/// `A_{k-1} = Q_k R_k` and sets `A_k = R_k Q_k`, `U_k = U_{k-1} Q_k`. The loop
/// stops once the off-diagonal mass of `A_k` is at most `criteria.tolerance`
/// or after `criteria.max_iterations` iterations.
///
/// The result satisfies `A = U T U^T` with orthogonal `U` for symmetric input;
/// symmetry is not checked. Eigenvalues come out in convergence order.
///
/// # Arguments
///
/// * `a` - The square matrix to decompose.
/// * `criteria` - Convergence criteria.
///
/// # Errors
///
/// Returns [`LinalgError::NotSquare`] if `a` is not square.
pub fn eigen_decompose(
    a: &SparseMatrix,
    criteria: &QrAlgorithmCriteria,
) -> Result<EigenDecomposition, LinalgError> {
    ensure_square(a)?;

    let mut a_k = a.clone();
    let mut u_k = SparseMatrix::identity_with_keys(a.row_keys());
    let mut off_diagonal = off_diagonal_sum(&a_k);
    let mut num_iterations = 0;

    for k in 0..criteria.max_iterations {
        let QrDecomposition { q, r } = qr(&a_k)?;
        a_k = r.multiply(&q)?;
        u_k = u_k.multiply(&q)?;

        num_iterations = k + 1;
        off_diagonal = off_diagonal_sum(&a_k);
        log::debug!("Iteration: {k}, off-diagonal sum: {off_diagonal}");

        if off_diagonal <= criteria.tolerance {
            log::debug!("QR algorithm converged after {num_iterations} iterations");
            break;
        }
    }

    let mut t = SparseMatrix::from_key_sets(
        a.row_key_set().clone(),
        a.col_key_set().clone(),
        a.default_value(),
    );
    for (i, value) in a_k.diagonal().into_iter().enumerate() {
        t.set(a.row_keys()[i], a.col_keys()[i], value)?;
    }

    Ok(EigenDecomposition {
        t,
        u: u_k,
        num_iterations,
        off_diagonal,
    })
}

/// The eigenvalues of `a` and the matching eigenvectors.
pub fn find_eigen_vectors(
    a: &SparseMatrix,
    criteria: &QrAlgorithmCriteria,
) -> Result<(Vec<f64>, Vec<SparseVector>), LinalgError> {
    let ed = eigen_decompose(a, criteria)?;
    Ok((ed.eigenvalues(), ed.u.columns()))
}

fn reassemble(
    ed: &EigenDecomposition,
    f: impl Fn(usize, f64) -> Result<f64, LinalgError>,
) -> Result<SparseMatrix, LinalgError> {
    let eigenvalues = ed.eigenvalues();
    let n = eigenvalues.len();
    let mut diagonal = SparseMatrix::with_default(n, n, ed.t.default_value());
    for (i, &lambda) in eigenvalues.iter().enumerate() {
        diagonal.set(i, i, f(i, lambda)?)?;
    }
    Ok(ed.u.multiply(&diagonal)?.multiply(&ed.u.transpose())?)
}

/// Inverts a symmetric matrix as `U * diag(1 / lambda_i) * U^T`.
///
/// # Errors
///
/// Returns [`LinalgError::NotSquare`] or [`LinalgError::NotSymmetric`] for an
/// unsuitable input, and [`LinalgError::NotInvertible`] if an eigenvalue has
/// magnitude below `criteria.tolerance`.
pub fn invert_symmetric(
    a: &SparseMatrix,
    criteria: &QrAlgorithmCriteria,
) -> Result<SparseMatrix, LinalgError> {
    ensure_square(a)?;
    if !a.is_symmetric() {
        return Err(LinalgError::NotSymmetric);
    }

    let ed = eigen_decompose(a, criteria)?;
    reassemble(&ed, |index, eigenvalue| {
        if eigenvalue.abs() < criteria.tolerance {
            return Err(LinalgError::NotInvertible { index, eigenvalue });
        }
        Ok(1.0 / eigenvalue)
    })
}

/// Raises a symmetric matrix to the real power `p` as `U * diag(lambda_i^p) * U^T`.
///
/// Negative eigenvalues with a fractional `p` produce NaN entries.
///
/// # Errors
///
/// Returns [`LinalgError::NotSquare`] if `a` is not square.
pub fn power(
    a: &SparseMatrix,
    p: f64,
    criteria: &QrAlgorithmCriteria,
) -> Result<SparseMatrix, LinalgError> {
    let ed = eigen_decompose(a, criteria)?;
    reassemble(&ed, |_, eigenvalue| Ok(eigenvalue.powf(p)))
}
