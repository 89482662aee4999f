use spla_core::SparseMatrix;

use crate::error::{ensure_square, LinalgError};

/// Computes the Cholesky factor of a symmetric positive definite matrix.
///
/// Returns a lower triangular matrix `L` such that `A = L * L^T`. Rows and
/// columns of `L` are both indexed by the row keys of `a`.
///
/// The factorization runs over a working copy of `a`: at step `i` the pivot
/// `l_ii = sqrt(a_ii)` is taken, the sub-column below it is divided by `l_ii`,
/// and the trailing block is updated with the outer product of the stored
/// sub-column entries only. A pivot without a stored entry is skipped and its
/// column of `L` stays empty.
///
/// Positive definiteness is not checked; a negative pivot yields NaN entries.
///
/// # Arguments
///
/// * `a` - The symmetric positive definite matrix to decompose.
///
/// # Errors
///
/// Returns [`LinalgError::NotSquare`] if `a` is not square.
pub fn cholesky(a: &SparseMatrix) -> Result<SparseMatrix, LinalgError> {
    ensure_square(a)?;

    let n = a.row_count();
    let rows = a.row_keys();
    let cols = a.col_keys();
    let keys = a.row_key_set().clone();

    let mut l = SparseMatrix::from_key_sets(keys.clone(), keys, a.default_value());
    let mut work = a.clone();

    for i in 0..n {
        let (ri, ci) = (rows[i], cols[i]);
        if !work.has_value(ri, ci) {
            log::debug!("cholesky: no stored pivot at position {i}, skipping");
            continue;
        }

        let l_ii = work.get(ri, ci)?.sqrt();
        l.set(ri, ri, l_ii)?;

        // L_21 = A_21 / l_ii, keeping the stored positions for the update below
        let mut column = Vec::new();
        for j in i + 1..n {
            let l_ji = work.get(rows[j], ci)? / l_ii;
            l.set(rows[j], ri, l_ji)?;
            if l.has_value(rows[j], ri) {
                column.push((j, l_ji));
            }
        }

        // A_22 -= L_21 * L_21^T
        for &(j, l_ji) in &column {
            for &(k, l_ki) in &column {
                let updated = work.get(rows[j], cols[k])? - l_ji * l_ki;
                work.set(rows[j], cols[k], updated)?;
            }
        }
    }

    Ok(l)
}
