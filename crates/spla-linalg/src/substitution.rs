use spla_core::{SparseError, SparseMatrix, SparseVector};

use crate::error::{ensure_square, LinalgError};

/// Solves `L * x = c` for a lower triangular `L`, top row first.
///
/// Rows are matched to the entries of `c` and `x` by position. A row whose
/// diagonal is zero leaves its unknown at the default value of `c`; this is
/// logged at debug level and not reported as an error.
///
/// # Errors
///
/// Returns [`LinalgError::NotSquare`] if `l` is not square and
/// [`SparseError::DimensionMismatch`] if `c` does not have one entry per row.
pub fn forward_substitution(
    l: &SparseMatrix,
    c: &SparseVector,
) -> Result<SparseVector, LinalgError> {
    substitute(l, c, 0..l.row_count())
}

/// Solves `U * x = c` for an upper triangular `U`, bottom row first.
///
/// Zero diagonals are handled as in [`forward_substitution`].
///
/// # Errors
///
/// Returns [`LinalgError::NotSquare`] if `u` is not square and
/// [`SparseError::DimensionMismatch`] if `c` does not have one entry per row.
pub fn backward_substitution(
    u: &SparseMatrix,
    c: &SparseVector,
) -> Result<SparseVector, LinalgError> {
    substitute(u, c, (0..u.row_count()).rev())
}

fn substitute(
    r: &SparseMatrix,
    c: &SparseVector,
    order: impl Iterator<Item = usize>,
) -> Result<SparseVector, LinalgError> {
    ensure_square(r)?;
    if c.dimension() != r.row_count() {
        return Err(SparseError::mismatch("substitution", r.row_count(), c.dimension()).into());
    }

    let mut x = SparseVector::from_key_set(r.col_key_set().clone(), c.default_value());
    for i in order {
        let (row_key, col_key, c_key) = (r.row_keys()[i], r.col_keys()[i], c.keys()[i]);
        let row = r.row(row_key)?;
        let diagonal = row.get(col_key)?;
        if diagonal == 0.0 {
            log::debug!("zero diagonal at row {row_key}, x[{col_key}] left at default");
            continue;
        }
        let value = (c.get(c_key)? - row.dot(&x)?) / diagonal;
        x.set(col_key, value)?;
    }
    Ok(x)
}
