use spla_core::SparseMatrix;

use crate::error::{ensure_square, LinalgError};

/// Result of reducing a matrix to echelon form.
#[derive(Debug, Clone)]
pub struct EchelonForm {
    /// The row echelon form of the input.
    pub echelon: SparseMatrix,
    /// The accumulated row operations `M` with `M * A == echelon`, if requested.
    pub transform: Option<SparseMatrix>,
    /// The number of row exchanges performed while permuting rows into pivot order.
    pub row_exchanges: usize,
}

/// Reduces `a` to row echelon form by Gaussian elimination.
///
/// Columns are visited in column-key order. Among the rows not yet chosen as a
/// pivot that store an entry in the column, the row with the largest (signed)
/// value becomes the pivot, the first such row on ties. This is not partial
/// pivoting by magnitude. The column is then eliminated from the other
/// candidate rows. Columns without candidates are skipped, so a rank deficient
/// input ends with empty trailing rows.
///
/// # Example
///
/// ```
/// use spla_core::SparseMatrix;
/// use spla_linalg::elimination::echelon_form;
///
/// let a = SparseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
/// let ef = echelon_form(&a).unwrap();
/// assert_eq!(ef.echelon.get(0, 0).unwrap(), 3.0);
/// assert_eq!(ef.echelon.get(1, 0).unwrap(), 0.0);
/// assert_eq!(ef.row_exchanges, 1);
/// ```
pub fn echelon_form(a: &SparseMatrix) -> Result<EchelonForm, LinalgError> {
    let (echelon, row_exchanges) = reduce(a, None)?;
    Ok(EchelonForm {
        echelon,
        transform: None,
        row_exchanges,
    })
}

/// Like [`echelon_form`], also accumulating the row operations in `M`.
///
/// `M` starts as the identity over the row keys of `a` and undergoes the same
/// eliminations and exchanges, so `M * a == echelon` up to rounding.
pub fn echelon_form_with_transform(a: &SparseMatrix) -> Result<EchelonForm, LinalgError> {
    let (echelon, transform, row_exchanges) = reduce_tracked(a)?;
    Ok(EchelonForm {
        echelon,
        transform: Some(transform),
        row_exchanges,
    })
}

// (echelon, M, row exchanges)
pub(crate) fn reduce_tracked(
    a: &SparseMatrix,
) -> Result<(SparseMatrix, SparseMatrix, usize), LinalgError> {
    let mut m = SparseMatrix::identity_with_keys(a.row_keys());
    let (echelon, row_exchanges) = reduce(a, Some(&mut m))?;
    Ok((echelon, m, row_exchanges))
}

fn reduce(
    a: &SparseMatrix,
    mut m: Option<&mut SparseMatrix>,
) -> Result<(SparseMatrix, usize), LinalgError> {
    let mut b = a.clone();

    let old_rows = a.row_keys().to_vec();
    let mut remaining = old_rows.clone();
    let mut new_rows = Vec::with_capacity(old_rows.len());

    for &c in a.col_keys() {
        let candidates: Vec<usize> = remaining
            .iter()
            .copied()
            .filter(|&r| b.has_value(r, c))
            .collect();
        let Some((&first, rest)) = candidates.split_first() else {
            continue;
        };

        let mut pivot = first;
        let mut pivot_value = b.get(first, c)?;
        for &r in rest {
            let value = b.get(r, c)?;
            if value > pivot_value {
                pivot = r;
                pivot_value = value;
            }
        }
        log::trace!("column {c}: pivot row {pivot} ({pivot_value})");

        new_rows.push(pivot);
        remaining.retain(|&r| r != pivot);

        let pivot_row = b.row(pivot)?;
        let pivot_transform = match m.as_deref() {
            Some(m) => Some(m.row(pivot)?),
            None => None,
        };

        for &r in candidates.iter().filter(|&&r| r != pivot) {
            let multiplier = b.get(r, c)? / pivot_value;

            let mut reduced = b.row(r)?.subtract(&pivot_row.scale(multiplier))?;
            reduced.set(c, 0.0)?;
            b.set_row(r, reduced)?;

            if let (Some(m), Some(pivot_transform)) =
                (m.as_deref_mut(), pivot_transform.as_ref())
            {
                let reduced = m.row(r)?.subtract(&pivot_transform.scale(multiplier))?;
                m.set_row(r, reduced)?;
            }
        }
    }

    // rows that never became a pivot keep their relative order at the bottom
    new_rows.extend(remaining);

    let mut row_exchanges = 0;
    for i in 0..new_rows.len() {
        let new_row = new_rows[i];
        let old_row = old_rows[i];
        if new_row == old_row {
            continue;
        }

        b.swap_rows(new_row, old_row)?;
        if let Some(m) = m.as_deref_mut() {
            m.swap_rows(new_row, old_row)?;
        }
        // the row that lived at `old_row` now lives at `new_row`
        if let Some(j) = new_rows.iter().position(|&r| r == old_row) {
            new_rows.swap(i, j);
        }
        row_exchanges += 1;
    }

    Ok((b, row_exchanges))
}

/// The determinant of a square matrix, computed as the product of the echelon
/// diagonal times `(-1)^row_exchanges`.
///
/// # Errors
///
/// Returns [`LinalgError::NotSquare`] if `a` is not square.
pub fn determinant(a: &SparseMatrix) -> Result<f64, LinalgError> {
    ensure_square(a)?;
    let ef = echelon_form(a)?;
    let det: f64 = ef.echelon.diagonal().iter().product();
    Ok(if ef.row_exchanges % 2 == 0 { det } else { -det })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cofactor_determinant(m: &[[f64; 3]; 3]) -> f64 {
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    #[test]
    fn test_echelon_is_upper_triangular() -> Result<(), LinalgError> {
        let a = SparseMatrix::from_rows(&[[2.0, -3.0, 1.0], [2.0, 0.0, -1.0], [1.0, 4.0, 5.0]])?;
        let ef = echelon_form(&a)?;
        assert!(ef.transform.is_none());
        for r in 0..3 {
            for c in 0..r {
                assert!(!ef.echelon.has_value(r, c));
            }
        }
        Ok(())
    }

    #[test]
    fn test_transform_reproduces_echelon() -> Result<(), Box<dyn std::error::Error>> {
        let a = SparseMatrix::from_rows(&[
            [1.0, 2.0, 0.0, 3.0],
            [-2.0, 1.0, 4.0, 0.0],
            [0.0, 5.0, 1.0, 1.0],
        ])?;
        let ef = echelon_form_with_transform(&a)?;
        let m = ef.transform.ok_or("missing transform")?;
        assert_eq!(m.multiply(&a)?, ef.echelon);
        Ok(())
    }

    #[test]
    fn test_pivot_is_max_signed_value() -> Result<(), LinalgError> {
        // -10 has the largest magnitude but 1 is the largest value
        let a = SparseMatrix::from_rows(&[[-10.0, 1.0], [1.0, 1.0]])?;
        let ef = echelon_form(&a)?;
        assert_eq!(ef.echelon.get(0, 0)?, 1.0);
        assert_eq!(ef.row_exchanges, 1);
        Ok(())
    }

    #[test]
    fn test_rank_deficient_rows_trail() -> Result<(), LinalgError> {
        let a = SparseMatrix::from_rows(&[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0], [2.0, 4.0, 6.0]])?;
        let ef = echelon_form(&a)?;
        assert!(!ef.echelon.row(0)?.is_empty());
        assert!(ef.echelon.row(1)?.is_empty());
        assert!(ef.echelon.row(2)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_determinant_matches_cofactor_expansion() -> Result<(), LinalgError> {
        let fixtures = [
            [[2.0, -3.0, 1.0], [2.0, 0.0, -1.0], [1.0, 4.0, 5.0]],
            [[25.0, 15.0, -5.0], [15.0, 18.0, 0.0], [-5.0, 0.0, 11.0]],
            [[12.0, -51.0, 4.0], [6.0, 167.0, -68.0], [-4.0, 24.0, -41.0]],
            [[0.0, 1.0, 2.0], [1.0, 0.0, 3.0], [4.0, -3.0, 8.0]],
        ];
        for m in &fixtures {
            let a = SparseMatrix::from_rows(m)?;
            let expected = cofactor_determinant(m);
            assert_relative_eq!(determinant(&a)?, expected, max_relative = 1e-10);
        }
        Ok(())
    }

    #[test]
    fn test_determinant_two_by_two() -> Result<(), LinalgError> {
        let a = SparseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
        assert_relative_eq!(determinant(&a)?, -2.0, epsilon = 1e-12);

        let singular = SparseMatrix::from_rows(&[[1.0, 2.0], [2.0, 4.0]])?;
        assert_eq!(determinant(&singular)?, 0.0);

        assert_eq!(
            determinant(&SparseMatrix::new(2, 3)),
            Err(LinalgError::NotSquare { rows: 2, cols: 3 })
        );
        Ok(())
    }
}
