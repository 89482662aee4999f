use spla_core::{SparseError, SparseMatrix, SparseVector};

use crate::error::LinalgError;
use crate::orthogonalization::{
    normalize_all, orthogonal_complement, orthogonalize, orthogonalize_with_coefficients,
    remove_zero_vectors,
};
use crate::substitution::backward_substitution;

/// A vector space held as an orthogonal basis.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    orthogonal_basis: Vec<SparseVector>,
    orthonormal_basis: Vec<SparseVector>,
}

impl VectorSpace {
    fn from_orthogonal_basis(orthogonal_basis: Vec<SparseVector>) -> Self {
        let orthonormal_basis = normalize_all(&orthogonal_basis);
        Self {
            orthogonal_basis,
            orthonormal_basis,
        }
    }

    /// The space spanned by `spanning_set`.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if the vectors have different dimensions.
    pub fn from_spanning_set(spanning_set: &[SparseVector]) -> Result<Self, SparseError> {
        let basis = remove_zero_vectors(orthogonalize(spanning_set)?);
        Ok(Self::from_orthogonal_basis(basis))
    }

    /// The null space `{ x | A * x = 0 }` of `a`.
    pub fn null_space_of(a: &SparseMatrix) -> Result<Self, LinalgError> {
        Ok(Self::from_orthogonal_basis(find_null_space(a)?))
    }

    /// Mutually orthogonal vectors spanning the space.
    pub fn orthogonal_basis(&self) -> &[SparseVector] {
        &self.orthogonal_basis
    }

    /// The orthogonal basis scaled to unit length.
    pub fn orthonormal_basis(&self) -> &[SparseVector] {
        &self.orthonormal_basis
    }

    /// The number of basis vectors.
    pub fn dimension(&self) -> usize {
        self.orthogonal_basis.len()
    }

    /// The point of the space closest to `b`, i.e. the orthogonal projection of `b`.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if `b` has the wrong dimension.
    pub fn closest_point(&self, b: &SparseVector) -> Result<SparseVector, SparseError> {
        let orthogonal = b.project_orthogonal_to_all(&self.orthogonal_basis)?;
        b.subtract(&orthogonal)
    }
}

/// An orthogonal basis of the null space of `a`.
///
/// The standard basis over the column keys is orthogonalized against the
/// stored rows of `a`; the vectors that survive span the orthogonal complement
/// of the row space.
pub fn find_null_space(a: &SparseMatrix) -> Result<Vec<SparseVector>, LinalgError> {
    let rows: Vec<SparseVector> = a.non_empty_rows().map(|(_, row)| row.clone()).collect();

    let mut standard_basis = Vec::with_capacity(a.col_count());
    for &c in a.col_keys() {
        let mut e = SparseVector::from_key_set(a.col_key_set().clone(), a.default_value());
        e.set(c, 1.0)?;
        standard_basis.push(e);
    }

    let complement = orthogonal_complement(&rows, &standard_basis)?;
    Ok(remove_zero_vectors(complement))
}

/// A basis of the null space of `a` computed from Gram-Schmidt on its columns.
///
/// With `A = V* T`, where `V*` holds the orthogonalized columns and `T` the unit
/// upper triangular coefficient matrix, every column `i` of `T^-1` whose `v*_i`
/// vanished satisfies `A * T^-1[i] == v*_i == 0`.
pub fn find_null_space_from_columns(a: &SparseMatrix) -> Result<Vec<SparseVector>, LinalgError> {
    let n = a.col_count();
    let (vstar, r_columns) = orthogonalize_with_coefficients(&a.columns())?;
    if r_columns.is_empty() {
        return Ok(Vec::new());
    }
    let t = SparseMatrix::from_columns(&r_columns, a.default_value())?;

    let mut basis = Vec::new();
    for (i, v) in vstar.iter().enumerate() {
        if !v.is_empty() {
            continue;
        }
        let mut e = SparseVector::new(n);
        e.set(i, 1.0)?;
        // column i of T^-1
        basis.push(backward_substitution(&t, &e)?);
    }
    Ok(basis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank_two() -> Result<SparseMatrix, SparseError> {
        SparseMatrix::from_rows(&[
            [1.0, 2.0, 3.0, 4.0],
            [0.0, 1.0, 1.0, 0.0],
            [1.0, 3.0, 4.0, 4.0],
        ])
    }

    #[test]
    fn test_null_space_is_annihilated() -> Result<(), LinalgError> {
        let a = rank_two()?;
        let null = find_null_space(&a)?;
        assert_eq!(null.len(), 2);
        for x in &null {
            assert!(a.multiply_vector(x)?.norm(2) < 1e-10);
        }
        assert!(null[0].dot(&null[1])?.abs() < 1e-10);
        Ok(())
    }

    #[test]
    fn test_null_space_from_columns() -> Result<(), LinalgError> {
        let a = rank_two()?;
        let null = find_null_space_from_columns(&a)?;
        assert_eq!(null.len(), 2);
        for x in &null {
            assert!(!x.is_empty());
            assert!(a.multiply_vector(x)?.norm(2) < 1e-10);
        }
        Ok(())
    }

    #[test]
    fn test_full_rank_has_trivial_null_space() -> Result<(), LinalgError> {
        let a = SparseMatrix::from_rows(&[[2.0, 1.0], [1.0, 3.0]])?;
        assert!(find_null_space(&a)?.is_empty());
        assert!(find_null_space_from_columns(&a)?.is_empty());
        assert_eq!(VectorSpace::null_space_of(&a)?.dimension(), 0);
        Ok(())
    }

    #[test]
    fn test_spanning_set_and_closest_point() -> Result<(), SparseError> {
        let span = vec![
            SparseVector::from_slice(&[1.0, 0.0, 0.0]),
            SparseVector::from_slice(&[1.0, 1.0, 0.0]),
            SparseVector::from_slice(&[2.0, 1.0, 0.0]),
        ];
        let space = VectorSpace::from_spanning_set(&span)?;
        assert_eq!(space.dimension(), 2);
        for v in space.orthonormal_basis() {
            assert!((v.norm(2) - 1.0).abs() < 1e-12);
        }

        let b = SparseVector::from_slice(&[3.0, -1.0, 7.0]);
        assert_eq!(
            space.closest_point(&b)?,
            SparseVector::from_slice(&[3.0, -1.0, 0.0])
        );
        Ok(())
    }
}
