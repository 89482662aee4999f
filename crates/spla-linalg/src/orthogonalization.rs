use spla_core::{SparseError, SparseVector};

/// Classical Gram-Schmidt over a sequence of vectors.
///
/// The `i`-th output is the `i`-th input with its projections on every earlier
/// output removed, so the outputs are mutually orthogonal and span the same
/// space. Linearly dependent inputs produce (near) zero vectors, which are kept
/// in place. No re-orthogonalization is done.
///
/// # Errors
///
/// Returns [`SparseError::DimensionMismatch`] if the vectors have different dimensions.
pub fn orthogonalize(vectors: &[SparseVector]) -> Result<Vec<SparseVector>, SparseError> {
    let mut vstar: Vec<SparseVector> = Vec::with_capacity(vectors.len());
    for v in vectors {
        let orthogonal = v.project_orthogonal_to_all(&vstar)?;
        vstar.push(orthogonal);
    }
    Ok(vstar)
}

/// Gram-Schmidt that also records the projection coefficients.
///
/// Returns `(vstar, r_columns)` where `r_columns[i]` is a vector over
/// `0..vectors.len()` holding the coefficient removed along `vstar[j]` at key
/// `j < i` and `1.0` at key `i`, so that
/// `vectors[i] == sum_j r_columns[i][j] * vstar[j]`.
///
/// # Errors
///
/// Returns [`SparseError::DimensionMismatch`] if the vectors have different dimensions.
pub fn orthogonalize_with_coefficients(
    vectors: &[SparseVector],
) -> Result<(Vec<SparseVector>, Vec<SparseVector>), SparseError> {
    let n = vectors.len();
    let mut vstar: Vec<SparseVector> = Vec::with_capacity(n);
    let mut r_columns = Vec::with_capacity(n);
    for v in vectors {
        let (orthogonal, alpha) = v.project_orthogonal_with_coefficients(&vstar)?;
        vstar.push(orthogonal);

        let mut r = SparseVector::with_default(n, v.default_value());
        for (j, coefficient) in alpha.into_iter().enumerate() {
            r.set(j, coefficient)?;
        }
        r_columns.push(r);
    }
    Ok((vstar, r_columns))
}

/// The part of `span(w)` orthogonal to `span(v)`.
///
/// `v` is orthogonalized first and its zero vectors dropped. Each vector of `w`
/// is then projected orthogonal to the running basis, which grows with every
/// projected `w`. Only the vectors derived from `w` are returned, one per input
/// and possibly zero.
///
/// # Errors
///
/// Returns [`SparseError::DimensionMismatch`] if the vectors have different dimensions.
pub fn orthogonal_complement(
    v: &[SparseVector],
    w: &[SparseVector],
) -> Result<Vec<SparseVector>, SparseError> {
    let mut basis = remove_zero_vectors(orthogonalize(v)?);
    let v_len = basis.len();
    for wi in w {
        let orthogonal = wi.project_orthogonal_to_all(&basis)?;
        basis.push(orthogonal);
    }
    Ok(basis.split_off(v_len))
}

/// Scales every vector to unit length.
pub fn normalize_all(vectors: &[SparseVector]) -> Vec<SparseVector> {
    vectors.iter().map(SparseVector::normalize).collect()
}

/// Scales every vector to unit length, also returning the original euclidean norms.
pub fn normalize_with_norms(vectors: &[SparseVector]) -> (Vec<SparseVector>, Vec<f64>) {
    vectors
        .iter()
        .map(|v| (v.normalize(), v.norm(2)))
        .unzip()
}

/// Drops the vectors that are empty in the sense of [`SparseVector::is_empty`].
pub fn remove_zero_vectors(vectors: Vec<SparseVector>) -> Vec<SparseVector> {
    vectors.into_iter().filter(|v| !v.is_empty()).collect()
}
