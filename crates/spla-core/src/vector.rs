use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, Mul};
use std::sync::Arc;

use crate::{KeySet, SparseError, SparseMatrix, EQUALITY_TOLERANCE, SPARSE_EPSILON};

/// A sparse vector over a fixed, ordered set of integer keys.
///
/// Only entries that differ from the default value are stored: assigning the
/// default value to a key removes its entry. The key set is fixed at
/// construction, every read and write outside of it is rejected.
///
/// # Example
///
/// ```
/// use spla_core::SparseVector;
///
/// let mut v = SparseVector::new(4);
/// v.set(1, 3.0).unwrap();
/// v.set(3, 4.0).unwrap();
/// assert_eq!(v.norm(2), 5.0);
/// assert_eq!(v.nnz(), 2);
///
/// v.set(1, 0.0).unwrap();
/// assert!(!v.has_value(1));
/// ```
#[derive(Debug, Clone)]
pub struct SparseVector {
    keys: Arc<KeySet>,
    entries: BTreeMap<usize, f64>,
    default_value: f64,
}

impl SparseVector {
    /// Creates an all-zero vector over the keys `0..dimension`.
    pub fn new(dimension: usize) -> Self {
        Self::with_default(dimension, 0.0)
    }

    /// Creates a vector over the keys `0..dimension` whose absent entries read as `default_value`.
    pub fn with_default(dimension: usize, default_value: f64) -> Self {
        Self::from_key_set(Arc::new(KeySet::range(dimension)), default_value)
    }

    /// Creates an empty vector over an explicit list of keys.
    pub fn from_keys(keys: &[usize], default_value: f64) -> Self {
        Self::from_key_set(Arc::new(KeySet::from_keys(keys)), default_value)
    }

    /// Creates an empty vector over a shared key set.
    pub fn from_key_set(keys: Arc<KeySet>, default_value: f64) -> Self {
        Self {
            keys,
            entries: BTreeMap::new(),
            default_value,
        }
    }

    /// Creates a vector over the keys `0..values.len()` from dense values.
    pub fn from_slice(values: &[f64]) -> Self {
        let mut v = Self::new(values.len());
        for (k, &value) in values.iter().enumerate() {
            v.insert(k, value);
        }
        v
    }

    /// Creates an empty vector with the same keys and default value.
    pub fn zeros_like(&self) -> Self {
        Self::from_key_set(self.keys.clone(), self.default_value)
    }

    /// The number of keys of the vector.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.keys.len()
    }

    /// The ordered keys of the vector.
    #[inline]
    pub fn keys(&self) -> &[usize] {
        self.keys.as_slice()
    }

    /// The shared key set of the vector.
    #[inline]
    pub fn key_set(&self) -> &Arc<KeySet> {
        &self.keys
    }

    /// The value read for keys without a stored entry.
    #[inline]
    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    /// The number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Iterates the stored `(key, value)` entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().map(|(&k, &v)| (k, v))
    }

    /// Whether `key` has an explicitly stored entry.
    #[inline]
    pub fn has_value(&self, key: usize) -> bool {
        self.entries.contains_key(&key)
    }

    /// Reads the value at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::IndexOutOfBounds`] if `key` is not part of the key set.
    pub fn get(&self, key: usize) -> Result<f64, SparseError> {
        self.check_key(key)?;
        Ok(self.value(key))
    }

    /// Writes `value` at `key`; writing the default value removes the entry.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::IndexOutOfBounds`] if `key` is not part of the key set.
    pub fn set(&mut self, key: usize, value: f64) -> Result<(), SparseError> {
        self.check_key(key)?;
        self.insert(key, value);
        Ok(())
    }

    #[inline]
    pub(crate) fn value(&self, key: usize) -> f64 {
        self.entries.get(&key).copied().unwrap_or(self.default_value)
    }

    // callers guarantee `key` is part of the key set
    #[inline]
    pub(crate) fn insert(&mut self, key: usize, value: f64) {
        if (value - self.default_value).abs() <= SPARSE_EPSILON {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, value);
        }
    }

    /// A copy of the vector over `keys`, entries matched by position.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if `keys` does not have `dimension` keys.
    pub fn rekey(&self, keys: &Arc<KeySet>) -> Result<SparseVector, SparseError> {
        if keys.len() != self.dimension() {
            return Err(SparseError::mismatch("rekey", self.dimension(), keys.len()));
        }
        Ok(self.clone().rekeyed(keys, self.default_value))
    }

    // re-key by position onto `keys`, sharing the key set when it already matches
    pub(crate) fn rekeyed(mut self, keys: &Arc<KeySet>, default_value: f64) -> SparseVector {
        if default_value == self.default_value
            && (Arc::ptr_eq(&self.keys, keys) || *self.keys == **keys)
        {
            self.keys = keys.clone();
            return self;
        }

        let mut result = SparseVector::from_key_set(keys.clone(), default_value);
        for (pos, key) in self.keys.iter().enumerate() {
            if let Some(target) = keys.get(pos) {
                result.insert(target, self.value(key));
            }
        }
        result
    }

    fn check_key(&self, key: usize) -> Result<(), SparseError> {
        if self.keys.contains(key) {
            Ok(())
        } else {
            Err(SparseError::IndexOutOfBounds {
                index: key,
                dimension: self.dimension(),
            })
        }
    }

    // `rhs` matched to the keys of `self` by position, after checking the dimensions agree
    fn aligned<'a>(
        &self,
        rhs: &'a SparseVector,
        operation: &'static str,
    ) -> Result<Cow<'a, SparseVector>, SparseError> {
        if self.dimension() != rhs.dimension() {
            return Err(SparseError::mismatch(
                operation,
                self.dimension(),
                rhs.dimension(),
            ));
        }
        if Arc::ptr_eq(&self.keys, &rhs.keys) || *self.keys == *rhs.keys {
            Ok(Cow::Borrowed(rhs))
        } else {
            Ok(Cow::Owned(rhs.clone().rekeyed(&self.keys, rhs.default_value)))
        }
    }

    // dot product over the stored entries of `self`
    pub(crate) fn inner(&self, rhs: &SparseVector) -> f64 {
        self.entries.iter().map(|(&k, &v)| v * rhs.value(k)).sum()
    }

    fn map_stored(&self, f: impl Fn(f64) -> f64) -> SparseVector {
        let mut result = self.zeros_like();
        for (&k, &v) in &self.entries {
            result.insert(k, f(v));
        }
        result
    }

    // `rhs` must already share the keys of `self`
    fn combine(&self, rhs: &SparseVector, f: impl Fn(f64, f64) -> f64) -> SparseVector {
        let mut result = self.zeros_like();
        if self.default_value == 0.0 && rhs.default_value == 0.0 {
            // absent on both sides stays absent, only the union of stored keys matters
            for &k in self.entries.keys().chain(rhs.entries.keys()) {
                result.insert(k, f(self.value(k), rhs.value(k)));
            }
        } else {
            for k in self.keys.iter() {
                result.insert(k, f(self.value(k), rhs.value(k)));
            }
        }
        result
    }

    /// Computes the dot product, visiting only the stored entries of `self`.
    ///
    /// Like every binary operation on vectors, entries of `rhs` are matched to
    /// those of `self` by position when the two key sets differ.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if the dimensions differ.
    pub fn dot(&self, rhs: &SparseVector) -> Result<f64, SparseError> {
        let rhs = self.aligned(rhs, "dot")?;
        Ok(self.inner(&rhs))
    }

    /// Elementwise sum.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if the dimensions differ.
    pub fn add(&self, rhs: &SparseVector) -> Result<SparseVector, SparseError> {
        let rhs = self.aligned(rhs, "add")?;
        Ok(self.combine(&rhs, |a, b| a + b))
    }

    /// Elementwise difference.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if the dimensions differ.
    pub fn subtract(&self, rhs: &SparseVector) -> Result<SparseVector, SparseError> {
        let rhs = self.aligned(rhs, "subtract")?;
        Ok(self.combine(&rhs, |a, b| a - b))
    }

    /// Multiplies every entry by `scalar`.
    pub fn scale(&self, scalar: f64) -> SparseVector {
        if self.default_value == 0.0 {
            return self.map_stored(|v| v * scalar);
        }
        let mut result = self.zeros_like();
        for k in self.keys.iter() {
            result.insert(k, self.value(k) * scalar);
        }
        result
    }

    /// Divides the stored entries of `self` by the matching entries of `rhs`.
    ///
    /// Keys without a stored entry in `self` are left at the default value.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if the dimensions differ.
    pub fn divide(&self, rhs: &SparseVector) -> Result<SparseVector, SparseError> {
        let rhs = self.aligned(rhs, "divide")?;
        let mut result = self.zeros_like();
        for (&k, &v) in &self.entries {
            result.insert(k, v / rhs.value(k));
        }
        Ok(result)
    }

    /// Raises every stored entry to the power `exponent`.
    pub fn pow(&self, exponent: f64) -> SparseVector {
        self.map_stored(|v| v.powf(exponent))
    }

    /// Square root of every stored entry. Negative entries become NaN.
    pub fn sqrt(&self) -> SparseVector {
        self.map_stored(f64::sqrt)
    }

    /// Natural logarithm of every stored entry.
    pub fn ln(&self) -> SparseVector {
        self.map_stored(f64::ln)
    }

    /// Sum of the stored entries.
    pub fn sum(&self) -> f64 {
        self.entries.values().sum()
    }

    /// The `level`-norm of the vector.
    ///
    /// * `1` - sum of absolute values.
    /// * `2` - euclidean length, `sqrt(self . self)`.
    /// * `n` - `(sum |v|^n)^(1/n)`.
    pub fn norm(&self, level: u32) -> f64 {
        match level {
            1 => self.entries.values().map(|v| v.abs()).sum(),
            2 => self.inner(self).sqrt(),
            _ => {
                let p = level as f64;
                let sum: f64 = self.entries.values().map(|v| v.abs().powf(p)).sum();
                sum.powf(1.0 / p)
            }
        }
    }

    /// Whether the vector has no stored entries or a negligible squared norm.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() || self.inner(self) <= SPARSE_EPSILON
    }

    /// Scales the vector to unit euclidean length.
    ///
    /// A vector of (near) zero length normalizes to the empty vector.
    pub fn normalize(&self) -> SparseVector {
        let norm = self.norm(2);
        if norm.abs() <= SPARSE_EPSILON {
            return self.zeros_like();
        }
        self.map_stored(|v| v / norm)
    }

    /// The projection of `self` along the direction `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if the dimensions differ.
    pub fn project_along(&self, rhs: &SparseVector) -> Result<SparseVector, SparseError> {
        Ok(self.project_along_with_coefficient(rhs)?.0)
    }

    /// The projection of `self` along `rhs` together with its coefficient
    /// `sigma = (self . rhs) / (rhs . rhs)`.
    ///
    /// The projection is keyed like `self`. A degenerate direction
    /// (`rhs . rhs <= 1e-20`) yields the empty vector and a zero coefficient.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if the dimensions differ.
    pub fn project_along_with_coefficient(
        &self,
        rhs: &SparseVector,
    ) -> Result<(SparseVector, f64), SparseError> {
        let rhs = self.aligned(rhs, "project_along")?;
        let rhs_norm = rhs.inner(&rhs);
        if rhs_norm <= SPARSE_EPSILON {
            return Ok((self.zeros_like(), 0.0));
        }
        let sigma = self.inner(&rhs) / rhs_norm;
        Ok((rhs.scale(sigma), sigma))
    }

    /// The component of `self` orthogonal to `rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if the dimensions differ.
    pub fn project_orthogonal(&self, rhs: &SparseVector) -> Result<SparseVector, SparseError> {
        self.subtract(&self.project_along(rhs)?)
    }

    /// The component of `self` orthogonal to every vector of `basis`.
    ///
    /// The basis vectors are assumed to be mutually orthogonal; the projections
    /// are removed one after another in list order.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if a basis vector has a different dimension.
    pub fn project_orthogonal_to_all(
        &self,
        basis: &[SparseVector],
    ) -> Result<SparseVector, SparseError> {
        let mut b = self.clone();
        for v in basis {
            b = b.subtract(&b.project_along(v)?)?;
        }
        Ok(b)
    }

    /// Like [`SparseVector::project_orthogonal_to_all`], also returning the
    /// projection coefficient removed at each basis position.
    ///
    /// The coefficient list has `basis.len() + 1` entries; the trailing one is
    /// always `1.0` and stands for the remaining orthogonal component.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if a basis vector has a different dimension.
    pub fn project_orthogonal_with_coefficients(
        &self,
        basis: &[SparseVector],
    ) -> Result<(SparseVector, Vec<f64>), SparseError> {
        let mut b = self.clone();
        let mut alpha = Vec::with_capacity(basis.len() + 1);
        for v in basis {
            let (along, sigma) = b.project_along_with_coefficient(v)?;
            b = b.subtract(&along)?;
            alpha.push(sigma);
        }
        alpha.push(1.0);
        Ok((b, alpha))
    }

    /// Computes the row-vector product `self * rhs`, i.e. `rhs^T * self`.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if `rhs` does not have `dimension` rows.
    pub fn multiply_matrix(&self, rhs: &SparseMatrix) -> Result<SparseVector, SparseError> {
        rhs.transpose().multiply_vector(self)
    }
}

impl Index<usize> for SparseVector {
    type Output = f64;

    fn index(&self, key: usize) -> &Self::Output {
        assert!(
            self.keys.contains(key),
            "Index {} is not a key of the vector (dimension {})",
            key,
            self.dimension()
        );
        self.entries.get(&key).unwrap_or(&self.default_value)
    }
}

impl Mul<f64> for &SparseVector {
    type Output = SparseVector;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

// entries are matched by position, like the arithmetic
impl PartialEq for SparseVector {
    fn eq(&self, other: &Self) -> bool {
        self.dimension() == other.dimension()
            && self
                .keys
                .iter()
                .zip(other.keys.iter())
                .all(|(a, b)| (self.value(a) - other.value(b)).abs() <= EQUALITY_TOLERANCE)
    }
}

impl fmt::Display for SparseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "\"{k}\":{v}")?;
        }
        write!(f, "}}")
    }
}
