use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use crate::{KeySet, SparseError, SparseVector, EQUALITY_TOLERANCE};

/// A sparse matrix stored as a map from row key to sparse row vector.
///
/// Row and column keys are independent ordered key sets, so a matrix can
/// describe a sub-block of a larger matrix without re-indexing. Every stored
/// row shares the matrix's column key set. Rows that hold no entries are not
/// stored at all.
///
/// # Example
///
/// ```
/// use spla_core::SparseMatrix;
///
/// let a = SparseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
/// let at = a.transpose();
/// assert_eq!(at.get(0, 1).unwrap(), 3.0);
///
/// let i = SparseMatrix::identity(2);
/// assert_eq!(a.multiply(&i).unwrap(), a);
/// ```
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    row_keys: Arc<KeySet>,
    col_keys: Arc<KeySet>,
    rows: BTreeMap<usize, SparseVector>,
    default_value: f64,
}

impl SparseMatrix {
    /// Creates an all-zero `rows x cols` matrix with keys `0..rows` and `0..cols`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_default(rows, cols, 0.0)
    }

    /// Creates a `rows x cols` matrix whose absent entries read as `default_value`.
    pub fn with_default(rows: usize, cols: usize, default_value: f64) -> Self {
        Self::from_key_sets(
            Arc::new(KeySet::range(rows)),
            Arc::new(KeySet::range(cols)),
            default_value,
        )
    }

    /// Creates an empty matrix over explicit row and column keys.
    pub fn from_keys(rows: &[usize], cols: &[usize], default_value: f64) -> Self {
        Self::from_key_sets(
            Arc::new(KeySet::from_keys(rows)),
            Arc::new(KeySet::from_keys(cols)),
            default_value,
        )
    }

    /// Creates an empty matrix over shared row and column key sets.
    pub fn from_key_sets(row_keys: Arc<KeySet>, col_keys: Arc<KeySet>, default_value: f64) -> Self {
        Self {
            row_keys,
            col_keys,
            rows: BTreeMap::new(),
            default_value,
        }
    }

    /// Creates a matrix from dense rows.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::EmptyInput`] for zero rows or columns and
    /// [`SparseError::RaggedRows`] if the rows have different lengths.
    pub fn from_rows<R: AsRef<[f64]>>(data: &[R]) -> Result<Self, SparseError> {
        let first = data
            .first()
            .ok_or(SparseError::EmptyInput("matrix has no rows"))?;
        let cols = first.as_ref().len();
        if cols == 0 {
            return Err(SparseError::EmptyInput("matrix has no columns"));
        }

        let mut matrix = Self::new(data.len(), cols);
        for (r, row) in data.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(SparseError::RaggedRows {
                    row: r,
                    expected: cols,
                    actual: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                matrix.insert(r, c, value);
            }
        }
        Ok(matrix)
    }

    /// Creates the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut eye = Self::new(n, n);
        for i in 0..n {
            eye.insert(i, i, 1.0);
        }
        eye
    }

    /// Creates an identity matrix whose rows and columns are both indexed by `keys`.
    pub fn identity_with_keys(keys: &[usize]) -> Self {
        let keys = Arc::new(KeySet::from_keys(keys));
        let mut eye = Self::from_key_sets(keys.clone(), keys.clone(), 0.0);
        for k in keys.iter() {
            eye.insert(k, k, 1.0);
        }
        eye
    }

    /// Creates an empty matrix with the same keys and default value.
    pub fn zeros_like(&self) -> Self {
        Self::from_key_sets(self.row_keys.clone(), self.col_keys.clone(), self.default_value)
    }

    /// Assembles a matrix whose `c`-th column is `columns[c]`.
    ///
    /// Row keys are taken from the first column, column keys are `0..columns.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::EmptyInput`] if `columns` is empty and
    /// [`SparseError::DimensionMismatch`] if the columns have different dimensions.
    pub fn from_columns(columns: &[SparseVector], default_value: f64) -> Result<Self, SparseError> {
        let first = columns
            .first()
            .ok_or(SparseError::EmptyInput("no column vectors"))?;
        let row_keys = first.key_set().clone();

        let mut matrix = Self::from_key_sets(
            row_keys.clone(),
            Arc::new(KeySet::range(columns.len())),
            default_value,
        );
        for (c, column) in columns.iter().enumerate() {
            if column.dimension() != row_keys.len() {
                return Err(SparseError::mismatch(
                    "from_columns",
                    row_keys.len(),
                    column.dimension(),
                ));
            }
            for (pos, key) in column.keys().iter().enumerate() {
                let value = column.value(*key);
                if let Some(r) = row_keys.get(pos) {
                    matrix.insert(r, c, value);
                }
            }
        }
        Ok(matrix)
    }

    /// The number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_keys.len()
    }

    /// The number of columns.
    #[inline]
    pub fn col_count(&self) -> usize {
        self.col_keys.len()
    }

    /// The ordered row keys.
    #[inline]
    pub fn row_keys(&self) -> &[usize] {
        self.row_keys.as_slice()
    }

    /// The ordered column keys.
    #[inline]
    pub fn col_keys(&self) -> &[usize] {
        self.col_keys.as_slice()
    }

    /// The shared row key set.
    #[inline]
    pub fn row_key_set(&self) -> &Arc<KeySet> {
        &self.row_keys
    }

    /// The shared column key set.
    #[inline]
    pub fn col_key_set(&self) -> &Arc<KeySet> {
        &self.col_keys
    }

    /// The value read for entries that are not stored.
    #[inline]
    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    /// Whether the matrix has as many rows as columns.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.row_count() == self.col_count()
    }

    /// The number of stored entries.
    pub fn nnz(&self) -> usize {
        self.rows.values().map(SparseVector::nnz).sum()
    }

    fn check_row(&self, row: usize) -> Result<(), SparseError> {
        if self.row_keys.contains(row) {
            Ok(())
        } else {
            Err(SparseError::RowOutOfBounds {
                row,
                rows: self.row_count(),
            })
        }
    }

    fn check_col(&self, col: usize) -> Result<(), SparseError> {
        if self.col_keys.contains(col) {
            Ok(())
        } else {
            Err(SparseError::ColumnOutOfBounds {
                col,
                cols: self.col_count(),
            })
        }
    }

    #[inline]
    pub(crate) fn value(&self, row: usize, col: usize) -> f64 {
        self.rows
            .get(&row)
            .map_or(self.default_value, |r| r.value(col))
    }

    // callers guarantee both keys are valid
    pub(crate) fn insert(&mut self, row: usize, col: usize, value: f64) {
        let empty = self.empty_row();
        let row_vector = self.rows.entry(row).or_insert(empty);
        row_vector.insert(col, value);
        if row_vector.nnz() == 0 {
            self.rows.remove(&row);
        }
    }

    fn empty_row(&self) -> SparseVector {
        SparseVector::from_key_set(self.col_keys.clone(), self.default_value)
    }

    fn put_row(&mut self, row: usize, vector: SparseVector) {
        if vector.nnz() == 0 {
            self.rows.remove(&row);
        } else {
            self.rows.insert(row, vector);
        }
    }

    /// Reads the entry at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::RowOutOfBounds`] or [`SparseError::ColumnOutOfBounds`]
    /// for keys outside the matrix's key sets.
    pub fn get(&self, row: usize, col: usize) -> Result<f64, SparseError> {
        self.check_row(row)?;
        self.check_col(col)?;
        Ok(self.value(row, col))
    }

    /// Writes the entry at `(row, col)`; writing the default value removes it.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::RowOutOfBounds`] or [`SparseError::ColumnOutOfBounds`]
    /// for keys outside the matrix's key sets.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), SparseError> {
        self.check_row(row)?;
        self.check_col(col)?;
        self.insert(row, col, value);
        Ok(())
    }

    /// Whether `(row, col)` has an explicitly stored entry.
    pub fn has_value(&self, row: usize, col: usize) -> bool {
        self.rows.get(&row).is_some_and(|r| r.has_value(col))
    }

    /// Returns a copy of row `row` keyed by the column keys.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::RowOutOfBounds`] if `row` is not a row key.
    pub fn row(&self, row: usize) -> Result<SparseVector, SparseError> {
        self.check_row(row)?;
        Ok(self
            .rows
            .get(&row)
            .cloned()
            .unwrap_or_else(|| self.empty_row()))
    }

    /// Borrows row `row` if it holds any entry.
    pub fn row_ref(&self, row: usize) -> Option<&SparseVector> {
        self.rows.get(&row)
    }

    /// Replaces row `row` with `vector`.
    ///
    /// The matrix takes ownership of the vector. A vector over different keys
    /// of the same dimension is re-keyed by position onto the column keys.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::RowOutOfBounds`] if `row` is not a row key and
    /// [`SparseError::DimensionMismatch`] if the vector's dimension is not the column count.
    pub fn set_row(&mut self, row: usize, vector: SparseVector) -> Result<(), SparseError> {
        self.check_row(row)?;
        if vector.dimension() != self.col_count() {
            return Err(SparseError::mismatch(
                "set_row",
                self.col_count(),
                vector.dimension(),
            ));
        }
        let vector = vector.rekeyed(&self.col_keys, self.default_value);
        self.put_row(row, vector);
        Ok(())
    }

    /// Swaps two rows.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::RowOutOfBounds`] if either key is not a row key.
    pub fn swap_rows(&mut self, a: usize, b: usize) -> Result<(), SparseError> {
        self.check_row(a)?;
        self.check_row(b)?;
        let row_a = self.rows.remove(&a);
        let row_b = self.rows.remove(&b);
        if let Some(v) = row_a {
            self.rows.insert(b, v);
        }
        if let Some(v) = row_b {
            self.rows.insert(a, v);
        }
        Ok(())
    }

    /// Returns column `col` as a vector keyed by the row keys.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::ColumnOutOfBounds`] if `col` is not a column key.
    pub fn column(&self, col: usize) -> Result<SparseVector, SparseError> {
        self.check_col(col)?;
        let mut column = SparseVector::from_key_set(self.row_keys.clone(), self.default_value);
        for (&r, row) in &self.rows {
            column.insert(r, row.value(col));
        }
        Ok(column)
    }

    /// Returns every column, in column-key order, as vectors keyed by the row keys.
    pub fn columns(&self) -> Vec<SparseVector> {
        let mut columns: Vec<SparseVector> = self
            .col_keys
            .iter()
            .map(|_| SparseVector::from_key_set(self.row_keys.clone(), self.default_value))
            .collect();
        for (&r, row) in &self.rows {
            for (c, value) in row.iter() {
                if let Some(pos) = self.col_keys.position(c) {
                    columns[pos].insert(r, value);
                }
            }
        }
        columns
    }

    /// Iterates the stored rows as `(row key, row)` pairs in key order.
    pub fn non_empty_rows(&self) -> impl Iterator<Item = (usize, &SparseVector)> + '_ {
        self.rows.iter().map(|(&r, v)| (r, v))
    }

    /// The diagonal entries `A[row_keys[i], col_keys[i]]` for `i < min(rows, cols)`.
    pub fn diagonal(&self) -> Vec<f64> {
        self.row_keys
            .iter()
            .zip(self.col_keys.iter())
            .map(|(r, c)| self.value(r, c))
            .collect()
    }

    /// Matrix product `self * rhs`.
    ///
    /// Each stored row of `self` is dotted with each column of `rhs`, so the
    /// cost is proportional to the stored entries of `self` times the columns of `rhs`.
    /// When the column keys of `self` differ from the row keys of `rhs` the two
    /// are matched by position.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if `self.col_count() != rhs.row_count()`.
    pub fn multiply(&self, rhs: &SparseMatrix) -> Result<SparseMatrix, SparseError> {
        if self.col_count() != rhs.row_count() {
            return Err(SparseError::mismatch(
                "multiply",
                self.col_count(),
                rhs.row_count(),
            ));
        }

        let mut result =
            Self::from_key_sets(self.row_keys.clone(), rhs.col_keys.clone(), self.default_value);
        let rhs_columns: Vec<SparseVector> = rhs
            .columns()
            .into_iter()
            .map(|column| column.rekeyed(&self.col_keys, rhs.default_value))
            .collect();
        for (&r, row) in &self.rows {
            let mut product = result.empty_row();
            for (c, column) in rhs.col_keys.iter().zip(rhs_columns.iter()) {
                product.insert(c, row.inner(column));
            }
            result.put_row(r, product);
        }
        Ok(result)
    }

    /// Matrix-vector product `self * rhs`, keyed by the row keys.
    ///
    /// The vector is matched to the column keys by position if its keys differ.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if `self.col_count() != rhs.dimension()`.
    pub fn multiply_vector(&self, rhs: &SparseVector) -> Result<SparseVector, SparseError> {
        if self.col_count() != rhs.dimension() {
            return Err(SparseError::mismatch(
                "multiply_vector",
                self.col_count(),
                rhs.dimension(),
            ));
        }
        let aligned;
        let rhs = if **rhs.key_set() == *self.col_keys {
            rhs
        } else {
            aligned = rhs.clone().rekeyed(&self.col_keys, rhs.default_value());
            &aligned
        };
        let mut result = SparseVector::from_key_set(self.row_keys.clone(), self.default_value);
        for (&r, row) in &self.rows {
            result.insert(r, row.inner(rhs));
        }
        Ok(result)
    }

    /// Multiplies every stored entry by `scalar`.
    pub fn scale(&self, scalar: f64) -> SparseMatrix {
        let mut result = self.zeros_like();
        for (&r, row) in &self.rows {
            result.put_row(r, row.scale(scalar));
        }
        result
    }

    fn check_same_shape(
        &self,
        rhs: &SparseMatrix,
        operation: &'static str,
    ) -> Result<(), SparseError> {
        if self.row_count() != rhs.row_count() {
            return Err(SparseError::mismatch(
                operation,
                self.row_count(),
                rhs.row_count(),
            ));
        }
        if self.col_count() != rhs.col_count() {
            return Err(SparseError::mismatch(
                operation,
                self.col_count(),
                rhs.col_count(),
            ));
        }
        Ok(())
    }

    fn combine_rows(
        &self,
        rhs: &SparseMatrix,
        f: impl Fn(&SparseVector, &SparseVector) -> Result<SparseVector, SparseError>,
    ) -> Result<SparseMatrix, SparseError> {
        let mut result = self.zeros_like();
        let empty = self.empty_row();
        // rows are matched by position, rhs rows are re-keyed by the row operation
        let touched: BTreeSet<usize> = self
            .rows
            .keys()
            .filter_map(|&r| self.row_keys.position(r))
            .chain(rhs.rows.keys().filter_map(|&r| rhs.row_keys.position(r)))
            .collect();
        for pos in touched {
            let (Some(r), Some(rhs_r)) = (self.row_keys.get(pos), rhs.row_keys.get(pos)) else {
                continue;
            };
            let lhs_row = self.rows.get(&r).unwrap_or(&empty);
            let rhs_row = rhs.rows.get(&rhs_r).unwrap_or(&empty);
            let combined = f(lhs_row, rhs_row)?.rekeyed(&self.col_keys, self.default_value);
            result.put_row(r, combined);
        }
        Ok(result)
    }

    /// Elementwise sum. Rows missing on either side count as all-default.
    ///
    /// Rows and columns of `rhs` are matched to those of `self` by position; the
    /// result is keyed like `self`.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if the shapes differ.
    pub fn add(&self, rhs: &SparseMatrix) -> Result<SparseMatrix, SparseError> {
        self.check_same_shape(rhs, "add")?;
        self.combine_rows(rhs, |a, b| a.add(b))
    }

    /// Elementwise difference. Rows missing on either side count as all-default.
    ///
    /// Keys are matched by position as in [`SparseMatrix::add`].
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if the shapes differ.
    pub fn subtract(&self, rhs: &SparseMatrix) -> Result<SparseMatrix, SparseError> {
        self.check_same_shape(rhs, "subtract")?;
        self.combine_rows(rhs, |a, b| a.subtract(b))
    }

    /// The transpose, with the roles of row and column keys swapped.
    pub fn transpose(&self) -> SparseMatrix {
        let mut result =
            Self::from_key_sets(self.col_keys.clone(), self.row_keys.clone(), self.default_value);
        for (&r, row) in &self.rows {
            for (c, value) in row.iter() {
                result.insert(c, r, value);
            }
        }
        result
    }

    /// Restricts the matrix to the given row and column keys, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::RowOutOfBounds`] or [`SparseError::ColumnOutOfBounds`]
    /// if a requested key does not belong to the matrix.
    pub fn sub_matrix(&self, rows: &[usize], cols: &[usize]) -> Result<SparseMatrix, SparseError> {
        for &r in rows {
            self.check_row(r)?;
        }
        for &c in cols {
            self.check_col(c)?;
        }
        let mut result = Self::from_keys(rows, cols, self.default_value);
        for &r in rows {
            if let Some(row) = self.rows.get(&r) {
                for &c in cols {
                    if row.has_value(c) {
                        result.insert(r, c, row.value(c));
                    }
                }
            }
        }
        Ok(result)
    }

    /// Scales each row `r` by `weights[r]`, i.e. `diag(weights) * self`.
    ///
    /// The weights are matched to the row keys by position if their keys differ.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if `weights` does not have one entry per row.
    pub fn scale_rows(&self, weights: &SparseVector) -> Result<SparseMatrix, SparseError> {
        let weights = weights.rekey(&self.row_keys)?;
        let mut result = self.zeros_like();
        for (&r, row) in &self.rows {
            result.put_row(r, row.scale(weights.value(r)));
        }
        Ok(result)
    }

    /// A copy of the matrix over new row and column keys, matched by position.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if a key set does not have the
    /// length of the matching axis.
    pub fn rekey(
        &self,
        row_keys: &Arc<KeySet>,
        col_keys: &Arc<KeySet>,
    ) -> Result<SparseMatrix, SparseError> {
        if row_keys.len() != self.row_count() {
            return Err(SparseError::mismatch("rekey", self.row_count(), row_keys.len()));
        }
        if col_keys.len() != self.col_count() {
            return Err(SparseError::mismatch("rekey", self.col_count(), col_keys.len()));
        }
        let mut result =
            Self::from_key_sets(row_keys.clone(), col_keys.clone(), self.default_value);
        for (&r, row) in &self.rows {
            if let Some(target) = self.row_keys.position(r).and_then(|pos| row_keys.get(pos)) {
                result.put_row(target, row.clone().rekeyed(col_keys, self.default_value));
            }
        }
        Ok(result)
    }

    /// Scales the row at position `i` by `weights[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`SparseError::DimensionMismatch`] if `weights` does not have one entry per row.
    pub fn scale_rows_by(&self, weights: &[f64]) -> Result<SparseMatrix, SparseError> {
        if weights.len() != self.row_count() {
            return Err(SparseError::mismatch(
                "scale_rows_by",
                self.row_count(),
                weights.len(),
            ));
        }
        let mut result = self.zeros_like();
        for (&r, row) in &self.rows {
            if let Some(pos) = self.row_keys.position(r) {
                result.put_row(r, row.scale(weights[pos]));
            }
        }
        Ok(result)
    }

    /// Whether the matrix is square and `|A[r, c] - A[c, r]| <= 1e-10` for every
    /// stored off-diagonal entry.
    pub fn is_symmetric(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        self.rows.iter().all(|(&r, row)| {
            row.iter()
                .filter(|&(c, _)| c != r)
                .all(|(c, value)| (value - self.value(c, r)).abs() <= EQUALITY_TOLERANCE)
        })
    }
}

impl Index<(usize, usize)> for SparseMatrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(
            self.row_keys.contains(row),
            "Row {} is not a row key of the matrix ({} rows)",
            row,
            self.row_count()
        );
        assert!(
            self.col_keys.contains(col),
            "Column {} is not a column key of the matrix ({} columns)",
            col,
            self.col_count()
        );
        match self.rows.get(&row) {
            Some(r) => &r[col],
            None => &self.default_value,
        }
    }
}

// entries are matched by position, like the arithmetic
impl PartialEq for SparseMatrix {
    fn eq(&self, other: &Self) -> bool {
        if self.row_count() != other.row_count() || self.col_count() != other.col_count() {
            return false;
        }
        self.row_keys.iter().zip(other.row_keys.iter()).all(|(r, other_r)| {
            self.col_keys.iter().zip(other.col_keys.iter()).all(|(c, other_c)| {
                (self.value(r, c) - other.value(other_r, other_c)).abs() <= EQUALITY_TOLERANCE
            })
        })
    }
}

impl fmt::Display for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in self.row_keys.iter() {
            write!(f, "{{")?;
            for (i, c) in self.col_keys.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.value(r, c))?;
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn fixture() -> Result<SparseMatrix, SparseError> {
        SparseMatrix::from_rows(&[
            [12.0, -51.0, 4.0],
            [6.0, 167.0, -68.0],
            [-4.0, 24.0, -41.0],
        ])
    }

    #[test]
    fn test_from_rows() -> Result<(), SparseError> {
        let data = [[12.0, -51.0, 4.0], [6.0, 167.0, -68.0], [-4.0, 24.0, -41.0]];
        let a = SparseMatrix::from_rows(&data)?;
        assert_eq!(a.row_count(), 3);
        assert_eq!(a.col_count(), 3);
        for (r, row) in data.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                assert_eq!(a.get(r, c)?, *value);
                assert_eq!(a[(r, c)], *value);
            }
        }
        Ok(())
    }

    #[test]
    fn test_from_rows_errors() {
        let empty: [[f64; 2]; 0] = [];
        assert_eq!(
            SparseMatrix::from_rows(&empty).unwrap_err(),
            SparseError::EmptyInput("matrix has no rows")
        );
        let ragged = vec![vec![1.0, 2.0], vec![3.0]];
        assert_eq!(
            SparseMatrix::from_rows(&ragged).unwrap_err(),
            SparseError::RaggedRows {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_bounds() {
        let mut a = SparseMatrix::new(2, 3);
        assert_eq!(
            a.set(2, 0, 1.0),
            Err(SparseError::RowOutOfBounds { row: 2, rows: 2 })
        );
        assert_eq!(
            a.get(0, 3),
            Err(SparseError::ColumnOutOfBounds { col: 3, cols: 3 })
        );
        assert!(a.set(1, 2, 1.0).is_ok());
        assert!(a.has_value(1, 2));
        assert!(!a.has_value(0, 2));
    }

    #[test]
    fn test_set_default_prunes_row() -> Result<(), SparseError> {
        let mut a = SparseMatrix::new(2, 2);
        a.set(0, 1, 3.0)?;
        assert_eq!(a.non_empty_rows().count(), 1);
        a.set(0, 1, 0.0)?;
        assert_eq!(a.non_empty_rows().count(), 0);
        assert_eq!(a.nnz(), 0);
        Ok(())
    }

    #[test]
    fn test_columns_roundtrip() -> Result<(), SparseError> {
        let a = fixture()?;
        let columns = a.columns();
        assert_eq!(columns.len(), 3);
        for c in 0..3 {
            for r in 0..3 {
                assert_eq!(columns[c][r], a[(r, c)]);
            }
            assert_eq!(columns[c], a.column(c)?);
        }
        assert_eq!(SparseMatrix::from_columns(&columns, 0.0)?, a);
        Ok(())
    }

    #[test]
    fn test_multiply() -> Result<(), SparseError> {
        let a = SparseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0], [0.0, 1.0]])?;
        let b = SparseMatrix::from_rows(&[[1.0, 0.0, 2.0], [0.0, 1.0, -1.0]])?;
        let ab = a.multiply(&b)?;
        let expected =
            SparseMatrix::from_rows(&[[1.0, 2.0, 0.0], [3.0, 4.0, 2.0], [0.0, 1.0, -1.0]])?;
        assert_eq!(ab, expected);
        assert!(!ab.has_value(0, 2));

        assert_eq!(
            a.multiply(&a).unwrap_err(),
            SparseError::DimensionMismatch {
                operation: "multiply",
                expected: 2,
                actual: 3
            }
        );
        Ok(())
    }

    #[test]
    fn test_multiply_aligns_keys_by_position() -> Result<(), SparseError> {
        let mut a = SparseMatrix::from_keys(&[0, 1], &[3, 8], 0.0);
        a.set(0, 3, 1.0)?;
        a.set(1, 8, 2.0)?;
        let b = SparseMatrix::from_rows(&[[1.0, 1.0], [0.0, 1.0]])?;

        let ab = a.multiply(&b)?;
        assert_eq!(ab.get(0, 1)?, 1.0);
        assert_eq!(ab.get(1, 1)?, 2.0);
        assert_eq!(ab.get(1, 0)?, 0.0);

        let v = a.multiply_vector(&SparseVector::from_slice(&[3.0, 4.0]))?;
        assert_eq!(v[0], 3.0);
        assert_eq!(v[1], 8.0);
        Ok(())
    }

    #[test]
    fn test_multiply_vector() -> Result<(), SparseError> {
        let a = fixture()?;
        let x = SparseVector::from_slice(&[2.0, 4.0, 1.0]);
        let b = a.multiply_vector(&x)?;
        assert_eq!(b, SparseVector::from_slice(&[-176.0, 612.0, 47.0]));
        assert_eq!(
            x.multiply_matrix(&a)?,
            a.transpose().multiply_vector(&x)?
        );
        assert!(a.multiply_vector(&SparseVector::new(2)).is_err());
        Ok(())
    }

    #[test]
    fn test_add_subtract_scale() -> Result<(), SparseError> {
        let a = fixture()?;
        let eye = SparseMatrix::identity(3);
        let sum = a.add(&eye)?;
        assert_eq!(sum[(0, 0)], 13.0);
        assert_eq!(sum[(0, 1)], -51.0);
        assert_eq!(sum.subtract(&eye)?, a);
        assert_eq!(a.subtract(&a)?.nnz(), 0);
        assert_eq!(a.scale(2.0)[(1, 1)], 334.0);
        assert!(a.add(&SparseMatrix::identity(2)).is_err());

        // a row present only on the right-hand side
        let mut sparse = SparseMatrix::new(3, 3);
        sparse.set(2, 2, 5.0)?;
        let diff = SparseMatrix::new(3, 3).subtract(&sparse)?;
        assert_eq!(diff[(2, 2)], -5.0);
        Ok(())
    }

    #[test]
    fn test_transpose() -> Result<(), SparseError> {
        let a = SparseMatrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])?;
        let at = a.transpose();
        assert_eq!(at.row_count(), 3);
        assert_eq!(at.col_count(), 2);
        assert_eq!(at[(2, 1)], 6.0);
        assert_eq!(at.transpose(), a);
        Ok(())
    }

    #[test]
    fn test_sub_matrix() -> Result<(), SparseError> {
        let a = fixture()?;
        let sub = a.sub_matrix(&[1, 2], &[1, 2])?;
        assert_eq!(sub.row_count(), 2);
        assert_eq!(sub.row_keys(), &[1, 2]);
        assert_eq!(sub.get(1, 1)?, 167.0);
        assert_eq!(sub.get(2, 2)?, -41.0);
        assert!(sub.get(0, 0).is_err());
        assert!(a.sub_matrix(&[3], &[0]).is_err());
        Ok(())
    }

    #[test]
    fn test_identity_with_keys() {
        let eye = SparseMatrix::identity_with_keys(&[2, 5]);
        assert_eq!(eye[(2, 2)], 1.0);
        assert_eq!(eye[(5, 5)], 1.0);
        assert_eq!(eye[(2, 5)], 0.0);
        assert_eq!(eye.nnz(), 2);
    }

    #[test]
    fn test_scale_rows() -> Result<(), SparseError> {
        let a = SparseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
        let w = SparseVector::from_slice(&[2.0, -1.0]);
        let expected = SparseMatrix::from_rows(&[[2.0, 4.0], [-3.0, -4.0]])?;
        assert_eq!(a.scale_rows(&w)?, expected);
        assert_eq!(a.scale_rows_by(&[2.0, -1.0])?, expected);
        assert!(a.scale_rows_by(&[1.0]).is_err());
        Ok(())
    }

    #[test]
    fn test_set_row_and_swap() -> Result<(), SparseError> {
        let mut a = SparseMatrix::new(2, 3);
        a.set_row(0, SparseVector::from_slice(&[1.0, 0.0, 2.0]))?;
        assert_eq!(a[(0, 2)], 2.0);
        assert!(a.set_row(1, SparseVector::new(2)).is_err());

        a.swap_rows(0, 1)?;
        assert_eq!(a[(1, 2)], 2.0);
        assert!(a.row_ref(0).is_none());
        assert_eq!(a.row(0)?.nnz(), 0);
        Ok(())
    }

    #[test]
    fn test_set_row_rekeys_by_position() -> Result<(), SparseError> {
        let mut a = SparseMatrix::from_keys(&[0], &[4, 7], 0.0);
        a.set_row(0, SparseVector::from_slice(&[1.0, 2.0]))?;
        assert_eq!(a.get(0, 4)?, 1.0);
        assert_eq!(a.get(0, 7)?, 2.0);
        Ok(())
    }

    #[test]
    fn test_mixed_key_sets_align_by_position() -> Result<(), SparseError> {
        let mut a = SparseMatrix::from_keys(&[3, 8], &[1, 5], 0.0);
        a.set(3, 1, 1.0)?;
        a.set(8, 5, 2.0)?;
        let b = SparseMatrix::from_rows(&[[1.0, 1.0], [0.0, 2.0]])?;

        let sum = a.add(&b)?;
        assert_eq!(sum.row_keys(), &[3, 8]);
        assert_eq!(sum.col_keys(), &[1, 5]);
        assert_eq!(sum.get(3, 1)?, 2.0);
        assert_eq!(sum.get(3, 5)?, 1.0);
        assert_eq!(sum.get(8, 5)?, 4.0);

        let diff = b.subtract(&a)?;
        assert_eq!(diff.row_keys(), &[0, 1]);
        assert_eq!(diff, SparseMatrix::from_rows(&[[0.0, 1.0], [0.0, 0.0]])?);
        let relabeled = a.rekey(b.row_key_set(), b.col_key_set())?;
        assert_eq!(relabeled.row_keys(), &[0, 1]);
        assert_eq!(a.subtract(&relabeled)?.nnz(), 0);

        let weights = SparseVector::from_slice(&[2.0, -1.0]);
        let scaled = a.scale_rows(&weights)?;
        assert_eq!(scaled.get(3, 1)?, 2.0);
        assert_eq!(scaled.get(8, 5)?, -2.0);
        assert!(a.scale_rows(&SparseVector::new(3)).is_err());
        Ok(())
    }

    #[test]
    fn test_rekey() -> Result<(), SparseError> {
        let a = fixture()?;
        let rows = Arc::new(KeySet::from_keys(&[10, 20, 30]));
        let cols = Arc::new(KeySet::from_keys(&[4, 5, 6]));
        let b = a.rekey(&rows, &cols)?;
        assert_eq!(b.get(20, 5)?, 167.0);
        assert_eq!(b.nnz(), a.nnz());
        assert_eq!(b, a);
        assert!(a.rekey(&Arc::new(KeySet::range(2)), &cols).is_err());
        Ok(())
    }

    #[test]
    fn test_symmetric() -> Result<(), SparseError> {
        let a = SparseMatrix::from_rows(&[
            [25.0, 15.0, -5.0],
            [15.0, 18.0, 0.0],
            [-5.0, 0.0, 11.0],
        ])?;
        assert!(a.is_symmetric());
        assert!(!fixture()?.is_symmetric());
        assert!(!SparseMatrix::new(2, 3).is_symmetric());
        Ok(())
    }

    #[test]
    fn test_random_gram_matrix_is_symmetric() -> Result<(), SparseError> {
        let mut rng = rand::rng();
        let rows = rng.random_range(2..20);
        let cols = rng.random_range(2..20);

        let mut c = SparseMatrix::new(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                if rng.random::<f64>() < 0.2 {
                    c.set(i, j, rng.random::<f64>() * 10.0 - 5.0)?;
                }
            }
        }

        let m = c.multiply(&c.transpose())?;
        assert!(m.is_symmetric());
        Ok(())
    }

    #[test]
    fn test_diagonal_and_display() -> Result<(), SparseError> {
        let a = SparseMatrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])?;
        assert_eq!(a.diagonal(), vec![1.0, 5.0]);
        assert_eq!(a.to_string(), "{1, 2, 3}\n{4, 5, 6}\n");
        Ok(())
    }
}
