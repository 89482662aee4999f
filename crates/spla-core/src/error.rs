/// An error type for sparse vector and matrix operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SparseError {
    /// The index is not part of the vector's key set.
    #[error("Index {index} is not a key of the vector (dimension {dimension})")]
    IndexOutOfBounds {
        /// The key that was requested.
        index: usize,
        /// The dimension of the vector.
        dimension: usize,
    },

    /// The row key is not part of the matrix's row key set.
    #[error("Row {row} is not a row key of the matrix ({rows} rows)")]
    RowOutOfBounds {
        /// The row key that was requested.
        row: usize,
        /// The number of rows of the matrix.
        rows: usize,
    },

    /// The column key is not part of the matrix's column key set.
    #[error("Column {col} is not a column key of the matrix ({cols} columns)")]
    ColumnOutOfBounds {
        /// The column key that was requested.
        col: usize,
        /// The number of columns of the matrix.
        cols: usize,
    },

    /// The operands of an operation have incompatible shapes.
    #[error("Dimension mismatch in {operation}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Name of the operation that failed.
        operation: &'static str,
        /// The dimension required by the left operand.
        expected: usize,
        /// The dimension of the right operand.
        actual: usize,
    },

    /// A dense input has rows of unequal length.
    #[error("Row {row} has {actual} columns, expected {expected}")]
    RaggedRows {
        /// The offending row position.
        row: usize,
        /// The length of the first row.
        expected: usize,
        /// The length of the offending row.
        actual: usize,
    },

    /// The input has no rows or no columns.
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),
}

impl SparseError {
    /// Creates a `DimensionMismatch` error for the given operation.
    pub fn mismatch(operation: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            operation,
            expected,
            actual,
        }
    }
}
