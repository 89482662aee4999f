use spla_core::{SparseMatrix, SparseVector};

use crate::elimination::reduce_tracked;
use crate::error::LinalgError;

/// The space spanned by the rows of a matrix, described through its echelon form.
#[derive(Debug, Clone)]
pub struct RowSpace {
    echelon: SparseMatrix,
    transform: SparseMatrix,
}

impl RowSpace {
    /// Reduces `a` to echelon form, keeping the accumulated row operations.
    pub fn new(a: &SparseMatrix) -> Result<Self, LinalgError> {
        let (echelon, transform, _) = reduce_tracked(a)?;
        Ok(Self { echelon, transform })
    }

    /// The echelon form of the matrix.
    pub fn echelon(&self) -> &SparseMatrix {
        &self.echelon
    }

    /// The row operations `M` with `M * A == echelon`.
    pub fn transform(&self) -> &SparseMatrix {
        &self.transform
    }

    fn leading_rows(&self) -> impl Iterator<Item = SparseVector> + '_ {
        self.echelon
            .row_keys()
            .iter()
            .map(|&r| self.echelon.row(r))
            .map_while(Result::ok)
            .take_while(|row| !row.is_empty())
    }

    /// The non-empty leading rows of the echelon form, a basis of the row space.
    pub fn basis(&self) -> Vec<SparseVector> {
        self.leading_rows().collect()
    }

    /// The rows of `M` whose echelon row vanished.
    ///
    /// Each such row `y` satisfies `y^T * A == 0`, so together they span the
    /// null space of `A^T` (the left null space of `A`).
    pub fn null_basis(&self) -> Result<Vec<SparseVector>, LinalgError> {
        let mut basis = Vec::new();
        for &r in self.echelon.row_keys() {
            if self.echelon.row(r)?.is_empty() {
                basis.push(self.transform.row(r)?);
            }
        }
        Ok(basis)
    }

    /// The dimension of the row space.
    pub fn rank(&self) -> usize {
        self.leading_rows().count()
    }

    /// `cols - rank`, the dimension of the null space of `A`.
    pub fn nullity(&self) -> usize {
        self.echelon.col_count() - self.rank()
    }
}

/// The linear function `f(x) = A * x`.
#[derive(Debug, Clone)]
pub struct LinearFunction {
    row_space: RowSpace,
}

impl LinearFunction {
    /// Creates the linear function given by `a`.
    pub fn new(a: &SparseMatrix) -> Result<Self, LinalgError> {
        Ok(Self {
            row_space: RowSpace::new(a)?,
        })
    }

    /// The row space of the underlying matrix.
    pub fn row_space(&self) -> &RowSpace {
        &self.row_space
    }

    /// The vectors obtained from the vanished echelon rows, see [`RowSpace::null_basis`].
    pub fn kernel_basis(&self) -> Result<Vec<SparseVector>, LinalgError> {
        self.row_space.null_basis()
    }

    /// The dimension of the kernel, by rank-nullity.
    pub fn kernel_dimension(&self) -> usize {
        self.row_space.nullity()
    }
}
