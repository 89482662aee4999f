#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `spla-core` provides the two containers the rest of the workspace is built on:
//!
//! - [`SparseVector`]: an ordered key set plus a map of the entries that differ
//!   from a default value.
//! - [`SparseMatrix`]: row and column key sets plus a map from row key to
//!   sparse row vector.
//!
//! Writing the default value to an entry removes it ("zero is absence"), so
//! every operation only visits stored entries. Keys are validated on every
//! access and violations surface as [`SparseError`].
//!
//! # Quick Start
//!
//! ```rust
//! use spla_core::{SparseMatrix, SparseVector};
//!
//! let a = SparseMatrix::from_rows(&[[4.0, 0.0], [0.0, 2.0]]).unwrap();
//! let x = SparseVector::from_slice(&[1.0, 3.0]);
//!
//! let b = a.multiply_vector(&x).unwrap();
//! assert_eq!(b, SparseVector::from_slice(&[4.0, 6.0]));
//! assert_eq!(a.nnz(), 2);
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: enables `Serialize`/`Deserialize` for vectors and matrices.

/// Error types for the sparse containers.
pub mod error;

/// Ordered key sets shared by vectors and matrices.
pub mod keys;

/// Sparse matrix implementation.
pub mod matrix;

/// Sparse vector implementation.
pub mod vector;

#[cfg(feature = "serde")]
mod serde;

pub use crate::error::SparseError;
pub use crate::keys::KeySet;
pub use crate::matrix::SparseMatrix;
pub use crate::vector::SparseVector;

/// Magnitude below which a value is treated as zero: entries this close to the
/// default are not stored, and squared norms at or below it count as empty.
pub const SPARSE_EPSILON: f64 = 1e-20;

/// Elementwise tolerance used by vector and matrix equality.
pub const EQUALITY_TOLERANCE: f64 = 1e-10;
