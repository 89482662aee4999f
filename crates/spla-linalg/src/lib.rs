#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! Every algorithm takes its inputs by reference and returns freshly built
//! matrices and vectors keyed like the input:
//!
//! - [`orthogonalization`]: classical Gram-Schmidt and orthogonal complements.
//! - [`elimination`]: Gaussian elimination to echelon form and determinants.
//! - [`row_space`] and [`vector_space`]: rank, nullity and null space bases.
//! - [`cholesky`], [`qr`], [`qr_algorithm`] and [`svd`]: the factorizations.
//! - [`substitution`] and [`solvers`]: triangular solves and the
//!   [`solvers::LinearSolver`] front-ends built on the factorizations.
//!
//! # Example
//!
//! ```rust
//! use spla_core::{SparseMatrix, SparseVector};
//! use spla_linalg::solvers::{CholeskySolver, LinearSolver};
//!
//! let a = SparseMatrix::from_rows(&[[25.0, 15.0, -5.0], [15.0, 18.0, 0.0], [-5.0, 0.0, 11.0]])
//!     .unwrap();
//! let x = SparseVector::from_slice(&[2.0, 4.0, 1.0]);
//! let b = a.multiply_vector(&x).unwrap();
//!
//! assert_eq!(CholeskySolver.solve(&a, &b).unwrap(), x);
//! ```

/// Cholesky factorization.
pub mod cholesky;

/// Gaussian elimination.
pub mod elimination;

/// Error types for the algorithms.
pub mod error;

/// Gram-Schmidt orthogonalization.
pub mod orthogonalization;

/// QR decomposition.
pub mod qr;

/// Symmetric eigendecomposition with the QR algorithm.
pub mod qr_algorithm;

/// Row space and linear function analysis.
pub mod row_space;

/// Linear system solvers.
pub mod solvers;

/// Triangular system solves.
pub mod substitution;

/// Singular value decomposition.
pub mod svd;

/// Vector spaces and null spaces.
pub mod vector_space;

pub use crate::error::LinalgError;
