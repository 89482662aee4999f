#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! Re-exports the containers and the algorithms under one name.

#[doc(inline)]
pub use spla_core as core;

#[doc(inline)]
pub use spla_linalg as linalg;
