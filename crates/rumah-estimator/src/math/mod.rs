//! Small ndarray-like types used throughout the crate.
//!
//! `Array2` (2D, row-major) and `Array1` (1D) carry feature matrices and
//! target/prediction vectors. They are intentionally minimal and
//! serde-serializable so fitted models can be cached as-is.
pub mod matrix;
pub mod vector;

pub use matrix::{Array2, ShapeError};
pub use vector::Array1;
