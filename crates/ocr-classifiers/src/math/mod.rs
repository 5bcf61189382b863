//! Small ndarray-like types used throughout the crate.
//!
//! `Array2` backs the row datasets and the confusion matrix, `Array1` backs
//! output vectors. Both stay dependency-free apart from `num-traits`.
pub mod matrix;
pub mod vector;

pub use matrix::{Array2, ShapeError};
pub use vector::Array1;
