//! Core traits and vector kernels.

pub mod traits;
pub use traits::{MatVec, Operator, dot, norm2};
