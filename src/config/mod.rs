//! Run configuration.

pub mod options;
pub use options::{DEFAULT_EPSILON, DEFAULT_MATRIX_SIZE, ResolvedOptions, SolverOptions};
