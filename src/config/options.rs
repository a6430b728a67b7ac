//! Command-line or API options for a solver run.
//!
//! This module provides the `SolverOptions` struct, which collects the
//! externally configurable parameters of a run (matrix dimension, row-split
//! factor, convergence tolerance, iteration ceiling) and validates them
//! against the size of the process group before any collective is entered.

use crate::error::SolverError;

/// Matrix dimension used when none is given, matching the reference runs.
pub const DEFAULT_MATRIX_SIZE: usize = 1 << 13;

/// Default relative residual tolerance.
pub const DEFAULT_EPSILON: f64 = 1e-5;

/// Solver run parameters as supplied by the caller.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Dimension `n` of the system (`A` is `n x n`).
    pub matrix_size: usize,

    /// Row-partition count; `None` means "use the process-group size".
    pub split_factor: Option<usize>,

    /// Relative residual tolerance for the convergence test.
    pub epsilon: f64,

    /// Iteration ceiling; `None` means `n`, the theoretical CG bound.
    pub max_iters: Option<usize>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            matrix_size: DEFAULT_MATRIX_SIZE,
            split_factor: None,
            epsilon: DEFAULT_EPSILON,
            max_iters: None,
        }
    }
}

/// Options after validation against a concrete group size, with all defaults
/// filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedOptions {
    pub matrix_size: usize,
    pub split_factor: usize,
    pub epsilon: f64,
    pub max_iters: usize,
}

impl SolverOptions {
    /// Validate the options against the actual process-group size.
    ///
    /// Fails before any iteration if the split factor is non-positive, does
    /// not match the group size (the collectives are rank-aligned, so the two
    /// must agree), or the matrix has fewer rows than there are ranks.
    pub fn resolve(&self, group_size: usize) -> Result<ResolvedOptions, SolverError> {
        if group_size == 0 {
            return Err(SolverError::Config("process group is empty".into()));
        }
        if self.matrix_size == 0 {
            return Err(SolverError::Config("matrix size must be positive".into()));
        }
        let split = self.split_factor.unwrap_or(group_size);
        if split == 0 {
            return Err(SolverError::Config("split factor must be positive".into()));
        }
        if split != group_size {
            return Err(SolverError::Config(format!(
                "split factor {split} does not match process-group size {group_size}"
            )));
        }
        if self.matrix_size < split {
            return Err(SolverError::Config(format!(
                "cannot split {} rows across {} ranks",
                self.matrix_size, split
            )));
        }
        if !(self.epsilon > 0.0) {
            return Err(SolverError::Config(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        Ok(ResolvedOptions {
            matrix_size: self.matrix_size,
            split_factor: split,
            epsilon: self.epsilon,
            max_iters: self.max_iters.unwrap_or(self.matrix_size),
        })
    }
}
