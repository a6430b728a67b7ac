//! Solver interfaces.

use crate::core::traits::Operator;
use crate::error::SolverError;
use crate::utils::convergence::SolveStats;

/// Common interface for solvers of A·x = b.
pub trait LinearSolver<M: Operator + ?Sized> {
    /// Solve A·x = b, writing the result into `x`.
    /// Returns iteration stats (including the terminal state).
    fn solve(&mut self, a: &mut M, b: &[f64], x: &mut [f64])
    -> Result<SolveStats<f64>, SolverError>;
}

pub mod cg;
pub use cg::CgSolver;
