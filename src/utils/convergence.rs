//! Convergence tracking & tolerance checks for the CG iteration.

/// How an iteration ended.
///
/// Hitting the ceiling is a distinct terminal state, not a failure: callers
/// can tell "solved" from "gave up" without treating the latter as a crash.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The relative residual dropped below the tolerance.
    Converged,
    /// The iteration ceiling was reached first.
    MaxIterationsReached,
}

/// Stopping criteria.
pub struct Convergence<T> {
    /// Relative residual tolerance, tested as `‖r‖₂ / ‖b‖₂ <= tol`.
    pub tol: T,
    /// Iteration ceiling.
    pub max_iters: usize,
}

#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    /// Relative residual `‖r‖₂ / ‖b‖₂` at termination.
    pub final_residual: T,
    pub termination: Termination,
}

impl<T> SolveStats<T> {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }
}

impl<T: Copy + num_traits::Float> Convergence<T> {
    /// Decide whether to stop given `‖r‖₂`, the reference norm `‖b‖₂`, and
    /// the iteration count `i`. Returns `None` to continue iterating.
    pub fn check(&self, res_norm: T, ref_norm: T, i: usize) -> Option<Termination> {
        if res_norm / ref_norm <= self.tol {
            Some(Termination::Converged)
        } else if i >= self.max_iters {
            Some(Termination::MaxIterationsReached)
        } else {
            None
        }
    }
}
