//! Deterministic test system: strictly diagonally dominant, hence SPD.

use faer::Mat;

/// The dense system `A x = b` the solver is exercised on.
///
/// `A` has `2` on the diagonal and `1` everywhere else, and `b` is constant
/// `n + 1`, so `A · [1, …, 1] = b` and the exact solution is the all-ones
/// vector. The initial guess is zero. Construction is deterministic in `n`.
#[derive(Debug, Clone)]
pub struct Problem {
    pub a: Mat<f64>,
    pub b: Vec<f64>,
    pub x0: Vec<f64>,
}

impl Problem {
    pub fn new(n: usize) -> Self {
        let a = Mat::from_fn(n, n, |i, j| if i == j { 2.0 } else { 1.0 });
        let b = vec![n as f64 + 1.0; n];
        let x0 = vec![0.0; n];
        Self { a, b, x0 }
    }
}
