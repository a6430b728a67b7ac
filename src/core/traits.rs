//! Core linear-algebra traits for parcg.

use crate::error::SolverError;

/// Local matrix–vector product: y ← A x. Infallible, no communication.
pub trait MatVec<T> {
    /// Compute y = A · x.
    fn matvec(&self, x: &[T], y: &mut [T]);
}

/// Fallible application of a square operator, the seam between the CG
/// recurrence and the distributed product (which can surface communication
/// failures).
pub trait Operator {
    /// Dimension `n` of the operator.
    fn dim(&self) -> usize;

    /// Compute y = A · x, where `x` and `y` have length `dim()`.
    fn apply(&mut self, x: &[f64], y: &mut [f64]) -> Result<(), SolverError>;
}

/// Compute dot(x, y).
///
/// In the distributed iteration this runs redundantly and identically on
/// every rank over fully replicated vectors; there is no reduction here.
pub fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(&a, &b)| a * b).sum()
}

/// Compute ‖x‖₂.
pub fn norm2(x: &[f64]) -> f64 {
    dot(x, x).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn dot_and_norm() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![4.0, -5.0, 6.0];
        assert_abs_diff_eq!(dot(&x, &y), 4.0 - 10.0 + 18.0, epsilon = 1e-12);
        let expected_norm = (1.0f64 + 4.0 + 9.0).sqrt();
        assert_abs_diff_eq!(norm2(&x), expected_norm, epsilon = 1e-12);
    }
}
