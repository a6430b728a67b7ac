//! Dense storage on top of Faer, plus the row-block slice each rank works on.

use faer::Mat;

use crate::core::traits::{MatVec, Operator};
use crate::error::SolverError;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Flatten a Faer matrix into row-major order, the wire format used when
/// scattering row blocks.
pub fn to_row_major(a: &Mat<f64>) -> Vec<f64> {
    let (nrows, ncols) = (a.nrows(), a.ncols());
    let mut out = Vec::with_capacity(nrows * ncols);
    for i in 0..nrows {
        for j in 0..ncols {
            out.push(a[(i, j)]);
        }
    }
    out
}

/// A contiguous block of matrix rows owned by one rank, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RowBlock {
    first_row: usize,
    ncols: usize,
    data: Vec<f64>,
}

impl RowBlock {
    /// Wrap a row-major buffer holding whole rows starting at `first_row`.
    pub fn from_row_major(first_row: usize, ncols: usize, data: Vec<f64>) -> Self {
        assert!(ncols > 0 && data.len() % ncols == 0, "buffer must hold whole rows");
        Self { first_row, ncols, data }
    }

    /// Index of the first matrix row held by this block.
    pub fn first_row(&self) -> usize {
        self.first_row
    }

    pub fn nrows(&self) -> usize {
        self.data.len() / self.ncols
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// The `i`-th row of the block (local index).
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.ncols..(i + 1) * self.ncols]
    }
}

impl MatVec<f64> for RowBlock {
    /// y ← block · x, where `y` has one entry per block row.
    fn matvec(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.ncols);
        assert_eq!(y.len(), self.nrows());
        #[cfg(feature = "rayon")]
        y.par_iter_mut().enumerate().for_each(|(i, yi)| {
            *yi = self.row(i).iter().zip(x).map(|(&a, &b)| a * b).sum();
        });
        #[cfg(not(feature = "rayon"))]
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = self.row(i).iter().zip(x).map(|(&a, &b)| a * b).sum();
        }
    }
}

/// Serial whole-matrix operator, used for single-process runs and as the
/// reference the distributed product is checked against.
#[derive(Debug, Clone)]
pub struct DenseMatVec {
    a: Mat<f64>,
}

impl DenseMatVec {
    pub fn new(a: Mat<f64>) -> Result<Self, SolverError> {
        if a.nrows() != a.ncols() {
            return Err(SolverError::Dimension(format!(
                "operator must be square, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }
        Ok(Self { a })
    }

    pub fn matrix(&self) -> &Mat<f64> {
        &self.a
    }
}

impl Operator for DenseMatVec {
    fn dim(&self) -> usize {
        self.a.nrows()
    }

    fn apply(&mut self, x: &[f64], y: &mut [f64]) -> Result<(), SolverError> {
        if x.len() != self.dim() || y.len() != self.dim() {
            return Err(SolverError::Dimension(format!(
                "operator dim {} vs vectors {} / {}",
                self.dim(),
                x.len(),
                y.len()
            )));
        }
        for i in 0..self.a.nrows() {
            y[i] = (0..self.a.ncols()).map(|j| self.a[(i, j)] * x[j]).sum();
        }
        Ok(())
    }
}
