//! Conjugate Gradient (unpreconditioned) per Saad §6.1.
//!
//! In a distributed run every rank executes this recurrence redundantly on
//! fully replicated vectors; the only communicating step is the operator
//! application. The dot products and norms below must stay local — replacing
//! them with a reduction on one rank would break the replication invariant
//! the operator's contract establishes.

use crate::core::traits::{Operator, dot, norm2};
use crate::error::SolverError;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, SolveStats, Termination};

pub struct CgSolver {
    pub conv: Convergence<f64>,
}

impl CgSolver {
    pub fn new(tol: f64, max_iters: usize) -> Self {
        Self { conv: Convergence { tol, max_iters } }
    }
}

impl<M: Operator + ?Sized> LinearSolver<M> for CgSolver {
    fn solve(
        &mut self,
        a: &mut M,
        b: &[f64],
        x: &mut [f64],
    ) -> Result<SolveStats<f64>, SolverError> {
        let n = a.dim();
        if b.len() != n || x.len() != n {
            return Err(SolverError::Dimension(format!(
                "operator dim {n} vs b {} / x {}",
                b.len(),
                x.len()
            )));
        }
        let b_norm = norm2(b);
        if b_norm == 0.0 {
            x.fill(0.0);
            return Ok(SolveStats {
                iterations: 0,
                final_residual: 0.0,
                termination: Termination::Converged,
            });
        }

        // r0 = b - A x0
        let mut ax = vec![0.0; n];
        a.apply(x, &mut ax)?;
        let mut r: Vec<f64> = b.iter().zip(&ax).map(|(&bi, &axi)| bi - axi).collect();
        let mut p = r.clone();
        let mut rsq = dot(&r, &r);
        if let Some(termination) = self.conv.check(rsq.sqrt(), b_norm, 0) {
            return Ok(SolveStats {
                iterations: 0,
                final_residual: rsq.sqrt() / b_norm,
                termination,
            });
        }

        let mut ap = vec![0.0; n];
        for i in 1..=self.conv.max_iters {
            a.apply(&p, &mut ap)?;
            let alpha = rsq / dot(&p, &ap);
            for (xj, pj) in x.iter_mut().zip(&p) {
                *xj += alpha * pj;
            }
            for (rj, apj) in r.iter_mut().zip(&ap) {
                *rj -= alpha * apj;
            }
            let rsq_new = dot(&r, &r);
            let res_norm = rsq_new.sqrt();
            if let Some(termination) = self.conv.check(res_norm, b_norm, i) {
                return Ok(SolveStats {
                    iterations: i,
                    final_residual: res_norm / b_norm,
                    termination,
                });
            }
            let beta = rsq_new / rsq;
            for (pj, rj) in p.iter_mut().zip(&r) {
                *pj = rj + beta * *pj;
            }
            rsq = rsq_new;
        }

        // check() fires at i == max_iters, so the loop always returns; this
        // only covers max_iters == 0
        Ok(SolveStats {
            iterations: 0,
            final_residual: rsq.sqrt() / b_norm,
            termination: Termination::MaxIterationsReached,
        })
    }
}
