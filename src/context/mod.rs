//! Per-rank run context and the SPMD driver.
//!
//! `solve_distributed` is entered by every rank of the group with identical
//! options; the ranks stay in lock-step through the collectives inside the
//! operator. Rank 0 (the coordinator) is the only asymmetry: it materializes
//! the canonical system, owns the timing measurement, and is the rank whose
//! `RunReport` is meant to be printed.

use log::{debug, warn};

use crate::config::SolverOptions;
use crate::error::SolverError;
use crate::matrix::distributed::DistributedMatVec;
use crate::matrix::problem::Problem;
use crate::parallel::Comm;
use crate::partition::RowPartition;
use crate::solver::{CgSolver, LinearSolver};
use crate::utils::convergence::Termination;

/// The designated coordinator/reporter rank.
pub const COORDINATOR: usize = 0;

/// Explicit identity of one participant, passed instead of ambient globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerContext {
    pub rank: usize,
    pub group_size: usize,
}

impl WorkerContext {
    pub fn from_comm<C: Comm>(comm: &C) -> Self {
        Self { rank: comm.rank(), group_size: comm.size() }
    }

    pub fn is_coordinator(&self) -> bool {
        self.rank == COORDINATOR
    }
}

/// Figures reported once, by the coordinator, after the run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub workers: usize,
    pub split_factor: usize,
    pub elapsed_seconds: f64,
    pub iterations: usize,
    pub termination: Termination,
    pub final_residual: f64,
    pub solution: Vec<f64>,
}

/// SPMD entry point; every rank of the group must call this with the same
/// options, or the group deadlocks inside the first collective.
pub fn solve_distributed<C: Comm>(
    comm: &C,
    options: &SolverOptions,
) -> Result<RunReport, SolverError> {
    let ctx = WorkerContext::from_comm(comm);
    let resolved = options.resolve(ctx.group_size)?;
    let n = resolved.matrix_size;
    let plan = RowPartition::new(n, resolved.split_factor)?;
    debug!(
        "rank {}/{}: n={n}, rows {:?}",
        ctx.rank,
        ctx.group_size,
        plan.range(ctx.rank)
    );

    let start = comm.wtime();

    // The coordinator holds the canonical data; b and x0 are replicated by
    // broadcast so every rank starts from the same vectors.
    let (a, mut b, mut x) = if ctx.is_coordinator() {
        let problem = Problem::new(n);
        (Some(problem.a), problem.b, problem.x0)
    } else {
        (None, vec![0.0; n], vec![0.0; n])
    };
    comm.broadcast(&mut b, COORDINATOR)?;
    comm.broadcast(&mut x, COORDINATOR)?;

    let mut op = DistributedMatVec::new(comm, plan, COORDINATOR, a.as_ref())?;
    let mut solver = CgSolver::new(resolved.epsilon, resolved.max_iters);
    let stats = solver.solve(&mut op, &b, &mut x)?;
    let elapsed = comm.wtime() - start;

    if ctx.is_coordinator() && !stats.converged() {
        warn!(
            "no convergence after {} iterations, relative residual {:e}",
            stats.iterations, stats.final_residual
        );
    }

    Ok(RunReport {
        workers: ctx.group_size,
        split_factor: resolved.split_factor,
        elapsed_seconds: elapsed,
        iterations: stats.iterations,
        termination: stats.termination,
        final_residual: stats.final_residual,
        solution: x,
    })
}

/// Plain-text report, one line per field, as emitted by the coordinator.
pub fn print_report(report: &RunReport) {
    println!("workers: {}", report.workers);
    println!("split factor: {}", report.split_factor);
    println!("time: {:.6} s", report.elapsed_seconds);
    println!("iterations: {}", report.iterations);
}
