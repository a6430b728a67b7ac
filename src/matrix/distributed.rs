//! Distributed dense matrix-vector product over the collective layer.

use faer::Mat;

use crate::core::traits::{MatVec, Operator};
use crate::error::SolverError;
use crate::matrix::dense::{RowBlock, to_row_major};
use crate::parallel::Comm;
use crate::partition::RowPartition;

/// Applies the full system matrix through one round of collectives per call.
///
/// The canonical matrix lives on `root` only; everyone else passes `None` at
/// construction. Each `apply` performs, in lock-step on every rank:
///
/// 1. broadcast of the input vector from `root` (the canonical copy wins even
///    if a replica drifted),
/// 2. scatter of the matrix rows per the partition plan,
/// 3. the purely local product of the rank's row block,
/// 4. gather of the fragments at `root` in ascending rank order,
/// 5. broadcast of the assembled result.
///
/// Contract: every rank must enter `apply` with a vector the group already
/// agrees on, and every rank returns holding an identical full-length result.
/// The CG recurrence depends on this replication guarantee; do not shortcut
/// it by computing on `root` alone.
pub struct DistributedMatVec<'a, C: Comm> {
    comm: &'a C,
    plan: RowPartition,
    root: usize,
    rows: Option<Vec<f64>>,
}

impl<'a, C: Comm> DistributedMatVec<'a, C> {
    /// Build the operator for one rank of the group.
    ///
    /// `a` must be `Some` exactly on `root` and match the plan's dimension.
    pub fn new(
        comm: &'a C,
        plan: RowPartition,
        root: usize,
        a: Option<&Mat<f64>>,
    ) -> Result<Self, SolverError> {
        if root >= comm.size() {
            return Err(SolverError::Config(format!(
                "root rank {root} outside group of {}",
                comm.size()
            )));
        }
        if plan.ranks() != comm.size() {
            return Err(SolverError::Config(format!(
                "partition plans {} ranks but group has {}",
                plan.ranks(),
                comm.size()
            )));
        }
        let n = plan.num_rows();
        let rows = match (comm.rank() == root, a) {
            (true, Some(a)) => {
                if a.nrows() != n || a.ncols() != n {
                    return Err(SolverError::Dimension(format!(
                        "matrix is {}x{}, plan covers {n} rows",
                        a.nrows(),
                        a.ncols()
                    )));
                }
                Some(to_row_major(a))
            }
            (true, None) => {
                return Err(SolverError::Config(
                    "coordinator must hold the canonical matrix".into(),
                ));
            }
            (false, Some(_)) => {
                return Err(SolverError::Config(
                    "only the coordinator may hold the canonical matrix".into(),
                ));
            }
            (false, None) => None,
        };
        Ok(Self { comm, plan, root, rows })
    }

    pub fn plan(&self) -> &RowPartition {
        &self.plan
    }
}

impl<C: Comm> Operator for DistributedMatVec<'_, C> {
    fn dim(&self) -> usize {
        self.plan.num_rows()
    }

    fn apply(&mut self, x: &[f64], y: &mut [f64]) -> Result<(), SolverError> {
        let n = self.dim();
        if x.len() != n || y.len() != n {
            return Err(SolverError::Dimension(format!(
                "operator dim {n} vs vectors {} / {}",
                x.len(),
                y.len()
            )));
        }
        let mut v = x.to_vec();
        self.comm.broadcast(&mut v, self.root)?;
        let block: RowBlock =
            self.comm
                .scatter_rows(self.rows.as_deref(), &self.plan, self.root)?;
        let mut local = vec![0.0; block.nrows()];
        block.matvec(&v, &mut local);
        let gathered = self.comm.gather_rows(&local, &self.plan, self.root)?;
        let mut full = gathered.unwrap_or_else(|| vec![0.0; n]);
        self.comm.broadcast(&mut full, self.root)?;
        y.copy_from_slice(&full);
        Ok(())
    }
}
