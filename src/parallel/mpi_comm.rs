//! MPI-backed process group.
//!
//! Implements the `Comm` trait over the MPI world communicator, available when
//! the `mpi` feature is enabled. Uneven row partitions map onto the varcount
//! scatter/gather collectives; rank ordering of the gathered fragments is the
//! MPI guarantee the reassembled vector relies on.
//!
//! The MPI runtime owns liveness: a participant missing from a collective
//! blocks the group, so the launching harness is expected to impose a
//! job-level deadline.

use mpi::datatype::{Partition, PartitionMut};
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use crate::error::SolverError;
use crate::matrix::dense::RowBlock;
use crate::partition::RowPartition;

/// MPI communicator wrapper for distributed runs.
pub struct MpiComm {
    /// The MPI world communicator (all processes in the job).
    pub world: SimpleCommunicator,
    /// The rank of this process within the communicator.
    pub rank: usize,
    /// The total number of processes in the communicator.
    pub size: usize,
}

impl MpiComm {
    /// Initializes MPI and constructs a new `MpiComm` instance.
    ///
    /// # Panics
    /// Panics if MPI initialization fails.
    pub fn new() -> Self {
        let universe = mpi::initialize().unwrap();
        let world = universe.world();
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        MpiComm { world, rank, size }
    }

    fn element_counts(plan: &RowPartition, ncols: usize) -> (Vec<i32>, Vec<i32>) {
        let counts: Vec<i32> = plan.counts().iter().map(|&c| (c * ncols) as i32).collect();
        let displs: Vec<i32> = plan
            .displacements()
            .iter()
            .map(|&d| (d * ncols) as i32)
            .collect();
        (counts, displs)
    }
}

impl super::Comm for MpiComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) -> Result<(), SolverError> {
        self.world.barrier();
        Ok(())
    }

    fn broadcast(&self, buf: &mut [f64], root: usize) -> Result<(), SolverError> {
        self.world.process_at_rank(root as i32).broadcast_into(buf);
        Ok(())
    }

    fn scatter_rows(
        &self,
        rows: Option<&[f64]>,
        plan: &RowPartition,
        root: usize,
    ) -> Result<RowBlock, SolverError> {
        let ncols = plan.num_rows();
        let range = plan.range(self.rank);
        let mut local = vec![0.0f64; range.len() * ncols];
        let root_process = self.world.process_at_rank(root as i32);
        if self.rank == root {
            let rows = rows.ok_or_else(|| {
                SolverError::Dimension("scatter source holds no matrix".into())
            })?;
            if rows.len() != ncols * ncols {
                return Err(SolverError::Dimension(format!(
                    "scatter source has {} elements, expected {}",
                    rows.len(),
                    ncols * ncols
                )));
            }
            let (counts, displs) = Self::element_counts(plan, ncols);
            let partition = Partition::new(rows, &counts[..], &displs[..]);
            root_process.scatter_varcount_into_root(&partition, &mut local[..]);
        } else {
            root_process.scatter_varcount_into(&mut local[..]);
        }
        Ok(RowBlock::from_row_major(range.start, ncols, local))
    }

    fn gather_rows(
        &self,
        local: &[f64],
        plan: &RowPartition,
        root: usize,
    ) -> Result<Option<Vec<f64>>, SolverError> {
        if local.len() != plan.count(self.rank) {
            return Err(SolverError::Dimension(format!(
                "gather fragment has {} elements, plan assigns {} to rank {}",
                local.len(),
                plan.count(self.rank),
                self.rank
            )));
        }
        let root_process = self.world.process_at_rank(root as i32);
        if self.rank == root {
            let mut full = vec![0.0f64; plan.num_rows()];
            let (counts, displs) = Self::element_counts(plan, 1);
            {
                let mut partition = PartitionMut::new(&mut full[..], &counts[..], &displs[..]);
                root_process.gather_varcount_into_root(local, &mut partition);
            }
            Ok(Some(full))
        } else {
            root_process.gather_varcount_into(local);
            Ok(None)
        }
    }

    fn wtime(&self) -> f64 {
        mpi::time()
    }
}
