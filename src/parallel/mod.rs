//! Collective communication over a fixed, rank-addressed process group.

use crate::error::SolverError;
use crate::matrix::dense::RowBlock;
use crate::partition::RowPartition;

/// Collective operations over a fixed group of `size()` participants.
///
/// Every operation is a strict rendezvous: all ranks must reach the same call
/// in the same order before any of them proceeds. A rank that branches onto a
/// different call sequence stalls the whole group; backends are expected to
/// bound the wait and surface `SolverError::CollectiveTimeout` rather than
/// hang forever.
pub trait Comm {
    /// This participant's rank within `0..size()`.
    fn rank(&self) -> usize;

    /// Number of participants in the group.
    fn size(&self) -> usize;

    /// Block until every participant has arrived.
    fn barrier(&self) -> Result<(), SolverError>;

    /// After return, every rank's `buf` equals `root`'s `buf`.
    fn broadcast(&self, buf: &mut [f64], root: usize) -> Result<(), SolverError>;

    /// Distribute row blocks of a row-major matrix held by `root`.
    ///
    /// Only `root` supplies `rows` (the full `n * n` buffer); every rank,
    /// including `root`, receives exactly the block the plan assigns to its
    /// own rank.
    fn scatter_rows(
        &self,
        rows: Option<&[f64]>,
        plan: &RowPartition,
        root: usize,
    ) -> Result<RowBlock, SolverError>;

    /// Inverse of `scatter_rows`: every rank contributes its fragment and
    /// `root` receives the concatenation in ascending rank order. Non-root
    /// ranks receive `None`.
    fn gather_rows(
        &self,
        local: &[f64],
        plan: &RowPartition,
        root: usize,
    ) -> Result<Option<Vec<f64>>, SolverError>;

    /// Wall-clock seconds from a reference point shared by the whole group.
    fn wtime(&self) -> f64;
}

pub mod thread_comm;
pub use thread_comm::ThreadComm;

#[cfg(feature = "mpi")]
pub mod mpi_comm;
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiComm;
