//! Row partitioning of the system matrix across the process group.

use std::ops::Range;

use crate::error::SolverError;

/// Assignment of contiguous row ranges to ranks.
///
/// Ranges are pairwise disjoint, ascending, and cover `[0, n)` exactly. When
/// the rank count does not divide `n`, the first `n % w` ranks receive one
/// extra row, so block sizes differ by at most one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPartition {
    n: usize,
    counts: Vec<usize>,
}

impl RowPartition {
    /// Plan the partition of `n` rows across `ranks` participants.
    pub fn new(n: usize, ranks: usize) -> Result<Self, SolverError> {
        if ranks == 0 {
            return Err(SolverError::Config("rank count must be positive".into()));
        }
        if n < ranks {
            return Err(SolverError::Config(format!(
                "cannot split {n} rows across {ranks} ranks"
            )));
        }
        let base = n / ranks;
        let extra = n % ranks;
        let counts = (0..ranks).map(|r| base + usize::from(r < extra)).collect();
        Ok(Self { n, counts })
    }

    /// Total number of rows covered by the plan.
    pub fn num_rows(&self) -> usize {
        self.n
    }

    /// Number of participating ranks.
    pub fn ranks(&self) -> usize {
        self.counts.len()
    }

    /// Rows owned by `rank`.
    pub fn count(&self, rank: usize) -> usize {
        self.counts[rank]
    }

    /// Row counts per rank, in rank order.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Starting row of each rank's block, in rank order.
    pub fn displacements(&self) -> Vec<usize> {
        let mut displs = Vec::with_capacity(self.counts.len());
        let mut off = 0;
        for &c in &self.counts {
            displs.push(off);
            off += c;
        }
        displs
    }

    /// Half-open row range `[start, end)` owned by `rank`.
    pub fn range(&self, rank: usize) -> Range<usize> {
        let start: usize = self.counts[..rank].iter().sum();
        start..start + self.counts[rank]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(plan: &RowPartition) {
        let mut next = 0;
        for r in 0..plan.ranks() {
            let range = plan.range(r);
            assert_eq!(range.start, next, "ranges must be contiguous");
            assert_eq!(range.len(), plan.count(r));
            next = range.end;
        }
        assert_eq!(next, plan.num_rows(), "ranges must end at n");
    }

    #[test]
    fn even_split() {
        let plan = RowPartition::new(12, 4).unwrap();
        assert_eq!(plan.counts(), &[3, 3, 3, 3]);
        assert_covers(&plan);
    }

    #[test]
    fn uneven_split_spreads_remainder_over_leading_ranks() {
        let plan = RowPartition::new(10, 3).unwrap();
        assert_eq!(plan.counts(), &[4, 3, 3]);
        assert_covers(&plan);
        let max = plan.counts().iter().max().unwrap();
        let min = plan.counts().iter().min().unwrap();
        assert!(max - min <= 1);
    }

    #[test]
    fn single_rank_owns_everything() {
        let plan = RowPartition::new(7, 1).unwrap();
        assert_eq!(plan.range(0), 0..7);
        assert_covers(&plan);
    }

    #[test]
    fn displacements_match_ranges() {
        let plan = RowPartition::new(11, 4).unwrap();
        let displs = plan.displacements();
        for r in 0..plan.ranks() {
            assert_eq!(displs[r], plan.range(r).start);
        }
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(RowPartition::new(8, 0).is_err());
        assert!(RowPartition::new(3, 4).is_err());
    }
}
