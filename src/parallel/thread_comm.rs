//! Thread-backed process group for single-machine runs and tests.
//!
//! Each participant runs on its own OS thread and the collectives rendezvous
//! through shared slots guarded by a mutex and condvar. Every wait carries a
//! deadline, so a participant that never reaches a collective turns into a
//! `CollectiveTimeout` on the ranks that did arrive instead of a silent hang.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::SolverError;
use crate::matrix::dense::RowBlock;
use crate::partition::RowPartition;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One participant's handle onto an in-process group.
pub struct ThreadComm {
    rank: usize,
    shared: Arc<Shared>,
}

struct Shared {
    size: usize,
    timeout: Duration,
    start: Instant,
    state: Mutex<GroupState>,
    cv: Condvar,
}

struct GroupState {
    // sense-free barrier: generation bumps when the last participant arrives
    arrived: usize,
    generation: u64,
    // single-producer payload for broadcast and scatter
    slot: Option<Arc<Vec<f64>>>,
    // per-rank fragments for gather
    parts: Vec<Option<Vec<f64>>>,
}

impl ThreadComm {
    /// Create a group of `size` connected handles, one per rank.
    pub fn group(size: usize) -> Vec<ThreadComm> {
        Self::group_with_timeout(size, DEFAULT_TIMEOUT)
    }

    /// Like `group`, with an explicit collective deadline.
    pub fn group_with_timeout(size: usize, timeout: Duration) -> Vec<ThreadComm> {
        assert!(size > 0, "group must have at least one rank");
        let shared = Arc::new(Shared {
            size,
            timeout,
            start: Instant::now(),
            state: Mutex::new(GroupState {
                arrived: 0,
                generation: 0,
                slot: None,
                parts: vec![None; size],
            }),
            cv: Condvar::new(),
        });
        (0..size)
            .map(|rank| ThreadComm { rank, shared: Arc::clone(&shared) })
            .collect()
    }

    /// Wait until all ranks arrive; the last arriver runs `on_complete` under
    /// the lock before releasing the group, so slot bookkeeping cannot race
    /// with the next collective.
    fn rendezvous<F>(&self, op: &'static str, on_complete: F) -> Result<(), SolverError>
    where
        F: FnOnce(&mut GroupState),
    {
        let entered = Instant::now();
        let mut st = self.shared.state.lock().unwrap();
        let generation = st.generation;
        st.arrived += 1;
        if st.arrived == self.shared.size {
            on_complete(&mut st);
            st.arrived = 0;
            st.generation = st.generation.wrapping_add(1);
            self.shared.cv.notify_all();
            return Ok(());
        }
        let deadline = entered + self.shared.timeout;
        while st.generation == generation {
            let now = Instant::now();
            if now >= deadline {
                // withdraw so a late arriver does not complete a torn barrier
                st.arrived -= 1;
                return Err(SolverError::CollectiveTimeout {
                    op,
                    rank: self.rank,
                    waited_ms: entered.elapsed().as_millis() as u64,
                });
            }
            let (guard, _) = self
                .shared
                .cv
                .wait_timeout(st, deadline - now)
                .unwrap();
            st = guard;
        }
        Ok(())
    }
}

impl super::Comm for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn barrier(&self) -> Result<(), SolverError> {
        self.rendezvous("barrier", |_| {})
    }

    fn broadcast(&self, buf: &mut [f64], root: usize) -> Result<(), SolverError> {
        if self.rank == root {
            let mut st = self.shared.state.lock().unwrap();
            st.slot = Some(Arc::new(buf.to_vec()));
        }
        self.rendezvous("broadcast", |_| {})?;
        if self.rank != root {
            let payload = {
                let st = self.shared.state.lock().unwrap();
                st.slot.clone()
            };
            match payload {
                Some(p) if p.len() == buf.len() => buf.copy_from_slice(&p),
                Some(p) => {
                    return Err(SolverError::Dimension(format!(
                        "broadcast of {} elements into buffer of {}",
                        p.len(),
                        buf.len()
                    )));
                }
                None => {
                    return Err(SolverError::Dimension(
                        "broadcast slot empty after rendezvous".into(),
                    ));
                }
            }
        }
        self.rendezvous("broadcast", |st| st.slot = None)
    }

    fn scatter_rows(
        &self,
        rows: Option<&[f64]>,
        plan: &RowPartition,
        root: usize,
    ) -> Result<RowBlock, SolverError> {
        let ncols = plan.num_rows();
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
            let mut st = self.shared.state.lock().unwrap();
            st.slot = Some(Arc::new(rows.to_vec()));
        }
        self.rendezvous("scatter", |_| {})?;
        let range = plan.range(self.rank);
        let local = {
            let st = self.shared.state.lock().unwrap();
            let full = st.slot.as_ref().ok_or_else(|| {
                SolverError::Dimension("scatter slot empty after rendezvous".into())
            })?;
            full[range.start * ncols..range.end * ncols].to_vec()
        };
        self.rendezvous("scatter", |st| st.slot = None)?;
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
        {
            let mut st = self.shared.state.lock().unwrap();
            st.parts[self.rank] = Some(local.to_vec());
        }
        self.rendezvous("gather", |_| {})?;
        let result = if self.rank == root {
            let st = self.shared.state.lock().unwrap();
            let mut full = Vec::with_capacity(plan.num_rows());
            for r in 0..self.shared.size {
                let part = st.parts[r].as_ref().ok_or_else(|| {
                    SolverError::Dimension(format!("gather fragment missing for rank {r}"))
                })?;
                full.extend_from_slice(part);
            }
            Some(full)
        } else {
            None
        };
        self.rendezvous("gather", |st| st.parts.iter_mut().for_each(|p| *p = None))?;
        Ok(result)
    }

    fn wtime(&self) -> f64 {
        self.shared.start.elapsed().as_secs_f64()
    }
}
