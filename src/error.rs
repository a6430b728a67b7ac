use thiserror::Error;

// Unified error type for parcg

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("dimension mismatch: {0}")]
    Dimension(String),
    #[error("collective {op} timed out on rank {rank} after {waited_ms} ms")]
    CollectiveTimeout {
        op: &'static str,
        rank: usize,
        waited_ms: u64,
    },
    #[error("worker thread failed: {0}")]
    WorkerFailed(String),
}
