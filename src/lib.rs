//! parcg: distributed conjugate gradient over collective communication
//!
//! This crate solves dense symmetric positive-definite systems `A x = b` with
//! an SPMD conjugate-gradient iteration: the rows of `A` are partitioned across
//! a fixed, rank-addressed process group, each participant computes the product
//! for its own row block, and broadcast/scatter/gather collectives keep every
//! participant on an identical copy of the iterate between steps.

pub mod parallel;

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod matrix;
pub mod partition;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use context::*;
pub use core::*;
pub use error::*;
pub use matrix::*;
pub use partition::*;
pub use solver::*;
pub use utils::*;

// Re-export SolveStats at the crate root for convenience
pub use utils::convergence::SolveStats;
