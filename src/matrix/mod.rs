//! Matrix module: dense storage, the deterministic test problem, and the
//! distributed product.

pub mod dense;
pub use dense::{DenseMatVec, RowBlock, to_row_major};
pub mod distributed;
pub use distributed::DistributedMatVec;
pub mod problem;
pub use problem::Problem;
