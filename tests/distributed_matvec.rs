//! Tests for the distributed matrix-vector product against the sequential
//! dense product, over the thread-backed process group.
//!
//! Covers the degenerate single-rank group, a rank count that does not divide
//! the matrix dimension, and the replication guarantee (every rank returns
//! the identical full-length result).

use std::sync::Arc;
use std::thread;

use approx::assert_abs_diff_eq;
use faer::Mat;
use rand::{Rng, SeedableRng, rngs::StdRng};

use parcg::core::traits::Operator;
use parcg::matrix::dense::DenseMatVec;
use parcg::matrix::distributed::DistributedMatVec;
use parcg::parallel::{Comm, ThreadComm};
use parcg::partition::RowPartition;

/// Run `f` on every rank of a `size`-rank thread group, returning the
/// per-rank results in rank order.
fn run_group<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(ThreadComm) -> T + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let handles: Vec<_> = ThreadComm::group(size)
        .into_iter()
        .map(|comm| {
            let f = Arc::clone(&f);
            thread::spawn(move || f(comm))
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

fn seeded_matrix(n: usize, seed: u64) -> Mat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let vals: Vec<f64> = (0..n * n).map(|_| rng.r#gen::<f64>() - 0.5).collect();
    Mat::from_fn(n, n, |i, j| vals[i * n + j])
}

fn seeded_vector(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.r#gen::<f64>() * 2.0 - 1.0).collect()
}

fn sequential_product(a: &Mat<f64>, x: &[f64]) -> Vec<f64> {
    let mut y = vec![0.0; x.len()];
    DenseMatVec::new(a.clone()).unwrap().apply(x, &mut y).unwrap();
    y
}

fn distributed_product(n: usize, workers: usize, seed: u64) -> Vec<Vec<f64>> {
    run_group(workers, move |comm| {
        let plan = RowPartition::new(n, comm.size()).unwrap();
        let a = (comm.rank() == 0).then(|| seeded_matrix(n, seed));
        let mut op = DistributedMatVec::new(&comm, plan, 0, a.as_ref()).unwrap();
        // every rank enters with the same v, per the operator contract
        let v = seeded_vector(n, seed + 1);
        let mut y = vec![0.0; n];
        op.apply(&v, &mut y).unwrap();
        y
    })
}

#[test]
fn single_rank_matches_sequential_product() {
    let n = 12;
    let expected = sequential_product(&seeded_matrix(n, 7), &seeded_vector(n, 8));
    let results = distributed_product(n, 1, 7);
    for (yi, ei) in results[0].iter().zip(&expected) {
        assert_abs_diff_eq!(yi, ei, epsilon = 1e-9 * ei.abs().max(1.0));
    }
}

#[test]
fn uneven_rank_count_matches_sequential_product() {
    // 5 does not divide 12: blocks of 3, 3, 2, 2, 2
    let n = 12;
    let workers = 5;
    let expected = sequential_product(&seeded_matrix(n, 21), &seeded_vector(n, 22));
    let results = distributed_product(n, workers, 21);
    for y in &results {
        for (yi, ei) in y.iter().zip(&expected) {
            assert_abs_diff_eq!(yi, ei, epsilon = 1e-9 * ei.abs().max(1.0));
        }
    }
}

#[test]
fn every_rank_holds_an_identical_result() {
    let results = distributed_product(16, 4, 99);
    for y in &results[1..] {
        assert_eq!(y, &results[0], "replicas diverged after the product");
    }
}

#[test]
fn repeated_products_are_deterministic() {
    let first = distributed_product(10, 3, 5);
    let second = distributed_product(10, 3, 5);
    assert_eq!(first, second);
}

#[test]
fn misplaced_canonical_matrix_is_rejected() {
    let results = run_group(2, |comm| {
        let plan = RowPartition::new(8, comm.size()).unwrap();
        // every rank supplies a matrix: non-coordinators must be refused
        let a = seeded_matrix(8, 1);
        DistributedMatVec::new(&comm, plan, 0, Some(&a)).map(drop)
    });
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}
