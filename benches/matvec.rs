use criterion::{Criterion, black_box, criterion_group, criterion_main};
use faer::Mat;
use parcg::core::traits::{MatVec, Operator};
use parcg::matrix::dense::{DenseMatVec, RowBlock, to_row_major};
use parcg::matrix::problem::Problem;
use parcg::solver::{CgSolver, LinearSolver};

fn bench_local_matvec(c: &mut Criterion) {
    let n = 512;
    let a = Mat::from_fn(n, n, |i, j| ((i * n + j) as f64).sin());
    let x: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();

    let mut y = vec![0.0; n];
    let mut dense = DenseMatVec::new(a.clone()).unwrap();
    c.bench_function("dense matvec", |ben| {
        ben.iter(|| dense.apply(black_box(&x), black_box(&mut y)).unwrap())
    });

    // one rank's quarter of the rows, as scattered in a 4-rank run
    let rows = to_row_major(&a);
    let block = RowBlock::from_row_major(0, n, rows[..n / 4 * n].to_vec());
    let mut y_block = vec![0.0; n / 4];
    c.bench_function("row-block matvec", |ben| {
        ben.iter(|| block.matvec(black_box(&x), black_box(&mut y_block)))
    });
}

fn bench_cg_solve(c: &mut Criterion) {
    let n = 256;
    let problem = Problem::new(n);
    c.bench_function("cg reference problem", |ben| {
        ben.iter(|| {
            let mut op = DenseMatVec::new(problem.a.clone()).unwrap();
            let mut x = problem.x0.clone();
            let mut solver = CgSolver::new(1e-5, n);
            solver.solve(&mut op, &problem.b, &mut x).unwrap()
        })
    });
}

criterion_group!(benches, bench_local_matvec, bench_cg_solve);
criterion_main!(benches);
