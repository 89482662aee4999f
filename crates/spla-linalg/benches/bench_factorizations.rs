use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rand::Rng;
use spla_core::SparseMatrix;
use spla_linalg::cholesky::cholesky;
use spla_linalg::qr::qr;
use spla_linalg::solvers::{CholeskySolver, LinearSolver, QrSolver};

fn random_sparse(n: usize, density: f64) -> SparseMatrix {
    let mut rng = rand::rng();
    let mut m = SparseMatrix::new(n, n);
    for r in 0..n {
        for c in 0..n {
            if rng.random::<f64>() < density {
                m.set(r, c, rng.random_range(-1.0..1.0)).unwrap();
            }
        }
    }
    m
}

fn random_spd(n: usize, density: f64) -> SparseMatrix {
    let c = random_sparse(n, density);
    c.multiply(&c.transpose())
        .unwrap()
        .add(&SparseMatrix::identity(n).scale(n as f64))
        .unwrap()
}

fn bench_multiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiply");

    for size in [16, 64, 128] {
        let a = random_sparse(size, 0.1);
        let b = random_sparse(size, 0.1);

        group.bench_function(format!("size_{}", size), |bencher| {
            bencher.iter(|| black_box(a.multiply(&b).unwrap()))
        });
    }

    group.finish();
}

fn bench_cholesky(c: &mut Criterion) {
    let mut group = c.benchmark_group("cholesky");

    for size in [16, 32, 64] {
        let a = random_spd(size, 0.1);

        group.bench_function(format!("factorize_size_{}", size), |bencher| {
            bencher.iter(|| black_box(cholesky(&a).unwrap()))
        });

        let b = a.row(0).unwrap();
        group.bench_function(format!("solve_size_{}", size), |bencher| {
            bencher.iter(|| black_box(CholeskySolver.solve(&a, &b).unwrap()))
        });
    }

    group.finish();
}

fn bench_qr(c: &mut Criterion) {
    let mut group = c.benchmark_group("qr");

    for size in [16, 32, 64] {
        let a = random_spd(size, 0.1);

        group.bench_function(format!("factorize_size_{}", size), |bencher| {
            bencher.iter(|| black_box(qr(&a).unwrap()))
        });

        let b = a.row(0).unwrap();
        group.bench_function(format!("solve_size_{}", size), |bencher| {
            bencher.iter(|| black_box(QrSolver.solve(&a, &b).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_multiply, bench_cholesky, bench_qr);
criterion_main!(benches);
