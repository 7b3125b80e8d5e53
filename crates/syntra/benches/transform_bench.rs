//! Benchmarks for rational analysis and transforms.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use syntra::prelude::*;

/// `1 / Π (s + k)` for `k = 1..=order`.
fn cascade(order: i64) -> Expr {
    let s = Expr::sym("s");
    (1..=order).map(|k| &s + k).product::<Expr>().recip()
}

fn bench_partfrac(c: &mut Criterion) {
    let mut group = c.benchmark_group("partfrac");
    let s = Symbol::new("s");

    for order in [2, 4, 6, 8] {
        let h = cascade(order);
        for method in [Method::Sub, Method::Ec] {
            group.bench_with_input(
                BenchmarkId::new(format!("{method:?}"), order),
                &order,
                |b, _| {
                    b.iter(|| {
                        let rf = RationalFunction::new(black_box(&h), &s).unwrap();
                        black_box(rf.partfrac(false, None, method).unwrap())
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_inverse_laplace(c: &mut Criterion) {
    let mut group = c.benchmark_group("inverse_laplace");
    let (s, t) = (Symbol::new("s"), Symbol::new("t"));
    let opts = TransformOptions::default();

    for order in [2, 4, 6] {
        let h = cascade(order);
        group.bench_with_input(BenchmarkId::new("cold", order), &order, |b, _| {
            b.iter(|| {
                let engine = TransformEngine::new();
                black_box(engine.inverse_laplace(&h, &s, &t, &opts).unwrap())
            });
        });
        let warm = TransformEngine::new();
        group.bench_with_input(BenchmarkId::new("cached", order), &order, |b, _| {
            b.iter(|| black_box(warm.inverse_laplace(&h, &s, &t, &opts).unwrap()));
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    let (s, t) = (Symbol::new("s"), Symbol::new("t"));
    let opts = TransformOptions::default();
    let inputs: Vec<Expr> = (1..=32).map(|k| cascade(2 + k % 4)).collect();

    group.bench_function("serial", |b| {
        b.iter(|| {
            let engine = TransformEngine::new();
            inputs
                .iter()
                .map(|h| engine.inverse_laplace(h, &s, &t, &opts))
                .collect::<Vec<_>>()
        });
    });
    group.bench_function("parallel", |b| {
        b.iter(|| {
            let engine = TransformEngine::new();
            engine.transform_batch(TransformKind::InverseLaplace, &inputs, &s, &t, &opts)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_partfrac, bench_inverse_laplace, bench_batch);
criterion_main!(benches);
