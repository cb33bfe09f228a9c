//! Benchmarks for correlation statistics

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kit_hooks::stats::{pearson, simple_returns, CorrelationMatrix};

fn price_walk(seed: u64, len: usize) -> Vec<f64> {
    let mut state = seed;
    let mut price = 100.0;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let step = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
            price *= 1.0 + step * 0.01;
            price
        })
        .collect()
}

fn benchmark_pearson(c: &mut Criterion) {
    let x = simple_returns(&price_walk(1, 51));
    let y = simple_returns(&price_walk(2, 51));

    c.bench_function("pearson_50", |b| {
        b.iter(|| pearson(black_box(&x), black_box(&y)))
    });
}

fn benchmark_matrix(c: &mut Criterion) {
    let series: Vec<(String, Vec<f64>)> = ["BTC", "ETH", "SOL", "XRP", "ADA"]
        .iter()
        .enumerate()
        .map(|(i, s)| (s.to_string(), simple_returns(&price_walk(i as u64 + 1, 51))))
        .collect();

    c.bench_function("correlation_matrix_5x50", |b| {
        b.iter(|| CorrelationMatrix::compute(black_box(&series)))
    });
}

criterion_group!(benches, benchmark_pearson, benchmark_matrix);
criterion_main!(benches);
