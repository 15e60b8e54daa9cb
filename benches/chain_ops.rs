//! Benchmarks for forward chaining.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chainer::engine::ForwardChainingEngine;
use chainer::rules::Rule;

/// 0 -> 1 -> ... -> n
fn linear_chain(n: u32) -> Vec<Rule<u32>> {
    (0..n).map(|i| Rule::new([i], i + 1)).collect()
}

/// Every fact in `0..width` together derives each fact in `width..2*width`.
fn wide_fan(width: u32) -> Vec<Rule<u32>> {
    (width..2 * width).map(|c| Rule::new(0..width, c)).collect()
}

fn bench_linear_chain(c: &mut Criterion) {
    let engine = ForwardChainingEngine::with_max_iterations(1_000).unwrap();
    let rules = linear_chain(200);

    c.bench_function("chain_linear_200", |bench| {
        bench.iter(|| black_box(engine.chain(&[0], &rules)))
    });
}

fn bench_wide_fan(c: &mut Criterion) {
    let engine = ForwardChainingEngine::with_max_iterations(10).unwrap();
    let rules = wide_fan(100);
    let seeds: Vec<u32> = (0..100).collect();

    c.bench_function("chain_fan_100x100", |bench| {
        bench.iter(|| black_box(engine.chain(&seeds, &rules)))
    });
}

criterion_group!(benches, bench_linear_chain, bench_wide_fan);
criterion_main!(benches);
