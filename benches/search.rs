//! Benchmarks for gallery search.
//!
//! Measures the full-scan search across record counts and dimensions; this
//! is the only operation whose cost grows with the collection.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

use gallery::EmbeddingIndex;

fn build_index(n: usize, dim: usize) -> EmbeddingIndex {
    let mut rng = StdRng::seed_from_u64(42);
    let mut index = EmbeddingIndex::new(dim).expect("create index");
    for i in 0..n {
        let vector: Vec<f32> = (0..dim).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect();
        let label = format!("class-{}", i % 16);
        let source = format!("img/{i}.png");
        index.add(vector, &label, &source).expect("add vector");
    }
    index
}

fn random_query(dim: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..dim).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect()
}

fn bench_search_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("search/records");
    let dim = 128;
    let query = random_query(dim);

    for &n in &[100, 1_000, 10_000] {
        let index = build_index(n, dim);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| index.search(black_box(&query), 10).expect("search"));
        });
    }
    group.finish();
}

fn bench_search_dimensions(c: &mut Criterion) {
    let mut group = c.benchmark_group("search/dimension");
    let n = 1_000;

    for &dim in &[64, 128, 256, 768] {
        let index = build_index(n, dim);
        let query = random_query(dim);
        group.throughput(Throughput::Elements(dim as u64));
        group.bench_with_input(BenchmarkId::from_parameter(dim), &dim, |b, _| {
            b.iter(|| index.search(black_box(&query), 10).expect("search"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_search_sizes, bench_search_dimensions);
criterion_main!(benches);
