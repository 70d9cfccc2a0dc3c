//! Registry operation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use prodreg_bench::{generate_products, populated_memory_registry, populated_registry};
use prodreg_core::{FixedClock, ProductRegistry};
use prodreg_storage::{FileStore, InMemoryStore};
use std::time::Duration;
use tempfile::TempDir;

/// Benchmark registration into an empty in-memory store.
fn bench_register(c: &mut Criterion) {
    let mut group = c.benchmark_group("register");

    for count in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let products = generate_products(count);
            b.iter(|| {
                let registry = ProductRegistry::new(InMemoryStore::new(), FixedClock::default());
                for product in &products {
                    registry.register_product(product.clone()).unwrap();
                }
                black_box(registry);
            });
        });
    }

    group.finish();
}

/// Benchmark point reads and modifications on a populated registry.
fn bench_point_ops(c: &mut Criterion) {
    let registry = populated_memory_registry(1000);

    c.bench_function("retrieve", |b| {
        b.iter(|| black_box(registry.retrieve(black_box("bench-000500")).unwrap()));
    });

    c.bench_function("transfer_ownership", |b| {
        b.iter(|| {
            registry.clock().advance(Duration::from_secs(1));
            registry
                .transfer_ownership(black_box("bench-000500"), black_box("carrier"))
                .unwrap();
        });
    });
}

/// Benchmark full-range listing.
fn bench_list_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_all");

    for count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        let registry = populated_memory_registry(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| black_box(registry.list_all().unwrap()));
        });
    }

    group.finish();
}

/// Benchmark registration into a file-backed store.
fn bench_file_register(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_register");
    group.sample_size(20);

    group.bench_function("1000", |b| {
        b.iter_with_setup(
            || {
                let dir = TempDir::new().unwrap();
                let store = FileStore::open(&dir.path().join("bench.db")).unwrap();
                (dir, store)
            },
            |(dir, store)| {
                let registry = populated_registry(store, 1000);
                black_box(registry);
                drop(dir);
            },
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_register,
    bench_point_ops,
    bench_list_all,
    bench_file_register
);
criterion_main!(benches);
