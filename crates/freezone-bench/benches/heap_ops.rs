//! Criterion micro-benchmarks for allocation, release and coalescing.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use freezone::Heap;
use freezone_bench::{churn_script, fragmented_heap, run_churn};
use freezone_test_utils::{allocate_all, release_all, requests};

/// Benchmark: allocate-all then release-all over the generated size workload.
fn bench_workload_cycle(c: &mut Criterion) {
    let mut heap = Heap::init(64 * 1024).unwrap();
    let mut reqs = requests(4096);
    c.bench_function("workload_cycle_4096", |b| {
        b.iter(|| {
            allocate_all(&mut heap, &mut reqs).unwrap();
            release_all(&mut heap, &mut reqs).unwrap();
            black_box(&heap);
        });
    });
}

/// Benchmark: requests that no hole can serve, behind 512 holes.
fn bench_first_fit_fragmented(c: &mut Criterion) {
    let (mut heap, _live) = fragmented_heap(128 * 1024, 64);
    c.bench_function("first_fit_skip_512_holes", |b| {
        b.iter(|| {
            let address = heap.allocate(black_box(65)).unwrap();
            heap.free(address, 65).unwrap();
        });
    });
    c.bench_function("first_fit_refused_512_holes", |b| {
        b.iter(|| black_box(heap.allocate(black_box(128 * 1024)).is_err()));
    });
}

/// Benchmark: release of a block that bridges two free neighbours.
fn bench_coalesce_bridge(c: &mut Criterion) {
    let mut heap = Heap::init(64 * 1024).unwrap();
    let a = heap.allocate(1024).unwrap();
    let b = heap.allocate(1024).unwrap();
    let _c = heap.allocate(1024).unwrap();
    heap.free(a, 1024).unwrap();
    c.bench_function("coalesce_bridge", |bench| {
        bench.iter(|| {
            heap.free(b, 1024).unwrap();
            // Carving a then b again restores the starting layout.
            let a2 = heap.allocate(1024).unwrap();
            let b2 = heap.allocate(1024).unwrap();
            heap.free(a2, 1024).unwrap();
            black_box(b2);
        });
    });
}

/// Benchmark: 10K seeded random allocate/free steps.
fn bench_random_churn(c: &mut Criterion) {
    let script = churn_script(0x5eed, 10_000, 700);
    let mut heap = Heap::init(256 * 1024).unwrap();
    c.bench_function("random_churn_10k", |b| {
        b.iter(|| black_box(run_churn(&mut heap, &script)));
    });
}

criterion_group!(
    benches,
    bench_workload_cycle,
    bench_first_fit_fragmented,
    bench_coalesce_bridge,
    bench_random_churn
);
criterion_main!(benches);
