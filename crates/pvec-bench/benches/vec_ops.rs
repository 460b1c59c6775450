//! Criterion micro-benchmarks for append, reserve, resize and copy.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pvec::GrowVec;
use pvec_bench::{filled, Payload, SIZES};
use pvec_test_utils::FailingAllocator;

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");
    for n in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(filled(n)));
        });
    }
    group.finish();
}

fn bench_push_reserved(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_reserved");
    for n in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut v = GrowVec::new();
                v.reserve(n).unwrap();
                for i in 0..n as u64 {
                    v.push(i).unwrap();
                }
                black_box(v)
            });
        });
    }
    group.finish();
}

fn bench_push_clone_payload(c: &mut Criterion) {
    let seed = Payload::new(7, 64);
    c.bench_function("push_clone_payload_10k", |b| {
        b.iter(|| {
            let mut v = GrowVec::new();
            for _ in 0..10_000 {
                v.push_clone(&seed).unwrap();
            }
            black_box(v)
        });
    });
}

fn bench_resize(c: &mut Criterion) {
    c.bench_function("resize_grow_shrink_100k", |b| {
        b.iter(|| {
            let mut v = GrowVec::new();
            v.resize(100_000, &1u64).unwrap();
            v.resize(10, &0).unwrap();
            v.resize(50_000, &2).unwrap();
            black_box(v)
        });
    });
}

fn bench_clone(c: &mut Criterion) {
    let mut group = c.benchmark_group("clone");
    for n in SIZES {
        let v = filled(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &v, |b, v| {
            b.iter(|| black_box(v.try_clone().unwrap()));
        });
    }
    group.finish();
}

fn bench_counting_allocator(c: &mut Criterion) {
    c.bench_function("push_counting_allocator_10k", |b| {
        b.iter(|| {
            let mut v = GrowVec::new_in(FailingAllocator::unlimited());
            for i in 0..10_000u64 {
                v.push(i).unwrap();
            }
            black_box(v)
        });
    });
}

criterion_group!(
    benches,
    bench_push,
    bench_push_reserved,
    bench_push_clone_payload,
    bench_resize,
    bench_clone,
    bench_counting_allocator
);
criterion_main!(benches);
