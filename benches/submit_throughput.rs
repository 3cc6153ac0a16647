//! Benchmarks for queued vs inline submission

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sequential_scheduler::prelude::*;
use std::thread;

fn bench_queued(c: &mut Criterion) {
    let scheduler = SequentialScheduler::new(true).unwrap();
    let mut group = c.benchmark_group("queued");

    for size in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let handles: Vec<_> = (0..size)
                    .map(|i| scheduler.submit_fn(move || black_box(i) * 2))
                    .collect();
                for handle in handles {
                    black_box(handle.join().unwrap());
                }
            });
        });
    }

    group.finish();
}

fn bench_inline(c: &mut Criterion) {
    let scheduler = SequentialScheduler::new(true).unwrap();
    let mut group = c.benchmark_group("inline");

    for size in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let handle = scheduler.handle();
            b.iter(|| {
                let handle = handle.clone();
                scheduler
                    .submit_fn(move || {
                        for i in 0..size {
                            black_box(handle.submit_fn(move || i * 2).join().unwrap());
                        }
                    })
                    .join()
                    .unwrap();
            });
        });
    }

    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    let scheduler = SequentialScheduler::new(true).unwrap();

    c.bench_function("contended_4_producers", |b| {
        b.iter(|| {
            let producers: Vec<_> = (0..4)
                .map(|_| {
                    let handle = scheduler.handle();
                    thread::spawn(move || {
                        for i in 0..250 {
                            handle.spawn(move || {
                                black_box(i);
                            });
                        }
                        handle.submit_fn(|| ()).join().unwrap();
                    })
                })
                .collect();
            for producer in producers {
                producer.join().unwrap();
            }
        });
    });
}

criterion_group!(benches, bench_queued, bench_inline, bench_contended);
criterion_main!(benches);
