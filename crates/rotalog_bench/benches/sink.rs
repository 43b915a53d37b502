//! Rotating sink benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rotalog_bench::{payload, temp_sink};
use std::sync::Arc;
use std::thread;

/// Benchmark single-threaded writes.
fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("sink_write");
    group.sample_size(50);

    for size in [64, 256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let (_temp_dir, sink) = temp_sink(0);
            let data = payload(size);

            b.iter(|| {
                let written = sink.write(black_box(&data)).unwrap();
                black_box(written);
            });
        });
    }

    group.finish();
}

/// Benchmark rotation cost for different backlog depths.
fn bench_rotate(c: &mut Criterion) {
    let mut group = c.benchmark_group("sink_rotate");
    group.sample_size(30);

    for retention in [0usize, 1, 8, 32].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(retention),
            retention,
            |b, &retention| {
                let (_temp_dir, sink) = temp_sink(retention);
                let data = payload(256);

                b.iter(|| {
                    sink.write(&data).unwrap();
                    sink.rotate().unwrap();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark writes contended by several threads.
fn bench_contended_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("sink_contended_write");
    group.sample_size(20);

    for threads in [2usize, 4, 8].iter() {
        group.throughput(Throughput::Elements((*threads * 100) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), threads, |b, &threads| {
            let (_temp_dir, sink) = temp_sink(0);
            let sink = Arc::new(sink);
            let data = Arc::new(payload(128));

            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let sink = Arc::clone(&sink);
                        let data = Arc::clone(&data);
                        thread::spawn(move || {
                            for _ in 0..100 {
                                sink.write(&data).unwrap();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_write, bench_rotate, bench_contended_write);
criterion_main!(benches);
