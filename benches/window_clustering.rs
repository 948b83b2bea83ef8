//! Benchmarks for the per-fix update cost at different window capacities.
//!
//! Run with: `cargo bench --bench window_clustering`
//! Add `--features parallel` to measure rayon neighbor counting.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use staymatch::{GpsObservation, PlaceRegistry, WindowConfig, WindowedClusterer};

/// Deterministic stream: half dwelling around a point, half moving away.
fn generate_stream(points: usize) -> Vec<(f64, GpsObservation)> {
    (0..points)
        .map(|i| {
            let progress = i as f64 / points as f64;
            let (lat, lng) = if i % 2 == 0 {
                (47.37 + (i % 7) as f64 * 1e-5, 8.55 + (i % 5) as f64 * 1e-5)
            } else {
                (47.37 + progress * 0.05, 8.55 + progress * 0.05)
            };
            (i as f64, GpsObservation::new(lat, lng, 30.0))
        })
        .collect()
}

fn bench_process(c: &mut Criterion) {
    let stream = generate_stream(2_000);
    let mut group = c.benchmark_group("process");

    for capacity in [16u32, 64, 256] {
        group.bench_with_input(
            BenchmarkId::new("count_window", capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    let mut clusterer = WindowedClusterer::new(
                        WindowConfig::count_based(capacity, 0.5),
                        PlaceRegistry::default(),
                    )
                    .unwrap();
                    for (t, fix) in &stream {
                        black_box(clusterer.process(*t, *fix).unwrap());
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_time_window(c: &mut Criterion) {
    let stream = generate_stream(2_000);

    c.bench_function("process/time_window_120s", |b| {
        b.iter(|| {
            let mut clusterer = WindowedClusterer::new(
                WindowConfig::time_based(120, 128, 0.5),
                PlaceRegistry::default(),
            )
            .unwrap();
            for (t, fix) in &stream {
                black_box(clusterer.process(*t, *fix).unwrap());
            }
        });
    });
}

criterion_group!(benches, bench_process, bench_time_window);
criterion_main!(benches);
