//! Transform benchmarks
//!
//! Run with: cargo bench --bench transform_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zvd_hevc::codec::h265::{Transform, TransformSize};

const SIZES: [TransformSize; 4] = [
    TransformSize::Size4,
    TransformSize::Size8,
    TransformSize::Size16,
    TransformSize::Size32,
];

/// Deterministic residual block in [-64, 63]
fn residual_block(samples: usize) -> Vec<i16> {
    (0..samples).map(|i| ((i * 37 + 11) % 128) as i16 - 64).collect()
}

/// Benchmark forward and inverse 2-D transforms per block size
fn bench_transform_sizes(c: &mut Criterion) {
    let transform = Transform::new(8).expect("Failed to create transform");
    let mut group = c.benchmark_group("transform");

    for size in SIZES {
        let residual = residual_block(size.samples());
        let mut coeffs = vec![0i16; size.samples()];
        let mut out = vec![0i16; size.samples()];
        transform
            .forward(&residual, &mut coeffs, size, false)
            .expect("Failed to transform");

        group.throughput(Throughput::Elements(size.samples() as u64));

        group.bench_with_input(
            BenchmarkId::new("forward", size.size()),
            &residual,
            |b, residual| {
                b.iter(|| {
                    transform
                        .forward(black_box(residual), &mut out, size, false)
                        .expect("Failed to transform");
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("inverse", size.size()),
            &coeffs,
            |b, coeffs| {
                b.iter(|| {
                    transform
                        .inverse(black_box(coeffs), &mut out, size, false)
                        .expect("Failed to transform");
                });
            },
        );
    }

    group.finish();
}

/// Benchmark parallel transforms over a 1080p frame worth of 8x8 blocks
fn bench_transform_blocks(c: &mut Criterion) {
    let transform = Transform::new(8).expect("Failed to create transform");
    let size = TransformSize::Size8;
    let blocks = (1920 / 8) * (1088 / 8);
    let residuals: Vec<i16> = residual_block(size.samples()).repeat(blocks);
    let mut coeffs = vec![0i16; residuals.len()];

    let mut group = c.benchmark_group("transform_blocks");
    group.throughput(Throughput::Elements(residuals.len() as u64));
    group.bench_function("forward_8x8_1080p", |b| {
        b.iter(|| {
            transform
                .forward_blocks(black_box(&residuals), &mut coeffs, size, false)
                .expect("Failed to transform");
        });
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets =
        bench_transform_sizes,
        bench_transform_blocks,
}

criterion_main!(benches);
