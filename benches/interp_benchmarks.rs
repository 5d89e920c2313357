//! Interpolation benchmarks
//!
//! Run with: cargo bench --bench interp_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zvd_hevc::codec::h265::Interpolator;

const STRIDE: usize = 80;

/// 80x80 plane so a 64x64 block has room for 8-tap margins
fn test_plane() -> Vec<i16> {
    (0..STRIDE * STRIDE)
        .map(|i| (((i % STRIDE) * 3 + (i / STRIDE) * 5) % 256) as i16)
        .collect()
}

/// Benchmark luma prediction at integer, 1-D and 2-D phases
fn bench_luma_prediction(c: &mut Criterion) {
    let interp = Interpolator::new(8).expect("Failed to create interpolator");
    let src = test_plane();
    let origin = 8 * STRIDE + 8;
    let mut group = c.benchmark_group("predict_luma");

    for &block in &[8usize, 16, 64] {
        let mut dst = vec![0i16; block * block];
        group.throughput(Throughput::Elements((block * block) as u64));

        for &(name, fx, fy) in &[("copy", 0u8, 0u8), ("h", 2, 0), ("v", 0, 2), ("hv", 1, 3)] {
            group.bench_with_input(
                BenchmarkId::new(name, block),
                &block,
                |b, &block| {
                    b.iter(|| {
                        interp.predict_luma(
                            black_box(&src),
                            origin,
                            STRIDE,
                            fx,
                            fy,
                            &mut dst,
                            block,
                            block,
                            block,
                        );
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark 2-D chroma prediction
fn bench_chroma_prediction(c: &mut Criterion) {
    let interp = Interpolator::new(8).expect("Failed to create interpolator");
    let src = test_plane();
    let origin = 4 * STRIDE + 4;
    let mut group = c.benchmark_group("predict_chroma");

    for &block in &[4usize, 8, 32] {
        let mut dst = vec![0i16; block * block];
        group.throughput(Throughput::Elements((block * block) as u64));
        group.bench_with_input(BenchmarkId::new("hv", block), &block, |b, &block| {
            b.iter(|| {
                interp.predict_chroma(black_box(&src), origin, STRIDE, 3, 5, &mut dst, block, block, block);
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets =
        bench_luma_prediction,
        bench_chroma_prediction,
}

criterion_main!(benches);
