//! Benchmarks for the ClassicPrint filters and the full pipeline.

use classicprint::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};

fn photo(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8, 255])
    })
}

// ============================================================================
// Filter Benchmarks
// ============================================================================

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");
    let registry = FilterRegistry::with_builtins();
    let image = photo(512, 384);
    group.throughput(Throughput::Elements((image.width() * image.height()) as u64));

    let configured: Vec<(&str, Vec<(OptionKey, OptionValue)>)> = vec![
        (LevelsFilter::NAME, vec![(LevelsFilter::PERCENT, 80.0.into())]),
        (ContrastFilter::NAME, vec![(ContrastFilter::PERCENT, 50.0.into())]),
        (NoiseFilter::NAME, vec![(NoiseFilter::PERCENT, 40.0.into())]),
        (VignetteFilter::NAME, vec![]),
        (FrameFilter::NAME, vec![]),
    ];

    for (name, options) in configured {
        let mut filter = registry.create(name).unwrap();
        for (key, value) in options {
            filter.set_option(key, value).unwrap();
        }
        group.bench_function(name, |bencher| {
            bencher.iter(|| black_box(filter.apply(black_box(&image), None).unwrap()))
        });
    }

    let mut blurred = registry.create(VignetteFilter::NAME).unwrap();
    blurred.set_option(VignetteFilter::BLUR, true.into()).unwrap();
    group.bench_function("Vignette+blur", |bencher| {
        bencher.iter(|| black_box(blurred.apply(black_box(&image), None).unwrap()))
    });

    group.finish();
}

// ============================================================================
// Pipeline Benchmarks
// ============================================================================

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);
    let pipeline = ClassicPrint::with_defaults();

    for (width, height) in [(320, 240), (640, 480), (1280, 960)] {
        let image = photo(width, height);
        group.throughput(Throughput::Elements((width * height) as u64));
        group.bench_with_input(
            BenchmarkId::new("process", format!("{}x{}", width, height)),
            &image,
            |bencher, image| bencher.iter(|| black_box(pipeline.process(image, 0, 0).unwrap())),
        );
    }

    let large = photo(2048, 1536);
    group.bench_function("process_resized_2048_to_640", |bencher| {
        bencher.iter(|| black_box(pipeline.process(&large, 640, 480).unwrap()))
    });

    group.finish();
}

criterion_group!(filter_benches, bench_filters);
criterion_group!(pipeline_benches, bench_pipeline);
criterion_main!(filter_benches, pipeline_benches);
