use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgba, RgbaImage};
use std::hint::black_box;
use votecard_crop::engine::{
    encode, resolve_crop_rect, CanvasCompositor, CropFrameSpec, Point, RasterSurfaceProvider,
    SourceImage, TransformState, Viewport, DEFAULT_BACKGROUND, DEFAULT_WORK_SURFACE_PADDING,
};
use votecard_crop::{OutputFormat, SlotPreset};

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

fn bench_crop_rect(c: &mut Criterion) {
    let frame = CropFrameSpec::new(400.0, 200.0);
    let viewport = Viewport::fitting(&frame);
    let state = TransformState::new(1.4, 90, Point::new(-35.0, 12.5));
    c.bench_function("resolve_crop_rect", |b| {
        b.iter(|| {
            resolve_crop_rect(
                black_box(&state),
                black_box(4000),
                black_box(3000),
                &frame,
                &viewport,
            )
        })
    });
}

fn bench_compose(c: &mut Criterion) {
    let provider = RasterSurfaceProvider::default();
    let compositor =
        CanvasCompositor::new(&provider, DEFAULT_BACKGROUND, DEFAULT_WORK_SURFACE_PADDING);
    let preset = SlotPreset::question();
    let frame = preset.frame;
    let viewport = Viewport::fitting(&frame);

    let mut group = c.benchmark_group("compose_question_png");
    group.sample_size(10);
    for (width, height) in [(640, 480), (1600, 1200)] {
        let source = SourceImage::from_rgba(gradient(width, height));
        for rotation in [0, 90] {
            let state = TransformState::new(0.5, rotation, Point::ZERO);
            let crop = resolve_crop_rect(&state, width, height, &frame, &viewport);
            group.bench_with_input(
                BenchmarkId::new(format!("{width}x{height}"), rotation),
                &state,
                |b, state| {
                    b.iter(|| {
                        compositor
                            .compose(&source, state, &crop, &preset.output)
                            .unwrap()
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let raster = gradient(600, 300);
    let mut group = c.benchmark_group("encode_600x300");
    group.sample_size(10);
    for format in [
        OutputFormat::Png,
        OutputFormat::Jpeg { quality: 85 },
        OutputFormat::WebP { quality: 80 },
    ] {
        group.bench_function(format.as_str(), |b| {
            b.iter(|| encode(black_box(&raster), format).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_crop_rect,
    bench_compose,
    bench_encode
);
criterion_main!(benches);
