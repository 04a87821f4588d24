//! Benchmarks stroke extrusion across a range of contour sizes and joins.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rive_render_core::{Color, Mat2D, RawPath, SegmentedContour, Stroke, StrokeJoin, StrokeStrip, Vec2};

fn wavy_path(segments: usize) -> RawPath {
    let mut path = RawPath::new();
    path.move_to(Vec2::new(0.0, 0.0));
    for i in 1..=segments {
        let t = i as f32 / segments as f32;
        let x = t * 1000.0;
        let y = (t * std::f32::consts::TAU * 4.0).sin() * 40.0;
        path.line_to(Vec2::new(x, y));
    }
    path
}

fn bench_stroke(c: &mut Criterion) {
    let mut group = c.benchmark_group("stroke_build");
    for &segments in &[16usize, 128, 1024] {
        let raw = wavy_path(segments);
        let mut contour = SegmentedContour::default();
        contour.build(&raw, 0.25, &Mat2D::IDENTITY);
        let stroke = Stroke::new(6.0, Color::BLACK).with_join(StrokeJoin::Round);

        group.bench_with_input(BenchmarkId::from_parameter(segments), &contour, |b, contour| {
            b.iter(|| {
                let mut strip = StrokeStrip::default();
                strip.build(contour, &stroke);
                strip
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_stroke);
criterion_main!(benches);
