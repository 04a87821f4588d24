//! Benchmarks the CPU fill triangulator across a range of contour sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rive_render_core::{triangulate_fill, FillRule, Mat2D, RawPath, SegmentedContour, Vec2};

fn star_path(points: usize, outer_radius: f32, inner_radius: f32) -> RawPath {
    let mut path = RawPath::new();
    let spokes = points * 2;
    for i in 0..spokes {
        let radius = if i % 2 == 0 { outer_radius } else { inner_radius };
        let angle = (i as f32) * std::f32::consts::TAU / spokes as f32;
        let p = Vec2::new(radius * angle.cos(), radius * angle.sin());
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close();
    path
}

fn bench_triangulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangulate_fill");
    for &points in &[8usize, 64, 512] {
        let raw = star_path(points, 200.0, 80.0);
        let mut contour = SegmentedContour::default();
        contour.build(&raw, 0.25, &Mat2D::IDENTITY);
        let rings: Vec<&[Vec2]> = contour.rings().collect();

        group.bench_with_input(BenchmarkId::from_parameter(points), &rings, |b, rings| {
            b.iter(|| triangulate_fill(rings, FillRule::NonZero).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_triangulate);
criterion_main!(benches);
