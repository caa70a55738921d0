use criterion::{black_box, criterion_group, criterion_main, Criterion};
use radialfill::{
  ramp_bucket, rasterize_radial_gradient, CycleMethod, GradientRampCache, Point, Rgba,
};
use tiny_skia::Transform;

fn stops() -> Vec<(f32, Rgba)> {
  vec![(0.0, Rgba::RED), (0.5, Rgba::GREEN), (1.0, Rgba::BLUE)]
}

fn bench_simple_path(c: &mut Criterion) {
  let cache = GradientRampCache::default();
  let stops = stops();
  let size = 512u32;
  let center = Point::new(size as f32 / 2.0, size as f32 / 2.0);
  let bucket = ramp_bucket(size);
  c.bench_function("radial_simple_512", |b| {
    b.iter(|| {
      let pixmap = rasterize_radial_gradient(
        size,
        size,
        center,
        center,
        black_box(200.0),
        CycleMethod::NoCycle,
        &stops,
        Transform::identity(),
        &cache,
        bucket,
      )
      .expect("rasterize")
      .expect("pixmap");
      black_box(pixmap);
    })
  });
}

fn bench_general_path(c: &mut Criterion) {
  let cache = GradientRampCache::default();
  let stops = stops();
  let size = 512u32;
  let center = Point::new(size as f32 / 2.0, size as f32 / 2.0);
  let focus = Point::new(size as f32 / 2.0 + 60.0, size as f32 / 2.0);
  let bucket = ramp_bucket(size);
  c.bench_function("radial_focal_repeat_512", |b| {
    b.iter(|| {
      let pixmap = rasterize_radial_gradient(
        size,
        size,
        center,
        focus,
        black_box(200.0),
        CycleMethod::Repeat,
        &stops,
        Transform::identity(),
        &cache,
        bucket,
      )
      .expect("rasterize")
      .expect("pixmap");
      black_box(pixmap);
    })
  });
}

criterion_group!(benches, bench_simple_path, bench_general_path);
criterion_main!(benches);
