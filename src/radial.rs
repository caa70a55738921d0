//! Radial gradient fill engine
//!
//! [`RadialFill`] holds the per-fill derived state for one gradient: the
//! device-to-gradient affine coefficients, the (possibly clamped) focal
//! point, and the constants for the incremental fast path. A fill picks one
//! of two strategies exactly once:
//!
//! - `Simple` when the focus coincides with the center, the gradient does
//!   not cycle, and the ramp is directly indexable. The squared normalized
//!   distance from the center is a quadratic form in the pixel column, so it
//!   advances with a second-order recurrence whose second difference is
//!   constant for the whole fill; the only square root left per pixel comes
//!   from the interpolated lookup table in [`crate::sqrt_lut`].
//! - `General` otherwise. Each pixel intersects the ray from the focus
//!   through the pixel with the defining circle and takes the fraction of
//!   the way from focus to boundary as the gradient position, which is then
//!   folded by the cycle method.
//!
//! Both strategies write one premultiplied color per pixel and never fail;
//! invalid gradient parameters produce garbage colors, not panics.

use crate::color::Rgba;
use crate::error::RenderError;
use crate::geometry::Point;
use crate::pixmap::new_pixmap;
use crate::ramp::{CycleMethod, GradientRamp, GradientRampCache, RampCacheKey};
use crate::sqrt_lut;
use lru::LruCache;
use rayon::prelude::*;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::sync::{Arc, Mutex};
use tiny_skia::{Pixmap, PremultipliedColorU8, Transform};

const RADIAL_PARALLEL_THRESHOLD_PIXELS: usize = 1_000_000;

/// The focus is pulled inside 99% of the radius so the general-path quadratic
/// never evaluates a focus-on-circle configuration, which would divide by
/// zero or take sqrt of a negative discriminant.
const FOCUS_CLAMP_LIMIT: f32 = 0.99;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FillStrategy {
  Simple,
  General,
}

/// Per-fill derived state for one radial gradient
///
/// Construct once per paint operation, fill any number of spans, then drop;
/// nothing mutates between calls, so one `RadialFill` may be shared across
/// threads filling disjoint regions.
#[derive(Clone)]
pub struct RadialFill {
  // Device -> gradient space affine coefficients.
  a00: f32,
  a01: f32,
  a02: f32,
  a10: f32,
  a11: f32,
  a12: f32,
  center: Point,
  focus: Point,
  radius_sq: f32,
  // Translation constants folded against the center; seed the fast path's
  // center-relative row coordinates.
  const_a: f32,
  const_b: f32,
  // Constant second difference of the squared-distance recurrence.
  g_delta_delta: f32,
  // Chord half-length for the vertical-line degenerate case.
  trivial: f32,
  strategy: FillStrategy,
  ramp: Arc<GradientRamp>,
}

impl RadialFill {
  /// Derives the fill state from gradient geometry and a user-to-device
  /// transform.
  ///
  /// Returns `None` for non-finite geometry, a non-positive radius, or a
  /// non-invertible transform. A focus outside 99% of the radius is clamped
  /// onto that limit along the center-to-focus direction.
  pub fn new(
    center: Point,
    focus: Point,
    radius: f32,
    transform: Transform,
    ramp: Arc<GradientRamp>,
  ) -> Option<Self> {
    if !center.x.is_finite() || !center.y.is_finite() || !focus.x.is_finite() || !focus.y.is_finite()
    {
      return None;
    }
    if !radius.is_finite() || radius <= 0.0 {
      return None;
    }
    let inverse = transform.invert()?;

    let radius_sq = radius * radius;
    let mut d_x = focus.x - center.x;
    let mut d_y = focus.y - center.y;
    let dist_sq = d_x * d_x + d_y * d_y;
    let mut focus = focus;
    if dist_sq > radius_sq * FOCUS_CLAMP_LIMIT {
      let scale = (radius_sq * FOCUS_CLAMP_LIMIT / dist_sq).sqrt();
      d_x *= scale;
      d_y *= scale;
      focus = Point::new(center.x + d_x, center.y + d_y);
    }
    let trivial = (radius_sq - d_x * d_x).sqrt();

    let (a00, a01, a02) = (inverse.sx, inverse.kx, inverse.tx);
    let (a10, a11, a12) = (inverse.ky, inverse.sy, inverse.ty);

    // Exact equality on purpose: this gates the genuinely degenerate
    // algebraic case, not an "approximately equal" judgment. An epsilon
    // check would leave a near-zero denominator unguarded in the general
    // solver.
    let is_simple_focus = focus.x == center.x && focus.y == center.y;
    let is_non_cyclic = ramp.cycle() == CycleMethod::NoCycle;
    let strategy = if is_simple_focus && is_non_cyclic && ramp.direct_index() {
      FillStrategy::Simple
    } else {
      FillStrategy::General
    };

    Some(Self {
      a00,
      a01,
      a02,
      a10,
      a11,
      a12,
      center,
      focus,
      radius_sq,
      const_a: a02 - center.x,
      const_b: a12 - center.y,
      g_delta_delta: 2.0 * (a00 * a00 + a10 * a10) / radius_sq,
      trivial,
      strategy,
      ramp,
    })
  }

  /// The focal point after clamping
  pub fn focus(&self) -> Point {
    self.focus
  }

  /// The ramp colors are resolved through
  pub fn ramp(&self) -> &Arc<GradientRamp> {
    &self.ramp
  }

  /// Overwrites the `[x, x+w) x [y, y+h)` device region of a caller-owned
  /// premultiplied pixel buffer.
  ///
  /// `pixels` must start at the region's first pixel, with consecutive rows
  /// `stride` pixels apart. The only failure mode is a buffer too small for
  /// the requested region.
  pub fn fill_span(
    &self,
    x: i32,
    y: i32,
    w: u32,
    h: u32,
    stride: usize,
    pixels: &mut [PremultipliedColorU8],
  ) -> Result<(), RenderError> {
    let w = w as usize;
    let h = h as usize;
    if w == 0 || h == 0 {
      return Ok(());
    }
    let needed = (h - 1)
      .checked_mul(stride)
      .and_then(|v| v.checked_add(w))
      .filter(|_| stride >= w);
    match needed {
      Some(needed) if pixels.len() >= needed => {}
      _ => {
        return Err(RenderError::InvalidParameters {
          message: format!(
            "span {w}x{h} with stride {stride} does not fit in {} pixels",
            pixels.len()
          ),
        });
      }
    }
    for (j, row) in pixels.chunks_mut(stride).take(h).enumerate() {
      self.fill_row(x, y + j as i32, &mut row[..w]);
    }
    Ok(())
  }

  fn fill_row(&self, x: i32, y: i32, row: &mut [PremultipliedColorU8]) {
    match self.strategy {
      FillStrategy::Simple => self.fill_row_simple(x, y, row),
      FillStrategy::General => self.fill_row_general(x, y, row),
    }
  }

  /// Incremental quadratic-form walk for a centered, non-cycling gradient.
  ///
  /// `g_rel` is the squared normalized distance from the center, a convex
  /// parabola in the column index. The row splits into three phases walked
  /// left to right without backtracking: clip while the parabola is still
  /// above 1 (it may dip back below before rising again), the interior band
  /// resolved through the sqrt table, and unconditional clip once past the
  /// dip.
  fn fill_row_simple(&self, x: i32, y: i32, row: &mut [PremultipliedColorU8]) {
    let row_x = self.a00 * x as f32 + self.a01 * y as f32 + self.const_a;
    let row_y = self.a10 * x as f32 + self.a11 * y as f32 + self.const_b;
    let mut g_rel = (row_x * row_x + row_y * row_y) / self.radius_sq;
    let mut g_delta =
      2.0 * (self.a00 * row_x + self.a10 * row_y) / self.radius_sq + self.g_delta_delta * 0.5;

    let clip = self.ramp.clip_color();
    let resolution = self.ramp.resolution() as f32;
    let lut = sqrt_lut::table();
    let w = row.len();
    let mut i = 0;

    while i < w && g_rel >= 1.0 {
      row[i] = clip;
      g_rel += g_delta;
      g_delta += self.g_delta_delta;
      i += 1;
    }
    while i < w && g_rel < 1.0 {
      let index = if g_rel <= 0.0 {
        0
      } else {
        // g_rel < 1 keeps i_index + 1 within the table.
        let f_index = g_rel * sqrt_lut::SQRT_LUT_SIZE as f32;
        let i_index = f_index as usize;
        let s0 = lut[i_index];
        let approx = s0 + (f_index - i_index as f32) * (lut[i_index + 1] - s0);
        (approx * resolution) as usize
      };
      row[i] = self.ramp.by_index(index);
      g_rel += g_delta;
      g_delta += self.g_delta_delta;
      i += 1;
    }
    for pixel in &mut row[i..] {
      *pixel = clip;
    }
  }

  /// Exact per-pixel solve for off-center or cycling gradients.
  fn fill_row_general(&self, x: i32, y: i32, row: &mut [PremultipliedColorU8]) {
    let mut gx = self.a00 * x as f32 + self.a01 * y as f32 + self.a02;
    let mut gy = self.a10 * x as f32 + self.a11 * y as f32 + self.a12;
    for pixel in row.iter_mut() {
      *pixel = self.ramp.sample(self.focus_fraction(gx, gy));
      gx += self.a00;
      gy += self.a10;
    }
  }

  /// Fraction of the way from the focus to the circle boundary along the ray
  /// through the gradient-space point `(x, y)`.
  ///
  /// Intersects the focus-through-point line with the defining circle and
  /// keeps the root on the same side as the point. With the focus clamped
  /// strictly inside the circle the discriminant is non-negative up to
  /// floating noise; it is clamped at zero rather than letting a tiny
  /// negative value turn into NaN.
  fn focus_fraction(&self, x: f32, y: f32) -> f32 {
    let fx = self.focus.x;
    let fy = self.focus.y;

    let (solution_x, solution_y) = if x == fx {
      // Vertical line through the focus; the circle intersections sit at
      // center_y +- trivial.
      let sy = if y > fy {
        self.center.y + self.trivial
      } else {
        self.center.y - self.trivial
      };
      (fx, sy)
    } else {
      let slope = (y - fy) / (x - fx);
      let yintercept = y - slope * x;
      let a = slope * slope + 1.0;
      let b = 2.0 * (slope * (yintercept - self.center.y) - self.center.x);
      let c = yintercept * (yintercept - 2.0 * self.center.y)
        + self.center.x * self.center.x
        + self.center.y * self.center.y
        - self.radius_sq;
      let det_sq = b * b - 4.0 * a * c;
      debug_assert!(
        det_sq >= -1e-3 * (b * b).max(1.0),
        "discriminant {det_sq} more negative than floating noise allows"
      );
      let det = det_sq.max(0.0).sqrt();
      let solution_x = if x < fx {
        (-b - det) / (2.0 * a)
      } else {
        (-b + det) / (2.0 * a)
      };
      (solution_x, slope * solution_x + yintercept)
    };

    let cur_dx = x - fx;
    let cur_dy = y - fy;
    let current_to_focus_sq = cur_dx * cur_dx + cur_dy * cur_dy;
    let int_dx = solution_x - fx;
    let int_dy = solution_y - fy;
    let intersect_to_focus_sq = int_dx * int_dx + int_dy * int_dy;
    (current_to_focus_sq / intersect_to_focus_sq).sqrt()
  }
}

/// Rasterizes a radial gradient into a freshly allocated pixmap.
///
/// `transform` maps gradient user space to device space and is inverted
/// internally; pass `Transform::identity()` when the gradient is already
/// specified in device coordinates. Pixels are sampled at integer device
/// coordinates.
///
/// Returns `Ok(None)` for empty or degenerate input (zero target size, no
/// stops, non-finite or non-positive radius, singular transform) and
/// `Err(RenderError::AllocationFailed)` when the target exceeds the pixmap
/// allocation bound.
#[allow(clippy::too_many_arguments)]
pub fn rasterize_radial_gradient(
  width: u32,
  height: u32,
  center: Point,
  focus: Point,
  radius: f32,
  cycle: CycleMethod,
  stops: &[(f32, Rgba)],
  transform: Transform,
  cache: &GradientRampCache,
  bucket: u16,
) -> Result<Option<Pixmap>, RenderError> {
  if width == 0 || height == 0 || stops.is_empty() {
    return Ok(None);
  }
  let key = RampCacheKey::new(stops, cycle, bucket);
  let ramp = cache.get_or_build(key, || GradientRamp::build(stops, cycle, bucket));
  let Some(fill) = RadialFill::new(center, focus, radius, transform, ramp) else {
    return Ok(None);
  };
  let Some(mut pixmap) = new_pixmap(width, height) else {
    return Err(RenderError::AllocationFailed { width, height });
  };

  let stride = width as usize;
  let pixels_len = stride * height as usize;
  let pixels = pixmap.pixels_mut();
  if pixels_len >= RADIAL_PARALLEL_THRESHOLD_PIXELS {
    pixels
      .par_chunks_mut(stride)
      .enumerate()
      .for_each(|(j, row)| fill.fill_row(0, j as i32, row));
  } else {
    for (j, row) in pixels.chunks_mut(stride).enumerate() {
      fill.fill_row(0, j as i32, row);
    }
  }

  Ok(Some(pixmap))
}

/// Rasterizes through [`RadialPixmapCache`], sharing identical renders.
#[allow(clippy::too_many_arguments)]
pub fn rasterize_radial_gradient_cached(
  pixmap_cache: &RadialPixmapCache,
  width: u32,
  height: u32,
  center: Point,
  focus: Point,
  radius: f32,
  cycle: CycleMethod,
  stops: &[(f32, Rgba)],
  transform: Transform,
  cache: &GradientRampCache,
  bucket: u16,
) -> Result<Option<Arc<Pixmap>>, RenderError> {
  let Some(key) = RadialPixmapCacheKey::new(
    width, height, center, focus, radius, cycle, stops, transform, bucket,
  ) else {
    return Ok(None);
  };
  pixmap_cache.get_or_insert(key, || {
    rasterize_radial_gradient(
      width, height, center, focus, radius, cycle, stops, transform, cache, bucket,
    )
  })
}

/// Cache key covering everything that affects the rasterized pixels
#[derive(Clone, Hash, PartialEq, Eq)]
pub struct RadialPixmapCacheKey {
  width: u32,
  height: u32,
  params: Vec<u32>,
  ramp_key: RampCacheKey,
}

impl RadialPixmapCacheKey {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    width: u32,
    height: u32,
    center: Point,
    focus: Point,
    radius: f32,
    cycle: CycleMethod,
    stops: &[(f32, Rgba)],
    transform: Transform,
    bucket: u16,
  ) -> Option<Self> {
    if width == 0 || height == 0 || stops.is_empty() {
      return None;
    }
    if !center.x.is_finite()
      || !center.y.is_finite()
      || !focus.x.is_finite()
      || !focus.y.is_finite()
      || !radius.is_finite()
      || radius <= 0.0
    {
      return None;
    }
    Some(Self {
      width,
      height,
      params: vec![
        center.x.to_bits(),
        center.y.to_bits(),
        focus.x.to_bits(),
        focus.y.to_bits(),
        radius.to_bits(),
        transform.sx.to_bits(),
        transform.kx.to_bits(),
        transform.ky.to_bits(),
        transform.sy.to_bits(),
        transform.tx.to_bits(),
        transform.ty.to_bits(),
      ],
      ramp_key: RampCacheKey::new(stops, cycle, bucket),
    })
  }
}

#[derive(Clone, Copy, Debug)]
pub struct RadialPixmapCacheConfig {
  pub max_items: usize,
  pub max_bytes: usize,
}

const DEFAULT_RADIAL_PIXMAP_CACHE_ITEMS: usize = 64;
// Rasterized gradients can be large (full-viewport backgrounds); keep the
// cache modest and bounded via LRU eviction so a page cycling through unique
// gradients cannot grow memory without limit.
const DEFAULT_RADIAL_PIXMAP_CACHE_BYTES: usize = 64 * 1024 * 1024;

impl Default for RadialPixmapCacheConfig {
  fn default() -> Self {
    Self {
      max_items: DEFAULT_RADIAL_PIXMAP_CACHE_ITEMS,
      max_bytes: DEFAULT_RADIAL_PIXMAP_CACHE_BYTES,
    }
  }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RadialPixmapCacheStats {
  pub hits: u64,
  pub misses: u64,
  pub bytes: u64,
  pub items: usize,
}

type RadialPixmapHasher = BuildHasherDefault<FxHasher>;

struct RadialPixmapCacheInner {
  lru: LruCache<RadialPixmapCacheKey, Arc<Pixmap>, RadialPixmapHasher>,
  hits: u64,
  misses: u64,
  bytes: usize,
  config: RadialPixmapCacheConfig,
}

impl RadialPixmapCacheInner {
  fn new(config: RadialPixmapCacheConfig) -> Self {
    Self {
      lru: LruCache::unbounded_with_hasher(RadialPixmapHasher::default()),
      hits: 0,
      misses: 0,
      bytes: 0,
      config,
    }
  }

  fn reset(&mut self) {
    self.lru.clear();
    self.hits = 0;
    self.misses = 0;
    self.bytes = 0;
  }

  fn evict(&mut self) {
    while (self.config.max_items > 0 && self.lru.len() > self.config.max_items)
      || (self.config.max_bytes > 0 && self.bytes > self.config.max_bytes)
    {
      if let Some((_key, value)) = self.lru.pop_lru() {
        self.bytes = self.bytes.saturating_sub(value.data().len());
      } else {
        break;
      }
    }
  }

  fn stats(&self) -> RadialPixmapCacheStats {
    RadialPixmapCacheStats {
      hits: self.hits,
      misses: self.misses,
      bytes: self.bytes as u64,
      items: self.lru.len(),
    }
  }
}

/// LRU cache of rasterized radial gradient pixmaps, bounded by item count and
/// total bytes
#[derive(Clone)]
pub struct RadialPixmapCache {
  inner: Arc<Mutex<RadialPixmapCacheInner>>,
}

impl Default for RadialPixmapCache {
  fn default() -> Self {
    Self::new(RadialPixmapCacheConfig::default())
  }
}

impl RadialPixmapCache {
  pub fn new(config: RadialPixmapCacheConfig) -> Self {
    Self {
      inner: Arc::new(Mutex::new(RadialPixmapCacheInner::new(config))),
    }
  }

  pub fn snapshot(&self) -> RadialPixmapCacheStats {
    let guard = self
      .inner
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.stats()
  }

  fn lock_recovered(&self) -> std::sync::MutexGuard<'_, RadialPixmapCacheInner> {
    match self.inner.lock() {
      Ok(guard) => guard,
      Err(poisoned) => {
        let mut guard = poisoned.into_inner();
        // The cache is a performance optimization; after a panic while the
        // lock was held, drop any partially inserted state.
        guard.reset();
        guard
      }
    }
  }

  pub fn get_or_insert<F>(
    &self,
    key: RadialPixmapCacheKey,
    build: F,
  ) -> Result<Option<Arc<Pixmap>>, RenderError>
  where
    F: FnOnce() -> Result<Option<Pixmap>, RenderError>,
  {
    {
      let mut guard = self.lock_recovered();
      if guard.config.max_items == 0 {
        drop(guard);
        return Ok(build()?.map(Arc::new));
      }
      if let Some(found) = guard.lru.get(&key).cloned() {
        guard.hits = guard.hits.saturating_add(1);
        return Ok(Some(found));
      }
      guard.misses = guard.misses.saturating_add(1);
    }

    let Some(pixmap) = build()? else {
      return Ok(None);
    };
    let weight = pixmap.data().len();
    let arc = Arc::new(pixmap);

    let mut guard = self.lock_recovered();
    // Another thread may have inserted while we were rasterizing.
    if let Some(found) = guard.lru.get(&key).cloned() {
      guard.hits = guard.hits.saturating_add(1);
      return Ok(Some(found));
    }
    if guard.config.max_bytes > 0 && weight > guard.config.max_bytes {
      return Ok(Some(arc));
    }
    if let Some(existing) = guard.lru.peek(&key) {
      guard.bytes = guard.bytes.saturating_sub(existing.data().len());
    }
    guard.bytes = guard.bytes.saturating_add(weight);
    guard.lru.put(key, arc.clone());
    guard.evict();
    Ok(Some(arc))
  }
}
