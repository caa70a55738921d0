//! Dense color ramps built from gradient stops
//!
//! A [`GradientRamp`] pre-expands ordered `(fraction, color)` stops into a
//! flat array of premultiplied colors indexed by a normalized gradient
//! fraction, so the fill loops never walk the stop list per pixel. The array
//! holds `resolution + 1` entries; the extra slot at index `resolution` is
//! the clip color written for fractions at or past 1.0 under
//! [`CycleMethod::NoCycle`].
//!
//! Ramps are immutable once built and memoized process-wide through
//! [`GradientRampCache`], keyed by the bit-exact stop list.

use crate::color::Rgba;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use tiny_skia::PremultipliedColorU8;

/// Behavior for gradient fractions outside `[0, 1]`
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum CycleMethod {
  /// Clamp: fractions past 1.0 take the terminal (clip) color
  NoCycle,
  /// Tile: fold the fraction as `g mod 1`
  Repeat,
  /// Mirror: fold the fraction as a triangle wave with period 2
  Reflect,
}

/// A dense, directly indexable color lookup array for one gradient
#[derive(Clone)]
pub struct GradientRamp {
  colors: Arc<Vec<PremultipliedColorU8>>,
  cycle: CycleMethod,
  resolution: usize,
  first: PremultipliedColorU8,
}

impl GradientRamp {
  /// Builds a ramp of `resolution + 1` colors from ordered stops.
  ///
  /// Stops are piecewise linearly interpolated in premultiplied-destination
  /// space; positions before the first stop take the first color, positions
  /// after the last take the last. The slot at index `resolution` is the
  /// terminal stop's color (the NO_CYCLE clip color).
  pub fn build(stops: &[(f32, Rgba)], cycle: CycleMethod, resolution: u16) -> Self {
    let resolution = resolution.max(1) as usize;
    let max_idx = resolution as f32;
    let mut colors = Vec::with_capacity(resolution + 1);
    let mut window = stops.windows(2).peekable();
    for i in 0..=resolution {
      let pos = i as f32 / max_idx;
      while let Some(segment) = window.peek() {
        if pos > segment[1].0 {
          window.next();
        } else {
          break;
        }
      }
      let color = if let Some(segment) = window.peek() {
        let (p0, c0) = segment[0];
        let (p1, c1) = segment[1];
        if pos <= p0 {
          c0
        } else if (p1 - p0).abs() < f32::EPSILON {
          c0
        } else {
          let frac = ((pos - p0) / (p1 - p0)).clamp(0.0, 1.0);
          lerp_rgba(c0, c1, frac)
        }
      } else {
        stops.last().map(|(_, c)| *c).unwrap_or(Rgba::TRANSPARENT)
      };
      colors.push(color.premultiply());
    }
    // The clip slot must be the terminal stop color exactly, even when a
    // duplicate stop at position 1.0 makes the sampled value come from the
    // preceding segment.
    if let Some((_, last)) = stops.last() {
      colors[resolution] = last.premultiply();
    }

    let first = stops
      .first()
      .map(|(_, c)| c.premultiply())
      .unwrap_or(PremultipliedColorU8::TRANSPARENT);

    Self {
      colors: Arc::new(colors),
      cycle,
      resolution,
      first,
    }
  }

  /// Number of quantization steps over `[0, 1]`
  pub fn resolution(&self) -> usize {
    self.resolution
  }

  /// The cycle method this ramp folds with in [`Self::sample`]
  pub fn cycle(&self) -> CycleMethod {
    self.cycle
  }

  /// The clip color written for saturated pixels under `NoCycle`
  pub fn clip_color(&self) -> PremultipliedColorU8 {
    self.colors[self.resolution]
  }

  /// Whether the ramp is one flat array the fast path can index directly.
  ///
  /// Always true for ramps built by [`Self::build`]; the strategy selection
  /// still consults it so a multi-segment ramp representation can opt out.
  pub fn direct_index(&self) -> bool {
    true
  }

  /// Direct lookup by quantized index; index `resolution` is the clip slot.
  #[inline(always)]
  pub fn by_index(&self, index: usize) -> PremultipliedColorU8 {
    self.colors[index.min(self.resolution)]
  }

  /// Lookup by an already-folded fraction in `[0, 1]`.
  #[inline(always)]
  fn by_fraction(&self, t: f32) -> PremultipliedColorU8 {
    let idx = (t * self.resolution as f32) as usize;
    self.colors[idx.min(self.resolution)]
  }

  /// Cycle-aware lookup for an arbitrary non-negative gradient fraction.
  ///
  /// Folds `g` into `[0, 1]` per the cycle method, then indexes directly.
  /// Non-finite fractions take the first stop color.
  #[inline(always)]
  pub fn sample(&self, g: f32) -> PremultipliedColorU8 {
    if !g.is_finite() {
      return self.first;
    }
    match self.cycle {
      CycleMethod::NoCycle => {
        if g <= 0.0 {
          self.first
        } else if g >= 1.0 {
          self.clip_color()
        } else {
          self.by_fraction(g)
        }
      }
      CycleMethod::Repeat => {
        let mut t = g % 1.0;
        if t < 0.0 {
          t += 1.0;
        }
        self.by_fraction(t)
      }
      CycleMethod::Reflect => {
        let mut t = g % 2.0;
        if t < 0.0 {
          t += 2.0;
        }
        if t > 1.0 {
          t = 2.0 - t;
        }
        self.by_fraction(t)
      }
    }
  }
}

fn lerp_rgba(c0: Rgba, c1: Rgba, frac: f32) -> Rgba {
  Rgba {
    r: (c0.r as f32 + (c1.r as f32 - c0.r as f32) * frac)
      .round()
      .clamp(0.0, 255.0) as u8,
    g: (c0.g as f32 + (c1.g as f32 - c0.g as f32) * frac)
      .round()
      .clamp(0.0, 255.0) as u8,
    b: (c0.b as f32 + (c1.b as f32 - c0.b as f32) * frac)
      .round()
      .clamp(0.0, 255.0) as u8,
    a: c0.a + (c1.a - c0.a) * frac,
  }
}

/// Picks a ramp resolution for a target of the given maximum dimension.
///
/// Power of two in `[64, 4096]` so nearby target sizes share cached ramps.
pub fn ramp_bucket(max_dim: u32) -> u16 {
  let mut bucket = 64u32;
  let target = max_dim.max(64);
  while bucket < target {
    bucket *= 2;
    if bucket >= 4096 {
      bucket = 4096;
      break;
    }
  }
  bucket as u16
}

#[derive(Clone, Hash, PartialEq, Eq)]
struct RampStopKey {
  pos_bits: u32,
  r: u8,
  g: u8,
  b: u8,
  a_bits: u32,
}

/// Bit-exact memoization key for a built ramp
#[derive(Clone, Hash, PartialEq, Eq)]
pub struct RampCacheKey {
  stops: Vec<RampStopKey>,
  cycle: CycleMethod,
  resolution: u16,
}

impl RampCacheKey {
  pub fn new(stops: &[(f32, Rgba)], cycle: CycleMethod, resolution: u16) -> Self {
    Self {
      stops: stops
        .iter()
        .map(|(pos, color)| RampStopKey {
          pos_bits: pos.to_bits(),
          r: color.r,
          g: color.g,
          b: color.b,
          a_bits: color.a.to_bits(),
        })
        .collect(),
      cycle,
      resolution,
    }
  }
}

/// Process-shared memoization of built ramps
#[derive(Clone, Default)]
pub struct GradientRampCache {
  inner: Arc<Mutex<FxHashMap<RampCacheKey, Arc<GradientRamp>>>>,
}

impl GradientRampCache {
  pub fn get_or_build<F>(&self, key: RampCacheKey, build: F) -> Arc<GradientRamp>
  where
    F: FnOnce() -> GradientRamp,
  {
    let mut guard = match self.inner.lock() {
      Ok(guard) => guard,
      Err(poisoned) => {
        let mut guard = poisoned.into_inner();
        // This cache is a performance optimization. If a panic happened while
        // holding the lock we may have partially inserted state, so clear
        // everything and rebuild entries on demand.
        guard.clear();
        guard
      }
    };
    if let Some(found) = guard.get(&key) {
      return found.clone();
    }
    let ramp = Arc::new(build());
    guard.entry(key).or_insert_with(|| ramp.clone()).clone()
  }
}
