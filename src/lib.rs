//! CPU rasterizer for radial gradients with an off-center focal point.
//!
//! A radial gradient is defined by a circle (center + radius), a focal point
//! inside that circle mapped to the 0% stop, an ordered list of color stops,
//! and a cycle method describing what happens past the 100% circle. The
//! rasterizer picks one of two strategies per fill:
//!
//! - a fast incremental path when the focus coincides with the center and the
//!   gradient does not repeat, which tracks the squared normalized distance
//!   from the center as a second-order recurrence and approximates the square
//!   root through a small interpolated lookup table;
//! - an exact per-pixel path otherwise, which intersects the ray from the
//!   focus through the pixel with the defining circle and takes the fraction
//!   of the way from focus to boundary as the gradient position.
//!
//! Output is premultiplied RGBA, either as a freshly allocated
//! [`tiny_skia::Pixmap`] or written into a caller-owned pixel span.

pub mod color;
pub mod error;
pub mod geometry;
pub mod radial;
pub mod ramp;
pub mod sqrt_lut;

mod pixmap;

pub use color::Rgba;
pub use error::{RenderError, Result};
pub use geometry::Point;
pub use radial::{
  rasterize_radial_gradient, rasterize_radial_gradient_cached, RadialFill, RadialPixmapCache,
  RadialPixmapCacheConfig, RadialPixmapCacheKey, RadialPixmapCacheStats,
};
pub use ramp::{ramp_bucket, CycleMethod, GradientRamp, GradientRampCache, RampCacheKey};
pub use sqrt_lut::approx_sqrt;
