//! RGBA color type and premultiplication
//!
//! Gradient stops are specified as straight-alpha [`Rgba`] values; the ramp
//! builder premultiplies them into `tiny_skia::PremultipliedColorU8` once,
//! so the per-pixel fill loops only ever move premultiplied pixels.

use tiny_skia::{ColorU8, PremultipliedColorU8};

/// RGBA color with 8-bit channels and a floating-point alpha
///
/// - R, G, B: 0-255
/// - A: 0.0-1.0, where 0.0 is fully transparent and 1.0 is fully opaque
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
  /// Red component (0-255)
  pub r: u8,
  /// Green component (0-255)
  pub g: u8,
  /// Blue component (0-255)
  pub b: u8,
  /// Alpha component (0.0-1.0)
  pub a: f32,
}

impl Rgba {
  /// Fully transparent black
  pub const TRANSPARENT: Self = Self {
    r: 0,
    g: 0,
    b: 0,
    a: 0.0,
  };
  /// Opaque black
  pub const BLACK: Self = Self {
    r: 0,
    g: 0,
    b: 0,
    a: 1.0,
  };
  /// Opaque white
  pub const WHITE: Self = Self {
    r: 255,
    g: 255,
    b: 255,
    a: 1.0,
  };
  /// Opaque red
  pub const RED: Self = Self {
    r: 255,
    g: 0,
    b: 0,
    a: 1.0,
  };
  /// Opaque green
  pub const GREEN: Self = Self {
    r: 0,
    g: 255,
    b: 0,
    a: 1.0,
  };
  /// Opaque blue
  pub const BLUE: Self = Self {
    r: 0,
    g: 0,
    b: 255,
    a: 1.0,
  };

  /// Creates a new color from components
  pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
    Self { r, g, b, a }
  }

  /// Converts to a premultiplied 8-bit pixel value
  pub fn premultiply(self) -> PremultipliedColorU8 {
    let alpha_u8 = (self.a * 255.0).round().clamp(0.0, 255.0) as u8;
    ColorU8::from_rgba(self.r, self.g, self.b, alpha_u8).premultiply()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_opaque_premultiply_is_identity() {
    let px = Rgba::new(10, 20, 30, 1.0).premultiply();
    assert_eq!(px.red(), 10);
    assert_eq!(px.green(), 20);
    assert_eq!(px.blue(), 30);
    assert_eq!(px.alpha(), 255);
  }

  #[test]
  fn test_semi_transparent_premultiply_scales_channels() {
    let px = Rgba::new(0, 255, 0, 0.5).premultiply();
    assert_eq!(px.red(), 0);
    assert_eq!(px.green(), 128);
    assert_eq!(px.blue(), 0);
    assert_eq!(px.alpha(), 128);
  }

  #[test]
  fn test_transparent_premultiply() {
    let px = Rgba::TRANSPARENT.premultiply();
    assert_eq!(px.alpha(), 0);
    assert_eq!(px.red(), 0);
  }
}
