//! Core geometry types
//!
//! Coordinates follow the usual raster convention: the origin is at the
//! top-left corner, positive X extends to the right, positive Y downward.

use std::fmt;

/// A 2D point in device or gradient space
///
/// # Examples
///
/// ```
/// use radialfill::Point;
///
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::ZERO;
///
/// assert_eq!(p1.x, 10.0);
/// assert_eq!(p2, Point::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  /// X coordinate (horizontal position, increases to the right)
  pub x: f32,
  /// Y coordinate (vertical position, increases downward)
  pub y: f32,
}

impl Point {
  /// The zero point at the origin (0, 0)
  pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

  /// Creates a new point at the given coordinates
  pub const fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }

  /// Translates this point by another point's coordinates
  pub fn translate(self, other: Point) -> Self {
    Self {
      x: self.x + other.x,
      y: self.y + other.y,
    }
  }

  /// Computes the Euclidean distance to another point
  ///
  /// # Examples
  ///
  /// ```
  /// use radialfill::Point;
  ///
  /// let p1 = Point::new(0.0, 0.0);
  /// let p2 = Point::new(3.0, 4.0);
  ///
  /// assert_eq!(p1.distance_to(p2), 5.0);
  /// ```
  pub fn distance_to(self, other: Point) -> f32 {
    let dx = other.x - self.x;
    let dy = other.y - self.y;
    (dx * dx + dy * dy).sqrt()
  }
}

impl fmt::Display for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.x, self.y)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_point_creation() {
    let p = Point::new(10.0, 20.0);
    assert_eq!(p.x, 10.0);
    assert_eq!(p.y, 20.0);
  }

  #[test]
  fn test_point_zero() {
    assert_eq!(Point::ZERO, Point::new(0.0, 0.0));
  }

  #[test]
  fn test_point_translate() {
    let p1 = Point::new(10.0, 20.0);
    let p2 = Point::new(5.0, 3.0);
    assert_eq!(p1.translate(p2), Point::new(15.0, 23.0));
  }

  #[test]
  fn test_point_distance() {
    let p1 = Point::new(0.0, 0.0);
    let p2 = Point::new(3.0, 4.0);
    assert!((p1.distance_to(p2) - 5.0).abs() < 0.001);
  }
}
