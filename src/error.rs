//! Error types for radialfill
//!
//! The fill paths themselves are infallible: they always produce some color
//! for every pixel, with garbage-in/garbage-out semantics on invalid input.
//! Errors only exist at the pixmap-producing API surface, where allocation
//! or parameter validation can fail before any pixel is touched.

use thiserror::Error;

/// Result type alias for radialfill operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors produced by the pixmap-level rasterization entry points
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
  /// Invalid rasterization parameters
  #[error("Invalid paint parameters: {message}")]
  InvalidParameters { message: String },

  /// Pixmap allocation failed or would exceed the allocation bound
  #[error("Failed to allocate pixmap: {width}x{height}")]
  AllocationFailed { width: u32, height: u32 },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_invalid_parameters_display() {
    let error = RenderError::InvalidParameters {
      message: "radius must be finite".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("radius must be finite"));
  }

  #[test]
  fn test_allocation_failed_display() {
    let error = RenderError::AllocationFailed {
      width: 70000,
      height: 70000,
    };
    let display = format!("{}", error);
    assert!(display.contains("70000x70000"));
  }
}
