//! Guarded pixmap allocation

use tiny_skia::Pixmap;

const BYTES_PER_PIXEL: u64 = 4;
/// Upper bound on a single pixmap allocation to avoid process aborts on OOM.
pub(crate) const MAX_PIXMAP_BYTES: u64 = 512 * 1024 * 1024;

/// Allocates a zeroed pixmap, refusing zero-sized or oversized targets.
pub(crate) fn new_pixmap(width: u32, height: u32) -> Option<Pixmap> {
  if width == 0 || height == 0 {
    return None;
  }
  let bytes = width as u64 * height as u64 * BYTES_PER_PIXEL;
  if bytes > MAX_PIXMAP_BYTES {
    return None;
  }
  Pixmap::new(width, height)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_zero_dimensions() {
    assert!(new_pixmap(0, 10).is_none());
    assert!(new_pixmap(10, 0).is_none());
  }

  #[test]
  fn rejects_oversized_allocation() {
    assert!(new_pixmap(1 << 16, 1 << 16).is_none());
  }

  #[test]
  fn allocates_zeroed() {
    let pixmap = new_pixmap(4, 4).expect("pixmap");
    assert!(pixmap.data().iter().all(|&b| b == 0));
  }
}
