//! Precomputed square-root lookup table
//!
//! The simple fill path tracks the *squared* normalized distance from the
//! gradient center incrementally, so the only square root it needs per pixel
//! is over `[0, 1)`. A small quantized table plus linear interpolation turns
//! that into one multiply-add, which is what makes the incremental path pay
//! off against a hardware sqrt per pixel.
//!
//! The table is process-wide, immutable, and built exactly once. `OnceLock`
//! guarantees initialize-before-publish, so concurrent readers only ever
//! observe a fully-built table.

use std::sync::OnceLock;

/// Number of quantization steps over `[0, 1)`; the table holds one extra
/// entry so `table()[SQRT_LUT_SIZE] == 1.0` and interpolation at the top end
/// never indexes out of bounds.
pub const SQRT_LUT_SIZE: usize = 1 << 11;

static SQRT_LUT: OnceLock<Vec<f32>> = OnceLock::new();

/// The shared table: `table()[k] == sqrt(k / SQRT_LUT_SIZE)`.
pub(crate) fn table() -> &'static [f32] {
  SQRT_LUT.get_or_init(|| {
    (0..=SQRT_LUT_SIZE)
      .map(|k| (k as f32 / SQRT_LUT_SIZE as f32).sqrt())
      .collect()
  })
}

/// Approximates `sqrt(frac)` for `frac` in `[0, 1]` by linear interpolation
/// between adjacent table entries.
///
/// Away from the immediate vicinity of zero (where sqrt's curvature exceeds
/// what a 2048-step linear table can follow) the approximation error is
/// bounded by half the table's quantization step, i.e.
/// `1 / (2 * SQRT_LUT_SIZE)`. Inputs outside `[0, 1]` are clamped.
///
/// # Examples
///
/// ```
/// use radialfill::approx_sqrt;
///
/// assert!((approx_sqrt(0.25) - 0.5).abs() < 0.00025);
/// assert_eq!(approx_sqrt(0.0), 0.0);
/// assert_eq!(approx_sqrt(1.0), 1.0);
/// ```
pub fn approx_sqrt(frac: f32) -> f32 {
  let lut = table();
  let f_index = (frac.clamp(0.0, 1.0)) * SQRT_LUT_SIZE as f32;
  let i_index = (f_index as usize).min(SQRT_LUT_SIZE - 1);
  let s0 = lut[i_index];
  let s1 = lut[i_index + 1];
  s0 + (f_index - i_index as f32) * (s1 - s0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn table_entries_match_exact_sqrt() {
    let lut = table();
    assert_eq!(lut.len(), SQRT_LUT_SIZE + 1);
    for (k, &entry) in lut.iter().enumerate() {
      let exact = (k as f64 / SQRT_LUT_SIZE as f64).sqrt() as f32;
      assert!(
        (entry - exact).abs() <= 1e-6,
        "lut[{k}] = {entry}, exact = {exact}"
      );
    }
  }

  #[test]
  fn interpolated_sqrt_within_half_quantization_step() {
    let bound = 1.0 / (2.0 * SQRT_LUT_SIZE as f32);
    // sqrt's second derivative is unbounded at zero, so the half-step bound
    // only holds past the first couple of table cells.
    let mut g = 0.001f32;
    while g <= 1.0 {
      let approx = approx_sqrt(g);
      let exact = (g as f64).sqrt() as f32;
      assert!(
        (approx - exact).abs() <= bound,
        "approx_sqrt({g}) = {approx}, exact = {exact}"
      );
      g += 1.0 / 7919.0;
    }
    assert!((approx_sqrt(0.3333) - 0.3333f32.sqrt()).abs() < 0.00025);
  }

  #[test]
  fn out_of_range_inputs_are_clamped() {
    assert_eq!(approx_sqrt(-0.5), 0.0);
    assert_eq!(approx_sqrt(2.0), 1.0);
  }
}
