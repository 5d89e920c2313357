//! Fractional-sample interpolation for H.265/HEVC motion compensation
//!
//! # Interpolation
//!
//! H.265 uses separable 2D interpolation:
//! - **Luma**: 8-tap filters, 1/4-pixel phases
//! - **Chroma**: 4-tap filters, 1/8-pixel phases
//!
//! # Precision
//!
//! Between the horizontal and vertical passes samples are carried at
//! `IF_INTERNAL_PREC` bits with a DC bias of `-IF_INTERNAL_OFFS`, so the
//! second pass does not lose the first pass's fractional bits. Each kernel is
//! told whether it is the first pass of a chain (`IS_FIRST`) and whether its
//! output is final (`IS_LAST`):
//!
//! | first | last | shift                    | offset                          | clip |
//! |-------|------|--------------------------|---------------------------------|------|
//! | yes   | yes  | `FILTER_PREC`            | `1 << (shift-1)`                | yes  |
//! | no    | yes  | `FILTER_PREC + headroom` | `1 << (shift-1) + OFFS << FILTER_PREC` | yes |
//! | yes   | no   | `FILTER_PREC - headroom` | `-OFFS << shift`                | no   |
//! | no    | no   | `FILTER_PREC`            | `0`                             | no   |
//!
//! where `headroom = IF_INTERNAL_PREC - bit_depth`.

use crate::codec::h265::primitives::{FilterDirection, FilterKey, FilterTaps, Primitives};
use crate::codec::h265::tables::{CHROMA_FILTER, LUMA_FILTER};
use crate::error::{Error, Result};

/// Bits of precision carried between interpolation passes
pub const IF_INTERNAL_PREC: i32 = 14;
/// Log2 of the sum of the filter taps
pub const IF_FILTER_PREC: i32 = 6;
/// DC bias removed from intermediate samples
pub const IF_INTERNAL_OFFS: i32 = 1 << (IF_INTERNAL_PREC - 1);

/// Shift, rounding offset and clip maximum for one pass
#[inline(always)]
fn stage_params(is_first: bool, is_last: bool, bit_depth: u32) -> (i32, i32, i16) {
    let head_room = IF_INTERNAL_PREC - bit_depth as i32;
    let mut shift = IF_FILTER_PREC;

    if is_last {
        if !is_first {
            shift += head_room;
        }
        let mut offset = 1 << (shift - 1);
        if !is_first {
            offset += IF_INTERNAL_OFFS << IF_FILTER_PREC;
        }
        (shift, offset, ((1i32 << bit_depth) - 1) as i16)
    } else {
        if is_first {
            shift -= head_room;
        }
        let offset = if is_first { -IF_INTERNAL_OFFS << shift } else { 0 };
        (shift, offset, 0)
    }
}

/// Weighted sum of `N` taps. Unused taps cost nothing: the branches are on a
/// const parameter and fold away per instantiation.
#[inline(always)]
fn tap_sum<const N: usize>(c: &[i32; 8], sample: impl Fn(usize) -> i32) -> i32 {
    let mut sum = sample(0) * c[0];
    sum += sample(1) * c[1];
    if N >= 4 {
        sum += sample(2) * c[2];
        sum += sample(3) * c[3];
    }
    if N >= 6 {
        sum += sample(4) * c[4];
        sum += sample(5) * c[5];
    }
    if N == 8 {
        sum += sample(6) * c[6];
        sum += sample(7) * c[7];
    }
    sum
}

#[inline(always)]
fn load_taps<const N: usize>(coeff: &[i16]) -> [i32; 8] {
    let mut c = [0i32; 8];
    for (c, &k) in c.iter_mut().zip(&coeff[..N]) {
        *c = k as i32;
    }
    c
}

/// Horizontal `N`-tap filter.
///
/// Output sample `(row, col)` is centred on `src[src_origin + row * src_stride
/// + col]`; the window starts `N/2 - 1` samples to its left, so the caller
/// must leave that much margin on both sides.
///
/// The sum plus offset is narrowed to 16 bits before the shift. The vertical
/// kernel shifts first; both orders are kept as they are bit-exact with the
/// reference encoder.
#[allow(clippy::too_many_arguments)]
pub fn filter_horizontal<const N: usize, const IS_FIRST: bool, const IS_LAST: bool>(
    coeff: &[i16],
    src: &[i16],
    src_origin: usize,
    src_stride: usize,
    dst: &mut [i16],
    dst_stride: usize,
    block_width: usize,
    block_height: usize,
    bit_depth: u32,
) {
    let (shift, offset, max_val) = stage_params(IS_FIRST, IS_LAST, bit_depth);
    let c = load_taps::<N>(coeff);
    let base = src_origin - (N / 2 - 1);

    for row in 0..block_height {
        let s = &src[base + row * src_stride..];
        let d = &mut dst[row * dst_stride..][..block_width];

        for (col, out) in d.iter_mut().enumerate() {
            let sum = tap_sum::<N>(&c, |i| s[col + i] as i32);
            let mut val = ((sum + offset) as i16) >> shift;
            if IS_LAST {
                val = val.clamp(0, max_val);
            }
            *out = val;
        }
    }
}

/// Vertical `N`-tap filter; the window starts `N/2 - 1` rows above.
#[allow(clippy::too_many_arguments)]
pub fn filter_vertical<const N: usize, const IS_FIRST: bool, const IS_LAST: bool>(
    coeff: &[i16],
    src: &[i16],
    src_origin: usize,
    src_stride: usize,
    dst: &mut [i16],
    dst_stride: usize,
    block_width: usize,
    block_height: usize,
    bit_depth: u32,
) {
    let (shift, offset, max_val) = stage_params(IS_FIRST, IS_LAST, bit_depth);
    let c = load_taps::<N>(coeff);
    let base = src_origin - (N / 2 - 1) * src_stride;

    for row in 0..block_height {
        let s = &src[base + row * src_stride..];
        let d = &mut dst[row * dst_stride..][..block_width];

        for (col, out) in d.iter_mut().enumerate() {
            let sum = tap_sum::<N>(&c, |i| s[col + i * src_stride] as i32);
            let mut val = ((sum + offset) >> shift) as i16;
            if IS_LAST {
                val = val.clamp(0, max_val);
            }
            *out = val;
        }
    }
}

/// Fractional-sample predictor built on the registered filter kernels
pub struct Interpolator {
    bit_depth: u32,
    primitives: &'static Primitives,
}

impl Interpolator {
    /// Create a predictor using the process-wide kernel table
    pub fn new(bit_depth: u8) -> Result<Self> {
        Self::with_primitives(bit_depth, crate::codec::h265::primitives::primitives())
    }

    /// Create a predictor using a specific kernel table.
    ///
    /// Only 8-bit samples are accepted: the horizontal kernels narrow the
    /// weighted sum to 16 bits before shifting, which is exact only while the
    /// sum of 8-bit samples fits.
    pub fn with_primitives(bit_depth: u8, primitives: &'static Primitives) -> Result<Self> {
        if bit_depth != 8 {
            return Err(Error::Unsupported(format!(
                "interpolation at bit depth {}",
                bit_depth
            )));
        }

        Ok(Self {
            bit_depth: bit_depth as u32,
            primitives,
        })
    }

    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    /// Predict a luma block at quarter-sample phase (`frac_x`, `frac_y`).
    ///
    /// `src_origin` is the integer position of the block's top-left sample.
    #[allow(clippy::too_many_arguments)]
    pub fn predict_luma(
        &self,
        src: &[i16],
        src_origin: usize,
        src_stride: usize,
        frac_x: u8,
        frac_y: u8,
        dst: &mut [i16],
        dst_stride: usize,
        width: usize,
        height: usize,
    ) {
        self.predict(
            FilterTaps::Eight,
            &LUMA_FILTER[frac_x as usize],
            &LUMA_FILTER[frac_y as usize],
            frac_x != 0,
            frac_y != 0,
            src,
            src_origin,
            src_stride,
            dst,
            dst_stride,
            width,
            height,
        );
    }

    /// Predict a chroma block at eighth-sample phase (`frac_x`, `frac_y`).
    #[allow(clippy::too_many_arguments)]
    pub fn predict_chroma(
        &self,
        src: &[i16],
        src_origin: usize,
        src_stride: usize,
        frac_x: u8,
        frac_y: u8,
        dst: &mut [i16],
        dst_stride: usize,
        width: usize,
        height: usize,
    ) {
        self.predict(
            FilterTaps::Four,
            &CHROMA_FILTER[frac_x as usize],
            &CHROMA_FILTER[frac_y as usize],
            frac_x != 0,
            frac_y != 0,
            src,
            src_origin,
            src_stride,
            dst,
            dst_stride,
            width,
            height,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn predict(
        &self,
        taps: FilterTaps,
        coeff_x: &[i16],
        coeff_y: &[i16],
        has_x: bool,
        has_y: bool,
        src: &[i16],
        src_origin: usize,
        src_stride: usize,
        dst: &mut [i16],
        dst_stride: usize,
        width: usize,
        height: usize,
    ) {
        let h = |first, last| {
            self.primitives
                .filter(FilterKey::new(FilterDirection::Horizontal, taps, first, last))
        };
        let v = |first, last| {
            self.primitives
                .filter(FilterKey::new(FilterDirection::Vertical, taps, first, last))
        };

        match (has_x, has_y) {
            (false, false) => {
                for row in 0..height {
                    dst[row * dst_stride..][..width]
                        .copy_from_slice(&src[src_origin + row * src_stride..][..width]);
                }
            }
            (true, false) => h(true, true)(
                coeff_x, src, src_origin, src_stride, dst, dst_stride, width, height, self.bit_depth,
            ),
            (false, true) => v(true, true)(
                coeff_y, src, src_origin, src_stride, dst, dst_stride, width, height, self.bit_depth,
            ),
            (true, true) => {
                // Horizontal pass covers the rows the vertical window needs
                let margin = taps.count() / 2 - 1;
                let tmp_height = height + taps.count() - 1;
                let mut tmp = vec![0i16; width * tmp_height];

                h(true, false)(
                    coeff_x,
                    src,
                    src_origin - margin * src_stride,
                    src_stride,
                    &mut tmp,
                    width,
                    width,
                    tmp_height,
                    self.bit_depth,
                );
                v(false, true)(
                    coeff_y,
                    &tmp,
                    margin * width,
                    width,
                    dst,
                    dst_stride,
                    width,
                    height,
                    self.bit_depth,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: [i16; 8] = [-1, 4, -11, 40, 40, -11, 4, -1];

    #[test]
    fn test_interpolator_invalid_bit_depth() {
        assert!(Interpolator::new(8).is_ok());
        assert!(matches!(Interpolator::new(10), Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_stage_params() {
        assert_eq!(stage_params(true, true, 8), (6, 32, 255));
        assert_eq!(stage_params(false, true, 8), (12, 2048 + (8192 << 6), 255));
        assert_eq!(stage_params(true, false, 8), (0, -8192, 0));
        assert_eq!(stage_params(true, false, 10), (2, -8192 << 2, 0));
        assert_eq!(stage_params(false, false, 10), (6, 0, 0));
    }

    #[test]
    fn test_flat_input_is_preserved() {
        let src = vec![100i16; 16 * 16];
        let mut dst = vec![0i16; 8];
        filter_horizontal::<8, true, true>(&HALF, &src, 3 * 16 + 4, 16, &mut dst, 4, 4, 2, 8);
        assert!(dst.iter().all(|&s| s == 100));

        filter_vertical::<8, true, true>(&HALF, &src, 3 * 16 + 4, 16, &mut dst, 4, 4, 2, 8);
        assert!(dst.iter().all(|&s| s == 100));
    }

    #[test]
    fn test_first_pass_is_biased_and_unclamped() {
        let src = vec![100i16; 16 * 16];
        let mut dst = vec![0i16; 4];
        filter_horizontal::<8, true, false>(&HALF, &src, 4, 16, &mut dst, 4, 4, 1, 8);
        // 100 * 64 - 8192
        assert!(dst.iter().all(|&s| s == -1792));
    }

    #[test]
    fn test_half_pel_ramp() {
        let src: Vec<i16> = (0..16 * 16).map(|i| ((i % 16) * 10 + (i / 16) * 3) as i16).collect();
        let mut dst = vec![0i16; 8];

        filter_horizontal::<8, true, true>(&HALF, &src, 3 * 16 + 4, 16, &mut dst, 4, 4, 2, 8);
        assert_eq!(dst, vec![54, 64, 74, 84, 57, 67, 77, 87]);

        filter_vertical::<8, true, true>(&HALF, &src, 3 * 16 + 4, 16, &mut dst, 4, 4, 2, 8);
        assert_eq!(dst, vec![51, 61, 71, 81, 54, 64, 74, 84]);
    }

    #[test]
    fn test_last_pass_clamps() {
        // Alternating full-scale columns ring past both ends of the range
        let src: Vec<i16> = (0..16 * 16).map(|i| if i % 2 == 1 { 0 } else { 255 }).collect();
        let mut dst = vec![0i16; 4];
        filter_horizontal::<8, true, true>(&HALF, &src, 3 * 16 + 4, 16, &mut dst, 4, 4, 1, 8);
        assert!(dst.iter().all(|&s| s == 128));

        let spike: Vec<i16> = (0..16 * 16).map(|i| if i % 16 == 7 { 255 } else { 0 }).collect();
        filter_horizontal::<8, true, true>(&HALF, &spike, 16 + 4, 16, &mut dst, 4, 4, 1, 8);
        // Column 5 puts the -11 tap on the spike
        assert_eq!(dst, vec![16, 0, 159, 159]);
    }

    #[test]
    fn test_six_tap() {
        let coeff = [2i16, -9, 57, 18, -6, 2];
        let src = vec![50i16; 64];
        let mut dst = vec![0i16; 2];
        filter_horizontal::<6, true, true>(&coeff, &src, 3 * 8 + 3, 8, &mut dst, 2, 2, 1, 8);
        assert_eq!(dst, vec![50, 50]);
    }

    #[test]
    fn test_predict_luma_2d() {
        let interp = Interpolator::new(8).unwrap();
        let src: Vec<i16> = (0..16 * 16).map(|i| ((i % 16) * 10 + (i / 16) * 3) as i16).collect();
        let mut dst = vec![0i16; 16];

        interp.predict_luma(&src, 3 * 16 + 4, 16, 2, 2, &mut dst, 4, 4, 4);
        assert_eq!(
            dst,
            vec![56, 66, 76, 86, 59, 69, 79, 89, 62, 72, 82, 92, 65, 75, 85, 95]
        );
    }

    #[test]
    fn test_predict_integer_position_copies() {
        let interp = Interpolator::new(8).unwrap();
        let src: Vec<i16> = (0..64).collect();
        let mut dst = vec![0i16; 4];
        interp.predict_chroma(&src, 9, 8, 0, 0, &mut dst, 2, 2, 2);
        assert_eq!(dst, vec![9, 10, 17, 18]);
    }

    #[test]
    fn test_chroma_kernels_10bit() {
        let coeff = CHROMA_FILTER[4];
        let src = vec![512i16; 16 * 16];
        let mut dst = vec![-1i16; 9];

        filter_vertical::<4, true, true>(&coeff, &src, 4 * 16 + 4, 16, &mut dst, 3, 3, 3, 10);
        assert!(dst.iter().all(|&s| s == 512));

        // 512 * 64 cancels the -OFFS bias exactly
        filter_horizontal::<4, true, false>(&coeff, &src, 4 * 16 + 4, 16, &mut dst, 3, 3, 3, 10);
        assert!(dst.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_intermediate_passthrough() {
        let coeff = [0i16, 0, 0, 64, 0, 0, 0, 0];
        let src = vec![-8192i16; 16 * 16];
        let mut dst = vec![0i16; 4];
        filter_vertical::<8, false, false>(&coeff, &src, 4 * 16, 16, &mut dst, 4, 4, 1, 8);
        assert!(dst.iter().all(|&s| s == -8192));

        let zeros = vec![0i16; 16 * 16];
        filter_horizontal::<8, true, false>(&HALF, &zeros, 4 * 16 + 4, 16, &mut dst, 4, 4, 1, 8);
        assert!(dst.iter().all(|&s| s == -8192));
    }

    #[test]
    fn test_predict_chroma_flat() {
        let interp = Interpolator::new(8).unwrap();
        let src = vec![77i16; 16 * 16];
        let mut dst = vec![0i16; 9];
        for (fx, fy) in [(3, 0), (0, 5), (4, 4), (7, 1)] {
            interp.predict_chroma(&src, 4 * 16 + 4, 16, fx, fy, &mut dst, 3, 3, 3);
            assert!(dst.iter().all(|&s| s == 77), "phase ({}, {})", fx, fy);
        }
    }
}
