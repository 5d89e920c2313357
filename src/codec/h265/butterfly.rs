//! Partial butterfly transform kernels
//!
//! Each kernel transforms `line` independent rows. Forward kernels read row
//! `j` from `src[j * N..]` and write coefficient `k` of that row to
//! `dst[k * line + j]`, so the output is already transposed and a second call
//! on it performs the column pass. Inverse kernels do the reverse: they read
//! coefficient `k` of row `j` from `src[k * line + j]` and write samples to
//! `dst[j * N..]`.
//!
//! The symmetric DCT matrices let the input be folded into even sums and odd
//! differences, recursively, so only the distinct half-rows of each matrix
//! are multiplied. The grouping below must stay as is: the result is
//! bit-exact only for this exact order of integer operations.
//!
//! Forward outputs are narrowed to 16 bits without clipping. Inverse outputs
//! are clamped to the i16 range.

use crate::codec::h265::tables::{DCT16_MATRIX, DCT32_MATRIX, DCT4_MATRIX, DCT8_MATRIX};

#[inline(always)]
fn clip16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Forward 4-point DCT
pub fn partial_butterfly_4(src: &[i16], dst: &mut [i16], shift: i32, line: usize) {
    let t = &DCT4_MATRIX;
    let add = 1 << (shift - 1);

    for j in 0..line {
        let s = &src[j * 4..][..4];
        let e = [s[0] as i32 + s[3] as i32, s[1] as i32 + s[2] as i32];
        let o = [s[0] as i32 - s[3] as i32, s[1] as i32 - s[2] as i32];

        dst[j] = ((t[0][0] as i32 * e[0] + t[0][1] as i32 * e[1] + add) >> shift) as i16;
        dst[2 * line + j] = ((t[2][0] as i32 * e[0] + t[2][1] as i32 * e[1] + add) >> shift) as i16;
        dst[line + j] = ((t[1][0] as i32 * o[0] + t[1][1] as i32 * o[1] + add) >> shift) as i16;
        dst[3 * line + j] = ((t[3][0] as i32 * o[0] + t[3][1] as i32 * o[1] + add) >> shift) as i16;
    }
}

/// Forward 8-point DCT
pub fn partial_butterfly_8(src: &[i16], dst: &mut [i16], shift: i32, line: usize) {
    let t = &DCT8_MATRIX;
    let add = 1 << (shift - 1);
    let mut e = [0i32; 4];
    let mut o = [0i32; 4];

    for j in 0..line {
        let s = &src[j * 8..][..8];
        for k in 0..4 {
            e[k] = s[k] as i32 + s[7 - k] as i32;
            o[k] = s[k] as i32 - s[7 - k] as i32;
        }
        let ee = [e[0] + e[3], e[1] + e[2]];
        let eo = [e[0] - e[3], e[1] - e[2]];

        dst[j] = ((t[0][0] as i32 * ee[0] + t[0][1] as i32 * ee[1] + add) >> shift) as i16;
        dst[4 * line + j] = ((t[4][0] as i32 * ee[0] + t[4][1] as i32 * ee[1] + add) >> shift) as i16;
        dst[2 * line + j] = ((t[2][0] as i32 * eo[0] + t[2][1] as i32 * eo[1] + add) >> shift) as i16;
        dst[6 * line + j] = ((t[6][0] as i32 * eo[0] + t[6][1] as i32 * eo[1] + add) >> shift) as i16;

        for k in (1..8).step_by(2) {
            let sum = dot(&t[k][..4], &o);
            dst[k * line + j] = ((sum + add) >> shift) as i16;
        }
    }
}

/// Forward 16-point DCT
pub fn partial_butterfly_16(src: &[i16], dst: &mut [i16], shift: i32, line: usize) {
    let t = &DCT16_MATRIX;
    let add = 1 << (shift - 1);
    let mut e = [0i32; 8];
    let mut o = [0i32; 8];
    let mut ee = [0i32; 4];
    let mut eo = [0i32; 4];

    for j in 0..line {
        let s = &src[j * 16..][..16];
        for k in 0..8 {
            e[k] = s[k] as i32 + s[15 - k] as i32;
            o[k] = s[k] as i32 - s[15 - k] as i32;
        }
        for k in 0..4 {
            ee[k] = e[k] + e[7 - k];
            eo[k] = e[k] - e[7 - k];
        }
        let eee = [ee[0] + ee[3], ee[1] + ee[2]];
        let eeo = [ee[0] - ee[3], ee[1] - ee[2]];

        dst[j] = ((t[0][0] as i32 * eee[0] + t[0][1] as i32 * eee[1] + add) >> shift) as i16;
        dst[8 * line + j] = ((t[8][0] as i32 * eee[0] + t[8][1] as i32 * eee[1] + add) >> shift) as i16;
        dst[4 * line + j] = ((t[4][0] as i32 * eeo[0] + t[4][1] as i32 * eeo[1] + add) >> shift) as i16;
        dst[12 * line + j] =
            ((t[12][0] as i32 * eeo[0] + t[12][1] as i32 * eeo[1] + add) >> shift) as i16;

        for k in (2..16).step_by(4) {
            dst[k * line + j] = ((dot(&t[k][..4], &eo) + add) >> shift) as i16;
        }
        for k in (1..16).step_by(2) {
            dst[k * line + j] = ((dot(&t[k][..8], &o) + add) >> shift) as i16;
        }
    }
}

/// Forward 32-point DCT
pub fn partial_butterfly_32(src: &[i16], dst: &mut [i16], shift: i32, line: usize) {
    let t = &DCT32_MATRIX;
    let add = 1 << (shift - 1);
    let mut e = [0i32; 16];
    let mut o = [0i32; 16];
    let mut ee = [0i32; 8];
    let mut eo = [0i32; 8];
    let mut eee = [0i32; 4];
    let mut eeo = [0i32; 4];

    for j in 0..line {
        let s = &src[j * 32..][..32];
        for k in 0..16 {
            e[k] = s[k] as i32 + s[31 - k] as i32;
            o[k] = s[k] as i32 - s[31 - k] as i32;
        }
        for k in 0..8 {
            ee[k] = e[k] + e[15 - k];
            eo[k] = e[k] - e[15 - k];
        }
        for k in 0..4 {
            eee[k] = ee[k] + ee[7 - k];
            eeo[k] = ee[k] - ee[7 - k];
        }
        let eeee = [eee[0] + eee[3], eee[1] + eee[2]];
        let eeeo = [eee[0] - eee[3], eee[1] - eee[2]];

        dst[j] = ((t[0][0] as i32 * eeee[0] + t[0][1] as i32 * eeee[1] + add) >> shift) as i16;
        dst[16 * line + j] =
            ((t[16][0] as i32 * eeee[0] + t[16][1] as i32 * eeee[1] + add) >> shift) as i16;
        dst[8 * line + j] = ((t[8][0] as i32 * eeeo[0] + t[8][1] as i32 * eeeo[1] + add) >> shift) as i16;
        dst[24 * line + j] =
            ((t[24][0] as i32 * eeeo[0] + t[24][1] as i32 * eeeo[1] + add) >> shift) as i16;

        for k in (4..32).step_by(8) {
            dst[k * line + j] = ((dot(&t[k][..4], &eeo) + add) >> shift) as i16;
        }
        for k in (2..32).step_by(4) {
            dst[k * line + j] = ((dot(&t[k][..8], &eo) + add) >> shift) as i16;
        }
        for k in (1..32).step_by(2) {
            dst[k * line + j] = ((dot(&t[k][..16], &o) + add) >> shift) as i16;
        }
    }
}

/// Inverse 4-point DCT
pub fn partial_butterfly_inverse_4(src: &[i16], dst: &mut [i16], shift: i32, line: usize) {
    let t = &DCT4_MATRIX;
    let add = 1 << (shift - 1);

    for j in 0..line {
        let c = |k: usize| src[k * line + j] as i32;

        let o = [
            t[1][0] as i32 * c(1) + t[3][0] as i32 * c(3),
            t[1][1] as i32 * c(1) + t[3][1] as i32 * c(3),
        ];
        let e = [
            t[0][0] as i32 * c(0) + t[2][0] as i32 * c(2),
            t[0][1] as i32 * c(0) + t[2][1] as i32 * c(2),
        ];

        let d = &mut dst[j * 4..][..4];
        d[0] = clip16((e[0] + o[0] + add) >> shift);
        d[1] = clip16((e[1] + o[1] + add) >> shift);
        d[2] = clip16((e[1] - o[1] + add) >> shift);
        d[3] = clip16((e[0] - o[0] + add) >> shift);
    }
}

/// Inverse 8-point DCT
pub fn partial_butterfly_inverse_8(src: &[i16], dst: &mut [i16], shift: i32, line: usize) {
    let t = &DCT8_MATRIX;
    let add = 1 << (shift - 1);
    let mut o = [0i32; 4];
    let mut e = [0i32; 4];

    for j in 0..line {
        let c = |k: usize| src[k * line + j] as i32;

        for k in 0..4 {
            o[k] = t[1][k] as i32 * c(1)
                + t[3][k] as i32 * c(3)
                + t[5][k] as i32 * c(5)
                + t[7][k] as i32 * c(7);
        }
        let eo = [
            t[2][0] as i32 * c(2) + t[6][0] as i32 * c(6),
            t[2][1] as i32 * c(2) + t[6][1] as i32 * c(6),
        ];
        let ee = [
            t[0][0] as i32 * c(0) + t[4][0] as i32 * c(4),
            t[0][1] as i32 * c(0) + t[4][1] as i32 * c(4),
        ];

        e[0] = ee[0] + eo[0];
        e[3] = ee[0] - eo[0];
        e[1] = ee[1] + eo[1];
        e[2] = ee[1] - eo[1];

        let d = &mut dst[j * 8..][..8];
        for k in 0..4 {
            d[k] = clip16((e[k] + o[k] + add) >> shift);
            d[k + 4] = clip16((e[3 - k] - o[3 - k] + add) >> shift);
        }
    }
}

/// Inverse 16-point DCT
pub fn partial_butterfly_inverse_16(src: &[i16], dst: &mut [i16], shift: i32, line: usize) {
    let t = &DCT16_MATRIX;
    let add = 1 << (shift - 1);
    let mut o = [0i32; 8];
    let mut eo = [0i32; 4];
    let mut ee = [0i32; 4];
    let mut e = [0i32; 8];

    for j in 0..line {
        let c = |k: usize| src[k * line + j] as i32;

        for (k, o) in o.iter_mut().enumerate() {
            *o = (1..16).step_by(2).map(|r| t[r][k] as i32 * c(r)).sum();
        }
        for (k, eo) in eo.iter_mut().enumerate() {
            *eo = t[2][k] as i32 * c(2)
                + t[6][k] as i32 * c(6)
                + t[10][k] as i32 * c(10)
                + t[14][k] as i32 * c(14);
        }
        let eeo = [
            t[4][0] as i32 * c(4) + t[12][0] as i32 * c(12),
            t[4][1] as i32 * c(4) + t[12][1] as i32 * c(12),
        ];
        let eee = [
            t[0][0] as i32 * c(0) + t[8][0] as i32 * c(8),
            t[0][1] as i32 * c(0) + t[8][1] as i32 * c(8),
        ];

        for k in 0..2 {
            ee[k] = eee[k] + eeo[k];
            ee[k + 2] = eee[1 - k] - eeo[1 - k];
        }
        for k in 0..4 {
            e[k] = ee[k] + eo[k];
            e[k + 4] = ee[3 - k] - eo[3 - k];
        }

        let d = &mut dst[j * 16..][..16];
        for k in 0..8 {
            d[k] = clip16((e[k] + o[k] + add) >> shift);
            d[k + 8] = clip16((e[7 - k] - o[7 - k] + add) >> shift);
        }
    }
}

/// Inverse 32-point DCT
pub fn partial_butterfly_inverse_32(src: &[i16], dst: &mut [i16], shift: i32, line: usize) {
    let t = &DCT32_MATRIX;
    let add = 1 << (shift - 1);
    let mut o = [0i32; 16];
    let mut eo = [0i32; 8];
    let mut eeo = [0i32; 4];
    let mut eee = [0i32; 4];
    let mut ee = [0i32; 8];
    let mut e = [0i32; 16];

    for j in 0..line {
        let c = |k: usize| src[k * line + j] as i32;

        for (k, o) in o.iter_mut().enumerate() {
            *o = (1..32).step_by(2).map(|r| t[r][k] as i32 * c(r)).sum();
        }
        for (k, eo) in eo.iter_mut().enumerate() {
            *eo = (2..32).step_by(4).map(|r| t[r][k] as i32 * c(r)).sum();
        }
        for (k, eeo) in eeo.iter_mut().enumerate() {
            *eeo = t[4][k] as i32 * c(4)
                + t[12][k] as i32 * c(12)
                + t[20][k] as i32 * c(20)
                + t[28][k] as i32 * c(28);
        }
        let eeeo = [
            t[8][0] as i32 * c(8) + t[24][0] as i32 * c(24),
            t[8][1] as i32 * c(8) + t[24][1] as i32 * c(24),
        ];
        let eeee = [
            t[0][0] as i32 * c(0) + t[16][0] as i32 * c(16),
            t[0][1] as i32 * c(0) + t[16][1] as i32 * c(16),
        ];

        eee[0] = eeee[0] + eeeo[0];
        eee[3] = eeee[0] - eeeo[0];
        eee[1] = eeee[1] + eeeo[1];
        eee[2] = eeee[1] - eeeo[1];
        for k in 0..4 {
            ee[k] = eee[k] + eeo[k];
            ee[k + 4] = eee[3 - k] - eeo[3 - k];
        }
        for k in 0..8 {
            e[k] = ee[k] + eo[k];
            e[k + 8] = ee[7 - k] - eo[7 - k];
        }

        let d = &mut dst[j * 32..][..32];
        for k in 0..16 {
            d[k] = clip16((e[k] + o[k] + add) >> shift);
            d[k + 16] = clip16((e[15 - k] - o[15 - k] + add) >> shift);
        }
    }
}

/// Forward 4x4 DST-VII, one full pass over a 4x4 block.
///
/// Reads rows of `block` and writes the transposed coefficients to `coeff`.
pub fn fast_forward_dst(block: &[i16], coeff: &mut [i16], shift: i32) {
    let rnd = 1 << (shift - 1);

    for i in 0..4 {
        let b = |k: usize| block[4 * i + k] as i32;
        let c = [b(0) + b(3), b(1) + b(3), b(0) - b(1), 74 * b(2)];

        coeff[i] = ((29 * c[0] + 55 * c[1] + c[3] + rnd) >> shift) as i16;
        coeff[4 + i] = ((74 * (b(0) + b(1) - b(3)) + rnd) >> shift) as i16;
        coeff[8 + i] = ((29 * c[2] + 55 * c[0] - c[3] + rnd) >> shift) as i16;
        coeff[12 + i] = ((55 * c[2] - 29 * c[1] + c[3] + rnd) >> shift) as i16;
    }
}

/// Inverse 4x4 DST-VII, one full pass over a 4x4 block.
///
/// Not butterfly-symmetric: every output is its own combination of the four
/// input coefficients, rounded and clamped independently.
pub fn fast_inverse_dst(tmp: &[i16], block: &mut [i16], shift: i32) {
    let rnd = 1 << (shift - 1);

    for i in 0..4 {
        let t = |k: usize| tmp[4 * k + i] as i32;
        let c = [t(0) + t(2), t(2) + t(3), t(0) - t(3), 74 * t(1)];

        block[4 * i] = clip16((29 * c[0] + 55 * c[1] + c[3] + rnd) >> shift);
        block[4 * i + 1] = clip16((55 * c[2] - 29 * c[1] + c[3] + rnd) >> shift);
        block[4 * i + 2] = clip16((74 * (t(0) - t(2) + t(3)) + rnd) >> shift);
        block[4 * i + 3] = clip16((55 * c[0] + 29 * c[2] - c[3] + rnd) >> shift);
    }
}

#[inline(always)]
fn dot(row: &[i16], v: &[i32]) -> i32 {
    row.iter().zip(v).map(|(&c, &x)| c as i32 * x).sum()
}
