//! H.265/HEVC two-dimensional transforms
//!
//! H.265 uses integer approximations of DCT and DST transforms.
//! Transform sizes: 4x4, 8x8, 16x16, 32x32
//!
//! For intra prediction, 4x4 luma blocks can use either:
//! - DST (Discrete Sine Transform) - better for directional content
//! - DCT (Discrete Cosine Transform) - general purpose
//!
//! A 2-D transform is two 1-D kernel passes. The first pass transposes, so
//! the second pass runs along the other axis with the same kernel. Kernels are
//! taken from the dispatch table, so an installed SIMD table is picked up here
//! without changes.

use rayon::prelude::*;

use crate::codec::h265::primitives::{self, ButterflyKind, DstKind, Primitives};
use crate::error::{Error, Result};

/// Samples in the largest transform block
pub const MAX_TU_SAMPLES: usize = 32 * 32;

/// Transform size enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSize {
    /// 4x4 transform
    Size4 = 4,
    /// 8x8 transform
    Size8 = 8,
    /// 16x16 transform
    Size16 = 16,
    /// 32x32 transform
    Size32 = 32,
}

impl TransformSize {
    /// Get transform size from log2 value
    pub fn from_log2(log2_size: u8) -> Option<Self> {
        match log2_size {
            2 => Some(TransformSize::Size4),
            3 => Some(TransformSize::Size8),
            4 => Some(TransformSize::Size16),
            5 => Some(TransformSize::Size32),
            _ => None,
        }
    }

    /// Get size in pixels
    pub fn size(&self) -> usize {
        *self as usize
    }

    pub fn log2(&self) -> u32 {
        self.size().trailing_zeros()
    }

    /// Samples in one block
    pub fn samples(&self) -> usize {
        self.size() * self.size()
    }
}

/// H.265 Transform processor
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    /// Bit depth
    bit_depth: u8,
    primitives: &'static Primitives,
}

impl Transform {
    /// Create a transform processor using the process-wide kernel table
    pub fn new(bit_depth: u8) -> Result<Self> {
        Self::with_primitives(bit_depth, primitives::primitives())
    }

    pub fn with_primitives(bit_depth: u8, primitives: &'static Primitives) -> Result<Self> {
        if bit_depth != 8 && bit_depth != 10 && bit_depth != 12 {
            return Err(Error::invalid_input(format!(
                "Invalid bit depth: {}",
                bit_depth
            )));
        }
        Ok(Transform {
            bit_depth,
            primitives,
        })
    }

    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    /// Forward transform (residual -> coefficients)
    ///
    /// # Arguments
    /// * `residual` - Input residual, row-major (size x size)
    /// * `coeffs` - Output coefficients (size x size)
    /// * `size` - Transform size
    /// * `use_dst` - Use DST instead of DCT (only for 4x4 luma intra)
    pub fn forward(
        &self,
        residual: &[i16],
        coeffs: &mut [i16],
        size: TransformSize,
        use_dst: bool,
    ) -> Result<()> {
        check_block(residual.len(), coeffs.len(), size, use_dst)?;

        let n = size.size();
        let log2 = size.log2() as i32;
        let shift1 = log2 - 1 + self.bit_depth as i32 - 8;
        let shift2 = log2 + 6;
        let mut tmp = [0i16; MAX_TU_SAMPLES];

        if use_dst {
            let dst = self.primitives.dst(DstKind::Forward);
            dst(residual, &mut tmp, shift1);
            dst(&tmp, coeffs, shift2);
        } else {
            let kind = ButterflyKind::forward(n)
                .ok_or_else(|| Error::unsupported(format!("{}-point transform", n)))?;
            let butterfly = self.primitives.butterfly(kind);
            butterfly(residual, &mut tmp, shift1, n);
            butterfly(&tmp, coeffs, shift2, n);
        }

        Ok(())
    }

    /// Inverse transform (coefficient domain -> residual domain)
    ///
    /// Output samples are clamped to the 16-bit range after each pass.
    pub fn inverse(
        &self,
        coeffs: &[i16],
        residual: &mut [i16],
        size: TransformSize,
        use_dst: bool,
    ) -> Result<()> {
        check_block(coeffs.len(), residual.len(), size, use_dst)?;

        let n = size.size();
        let shift1 = 7;
        let shift2 = 12 - (self.bit_depth as i32 - 8);
        let mut tmp = [0i16; MAX_TU_SAMPLES];

        if use_dst {
            let dst = self.primitives.dst(DstKind::Inverse);
            dst(coeffs, &mut tmp, shift1);
            dst(&tmp, residual, shift2);
        } else {
            let kind = ButterflyKind::inverse(n)
                .ok_or_else(|| Error::unsupported(format!("{}-point transform", n)))?;
            let butterfly = self.primitives.butterfly(kind);
            butterfly(coeffs, &mut tmp, shift1, n);
            butterfly(&tmp, residual, shift2, n);
        }

        Ok(())
    }

    /// Forward-transform a run of packed blocks in parallel.
    ///
    /// `residuals` and `coeffs` hold the same number of contiguous blocks.
    pub fn forward_blocks(
        &self,
        residuals: &[i16],
        coeffs: &mut [i16],
        size: TransformSize,
        use_dst: bool,
    ) -> Result<()> {
        check_packed(residuals.len(), coeffs.len(), size)?;
        residuals
            .par_chunks(size.samples())
            .zip(coeffs.par_chunks_mut(size.samples()))
            .try_for_each(|(src, dst)| self.forward(src, dst, size, use_dst))
    }

    /// Inverse-transform a run of packed blocks in parallel.
    pub fn inverse_blocks(
        &self,
        coeffs: &[i16],
        residuals: &mut [i16],
        size: TransformSize,
        use_dst: bool,
    ) -> Result<()> {
        check_packed(coeffs.len(), residuals.len(), size)?;
        coeffs
            .par_chunks(size.samples())
            .zip(residuals.par_chunks_mut(size.samples()))
            .try_for_each(|(src, dst)| self.inverse(src, dst, size, use_dst))
    }
}

fn check_block(src_len: usize, dst_len: usize, size: TransformSize, use_dst: bool) -> Result<()> {
    if use_dst && size != TransformSize::Size4 {
        return Err(Error::invalid_input(format!(
            "DST applies to 4x4 blocks only, got {}x{}",
            size.size(),
            size.size()
        )));
    }
    let need = size.samples();
    if src_len < need || dst_len < need {
        return Err(Error::invalid_input(format!(
            "{}x{} transform needs {} samples, got {} in and {} out",
            size.size(),
            size.size(),
            need,
            src_len,
            dst_len
        )));
    }
    Ok(())
}

fn check_packed(src_len: usize, dst_len: usize, size: TransformSize) -> Result<()> {
    if src_len != dst_len || src_len % size.samples() != 0 {
        return Err(Error::invalid_input(format!(
            "packed {}x{} blocks need equal whole-block buffers, got {} and {}",
            size.size(),
            size.size(),
            src_len,
            dst_len
        )));
    }
    Ok(())
}
