//! Signed 16-bit residual planes for one coding unit
//!
//! `ShortYuv` holds the luma and two 4:2:0 chroma difference planes that the
//! prediction, transform and reconstruction stages pass between each other.
//! Sub-blocks are addressed two ways:
//!
//! - **Partition index**: z-scan index into the coding tree, resolved through
//!   [`GeometryTables`]
//! - **Transform-unit index**: raster index of `blk_size` square blocks,
//!   resolved with [`tu_offset`]
//!
//! Block sizes and indices are trusted. A mismatch is a programming error and
//! surfaces as a slice-index panic rather than as an `Err`.

use std::sync::Arc;

use crate::codec::h265::geometry::{tu_offset, GeometryTables};
use crate::codec::h265::yuv::{Pixel, Yuv};
use crate::error::{Error, Result};

/// One of the three planes of a 4:2:0 buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    Luma,
    Cb,
    Cr,
}

impl Plane {
    pub fn is_chroma(self) -> bool {
        self != Plane::Luma
    }
}

/// Chroma plane selector for single-plane copies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChromaPlane {
    Cb,
    Cr,
}

impl From<ChromaPlane> for Plane {
    fn from(c: ChromaPlane) -> Self {
        match c {
            ChromaPlane::Cb => Plane::Cb,
            ChromaPlane::Cr => Plane::Cr,
        }
    }
}

/// Destination of a partition copy out of a residual buffer
pub trait PartTarget {
    /// Store a `width` x `height` block read from `src` (row pitch
    /// `src_stride`) at partition `part_idx` of `plane`.
    fn store_part(
        &mut self,
        plane: Plane,
        part_idx: usize,
        src: &[i16],
        src_stride: usize,
        width: usize,
        height: usize,
    );
}

/// Allocate a zero-filled plane, reporting failure instead of aborting.
pub(crate) fn alloc_plane<T: Copy + Default>(plane: &'static str, samples: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    if buf.try_reserve_exact(samples).is_err() {
        tracing::error!("failed to allocate {} plane of {} samples", plane, samples);
        return Err(Error::Alloc { plane, samples });
    }
    buf.resize(samples, T::default());
    Ok(buf)
}

/// Residual (difference) buffer for one coding unit
#[derive(Debug, Clone)]
pub struct ShortYuv {
    y: Vec<i16>,
    cb: Vec<i16>,
    cr: Vec<i16>,
    width: usize,
    height: usize,
    c_width: usize,
    c_height: usize,
    geometry: Arc<GeometryTables>,
}

impl ShortYuv {
    /// Create an unallocated buffer; call [`ShortYuv::create`] before use.
    pub fn new(geometry: Arc<GeometryTables>) -> Self {
        Self {
            y: Vec::new(),
            cb: Vec::new(),
            cr: Vec::new(),
            width: 0,
            height: 0,
            c_width: 0,
            c_height: 0,
            geometry,
        }
    }

    /// Create and allocate in one step
    pub fn with_size(width: usize, height: usize, geometry: Arc<GeometryTables>) -> Result<Self> {
        let mut buf = Self::new(geometry);
        buf.create(width, height)?;
        Ok(buf)
    }

    /// Allocate the three planes: `width x height` luma and two
    /// `width/2 x height/2` chroma planes. Any previous planes are released.
    pub fn create(&mut self, width: usize, height: usize) -> Result<()> {
        debug_assert!(width.is_power_of_two() && height.is_power_of_two());
        self.destroy();

        let c_width = width >> 1;
        let c_height = height >> 1;
        let y = alloc_plane("luma", width * height)?;
        let cb = alloc_plane("cb", c_width * c_height)?;
        let cr = alloc_plane("cr", c_width * c_height)?;

        self.y = y;
        self.cb = cb;
        self.cr = cr;
        self.width = width;
        self.height = height;
        self.c_width = c_width;
        self.c_height = c_height;
        tracing::debug!("created {}x{} residual buffer", width, height);
        Ok(())
    }

    /// Release all planes. Harmless on an unallocated buffer.
    pub fn destroy(&mut self) {
        if !self.is_allocated() {
            return;
        }
        self.y = Vec::new();
        self.cb = Vec::new();
        self.cr = Vec::new();
        self.width = 0;
        self.height = 0;
        self.c_width = 0;
        self.c_height = 0;
        tracing::debug!("destroyed residual buffer");
    }

    pub fn is_allocated(&self) -> bool {
        !self.y.is_empty()
    }

    /// Zero-fill all three planes
    pub fn clear(&mut self) {
        self.y.fill(0);
        self.cb.fill(0);
        self.cr.fill(0);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn chroma_width(&self) -> usize {
        self.c_width
    }

    pub fn chroma_height(&self) -> usize {
        self.c_height
    }

    pub fn geometry(&self) -> &Arc<GeometryTables> {
        &self.geometry
    }

    /// Row pitch of a plane
    pub fn stride(&self, plane: Plane) -> usize {
        if plane.is_chroma() {
            self.c_width
        } else {
            self.width
        }
    }

    pub fn luma(&self) -> &[i16] {
        &self.y
    }

    pub fn cb(&self) -> &[i16] {
        &self.cb
    }

    pub fn cr(&self) -> &[i16] {
        &self.cr
    }

    pub fn plane(&self, plane: Plane) -> &[i16] {
        match plane {
            Plane::Luma => &self.y,
            Plane::Cb => &self.cb,
            Plane::Cr => &self.cr,
        }
    }

    pub fn plane_mut(&mut self, plane: Plane) -> &mut [i16] {
        match plane {
            Plane::Luma => &mut self.y,
            Plane::Cb => &mut self.cb,
            Plane::Cr => &mut self.cr,
        }
    }

    /// Offset of z-scan partition `part_idx` within `plane`
    pub fn part_offset(&self, plane: Plane, part_idx: usize) -> usize {
        if plane.is_chroma() {
            self.geometry.chroma_part_offset(part_idx, self.c_width)
        } else {
            self.geometry.part_offset(part_idx, self.width)
        }
    }

    /// Offset of raster transform unit `tu_idx` of `blk_size` within `plane`
    pub fn tu_offset(&self, plane: Plane, tu_idx: usize, blk_size: usize) -> usize {
        tu_offset(tu_idx, blk_size, self.stride(plane))
    }

    /// Samples of `plane` starting at partition `part_idx`
    pub fn part(&self, plane: Plane, part_idx: usize) -> &[i16] {
        let offset = self.part_offset(plane, part_idx);
        &self.plane(plane)[offset..]
    }

    pub fn part_mut(&mut self, plane: Plane, part_idx: usize) -> &mut [i16] {
        let offset = self.part_offset(plane, part_idx);
        &mut self.plane_mut(plane)[offset..]
    }

    /// Samples of `plane` starting at transform unit `tu_idx`
    pub fn tu(&self, plane: Plane, tu_idx: usize, blk_size: usize) -> &[i16] {
        let offset = self.tu_offset(plane, tu_idx, blk_size);
        &self.plane(plane)[offset..]
    }

    pub fn tu_mut(&mut self, plane: Plane, tu_idx: usize, blk_size: usize) -> &mut [i16] {
        let offset = self.tu_offset(plane, tu_idx, blk_size);
        &mut self.plane_mut(plane)[offset..]
    }

    /// `self = src0 - src1` over a `part_size` luma block and the matching
    /// half-size chroma blocks.
    pub fn subtract(&mut self, src0: &Yuv, src1: &Yuv, tu_idx: usize, part_size: usize) {
        self.subtract_luma(src0, src1, tu_idx, part_size);
        self.subtract_chroma(src0, src1, tu_idx, part_size >> 1);
    }

    pub fn subtract_luma(&mut self, src0: &Yuv, src1: &Yuv, tu_idx: usize, part_size: usize) {
        self.subtract_plane(Plane::Luma, src0, src1, tu_idx, part_size);
    }

    /// `part_size` is the chroma block size here
    pub fn subtract_chroma(&mut self, src0: &Yuv, src1: &Yuv, tu_idx: usize, part_size: usize) {
        self.subtract_plane(Plane::Cb, src0, src1, tu_idx, part_size);
        self.subtract_plane(Plane::Cr, src0, src1, tu_idx, part_size);
    }

    fn subtract_plane(&mut self, plane: Plane, src0: &Yuv, src1: &Yuv, tu_idx: usize, size: usize) {
        let dst_stride = self.stride(plane);
        let a = src0.tu(plane, tu_idx, size);
        let b = src1.tu(plane, tu_idx, size);
        let (a_stride, b_stride) = (src0.stride(plane), src1.stride(plane));
        let dst = self.tu_mut(plane, tu_idx, size);

        for row in 0..size {
            let d = &mut dst[row * dst_stride..][..size];
            let a = &a[row * a_stride..][..size];
            let b = &b[row * b_stride..][..size];
            for ((d, &a), &b) in d.iter_mut().zip(a).zip(b) {
                *d = (a as i32 - b as i32) as i16;
            }
        }
    }

    /// `self = clip(src0 + src1)` over a `part_size` luma block and the
    /// matching chroma blocks, clipped to `[0, (1 << bit_depth) - 1]`.
    pub fn add_clip(
        &mut self,
        src0: &ShortYuv,
        src1: &ShortYuv,
        tu_idx: usize,
        part_size: usize,
        bit_depth: u32,
    ) {
        self.add_clip_luma(src0, src1, tu_idx, part_size, bit_depth);
        self.add_clip_chroma(src0, src1, tu_idx, part_size >> 1, bit_depth);
    }

    pub fn add_clip_luma(
        &mut self,
        src0: &ShortYuv,
        src1: &ShortYuv,
        tu_idx: usize,
        part_size: usize,
        bit_depth: u32,
    ) {
        self.add_clip_plane(Plane::Luma, src0, src1, tu_idx, part_size, bit_depth);
    }

    /// `part_size` is the chroma block size here
    pub fn add_clip_chroma(
        &mut self,
        src0: &ShortYuv,
        src1: &ShortYuv,
        tu_idx: usize,
        part_size: usize,
        bit_depth: u32,
    ) {
        self.add_clip_plane(Plane::Cb, src0, src1, tu_idx, part_size, bit_depth);
        self.add_clip_plane(Plane::Cr, src0, src1, tu_idx, part_size, bit_depth);
    }

    fn add_clip_plane(
        &mut self,
        plane: Plane,
        src0: &ShortYuv,
        src1: &ShortYuv,
        tu_idx: usize,
        size: usize,
        bit_depth: u32,
    ) {
        let max_val = (1i32 << bit_depth) - 1;
        let dst_stride = self.stride(plane);
        let a = src0.tu(plane, tu_idx, size);
        let b = src1.tu(plane, tu_idx, size);
        let (a_stride, b_stride) = (src0.stride(plane), src1.stride(plane));
        let dst = self.tu_mut(plane, tu_idx, size);

        for row in 0..size {
            let d = &mut dst[row * dst_stride..][..size];
            let a = &a[row * a_stride..][..size];
            let b = &b[row * b_stride..][..size];
            for ((d, &a), &b) in d.iter_mut().zip(a).zip(b) {
                *d = (a as i32 + b as i32).clamp(0, max_val) as i16;
            }
        }
    }

    /// Copy a `width x height` luma block and its half-size chroma blocks at
    /// partition `part_idx` into `dst`.
    pub fn copy_part_to_part_yuv<T: PartTarget>(
        &self,
        dst: &mut T,
        part_idx: usize,
        width: usize,
        height: usize,
    ) {
        self.copy_part_to_part_luma(dst, part_idx, width, height);
        self.copy_part_to_part_chroma(dst, part_idx, width >> 1, height >> 1);
    }

    pub fn copy_part_to_part_luma<T: PartTarget>(
        &self,
        dst: &mut T,
        part_idx: usize,
        width: usize,
        height: usize,
    ) {
        self.copy_plane(Plane::Luma, dst, part_idx, width, height);
    }

    /// `width` and `height` are chroma dimensions here
    pub fn copy_part_to_part_chroma<T: PartTarget>(
        &self,
        dst: &mut T,
        part_idx: usize,
        width: usize,
        height: usize,
    ) {
        self.copy_plane(Plane::Cb, dst, part_idx, width, height);
        self.copy_plane(Plane::Cr, dst, part_idx, width, height);
    }

    /// Copy only one chroma plane
    pub fn copy_part_to_part_chroma_plane<T: PartTarget>(
        &self,
        dst: &mut T,
        part_idx: usize,
        width: usize,
        height: usize,
        chroma: ChromaPlane,
    ) {
        self.copy_plane(chroma.into(), dst, part_idx, width, height);
    }

    fn copy_plane<T: PartTarget>(
        &self,
        plane: Plane,
        dst: &mut T,
        part_idx: usize,
        width: usize,
        height: usize,
    ) {
        let src = self.part(plane, part_idx);
        dst.store_part(plane, part_idx, src, self.stride(plane), width, height);
    }
}

impl PartTarget for ShortYuv {
    fn store_part(
        &mut self,
        plane: Plane,
        part_idx: usize,
        src: &[i16],
        src_stride: usize,
        width: usize,
        height: usize,
    ) {
        let dst_stride = self.stride(plane);
        let dst = self.part_mut(plane, part_idx);
        for row in 0..height {
            dst[row * dst_stride..][..width].copy_from_slice(&src[row * src_stride..][..width]);
        }
    }
}

impl PartTarget for Yuv {
    fn store_part(
        &mut self,
        plane: Plane,
        part_idx: usize,
        src: &[i16],
        src_stride: usize,
        width: usize,
        height: usize,
    ) {
        let dst_stride = self.stride(plane);
        let dst = self.part_mut(plane, part_idx);
        for row in 0..height {
            let d = &mut dst[row * dst_stride..][..width];
            let s = &src[row * src_stride..][..width];
            for (d, &s) in d.iter_mut().zip(s) {
                *d = s as Pixel;
            }
        }
    }
}
