//! Full-precision 4:2:0 sample buffer
//!
//! `Yuv` is the prediction / original-picture block that residuals are formed
//! from and reconstructed into. It uses the same partition and transform-unit
//! addressing as [`ShortYuv`](crate::codec::h265::short_yuv::ShortYuv), with
//! unsigned samples wide enough for 12-bit content.

use std::sync::Arc;

use crate::codec::h265::geometry::{tu_offset, GeometryTables};
use crate::codec::h265::short_yuv::{alloc_plane, Plane};
use crate::error::Result;

/// Sample type of full-precision planes
pub type Pixel = u16;

/// Picture-domain sample buffer for one coding unit
#[derive(Debug, Clone)]
pub struct Yuv {
    y: Vec<Pixel>,
    cb: Vec<Pixel>,
    cr: Vec<Pixel>,
    width: usize,
    height: usize,
    c_width: usize,
    c_height: usize,
    geometry: Arc<GeometryTables>,
}

impl Yuv {
    /// Allocate a zero-filled `width x height` buffer with 4:2:0 chroma
    pub fn create(width: usize, height: usize, geometry: Arc<GeometryTables>) -> Result<Self> {
        let c_width = width >> 1;
        let c_height = height >> 1;
        Ok(Self {
            y: alloc_plane("luma", width * height)?,
            cb: alloc_plane("cb", c_width * c_height)?,
            cr: alloc_plane("cr", c_width * c_height)?,
            width,
            height,
            c_width,
            c_height,
            geometry,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn chroma_height(&self) -> usize {
        self.c_height
    }

    pub fn stride(&self, plane: Plane) -> usize {
        if plane.is_chroma() {
            self.c_width
        } else {
            self.width
        }
    }

    pub fn luma(&self) -> &[Pixel] {
        &self.y
    }

    pub fn plane(&self, plane: Plane) -> &[Pixel] {
        match plane {
            Plane::Luma => &self.y,
            Plane::Cb => &self.cb,
            Plane::Cr => &self.cr,
        }
    }

    pub fn plane_mut(&mut self, plane: Plane) -> &mut [Pixel] {
        match plane {
            Plane::Luma => &mut self.y,
            Plane::Cb => &mut self.cb,
            Plane::Cr => &mut self.cr,
        }
    }

    pub fn part_offset(&self, plane: Plane, part_idx: usize) -> usize {
        if plane.is_chroma() {
            self.geometry.chroma_part_offset(part_idx, self.c_width)
        } else {
            self.geometry.part_offset(part_idx, self.width)
        }
    }

    pub fn part_mut(&mut self, plane: Plane, part_idx: usize) -> &mut [Pixel] {
        let offset = self.part_offset(plane, part_idx);
        &mut self.plane_mut(plane)[offset..]
    }

    pub fn tu_offset(&self, plane: Plane, tu_idx: usize, blk_size: usize) -> usize {
        tu_offset(tu_idx, blk_size, self.stride(plane))
    }

    pub fn tu(&self, plane: Plane, tu_idx: usize, blk_size: usize) -> &[Pixel] {
        let offset = self.tu_offset(plane, tu_idx, blk_size);
        &self.plane(plane)[offset..]
    }
}
