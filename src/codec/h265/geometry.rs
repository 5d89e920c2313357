//! Partition geometry tables for coding-tree addressing
//!
//! A coding unit of `max_cu_size` pixels is split `depth` times into a grid of
//! minimum partitions. Partitions are numbered in z-scan (Morton) order, which
//! is how the quadtree is traversed; these tables convert that index to raster
//! order and then to the pixel coordinates of the partition's top-left corner.
//!
//! The tables are built once for a configuration and are read-only afterwards,
//! so they can be shared between coding-unit contexts behind an `Arc`.

use crate::error::{Error, Result};

/// Smallest partition edge the tables will describe
pub const MIN_PARTITION_SIZE: u32 = 4;

/// Z-scan / raster / pixel lookup tables for one coding-unit geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryTables {
    max_cu_size: u32,
    depth: u32,
    num_part_in_width: u32,
    min_part_size: u32,
    zscan_to_raster: Vec<u32>,
    raster_to_zscan: Vec<u32>,
    raster_to_pel_x: Vec<u32>,
    raster_to_pel_y: Vec<u32>,
}

impl GeometryTables {
    /// Build the tables for a `max_cu_size` coding unit split `depth` times.
    pub fn new(max_cu_size: u32, depth: u32) -> Result<Self> {
        if !max_cu_size.is_power_of_two() || max_cu_size < MIN_PARTITION_SIZE {
            return Err(Error::invalid_input(format!(
                "coding unit size must be a power of two >= {}, got {}",
                MIN_PARTITION_SIZE, max_cu_size
            )));
        }
        if depth >= u32::BITS || (max_cu_size >> depth) < MIN_PARTITION_SIZE {
            return Err(Error::invalid_input(format!(
                "depth {} splits a {}x{} coding unit below {}x{}",
                depth, max_cu_size, max_cu_size, MIN_PARTITION_SIZE, MIN_PARTITION_SIZE
            )));
        }

        let num_part_in_width = 1u32 << depth;
        let min_part_size = max_cu_size >> depth;
        let num_parts = (num_part_in_width * num_part_in_width) as usize;

        let mut zscan_to_raster = Vec::with_capacity(num_parts);
        for z in 0..num_parts as u32 {
            let x = deinterleave(z);
            let y = deinterleave(z >> 1);
            zscan_to_raster.push(y * num_part_in_width + x);
        }

        let mut raster_to_zscan = vec![0u32; num_parts];
        for (z, &raster) in zscan_to_raster.iter().enumerate() {
            raster_to_zscan[raster as usize] = z as u32;
        }

        let raster_to_pel_x = (0..num_parts as u32)
            .map(|r| (r % num_part_in_width) * min_part_size)
            .collect();
        let raster_to_pel_y = (0..num_parts as u32)
            .map(|r| (r / num_part_in_width) * min_part_size)
            .collect();

        Ok(Self {
            max_cu_size,
            depth,
            num_part_in_width,
            min_part_size,
            zscan_to_raster,
            raster_to_zscan,
            raster_to_pel_x,
            raster_to_pel_y,
        })
    }

    pub fn max_cu_size(&self) -> u32 {
        self.max_cu_size
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn min_part_size(&self) -> u32 {
        self.min_part_size
    }

    pub fn num_part_in_width(&self) -> u32 {
        self.num_part_in_width
    }

    /// Number of minimum partitions in one coding unit
    pub fn num_partitions(&self) -> usize {
        self.zscan_to_raster.len()
    }

    pub fn zscan_to_raster(&self, part_idx: usize) -> u32 {
        self.zscan_to_raster[part_idx]
    }

    pub fn raster_to_zscan(&self, raster_idx: usize) -> u32 {
        self.raster_to_zscan[raster_idx]
    }

    pub fn raster_to_pel_x(&self, raster_idx: usize) -> u32 {
        self.raster_to_pel_x[raster_idx]
    }

    pub fn raster_to_pel_y(&self, raster_idx: usize) -> u32 {
        self.raster_to_pel_y[raster_idx]
    }

    /// Luma pixel coordinates of a z-scan partition's top-left corner
    pub fn part_pel(&self, part_idx: usize) -> (u32, u32) {
        let raster = self.zscan_to_raster[part_idx] as usize;
        (self.raster_to_pel_x[raster], self.raster_to_pel_y[raster])
    }

    /// Sample offset of a z-scan partition in a plane of the given width.
    pub fn part_offset(&self, part_idx: usize, width: usize) -> usize {
        let (x, y) = self.part_pel(part_idx);
        x as usize + y as usize * width
    }

    /// Sample offset of a z-scan partition in a 4:2:0 chroma plane.
    ///
    /// The luma coordinates are combined against the chroma width and the
    /// whole offset is halved in one step. That equals `(x/2) + (y/2) * cw`
    /// only because the chroma plane is exactly half the luma width and every
    /// partition corner lies on an even luma coordinate. A different
    /// subsampling ratio needs a real coordinate recomputation here.
    pub fn chroma_part_offset(&self, part_idx: usize, chroma_width: usize) -> usize {
        self.part_offset(part_idx, chroma_width) >> 1
    }
}

/// Sample offset of raster transform unit `tu_idx` of `blk_size` pixels.
///
/// Equivalent to `((idx * blk) / width) * width * blk + (idx * blk) % width`,
/// computed with masks. `width` must be a power of two.
#[inline]
pub fn tu_offset(tu_idx: usize, blk_size: usize, width: usize) -> usize {
    debug_assert!(width.is_power_of_two());
    let pos = tu_idx * blk_size;
    let blk_x = pos & (width - 1);
    let blk_y = pos & !(width - 1);
    blk_x + blk_y * blk_size
}

/// Collect the even bits of `v` into the low half.
fn deinterleave(v: u32) -> u32 {
    let mut v = v & 0x5555_5555;
    v = (v | (v >> 1)) & 0x3333_3333;
    v = (v | (v >> 2)) & 0x0f0f_0f0f;
    v = (v | (v >> 4)) & 0x00ff_00ff;
    (v | (v >> 8)) & 0x0000_ffff
}
