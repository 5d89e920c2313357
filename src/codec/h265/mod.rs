//! H.265/HEVC transform and interpolation core
//!
//! The residual path of an HEVC encoder, below mode decision and above
//! entropy coding:
//!
//! - [`geometry`]: z-scan, raster and pixel lookup tables for coding units
//! - [`short_yuv`]: signed 16-bit residual buffers with partition and
//!   transform-unit addressing
//! - [`yuv`]: full-precision picture blocks residuals are formed against
//! - [`butterfly`]: 1-D DCT/DST kernels (4, 8, 16, 32 points)
//! - [`transform`]: 2-D forward and inverse transforms built on the kernels
//! - [`mc`]: fractional-sample interpolation filters and the predictor
//! - [`primitives`]: the write-once kernel dispatch table
//!
//! All kernels are pure functions over caller-owned slices. Buffers are owned
//! by one coding-unit context at a time; independent contexts can run on
//! separate threads.

pub mod butterfly;
pub mod geometry;
pub mod mc;
pub mod primitives;
pub mod short_yuv;
pub mod tables;
pub mod transform;
pub mod yuv;

pub use geometry::{tu_offset, GeometryTables, MIN_PARTITION_SIZE};
pub use mc::Interpolator;
pub use primitives::{
    install, primitives, ButterflyKind, DstKind, FilterDirection, FilterKey, FilterTaps, Primitives,
};
pub use short_yuv::{ChromaPlane, PartTarget, Plane, ShortYuv};
pub use transform::{Transform, TransformSize};
pub use yuv::{Pixel, Yuv};
