//! Integration tests for residual buffers and partition addressing
//!
//! Property tests check the masked transform-unit offset against the plain
//! division formula and that reconstruction undoes residual formation.

use std::sync::Arc;

use proptest::prelude::*;
use zvd_hevc::codec::h265::{tu_offset, ChromaPlane, GeometryTables, Plane, ShortYuv, Yuv};
use zvd_hevc::{init, Config};

fn geometry16() -> Arc<GeometryTables> {
    Arc::new(GeometryTables::new(16, 2).unwrap())
}

fn picture(geometry: &Arc<GeometryTables>, luma: &[u16], cb: &[u16], cr: &[u16]) -> Yuv {
    let mut yuv = Yuv::create(16, 16, geometry.clone()).unwrap();
    yuv.plane_mut(Plane::Luma).copy_from_slice(luma);
    yuv.plane_mut(Plane::Cb).copy_from_slice(cb);
    yuv.plane_mut(Plane::Cr).copy_from_slice(cr);
    yuv
}

fn as_short(geometry: &Arc<GeometryTables>, yuv: &Yuv) -> ShortYuv {
    let mut short = ShortYuv::with_size(16, 16, geometry.clone()).unwrap();
    for plane in [Plane::Luma, Plane::Cb, Plane::Cr] {
        for (d, &s) in short.plane_mut(plane).iter_mut().zip(yuv.plane(plane)) {
            *d = s as i16;
        }
    }
    short
}

proptest! {
    /// The masked offset equals the division/modulo formula
    #[test]
    fn tu_offset_matches_division(log2_width in 4u32..=6, log2_blk in 2u32..=5, idx_seed in any::<usize>()) {
        let width = 1usize << log2_width;
        let blk = 1usize << log2_blk.min(log2_width);
        let per_row = width / blk;
        let idx = idx_seed % (per_row * per_row);

        let pos = idx * blk;
        let expected = (pos / width) * width * blk + pos % width;
        prop_assert_eq!(tu_offset(idx, blk, width), expected);
    }

    /// Subtracting a prediction and adding it back restores the original
    #[test]
    fn add_clip_undoes_subtract(
        orig_luma in proptest::collection::vec(0u16..=255, 256),
        orig_cb in proptest::collection::vec(0u16..=255, 64),
        orig_cr in proptest::collection::vec(0u16..=255, 64),
        pred_luma in proptest::collection::vec(0u16..=255, 256),
        pred_cb in proptest::collection::vec(0u16..=255, 64),
        pred_cr in proptest::collection::vec(0u16..=255, 64),
    ) {
        let geometry = geometry16();
        let orig = picture(&geometry, &orig_luma, &orig_cb, &orig_cr);
        let pred = picture(&geometry, &pred_luma, &pred_cb, &pred_cr);

        let mut residual = ShortYuv::with_size(16, 16, geometry.clone()).unwrap();
        residual.subtract(&orig, &pred, 0, 16);

        let pred_short = as_short(&geometry, &pred);
        let mut recon = ShortYuv::with_size(16, 16, geometry.clone()).unwrap();
        recon.add_clip(&pred_short, &residual, 0, 16, 8);

        let expected = as_short(&geometry, &orig);
        for plane in [Plane::Luma, Plane::Cb, Plane::Cr] {
            prop_assert_eq!(recon.plane(plane), expected.plane(plane));
        }
    }

    /// Every partition corner lands inside the plane and on its own sample
    #[test]
    fn partition_offsets_are_distinct(log2_cu in 4u32..=6, depth in 1u32..=2) {
        let cu = 1u32 << log2_cu;
        let tables = GeometryTables::new(cu, depth).unwrap();
        let width = cu as usize;
        let mut seen = std::collections::HashSet::new();
        for part in 0..tables.num_partitions() {
            let off = tables.part_offset(part, width);
            prop_assert!(off < width * width);
            prop_assert!(seen.insert(off));
        }
    }
}

#[test]
fn test_transform_unit_blocks() {
    let geometry = geometry16();
    let mut orig = Yuv::create(16, 16, geometry.clone()).unwrap();
    let pred = Yuv::create(16, 16, geometry.clone()).unwrap();
    for (i, s) in orig.plane_mut(Plane::Luma).iter_mut().enumerate() {
        *s = i as u16;
    }

    // Second 8x8 unit of a 16-wide plane starts at column 8
    let mut residual = ShortYuv::with_size(16, 16, geometry).unwrap();
    residual.subtract_luma(&orig, &pred, 1, 8);

    let luma = residual.luma();
    assert_eq!(luma[0], 0);
    assert_eq!(luma[8], 8);
    assert_eq!(luma[7 * 16 + 15], (7 * 16 + 15) as i16);
    assert_eq!(luma[8 * 16 + 8], 0);
}

#[test]
fn test_core_buffers_copy_between_contexts() {
    let core = init(&Config::default()).unwrap();
    let mut src = core.create_residual_buffer().unwrap();
    let mut dst = core.create_residual_buffer().unwrap();

    for plane in [Plane::Luma, Plane::Cb, Plane::Cr] {
        for (i, s) in src.plane_mut(plane).iter_mut().enumerate() {
            *s = (i % 509) as i16 - 254;
        }
    }

    // Partition 64 is the top-right 32x32 quadrant
    src.copy_part_to_part_yuv(&mut dst, 64, 32, 32);
    let stride = dst.stride(Plane::Luma);
    for row in 0..32 {
        assert_eq!(
            &dst.luma()[row * stride + 32..][..32],
            &src.luma()[row * stride + 32..][..32]
        );
        assert!(dst.luma()[row * stride..][..32].iter().all(|&s| s == 0));
    }

    dst.clear();
    src.copy_part_to_part_chroma_plane(&mut dst, 0, 16, 16, ChromaPlane::Cr);
    assert!(dst.cb().iter().all(|&s| s == 0));
    assert_eq!(&dst.cr()[..16], &src.cr()[..16]);
}

#[test]
fn test_copy_to_picture_buffer() {
    let core = init(&Config::default()).unwrap();
    let mut residual = core.create_residual_buffer().unwrap();
    let mut picture = core.create_picture_buffer().unwrap();
    residual.plane_mut(Plane::Luma).iter_mut().for_each(|s| *s = 200);

    residual.copy_part_to_part_luma(&mut picture, 0, 8, 8);
    assert_eq!(picture.luma()[0], 200);
    assert_eq!(picture.luma()[7 * 64 + 7], 200);
    assert_eq!(picture.luma()[8], 0);
}
