//! Installation of a process-wide kernel table
//!
//! Kept in its own test binary: the table is write-once per process, so this
//! must be the only test that touches it here.

use zvd_hevc::codec::h265::primitives::{install, primitives, ButterflyKind, Primitives};
use zvd_hevc::codec::h265::{Transform, TransformSize};
use zvd_hevc::Error;

fn zero_forward_4(_src: &[i16], dst: &mut [i16], _shift: i32, line: usize) {
    dst[..4 * line].iter_mut().for_each(|d| *d = 0);
}

#[test]
fn test_install_once_then_read_only() {
    let mut table = Primitives::c_reference();
    table.set_butterfly(ButterflyKind::Forward4, zero_forward_4);

    let installed = install(table).unwrap();
    assert!(std::ptr::eq(installed, primitives()));

    // Transforms created afterwards pick up the installed kernel
    let transform = Transform::new(8).unwrap();
    let mut coeffs = [1i16; 16];
    transform
        .forward(&[50; 16], &mut coeffs, TransformSize::Size4, false)
        .unwrap();
    assert_eq!(coeffs, [0; 16]);

    // A second installation is rejected and changes nothing
    assert!(matches!(
        install(Primitives::c_reference()),
        Err(Error::InvalidState(_))
    ));
    transform
        .forward(&[50; 16], &mut coeffs, TransformSize::Size4, false)
        .unwrap();
    assert_eq!(coeffs, [0; 16]);
}
