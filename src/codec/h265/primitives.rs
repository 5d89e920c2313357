//! Kernel dispatch table
//!
//! Every transform and filter kernel is reached through [`Primitives`], a
//! table of plain function pointers keyed by kernel kind. A process installs
//! one table before encoding starts; afterwards it is read-only and shared by
//! all threads without locking. Replacing an entry (for example with a SIMD
//! kernel) happens on a local table before [`install`], never on the live one.

use std::sync::OnceLock;

use tracing::{info, warn};

use crate::codec::h265::butterfly;
use crate::codec::h265::mc::{filter_horizontal, filter_vertical};
use crate::error::{Error, Result};

/// One-dimensional butterfly: `(src, dst, shift, line)`
pub type ButterflyFn = fn(&[i16], &mut [i16], i32, usize);

/// 4x4 DST: `(src, dst, shift)`
pub type DstFn = fn(&[i16], &mut [i16], i32);

/// Interpolation filter:
/// `(coeff, src, src_origin, src_stride, dst, dst_stride, width, height, bit_depth)`
pub type FilterFn = fn(&[i16], &[i16], usize, usize, &mut [i16], usize, usize, usize, u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButterflyKind {
    Forward4,
    Forward8,
    Forward16,
    Forward32,
    Inverse4,
    Inverse8,
    Inverse16,
    Inverse32,
}

impl ButterflyKind {
    pub const ALL: [ButterflyKind; 8] = [
        ButterflyKind::Forward4,
        ButterflyKind::Forward8,
        ButterflyKind::Forward16,
        ButterflyKind::Forward32,
        ButterflyKind::Inverse4,
        ButterflyKind::Inverse8,
        ButterflyKind::Inverse16,
        ButterflyKind::Inverse32,
    ];

    /// Forward kernel for a transform edge of `size`
    pub fn forward(size: usize) -> Option<Self> {
        match size {
            4 => Some(ButterflyKind::Forward4),
            8 => Some(ButterflyKind::Forward8),
            16 => Some(ButterflyKind::Forward16),
            32 => Some(ButterflyKind::Forward32),
            _ => None,
        }
    }

    /// Inverse kernel for a transform edge of `size`
    pub fn inverse(size: usize) -> Option<Self> {
        match size {
            4 => Some(ButterflyKind::Inverse4),
            8 => Some(ButterflyKind::Inverse8),
            16 => Some(ButterflyKind::Inverse16),
            32 => Some(ButterflyKind::Inverse32),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DstKind {
    Forward,
    Inverse,
}

impl DstKind {
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterDirection {
    Horizontal,
    Vertical,
}

/// Supported filter lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterTaps {
    Four,
    Six,
    Eight,
}

impl FilterTaps {
    pub const ALL: [FilterTaps; 3] = [FilterTaps::Four, FilterTaps::Six, FilterTaps::Eight];

    pub fn count(self) -> usize {
        match self {
            FilterTaps::Four => 4,
            FilterTaps::Six => 6,
            FilterTaps::Eight => 8,
        }
    }

    pub fn from_count(n: usize) -> Option<Self> {
        match n {
            4 => Some(FilterTaps::Four),
            6 => Some(FilterTaps::Six),
            8 => Some(FilterTaps::Eight),
            _ => None,
        }
    }
}

/// Selects one filter variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterKey {
    pub direction: FilterDirection,
    pub taps: FilterTaps,
    pub is_first: bool,
    pub is_last: bool,
}

const FILTER_VARIANTS: usize = 2 * 3 * 2 * 2;

impl FilterKey {
    pub fn new(direction: FilterDirection, taps: FilterTaps, is_first: bool, is_last: bool) -> Self {
        Self {
            direction,
            taps,
            is_first,
            is_last,
        }
    }

    fn index(self) -> usize {
        let dir = match self.direction {
            FilterDirection::Horizontal => 0,
            FilterDirection::Vertical => 1,
        };
        let taps = match self.taps {
            FilterTaps::Four => 0,
            FilterTaps::Six => 1,
            FilterTaps::Eight => 2,
        };
        ((dir * 3 + taps) * 2 + self.is_first as usize) * 2 + self.is_last as usize
    }
}

macro_rules! filter_entries {
    ($table:ident, $dir:expr, $kernel:ident) => {
        filter_entries!(@taps $table, $dir, $kernel, 4, FilterTaps::Four);
        filter_entries!(@taps $table, $dir, $kernel, 6, FilterTaps::Six);
        filter_entries!(@taps $table, $dir, $kernel, 8, FilterTaps::Eight);
    };
    (@taps $table:ident, $dir:expr, $kernel:ident, $n:literal, $taps:expr) => {
        $table[FilterKey::new($dir, $taps, false, false).index()] = $kernel::<$n, false, false>;
        $table[FilterKey::new($dir, $taps, false, true).index()] = $kernel::<$n, false, true>;
        $table[FilterKey::new($dir, $taps, true, false).index()] = $kernel::<$n, true, false>;
        $table[FilterKey::new($dir, $taps, true, true).index()] = $kernel::<$n, true, true>;
    };
}

/// Function-pointer table for every kernel kind
#[derive(Clone, Copy)]
pub struct Primitives {
    butterfly: [ButterflyFn; 8],
    dst: [DstFn; 2],
    filter: [FilterFn; FILTER_VARIANTS],
}

impl Primitives {
    /// Table populated with the portable scalar kernels
    pub fn c_reference() -> Self {
        let butterfly: [ButterflyFn; 8] = [
            butterfly::partial_butterfly_4,
            butterfly::partial_butterfly_8,
            butterfly::partial_butterfly_16,
            butterfly::partial_butterfly_32,
            butterfly::partial_butterfly_inverse_4,
            butterfly::partial_butterfly_inverse_8,
            butterfly::partial_butterfly_inverse_16,
            butterfly::partial_butterfly_inverse_32,
        ];
        let dst: [DstFn; 2] = [butterfly::fast_forward_dst, butterfly::fast_inverse_dst];

        let placeholder: FilterFn = filter_horizontal::<8, true, true>;
        let mut filter = [placeholder; FILTER_VARIANTS];
        filter_entries!(filter, FilterDirection::Horizontal, filter_horizontal);
        filter_entries!(filter, FilterDirection::Vertical, filter_vertical);

        Self {
            butterfly,
            dst,
            filter,
        }
    }

    pub fn butterfly(&self, kind: ButterflyKind) -> ButterflyFn {
        self.butterfly[kind.index()]
    }

    pub fn dst(&self, kind: DstKind) -> DstFn {
        self.dst[kind.index()]
    }

    pub fn filter(&self, key: FilterKey) -> FilterFn {
        self.filter[key.index()]
    }

    pub fn set_butterfly(&mut self, kind: ButterflyKind, f: ButterflyFn) {
        self.butterfly[kind.index()] = f;
    }

    pub fn set_dst(&mut self, kind: DstKind, f: DstFn) {
        self.dst[kind.index()] = f;
    }

    pub fn set_filter(&mut self, key: FilterKey, f: FilterFn) {
        self.filter[key.index()] = f;
    }
}

impl Default for Primitives {
    fn default() -> Self {
        Self::c_reference()
    }
}

impl std::fmt::Debug for Primitives {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Primitives")
            .field("butterfly", &self.butterfly.len())
            .field("dst", &self.dst.len())
            .field("filter", &self.filter.len())
            .finish()
    }
}

static PRIMITIVES: OnceLock<Primitives> = OnceLock::new();

/// Publish `table` as the process-wide kernel table.
///
/// Succeeds once. Later calls leave the installed table untouched and return
/// [`Error::InvalidState`].
pub fn install(table: Primitives) -> Result<&'static Primitives> {
    let mut installed = false;
    let live = PRIMITIVES.get_or_init(|| {
        installed = true;
        table
    });

    if installed {
        info!("installed kernel dispatch table");
        Ok(live)
    } else {
        warn!("kernel dispatch table already installed; ignoring replacement");
        Err(Error::invalid_state("kernel dispatch table already installed"))
    }
}

/// The installed table, falling back to [`Primitives::c_reference`] when
/// nothing was installed before first use.
pub fn primitives() -> &'static Primitives {
    PRIMITIVES.get_or_init(|| {
        info!("installing reference kernel dispatch table");
        Primitives::c_reference()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keys_are_distinct() {
        let mut seen = [false; FILTER_VARIANTS];
        for dir in [FilterDirection::Horizontal, FilterDirection::Vertical] {
            for taps in FilterTaps::ALL {
                for first in [false, true] {
                    for last in [false, true] {
                        let idx = FilterKey::new(dir, taps, first, last).index();
                        assert!(!seen[idx]);
                        seen[idx] = true;
                    }
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_reference_filters_are_wired_by_key() {
        let table = Primitives::c_reference();
        let coeff = [0i16, 0, 0, 64, 0, 0, 0, 0];
        let src = vec![100i16; 16 * 16];
        let mut dst = vec![0i16; 4];

        // The is_first && !is_last horizontal pass removes the 8192 bias
        let f = table.filter(FilterKey::new(
            FilterDirection::Horizontal,
            FilterTaps::Eight,
            true,
            false,
        ));
        f(&coeff, &src, 4 * 16 + 4, 16, &mut dst, 4, 4, 1, 8);
        assert!(dst.iter().all(|&s| s == 100 * 64 - 8192));

        let f = table.filter(FilterKey::new(
            FilterDirection::Vertical,
            FilterTaps::Four,
            true,
            true,
        ));
        f(&coeff[2..6], &src, 4 * 16 + 4, 16, &mut dst, 4, 4, 1, 8);
        assert!(dst.iter().all(|&s| s == 100));
    }

    #[test]
    fn test_butterfly_lookup() {
        assert_eq!(ButterflyKind::forward(16), Some(ButterflyKind::Forward16));
        assert_eq!(ButterflyKind::inverse(4), Some(ButterflyKind::Inverse4));
        assert_eq!(ButterflyKind::forward(64), None);
        assert_eq!(FilterTaps::from_count(6), Some(FilterTaps::Six));
        assert_eq!(FilterTaps::from_count(2), None);

        let table = Primitives::c_reference();
        let src = [1i16; 8];
        let mut dst = [0i16; 8];
        table.butterfly(ButterflyKind::Forward8)(&src, &mut dst, 7, 1);
        assert_eq!(dst, [4, 0, 0, 0, 0, 0, 0, 0]);
    }

    fn zero_butterfly(_src: &[i16], dst: &mut [i16], _shift: i32, _line: usize) {
        dst.iter_mut().for_each(|d| *d = 0);
    }

    #[test]
    fn test_local_override() {
        let mut table = Primitives::c_reference();
        table.set_butterfly(ButterflyKind::Forward4, zero_butterfly);
        let mut dst = [7i16; 4];
        table.butterfly(ButterflyKind::Forward4)(&[10, 10, 10, 10], &mut dst, 1, 1);
        assert_eq!(dst, [0; 4]);

        // Other entries are untouched
        let mut dst = [0i16; 4];
        table.butterfly(ButterflyKind::Inverse4)(&[64, 0, 0, 0], &mut dst, 7, 1);
        assert_eq!(dst, [32, 32, 32, 32]);
    }

    #[test]
    fn test_install_is_write_once() {
        let first = primitives();
        assert!(matches!(
            install(Primitives::c_reference()),
            Err(Error::InvalidState(_))
        ));
        assert!(std::ptr::eq(first, primitives()));
    }
}
