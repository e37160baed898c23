//! Ghost-image replication for periodic boxes (component D)
//!
//! For a periodic box, any real point closer than `r` to a face of the central region needs a
//! ghost copy on the far side so the pair traversal never has to re-wrap coordinates mid-scan.
//! This module enumerates the lattice offsets and decides which images fall inside the halo.

// ------ IMPORTS

use crate::geometry::{Coord, Point};
use crate::sim_box::SimBox;

// ------ CONTENT

/// All non-zero lattice offsets `k ∈ {-1, 0, +1}^N`, decoded from base-3 digits so the same code
/// handles both `N = 2` (8 offsets) and `N = 3` (26 offsets).
pub fn lattice_offsets<const N: usize>() -> Vec<[i64; N]> {
    let total = 3usize.pow(N as u32);
    let mut offsets = Vec::with_capacity(total - 1);
    for code in 0..total {
        let mut k = [0i64; N];
        let mut c = code;
        let mut all_zero = true;
        for slot in k.iter_mut() {
            let digit = (c % 3) as i64 - 1;
            c /= 3;
            *slot = digit;
            if digit != 0 {
                all_zero = false;
            }
        }
        if !all_zero {
            offsets.push(k);
        }
    }
    offsets
}

/// For a real point already wrapped into the box, compute every ghost image that lands inside
/// the halo region and hand each to `emit` as `(image_coords,)`. No-op for non-periodic boxes.
pub fn ghost_images<T: Coord, const N: usize>(
    box_: &SimBox<T, N>,
    offsets: &[[i64; N]],
    wrapped: &Point<T, N>,
    mut emit: impl FnMut(Point<T, N>),
) {
    if !box_.is_periodic() {
        return;
    }
    let matrix = box_.matrix();
    let lcell = box_.lcell();
    let cell_size = box_.cell_size();
    let max_corner = box_.max_corner();

    for k in offsets {
        let mut shift = Point::<T, N>::zeros();
        for i in 0..N {
            let ki = T::from(k[i] as f64).unwrap_or_else(T::zero);
            for j in 0..N {
                shift[j] = shift[j] + matrix[(j, i)] * ki;
            }
        }
        let image = wrapped + shift;

        let mut inside = true;
        for i in 0..N {
            let lo = -T::from(lcell as f64).unwrap() * cell_size[i];
            let hi = max_corner[i] + T::from(lcell as f64).unwrap() * cell_size[i];
            if image[i] < lo || image[i] >= hi {
                inside = false;
                break;
            }
        }
        if inside {
            emit(image);
        }
    }
}
