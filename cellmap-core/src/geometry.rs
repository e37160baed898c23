//! Scalar and point representation
//!
//! The engine is generic over the floating-point type used for coordinates and over the spatial
//! dimension (2 or 3, enforced through a const generic rather than a duplicated 2D/3D module
//! pair). This module only pins down the bounds the rest of the crate relies on.

// ------ IMPORTS

use nalgebra::{RealField, SVector};
use num_traits::NumCast;

// ------ CONTENT

/// Common trait implemented by types used for coordinate representation.
///
/// This mirrors `honeycomb_core::CoordsFloat`: a blanket trait over the operations the engine
/// actually needs (`+ - * /`, comparison, `sqrt`, zero/one, casts to/from array indices), so
/// call sites can stay generic without naming `nalgebra::RealField` everywhere.
pub trait Coord: RealField + Copy + NumCast + Send + Sync {}

impl<T: RealField + Copy + NumCast + Send + Sync> Coord for T {}

/// Fixed-size point / displacement vector used throughout the crate.
///
/// `N` is the spatial dimension, 2 or 3. Points live on the stack and are `Copy`, so the inner
/// loop of the pair traversal never allocates to move them around.
pub type Point<T, const N: usize> = SVector<T, N>;

/// Squared Euclidean distance between two points.
#[inline]
pub fn dist2<T: Coord, const N: usize>(a: &Point<T, N>, b: &Point<T, N>) -> T {
    (a - b).norm_squared()
}
