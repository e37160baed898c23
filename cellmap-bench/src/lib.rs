//! # cellmap-bench
//!
//! Criterion benchmarks for `cellmap-core`.
//!
//! ## Available benchmarks
//!
//! - `cell-list-build` - construction speed of [`cellmap_core::CellGrid`], serial vs. threaded,
//!   across input size and periodicity.
//! - `neighbor-list` - end-to-end [`cellmap_core::neighbor_list`] throughput across input size,
//!   density (via the cutoff), and box shape.

/// Uniform-random point cloud in `[0, side)^N`, shared by every benchmark so input generation
/// itself never shows up in a measured iteration.
pub fn random_points<const N: usize>(
    n: usize,
    side: f64,
    rng: &mut impl rand::Rng,
) -> Vec<cellmap_core::Point<f64, N>> {
    (0..n)
        .map(|_| cellmap_core::Point::<f64, N>::from_fn(|_, _| rng.random_range(0.0..side)))
        .collect()
}
