//! Unit cell classification, grid sizing, and coordinate wrapping
//!
//! This module implements component **A** of the engine: the simulation box. A [`SimBox`]
//! classifies the cell geometry (non-periodic, orthorhombic, triclinic), derives the cell-grid
//! dimensions that the minimum-image convention allows at a given cutoff, and knows how to wrap
//! a point back into the first periodic image and locate the grid cell it falls into.

// ------ MODULE DECLARATIONS

#[cfg(test)]
mod tests;

// ------ IMPORTS

use nalgebra::SMatrix;

use crate::error::{CellMapError, CellMapResult};
use crate::geometry::{Coord, Point};
use crate::grid::replicate::lattice_offsets;
use crate::traverse::stencil::neighbor_offsets;

// ------ CONTENT

/// Tag describing the shape of a [`SimBox`]'s lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitCellKind {
    /// No periodicity; the lattice is only used to size the cell grid around the input points.
    NonPeriodic,
    /// Periodic lattice with an axis-aligned (diagonal) matrix.
    Orthorhombic,
    /// Periodic lattice with an arbitrary (possibly non-diagonal) matrix.
    Triclinic,
}

/// The simulation box: unit cell plus the cell-grid sizing derived from it for a given cutoff.
///
/// Renamed from the spec's "Box" to avoid shadowing `std::boxed::Box`; same component, same
/// invariants (spec.md §3/§4.1).
#[derive(Debug, Clone)]
pub struct SimBox<T: Coord, const N: usize> {
    kind: UnitCellKind,
    matrix: SMatrix<T, N, N>,
    inverse: SMatrix<T, N, N>,
    cutoff: T,
    cutoff2: T,
    lcell: usize,
    /// Grid dimensions, including the halo layer on each side.
    nc: [usize; N],
    cell_size: [T; N],
    max_corner: [T; N],
    /// Lower corner of the region the grid covers; zero for periodic boxes, the padded minimum
    /// of the input points for non-periodic ones.
    origin: Point<T, N>,
    /// Unpadded point range, kept only for non-periodic boxes so that [`SimBox::updated`] can
    /// re-derive padding when only the cutoff changes.
    raw_extent: Option<(Point<T, N>, Point<T, N>)>,
    /// Every non-zero lattice offset (`3^N - 1` of them), computed once here rather than on
    /// every ghost-replication/cross-set-traversal call (spec.md §8 "zero-allocation steady
    /// state", spec.md §9 "arena reuse" — these depend only on `N`, never on point data).
    full_offsets: Vec<[i64; N]>,
    /// Same-set traversal stencil: half the offsets (forward-only) for `Orthorhombic`/
    /// `NonPeriodic`, the full set (with the `i < j` de-duplication flag) for `Triclinic`.
    /// Cached alongside `full_offsets` for the same reason.
    same_set_offsets: Vec<[i64; N]>,
    same_set_requires_order: bool,
}

impl<T: Coord, const N: usize> SimBox<T, N> {
    /// Construct an orthorhombic (axis-aligned) periodic box.
    pub fn orthorhombic(sides: [T; N], cutoff: T, lcell: usize) -> CellMapResult<Self> {
        let matrix = SMatrix::<T, N, N>::from_diagonal(&Point::<T, N>::from(sides));
        Self::from_matrix_inner(matrix, cutoff, lcell, UnitCellKind::Orthorhombic, None)
    }

    /// Construct a triclinic periodic box from an arbitrary matrix of column lattice vectors.
    pub fn triclinic(matrix: SMatrix<T, N, N>, cutoff: T, lcell: usize) -> CellMapResult<Self> {
        Self::from_matrix_inner(matrix, cutoff, lcell, UnitCellKind::Triclinic, None)
    }

    /// Construct a non-periodic box sized to contain every point in `points`, padded by at
    /// least `cutoff` on every side (spec.md §4.1).
    pub fn non_periodic(points: &[Point<T, N>], cutoff: T) -> CellMapResult<Self> {
        check_cutoff(cutoff)?;
        let (lo, hi) = point_extent(points);
        Self::non_periodic_from_extent(lo, hi, cutoff)
    }

    fn non_periodic_from_extent(
        lo: Point<T, N>,
        hi: Point<T, N>,
        cutoff: T,
    ) -> CellMapResult<Self> {
        check_cutoff(cutoff)?;
        let two = T::one() + T::one();
        // pad each axis by the cutoff on every side, so the padded span grows by 2*cutoff
        let padding = cutoff;
        let mut sides = [T::zero(); N];
        let mut origin = Point::<T, N>::zeros();
        for i in 0..N {
            let span = (hi[i] - lo[i]).max(T::zero());
            sides[i] = span + two * padding;
            origin[i] = lo[i] - padding;
        }
        let matrix = SMatrix::<T, N, N>::from_diagonal(&Point::<T, N>::from(sides));
        let mut b = Self::from_matrix_inner(matrix, cutoff, 1, UnitCellKind::NonPeriodic, Some(origin))?;
        b.raw_extent = Some((lo, hi));
        Ok(b)
    }

    fn from_matrix_inner(
        matrix: SMatrix<T, N, N>,
        cutoff: T,
        lcell: usize,
        kind: UnitCellKind,
        origin: Option<Point<T, N>>,
    ) -> CellMapResult<Self> {
        check_cutoff(cutoff)?;
        let lcell = lcell.max(1);
        let inverse = matrix.try_inverse().ok_or(CellMapError::InvalidCell {
            cutoff: format!("{cutoff:?}"),
            reason: "unit cell matrix is singular",
        })?;

        // The minimum-image convention only constrains *periodic* wrapping; a non-periodic box
        // is sized to already contain every input point with `cutoff` of padding on each side
        // (see `non_periodic_from_extent`), so there is no periodic image to disambiguate and
        // the check does not apply — a zero-extent axis would otherwise spuriously reject it.
        if kind != UnitCellKind::NonPeriodic {
            check_minimum_image(&inverse, cutoff)?;
        }

        let (nc, cell_size, max_corner) = match kind {
            UnitCellKind::Orthorhombic | UnitCellKind::NonPeriodic => {
                let mut nc = [0usize; N];
                let mut cell_size = [T::zero(); N];
                let mut max_corner = [T::zero(); N];
                for i in 0..N {
                    let side = matrix[(i, i)];
                    let lcell_t = T::from(lcell).unwrap();
                    let raw_nc = (lcell_t * side / cutoff).floor();
                    let mut n = raw_nc.to_usize().unwrap_or(0);
                    if n == 0 {
                        n = 1;
                    }
                    cell_size[i] = side / T::from(n).unwrap();
                    max_corner[i] = side;
                    nc[i] = n + 2 * lcell;
                }
                (nc, cell_size, max_corner)
            }
            UnitCellKind::Triclinic => {
                let mut nc = [0usize; N];
                let mut cell_size = [T::zero(); N];
                let mut max_corner = [T::zero(); N];
                let lcell_t = T::from(lcell).unwrap();
                for i in 0..N {
                    cell_size[i] = cutoff / lcell_t;
                    let row_sum: T = (0..N).fold(T::zero(), |acc, j| acc + matrix[(i, j)]);
                    max_corner[i] = row_sum;
                    let two = T::one() + T::one();
                    let extent = row_sum + two * cutoff;
                    nc[i] = (extent / cell_size[i]).ceil().to_usize().unwrap_or(1).max(1);
                }
                (nc, cell_size, max_corner)
            }
        };

        let full_offsets = lattice_offsets::<N>();
        let (same_set_offsets, same_set_requires_order) = neighbor_offsets::<N>(kind);

        Ok(Self {
            kind,
            matrix,
            inverse,
            cutoff,
            cutoff2: cutoff * cutoff,
            lcell,
            nc,
            cell_size,
            max_corner,
            origin: origin.unwrap_or_else(Point::<T, N>::zeros),
            raw_extent: None,
            full_offsets,
            same_set_offsets,
            same_set_requires_order,
        })
    }

    /// Recompute the box after a change in cutoff and/or matrix.
    ///
    /// Passing `matrix = Some(..)` for a box built as [`UnitCellKind::NonPeriodic`] is an error
    /// (spec.md §4.1: "For `NonPeriodic` the caller may not supply an explicit cell").
    pub fn updated(
        &self,
        matrix: Option<SMatrix<T, N, N>>,
        cutoff: Option<T>,
    ) -> CellMapResult<Self> {
        let new_cutoff = cutoff.unwrap_or(self.cutoff);
        match (self.kind, matrix) {
            (UnitCellKind::NonPeriodic, Some(_)) => Err(CellMapError::NonPeriodicWithCellOverride),
            (UnitCellKind::NonPeriodic, None) => {
                let (lo, hi) = self.raw_extent.unwrap_or_else(|| point_extent(&[]));
                Self::non_periodic_from_extent(lo, hi, new_cutoff)
            }
            (kind, Some(m)) => Self::from_matrix_inner(m, new_cutoff, self.lcell, kind, None),
            (kind, None) => Self::from_matrix_inner(self.matrix, new_cutoff, self.lcell, kind, None),
        }
    }

    /// Kind of unit cell this box represents.
    pub fn kind(&self) -> UnitCellKind {
        self.kind
    }

    /// Whether this box has any periodicity.
    pub fn is_periodic(&self) -> bool {
        self.kind != UnitCellKind::NonPeriodic
    }

    /// Lattice matrix (column vectors).
    pub fn matrix(&self) -> &SMatrix<T, N, N> {
        &self.matrix
    }

    pub fn cutoff(&self) -> T {
        self.cutoff
    }

    pub fn cutoff2(&self) -> T {
        self.cutoff2
    }

    pub fn lcell(&self) -> usize {
        self.lcell
    }

    /// Grid dimensions, including the halo layer.
    pub fn nc(&self) -> [usize; N] {
        self.nc
    }

    pub fn cell_size(&self) -> [T; N] {
        self.cell_size
    }

    pub fn max_corner(&self) -> [T; N] {
        self.max_corner
    }

    /// Lower corner of the region the grid covers — zero for periodic boxes, the padded
    /// minimum of the input points for non-periodic ones.
    pub fn origin(&self) -> Point<T, N> {
        self.origin
    }

    /// Total number of cells in the grid, `∏ nc[i]`.
    pub fn n_cells(&self) -> usize {
        self.nc.iter().product()
    }

    /// Every non-zero lattice offset `k ∈ {-1, 0, +1}^N`, cached at construction. Used by ghost
    /// replication and cross-set traversal, both of which need the full offset set regardless of
    /// `kind`.
    pub fn lattice_offsets(&self) -> &[[i64; N]] {
        &self.full_offsets
    }

    /// Same-set traversal stencil: the offsets to visit per real cell, plus whether the caller
    /// must still de-duplicate by requiring `i < j` (true only for the full `Triclinic` stencil).
    /// Cached at construction (see [`SimBox::lattice_offsets`]).
    pub fn same_set_stencil(&self) -> (&[[i64; N]], bool) {
        (&self.same_set_offsets, self.same_set_requires_order)
    }

    /// Wrap a point into the box's first periodic image.
    ///
    /// Identity for [`UnitCellKind::NonPeriodic`] boxes (spec.md §4.1: the box was sized to
    /// contain all inputs, so there is nothing to wrap).
    pub fn wrap(&self, p: &Point<T, N>) -> Point<T, N> {
        if self.kind == UnitCellKind::NonPeriodic {
            return *p;
        }
        // solve M . c = p, take fractional part of c in [0, 1), reconstruct p' = M . c
        let c = self.inverse * p;
        let mut frac = c;
        for i in 0..N {
            let f = c[i] - c[i].floor();
            frac[i] = if f < T::zero() { f + T::one() } else { f };
        }
        self.matrix * frac
    }

    /// Cartesian cell index (including halo offset) of a point already expressed in the box's
    /// own coordinate frame (i.e. typically post-[`SimBox::wrap`]).
    pub fn cell_of(&self, p: &Point<T, N>) -> [i64; N] {
        let mut idx = [0i64; N];
        let lcell = self.lcell as i64;
        for i in 0..N {
            let rel = p[i] - self.origin[i];
            let raw = (rel / self.cell_size[i]).floor();
            idx[i] = raw.to_i64().unwrap_or(0) + lcell;
        }
        idx
    }

    /// Row-major linear index of a cartesian cell index, or `None` if out of grid bounds.
    pub fn linear_index(&self, cart: &[i64; N]) -> Option<usize> {
        let mut lin = 0usize;
        for i in 0..N {
            if cart[i] < 0 || cart[i] as usize >= self.nc[i] {
                return None;
            }
            lin = lin * self.nc[i] + cart[i] as usize;
        }
        Some(lin)
    }

    /// Inverse of [`SimBox::linear_index`]: recover the cartesian index from a linear one.
    pub fn cartesian_index(&self, mut linear: usize) -> [i64; N] {
        let mut cart = [0i64; N];
        for i in (0..N).rev() {
            let dim = self.nc[i];
            cart[i] = (linear % dim) as i64;
            linear /= dim;
        }
        cart
    }
}

fn check_cutoff<T: Coord>(cutoff: T) -> CellMapResult<()> {
    if !cutoff.is_finite() || cutoff <= T::zero() {
        return Err(CellMapError::CutoffNotPositive(format!("{cutoff:?}")));
    }
    Ok(())
}

/// Verify that `r` obeys the minimum-image convention against every lattice plane: the distance
/// between opposite periodic images along axis `i` (`1 / ‖row_i(M⁻¹)‖`) must exceed `2r`.
fn check_minimum_image<T: Coord, const N: usize>(
    inverse: &SMatrix<T, N, N>,
    cutoff: T,
) -> CellMapResult<()> {
    let two = T::one() + T::one();
    for i in 0..N {
        let row_norm = inverse.row(i).norm();
        if row_norm <= T::zero() {
            continue;
        }
        let height = T::one() / row_norm;
        if height <= two * cutoff {
            return Err(CellMapError::InvalidCell {
                cutoff: format!("{cutoff:?}"),
                reason: "cutoff does not satisfy the minimum-image convention for this cell",
            });
        }
    }
    Ok(())
}

fn point_extent<T: Coord, const N: usize>(points: &[Point<T, N>]) -> (Point<T, N>, Point<T, N>) {
    if points.is_empty() {
        return (Point::zeros(), Point::zeros());
    }
    let mut lo = points[0];
    let mut hi = points[0];
    for p in &points[1..] {
        for i in 0..N {
            if p[i] < lo[i] {
                lo[i] = p[i];
            }
            if p[i] > hi[i] {
                hi[i] = p[i];
            }
        }
    }
    (lo, hi)
}
