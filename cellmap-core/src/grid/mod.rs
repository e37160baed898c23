//! The cell list: a spatial index partitioning points into grid cells
//!
//! This module implements component **B** (`CellGrid`) and the cross-set façade over it
//! (`PairedGrid`), plus the two satellite components that fill it in: the [`builder`] (serial and
//! threaded construction/update) and the [`replicate`] ghost-image generator.

// ------ MODULE DECLARATIONS

mod cell;
pub mod builder;
pub mod replicate;
#[cfg(test)]
mod tests;

// ------ RE-EXPORTS

pub use cell::{Cell, IndexedPoint};

// ------ IMPORTS

use crate::geometry::{Coord, Point};
use crate::sim_box::SimBox;

// ------ CONTENT

/// Scratch record used by the projection-sort pruning optimization in the pair traversal
/// (spec.md §4.4): a neighbor-cell point annotated with its projection onto the axis joining
/// the two cell centers, so the inner loop can exit as soon as the projected separation exceeds
/// the cutoff.
#[derive(Debug, Clone, Copy)]
pub struct ProjectedPoint<T: Coord, const N: usize> {
    pub original_index: usize,
    pub x_proj: T,
    pub coords: Point<T, N>,
}

/// A spatial index over a set of points: one occupied-cell list, sized by a [`SimBox`].
///
/// Reused across `rebuild` calls: cell storage, the linear-index lookup table, and the
/// projection scratch buffers all grow amortized and never shrink (spec.md §4.3/§9).
pub struct CellGrid<T: Coord, const N: usize> {
    n_real_points: usize,
    n_total_points: usize,
    n_cells: usize,
    /// `cell_index_of[linear] == 0` means the cell is unoccupied; otherwise the occupied cell
    /// lives at `cells[cell_index_of[linear] - 1]`.
    cell_index_of: Vec<usize>,
    /// Indices into `cells` of the cells that contain at least one real point.
    real_cell_slots: Vec<usize>,
    cells: Vec<Cell<T, N>>,
    /// Linear indices that were touched during the last build, so the next `reset` only has to
    /// zero those entries of `cell_index_of` instead of the whole table.
    touched: Vec<usize>,
    /// Cells evicted by the last `reset`, kept around so the next build can reclaim their
    /// `points` allocation instead of growing a fresh one.
    cell_pool: Vec<Cell<T, N>>,
    /// Per-worker scratch for the projection-sort prune, indexed by rayon worker id. Grown on
    /// demand by the traversal, never shrunk.
    projection_scratch: Vec<Vec<ProjectedPoint<T, N>>>,
}

impl<T: Coord, const N: usize> CellGrid<T, N> {
    pub(crate) fn empty(n_cells: usize) -> Self {
        Self {
            n_real_points: 0,
            n_total_points: 0,
            n_cells,
            cell_index_of: vec![0; n_cells],
            real_cell_slots: Vec::new(),
            cells: Vec::new(),
            touched: Vec::new(),
            cell_pool: Vec::new(),
            projection_scratch: Vec::new(),
        }
    }

    /// Build a fresh grid from `points` under `box_`, in serial or split across worker threads.
    pub fn build(points: &[Point<T, N>], box_: &SimBox<T, N>, parallel: bool) -> Self {
        let mut grid = Self::empty(box_.n_cells());
        grid.rebuild(points, box_, parallel);
        grid
    }

    /// Reset and repopulate this grid for a new set of point coordinates, reusing all allocated
    /// storage (spec.md §4.3 "Update semantics").
    ///
    /// This standalone entry point allocates its own ephemeral shard storage for the parallel
    /// build path; callers that rebuild repeatedly under `parallel = true` (e.g. the
    /// [`crate::NeighborList`] façade) should go through [`builder::build`] directly with
    /// persistent shard storage to keep the parallel path allocation-free too.
    pub fn rebuild(&mut self, points: &[Point<T, N>], box_: &SimBox<T, N>, parallel: bool) {
        let mut shards = Vec::new();
        builder::build(self, &mut shards, points, box_, parallel);
    }

    pub fn n_real_points(&self) -> usize {
        self.n_real_points
    }

    pub fn n_total_points(&self) -> usize {
        self.n_total_points
    }

    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    pub fn n_cells_with_points(&self) -> usize {
        self.cells.len()
    }

    pub fn n_cells_with_real_points(&self) -> usize {
        self.real_cell_slots.len()
    }

    pub fn cells(&self) -> &[Cell<T, N>] {
        &self.cells
    }

    /// Slots (into [`CellGrid::cells`]) of every cell containing at least one real point. This
    /// is exactly the set of cells `map_pairwise` iterates over.
    pub fn real_cell_slots(&self) -> &[usize] {
        &self.real_cell_slots
    }

    /// Look up the occupied-cell slot for a linear cell index, if any.
    pub fn slot_of(&self, linear_index: usize) -> Option<usize> {
        let raw = *self.cell_index_of.get(linear_index)?;
        if raw == 0 {
            None
        } else {
            Some(raw - 1)
        }
    }

    pub(crate) fn ensure_workers(&mut self, workers: usize) {
        if self.projection_scratch.len() < workers {
            self.projection_scratch.resize_with(workers, Vec::new);
        }
    }

    /// Split the grid into a read-only traversal view (cells, lookup table, real-cell list) and
    /// a disjoint slice of per-worker projection scratch, so the pair traversal can hand one
    /// scratch buffer to each batch while every batch shares the same read-only cell data —
    /// mirroring the "read-only/shared vs. write-exclusive per worker" split of spec.md §5.
    pub(crate) fn split_for_traversal(
        &mut self,
        workers: usize,
    ) -> (GridView<'_, T, N>, &mut [Vec<ProjectedPoint<T, N>>]) {
        self.ensure_workers(workers.max(1));
        (
            GridView {
                cells: &self.cells,
                cell_index_of: &self.cell_index_of,
                real_cell_slots: &self.real_cell_slots,
            },
            &mut self.projection_scratch[..workers.max(1)],
        )
    }
}

/// Read-only view over the parts of a [`CellGrid`] the pair traversal needs, borrowed
/// independently of the per-worker projection scratch (see [`CellGrid::split_for_traversal`]).
#[derive(Clone, Copy)]
pub struct GridView<'a, T: Coord, const N: usize> {
    pub cells: &'a [Cell<T, N>],
    cell_index_of: &'a [usize],
    pub real_cell_slots: &'a [usize],
}

impl<'a, T: Coord, const N: usize> GridView<'a, T, N> {
    pub fn slot_of(&self, linear_index: usize) -> Option<usize> {
        let raw = *self.cell_index_of.get(linear_index)?;
        if raw == 0 {
            None
        } else {
            Some(raw - 1)
        }
    }
}

/// A cell grid built for cross-set (two-population) queries.
///
/// Invariant: if `swap`, the grid holds the set the caller passed as the first argument and
/// reported indices must be swapped back before the user sees them (spec.md §3, §4.6).
pub struct PairedGrid<T: Coord, const N: usize> {
    pub reference_points: Vec<Point<T, N>>,
    pub target_grid: CellGrid<T, N>,
    pub swap: bool,
}

impl<T: Coord, const N: usize> PairedGrid<T, N> {
    /// Build a paired grid over `points_a`/`points_b`. When `autoswap` is set, the larger set
    /// is indexed (becomes the target grid) and the smaller iterated (becomes the reference),
    /// which minimizes the per-reference-point neighbor-cell scan cost.
    pub fn build(
        points_a: &[Point<T, N>],
        points_b: &[Point<T, N>],
        box_: &SimBox<T, N>,
        parallel: bool,
        autoswap: bool,
    ) -> Self {
        let swap = autoswap && points_a.len() > points_b.len();
        let (reference, target) = if swap {
            (points_b, points_a)
        } else {
            (points_a, points_b)
        };
        let target_grid = CellGrid::build(target, box_, parallel);
        Self {
            reference_points: reference.to_vec(),
            target_grid,
            swap,
        }
    }

    pub fn rebuild(
        &mut self,
        points_a: &[Point<T, N>],
        points_b: &[Point<T, N>],
        box_: &SimBox<T, N>,
        parallel: bool,
        autoswap: bool,
    ) {
        let swap = autoswap && points_a.len() > points_b.len();
        let (reference, target): (&[Point<T, N>], &[Point<T, N>]) = if swap {
            (points_b, points_a)
        } else {
            (points_a, points_b)
        };
        self.reference_points.clear();
        self.reference_points.extend_from_slice(reference);
        self.swap = swap;
        self.target_grid.rebuild(target, box_, parallel);
    }
}
