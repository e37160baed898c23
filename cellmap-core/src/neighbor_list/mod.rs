//! The neighbor-list façade: component G, and the crate's primary entry point.
//!
//! [`NeighborList`] owns a box, a grid, and the parallel-build shard storage, so that repeated
//! calls to [`NeighborList::update`]/[`NeighborList::neighbor_list`] (the common "advance one step
//! of a simulation, recompute neighbors" loop) stay allocation-free after warm-up. The free
//! functions [`neighbor_list`] and [`cross_neighbor_list`] cover one-shot use without requiring a
//! caller to manage that state themselves.

// ------ MODULE DECLARATIONS

#[cfg(test)]
mod tests;

// ------ IMPORTS

use crate::geometry::{Coord, Point};
use crate::grid::{builder, CellGrid, PairedGrid};
use crate::mapreduce::{map_pairwise, map_pairwise_cross, ConcatReducer, MapReduceOptions};
use crate::sim_box::SimBox;

// ------ CONTENT

/// A persistent, incrementally-updatable neighbor list over a single population of points
/// (spec.md §6).
pub struct NeighborList<T: Coord, const N: usize> {
    box_: SimBox<T, N>,
    grid: CellGrid<T, N>,
    shards: Vec<CellGrid<T, N>>,
    pairs: Vec<(usize, usize, T)>,
    options: MapReduceOptions,
}

impl<T: Coord, const N: usize> NeighborList<T, N> {
    /// Build a neighbor list over `points` under `box_`.
    pub fn new(box_: SimBox<T, N>, points: &[Point<T, N>], options: MapReduceOptions) -> Self {
        let mut grid = CellGrid::empty(box_.n_cells());
        let mut shards = Vec::new();
        builder::build(&mut grid, &mut shards, points, &box_, options.parallel);
        Self {
            box_,
            grid,
            shards,
            pairs: Vec::new(),
            options,
        }
    }

    pub fn unit_cell(&self) -> &SimBox<T, N> {
        &self.box_
    }

    /// Recompute the grid for new point coordinates, reusing every allocation including the
    /// parallel-build shard grids — the steady-state path spec.md §9 requires.
    pub fn update(&mut self, points: &[Point<T, N>]) {
        builder::build(&mut self.grid, &mut self.shards, points, &self.box_, self.options.parallel);
    }

    /// Every pair `(i, j, d2)` with `i < j` and squared distance `d2 <= cutoff^2`.
    ///
    /// Rebuilds the grid first when this list was constructed (or last called) with
    /// `options.update_lists` set; call [`Self::update`] explicitly and build with
    /// `update_lists: false` to control rebuilds yourself.
    pub fn neighbor_list(&mut self, points: &[Point<T, N>]) -> &[(usize, usize, T)] {
        if self.options.update_lists {
            self.update(points);
        }
        let mut once = self.options.clone();
        once.update_lists = false;

        let mut reused = std::mem::take(&mut self.pairs);
        reused.clear();
        self.pairs = map_pairwise(
            points,
            &self.box_,
            &mut self.grid,
            &once,
            reused,
            |_, _, i, j, d2, mut acc| {
                let d = d2.sqrt();
                if i < j {
                    acc.push((i, j, d));
                } else {
                    acc.push((j, i, d));
                }
                acc
            },
            &ConcatReducer,
        );
        &self.pairs
    }
}

/// A persistent neighbor list between two populations of points (spec.md §6, §4.6).
pub struct CrossNeighborList<T: Coord, const N: usize> {
    box_: SimBox<T, N>,
    paired: PairedGrid<T, N>,
    pairs: Vec<(usize, usize, T)>,
    options: MapReduceOptions,
}

impl<T: Coord, const N: usize> CrossNeighborList<T, N> {
    pub fn new(
        box_: SimBox<T, N>,
        points_a: &[Point<T, N>],
        points_b: &[Point<T, N>],
        options: MapReduceOptions,
    ) -> Self {
        let paired = PairedGrid::build(points_a, points_b, &box_, options.parallel, options.autoswap);
        Self {
            box_,
            paired,
            pairs: Vec::new(),
            options,
        }
    }

    pub fn update(&mut self, points_a: &[Point<T, N>], points_b: &[Point<T, N>]) {
        self.paired
            .rebuild(points_a, points_b, &self.box_, self.options.parallel, self.options.autoswap);
    }

    /// Every pair `(i, j, d2)` where `i` indexes `points_a` and `j` indexes `points_b`.
    pub fn neighbor_list(
        &mut self,
        points_a: &[Point<T, N>],
        points_b: &[Point<T, N>],
    ) -> &[(usize, usize, T)] {
        if self.options.update_lists {
            self.update(points_a, points_b);
        }
        let mut once = self.options.clone();
        once.update_lists = false;

        let mut reused = std::mem::take(&mut self.pairs);
        reused.clear();
        self.pairs = map_pairwise_cross(
            points_a,
            points_b,
            &self.box_,
            &mut self.paired,
            &once,
            reused,
            |_, _, i, j, d2, mut acc| {
                acc.push((i, j, d2.sqrt()));
                acc
            },
            &ConcatReducer,
        );
        &self.pairs
    }
}

/// One-shot same-set neighbor list: build a grid, traverse once, and discard it.
///
/// Prefer [`NeighborList`] when calling this repeatedly over an evolving set of coordinates.
pub fn neighbor_list<T, const N: usize>(
    points: &[Point<T, N>],
    box_: &SimBox<T, N>,
    options: &MapReduceOptions,
) -> Vec<(usize, usize, T)>
where
    T: Coord,
{
    let mut grid = CellGrid::build(points, box_, options.parallel);
    let mut once = options.clone();
    once.update_lists = false;
    map_pairwise(
        points,
        box_,
        &mut grid,
        &once,
        Vec::new(),
        |_, _, i, j, d2, mut acc| {
            let d = d2.sqrt();
            if i < j {
                acc.push((i, j, d));
            } else {
                acc.push((j, i, d));
            }
            acc
        },
        &ConcatReducer,
    )
}

/// One-shot cross-set neighbor list: build a paired grid, traverse once, and discard it.
///
/// Prefer [`CrossNeighborList`] when calling this repeatedly over evolving coordinates.
pub fn cross_neighbor_list<T, const N: usize>(
    points_a: &[Point<T, N>],
    points_b: &[Point<T, N>],
    box_: &SimBox<T, N>,
    options: &MapReduceOptions,
) -> Vec<(usize, usize, T)>
where
    T: Coord,
{
    let mut paired = PairedGrid::build(points_a, points_b, box_, options.parallel, options.autoswap);
    let mut once = options.clone();
    once.update_lists = false;
    map_pairwise_cross(
        points_a,
        points_b,
        box_,
        &mut paired,
        &once,
        Vec::new(),
        |_, _, i, j, d2, mut acc| {
            acc.push((i, j, d2.sqrt()));
            acc
        },
        &ConcatReducer,
    )
}
