//! Serial and threaded construction of a [`super::CellGrid`] (component C)

// ------ IMPORTS

use rayon::prelude::*;

use super::cell::{Cell, IndexedPoint};
use super::replicate;
use super::CellGrid;
use crate::geometry::{Coord, Point};
use crate::sim_box::SimBox;

// ------ CONTENT

/// Build (or rebuild) `grid` from `points`, in serial or sharded across worker threads.
///
/// `shards` is caller-owned scratch: pass the same `Vec` across repeated calls (as
/// [`crate::NeighborList`] does) to keep the parallel path allocation-free after warm-up.
pub fn build<T: Coord, const N: usize>(
    grid: &mut CellGrid<T, N>,
    shards: &mut Vec<CellGrid<T, N>>,
    points: &[Point<T, N>],
    box_: &SimBox<T, N>,
    parallel: bool,
) {
    reset(grid, box_.n_cells());
    grid.n_real_points = points.len();
    if points.is_empty() {
        grid.n_total_points = 0;
        return;
    }

    let offsets = box_.lattice_offsets();
    let workers = rayon::current_num_threads();
    let shard_count = if parallel {
        (points.len() / 500).max(1).min(workers)
    } else {
        1
    };

    if shard_count <= 1 {
        insert_range(grid, points, box_, offsets, 0..points.len());
    } else {
        while shards.len() < shard_count {
            shards.push(CellGrid::empty(box_.n_cells()));
        }
        let shard_size = points.len().div_ceil(shard_count);
        shards[..shard_count]
            .par_iter_mut()
            .enumerate()
            .for_each(|(s, shard_grid)| {
                reset(shard_grid, box_.n_cells());
                let start = s * shard_size;
                let end = (start + shard_size).min(points.len());
                if start < end {
                    insert_range(shard_grid, points, box_, offsets, start..end);
                }
            });
        merge(grid, &mut shards[..shard_count]);
    }

    grid.n_total_points = grid.cells.iter().map(|c| c.n_points).sum();
}

/// Reset `grid` for reuse: clear only the cell-index entries touched by the previous build, and
/// return every materialized [`Cell`] to the reuse pool so its point storage can be reclaimed.
fn reset<T: Coord, const N: usize>(grid: &mut CellGrid<T, N>, n_cells: usize) {
    if grid.n_cells != n_cells {
        grid.n_cells = n_cells;
        grid.cell_index_of = vec![0; n_cells];
        grid.touched.clear();
    } else {
        for &lin in &grid.touched {
            grid.cell_index_of[lin] = 0;
        }
        grid.touched.clear();
    }
    grid.cell_pool.append(&mut grid.cells);
    grid.real_cell_slots.clear();
    grid.n_real_points = 0;
    grid.n_total_points = 0;
}

fn insert_range<T: Coord, const N: usize>(
    grid: &mut CellGrid<T, N>,
    points: &[Point<T, N>],
    box_: &SimBox<T, N>,
    offsets: &[[i64; N]],
    range: std::ops::Range<usize>,
) {
    for i in range {
        let wrapped = box_.wrap(&points[i]);
        let cart = box_.cell_of(&wrapped);
        let lin = box_
            .linear_index(&cart)
            .unwrap_or_else(|| panic!("point {i} mapped outside the cell grid - internal inconsistency"));
        let center = cell_center(box_, &cart);
        let slot = get_or_create_cell(grid, lin, cart, center);
        insert_real_point(
            grid,
            slot,
            IndexedPoint {
                original_index: i,
                coords: wrapped,
                is_real: true,
            },
        );

        if box_.is_periodic() {
            replicate::ghost_images(box_, offsets, &wrapped, |image| {
                let gcart = box_.cell_of(&image);
                if let Some(glin) = box_.linear_index(&gcart) {
                    let gcenter = cell_center(box_, &gcart);
                    let gslot = get_or_create_cell(grid, glin, gcart, gcenter);
                    insert_ghost_point(
                        grid,
                        gslot,
                        IndexedPoint {
                            original_index: i,
                            coords: image,
                            is_real: false,
                        },
                    );
                }
            });
        }
    }
}

fn cell_center<T: Coord, const N: usize>(box_: &SimBox<T, N>, cart: &[i64; N]) -> Point<T, N> {
    let cell_size = box_.cell_size();
    let lcell = box_.lcell() as i64;
    let half = T::from(0.5_f64).unwrap();
    let mut c = box_.origin();
    for i in 0..N {
        let offset = T::from((cart[i] - lcell) as f64).unwrap();
        c[i] = c[i] + (offset + half) * cell_size[i];
    }
    c
}

fn get_or_create_cell<T: Coord, const N: usize>(
    grid: &mut CellGrid<T, N>,
    lin: usize,
    cart: [i64; N],
    center: Point<T, N>,
) -> usize {
    if let Some(slot) = grid.slot_of(lin) {
        return slot;
    }
    let mut cell = grid
        .cell_pool
        .pop()
        .unwrap_or_else(|| Cell::empty(lin, cart, center));
    cell.clear();
    cell.linear_index = lin;
    cell.cartesian_index = cart;
    cell.center = center;
    grid.cells.push(cell);
    let slot = grid.cells.len() - 1;
    grid.cell_index_of[lin] = slot + 1;
    grid.touched.push(lin);
    slot
}

fn insert_real_point<T: Coord, const N: usize>(
    grid: &mut CellGrid<T, N>,
    slot: usize,
    point: IndexedPoint<T, N>,
) {
    let was_real = grid.cells[slot].contains_real;
    grid.cells[slot].push_real(point);
    if !was_real {
        grid.real_cell_slots.push(slot);
    }
}

fn insert_ghost_point<T: Coord, const N: usize>(
    grid: &mut CellGrid<T, N>,
    slot: usize,
    point: IndexedPoint<T, N>,
) {
    grid.cells[slot].push_ghost(point);
}

/// Merge per-shard grids built by the parallel path into `grid` (spec.md §4.3 "Parallel path").
///
/// For each occupied source cell, either claim an empty destination slot (moving the cell's
/// storage wholesale, which is the common case since shards rarely share cells at shard
/// boundaries) or append its points to the existing destination cell, preserving the
/// reals-before-ghosts invariant.
fn merge<T: Coord, const N: usize>(grid: &mut CellGrid<T, N>, shards: &mut [CellGrid<T, N>]) {
    for shard in shards.iter_mut() {
        for mut cell in shard.cells.drain(..) {
            let lin = cell.linear_index;
            if let Some(dest_slot) = grid.slot_of(lin) {
                let was_real = grid.cells[dest_slot].contains_real;
                let n_real_src = cell.n_real;
                for (i, p) in cell.points.drain(..).enumerate() {
                    if i < n_real_src {
                        grid.cells[dest_slot].push_real(p);
                    } else {
                        grid.cells[dest_slot].push_ghost(p);
                    }
                }
                if !was_real && grid.cells[dest_slot].contains_real {
                    grid.real_cell_slots.push(dest_slot);
                }
                cell.clear();
                shard.cell_pool.push(cell);
            } else {
                let contains_real = cell.contains_real;
                grid.cells.push(cell);
                let slot = grid.cells.len() - 1;
                grid.cell_index_of[lin] = slot + 1;
                grid.touched.push(lin);
                if contains_real {
                    grid.real_cell_slots.push(slot);
                }
            }
        }
    }
}
