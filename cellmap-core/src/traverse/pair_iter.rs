//! The inner pair-finding loops, shared by the serial and threaded `map_pairwise` paths.

// ------ IMPORTS

use crate::geometry::{dist2, Coord, Point};
use crate::grid::{GridView, ProjectedPoint};
use crate::sim_box::SimBox;

// ------ CONTENT

/// Fold `f` over every same-set pair within cutoff, restricted to the cells named by
/// `cell_slots` (a caller-chosen partition of [`crate::grid::CellGrid::real_cell_slots`], so a
/// parallel caller can assign disjoint slices to different workers).
///
/// `scratch` is reused across calls by the caller to keep the projection-sort prune
/// allocation-free in steady state.
#[allow(clippy::too_many_arguments)]
pub fn fold_same_set<T, const N: usize, Acc>(
    box_: &SimBox<T, N>,
    view: &GridView<'_, T, N>,
    cell_slots: &[usize],
    scratch: &mut Vec<ProjectedPoint<T, N>>,
    mut acc: Acc,
    mut f: impl FnMut(&Point<T, N>, &Point<T, N>, usize, usize, T, Acc) -> Acc,
) -> Acc
where
    T: Coord,
{
    let r = box_.cutoff();
    let r2 = box_.cutoff2();
    let (offsets, require_order) = box_.same_set_stencil();

    for &slot in cell_slots {
        let cell = &view.cells[slot];
        debug_assert!(cell.contains_real);

        // Intra-cell pass: every real point paired against every point following it in storage
        // order (reals first, then ghosts), so each unordered pair is visited exactly once.
        for a in 0..cell.points.len() {
            let pa = cell.points[a];
            if !pa.is_real {
                continue;
            }
            for pb in &cell.points[a + 1..] {
                if pb.original_index == pa.original_index {
                    continue;
                }
                let d2 = dist2(&pa.coords, &pb.coords);
                if d2 <= r2 {
                    // storage order within a cell is not guaranteed to track original index once
                    // a parallel build has merged shards, so normalize here rather than relying
                    // on insertion order.
                    let (oi, oj) = (
                        pa.original_index.min(pb.original_index),
                        pa.original_index.max(pb.original_index),
                    );
                    acc = f(
                        &pa.coords,
                        &pb.coords,
                        oi,
                        oj,
                        d2,
                        acc,
                    );
                }
            }
        }

        // Neighbor-cell pass, with the projection-sort prune of spec.md §4.4.
        for delta in &offsets {
            let mut neighbor_cart = cell.cartesian_index;
            for i in 0..N {
                neighbor_cart[i] += delta[i];
            }
            let Some(neighbor_lin) = box_.linear_index(&neighbor_cart) else {
                continue;
            };
            let Some(neighbor_slot) = view.slot_of(neighbor_lin) else {
                continue;
            };
            let neighbor = &view.cells[neighbor_slot];

            let delta_c = neighbor.center - cell.center;
            let dir = delta_c.normalize();

            scratch.clear();
            scratch.extend(neighbor.points.iter().map(|p| ProjectedPoint {
                original_index: p.original_index,
                x_proj: (p.coords - cell.center).dot(&dir),
                coords: p.coords,
            }));
            scratch.sort_by(|a, b| a.x_proj.partial_cmp(&b.x_proj).unwrap());

            for a in 0..cell.points.len() {
                let pa = cell.points[a];
                if !pa.is_real {
                    continue;
                }
                let x_i = (pa.coords - cell.center).dot(&dir);
                for sp in scratch.iter() {
                    if require_order && sp.original_index <= pa.original_index {
                        continue;
                    }
                    if sp.original_index == pa.original_index {
                        continue;
                    }
                    let diff = sp.x_proj - x_i;
                    if diff > r {
                        break;
                    }
                    let d2 = dist2(&pa.coords, &sp.coords);
                    if d2 <= r2 {
                        acc = f(&pa.coords, &sp.coords, pa.original_index, sp.original_index, d2, acc);
                    }
                }
            }
        }
    }
    acc
}

/// Fold `f` over every cross-set pair within cutoff, for the reference points named by
/// `ref_range` against the target grid in `view`. `swap` restores caller-facing index order when
/// `PairedGrid` indexed the larger of the two sets (spec.md §4.6).
#[allow(clippy::too_many_arguments)]
pub fn fold_cross_set<T, const N: usize, Acc>(
    box_: &SimBox<T, N>,
    view: &GridView<'_, T, N>,
    reference_points: &[Point<T, N>],
    ref_range: std::ops::Range<usize>,
    swap: bool,
    mut acc: Acc,
    mut f: impl FnMut(&Point<T, N>, &Point<T, N>, usize, usize, T, Acc) -> Acc,
) -> Acc
where
    T: Coord,
{
    let r2 = box_.cutoff2();
    let offsets = box_.lattice_offsets();

    for ref_idx in ref_range {
        let p = box_.wrap(&reference_points[ref_idx]);
        let cart0 = box_.cell_of(&p);

        for delta in std::iter::once([0i64; N]).chain(offsets.iter().copied()) {
            let mut cart = cart0;
            for i in 0..N {
                cart[i] += delta[i];
            }
            let Some(lin) = box_.linear_index(&cart) else {
                continue;
            };
            let Some(slot) = view.slot_of(lin) else {
                continue;
            };
            for pt in &view.cells[slot].points {
                let d2 = dist2(&p, &pt.coords);
                if d2 <= r2 {
                    let (i, j) = if swap {
                        (pt.original_index, ref_idx)
                    } else {
                        (ref_idx, pt.original_index)
                    };
                    acc = f(&p, &pt.coords, i, j, d2, acc);
                }
            }
        }
    }
    acc
}
