//! The map-reduce driver: component F of the engine.
//!
//! [`map_pairwise`] is the single entry point every higher-level operation (`neighbor_list`, and
//! any caller-supplied accumulation) goes through. It owns the decision of how many batches to
//! split the occupied-cell list into, runs them serially or across rayon's pool, and folds the
//! partial accumulators back together with a [`Reducer`].

// ------ IMPORTS

use rayon::prelude::*;

use crate::geometry::{Coord, Point};
use crate::grid::{CellGrid, PairedGrid};
use crate::sim_box::SimBox;
use crate::traverse::{fold_cross_set, fold_same_set};

// ------ CONTENT

/// Combines the partial accumulators produced by each traversal batch into one.
///
/// Grounded on `honeycomb-kernels`' reduction-closure style: most callers just want to append or
/// sum, so a closure-based default covers them, while the trait lets a caller plug in a custom
/// merge (e.g. a running histogram) without touching the traversal code.
pub trait Reducer<Acc>: Sync {
    fn identity(&self) -> Acc;
    fn combine(&self, a: Acc, b: Acc) -> Acc;
    fn reduce(&self, partials: Vec<Acc>) -> Acc {
        let mut iter = partials.into_iter();
        let first = iter.next().unwrap_or_else(|| self.identity());
        iter.fold(first, |acc, p| self.combine(acc, p))
    }
}

/// Reducer for accumulators that sum together (e.g. a running total, a histogram of bins).
pub struct SumReducer;

impl<Acc: std::iter::Sum + std::ops::Add<Output = Acc> + Default> Reducer<Acc> for SumReducer {
    fn identity(&self) -> Acc {
        Acc::default()
    }
    fn combine(&self, a: Acc, b: Acc) -> Acc {
        a + b
    }
}

/// Reducer for accumulators that are collections to be concatenated (e.g. a pair list).
pub struct ConcatReducer;

impl<Item> Reducer<Vec<Item>> for ConcatReducer {
    fn identity(&self) -> Vec<Item> {
        Vec::new()
    }
    fn combine(&self, mut a: Vec<Item>, mut b: Vec<Item>) -> Vec<Item> {
        a.append(&mut b);
        a
    }
}

/// Tuning knobs for [`map_pairwise`] (spec.md §5).
#[derive(Debug, Clone)]
pub struct MapReduceOptions {
    /// Split the traversal across rayon's thread pool.
    pub parallel: bool,
    /// Number of batches to split the occupied-cell list into when `parallel`. `None` defaults to
    /// `rayon::current_num_threads()`.
    pub nbatches: Option<usize>,
    /// Rebuild the grid(s) from the current point coordinates before traversing.
    pub update_lists: bool,
    /// For a two-set traversal, let the engine index whichever set is larger.
    pub autoswap: bool,
}

impl Default for MapReduceOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            nbatches: None,
            update_lists: true,
            autoswap: true,
        }
    }
}

fn batch_count(options: &MapReduceOptions) -> usize {
    if !options.parallel {
        return 1;
    }
    options.nbatches.unwrap_or_else(rayon::current_num_threads).max(1)
}

fn split_slots(slots: &[usize], nbatches: usize) -> Vec<&[usize]> {
    if slots.is_empty() {
        return Vec::new();
    }
    let chunk = slots.len().div_ceil(nbatches).max(1);
    slots.chunks(chunk).collect()
}

/// Fold `f` and `init` over every same-set point pair within `box_.cutoff()` of each other,
/// rebuilding `grid` first when `options.update_lists` is set (spec.md §5).
///
/// `f` must be associative-compatible with `reducer`: batches run independently and are stitched
/// back together with `reducer`, not necessarily in traversal order.
#[allow(clippy::too_many_arguments)]
pub fn map_pairwise<T, const N: usize, Acc, F, R>(
    points: &[Point<T, N>],
    box_: &SimBox<T, N>,
    grid: &mut CellGrid<T, N>,
    options: &MapReduceOptions,
    init: Acc,
    f: F,
    reducer: &R,
) -> Acc
where
    T: Coord,
    Acc: Clone + Send,
    F: Fn(&Point<T, N>, &Point<T, N>, usize, usize, T, Acc) -> Acc + Sync,
    R: Reducer<Acc>,
{
    if options.update_lists {
        grid.rebuild(points, box_, options.parallel);
    }

    let nbatches = batch_count(options);
    // `view.real_cell_slots` borrows the grid's own storage, so batching never clones the
    // occupied-cell list — the only per-call allocation left is `batches` itself, sized by
    // worker count rather than by point or cell count.
    let (view, scratch) = grid.split_for_traversal(nbatches);
    let batches = split_slots(view.real_cell_slots, nbatches);

    if options.parallel && batches.len() > 1 {
        let partials: Vec<Acc> = scratch[..batches.len()]
            .par_iter_mut()
            .zip(batches.par_iter())
            .map(|(buf, batch)| {
                fold_same_set(box_, &view, batch, buf, init.clone(), |a, b, i, j, d2, acc| {
                    f(a, b, i, j, d2, acc)
                })
            })
            .collect();
        reducer.reduce(partials)
    } else {
        let buf = &mut scratch[0];
        fold_same_set(box_, &view, view.real_cell_slots, buf, init, |a, b, i, j, d2, acc| {
            f(a, b, i, j, d2, acc)
        })
    }
}

/// Fold `f` and `init` over every cross-set point pair within cutoff, rebuilding `paired` first
/// when `options.update_lists` is set (spec.md §5, §4.6).
#[allow(clippy::too_many_arguments)]
pub fn map_pairwise_cross<T, const N: usize, Acc, F, R>(
    points_a: &[Point<T, N>],
    points_b: &[Point<T, N>],
    box_: &SimBox<T, N>,
    paired: &mut PairedGrid<T, N>,
    options: &MapReduceOptions,
    init: Acc,
    f: F,
    reducer: &R,
) -> Acc
where
    T: Coord,
    Acc: Clone + Send,
    F: Fn(&Point<T, N>, &Point<T, N>, usize, usize, T, Acc) -> Acc + Sync,
    R: Reducer<Acc>,
{
    if options.update_lists {
        paired.rebuild(points_a, points_b, box_, options.parallel, options.autoswap);
    }

    let nbatches = batch_count(options);
    // `target_grid` and `reference_points` are disjoint fields of `paired`: borrowing the grid
    // mutably here does not prevent borrowing the reference points immutably below, so this path
    // stays allocation-free rather than cloning the reference set on every call.
    let (view, _scratch) = paired.target_grid.split_for_traversal(1);
    let ref_points = &paired.reference_points;
    let n_ref = ref_points.len();
    let swap = paired.swap;

    if options.parallel && nbatches > 1 && n_ref > 0 {
        let chunk = n_ref.div_ceil(nbatches).max(1);
        let ranges: Vec<std::ops::Range<usize>> = (0..n_ref)
            .step_by(chunk)
            .map(|start| start..(start + chunk).min(n_ref))
            .collect();
        let partials: Vec<Acc> = ranges
            .into_par_iter()
            .map(|range| {
                fold_cross_set(
                    box_,
                    &view,
                    ref_points,
                    range,
                    swap,
                    init.clone(),
                    |a, b, i, j, d2, acc| f(a, b, i, j, d2, acc),
                )
            })
            .collect();
        reducer.reduce(partials)
    } else {
        fold_cross_set(box_, &view, ref_points, 0..n_ref, swap, init, |a, b, i, j, d2, acc| {
            f(a, b, i, j, d2, acc)
        })
    }
}
