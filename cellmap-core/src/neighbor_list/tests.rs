//! Cross-cutting correctness properties of the `neighbor_list` façade (spec.md §8).
//!
//! Per-component tests live next to the component they exercise (`sim_box::tests`,
//! `grid::tests`, `traverse::tests`); the properties here are stated in terms of the public
//! façade because that is the unit the specification's invariants are phrased against.

use std::collections::HashSet;

use nalgebra::{Rotation2, Rotation3};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use super::*;

fn p2(x: f64, y: f64) -> Point<f64, 2> {
    Point::new(x, y)
}

fn p3(x: f64, y: f64, z: f64) -> Point<f64, 3> {
    Point::new(x, y, z)
}

/// Smallest representable step above a positive `f64`, used to build the "just barely valid"
/// literal scenarios of spec.md §8 without relying on the nightly-only `f64::next_up`.
fn next_up(x: f64) -> f64 {
    debug_assert!(x > 0.0 && x.is_finite());
    f64::from_bits(x.to_bits() + 1)
}

/// Symmetric counterpart of [`next_up`].
fn prev_down(x: f64) -> f64 {
    debug_assert!(x > 0.0 && x.is_finite());
    f64::from_bits(x.to_bits() - 1)
}

fn brute_force_pairs<const N: usize>(points: &[Point<f64, N>], r2: f64) -> HashSet<(usize, usize)> {
    let mut found = HashSet::new();
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            if crate::geometry::dist2(&points[i], &points[j]) <= r2 {
                found.insert((i, j));
            }
        }
    }
    found
}

// ---- literal scenarios (spec.md §8) ----

#[test]
fn literal_two_far_points_have_no_neighbors() {
    let points = vec![p3(0.0, 0.0, 1.0), p3(0.0, 0.0, 10.0)];
    let b: SimBox<f64, 3> = SimBox::non_periodic(&points, 2.0).unwrap();
    assert!(neighbor_list(&points, &b, &MapReduceOptions::default()).is_empty());
}

#[test]
fn literal_three_far_points_have_no_neighbors() {
    let points = vec![p3(0.0, 0.0, 1.0), p3(0.0, 0.0, 10.0), p3(0.0, 0.0, 7.0)];
    let b: SimBox<f64, 3> = SimBox::non_periodic(&points, 2.0).unwrap();
    assert!(neighbor_list(&points, &b, &MapReduceOptions::default()).is_empty());
}

#[test]
fn literal_boundary_cell_emits_the_tied_pair() {
    // cell = [2 + eps, 2 + eps], eps = nextUp(1.0) - 1.0; r = 1.0, d(p0, p1) = 1.0 exactly.
    let eps = next_up(1.0) - 1.0;
    let side = 2.0 + eps;
    let points = vec![p2(0.0, 0.0), p2(0.0, 1.0)];
    let b: SimBox<f64, 2> = SimBox::orthorhombic([side, side], 1.0, 1).unwrap();
    let result = neighbor_list(&points, &b, &MapReduceOptions::default());
    assert_eq!(result, vec![(0, 1, 1.0)]);
}

#[test]
fn literal_tightened_cutoff_excludes_the_tied_pair() {
    // r = prevDown(1.0) < 1.0 so the exact d = 1.0 pair no longer qualifies.
    let r = prev_down(1.0);
    let points = vec![p2(0.0, 0.0), p2(0.0, 1.0)];
    let b: SimBox<f64, 2> = SimBox::orthorhombic([2.0, 2.0], r, 1).unwrap();
    assert!(neighbor_list(&points, &b, &MapReduceOptions::default()).is_empty());
}

// ---- universal invariants (spec.md §8) ----

#[test]
fn completeness_matches_naive_reference_non_periodic() {
    let mut rng = SmallRng::seed_from_u64(0xc311_7a5);
    let points: Vec<_> = (0..60)
        .map(|_| p3(rng.random_range(0.0..15.0), rng.random_range(0.0..15.0), rng.random_range(0.0..15.0)))
        .collect();
    let b: SimBox<f64, 3> = SimBox::non_periodic(&points, 3.0).unwrap();
    let got: HashSet<(usize, usize)> = neighbor_list(&points, &b, &MapReduceOptions::default())
        .into_iter()
        .map(|(i, j, _)| (i, j))
        .collect();
    assert_eq!(got, brute_force_pairs(&points, b.cutoff2()));
}

#[test]
fn uniqueness_no_unordered_pair_emitted_twice() {
    let mut rng = SmallRng::seed_from_u64(0x756e_6971);
    let points: Vec<_> = (0..80)
        .map(|_| p2(rng.random_range(0.0..12.0), rng.random_range(0.0..12.0)))
        .collect();
    let b: SimBox<f64, 2> = SimBox::orthorhombic([12.0, 12.0], 2.0, 1).unwrap();
    let result = neighbor_list(&points, &b, &MapReduceOptions::default());
    let mut seen = HashSet::new();
    for (i, j, _) in &result {
        assert!(seen.insert((i.min(j), i.max(j))), "pair ({i}, {j}) emitted twice");
    }
}

#[test]
fn idempotence_of_update() {
    let points: Vec<_> = (0..40)
        .map(|i| p2((i % 7) as f64 * 0.8, (i / 7) as f64 * 0.8))
        .collect();
    let b: SimBox<f64, 2> = SimBox::orthorhombic([10.0, 10.0], 1.5, 1).unwrap();
    let mut nl = NeighborList::new(b, &points, MapReduceOptions::default());

    let first: HashSet<(usize, usize)> = nl
        .neighbor_list(&points)
        .iter()
        .map(|&(i, j, _)| (i, j))
        .collect();
    let second: HashSet<(usize, usize)> = nl
        .neighbor_list(&points)
        .iter()
        .map(|&(i, j, _)| (i, j))
        .collect();
    assert_eq!(first, second);
}

#[test]
fn rotation_invariance_non_periodic_2d() {
    let points: Vec<_> = (0..30)
        .map(|i| p2((i % 6) as f64 * 1.3, (i / 6) as f64 * 1.3))
        .collect();
    let b: SimBox<f64, 2> = SimBox::non_periodic(&points, 2.0).unwrap();
    let plain: HashSet<(usize, usize)> = neighbor_list(&points, &b, &MapReduceOptions::default())
        .into_iter()
        .map(|(i, j, _)| (i, j))
        .collect();

    let rot = Rotation2::new(0.7);
    let rotated: Vec<_> = points.iter().map(|p| rot * p).collect();
    let rb: SimBox<f64, 2> = SimBox::non_periodic(&rotated, 2.0).unwrap();
    let after: HashSet<(usize, usize)> = neighbor_list(&rotated, &rb, &MapReduceOptions::default())
        .into_iter()
        .map(|(i, j, _)| (i, j))
        .collect();

    assert_eq!(plain, after);
}

#[test]
fn rotation_invariance_non_periodic_3d() {
    let points: Vec<_> = (0..24)
        .map(|i| p3((i % 4) as f64, ((i / 4) % 3) as f64, (i / 12) as f64))
        .collect();
    let b: SimBox<f64, 3> = SimBox::non_periodic(&points, 1.5).unwrap();
    let plain: HashSet<(usize, usize)> = neighbor_list(&points, &b, &MapReduceOptions::default())
        .into_iter()
        .map(|(i, j, _)| (i, j))
        .collect();

    let rot = Rotation3::from_euler_angles(0.3, 0.6, 0.1);
    let rotated: Vec<_> = points.iter().map(|p| rot * p).collect();
    let rb: SimBox<f64, 3> = SimBox::non_periodic(&rotated, 1.5).unwrap();
    let after: HashSet<(usize, usize)> = neighbor_list(&rotated, &rb, &MapReduceOptions::default())
        .into_iter()
        .map(|(i, j, _)| (i, j))
        .collect();

    assert_eq!(plain, after);
}

#[test]
fn cutoff_monotonicity() {
    let points: Vec<_> = (0..50)
        .map(|i| p2((i % 8) as f64 * 1.1, (i / 8) as f64 * 1.1))
        .collect();
    let b_small: SimBox<f64, 2> = SimBox::orthorhombic([12.0, 12.0], 1.0, 1).unwrap();
    let b_large: SimBox<f64, 2> = SimBox::orthorhombic([12.0, 12.0], 3.0, 1).unwrap();

    let small: HashSet<(usize, usize)> = neighbor_list(&points, &b_small, &MapReduceOptions::default())
        .into_iter()
        .map(|(i, j, _)| (i, j))
        .collect();
    let large: HashSet<(usize, usize)> = neighbor_list(&points, &b_large, &MapReduceOptions::default())
        .into_iter()
        .map(|(i, j, _)| (i, j))
        .collect();

    assert!(small.is_subset(&large));
}

#[test]
fn cross_set_symmetry_is_independent_of_autoswap() {
    let a: Vec<_> = (0..5).map(|i| p2(i as f64 * 0.9, 0.0)).collect();
    let b: Vec<_> = (0..9).map(|i| p2(i as f64 * 0.5, 0.5)).collect();
    let box_: SimBox<f64, 2> = SimBox::non_periodic(&[a.clone(), b.clone()].concat(), 1.0).unwrap();

    let mut opts_swap = MapReduceOptions::default();
    opts_swap.autoswap = true;
    let mut opts_noswap = MapReduceOptions::default();
    opts_noswap.autoswap = false;

    let forward: HashSet<(usize, usize)> = cross_neighbor_list(&a, &b, &box_, &opts_swap)
        .into_iter()
        .map(|(i, j, _)| (i, j))
        .collect();
    let backward: HashSet<(usize, usize)> = cross_neighbor_list(&b, &a, &box_, &opts_noswap)
        .into_iter()
        .map(|(i, j, _)| (j, i))
        .collect();

    assert_eq!(forward, backward);
}

#[test]
fn steady_state_update_reuses_pair_buffer_capacity() {
    let points: Vec<_> = (0..200)
        .map(|i| p2((i % 14) as f64 * 0.7, (i / 14) as f64 * 0.7))
        .collect();
    let b: SimBox<f64, 2> = SimBox::orthorhombic([15.0, 15.0], 1.0, 1).unwrap();
    let mut nl = NeighborList::new(b, &points, MapReduceOptions::default());

    nl.neighbor_list(&points);
    let warm_capacity = nl.pairs.capacity();
    nl.neighbor_list(&points);
    assert_eq!(nl.pairs.capacity(), warm_capacity);
}
