use super::*;
use crate::sim_box::SimBox;

fn p2(x: f64, y: f64) -> Point<f64, 2> {
    Point::new(x, y)
}

#[test]
fn build_counts_every_real_point_exactly_once() {
    let points = vec![p2(1.0, 1.0), p2(5.0, 5.0), p2(9.0, 9.0)];
    let b: SimBox<f64, 2> = SimBox::orthorhombic([10.0, 10.0], 2.0, 1).unwrap();
    let grid = CellGrid::build(&points, &b, false);
    assert_eq!(grid.n_real_points(), points.len());
    let real_count: usize = grid
        .cells()
        .iter()
        .map(|c| c.real_points().len())
        .sum();
    assert_eq!(real_count, points.len());
}

#[test]
fn non_periodic_grid_has_no_ghost_points() {
    let points = vec![p2(1.0, 1.0), p2(5.0, 5.0)];
    let b: SimBox<f64, 2> = SimBox::non_periodic(&points, 1.0).unwrap();
    let grid = CellGrid::build(&points, &b, false);
    assert_eq!(grid.n_total_points(), grid.n_real_points());
}

#[test]
fn periodic_point_near_a_face_gets_a_ghost_image() {
    // a point within cutoff of the box edge must have a periodic image on the opposite side
    let points = vec![p2(0.1, 5.0)];
    let b: SimBox<f64, 2> = SimBox::orthorhombic([10.0, 10.0], 2.0, 1).unwrap();
    let grid = CellGrid::build(&points, &b, false);
    assert!(grid.n_total_points() > grid.n_real_points());
}

#[test]
fn point_far_from_any_face_has_no_ghosts() {
    let points = vec![p2(5.0, 5.0)];
    let b: SimBox<f64, 2> = SimBox::orthorhombic([10.0, 10.0], 2.0, 1).unwrap();
    let grid = CellGrid::build(&points, &b, false);
    assert_eq!(grid.n_total_points(), grid.n_real_points());
}

#[test]
fn rebuild_reuses_storage_and_matches_a_fresh_build() {
    let points_a = vec![p2(1.0, 1.0), p2(5.0, 5.0)];
    let points_b = vec![p2(2.0, 2.0), p2(3.0, 3.0), p2(8.0, 8.0)];
    let b: SimBox<f64, 2> = SimBox::orthorhombic([10.0, 10.0], 2.0, 1).unwrap();

    let mut grid = CellGrid::build(&points_a, &b, false);
    grid.rebuild(&points_b, &b, false);

    let fresh = CellGrid::build(&points_b, &b, false);
    assert_eq!(grid.n_real_points(), fresh.n_real_points());
    assert_eq!(grid.n_total_points(), fresh.n_total_points());
    assert_eq!(grid.n_cells_with_real_points(), fresh.n_cells_with_real_points());
}

#[test]
fn serial_and_parallel_builds_place_the_same_number_of_points() {
    let points: Vec<_> = (0..200)
        .map(|i| p2((i % 20) as f64 * 0.5, (i / 20) as f64 * 0.5))
        .collect();
    let b: SimBox<f64, 2> = SimBox::orthorhombic([20.0, 20.0], 1.0, 1).unwrap();

    let serial = CellGrid::build(&points, &b, false);
    let parallel = CellGrid::build(&points, &b, true);
    assert_eq!(serial.n_real_points(), parallel.n_real_points());
    assert_eq!(serial.n_total_points(), parallel.n_total_points());
}

#[test]
fn paired_grid_autoswap_indexes_the_larger_set() {
    let small = vec![p2(1.0, 1.0)];
    let large = vec![p2(2.0, 2.0), p2(3.0, 3.0), p2(4.0, 4.0)];
    let b: SimBox<f64, 2> = SimBox::orthorhombic([10.0, 10.0], 2.0, 1).unwrap();

    // points_a (large) is passed first here, so autoswap must actually swap it into the
    // reference role and index the smaller set instead.
    let paired = PairedGrid::build(&large, &small, &b, false, true);
    assert!(paired.swap);
    assert_eq!(paired.reference_points.len(), small.len());
    assert_eq!(paired.target_grid.n_real_points(), large.len());
}

#[test]
fn paired_grid_without_autoswap_keeps_input_order() {
    let small = vec![p2(1.0, 1.0)];
    let large = vec![p2(2.0, 2.0), p2(3.0, 3.0), p2(4.0, 4.0)];
    let b: SimBox<f64, 2> = SimBox::orthorhombic([10.0, 10.0], 2.0, 1).unwrap();

    let paired = PairedGrid::build(&small, &large, &b, false, false);
    assert!(!paired.swap);
    assert_eq!(paired.reference_points.len(), small.len());
    assert_eq!(paired.target_grid.n_real_points(), large.len());
}
