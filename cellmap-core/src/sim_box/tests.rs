use super::*;
use crate::geometry::Point;

fn p2(x: f64, y: f64) -> Point<f64, 2> {
    Point::new(x, y)
}

#[test]
fn orthorhombic_rejects_non_positive_cutoff() {
    let err = SimBox::orthorhombic([10.0, 10.0], 0.0, 1).unwrap_err();
    assert!(matches!(err, CellMapError::CutoffNotPositive(_)));
}

#[test]
fn orthorhombic_rejects_cutoff_violating_minimum_image() {
    // half the smallest side is 5.0, so a cutoff of 5.0 (not strictly less) must be rejected
    let err = SimBox::orthorhombic([10.0, 10.0], 5.0, 1).unwrap_err();
    assert!(matches!(err, CellMapError::InvalidCell { .. }));
}

#[test]
fn orthorhombic_accepts_valid_cutoff_and_sizes_grid() {
    let b: SimBox<f64, 2> = SimBox::orthorhombic([10.0, 10.0], 2.0, 1).unwrap();
    assert!(b.is_periodic());
    // at least floor(10/2) = 5 interior cells per axis, plus a halo of 1 on each side
    assert!(b.nc()[0] >= 5 + 2);
    assert!(b.nc()[1] >= 5 + 2);
}

#[test]
fn wrap_maps_outside_points_into_the_box() {
    let b: SimBox<f64, 2> = SimBox::orthorhombic([10.0, 10.0], 2.0, 1).unwrap();
    let wrapped = b.wrap(&p2(12.5, -1.0));
    assert!(wrapped[0] >= 0.0 && wrapped[0] < 10.0);
    assert!(wrapped[1] >= 0.0 && wrapped[1] < 10.0);
    assert!((wrapped[0] - 2.5).abs() < 1e-9);
    assert!((wrapped[1] - 9.0).abs() < 1e-9);
}

#[test]
fn wrap_is_identity_for_non_periodic() {
    let points = [p2(0.0, 0.0), p2(5.0, 5.0)];
    let b: SimBox<f64, 2> = SimBox::non_periodic(&points, 1.0).unwrap();
    let p = p2(-3.0, 20.0);
    assert_eq!(b.wrap(&p), p);
}

#[test]
fn non_periodic_pads_extent_by_cutoff() {
    let points = [p2(0.0, 0.0), p2(5.0, 5.0)];
    let b: SimBox<f64, 2> = SimBox::non_periodic(&points, 1.0).unwrap();
    assert!((b.origin()[0] - (-1.0)).abs() < 1e-9);
    assert!((b.origin()[1] - (-1.0)).abs() < 1e-9);
    // side grows by 2*cutoff over the raw span
    assert!((b.max_corner()[0] - 7.0).abs() < 1e-9);
}

#[test]
fn updated_rejects_explicit_cell_for_non_periodic() {
    let points = [p2(0.0, 0.0)];
    let b: SimBox<f64, 2> = SimBox::non_periodic(&points, 1.0).unwrap();
    let matrix = SMatrix::<f64, 2, 2>::identity();
    let err = b.updated(Some(matrix), None).unwrap_err();
    assert_eq!(err, CellMapError::NonPeriodicWithCellOverride);
}

#[test]
fn updated_with_smaller_cutoff_refines_the_grid() {
    let b: SimBox<f64, 2> = SimBox::orthorhombic([10.0, 10.0], 2.0, 1).unwrap();
    let coarse_cells = b.n_cells();
    let b2 = b.updated(None, Some(1.0)).unwrap();
    assert!(b2.n_cells() >= coarse_cells);
}

#[test]
fn linear_and_cartesian_index_roundtrip() {
    let b: SimBox<f64, 3> = SimBox::orthorhombic([10.0, 10.0, 10.0], 2.0, 1).unwrap();
    for lin in 0..b.n_cells() {
        let cart = b.cartesian_index(lin);
        assert_eq!(b.linear_index(&cart), Some(lin));
    }
}

#[test]
fn triclinic_matrix_with_shear_is_accepted_when_minimum_image_holds() {
    let matrix = SMatrix::<f64, 2, 2>::new(20.0, 0.0, 5.0, 20.0);
    let b = SimBox::triclinic(matrix, 2.0, 1);
    assert!(b.is_ok());
    assert_eq!(b.unwrap().kind(), UnitCellKind::Triclinic);
}
