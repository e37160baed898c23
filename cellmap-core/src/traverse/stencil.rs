//! Neighbor-cell offset sets for the pair traversal (spec.md §4.4).
//!
//! An [`UnitCellKind`] with a diagonal-or-absent lattice matrix (`Orthorhombic`, `NonPeriodic`)
//! only needs half of the 26 (or 8, in 2D) neighbor offsets: for every pair `{δ, -δ}` the
//! traversal visits the cell pair exactly once, from whichever side holds the lexicographically
//! "forward" offset. A general `Triclinic` matrix can shear a minimum-image neighbor into a cell
//! that a half-stencil centered on axis-aligned assumptions would miss, so it walks the full set
//! and instead de-duplicates by requiring `i < j` on the resulting point pair.

// ------ IMPORTS

use crate::grid::replicate::lattice_offsets;
use crate::sim_box::UnitCellKind;

// ------ CONTENT

/// Neighbor-cell offsets to visit for a single real cell, plus whether the caller must still
/// de-duplicate same-set pairs by requiring `i < j` (true only for the full, `Triclinic` stencil).
pub fn neighbor_offsets<const N: usize>(kind: UnitCellKind) -> (Vec<[i64; N]>, bool) {
    let all = lattice_offsets::<N>();
    match kind {
        UnitCellKind::Triclinic => (all, true),
        UnitCellKind::Orthorhombic | UnitCellKind::NonPeriodic => {
            (all.into_iter().filter(is_forward).collect(), false)
        }
    }
}

/// `true` for exactly one offset of every `{δ, -δ}` pair: the one whose first non-zero
/// component is positive.
fn is_forward<const N: usize>(k: &[i64; N]) -> bool {
    for &v in k {
        if v != 0 {
            return v > 0;
        }
    }
    false
}
