//! The pair traversal: component E of the engine.
//!
//! Given a built [`crate::grid::CellGrid`], walk every cell once, compare each real point against
//! its neighbors within the box's cutoff, and fold the caller's function over every pair found.
//! Two traversal shapes are implemented: [`fold_same_set`] for a single population (spec.md §4.4)
//! and [`fold_cross_set`] for two populations (spec.md §4.6).

// ------ MODULE DECLARATIONS

mod pair_iter;
pub mod stencil;

// ------ RE-EXPORTS

pub use pair_iter::{fold_cross_set, fold_same_set};
