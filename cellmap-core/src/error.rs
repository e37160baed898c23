//! Crate-level error type

// ------ IMPORTS

use thiserror::Error;

// ------ CONTENT

/// Convenience type alias.
pub type CellMapResult<T> = Result<T, CellMapError>;

/// Configuration and input error enum.
///
/// This enum covers the errors a caller can recover from — bad parameters, mismatched
/// dimensions. Violations of internal invariants (a ghost landing outside the halo, a cell
/// index out of range) are programming errors and panic instead; see the crate-level docs.
#[derive(Debug, Error, PartialEq)]
pub enum CellMapError {
    /// The lattice fails the minimum-image criterion for the given cutoff, i.e. the cutoff is
    /// not strictly smaller than half of the smallest cell-defining height of the unit cell.
    #[error("invalid unit cell for cutoff {cutoff}: {reason}")]
    InvalidCell {
        /// Cutoff that was requested.
        cutoff: String,
        /// Human-readable description of which lattice constraint failed.
        reason: &'static str,
    },
    /// The supplied cutoff is non-positive or non-finite.
    #[error("cutoff must be positive and finite, got {0}")]
    CutoffNotPositive(String),
    /// Coordinate dimension does not match the lattice dimension, or the two point sets of a
    /// cross query do not agree on dimension.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension the caller's other inputs agreed on.
        expected: usize,
        /// Dimension of the offending input.
        got: usize,
    },
    /// An explicit unit cell was supplied to a system being constructed as non-periodic.
    #[error("a unit cell was supplied for a system declared non-periodic")]
    NonPeriodicWithCellOverride,
}
