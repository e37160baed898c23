//! `cellmap-core`: a cell-list spatial index and pairwise-mapping engine.
//!
//! Given a set of points, a cutoff radius, and an optional periodic unit cell, this crate
//! partitions the points into a grid of cells sized so that any pair within the cutoff is
//! guaranteed to fall in the same cell or an adjacent one (the minimum-image convention), then
//! walks that grid once per query instead of all `O(n^2)` pairs.
//!
//! The pieces, bottom-up:
//!
//! - [`sim_box`] — the periodic or non-periodic unit cell and its grid sizing ([`SimBox`]).
//! - [`geometry`] — the scalar and point representation shared by everything else.
//! - [`grid`] — the cell list itself ([`CellGrid`], [`PairedGrid`]), its serial/threaded
//!   [`grid::builder`], and the periodic [`grid::replicate`] ghost-image generator.
//! - [`traverse`] — the pair-finding inner loops, with the projection-sort pruning optimization.
//! - [`mapreduce`] — [`map_pairwise`], the map-reduce driver every higher-level query goes
//!   through.
//! - [`neighbor_list`] — [`NeighborList`] and [`CrossNeighborList`], the stateful façades that
//!   keep the grid and its buffers alive across repeated queries, plus one-shot free functions.
//!
//! See [`prelude`] for the common re-exports.

// ------ MODULE DECLARATIONS

pub mod error;
pub mod geometry;
pub mod grid;
pub mod mapreduce;
pub mod neighbor_list;
pub mod prelude;
pub mod sim_box;
pub mod traverse;

// ------ RE-EXPORTS

pub use error::{CellMapError, CellMapResult};
pub use geometry::{Coord, Point};
pub use grid::{CellGrid, PairedGrid};
pub use mapreduce::{map_pairwise, map_pairwise_cross, ConcatReducer, MapReduceOptions, Reducer, SumReducer};
pub use neighbor_list::{cross_neighbor_list, neighbor_list, CrossNeighborList, NeighborList};
pub use sim_box::{SimBox, UnitCellKind};
