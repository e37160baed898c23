//! Common re-exports for `use cellmap_core::prelude::*;`.

pub use crate::error::{CellMapError, CellMapResult};
pub use crate::geometry::{Coord, Point};
pub use crate::grid::{CellGrid, PairedGrid};
pub use crate::mapreduce::{ConcatReducer, MapReduceOptions, Reducer, SumReducer};
pub use crate::neighbor_list::{cross_neighbor_list, neighbor_list, CrossNeighborList, NeighborList};
pub use crate::sim_box::{SimBox, UnitCellKind};
