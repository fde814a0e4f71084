//! Structured grid, field storage and ghost-cell helpers

pub mod boundary;
mod field;
mod geometry;

pub use boundary::{cyclic_local, mirror_wall_ghosts, neumann_ghosts, CyclicEdge};
pub use field::{Field3d, Strides};
pub use geometry::{Dimensionality, Grid, GridConfig, SpatialOrder};
