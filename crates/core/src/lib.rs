//! Pressure Projection Core Library
//!
//! Pressure solver for large-eddy and direct numerical simulation of the
//! atmospheric boundary layer on a staggered grid that is periodic in both
//! horizontal directions and bounded by walls at the bottom and top.
//!
//! Each solve takes the momentum tendencies of one substep, solves the Poisson
//! equation for the pressure and subtracts its gradient, so that the velocity
//! after the substep is discretely divergence-free.
//!
//! ## Pipeline
//!
//! - Divergence of the provisional velocity (2nd or 4th order stencils)
//! - Real-to-half-complex FFTs in x and y, with transposes between pencils
//! - One tridiagonal (2nd order) or heptadiagonal (4th order) system per
//!   horizontal wavenumber pair, solved in parallel tiles of columns
//! - Inverse FFTs and the pressure-gradient correction of the tendencies

// Collectives and domain decomposition
pub mod comm;

// Grid geometry and field storage
pub mod grid;

// Projection solvers
pub mod pressure;

// Horizontal transforms
pub mod transform;

mod error;
pub mod profiler;
mod state;

// Re-export core types
pub use error::{PressureError, PressureResult};
pub use grid::{Dimensionality, Field3d, Grid, GridConfig, SpatialOrder};
pub use state::FlowState;

// Re-export solver types
pub use comm::{Communicator, Decomposition, SerialCommunicator};
pub use pressure::{
    create_pressure_solver, max_divergence, modified_wavenumbers, PressureConfig, PressureSolver,
    ProjectionFields, VelocityFields,
};
pub use profiler::ProfilerScope;
