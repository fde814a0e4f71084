//! Pressure projection
//!
//! Each solve takes the divergence of the provisional velocity, transforms it
//! to horizontal wavenumber space, solves one banded vertical system per
//! wavenumber pair, transforms back and subtracts the pressure gradient from
//! the tendencies.
//!
//! | order | vertical system | ghost cells |
//! |-------|-----------------|-------------|
//! | 2     | tridiagonal     | 1           |
//! | 4     | heptadiagonal   | 2           |
//!
//! # Example
//!
//! ```rust,ignore
//! use abl_pressure_core::{create_pressure_solver, FlowState, Grid, GridConfig};
//! use abl_pressure_core::{PressureConfig, SerialCommunicator, SpatialOrder};
//! use std::sync::Arc;
//!
//! let grid = Grid::new(&GridConfig::default(), SpatialOrder::Second)?;
//! let comm = Arc::new(SerialCommunicator::new(&grid));
//! let mut solver = create_pressure_solver(grid.clone(), PressureConfig::default(), comm)?;
//! let mut state = FlowState::new(&grid);
//! solver.solve(&mut state.projection_fields(), 0.1)?;
//! ```

mod config;
pub mod divergence;
mod fields;
mod fourth_order;
pub mod heptadiagonal;
mod second_order;
mod spectral;
pub mod stencil;
#[allow(clippy::module_name_repetitions)]
mod r#trait;
pub mod tridiagonal;
pub mod wavenumber;

pub use config::PressureConfig;
pub use divergence::max_divergence;
pub use fields::{ProjectionFields, VelocityFields};
pub use fourth_order::FourthOrderSolver;
pub use r#trait::PressureSolver;
pub use second_order::SecondOrderSolver;
pub use wavenumber::modified_wavenumbers;

use crate::comm::Communicator;
use crate::error::PressureResult;
use crate::grid::{Grid, SpatialOrder};
use std::sync::Arc;
use tracing::info;

/// Create the pressure solver matching the order the grid was built for
///
/// # Arguments
///
/// * `grid` - Grid geometry, including the spatial order
/// * `config` - Tiling and reporting settings
/// * `comm` - Communicator whose decomposition matches `grid`
///
/// # Returns
///
/// A boxed `PressureSolver` for 2nd or 4th order stencils
///
/// # Errors
///
/// Returns [`crate::PressureError::InvalidConfig`] when `config` is invalid or
/// the communicator's decomposition does not match the grid.
pub fn create_pressure_solver(
    grid: Grid,
    config: PressureConfig,
    comm: Arc<dyn Communicator>,
) -> PressureResult<Box<dyn PressureSolver>> {
    info!(
        "Pressure solver: {}x{}x{} grid, {}, {:?}, tile width {}",
        grid.itot,
        grid.jtot,
        grid.ktot,
        grid.order,
        grid.dimensionality(),
        config.tile_width
    );
    match grid.order {
        SpatialOrder::Second => Ok(Box::new(SecondOrderSolver::new(grid, config, comm)?)),
        SpatialOrder::Fourth => Ok(Box::new(FourthOrderSolver::new(grid, config, comm)?)),
    }
}
