//! Pressure solver trait definition
//!
//! Both spatial orders implement [`PressureSolver`], so a time integrator can hold
//! a `Box<dyn PressureSolver>` and never branch on the stencil.

use super::fields::{ProjectionFields, VelocityFields};
use crate::error::PressureResult;
use crate::grid::{Grid, SpatialOrder};

/// Projection of the momentum tendencies onto divergence-free velocities
///
/// A solver owns its wavenumber tables, transform plans and work arrays. The
/// fields are borrowed for the duration of one call only.
pub trait PressureSolver: Send + Sync {
    /// Solve the pressure Poisson equation and correct the tendencies
    ///
    /// After this call `u + dt * ut` (and likewise for `v` and `w`) is
    /// discretely divergence-free, and `p` holds the pressure with its ghost
    /// cells filled.
    ///
    /// # Arguments
    ///
    /// * `fields` - Velocities (read), tendencies and pressure (written)
    /// * `dt` - Timestep in seconds of the substep being projected
    ///
    /// # Errors
    ///
    /// Returns an error when `dt` is not positive, a field does not match the
    /// grid, a pivot of a vertical system vanishes, or a collective fails.
    fn solve(&mut self, fields: &mut ProjectionFields<'_>, dt: f64) -> PressureResult<()>;

    /// Maximum absolute divergence of the velocities over all ranks
    ///
    /// Ghost cells of the velocities must be current.
    ///
    /// # Errors
    ///
    /// Returns an error when a field does not match the grid or the global
    /// reduction fails.
    fn check_divergence(&self, fields: &VelocityFields<'_>) -> PressureResult<f64>;

    /// Rebuild every grid-dependent table after the geometry changed
    ///
    /// # Errors
    ///
    /// Returns [`crate::PressureError::InvalidConfig`] when `grid` is built for
    /// a different order or does not match the communicator.
    fn reinitialize(&mut self, grid: Grid) -> PressureResult<()>;

    /// Order of the finite-difference stencils
    fn spatial_order(&self) -> SpatialOrder;

    /// Grid the solver is currently built for
    fn grid(&self) -> &Grid;
}
