//! Borrowed views over the caller's fields for one solver call
//!
//! The solver never keeps references to these fields between calls. Velocities
//! are read only; tendencies and pressure are mutated in place.

use crate::error::{PressureError, PressureResult};
use crate::grid::{Field3d, Grid};

/// Read-only velocity components
#[derive(Debug, Clone, Copy)]
pub struct VelocityFields<'a> {
    pub u: &'a Field3d,
    pub v: &'a Field3d,
    pub w: &'a Field3d,
}

/// Everything one projection reads and writes
#[derive(Debug)]
pub struct ProjectionFields<'a> {
    pub u: &'a Field3d,
    pub v: &'a Field3d,
    pub w: &'a Field3d,
    pub ut: &'a mut Field3d,
    pub vt: &'a mut Field3d,
    pub wt: &'a mut Field3d,
    /// Overwritten with the solved pressure, ghost cells included
    pub p: &'a mut Field3d,
}

impl ProjectionFields<'_> {
    #[must_use]
    pub fn velocities(&self) -> VelocityFields<'_> {
        VelocityFields {
            u: self.u,
            v: self.v,
            w: self.w,
        }
    }

    pub(crate) fn validate(&self, grid: &Grid) -> PressureResult<()> {
        self.velocities().validate(grid)?;
        check_shape(grid, "ut", self.ut)?;
        check_shape(grid, "vt", self.vt)?;
        check_shape(grid, "wt", self.wt)?;
        check_shape(grid, "p", self.p)
    }
}

impl VelocityFields<'_> {
    pub(crate) fn validate(&self, grid: &Grid) -> PressureResult<()> {
        check_shape(grid, "u", self.u)?;
        check_shape(grid, "v", self.v)?;
        check_shape(grid, "w", self.w)
    }
}

fn check_shape(grid: &Grid, name: &'static str, field: &Field3d) -> PressureResult<()> {
    let expected = grid.cells();
    let actual = field.shape();
    if actual != expected || field.ghost_cells() != (grid.igc, grid.jgc, grid.kgc) {
        return Err(PressureError::FieldShape {
            field: name,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Reject timesteps the right-hand side cannot be divided by
pub(crate) fn validate_dt(dt: f64) -> PressureResult<()> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(PressureError::invalid_config(
            "dt",
            dt,
            "timestep must be positive and finite",
        ));
    }
    Ok(())
}
