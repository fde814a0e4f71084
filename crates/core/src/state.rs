//! Owned prognostic fields for drivers and tests
//!
//! A host model usually keeps its own storage and builds [`ProjectionFields`]
//! from it directly. [`FlowState`] bundles the seven fields one projection
//! touches so that drivers and tests do not have to.

use crate::comm::Communicator;
use crate::error::PressureResult;
use crate::grid::{mirror_wall_ghosts, CyclicEdge, Field3d, Grid, SpatialOrder};
use crate::pressure::{ProjectionFields, VelocityFields};

/// Velocities, their tendencies and the pressure on one grid
#[derive(Debug, Clone)]
pub struct FlowState {
    pub u: Field3d,
    pub v: Field3d,
    pub w: Field3d,
    pub ut: Field3d,
    pub vt: Field3d,
    pub wt: Field3d,
    pub p: Field3d,
}

impl FlowState {
    /// Zero-initialised fields shaped for `grid`
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        Self {
            u: Field3d::new(grid),
            v: Field3d::new(grid),
            w: Field3d::new(grid),
            ut: Field3d::new(grid),
            vt: Field3d::new(grid),
            wt: Field3d::new(grid),
            p: Field3d::new(grid),
        }
    }

    /// Borrow everything a solve reads and writes
    pub fn projection_fields(&mut self) -> ProjectionFields<'_> {
        ProjectionFields {
            u: &self.u,
            v: &self.v,
            w: &self.w,
            ut: &mut self.ut,
            vt: &mut self.vt,
            wt: &mut self.wt,
            p: &mut self.p,
        }
    }

    #[must_use]
    pub fn velocity_fields(&self) -> VelocityFields<'_> {
        VelocityFields {
            u: &self.u,
            v: &self.v,
            w: &self.w,
        }
    }

    /// Refresh the velocity ghost cells the divergence stencils read
    ///
    /// Periodic in both horizontal directions. For fourth order the vertical
    /// velocity is also mirrored through the walls.
    ///
    /// # Errors
    ///
    /// Returns an error when a halo exchange fails.
    pub fn refresh_ghosts(
        &mut self,
        comm: &dyn Communicator,
        order: SpatialOrder,
    ) -> PressureResult<()> {
        comm.boundary_cyclic(&mut self.u, CyclicEdge::Both)?;
        comm.boundary_cyclic(&mut self.v, CyclicEdge::Both)?;
        comm.boundary_cyclic(&mut self.w, CyclicEdge::Both)?;
        if order == SpatialOrder::Fourth {
            mirror_wall_ghosts(&mut self.w);
        }
        Ok(())
    }

    /// Advance the velocities by one explicit Euler step of the tendencies
    pub fn advance(&mut self, dt: f64) {
        for (u, ut) in [
            (&mut self.u, &self.ut),
            (&mut self.v, &self.vt),
            (&mut self.w, &self.wt),
        ] {
            for (x, t) in u.as_mut_slice().iter_mut().zip(ut.as_slice()) {
                *x += dt * t;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::SerialCommunicator;
    use crate::grid::GridConfig;

    #[test]
    fn test_new_state_matches_grid() {
        let grid = Grid::new(&GridConfig::default(), SpatialOrder::Fourth).unwrap();
        let state = FlowState::new(&grid);
        assert_eq!(state.p.shape(), grid.cells());
        assert_eq!(state.w.ghost_cells(), (2, 2, 2));
    }

    #[test]
    fn test_refresh_ghosts_mirrors_w_for_fourth_order() {
        let grid = Grid::new(&GridConfig::default(), SpatialOrder::Fourth).unwrap();
        let comm = SerialCommunicator::new(&grid);
        let mut state = FlowState::new(&grid);
        state.w.fill_interior_with(|i, _, k| (i + k) as f64);
        state.refresh_ghosts(&comm, SpatialOrder::Fourth).unwrap();

        let i = grid.istart;
        let j = grid.jstart;
        assert_eq!(
            state.w.at(i, j, grid.kstart - 1),
            -state.w.at(i, j, grid.kstart + 1)
        );
        assert_eq!(
            state.w.at(grid.istart - 1, j, grid.kstart + 2),
            state.w.at(grid.iend - 1, j, grid.kstart + 2)
        );
    }

    #[test]
    fn test_advance_adds_scaled_tendency() {
        let grid = Grid::new(&GridConfig::default(), SpatialOrder::Second).unwrap();
        let mut state = FlowState::new(&grid);
        state.u.fill(1.0);
        state.vt.fill(2.0);
        state.advance(0.25);
        assert_eq!(state.u.at(3, 3, 3), 1.0);
        assert_eq!(state.v.at(3, 3, 3), 0.5);
    }
}
