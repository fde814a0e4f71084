//! Fourth-order projection with a heptadiagonal vertical solve

use super::divergence::max_divergence;
use super::fields::{validate_dt, ProjectionFields, VelocityFields};
use super::heptadiagonal::{HeptadiagonalTile, VerticalBands};
use super::spectral::SpectralWorkspace;
use super::stencil::{grad4, CGI};
use super::{PressureConfig, PressureSolver};
use crate::comm::Communicator;
use crate::error::{PressureError, PressureResult};
use crate::grid::{
    mirror_wall_ghosts, neumann_ghosts, CyclicEdge, Dimensionality, Grid, SpatialOrder,
};
use crate::profiler::ProfilerScope;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Pressure solver for fourth-order staggered differences
///
/// Each vertical column is extended by two ghost levels on either side, so the
/// augmented systems have `ktot + 4` rows. Columns are solved in tiles of
/// [`PressureConfig::tile_width`].
pub struct FourthOrderSolver {
    spectral: SpectralWorkspace,
    bands: VerticalBands,
}

impl FourthOrderSolver {
    /// Build wavenumber tables and the vertical bands for `grid`
    ///
    /// # Errors
    ///
    /// Returns [`PressureError::InvalidConfig`] when the grid was built for a
    /// different order, the configuration is invalid, or the communicator's
    /// decomposition does not match the grid.
    pub fn new(
        grid: Grid,
        config: PressureConfig,
        comm: Arc<dyn Communicator>,
    ) -> PressureResult<Self> {
        check_order(&grid)?;
        let bands = VerticalBands::new(&grid);
        let spectral = SpectralWorkspace::new(grid, config, comm)?;
        Ok(Self { spectral, bands })
    }

    fn solve_vertical(&mut self) -> PressureResult<()> {
        let _scope = ProfilerScope::new("pressure vertical solve");
        let ktot = self.spectral.grid.ktot;
        let tile = self.spectral.config.tile_width;
        let bands = &self.bands;
        let (columns, modes) = self.spectral.columns();

        columns
            .par_chunks_mut(ktot * tile)
            .enumerate()
            .try_for_each_init(
                || HeptadiagonalTile::new(ktot, tile),
                |hepta, (t, chunk)| {
                    let ncols = chunk.len() / ktot;
                    for (n, column) in chunk.chunks(ktot).enumerate() {
                        let mode = modes.mode(t * tile + n);
                        hepta.load_column(n, bands, mode.eigenvalue, mode.index, mode.zero, column);
                    }
                    hepta.factor_and_solve(ncols)?;
                    for (n, column) in chunk.chunks_mut(ktot).enumerate() {
                        hepta.store_column(n, column);
                    }
                    Ok(())
                },
            )
    }
}

fn check_order(grid: &Grid) -> PressureResult<()> {
    if grid.order != SpatialOrder::Fourth {
        return Err(PressureError::invalid_config(
            "order",
            grid.order,
            "fourth-order solver needs a grid built for 4th order",
        ));
    }
    Ok(())
}

impl PressureSolver for FourthOrderSolver {
    fn solve(&mut self, fields: &mut ProjectionFields<'_>, dt: f64) -> PressureResult<()> {
        validate_dt(dt)?;
        fields.validate(&self.spectral.grid)?;
        let _scope = ProfilerScope::new("pressure solve");
        debug!("Pressure solve (4th order), dt = {dt}");

        let dimensionality = self.spectral.grid.dimensionality();
        let comm = Arc::clone(&self.spectral.comm);
        comm.boundary_cyclic(fields.ut, CyclicEdge::X)?;
        if dimensionality == Dimensionality::ThreeD {
            comm.boundary_cyclic(fields.vt, CyclicEdge::Y)?;
        }
        mirror_wall_ghosts(fields.wt);

        {
            let _scope = ProfilerScope::new("pressure input");
            let grid = &self.spectral.grid;
            match dimensionality {
                Dimensionality::ThreeD => input::<true>(grid, fields, dt),
                Dimensionality::TwoD => input::<false>(grid, fields, dt),
            }
        }

        self.spectral.gather(fields.p);
        self.spectral.forward()?;
        self.solve_vertical()?;
        self.spectral.backward()?;
        self.spectral.scatter(fields.p);

        neumann_ghosts(fields.p);
        comm.boundary_cyclic(fields.p, CyclicEdge::Both)?;

        {
            let _scope = ProfilerScope::new("pressure output");
            let grid = &self.spectral.grid;
            match dimensionality {
                Dimensionality::ThreeD => output::<true>(grid, fields),
                Dimensionality::TwoD => output::<false>(grid, fields),
            }
        }

        if self.spectral.config.report_divergence {
            let divmax = self.check_divergence(&fields.velocities())?;
            info!("Maximum divergence after pressure solve: {divmax:.14e}");
        }
        Ok(())
    }

    fn check_divergence(&self, fields: &VelocityFields<'_>) -> PressureResult<f64> {
        fields.validate(&self.spectral.grid)?;
        let local = max_divergence(&self.spectral.grid, fields);
        self.spectral.comm.global_max(local)
    }

    fn reinitialize(&mut self, grid: Grid) -> PressureResult<()> {
        check_order(&grid)?;
        self.bands = VerticalBands::new(&grid);
        self.spectral.rebuild(grid)?;
        info!(
            "Pressure solver re-initialized: {}x{}x{} grid, 4th order",
            self.spectral.grid.itot, self.spectral.grid.jtot, self.spectral.grid.ktot
        );
        Ok(())
    }

    fn spatial_order(&self) -> SpatialOrder {
        SpatialOrder::Fourth
    }

    fn grid(&self) -> &Grid {
        &self.spectral.grid
    }
}

/// Fourth-order divergence of `u/dt + ut` into `p`
fn input<const DIM3: bool>(grid: &Grid, fields: &mut ProjectionFields<'_>, dt: f64) {
    let s = grid.strides();
    let (ii, jj, kk) = (s.ii, s.jj, s.kk);
    let dxi = 1.0 / grid.dx;
    let dyi = 1.0 / grid.dy;
    let dti = 1.0 / dt;

    let (u, v, w) = (fields.u.as_slice(), fields.v.as_slice(), fields.w.as_slice());
    let (ut, vt, wt) = (fields.ut.as_slice(), fields.vt.as_slice(), fields.wt.as_slice());
    let uc = |n: usize| ut[n] + u[n] * dti;
    let vc = |n: usize| vt[n] + v[n] * dti;
    let wc = |n: usize| wt[n] + w[n] * dti;

    fields
        .p
        .as_mut_slice()
        .par_chunks_mut(kk)
        .enumerate()
        .skip(grid.kstart)
        .take(grid.ktot)
        .for_each(|(k, plane)| {
            for j in grid.jstart..grid.jend {
                for i in grid.istart..grid.iend {
                    let ij = i + j * jj;
                    let ijk = ij + k * kk;
                    let mut div =
                        grad4(uc(ijk - ii), uc(ijk), uc(ijk + ii), uc(ijk + 2 * ii)) * CGI * dxi;
                    if DIM3 {
                        div += grad4(vc(ijk - jj), vc(ijk), vc(ijk + jj), vc(ijk + 2 * jj))
                            * CGI
                            * dyi;
                    }
                    div += grad4(wc(ijk - kk), wc(ijk), wc(ijk + kk), wc(ijk + 2 * kk))
                        * grid.dzi4[k];
                    plane[ij] = div;
                }
            }
        });
}

/// Subtract the fourth-order pressure gradient from the tendencies
///
/// The vertical tendency on the bottom wall face is left untouched.
fn output<const DIM3: bool>(grid: &Grid, fields: &mut ProjectionFields<'_>) {
    let s = grid.strides();
    let (ii, jj, kk) = (s.ii, s.jj, s.kk);
    let dxi = 1.0 / grid.dx;
    let dyi = 1.0 / grid.dy;
    let p = fields.p.as_slice();

    fields
        .ut
        .as_mut_slice()
        .par_chunks_mut(kk)
        .zip(fields.vt.as_mut_slice().par_chunks_mut(kk))
        .zip(fields.wt.as_mut_slice().par_chunks_mut(kk))
        .enumerate()
        .skip(grid.kstart)
        .take(grid.ktot)
        .for_each(|(k, ((ut, vt), wt))| {
            for j in grid.jstart..grid.jend {
                for i in grid.istart..grid.iend {
                    let ij = i + j * jj;
                    let ijk = ij + k * kk;
                    ut[ij] -= grad4(p[ijk - 2 * ii], p[ijk - ii], p[ijk], p[ijk + ii]) * CGI * dxi;
                    if DIM3 {
                        vt[ij] -=
                            grad4(p[ijk - 2 * jj], p[ijk - jj], p[ijk], p[ijk + jj]) * CGI * dyi;
                    }
                    if k > grid.kstart {
                        wt[ij] -= grad4(p[ijk - 2 * kk], p[ijk - kk], p[ijk], p[ijk + kk])
                            * grid.dzhi4[k];
                    }
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::SerialCommunicator;
    use crate::grid::{cyclic_local, GridConfig};
    use crate::state::FlowState;
    use approx::assert_relative_eq;

    fn solver(config: &GridConfig, tile_width: usize) -> FourthOrderSolver {
        let grid = Grid::new(config, SpatialOrder::Fourth).unwrap();
        let comm = Arc::new(SerialCommunicator::new(&grid));
        let config = PressureConfig {
            tile_width,
            ..PressureConfig::default()
        };
        FourthOrderSolver::new(grid, config, comm).unwrap()
    }

    fn tendency_state(grid: &Grid) -> FlowState {
        let mut state = FlowState::new(grid);
        state
            .ut
            .fill_interior_with(|i, j, k| (i as f64 * 0.9).sin() + 0.1 * (j * k) as f64);
        state
            .wt
            .fill_interior_with(|i, j, k| if k == 0 { 0.0 } else { (i + 2 * j) as f64 * 0.05 });
        state
    }

    #[test]
    fn test_tile_width_does_not_change_the_result() {
        let config = GridConfig {
            itot: 6,
            jtot: 5,
            ktot: 6,
            ..GridConfig::default()
        };
        let mut results = Vec::new();
        for tile_width in [1, 4, 7, 64] {
            let mut s = solver(&config, tile_width);
            let mut state = tendency_state(s.grid());
            s.solve(&mut state.projection_fields(), 1.0).unwrap();
            results.push(state.p.clone());
        }
        for p in &results[1..] {
            for (a, b) in p.as_slice().iter().zip(results[0].as_slice()) {
                assert_relative_eq!(*a, *b, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_corrected_tendencies_are_divergence_free() {
        let mut s = solver(&GridConfig::default(), 8);
        let grid = s.grid().clone();
        let mut state = tendency_state(&grid);
        s.solve(&mut state.projection_fields(), 1.0).unwrap();

        cyclic_local(&mut state.ut, CyclicEdge::Both);
        cyclic_local(&mut state.vt, CyclicEdge::Both);
        mirror_wall_ghosts(&mut state.wt);
        let vel = VelocityFields {
            u: &state.ut,
            v: &state.vt,
            w: &state.wt,
        };
        assert_relative_eq!(max_divergence(&grid, &vel), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pressure_ghosts_are_zero_gradient() {
        let mut s = solver(&GridConfig::default(), 8);
        let grid = s.grid().clone();
        let mut state = tendency_state(&grid);
        s.solve(&mut state.projection_fields(), 1.0).unwrap();
        let (i, j) = (grid.istart + 1, grid.jstart + 2);
        let p = &state.p;
        assert_eq!(p.at(i, j, grid.kstart - 1), p.at(i, j, grid.kstart));
        assert_eq!(p.at(i, j, grid.kstart - 2), p.at(i, j, grid.kstart + 1));
        assert_eq!(p.at(i, j, grid.kend), p.at(i, j, grid.kend - 1));
        assert_eq!(p.at(i, j, grid.kend + 1), p.at(i, j, grid.kend - 2));
    }
}
