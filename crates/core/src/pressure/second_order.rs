//! Second-order projection with a tridiagonal vertical solve

use super::divergence::max_divergence;
use super::fields::{validate_dt, ProjectionFields, VelocityFields};
use super::spectral::SpectralWorkspace;
use super::tridiagonal::{solve_tridiagonal, TridiagonalCoefficients};
use super::{PressureConfig, PressureSolver};
use crate::comm::Communicator;
use crate::error::{PressureError, PressureResult};
use crate::grid::{neumann_ghosts, CyclicEdge, Dimensionality, Grid, SpatialOrder};
use crate::profiler::ProfilerScope;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Pressure solver for second-order staggered differences
pub struct SecondOrderSolver {
    spectral: SpectralWorkspace,
    coefficients: TridiagonalCoefficients,
}

impl SecondOrderSolver {
    /// Build wavenumber tables and vertical coefficients for `grid`
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
        if grid.order != SpatialOrder::Second {
            return Err(PressureError::invalid_config(
                "order",
                grid.order,
                "second-order solver needs a grid built for 2nd order",
            ));
        }
        let coefficients = TridiagonalCoefficients::new(&grid);
        let spectral = SpectralWorkspace::new(grid, config, comm)?;
        Ok(Self {
            spectral,
            coefficients,
        })
    }

    fn solve_vertical(&mut self) -> PressureResult<()> {
        let _scope = ProfilerScope::new("pressure vertical solve");
        let ktot = self.spectral.grid.ktot;
        let tile = self.spectral.config.tile_width;
        let coefficients = &self.coefficients;
        let (columns, modes) = self.spectral.columns();

        columns
            .par_chunks_mut(ktot * tile)
            .enumerate()
            .try_for_each_init(
                || (vec![0.0; ktot], vec![0.0; ktot]),
                |(b, gam), (t, chunk)| {
                    for (n, column) in chunk.chunks_mut(ktot).enumerate() {
                        let mode = modes.mode(t * tile + n);
                        coefficients.diagonal(mode.eigenvalue, mode.zero, b);
                        for (x, dz2) in column.iter_mut().zip(&coefficients.dz2) {
                            *x *= dz2;
                        }
                        solve_tridiagonal(
                            &coefficients.a,
                            b,
                            &coefficients.c,
                            column,
                            gam,
                            mode.index,
                        )?;
                    }
                    Ok(())
                },
            )
    }
}

impl PressureSolver for SecondOrderSolver {
    fn solve(&mut self, fields: &mut ProjectionFields<'_>, dt: f64) -> PressureResult<()> {
        validate_dt(dt)?;
        fields.validate(&self.spectral.grid)?;
        let _scope = ProfilerScope::new("pressure solve");
        debug!("Pressure solve (2nd order), dt = {dt}");

        let comm = Arc::clone(&self.spectral.comm);
        comm.boundary_cyclic(fields.ut, CyclicEdge::Both)?;
        comm.boundary_cyclic(fields.vt, CyclicEdge::Both)?;
        comm.boundary_cyclic(fields.wt, CyclicEdge::Both)?;

        {
            let _scope = ProfilerScope::new("pressure input");
            let grid = &self.spectral.grid;
            match grid.dimensionality() {
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
            match grid.dimensionality() {
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
        if grid.order != SpatialOrder::Second {
            return Err(PressureError::invalid_config(
                "order",
                grid.order,
                "second-order solver needs a grid built for 2nd order",
            ));
        }
        self.coefficients = TridiagonalCoefficients::new(&grid);
        self.spectral.rebuild(grid)?;
        info!(
            "Pressure solver re-initialized: {}x{}x{} grid, 2nd order",
            self.spectral.grid.itot, self.spectral.grid.jtot, self.spectral.grid.ktot
        );
        Ok(())
    }

    fn spatial_order(&self) -> SpatialOrder {
        SpatialOrder::Second
    }

    fn grid(&self) -> &Grid {
        &self.spectral.grid
    }
}

/// Divergence of the provisional velocity `u + dt ut`, divided by `dt`, into `p`
fn input<const DIM3: bool>(grid: &Grid, fields: &mut ProjectionFields<'_>, dt: f64) {
    let s = grid.strides();
    let (ii, jj, kk) = (s.ii, s.jj, s.kk);
    let dxi = 1.0 / grid.dx;
    let dyi = 1.0 / grid.dy;
    let dti = 1.0 / dt;

    let (u, v, w) = (fields.u.as_slice(), fields.v.as_slice(), fields.w.as_slice());
    let (ut, vt, wt) = (fields.ut.as_slice(), fields.vt.as_slice(), fields.wt.as_slice());

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
                    let mut div = ((ut[ijk + ii] + u[ijk + ii] * dti) - (ut[ijk] + u[ijk] * dti))
                        * dxi
                        + ((wt[ijk + kk] + w[ijk + kk] * dti) - (wt[ijk] + w[ijk] * dti))
                            * grid.dzi[k];
                    if DIM3 {
                        div += ((vt[ijk + jj] + v[ijk + jj] * dti) - (vt[ijk] + v[ijk] * dti))
                            * dyi;
                    }
                    plane[ij] = div;
                }
            }
        });
}

/// Subtract the pressure gradient from the tendencies
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
                    ut[ij] -= (p[ijk] - p[ijk - ii]) * dxi;
                    if DIM3 {
                        vt[ij] -= (p[ijk] - p[ijk - jj]) * dyi;
                    }
                    wt[ij] -= (p[ijk] - p[ijk - kk]) * grid.dzhi[k];
                }
            }
        });
}
