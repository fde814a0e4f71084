//! State shared by both projection variants
//!
//! Owns the grid, the wavenumber tables, the transform plans and the spectral
//! work array, and moves the right-hand side between the pressure field and
//! wavenumber space.

use super::wavenumber::modified_wavenumbers;
use super::PressureConfig;
use crate::comm::{Communicator, Decomposition, PencilBuffer, PencilLayout};
use crate::error::{PressureError, PressureResult};
use crate::grid::{Field3d, Grid};
use crate::profiler::ProfilerScope;
use crate::transform::HorizontalTransform;
use std::sync::Arc;

/// Wavenumber lookup for the columns of a z-pencil buffer
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnModes<'a> {
    decomposition: Decomposition,
    ni: usize,
    bmati: &'a [f64],
    bmatj: &'a [f64],
}

/// Wavenumber data of one z-pencil column
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ColumnMode {
    /// Global wavenumber pair
    pub(crate) index: (usize, usize),
    /// Sum of the horizontal modified wavenumbers
    pub(crate) eigenvalue: f64,
    /// Column holds the horizontal mean of the whole domain
    pub(crate) zero: bool,
}

impl ColumnModes<'_> {
    #[inline]
    pub(crate) fn mode(&self, column: usize) -> ColumnMode {
        let (i, j) = (column % self.ni, column / self.ni);
        let (ig, jg) = self.decomposition.spectral_index(i, j);
        ColumnMode {
            index: (ig, jg),
            eigenvalue: self.bmati[ig] + self.bmatj[jg],
            zero: self.decomposition.is_zero_mode(i, j),
        }
    }
}

pub(crate) struct SpectralWorkspace {
    pub(crate) grid: Grid,
    pub(crate) config: PressureConfig,
    pub(crate) comm: Arc<dyn Communicator>,
    transform: HorizontalTransform,
    bmati: Vec<f64>,
    bmatj: Vec<f64>,
    work: PencilBuffer,
}

impl SpectralWorkspace {
    pub(crate) fn new(
        grid: Grid,
        config: PressureConfig,
        comm: Arc<dyn Communicator>,
    ) -> PressureResult<Self> {
        config.validate()?;

        let decomposition = *comm.decomposition();
        if decomposition.global_extents() != (grid.itot, grid.jtot, grid.ktot)
            || decomposition.block_extents() != (grid.imax, grid.jmax, grid.ktot)
        {
            return Err(PressureError::invalid_config(
                "communicator",
                format!("{:?}", decomposition.block_extents()),
                format!(
                    "rank block does not match the grid block ({}, {}, {})",
                    grid.imax, grid.jmax, grid.ktot
                ),
            ));
        }

        let bmati = modified_wavenumbers(grid.order, grid.itot, grid.dx);
        let bmatj = modified_wavenumbers(grid.order, grid.jtot, grid.dy);
        let transform = HorizontalTransform::new(grid.itot, grid.jtot);
        let work = PencilBuffer::new(PencilLayout::Block, decomposition.block_extents());

        Ok(Self {
            grid,
            config,
            comm,
            transform,
            bmati,
            bmatj,
            work,
        })
    }

    /// Copy the interior of the right-hand side held in `p` into the work array
    pub(crate) fn gather(&mut self, p: &Field3d) {
        debug_assert_eq!(self.work.layout(), PencilLayout::Block);
        let g = &self.grid;
        for k in 0..g.ktot {
            for j in 0..g.jmax {
                for i in 0..g.imax {
                    self.work
                        .set(i, j, k, p.at(i + g.istart, j + g.jstart, k + g.kstart));
                }
            }
        }
    }

    /// Overwrite the interior of `p` with the work array
    pub(crate) fn scatter(&self, p: &mut Field3d) {
        debug_assert_eq!(self.work.layout(), PencilLayout::Block);
        let g = &self.grid;
        for k in 0..g.ktot {
            for j in 0..g.jmax {
                for i in 0..g.imax {
                    *p.at_mut(i + g.istart, j + g.jstart, k + g.kstart) = self.work.get(i, j, k);
                }
            }
        }
    }

    pub(crate) fn forward(&mut self) -> PressureResult<()> {
        let _scope = ProfilerScope::new("pressure forward transform");
        self.transform.forward(&mut self.work, self.comm.as_ref())
    }

    pub(crate) fn backward(&mut self) -> PressureResult<()> {
        let _scope = ProfilerScope::new("pressure backward transform");
        self.transform.backward(&mut self.work, self.comm.as_ref())
    }

    /// Z-pencil work array and the wavenumber lookup of its columns
    pub(crate) fn columns(&mut self) -> (&mut [f64], ColumnModes<'_>) {
        debug_assert_eq!(self.work.layout(), PencilLayout::Z);
        let (ni, _, _) = self.work.extents();
        let modes = ColumnModes {
            decomposition: *self.comm.decomposition(),
            ni,
            bmati: &self.bmati,
            bmatj: &self.bmatj,
        };
        (self.work.as_mut_slice(), modes)
    }

    /// Recompute everything that depends on the geometry
    pub(crate) fn rebuild(&mut self, grid: Grid) -> PressureResult<()> {
        *self = Self::new(grid, self.config.clone(), Arc::clone(&self.comm))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::SerialCommunicator;
    use crate::grid::{GridConfig, SpatialOrder};

    #[test]
    fn test_only_first_column_is_the_zero_mode() {
        let grid = Grid::new(&GridConfig::default(), SpatialOrder::Second).unwrap();
        let comm = Arc::new(SerialCommunicator::new(&grid));
        let mut spectral = SpectralWorkspace::new(grid, PressureConfig::default(), comm).unwrap();
        spectral.forward().unwrap();
        let (columns, modes) = spectral.columns();
        let ncols = columns.len() / 8;

        let first = modes.mode(0);
        assert_eq!(first.index, (0, 0));
        assert_eq!(first.eigenvalue, 0.0);
        assert!(first.zero);
        assert!((1..ncols).all(|c| !modes.mode(c).zero));
        assert_eq!(modes.mode(9).index, (1, 1));
    }
}
