//! Horizontal spectral transform adapter
//!
//! Moves the pressure work array between physical space (block layout) and
//! wavenumber space (z-pencils) through half-complex transforms along x and y.
//! Each direction is preceded by a transpose that makes the transformed axis
//! contiguous, and the lines of one layout are transformed in parallel.

mod halfcomplex;

pub use halfcomplex::{HalfComplexPlan, HalfComplexScratch};

use crate::comm::{Communicator, PencilBuffer, PencilLayout};
use crate::error::PressureResult;
use rayon::prelude::*;
use rustfft::FftPlanner;

/// Half-complex plans for both horizontal directions
#[derive(Debug, Clone)]
pub struct HorizontalTransform {
    x: HalfComplexPlan,
    y: HalfComplexPlan,
}

impl HorizontalTransform {
    /// Plan transforms for global extents `itot × jtot`
    #[must_use]
    pub fn new(itot: usize, jtot: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            x: HalfComplexPlan::new(itot, &mut planner),
            y: HalfComplexPlan::new(jtot, &mut planner),
        }
    }

    /// Physical block layout to z-pencils of half-complex coefficients
    ///
    /// # Errors
    ///
    /// Returns the communicator's error when a transpose fails.
    pub fn forward(&self, buffer: &mut PencilBuffer, comm: &dyn Communicator) -> PressureResult<()> {
        comm.transpose(buffer, PencilLayout::X)?;
        transform_lines(buffer, &self.x, Direction::Forward);
        comm.transpose(buffer, PencilLayout::Y)?;
        transform_lines(buffer, &self.y, Direction::Forward);
        comm.transpose(buffer, PencilLayout::Z)
    }

    /// Z-pencils of half-complex coefficients back to the physical block layout
    ///
    /// The `1/itot` and `1/jtot` normalizations are applied on the way.
    ///
    /// # Errors
    ///
    /// Returns the communicator's error when a transpose fails.
    pub fn backward(&self, buffer: &mut PencilBuffer, comm: &dyn Communicator) -> PressureResult<()> {
        comm.transpose(buffer, PencilLayout::Y)?;
        transform_lines(buffer, &self.y, Direction::Backward);
        comm.transpose(buffer, PencilLayout::X)?;
        transform_lines(buffer, &self.x, Direction::Backward);
        comm.transpose(buffer, PencilLayout::Block)
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

fn transform_lines(buffer: &mut PencilBuffer, plan: &HalfComplexPlan, direction: Direction) {
    let n = buffer.line_len();
    debug_assert_eq!(n, plan.len());
    if n <= 1 {
        return;
    }
    buffer
        .as_mut_slice()
        .par_chunks_mut(n)
        .for_each_init(
            || plan.scratch(),
            |work, line| match direction {
                Direction::Forward => plan.forward(line, work),
                Direction::Backward => plan.backward(line, work),
            },
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::SerialCommunicator;
    use crate::grid::{Grid, GridConfig, SpatialOrder};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_single_mode_round_trip() {
        let grid = Grid::new(&GridConfig::default(), SpatialOrder::Second).unwrap();
        let comm = SerialCommunicator::new(&grid);
        let transform = HorizontalTransform::new(grid.itot, grid.jtot);

        let ext = (grid.itot, grid.jtot, grid.ktot);
        let mut buf = PencilBuffer::new(PencilLayout::Block, ext);
        for k in 0..ext.2 {
            for j in 0..ext.1 {
                for i in 0..ext.0 {
                    let v = (2.0 * PI * i as f64 / 8.0).sin() * (1.0 + k as f64)
                        + (2.0 * PI * 3.0 * j as f64 / 8.0).cos();
                    buf.set(i, j, k, v);
                }
            }
        }
        let original = buf.clone();

        transform.forward(&mut buf, &comm).unwrap();
        assert_eq!(buf.layout(), PencilLayout::Z);
        // sin along x with j-mean 1: imaginary slot of kx = 1, ky = 0
        assert_relative_eq!(buf.get(7, 0, 0), -4.0 * 8.0, epsilon = 1e-10);
        assert_relative_eq!(buf.get(1, 1, 0), 0.0, epsilon = 1e-10);

        transform.backward(&mut buf, &comm).unwrap();
        assert_eq!(buf.layout(), PencilLayout::Block);
        for (a, b) in buf.as_slice().iter().zip(original.as_slice()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_two_dimensional_extent_is_supported() {
        let config = GridConfig {
            jtot: 1,
            ..GridConfig::default()
        };
        let grid = Grid::new(&config, SpatialOrder::Fourth).unwrap();
        let comm = SerialCommunicator::new(&grid);
        let transform = HorizontalTransform::new(grid.itot, grid.jtot);
        let mut buf = PencilBuffer::new(PencilLayout::Block, (grid.itot, 1, grid.ktot));
        for (n, v) in buf.as_mut_slice().iter_mut().enumerate() {
            *v = (n % 5) as f64;
        }
        let original = buf.clone();
        transform.forward(&mut buf, &comm).unwrap();
        transform.backward(&mut buf, &comm).unwrap();
        for (a, b) in buf.as_slice().iter().zip(original.as_slice()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }
}
