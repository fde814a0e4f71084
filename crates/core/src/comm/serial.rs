//! Single-rank collective service

use super::{Communicator, Decomposition, PencilBuffer, PencilLayout};
use crate::error::{PressureError, PressureResult};
use crate::grid::{cyclic_local, CyclicEdge, Field3d, Grid};

/// Communicator for a run on one rank
///
/// Transposes are local reorders, reductions return their argument and cyclic
/// refreshes copy the periodic images inside the local field.
#[derive(Debug, Clone)]
pub struct SerialCommunicator {
    decomposition: Decomposition,
}

impl SerialCommunicator {
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        Self {
            decomposition: Decomposition::single(grid.itot, grid.jtot, grid.ktot),
        }
    }
}

impl Communicator for SerialCommunicator {
    fn decomposition(&self) -> &Decomposition {
        &self.decomposition
    }

    fn transpose(&self, buffer: &mut PencilBuffer, target: PencilLayout) -> PressureResult<()> {
        let current = buffer.layout();
        let expected = self.decomposition.extents(current);
        if buffer.extents() != expected {
            return Err(PressureError::Communication {
                operation: "transpose",
                reason: format!(
                    "buffer extents {:?} do not match {:?} pencil extents {:?}",
                    buffer.extents(),
                    current,
                    expected
                ),
            });
        }
        buffer.reorder(target);
        Ok(())
    }

    fn boundary_cyclic(&self, field: &mut Field3d, edge: CyclicEdge) -> PressureResult<()> {
        cyclic_local(field, edge);
        Ok(())
    }

    fn global_sum(&self, value: f64) -> PressureResult<f64> {
        Ok(value)
    }

    fn global_max(&self, value: f64) -> PressureResult<f64> {
        Ok(value)
    }
}
