//! Domain decomposition and the collective operations the solver depends on
//!
//! The projection needs exactly four collectives: a transpose between pencil
//! layouts around each horizontal transform direction, a periodic ghost refresh,
//! and global sum/max reductions. They are reached through the [`Communicator`]
//! trait so that a distributed backend can be swapped in for [`SerialCommunicator`].

mod decomposition;
mod pencil;
mod serial;

pub use decomposition::Decomposition;
pub use pencil::{PencilBuffer, PencilLayout};
pub use serial::SerialCommunicator;

use crate::error::PressureResult;
use crate::grid::{CyclicEdge, Field3d};

/// Collective service shared by every stage of a solve
///
/// Every rank must make the same sequence of calls. A failure is fatal for the
/// whole run and is returned as [`crate::PressureError::Communication`].
pub trait Communicator: Send + Sync {
    /// Layout of this rank in the process grid
    fn decomposition(&self) -> &Decomposition;

    /// Move `buffer` into the `target` pencil layout
    ///
    /// # Errors
    ///
    /// Fails when the buffer extents do not match the extents this rank holds
    /// in the buffer's current layout, or when the exchange between ranks fails.
    fn transpose(&self, buffer: &mut PencilBuffer, target: PencilLayout) -> PressureResult<()>;

    /// Refresh the periodic ghost cells of a field along `edge`
    ///
    /// # Errors
    ///
    /// Fails when the halo exchange fails.
    fn boundary_cyclic(&self, field: &mut Field3d, edge: CyclicEdge) -> PressureResult<()>;

    /// Sum of `value` over all ranks
    ///
    /// The projection itself only reduces with [`Communicator::global_max`].
    /// Drivers use this for domain means, such as the uniform-flow forcing
    /// applied between solves.
    ///
    /// # Errors
    ///
    /// Fails when the reduction fails.
    fn global_sum(&self, value: f64) -> PressureResult<f64>;

    /// Maximum of `value` over all ranks
    ///
    /// # Errors
    ///
    /// Fails when the reduction fails.
    fn global_max(&self, value: f64) -> PressureResult<f64>;
}
