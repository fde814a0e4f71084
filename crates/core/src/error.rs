//! Error type shared by every stage of the projection solver
//!
//! Nothing in this crate recovers from an error locally. Configuration problems are
//! reported when the grid or solver is built, numerical and communication failures
//! when a solve runs, and the caller is expected to stop the run.

/// Errors raised while building or running the pressure solver
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PressureError {
    /// A grid or solver parameter is out of range or inconsistent with the stencil
    #[error("invalid configuration: {parameter} = {value} ({reason})")]
    InvalidConfig {
        /// Name of the offending parameter (e.g. `"ktot"`, `"tile_width"`)
        parameter: &'static str,
        /// Offending value, formatted for the diagnostic
        value: String,
        /// What the value violates
        reason: String,
    },

    /// A (near-)zero pivot was met during banded elimination
    #[error(
        "singular pivot {pivot:e} in {stage} at row {row} for wavenumber pair ({i}, {j})"
    )]
    SingularPivot {
        /// Solver stage that hit the pivot
        stage: &'static str,
        /// Row of the (augmented) vertical system
        row: usize,
        /// Value of the pivot
        pivot: f64,
        /// Global x wavenumber index
        i: usize,
        /// Global y wavenumber index
        j: usize,
    },

    /// A collective operation (transpose, reduction, boundary exchange) failed
    #[error("collective operation `{operation}` failed: {reason}")]
    Communication {
        /// Name of the collective
        operation: &'static str,
        /// Reason reported by the communicator
        reason: String,
    },

    /// A borrowed field does not match the grid it is used with
    #[error("field `{field}` has shape {actual:?}, grid expects {expected:?}")]
    FieldShape {
        /// Name of the field (`"u"`, `"wt"`, `"p"`, ...)
        field: &'static str,
        /// Expected `(icells, jcells, kcells)`
        expected: (usize, usize, usize),
        /// Actual `(icells, jcells, kcells)`
        actual: (usize, usize, usize),
    },
}

impl PressureError {
    /// Build an [`PressureError::InvalidConfig`] from any displayable value
    pub fn invalid_config(
        parameter: &'static str,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            parameter,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type PressureResult<T> = Result<T, PressureError>;
