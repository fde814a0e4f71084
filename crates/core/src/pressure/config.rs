//! Tunable solver settings
//!
//! Nothing here changes the numerical result of a solve, only how the vertical
//! systems are batched and what gets reported.

use crate::error::{PressureError, PressureResult};
use serde::{Deserialize, Serialize};

/// Settings for [`super::create_pressure_solver`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureConfig {
    /// Number of spectral columns solved together by one worker
    ///
    /// Columns are independent, so any width gives the same answer. Larger
    /// tiles trade scratch memory for fewer work items.
    pub tile_width: usize,

    /// Log the maximum divergence of the velocities after every solve
    pub report_divergence: bool,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            tile_width: 8,
            report_divergence: false,
        }
    }
}

impl PressureConfig {
    /// Check the settings before any work array is sized from them
    ///
    /// # Errors
    ///
    /// Returns [`PressureError::InvalidConfig`] when `tile_width` is zero.
    pub fn validate(&self) -> PressureResult<()> {
        if self.tile_width == 0 {
            return Err(PressureError::invalid_config(
                "tile_width",
                self.tile_width,
                "at least one column per tile is required",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PressureConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_tile_width_is_rejected() {
        let config = PressureConfig {
            tile_width: 0,
            ..PressureConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PressureError::InvalidConfig {
                parameter: "tile_width",
                ..
            })
        ));
    }
}
