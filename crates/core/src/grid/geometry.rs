//! Grid geometry and vertical metrics
//!
//! The horizontal directions are periodic and uniformly spaced. The vertical
//! direction is bounded by two walls and may be stretched. Cell centres `z` and
//! faces `zh` are mirrored across the walls into the ghost levels, and the metric
//! arrays are indexed with the same `k` as the 3-D fields (ghost levels included).

use super::field::Strides;
use crate::comm::Decomposition;
use crate::error::{PressureError, PressureResult};
use serde::{Deserialize, Serialize};

/// Finite-difference order of the projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpatialOrder {
    /// Second-order staggered differences, tridiagonal vertical system
    #[serde(rename = "2")]
    Second,
    /// Fourth-order staggered differences, heptadiagonal vertical system
    #[serde(rename = "4")]
    Fourth,
}

impl SpatialOrder {
    /// Ghost layers needed on each side by the stencils of this order
    #[must_use]
    pub const fn ghost_cells(&self) -> usize {
        match self {
            Self::Second => 1,
            Self::Fourth => 2,
        }
    }

    /// Smallest vertical extent the boundary rows of this order can be built on
    #[must_use]
    pub const fn min_vertical_cells(&self) -> usize {
        match self {
            Self::Second => 2,
            Self::Fourth => 4,
        }
    }
}

impl std::fmt::Display for SpatialOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Second => write!(f, "2nd order"),
            Self::Fourth => write!(f, "4th order"),
        }
    }
}

/// Whether the second horizontal direction takes part in the projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimensionality {
    /// `jtot == 1`: the y contributions are skipped
    TwoD,
    /// Full 3-D configuration
    ThreeD,
}

/// User-facing grid description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Global number of cells in x
    pub itot: usize,
    /// Global number of cells in y
    pub jtot: usize,
    /// Number of cells in z
    pub ktot: usize,

    /// Domain length in x (m)
    pub xsize: f64,
    /// Domain length in y (m)
    pub ysize: f64,
    /// Domain height (m)
    pub zsize: f64,

    /// Optional cell-centre heights; uniform spacing when `None`
    #[serde(default)]
    pub z: Option<Vec<f64>>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            itot: 8,
            jtot: 8,
            ktot: 8,
            xsize: 1.0,
            ysize: 1.0,
            zsize: 1.0,
            z: None,
        }
    }
}

/// Finalized grid geometry for one spatial order
///
/// Built once from a [`GridConfig`]; everything the projection needs from the grid
/// (extents, ghost widths, spacings and vertical metrics) is read from here.
/// `itot`/`jtot` are global extents, `imax`/`jmax` the extents of the block owned
/// by this rank. Fields are shaped by the local block.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub order: SpatialOrder,

    pub itot: usize,
    pub jtot: usize,
    pub ktot: usize,
    pub imax: usize,
    pub jmax: usize,

    pub igc: usize,
    pub jgc: usize,
    pub kgc: usize,

    pub icells: usize,
    pub jcells: usize,
    pub kcells: usize,

    pub istart: usize,
    pub iend: usize,
    pub jstart: usize,
    pub jend: usize,
    pub kstart: usize,
    pub kend: usize,

    pub xsize: f64,
    pub ysize: f64,
    pub zsize: f64,
    pub dx: f64,
    pub dy: f64,

    /// Cell-centre heights, ghost levels mirrored
    pub z: Vec<f64>,
    /// Face heights (face `k` is the bottom face of cell `k`)
    pub zh: Vec<f64>,
    /// Cell thickness `zh[k+1] - zh[k]`
    pub dz: Vec<f64>,
    /// Distance between centres `z[k] - z[k-1]`
    pub dzh: Vec<f64>,
    pub dzi: Vec<f64>,
    pub dzhi: Vec<f64>,
    /// Inverse of the fourth-order face stencil around centre `k` (empty for 2nd order)
    pub dzi4: Vec<f64>,
    /// Inverse of the fourth-order centre stencil around face `k` (empty for 2nd order)
    pub dzhi4: Vec<f64>,
}

impl Grid {
    /// Build the grid geometry of a single-rank run
    ///
    /// # Errors
    ///
    /// Returns [`PressureError::InvalidConfig`] naming the parameter when an extent,
    /// a domain size or the explicit height list is not usable with `order`.
    pub fn new(config: &GridConfig, order: SpatialOrder) -> PressureResult<Self> {
        let decomposition = Decomposition::single(config.itot, config.jtot, config.ktot);
        Self::decomposed(config, order, &decomposition)
    }

    /// Build the grid geometry of the block owned by one rank of `decomposition`
    ///
    /// # Errors
    ///
    /// Returns [`PressureError::InvalidConfig`] when the configuration is invalid
    /// or the decomposition was built for different global extents.
    pub fn decomposed(
        config: &GridConfig,
        order: SpatialOrder,
        decomposition: &Decomposition,
    ) -> PressureResult<Self> {
        validate_extent("itot", config.itot, 1)?;
        validate_extent("jtot", config.jtot, 1)?;
        validate_extent("ktot", config.ktot, order.min_vertical_cells())?;
        if decomposition.global_extents() != (config.itot, config.jtot, config.ktot) {
            return Err(PressureError::invalid_config(
                "decomposition",
                format!("{:?}", decomposition.global_extents()),
                format!(
                    "built for different extents than the grid ({}, {}, {})",
                    config.itot, config.jtot, config.ktot
                ),
            ));
        }
        validate_size("xsize", config.xsize)?;
        validate_size("ysize", config.ysize)?;
        validate_size("zsize", config.zsize)?;

        let ktot = config.ktot;
        let zsize = config.zsize;

        let centres = match &config.z {
            Some(z) => {
                validate_heights(z, ktot, zsize)?;
                z.clone()
            }
            None => {
                let dz = zsize / ktot as f64;
                (0..ktot).map(|k| (k as f64 + 0.5) * dz).collect()
            }
        };

        let mut faces = vec![0.0; ktot + 1];
        for k in 1..ktot {
            faces[k] = 0.5 * (centres[k - 1] + centres[k]);
        }
        faces[ktot] = zsize;

        let gc = order.ghost_cells();
        let kcells = ktot + 2 * gc;
        let column = VerticalColumn {
            centres: &centres,
            faces: &faces,
            zsize,
        };

        // Field level kc corresponds to the interior level kc - gc.
        let local = |kc: usize| kc as isize - gc as isize;

        let z: Vec<f64> = (0..kcells).map(|kc| column.centre(local(kc))).collect();
        let zh: Vec<f64> = (0..kcells).map(|kc| column.face(local(kc))).collect();
        let dz: Vec<f64> = (0..kcells)
            .map(|kc| column.face(local(kc) + 1) - column.face(local(kc)))
            .collect();
        let dzh: Vec<f64> = (0..kcells)
            .map(|kc| column.centre(local(kc)) - column.centre(local(kc) - 1))
            .collect();
        let dzi = dz.iter().map(|v| 1.0 / v).collect();
        let dzhi = dzh.iter().map(|v| 1.0 / v).collect();

        let (dzi4, dzhi4) = match order {
            SpatialOrder::Second => (Vec::new(), Vec::new()),
            SpatialOrder::Fourth => {
                let dzi4 = (0..kcells)
                    .map(|kc| {
                        let k = local(kc);
                        1.0 / (column.face(k - 1) - 27.0 * column.face(k)
                            + 27.0 * column.face(k + 1)
                            - column.face(k + 2))
                    })
                    .collect();
                let dzhi4 = (0..kcells)
                    .map(|kc| {
                        let k = local(kc);
                        1.0 / (column.centre(k - 2) - 27.0 * column.centre(k - 1)
                            + 27.0 * column.centre(k)
                            - column.centre(k + 1))
                    })
                    .collect();
                (dzi4, dzhi4)
            }
        };

        let dx = config.xsize / config.itot as f64;
        let dy = config.ysize / config.jtot as f64;
        let (imax, jmax, _) = decomposition.block_extents();

        Ok(Self {
            order,
            itot: config.itot,
            jtot: config.jtot,
            ktot,
            imax,
            jmax,
            igc: gc,
            jgc: gc,
            kgc: gc,
            icells: imax + 2 * gc,
            jcells: jmax + 2 * gc,
            kcells,
            istart: gc,
            iend: gc + imax,
            jstart: gc,
            jend: gc + jmax,
            kstart: gc,
            kend: gc + ktot,
            xsize: config.xsize,
            ysize: config.ysize,
            zsize,
            dx,
            dy,
            z,
            zh,
            dz,
            dzh,
            dzi,
            dzhi,
            dzi4,
            dzhi4,
        })
    }

    /// Shape `(icells, jcells, kcells)` every 3-D field on this grid must have
    #[must_use]
    pub fn cells(&self) -> (usize, usize, usize) {
        (self.icells, self.jcells, self.kcells)
    }

    /// Linear offsets of a field on this grid
    #[must_use]
    pub fn strides(&self) -> Strides {
        Strides::new(self.icells, self.jcells)
    }

    /// 2-D runs (`jtot == 1`) skip the y contributions
    #[must_use]
    pub fn dimensionality(&self) -> Dimensionality {
        if self.jtot == 1 {
            Dimensionality::TwoD
        } else {
            Dimensionality::ThreeD
        }
    }

    /// Number of interior cells owned by this rank
    #[must_use]
    pub fn interior_len(&self) -> usize {
        self.imax * self.jmax * self.ktot
    }
}

/// Interior column with mirror extension across both walls
struct VerticalColumn<'a> {
    centres: &'a [f64],
    faces: &'a [f64],
    zsize: f64,
}

impl VerticalColumn<'_> {
    fn centre(&self, k: isize) -> f64 {
        let n = self.centres.len() as isize;
        if k < 0 {
            -self.centres[(-k - 1) as usize]
        } else if k >= n {
            2.0 * self.zsize - self.centres[(2 * n - 1 - k) as usize]
        } else {
            self.centres[k as usize]
        }
    }

    fn face(&self, k: isize) -> f64 {
        let n = self.faces.len() as isize - 1;
        if k < 0 {
            -self.faces[(-k) as usize]
        } else if k > n {
            2.0 * self.zsize - self.faces[(2 * n - k) as usize]
        } else {
            self.faces[k as usize]
        }
    }
}

fn validate_extent(parameter: &'static str, value: usize, min: usize) -> PressureResult<()> {
    if value < min {
        return Err(PressureError::invalid_config(
            parameter,
            value,
            format!("must be at least {min}"),
        ));
    }
    Ok(())
}

fn validate_size(parameter: &'static str, value: f64) -> PressureResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(PressureError::invalid_config(
            parameter,
            value,
            "must be positive and finite",
        ));
    }
    Ok(())
}

fn validate_heights(z: &[f64], ktot: usize, zsize: f64) -> PressureResult<()> {
    if z.len() != ktot {
        return Err(PressureError::invalid_config(
            "z",
            format!("{} levels", z.len()),
            format!("expected ktot = {ktot} levels"),
        ));
    }
    if z[0] <= 0.0 || z[ktot - 1] >= zsize {
        return Err(PressureError::invalid_config(
            "z",
            format!("[{}, {}]", z[0], z[ktot - 1]),
            format!("heights must lie strictly inside (0, {zsize})"),
        ));
    }
    if let Some(k) = z.windows(2).position(|w| w[1] <= w[0]) {
        return Err(PressureError::invalid_config(
            "z",
            format!("z[{}] = {}", k + 1, z[k + 1]),
            "heights must be strictly increasing",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_second_order_metrics() {
        let grid = Grid::new(&GridConfig::default(), SpatialOrder::Second).unwrap();
        assert_eq!(grid.cells(), (10, 10, 10));
        assert_eq!(grid.kstart, 1);
        assert_eq!(grid.kend, 9);
        for k in 0..grid.kcells {
            assert_relative_eq!(grid.dz[k], 0.125, epsilon = 1e-14);
            assert_relative_eq!(grid.dzh[k], 0.125, epsilon = 1e-14);
        }
        assert_relative_eq!(grid.zh[grid.kstart], 0.0);
        assert_relative_eq!(grid.zh[grid.kend], 1.0, epsilon = 1e-14);
        assert!(grid.dzi4.is_empty());
    }

    #[test]
    fn test_fourth_order_metrics_are_24dz_on_uniform_grid() {
        let grid = Grid::new(&GridConfig::default(), SpatialOrder::Fourth).unwrap();
        assert_eq!(grid.kgc, 2);
        for k in 0..grid.kcells {
            assert_relative_eq!(grid.dzi4[k], 1.0 / (24.0 * 0.125), epsilon = 1e-12);
            assert_relative_eq!(grid.dzhi4[k], 1.0 / (24.0 * 0.125), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_ghost_levels_are_mirrored() {
        let config = GridConfig {
            ktot: 4,
            zsize: 10.0,
            z: Some(vec![1.0, 3.0, 6.0, 9.0]),
            ..GridConfig::default()
        };
        let grid = Grid::new(&config, SpatialOrder::Fourth).unwrap();
        assert_relative_eq!(grid.z[grid.kstart - 1], -1.0);
        assert_relative_eq!(grid.z[grid.kstart - 2], -3.0);
        assert_relative_eq!(grid.z[grid.kend], 11.0);
        assert_relative_eq!(grid.zh[grid.kend + 1], 20.0 - 7.5);
        assert_relative_eq!(grid.dz[grid.kstart], 2.0);
        assert_relative_eq!(grid.dzh[grid.kstart], 2.0);
    }

    #[test]
    fn test_rejects_short_vertical_extent_for_fourth_order() {
        let config = GridConfig {
            ktot: 3,
            ..GridConfig::default()
        };
        let err = Grid::new(&config, SpatialOrder::Fourth).unwrap_err();
        assert!(matches!(
            err,
            PressureError::InvalidConfig {
                parameter: "ktot",
                ..
            }
        ));
        assert!(Grid::new(&config, SpatialOrder::Second).is_ok());
    }

    #[test]
    fn test_rejects_non_monotonic_heights() {
        let config = GridConfig {
            ktot: 4,
            z: Some(vec![0.1, 0.4, 0.3, 0.9]),
            ..GridConfig::default()
        };
        let err = Grid::new(&config, SpatialOrder::Second).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn test_two_dimensional_detection() {
        let config = GridConfig {
            jtot: 1,
            ..GridConfig::default()
        };
        let grid = Grid::new(&config, SpatialOrder::Second).unwrap();
        assert_eq!(grid.dimensionality(), Dimensionality::TwoD);
        assert_eq!(
            Grid::new(&GridConfig::default(), SpatialOrder::Second)
                .unwrap()
                .dimensionality(),
            Dimensionality::ThreeD
        );
    }
}
