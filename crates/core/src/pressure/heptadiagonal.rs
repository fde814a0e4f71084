//! Heptadiagonal vertical system of the fourth-order projection
//!
//! The fourth-order vertical Laplacian couples each level to three neighbours on
//! either side. Its seven bands are built once from the grid metrics. For every
//! wavenumber pair the bands are copied into an augmented system of `ktot + 4`
//! rows: two rows below and two above the interior express the boundary
//! conditions on the ghost levels. The system is solved by a banded LU
//! factorization without pivoting followed by forward and backward substitution.
//!
//! Columns are processed in tiles. The band arrays of a tile are interleaved as
//! `row * width + column` so the inner loop runs over independent columns.

use super::tridiagonal::PIVOT_TOLERANCE;
use crate::error::{PressureError, PressureResult};
use crate::grid::Grid;

/// The seven bands of the interior fourth-order vertical operator
///
/// `m1..m7` couple level `k` to levels `k-3..=k+3`. The first and last rows
/// include the mirrored vertical velocity below the bottom wall and above the top
/// wall, which is why their coefficients differ from the interior ones.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalBands {
    pub m1: Vec<f64>,
    pub m2: Vec<f64>,
    pub m3: Vec<f64>,
    pub m4: Vec<f64>,
    pub m5: Vec<f64>,
    pub m6: Vec<f64>,
    pub m7: Vec<f64>,
}

impl VerticalBands {
    /// Build the bands from the fourth-order metrics of `grid`
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        let n = grid.ktot;
        let mut bands = Self {
            m1: vec![0.0; n],
            m2: vec![0.0; n],
            m3: vec![0.0; n],
            m4: vec![0.0; n],
            m5: vec![0.0; n],
            m6: vec![0.0; n],
            m7: vec![0.0; n],
        };
        let dzi4 = &grid.dzi4;
        let h = &grid.dzhi4;

        // Bottom row, w mirrored below the wall.
        let kc = grid.kstart;
        let s = dzi4[kc];
        bands.m1[0] = 0.0;
        bands.m2[0] = (-27.0 * h[kc]) * s;
        bands.m3[0] = (-h[kc + 1] + 729.0 * h[kc] + 27.0 * h[kc + 1]) * s;
        bands.m4[0] = (27.0 * h[kc + 1] - 729.0 * h[kc] - 729.0 * h[kc + 1] - h[kc + 2]) * s;
        bands.m5[0] = (-27.0 * h[kc + 1] + 27.0 * h[kc] + 729.0 * h[kc + 1] + 27.0 * h[kc + 2]) * s;
        bands.m6[0] = (h[kc + 1] - 27.0 * h[kc + 1] - 27.0 * h[kc + 2]) * s;
        bands.m7[0] = h[kc + 2] * s;

        for k in 1..n - 1 {
            let kc = grid.kstart + k;
            let s = dzi4[kc];
            bands.m1[k] = h[kc - 1] * s;
            bands.m2[k] = (-27.0 * h[kc - 1] - 27.0 * h[kc]) * s;
            bands.m3[k] = (27.0 * h[kc - 1] + 729.0 * h[kc] + 27.0 * h[kc + 1]) * s;
            bands.m4[k] = (-h[kc - 1] - 729.0 * h[kc] - 729.0 * h[kc + 1] - h[kc + 2]) * s;
            bands.m5[k] = (27.0 * h[kc] + 729.0 * h[kc + 1] + 27.0 * h[kc + 2]) * s;
            bands.m6[k] = (-27.0 * h[kc + 1] - 27.0 * h[kc + 2]) * s;
            bands.m7[k] = h[kc + 2] * s;
        }

        // Top row, w mirrored above the wall.
        let k = n - 1;
        let kc = grid.kstart + k;
        let s = dzi4[kc];
        bands.m1[k] = h[kc - 1] * s;
        bands.m2[k] = (-27.0 * h[kc - 1] - 27.0 * h[kc] + h[kc]) * s;
        bands.m3[k] = (27.0 * h[kc - 1] + 729.0 * h[kc] + 27.0 * h[kc + 1] - 27.0 * h[kc]) * s;
        bands.m4[k] = (-h[kc - 1] - 729.0 * h[kc] - 729.0 * h[kc + 1] + 27.0 * h[kc]) * s;
        bands.m5[k] = (27.0 * h[kc] + 729.0 * h[kc + 1] - h[kc]) * s;
        bands.m6[k] = (-27.0 * h[kc + 1]) * s;
        bands.m7[k] = 0.0;

        bands
    }

    /// Number of interior levels
    #[must_use]
    pub fn len(&self) -> usize {
        self.m4.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.m4.is_empty()
    }
}

/// Augmented systems for a tile of vertical columns
///
/// Row `r` of column `c` lives at `r * width + c`. Rows `0, 1` hold the bottom
/// ghost conditions, rows `2..ktot+2` the interior and rows `ktot+2, ktot+3` the
/// top ghost conditions.
#[derive(Debug, Clone)]
pub struct HeptadiagonalTile {
    ktot: usize,
    width: usize,
    m: [Vec<f64>; 7],
    rhs: Vec<f64>,
    modes: Vec<(usize, usize)>,
}

impl HeptadiagonalTile {
    /// Scratch for up to `width` columns of `ktot` interior levels
    #[must_use]
    pub fn new(ktot: usize, width: usize) -> Self {
        let len = (ktot + 4) * width;
        Self {
            ktot,
            width,
            m: std::array::from_fn(|_| vec![0.0; len]),
            rhs: vec![0.0; len],
            modes: vec![(0, 0); width],
        }
    }

    /// Rows of the augmented system
    #[must_use]
    pub fn rows(&self) -> usize {
        self.ktot + 4
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Assemble the augmented system of column `c`
    ///
    /// # Arguments
    ///
    /// * `c` - Column slot within the tile
    /// * `bands` - Interior operator
    /// * `eigenvalue` - Sum of the horizontal modified wavenumbers of the pair
    /// * `mode` - Global wavenumber pair of the column
    /// * `zero_mode` - Whether the column holds the horizontal mean, which pins
    ///   the top boundary rows instead of the zero-gradient condition
    /// * `rhs` - Interior right-hand side, `ktot` values
    pub fn load_column(
        &mut self,
        c: usize,
        bands: &VerticalBands,
        eigenvalue: f64,
        mode: (usize, usize),
        zero_mode: bool,
        rhs: &[f64],
    ) {
        let w = self.width;
        let n = self.ktot;
        self.modes[c] = mode;

        let mut set_row = |r: usize, row: [f64; 7], value: f64| {
            for (band, coefficient) in self.m.iter_mut().zip(row) {
                band[r * w + c] = coefficient;
            }
            self.rhs[r * w + c] = value;
        };

        // Zero gradient across the bottom wall: p[-2] = p[1], p[-1] = p[0].
        set_row(0, [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, -1.0], 0.0);
        set_row(1, [0.0, 0.0, 0.0, 1.0, -1.0, 0.0, 0.0], 0.0);

        for k in 0..n {
            set_row(
                k + 2,
                [
                    bands.m1[k],
                    bands.m2[k],
                    bands.m3[k],
                    bands.m4[k] + eigenvalue,
                    bands.m5[k],
                    bands.m6[k],
                    bands.m7[k],
                ],
                rhs[k],
            );
        }

        if zero_mode {
            // Fourth-order interpolation of the pressure at the top wall is zero.
            set_row(n + 2, [0.0, -1.0 / 3.0, 2.0, 1.0, 0.0, 0.0, 0.0], 0.0);
            set_row(n + 3, [-2.0, 9.0, 0.0, 1.0, 0.0, 0.0, 0.0], 0.0);
        } else {
            // Zero gradient across the top wall: p[n] = p[n-1], p[n+1] = p[n-2].
            set_row(n + 2, [0.0, 0.0, -1.0, 1.0, 0.0, 0.0, 0.0], 0.0);
            set_row(n + 3, [-1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0], 0.0);
        }
    }

    /// Copy the interior part of the solution of column `c` into `out`
    pub fn store_column(&self, c: usize, out: &mut [f64]) {
        let w = self.width;
        for (k, value) in out.iter_mut().enumerate().take(self.ktot) {
            *value = self.rhs[(k + 2) * w + c];
        }
    }

    /// Factor and solve the first `columns` loaded systems in place
    ///
    /// # Errors
    ///
    /// Returns [`PressureError::SingularPivot`] naming the augmented row and the
    /// wavenumber pair when a pivot is negligible compared with its row.
    pub fn factor_and_solve(&mut self, columns: usize) -> PressureResult<()> {
        let w = self.width;
        let rows = self.rows();
        let [m1, m2, m3, m4, m5, m6, m7] = &mut self.m;
        let p = &mut self.rhs;

        // LU factorization: m1..m3 become the multipliers of L, m4..m7 the rows of U.
        for r in 0..rows {
            for c in 0..columns {
                let ik = r * w + c;
                let scale = [m1[ik], m2[ik], m3[ik], m4[ik], m5[ik], m6[ik], m7[ik]]
                    .iter()
                    .fold(0.0_f64, |acc, v| acc.max(v.abs()));

                let mut l1 = 0.0;
                let mut l2 = 0.0;
                let mut l3 = 0.0;
                if r >= 3 {
                    l1 = m1[ik] / m4[ik - 3 * w];
                }
                if r >= 2 {
                    let mut a2 = m2[ik];
                    if r >= 3 {
                        a2 -= l1 * m5[ik - 3 * w];
                    }
                    l2 = a2 / m4[ik - 2 * w];
                }
                if r >= 1 {
                    let mut a3 = m3[ik];
                    if r >= 2 {
                        a3 -= l2 * m5[ik - 2 * w];
                    }
                    if r >= 3 {
                        a3 -= l1 * m6[ik - 3 * w];
                    }
                    l3 = a3 / m4[ik - w];
                }

                let mut a4 = m4[ik];
                let mut a5 = m5[ik];
                let mut a6 = m6[ik];
                if r >= 1 {
                    a4 -= l3 * m5[ik - w];
                    a5 -= l3 * m6[ik - w];
                    a6 -= l3 * m7[ik - w];
                }
                if r >= 2 {
                    a4 -= l2 * m6[ik - 2 * w];
                    a5 -= l2 * m7[ik - 2 * w];
                }
                if r >= 3 {
                    a4 -= l1 * m7[ik - 3 * w];
                }

                if a4.abs() <= PIVOT_TOLERANCE * scale || a4 == 0.0 {
                    let (i, j) = self.modes[c];
                    return Err(PressureError::SingularPivot {
                        stage: "heptadiagonal factorization",
                        row: r,
                        pivot: a4,
                        i,
                        j,
                    });
                }

                m1[ik] = l1;
                m2[ik] = l2;
                m3[ik] = l3;
                m4[ik] = a4;
                m5[ik] = a5;
                m6[ik] = a6;
            }
        }

        // Forward substitution, L y = rhs.
        for r in 1..rows {
            for c in 0..columns {
                let ik = r * w + c;
                let mut y = p[ik] - m3[ik] * p[ik - w];
                if r >= 2 {
                    y -= m2[ik] * p[ik - 2 * w];
                }
                if r >= 3 {
                    y -= m1[ik] * p[ik - 3 * w];
                }
                p[ik] = y;
            }
        }

        // Backward substitution, U x = y.
        for r in (0..rows).rev() {
            for c in 0..columns {
                let ik = r * w + c;
                let mut x = p[ik];
                if r + 1 < rows {
                    x -= m5[ik] * p[ik + w];
                }
                if r + 2 < rows {
                    x -= m6[ik] * p[ik + 2 * w];
                }
                if r + 3 < rows {
                    x -= m7[ik] * p[ik + 3 * w];
                }
                p[ik] = x / m4[ik];
            }
        }

        Ok(())
    }
}
