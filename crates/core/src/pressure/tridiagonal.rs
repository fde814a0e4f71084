//! Tridiagonal vertical system of the second-order projection

use crate::error::{PressureError, PressureResult};
use crate::grid::Grid;

/// Pivots smaller than this fraction of their row are treated as singular
pub(crate) const PIVOT_TOLERANCE: f64 = 1.0e-13;

/// Metric-only parts of the second-order vertical operator
///
/// Row `k` of the system for wavenumber pair `(kx, ky)` reads
/// `a[k] p[k-1] + b[k] p[k] + c[k] p[k+1] = dz²[k] rhs[k]` with
/// `b[k] = dz²[k] (bmati + bmatj) - (a[k] + c[k])`.
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalCoefficients {
    /// Sub-diagonal `dz[k] / dzh[k]`
    pub a: Vec<f64>,
    /// Super-diagonal `dz[k] / dzh[k+1]`
    pub c: Vec<f64>,
    /// Squared cell thickness
    pub dz2: Vec<f64>,
}

impl TridiagonalCoefficients {
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        let ks = grid.kstart;
        let a = (0..grid.ktot)
            .map(|k| grid.dz[k + ks] * grid.dzhi[k + ks])
            .collect();
        let c = (0..grid.ktot)
            .map(|k| grid.dz[k + ks] * grid.dzhi[k + ks + 1])
            .collect();
        let dz2 = (0..grid.ktot)
            .map(|k| grid.dz[k + ks] * grid.dz[k + ks])
            .collect();
        Self { a, c, dz2 }
    }

    /// Fill the main diagonal for one wavenumber pair, boundary rows included
    ///
    /// The bottom row gets a zero-gradient condition. The top row gets the same
    /// unless `zero_mode` is set, in which case the pressure is pinned to zero at
    /// the top wall to remove the constant null space.
    pub fn diagonal(&self, eigenvalue: f64, zero_mode: bool, b: &mut [f64]) {
        let n = self.a.len();
        for k in 0..n {
            b[k] = self.dz2[k] * eigenvalue - (self.a[k] + self.c[k]);
        }
        b[0] += self.a[0];
        if zero_mode {
            b[n - 1] -= self.c[n - 1];
        } else {
            b[n - 1] += self.c[n - 1];
        }
    }
}

/// Thomas algorithm, solving in place
///
/// # Arguments
///
/// * `a` - Sub-diagonal (`a[0]` unused)
/// * `b` - Main diagonal
/// * `c` - Super-diagonal (`c[n-1]` unused)
/// * `x` - Right-hand side on entry, solution on exit
/// * `gam` - Scratch of the same length
/// * `mode` - Global wavenumber pair, reported on failure
///
/// # Errors
///
/// Returns [`PressureError::SingularPivot`] when an elimination pivot is
/// negligible compared with the entries of its row.
pub fn solve_tridiagonal(
    a: &[f64],
    b: &[f64],
    c: &[f64],
    x: &mut [f64],
    gam: &mut [f64],
    mode: (usize, usize),
) -> PressureResult<()> {
    let n = x.len();
    let singular = |row: usize, pivot: f64| PressureError::SingularPivot {
        stage: "tridiagonal elimination",
        row,
        pivot,
        i: mode.0,
        j: mode.1,
    };

    let mut tmp = b[0];
    if tmp.abs() <= PIVOT_TOLERANCE * (b[0].abs() + c[0].abs()) || tmp == 0.0 {
        return Err(singular(0, tmp));
    }
    x[0] /= tmp;

    for k in 1..n {
        gam[k] = c[k - 1] / tmp;
        tmp = b[k] - a[k] * gam[k];
        let scale = a[k].abs() + b[k].abs() + c[k].abs();
        if tmp.abs() <= PIVOT_TOLERANCE * scale || tmp == 0.0 {
            return Err(singular(k, tmp));
        }
        x[k] = (x[k] - a[k] * x[k - 1]) / tmp;
    }

    for k in (0..n.saturating_sub(1)).rev() {
        x[k] -= gam[k + 1] * x[k + 1];
    }
    Ok(())
}
