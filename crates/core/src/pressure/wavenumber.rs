//! Modified wavenumbers of the discrete horizontal Laplacian
//!
//! For a periodic direction with `n` cells of width `spacing`, entry `k` holds
//! the eigenvalue of the discrete second derivative for Fourier mode `k`. The
//! half-complex coefficients `k` and `n-k` share one wavenumber, so only
//! `0..=n/2` is evaluated and the rest is mirrored.

use crate::grid::SpatialOrder;
use std::f64::consts::PI;

/// Stencil weights of the fourth-order symbol, all over 576
const C1: f64 = 1.0 / 576.0;
const C2: f64 = 54.0 / 576.0;
const C3: f64 = 783.0 / 576.0;
const C4: f64 = 1460.0 / 576.0;

/// Build the eigenvalue table for one horizontal direction
///
/// # Arguments
///
/// * `order` - Spatial order of the difference operator
/// * `n` - Global number of cells in the direction
/// * `spacing` - Cell width (m)
///
/// # Returns
///
/// Table of length `n` with `table[0] == 0` and `table[k] == table[n-k]`
#[must_use]
pub fn modified_wavenumbers(order: SpatialOrder, n: usize, spacing: f64) -> Vec<f64> {
    let mut table = vec![0.0; n];
    if n == 0 {
        return table;
    }
    let inv_spacing_sq = 1.0 / (spacing * spacing);
    let nf = n as f64;

    for k in 0..=n / 2 {
        let theta = 2.0 * PI * k as f64 / nf;
        let symbol = match order {
            SpatialOrder::Second => 2.0 * (theta.cos() - 1.0),
            SpatialOrder::Fourth => {
                2.0 * C1 * (3.0 * theta).cos() - 2.0 * C2 * (2.0 * theta).cos()
                    + 2.0 * C3 * theta.cos()
                    - C4
            }
        };
        table[k] = symbol * inv_spacing_sq;
    }
    for k in n / 2 + 1..n {
        table[k] = table[n - k];
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tables_are_mirror_symmetric_with_zero_mean_mode() {
        for order in [SpatialOrder::Second, SpatialOrder::Fourth] {
            for n in [1, 2, 7, 8, 64] {
                let table = modified_wavenumbers(order, n, 0.1);
                assert_eq!(table.len(), n);
                assert_relative_eq!(table[0], 0.0, epsilon = 1e-10);
                for k in 1..n {
                    assert_eq!(table[k], table[n - k], "order {order}, n {n}, k {k}");
                    assert!(table[k] < 0.0);
                }
            }
        }
    }

    #[test]
    fn test_second_order_nyquist_value() {
        let table = modified_wavenumbers(SpatialOrder::Second, 8, 0.5);
        assert_relative_eq!(table[4], -4.0 / 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_fourth_order_matches_squared_staggered_derivative() {
        // The fourth-order staggered derivative has symbol
        // (27 sin(θ/2) - sin(3θ/2)) / 12 / dx, and the Laplacian is minus its square.
        let n = 16;
        let dx = 0.25;
        let table = modified_wavenumbers(SpatialOrder::Fourth, n, dx);
        for (k, value) in table.iter().enumerate().take(n / 2 + 1) {
            let theta = 2.0 * PI * k as f64 / n as f64;
            let d = (27.0 * (0.5 * theta).sin() - (1.5 * theta).sin()) / (12.0 * dx);
            assert_relative_eq!(*value, -d * d, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_fourth_order_approaches_continuous_wavenumber() {
        let n = 256;
        let dx = 1.0 / n as f64;
        let table = modified_wavenumbers(SpatialOrder::Fourth, n, dx);
        let kappa = 2.0 * PI;
        assert_relative_eq!(table[1], -kappa * kappa, max_relative = 1e-8);
    }
}
