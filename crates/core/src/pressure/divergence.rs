//! Discrete velocity divergence for diagnostics
//!
//! Uses the same stencil as the projection of the matching order, so a solved
//! field reports round-off divergence. Ghost cells of the velocities must be
//! current (periodic in x and y, mirrored `w` for fourth order).

use super::fields::VelocityFields;
use super::stencil::{grad4, CGI};
use crate::grid::{Dimensionality, Grid, SpatialOrder};
use rayon::prelude::*;

/// Largest absolute divergence over the local interior
#[must_use]
pub fn max_divergence(grid: &Grid, fields: &VelocityFields<'_>) -> f64 {
    match (grid.order, grid.dimensionality()) {
        (SpatialOrder::Second, Dimensionality::ThreeD) => max_divergence_2nd::<true>(grid, fields),
        (SpatialOrder::Second, Dimensionality::TwoD) => max_divergence_2nd::<false>(grid, fields),
        (SpatialOrder::Fourth, Dimensionality::ThreeD) => max_divergence_4th::<true>(grid, fields),
        (SpatialOrder::Fourth, Dimensionality::TwoD) => max_divergence_4th::<false>(grid, fields),
    }
}

fn max_divergence_2nd<const DIM3: bool>(grid: &Grid, fields: &VelocityFields<'_>) -> f64 {
    let s = grid.strides();
    let (ii, jj, kk) = (s.ii, s.jj, s.kk);
    let dxi = 1.0 / grid.dx;
    let dyi = 1.0 / grid.dy;
    let (u, v, w) = (fields.u.as_slice(), fields.v.as_slice(), fields.w.as_slice());

    (grid.kstart..grid.kend)
        .into_par_iter()
        .map(|k| {
            let mut divmax = 0.0_f64;
            for j in grid.jstart..grid.jend {
                for i in grid.istart..grid.iend {
                    let ijk = i + j * jj + k * kk;
                    let mut div =
                        (u[ijk + ii] - u[ijk]) * dxi + (w[ijk + kk] - w[ijk]) * grid.dzi[k];
                    if DIM3 {
                        div += (v[ijk + jj] - v[ijk]) * dyi;
                    }
                    divmax = divmax.max(div.abs());
                }
            }
            divmax
        })
        .reduce(|| 0.0, f64::max)
}

fn max_divergence_4th<const DIM3: bool>(grid: &Grid, fields: &VelocityFields<'_>) -> f64 {
    let s = grid.strides();
    let (ii, jj, kk) = (s.ii, s.jj, s.kk);
    let dxi = 1.0 / grid.dx;
    let dyi = 1.0 / grid.dy;
    let (u, v, w) = (fields.u.as_slice(), fields.v.as_slice(), fields.w.as_slice());

    (grid.kstart..grid.kend)
        .into_par_iter()
        .map(|k| {
            let mut divmax = 0.0_f64;
            for j in grid.jstart..grid.jend {
                for i in grid.istart..grid.iend {
                    let ijk = i + j * jj + k * kk;
                    let mut div = grad4(u[ijk - ii], u[ijk], u[ijk + ii], u[ijk + 2 * ii])
                        * CGI
                        * dxi
                        + grad4(w[ijk - kk], w[ijk], w[ijk + kk], w[ijk + 2 * kk]) * grid.dzi4[k];
                    if DIM3 {
                        div += grad4(v[ijk - jj], v[ijk], v[ijk + jj], v[ijk + 2 * jj]) * CGI * dyi;
                    }
                    divmax = divmax.max(div.abs());
                }
            }
            divmax
        })
        .reduce(|| 0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{cyclic_local, mirror_wall_ghosts, CyclicEdge, Field3d, GridConfig};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn fields(grid: &Grid) -> (Field3d, Field3d, Field3d) {
        (Field3d::new(grid), Field3d::new(grid), Field3d::new(grid))
    }

    #[test]
    fn test_uniform_flow_is_divergence_free() {
        for order in [SpatialOrder::Second, SpatialOrder::Fourth] {
            let grid = Grid::new(&GridConfig::default(), order).unwrap();
            let (mut u, mut v, w) = fields(&grid);
            u.fill(2.0);
            v.fill(-1.0);
            let vel = VelocityFields { u: &u, v: &v, w: &w };
            assert_eq!(max_divergence(&grid, &vel), 0.0);
        }
    }

    #[test]
    fn test_second_order_divergence_of_linear_u() {
        let grid = Grid::new(&GridConfig::default(), SpatialOrder::Second).unwrap();
        let (mut u, v, w) = fields(&grid);
        // u = x at the west faces: du/dx = 1 everywhere, no periodic wrap needed
        for k in 0..grid.kcells {
            for j in 0..grid.jcells {
                for i in 0..grid.icells {
                    *u.at_mut(i, j, k) = i as f64 * grid.dx;
                }
            }
        }
        let vel = VelocityFields { u: &u, v: &v, w: &w };
        assert_relative_eq!(max_divergence(&grid, &vel), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fourth_order_detects_sinusoidal_divergence() {
        let grid = Grid::new(&GridConfig::default(), SpatialOrder::Fourth).unwrap();
        let (mut u, v, mut w) = fields(&grid);
        u.fill_interior_with(|i, _, _| (2.0 * PI * i as f64 / 8.0).sin());
        cyclic_local(&mut u, CyclicEdge::Both);
        mirror_wall_ghosts(&mut w);

        let vel = VelocityFields { u: &u, v: &v, w: &w };
        let theta = 2.0 * PI / 8.0;
        let amplitude = (27.0 * (0.5 * theta).sin() - (1.5 * theta).sin()) / 12.0 / grid.dx;
        // Cell centres sit half a cell from the faces, the largest |cos| is at θ/2.
        let expected = amplitude * (0.5 * theta).cos();
        assert_relative_eq!(max_divergence(&grid, &vel), expected, max_relative = 1e-10);
    }
}
