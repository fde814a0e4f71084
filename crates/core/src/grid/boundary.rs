//! Ghost-cell refresh for periodic horizontal and walled vertical boundaries

use super::field::Field3d;

/// Horizontal direction(s) of a periodic refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclicEdge {
    X,
    Y,
    Both,
}

/// Map a ghost-inclusive index onto its periodic interior image
#[inline]
fn periodic_source(index: usize, start: usize, extent: usize) -> usize {
    let offset = (index as isize - start as isize).rem_euclid(extent as isize);
    start + offset as usize
}

/// Copy periodic images into the x and/or y ghost cells of a local field
///
/// Works for any interior extent, including a single cell, so 2-D runs with
/// `jtot == 1` simply replicate the one interior row. With [`CyclicEdge::Both`]
/// the x refresh runs first so that the corner ghosts are filled too.
pub fn cyclic_local(field: &mut Field3d, edge: CyclicEdge) {
    if matches!(edge, CyclicEdge::X | CyclicEdge::Both) {
        cyclic_x(field);
    }
    if matches!(edge, CyclicEdge::Y | CyclicEdge::Both) {
        cyclic_y(field);
    }
}

fn cyclic_x(field: &mut Field3d) {
    let (icells, jcells, kcells) = field.shape();
    let (irange, _, _) = field.interior();
    let itot = irange.len();
    let ghosts: Vec<usize> = (0..irange.start).chain(irange.end..icells).collect();

    for k in 0..kcells {
        for j in 0..jcells {
            for &i in &ghosts {
                let src = periodic_source(i, irange.start, itot);
                *field.at_mut(i, j, k) = field.at(src, j, k);
            }
        }
    }
}

fn cyclic_y(field: &mut Field3d) {
    let (icells, jcells, kcells) = field.shape();
    let (_, jrange, _) = field.interior();
    let jtot = jrange.len();
    let ghosts: Vec<usize> = (0..jrange.start).chain(jrange.end..jcells).collect();

    for k in 0..kcells {
        for &j in &ghosts {
            let src = periodic_source(j, jrange.start, jtot);
            for i in 0..icells {
                *field.at_mut(i, j, k) = field.at(i, src, k);
            }
        }
    }
}

/// Zero-gradient pressure ghosts at both walls
///
/// Every ghost level is the mirror image of an interior level across the wall:
/// `p[kstart-n] = p[kstart+n-1]` and `p[kend-1+n] = p[kend-n]`.
pub fn neumann_ghosts(field: &mut Field3d) {
    let (icells, jcells, _) = field.shape();
    let (_, _, krange) = field.interior();
    let (_, _, kgc) = field.ghost_cells();

    for n in 1..=kgc {
        for j in 0..jcells {
            for i in 0..icells {
                *field.at_mut(i, j, krange.start - n) = field.at(i, j, krange.start + n - 1);
                *field.at_mut(i, j, krange.end - 1 + n) = field.at(i, j, krange.end - n);
            }
        }
    }
}

/// Sign-flipped ghosts of a face-centred vertical component beyond the walls
///
/// The walls sit on faces `kstart` and `kend`; ghost face `kstart-n` takes
/// `-w[kstart+n]` and ghost face `kend+n` takes `-w[kend-n]`, for every ghost
/// face that lies strictly outside the wall face.
pub fn mirror_wall_ghosts(field: &mut Field3d) {
    let (icells, jcells, _) = field.shape();
    let (_, _, krange) = field.interior();
    let (_, _, kgc) = field.ghost_cells();

    for n in 1..kgc {
        for j in 0..jcells {
            for i in 0..icells {
                *field.at_mut(i, j, krange.start - n) = -field.at(i, j, krange.start + n);
                *field.at_mut(i, j, krange.end + n) = -field.at(i, j, krange.end - n);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, GridConfig, SpatialOrder};

    fn grid(itot: usize, jtot: usize, order: SpatialOrder) -> Grid {
        let config = GridConfig {
            itot,
            jtot,
            ktot: 4,
            ..GridConfig::default()
        };
        Grid::new(&config, order).unwrap()
    }

    #[test]
    fn test_cyclic_fills_both_sides_and_corners() {
        let g = grid(4, 3, SpatialOrder::Fourth);
        let mut f = Field3d::new(&g);
        f.fill_interior_with(|i, j, _| (10 * j + i) as f64);
        cyclic_local(&mut f, CyclicEdge::Both);

        // x ghosts: i = 0, 1 map to interior 2, 3
        assert_eq!(f.at(0, g.jstart, g.kstart), 2.0);
        assert_eq!(f.at(1, g.jstart, g.kstart), 3.0);
        assert_eq!(f.at(g.iend, g.jstart, g.kstart), 0.0);
        assert_eq!(f.at(g.iend + 1, g.jstart, g.kstart), 1.0);
        // y ghosts: j = 0 maps to interior row 1
        assert_eq!(f.at(g.istart, 0, g.kstart), 10.0);
        // Corner
        assert_eq!(f.at(0, 0, g.kstart), 12.0);
    }

    #[test]
    fn test_cyclic_single_row_replicates() {
        let g = grid(4, 1, SpatialOrder::Fourth);
        let mut f = Field3d::new(&g);
        f.fill_interior_with(|i, _, _| i as f64 + 1.0);
        cyclic_local(&mut f, CyclicEdge::Y);
        for j in 0..g.jcells {
            assert_eq!(f.at(g.istart + 2, j, g.kstart), 3.0);
        }
    }

    #[test]
    fn test_neumann_ghosts_mirror_interior() {
        let g = grid(2, 2, SpatialOrder::Fourth);
        let mut f = Field3d::new(&g);
        f.fill_interior_with(|_, _, k| k as f64 + 1.0);
        neumann_ghosts(&mut f);
        let (i, j) = (g.istart, g.jstart);
        assert_eq!(f.at(i, j, g.kstart - 1), 1.0);
        assert_eq!(f.at(i, j, g.kstart - 2), 2.0);
        assert_eq!(f.at(i, j, g.kend), 4.0);
        assert_eq!(f.at(i, j, g.kend + 1), 3.0);
    }

    #[test]
    fn test_wall_mirror_flips_sign() {
        let g = grid(2, 2, SpatialOrder::Fourth);
        let mut w = Field3d::new(&g);
        w.fill_interior_with(|_, _, k| k as f64);
        mirror_wall_ghosts(&mut w);
        let (i, j) = (g.istart, g.jstart);
        assert_eq!(w.at(i, j, g.kstart - 1), -1.0);
        assert_eq!(w.at(i, j, g.kend + 1), -w.at(i, j, g.kend - 1));
    }
}
