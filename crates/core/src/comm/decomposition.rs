//! Rank layout of the horizontal domain and the pencil extents derived from it
//!
//! Ranks form an `npx × npy` grid. In physical space rank `(coord_x, coord_y)`
//! owns an `itot/npx × jtot/npy × ktot` block. The spectral work array moves
//! through three pencil layouts:
//!
//! | layout | extents                                | contiguous |
//! |--------|----------------------------------------|------------|
//! | `X`    | `itot × jtot/npy × ktot/npx`           | i          |
//! | `Y`    | `itot/npy × jtot × ktot/npx`           | j          |
//! | `Z`    | `itot/npy × jtot/npx × ktot`           | k          |
//!
//! The z-pencil decomposition is turned by 90 degrees with respect to the
//! physical one, so its x offset follows `coord_y` and its y offset `coord_x`.

use super::pencil::PencilLayout;
use crate::error::{PressureError, PressureResult};

/// Position of one rank in the horizontal process grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decomposition {
    /// Number of ranks along x
    pub npx: usize,
    /// Number of ranks along y
    pub npy: usize,
    /// This rank's x coordinate in the process grid
    pub coord_x: usize,
    /// This rank's y coordinate in the process grid
    pub coord_y: usize,
    itot: usize,
    jtot: usize,
    ktot: usize,
}

impl Decomposition {
    /// Layout of a single-rank run
    #[must_use]
    pub const fn single(itot: usize, jtot: usize, ktot: usize) -> Self {
        Self {
            npx: 1,
            npy: 1,
            coord_x: 0,
            coord_y: 0,
            itot,
            jtot,
            ktot,
        }
    }

    /// Layout of rank `(coord_x, coord_y)` in an `npx × npy` process grid
    ///
    /// # Errors
    ///
    /// Returns [`PressureError::InvalidConfig`] when a coordinate is outside the
    /// process grid or one of the pencil layouts does not divide evenly.
    pub fn new(
        (itot, jtot, ktot): (usize, usize, usize),
        (npx, npy): (usize, usize),
        (coord_x, coord_y): (usize, usize),
    ) -> PressureResult<Self> {
        if npx == 0 || npy == 0 {
            return Err(PressureError::invalid_config(
                "npx/npy",
                format!("{npx}x{npy}"),
                "process grid must have at least one rank in each direction",
            ));
        }
        if coord_x >= npx || coord_y >= npy {
            return Err(PressureError::invalid_config(
                "coord",
                format!("({coord_x}, {coord_y})"),
                format!("outside the {npx}x{npy} process grid"),
            ));
        }

        let checks = [
            ("itot", itot, npx),
            ("itot", itot, npy),
            ("jtot", jtot, npy),
            ("jtot", jtot, npx),
            ("ktot", ktot, npx),
        ];
        for (parameter, extent, ranks) in checks {
            if extent % ranks != 0 {
                return Err(PressureError::invalid_config(
                    parameter,
                    extent,
                    format!("not divisible by {ranks} ranks"),
                ));
            }
        }

        Ok(Self {
            npx,
            npy,
            coord_x,
            coord_y,
            itot,
            jtot,
            ktot,
        })
    }

    /// Global extents `(itot, jtot, ktot)` this layout was built for
    #[must_use]
    pub const fn global_extents(&self) -> (usize, usize, usize) {
        (self.itot, self.jtot, self.ktot)
    }

    /// Interior extents of the physical block owned by this rank
    #[must_use]
    pub const fn block_extents(&self) -> (usize, usize, usize) {
        (self.itot / self.npx, self.jtot / self.npy, self.ktot)
    }

    /// Local extents `(ni, nj, nk)` of a buffer in the given layout
    #[must_use]
    pub const fn extents(&self, layout: PencilLayout) -> (usize, usize, usize) {
        match layout {
            PencilLayout::Block => self.block_extents(),
            PencilLayout::X => (self.itot, self.jtot / self.npy, self.ktot / self.npx),
            PencilLayout::Y => (self.itot / self.npy, self.jtot, self.ktot / self.npx),
            PencilLayout::Z => (self.itot / self.npy, self.jtot / self.npx, self.ktot),
        }
    }

    /// Global wavenumber indices of local z-pencil column `(i, j)`
    #[must_use]
    #[inline]
    pub const fn spectral_index(&self, i: usize, j: usize) -> (usize, usize) {
        let (iblock, jblock, _) = self.extents(PencilLayout::Z);
        (self.coord_y * iblock + i, self.coord_x * jblock + j)
    }

    /// Whether local z-pencil column `(i, j)` holds the global zero mode
    #[must_use]
    #[inline]
    pub const fn is_zero_mode(&self, i: usize, j: usize) -> bool {
        let (ig, jg) = self.spectral_index(i, j);
        ig == 0 && jg == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_rank_owns_everything() {
        let d = Decomposition::single(16, 8, 4);
        assert_eq!(d.block_extents(), (16, 8, 4));
        assert_eq!(d.extents(PencilLayout::Z), (16, 8, 4));
        assert!(d.is_zero_mode(0, 0));
        assert!(!d.is_zero_mode(1, 0));
    }

    #[test]
    fn test_zero_mode_only_on_first_rank() {
        let mut owners = Vec::new();
        for coord_x in 0..2 {
            for coord_y in 0..2 {
                let d = Decomposition::new((8, 8, 8), (2, 2), (coord_x, coord_y)).unwrap();
                let (ni, nj, _) = d.extents(PencilLayout::Z);
                for j in 0..nj {
                    for i in 0..ni {
                        if d.is_zero_mode(i, j) {
                            owners.push((coord_x, coord_y, i, j));
                        }
                    }
                }
            }
        }
        assert_eq!(owners, vec![(0, 0, 0, 0)]);
    }

    #[test]
    fn test_spectral_index_uses_swapped_coordinates() {
        let d = Decomposition::new((12, 12, 4), (2, 3), (1, 2)).unwrap();
        assert_eq!(d.extents(PencilLayout::Z), (4, 6, 4));
        assert_eq!(d.spectral_index(1, 1), (2 * 4 + 1, 6 + 1));
    }

    #[test]
    fn test_rejects_uneven_layout() {
        let err = Decomposition::new((10, 8, 8), (4, 1), (0, 0)).unwrap_err();
        assert!(matches!(
            err,
            PressureError::InvalidConfig {
                parameter: "itot",
                ..
            }
        ));
    }
}
