//! Dense 3-D field storage with ghost layers
//!
//! Fields are stored as a flat `Vec<f64>` with `i` fastest, then `j`, then `k`.
//! All fields of one grid share the same shape, including the vertical velocity
//! whose level `k` sits on the bottom face of cell `k`.

use super::geometry::Grid;
use std::ops::Range;

/// Linear offsets of a flattened 3-D array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strides {
    /// Offset between neighbours in x (always 1)
    pub ii: usize,
    /// Offset between neighbours in y
    pub jj: usize,
    /// Offset between neighbours in z
    pub kk: usize,
}

impl Strides {
    /// Strides of an array that is `icells` wide and `jcells` deep
    #[must_use]
    pub const fn new(icells: usize, jcells: usize) -> Self {
        Self {
            ii: 1,
            jj: icells,
            kk: icells * jcells,
        }
    }

    /// Linear offset of `(i, j, k)`
    #[must_use]
    #[inline]
    pub const fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        i * self.ii + j * self.jj + k * self.kk
    }
}

/// 3-D field with ghost layers on every side
///
/// The interior occupies `istart..iend`, `jstart..jend`, `kstart..kend`; the
/// remaining cells are ghost cells refreshed by the boundary helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct Field3d {
    data: Vec<f64>,
    icells: usize,
    jcells: usize,
    kcells: usize,
    igc: usize,
    jgc: usize,
    kgc: usize,
    strides: Strides,
}

impl Field3d {
    /// Create a zero field shaped for `grid`
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        Self {
            data: vec![0.0; grid.icells * grid.jcells * grid.kcells],
            icells: grid.icells,
            jcells: grid.jcells,
            kcells: grid.kcells,
            igc: grid.igc,
            jgc: grid.jgc,
            kgc: grid.kgc,
            strides: grid.strides(),
        }
    }

    /// Shape `(icells, jcells, kcells)` including ghost layers
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.icells, self.jcells, self.kcells)
    }

    /// Ghost-layer widths `(igc, jgc, kgc)`
    #[must_use]
    pub fn ghost_cells(&self) -> (usize, usize, usize) {
        (self.igc, self.jgc, self.kgc)
    }

    #[must_use]
    pub fn strides(&self) -> Strides {
        self.strides
    }

    /// Interior index ranges in x, y and z
    #[must_use]
    pub fn interior(&self) -> (Range<usize>, Range<usize>, Range<usize>) {
        (
            self.igc..self.icells - self.igc,
            self.jgc..self.jcells - self.jgc,
            self.kgc..self.kcells - self.kgc,
        )
    }

    /// Linear index of `(i, j, k)` in ghost-inclusive coordinates
    #[must_use]
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.icells && j < self.jcells && k < self.kcells);
        self.strides.offset(i, j, k)
    }

    /// Value at `(i, j, k)`
    ///
    /// # Panics
    ///
    /// Panics if the index lies outside the array
    #[must_use]
    #[inline]
    pub fn at(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.index(i, j, k)]
    }

    /// Mutable reference to the value at `(i, j, k)`
    ///
    /// # Panics
    ///
    /// Panics if the index lies outside the array
    #[inline]
    pub fn at_mut(&mut self, i: usize, j: usize, k: usize) -> &mut f64 {
        let ijk = self.index(i, j, k);
        &mut self.data[ijk]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Fill the whole field, ghost cells included
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Set every interior cell from a function of its interior-local indices
    ///
    /// # Arguments
    ///
    /// * `f` - Called with `(i, j, k)` counted from the first interior cell
    pub fn fill_interior_with(&mut self, mut f: impl FnMut(usize, usize, usize) -> f64) {
        let (irange, jrange, krange) = self.interior();
        for k in krange.clone() {
            for j in jrange.clone() {
                for i in irange.clone() {
                    let ijk = self.index(i, j, k);
                    self.data[ijk] = f(i - irange.start, j - jrange.start, k - krange.start);
                }
            }
        }
    }

    /// Largest absolute value over the interior
    #[must_use]
    pub fn interior_max_abs(&self) -> f64 {
        let (irange, jrange, krange) = self.interior();
        let mut max = 0.0_f64;
        for k in krange {
            for j in jrange.clone() {
                for i in irange.clone() {
                    max = max.max(self.at(i, j, k).abs());
                }
            }
        }
        max
    }
}
