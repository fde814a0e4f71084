//! Compact spectral work array and its pencil layouts

/// Memory layout of a [`PencilBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PencilLayout {
    /// Physical block of this rank, `i` fastest
    Block,
    /// Full x lines, `i` fastest
    X,
    /// Full y lines, `j` fastest
    Y,
    /// Full vertical columns, `k` fastest
    Z,
}

impl PencilLayout {
    /// Linear index of `(i, j, k)` in a buffer of extents `(ni, nj, nk)`
    #[must_use]
    #[inline]
    pub const fn index(
        self,
        (ni, nj, nk): (usize, usize, usize),
        i: usize,
        j: usize,
        k: usize,
    ) -> usize {
        match self {
            Self::Block | Self::X => i + ni * (j + nj * k),
            Self::Y => j + nj * (i + ni * k),
            Self::Z => k + nk * (i + ni * j),
        }
    }

    /// Length of one contiguous line in this layout
    #[must_use]
    pub const fn line_len(self, (ni, nj, nk): (usize, usize, usize)) -> usize {
        match self {
            Self::Block | Self::X => ni,
            Self::Y => nj,
            Self::Z => nk,
        }
    }
}

/// Interior-only work array that moves between pencil layouts
///
/// Holds no ghost cells. Each layout has its own extents (see
/// [`super::Decomposition::extents`]); local indices are always `(i, j, k)`
/// regardless of which axis is contiguous.
#[derive(Debug, Clone)]
pub struct PencilBuffer {
    data: Vec<f64>,
    layout: PencilLayout,
    extents: (usize, usize, usize),
    /// Reorder target, swapped with `data` so transposes reuse one allocation
    spare: Vec<f64>,
}

impl PartialEq for PencilBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.layout == other.layout && self.extents == other.extents && self.data == other.data
    }
}

impl PencilBuffer {
    /// Zeroed buffer of the given layout and extents
    #[must_use]
    pub fn new(layout: PencilLayout, extents: (usize, usize, usize)) -> Self {
        Self {
            data: vec![0.0; extents.0 * extents.1 * extents.2],
            layout,
            extents,
            spare: Vec::new(),
        }
    }

    #[must_use]
    pub fn layout(&self) -> PencilLayout {
        self.layout
    }

    #[must_use]
    pub fn extents(&self) -> (usize, usize, usize) {
        self.extents
    }

    /// Length of the contiguous lines of the current layout
    #[must_use]
    pub fn line_len(&self) -> usize {
        self.layout.line_len(self.extents)
    }

    #[must_use]
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        self.layout.index(self.extents, i, j, k)
    }

    #[must_use]
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.index(i, j, k)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f64) {
        let ijk = self.index(i, j, k);
        self.data[ijk] = value;
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Rearrange the local data into `layout` without changing extents
    pub fn reorder(&mut self, layout: PencilLayout) {
        if layout == self.layout {
            return;
        }
        let (ni, nj, nk) = self.extents;
        self.spare.resize(self.data.len(), 0.0);
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    self.spare[layout.index(self.extents, i, j, k)] =
                        self.data[self.index(i, j, k)];
                }
            }
        }
        std::mem::swap(&mut self.data, &mut self.spare);
        self.layout = layout;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_indices_are_contiguous_along_their_axis() {
        let ext = (3, 4, 5);
        assert_eq!(PencilLayout::X.index(ext, 1, 0, 0), 1);
        assert_eq!(PencilLayout::Y.index(ext, 0, 1, 0), 1);
        assert_eq!(PencilLayout::Z.index(ext, 0, 0, 1), 1);
        assert_eq!(PencilLayout::Z.index(ext, 1, 0, 0), 5);
        assert_eq!(PencilLayout::Y.line_len(ext), 4);
    }

    #[test]
    fn test_repeated_reorders_reuse_storage() {
        let mut buf = PencilBuffer::new(PencilLayout::Block, (4, 3, 2));
        for (n, v) in buf.as_mut_slice().iter_mut().enumerate() {
            *v = n as f64;
        }
        let original = buf.clone();

        buf.reorder(PencilLayout::Z);
        buf.reorder(PencilLayout::Block);
        let storage = [buf.as_slice().as_ptr(), buf.spare.as_ptr()];
        buf.reorder(PencilLayout::Y);
        buf.reorder(PencilLayout::Block);

        assert_eq!(buf, original);
        assert_eq!([buf.as_slice().as_ptr(), buf.spare.as_ptr()], storage);
    }

    #[test]
    fn test_reorder_preserves_values() {
        let mut buf = PencilBuffer::new(PencilLayout::X, (3, 2, 4));
        for k in 0..4 {
            for j in 0..2 {
                for i in 0..3 {
                    buf.set(i, j, k, (100 * k + 10 * j + i) as f64);
                }
            }
        }
        buf.reorder(PencilLayout::Z);
        assert_eq!(buf.layout(), PencilLayout::Z);
        assert_eq!(buf.as_slice()[1], 100.0);
        for k in 0..4 {
            for j in 0..2 {
                for i in 0..3 {
                    assert_eq!(buf.get(i, j, k), (100 * k + 10 * j + i) as f64);
                }
            }
        }
    }
}
