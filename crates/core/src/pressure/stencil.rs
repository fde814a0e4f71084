//! Fourth-order staggered difference weights
//!
//! The derivative of a staggered quantity at the point between `b` and `c` is
//! `(a - 27 b + 27 c - d) / 24 / dx`. Vertically the `1/24` is folded into the
//! `dzi4`/`dzhi4` metrics, so callers scale [`grad4`] themselves.

pub const CG0: f64 = 1.0;
pub const CG1: f64 = -27.0;
pub const CG2: f64 = 27.0;
pub const CG3: f64 = -1.0;
pub const CGI: f64 = 1.0 / 24.0;

/// Unscaled fourth-order difference over four consecutive staggered values
#[must_use]
#[inline(always)]
pub fn grad4(a: f64, b: f64, c: f64, d: f64) -> f64 {
    CG0 * a + CG1 * b + CG2 * c + CG3 * d
}
