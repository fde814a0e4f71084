//! Real-to-half-complex 1-D transforms
//!
//! The spectrum of a real line of length `n` is stored in place in the
//! half-complex order `r0, r1, …, r(n/2), i((n+1)/2-1), …, i1`: real parts of the
//! non-negative wavenumbers first, imaginary parts of the same wavenumbers in
//! reverse order after them. Coefficients `k` and `n-k` therefore belong to the
//! same wavenumber.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Forward and backward plans for lines of one length
#[derive(Clone)]
pub struct HalfComplexPlan {
    n: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

/// Per-worker complex buffers for [`HalfComplexPlan`]
pub struct HalfComplexScratch {
    line: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl std::fmt::Debug for HalfComplexPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HalfComplexPlan").field("n", &self.n).finish()
    }
}

impl HalfComplexPlan {
    /// Plan transforms of length `n`
    #[must_use]
    pub fn new(n: usize, planner: &mut FftPlanner<f64>) -> Self {
        Self {
            n,
            forward: planner.plan_fft_forward(n),
            inverse: planner.plan_fft_inverse(n),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Allocate buffers for one worker
    #[must_use]
    pub fn scratch(&self) -> HalfComplexScratch {
        let scratch_len = self
            .forward
            .get_inplace_scratch_len()
            .max(self.inverse.get_inplace_scratch_len());
        HalfComplexScratch {
            line: vec![Complex::new(0.0, 0.0); self.n],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
        }
    }

    /// Replace a real line by its unnormalized half-complex spectrum
    pub fn forward(&self, line: &mut [f64], work: &mut HalfComplexScratch) {
        let n = self.n;
        debug_assert_eq!(line.len(), n);

        for (c, &r) in work.line.iter_mut().zip(line.iter()) {
            *c = Complex::new(r, 0.0);
        }
        self.forward.process_with_scratch(&mut work.line, &mut work.scratch);

        for k in 0..=n / 2 {
            line[k] = work.line[k].re;
        }
        for k in 1..n.div_ceil(2) {
            line[n - k] = work.line[k].im;
        }
    }

    /// Replace a half-complex spectrum by the real line it represents
    ///
    /// Includes the `1/n` normalization, so `backward` undoes `forward`.
    pub fn backward(&self, line: &mut [f64], work: &mut HalfComplexScratch) {
        let n = self.n;
        debug_assert_eq!(line.len(), n);

        work.line[0] = Complex::new(line[0], 0.0);
        for k in 1..n.div_ceil(2) {
            let c = Complex::new(line[k], line[n - k]);
            work.line[k] = c;
            work.line[n - k] = c.conj();
        }
        if n % 2 == 0 && n > 0 {
            work.line[n / 2] = Complex::new(line[n / 2], 0.0);
        }
        self.inverse.process_with_scratch(&mut work.line, &mut work.scratch);

        let scale = 1.0 / n as f64;
        for (r, c) in line.iter_mut().zip(work.line.iter()) {
            *r = c.re * scale;
        }
    }
}
