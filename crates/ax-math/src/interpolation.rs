//! Linear interpolation on sorted abscissae.

use ax_core::{ensure, errors::Result, Real, Size};

/// Linear interpolation over sorted `xs` with end-clamped evaluation.
///
/// `f(x) = y[i] + (y[i+1] - y[i]) * (x - x[i]) / (x[i+1] - x[i])`,
/// with `x` clamped into `[x[0], x[n-1]]` first — boundary curves are only
/// defined on their grid, so extrapolation is never meaningful here.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct a linear interpolation from sorted `xs` and corresponding `ys`.
    ///
    /// # Errors
    /// Returns an error if the slices have different lengths or fewer than
    /// 2 points.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        ensure!(xs.len() >= 2, "xs", "need at least 2 points, got {}", xs.len());
        ensure!(
            xs.len() == ys.len(),
            "ys",
            "length {} does not match xs length {}",
            ys.len(),
            xs.len()
        );
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    fn locate(&self, x: Real) -> Size {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return 0;
        }
        if x >= self.xs[n - 1] {
            return n - 2;
        }
        let mut lo = 0;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.xs[mid] <= x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Lower bound of the interpolation domain.
    pub fn x_min(&self) -> Real {
        self.xs[0]
    }

    /// Upper bound of the interpolation domain.
    pub fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    /// Evaluate at `x`, clamping `x` into the domain first.
    pub fn value_clamped(&self, x: Real) -> Real {
        let x = x.clamp(self.x_min(), self.x_max());
        let i = self.locate(x);
        let dx = self.xs[i + 1] - self.xs[i];
        if dx.abs() < f64::EPSILON {
            return self.ys[i];
        }
        self.ys[i] + (x - self.xs[i]) * (self.ys[i + 1] - self.ys[i]) / dx
    }
}
