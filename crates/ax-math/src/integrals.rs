//! Numerical integration.
//!
//! The boundary equations integrate kernels that are discontinuous at the
//! interval endpoints (degenerate-expiry sentinels), so the workhorse here
//! is a fixed-node midpoint rule, which never evaluates the endpoints.
//! There is no adaptive error control in this version.

use ax_core::{
    errors::{Error, Result},
    Real, Size,
};

/// A numerical integrator.
pub trait Integrator {
    /// Integrate `f` on `[a, b]`.
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Real>;
}

/// A fixed-step integrator using the midpoint rule with `n` equally-spaced
/// sub-intervals.
#[derive(Debug, Clone)]
pub struct SegmentIntegral {
    /// Number of sub-intervals.
    pub intervals: Size,
}

impl SegmentIntegral {
    /// Create a new segment integrator.
    pub fn new(intervals: Size) -> Self {
        Self { intervals }
    }
}

impl Integrator for SegmentIntegral {
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Real> {
        let n = self.intervals;
        if n == 0 {
            return Err(Error::InvalidInput {
                parameter: "intervals",
                message: "must be > 0".into(),
            });
        }
        if a == b {
            return Ok(0.0);
        }
        let h = (b - a) / n as Real;
        let mut sum = 0.0;
        for i in 0..n {
            let x = a + (i as Real + 0.5) * h;
            sum += f(x);
        }
        Ok(sum * h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_exact_for_linear() {
        let seg = SegmentIntegral::new(4);
        // ∫₀¹ (2x + 1) dx = 2
        let result = seg.integrate(|x| 2.0 * x + 1.0, 0.0, 1.0).unwrap();
        assert!((result - 2.0).abs() < 1e-14, "got {result}");
    }

    #[test]
    fn midpoint_converges_on_smooth_integrand() {
        // ∫₀^π sin(x) dx = 2, midpoint error is O(h²)
        let coarse = SegmentIntegral::new(16)
            .integrate(|x| x.sin(), 0.0, std::f64::consts::PI)
            .unwrap();
        let fine = SegmentIntegral::new(64)
            .integrate(|x| x.sin(), 0.0, std::f64::consts::PI)
            .unwrap();
        assert!((coarse - 2.0).abs() < 1e-2, "got {coarse}");
        assert!((fine - 2.0).abs() < 1e-3, "got {fine}");
        assert!((fine - 2.0).abs() < (coarse - 2.0).abs());
    }

    #[test]
    fn degenerate_interval_is_zero() {
        let seg = SegmentIntegral::new(50);
        let result = seg.integrate(|x| x * x, 1.0, 1.0).unwrap();
        assert_eq!(result, 0.0);
    }

    #[test]
    fn zero_intervals_rejected() {
        let seg = SegmentIntegral::new(0);
        assert!(seg.integrate(|x| x, 0.0, 1.0).is_err());
    }

    #[test]
    fn endpoints_never_evaluated() {
        // Integrand blows up at both endpoints; the midpoint rule must not care.
        let seg = SegmentIntegral::new(64);
        let result = seg
            .integrate(|x| 1.0 / (x * (1.0 - x)).sqrt(), 0.0, 1.0)
            .unwrap();
        assert!(result.is_finite());
        // ∫₀¹ dx/√(x(1−x)) = π
        assert!((result - std::f64::consts::PI).abs() < 0.5, "got {result}");
    }
}
