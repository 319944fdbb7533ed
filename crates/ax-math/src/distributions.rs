//! Standard normal distribution.

use ax_core::Real;
use std::f64::consts::{PI, SQRT_2};

/// The standard normal probability density function.
///
/// `φ(x) = exp(-x²/2) / √(2π)`
#[inline]
pub fn norm_pdf(x: Real) -> Real {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// The error function, via the Abramowitz & Stegun 7.1.26 rational
/// approximation (5-term polynomial).
///
/// Maximum absolute error 1.5×10⁻⁷.
pub fn erf(x: Real) -> Real {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0_f64 } else { 1.0_f64 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = t * (A1 + t * (A2 + t * (A3 + t * (A4 + t * A5))));
    sign * (1.0 - poly * (-x * x).exp())
}

/// The standard normal cumulative distribution function Φ(x).
///
/// Saturates to 0 below −8 and 1 above 8; special-cases x = 0 for an
/// exact 0.5. Maximum absolute error well under 1.5×10⁻⁷.
pub fn norm_cdf(x: Real) -> Real {
    if x == 0.0 {
        return 0.5;
    }
    if x > 8.0 {
        return 1.0;
    }
    if x < -8.0 {
        return 0.0;
    }
    0.5 * (1.0 + erf(x / SQRT_2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pdf_at_zero() {
        let expected = 1.0 / (2.0 * PI).sqrt();
        assert_relative_eq!(norm_pdf(0.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn cdf_at_zero_exact() {
        assert_eq!(norm_cdf(0.0), 0.5);
    }

    #[test]
    fn cdf_reference_values() {
        // Abramowitz & Stegun 7.1.26 is good to 1.5e-7
        assert!((norm_cdf(1.0) - 0.841_344_746_068_543).abs() < 1.5e-7);
        assert!((norm_cdf(-1.0) - 0.158_655_253_931_457).abs() < 1.5e-7);
        assert!((norm_cdf(2.0) - 0.977_249_868_051_821).abs() < 1.5e-7);
        assert!((norm_cdf(-2.0) - 0.022_750_131_948_179).abs() < 1.5e-7);
    }

    #[test]
    fn cdf_tails_saturate() {
        assert_eq!(norm_cdf(8.5), 1.0);
        assert_eq!(norm_cdf(-8.5), 0.0);
        assert_eq!(norm_cdf(f64::INFINITY), 1.0);
        assert_eq!(norm_cdf(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn cdf_symmetry() {
        for x in [0.25, 0.5, 1.0, 1.5, 2.0, 3.0] {
            let sum = norm_cdf(x) + norm_cdf(-x);
            assert!((sum - 1.0).abs() < 1e-7, "x = {x}: got {sum}");
        }
    }

    #[test]
    fn cdf_monotone() {
        let mut prev = norm_cdf(-4.0);
        let mut x = -4.0;
        while x < 4.0 {
            x += 0.25;
            let cur = norm_cdf(x);
            assert!(cur >= prev, "not monotone at {x}");
            prev = cur;
        }
    }

    #[test]
    fn erf_odd_function() {
        for x in [0.1, 0.7, 1.3, 2.5] {
            assert!((erf(x) + erf(-x)).abs() < 1e-12, "x = {x}");
        }
    }
}
