//! 1D root-finding solvers.

use ax_core::{
    errors::{Error, Result},
    Real,
};

const MAX_ITERATIONS: u32 = 100;

/// The Super-Halley factor degenerates when L_f approaches 1; below this
/// distance the step falls back to plain Newton.
const NEWTON_FALLBACK_THRESHOLD: Real = 1e-12;

// ── Brent ─────────────────────────────────────────────────────────────────────

/// Brent's method for finding a root of `f(x)` in `[x_min, x_max]`.
///
/// Combines bisection, secant, and inverse quadratic interpolation.
/// Requires `f(x_min)` and `f(x_max)` to have opposite signs.
pub fn brent<F>(f: F, x_min: Real, x_max: Real, accuracy: Real) -> Result<Real>
where
    F: Fn(Real) -> Real,
{
    let mut a = x_min;
    let mut b = x_max;
    let mut fa = f(a);
    let mut fb = f(b);

    if fa * fb > 0.0 {
        return Err(Error::InvalidInput {
            parameter: "bracket",
            message: format!("f({a}) and f({b}) must have opposite signs"),
        });
    }
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..MAX_ITERATIONS {
        if fb * fc > 0.0 {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }
        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * accuracy;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }
        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (p, q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };
            if 2.0 * p < (3.0 * xm * q - (tol * q).abs()) && 2.0 * p < (e * q).abs() {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }
        a = b;
        fa = fb;
        b += if d.abs() > tol {
            d
        } else if xm > 0.0 {
            tol
        } else {
            -tol
        };
        fb = f(b);
    }
    Err(Error::NonConvergence {
        iterations: MAX_ITERATIONS,
        message: "Brent solver: maximum iterations reached".into(),
    })
}

// ── Super-Halley ──────────────────────────────────────────────────────────────

/// Damped Super-Halley iteration with a plain-Newton fallback.
///
/// The step is `(1 + ½·L_f / (1 − L_f)) · f/f′` with `L_f = f·f″/(f′)²`;
/// when `|1 − L_f|` falls below 10⁻¹² the factor blows up and a plain
/// Newton step is taken instead. Iterates are clamped to
/// `[x_min, x_max]`; a step that would leave the bracket is damped to
/// half a Newton step first. Exits on `|f| < accuracy`.
pub fn super_halley<F>(
    f_df_d2f: F,
    x0: Real,
    x_min: Real,
    x_max: Real,
    accuracy: Real,
) -> Result<Real>
where
    F: Fn(Real) -> (Real, Real, Real),
{
    let mut x = x0.clamp(x_min, x_max);

    for _ in 0..MAX_ITERATIONS {
        let (fx, dfx, d2fx) = f_df_d2f(x);
        if !fx.is_finite() {
            return Err(Error::NumericalBreakdown {
                message: format!("objective is not finite at {x}"),
                last_iterate: Some(x),
            });
        }
        if fx.abs() < accuracy {
            return Ok(x);
        }
        if dfx.abs() < f64::EPSILON {
            return Err(Error::NumericalBreakdown {
                message: format!("derivative vanished at {x}"),
                last_iterate: Some(x),
            });
        }

        let newton_step = fx / dfx;
        let lf = fx * d2fx / (dfx * dfx);
        let step = if (1.0 - lf).abs() < NEWTON_FALLBACK_THRESHOLD {
            newton_step
        } else {
            (1.0 + 0.5 * lf / (1.0 - lf)) * newton_step
        };

        let mut next = x - step;
        if !next.is_finite() || next < x_min || next > x_max {
            next = x - 0.5 * newton_step;
        }
        next = next.clamp(x_min, x_max);

        if (next - x).abs() < 1e-14 * x.abs().max(1.0) {
            return Ok(next);
        }
        x = next;
    }
    Err(Error::NonConvergence {
        iterations: MAX_ITERATIONS,
        message: format!("Super-Halley solver stalled at {x}"),
    })
}
