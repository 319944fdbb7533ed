//! QD+ boundary approximation.
//!
//! Produces the initial estimate of the early-exercise boundary pair at a
//! given time-to-maturity by solving the boundary equation
//! `S^λ − K^λ·exp(c₀(S)) = 0`, where λ is a root of the characteristic
//! quadratic `λ² + (β − 1)λ − 2αβ/h = 0` and `c₀` collects the European
//! theta and the intrinsic excess at the candidate point. The smaller root
//! seeds the upper boundary, the larger the lower one.
//!
//! Everything here is a *seed*: roots that converge to the trivial strike
//! root or run away from their initial guess are rejected, ill-ordered
//! pairs fall back to a volatility-scaled pair, and the refiner does the
//! rest.

use ax_core::{errors::Result, fail, MarketInputs, OptionType, Real, Time};
use ax_math::solvers1d::{brent, super_halley};

use crate::european::black_scholes_merton;

/// Relative distance to the strike below which a converged root is treated
/// as the trivial `S = K` solution and rejected.
const STRIKE_REJECTION_BAND: Real = 0.05;

/// A converged root farther than this fraction of the initial guess from
/// the guess is treated as a runaway iterate and rejected.
const RUNAWAY_REJECTION_FACTOR: Real = 0.5;

/// Below this |h| the characteristic quadratic and c₀ are singular and the
/// analytic vol-scaled pair is returned instead.
const SINGULAR_H: Real = 1e-12;

/// Upper and lower boundary estimates at a fixed time-to-maturity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QdPlusSeeds {
    /// The upper boundary estimate (closer to the strike for puts).
    pub upper: Real,
    /// The lower boundary estimate.
    pub lower: Real,
}

/// Roots of the characteristic quadratic `λ² + (β − 1)λ − 2αβ/h = 0`,
/// returned as `(smaller, larger)`. `None` when the discriminant is
/// negative (no real roots).
pub fn lambda_roots(alpha: Real, beta: Real, h: Real) -> Option<(Real, Real)> {
    let disc = (beta - 1.0) * (beta - 1.0) + 8.0 * alpha * beta / h;
    if !disc.is_finite() || disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let small = 0.5 * (-(beta - 1.0) - sqrt_disc);
    let large = 0.5 * (-(beta - 1.0) + sqrt_disc);
    Some((small, large))
}

/// Compute the QD+ boundary pair at time-to-maturity `tau`.
///
/// # Errors
/// [`NumericalBreakdown`](ax_core::errors::Error::NumericalBreakdown) if
/// the final pair is not finite — the fallback ladder makes this
/// unreachable for admissible inputs.
pub fn boundary_seeds(inputs: &MarketInputs, tau: Time) -> Result<QdPlusSeeds> {
    let k = inputs.strike();
    let r = inputs.rate();
    let q = inputs.dividend_yield();
    let sigma = inputs.volatility();

    let h = 1.0 - (-r * tau).exp();
    let sigma2 = sigma * sigma;
    let alpha = 2.0 * r / sigma2;
    let beta = 2.0 * (r - q) / sigma2;

    let (mut upper, mut lower) = match lambda_roots(alpha, beta, h) {
        Some((lambda_small, lambda_large)) if h.abs() >= SINGULAR_H => {
            let (guess_upper, guess_lower) = initial_guesses(inputs);
            let upper = solve_boundary(inputs, tau, lambda_small, guess_upper);
            let lower = solve_boundary(inputs, tau, lambda_large, guess_lower);
            (upper, lower)
        }
        // Near-expiry (or r ≈ 0) the quadratic is singular; use the
        // analytic approximation directly.
        _ => vol_scaled_pair(inputs, tau),
    };

    // Economic constraints.
    match inputs.option_type() {
        OptionType::Put => {
            upper = upper.min(k);
            lower = lower.max(0.0);
        }
        OptionType::Call => {
            upper = upper.max(k);
            lower = lower.max(k);
        }
    }

    // An ill-ordered pair carries no information; fall back.
    if lower >= upper {
        let pair = vol_scaled_pair(inputs, tau);
        upper = pair.0;
        lower = pair.1;
    }

    if !upper.is_finite() || !lower.is_finite() || upper <= 0.0 {
        fail!("QD+ produced a non-finite boundary pair ({upper}, {lower})");
    }
    Ok(QdPlusSeeds { upper, lower })
}

/// Initial guesses `(upper, lower)` for the two boundary solves.
fn initial_guesses(inputs: &MarketInputs) -> (Real, Real) {
    let k = inputs.strike();
    let r = inputs.rate();
    let q = inputs.dividend_yield();
    match inputs.option_type() {
        OptionType::Put => {
            let upper = 0.95 * k;
            // The lower boundary approaches the perpetual asymptote rK/q.
            let lower = if r < 0.0 && q < 0.0 {
                k * (r / q) * 0.9
            } else {
                0.5 * k
            };
            (upper, lower)
        }
        OptionType::Call => {
            let upper = if r > 0.0 && q > 0.0 {
                k * (r / q) * 1.1
            } else {
                1.5 * k
            };
            (upper, 1.05 * k)
        }
    }
}

/// Analytic volatility-scaled boundary pair, used near expiry where the
/// QD+ asymptotics are singular and as the fallback for ill-ordered or
/// rejected solves.
fn vol_scaled_pair(inputs: &MarketInputs, tau: Time) -> (Real, Real) {
    let k = inputs.strike();
    let z = (inputs.volatility() * tau.sqrt()).min(1.0);
    match inputs.option_type() {
        OptionType::Put => (k * (1.0 - 0.2 * z), k * (0.5 + 0.1 * z)),
        OptionType::Call => (k * (1.5 - 0.1 * z), k * (1.0 + 0.2 * z)),
    }
}

/// Solve the boundary equation for one λ root, with rejection of spurious
/// solutions. Always returns a usable value: rejected or failed solves
/// yield the initial guess.
fn solve_boundary(inputs: &MarketInputs, tau: Time, lambda: Real, guess: Real) -> Real {
    let k = inputs.strike();
    let lo = 0.01 * k;
    let hi = 3.0 * k;

    let f = |s: Real| boundary_objective(inputs, tau, lambda, s);
    let fd = |s: Real| {
        let step = (1e-5 * s.abs()).max(1e-7 * k);
        let f0 = f(s);
        let fp = f(s + step);
        let fm = f(s - step);
        (
            f0,
            (fp - fm) / (2.0 * step),
            (fp - 2.0 * f0 + fm) / (step * step),
        )
    };

    // The objective lives on the scale of (S/K)^λ, which grows without
    // bound for negative λ; the exit tolerance must follow it.
    let scale = if lambda < 0.0 {
        (guess / k).powf(lambda).abs().max(1.0)
    } else {
        1.0
    };
    let tol = 1e-9 * scale;

    let root = match super_halley(fd, guess, lo, hi, tol) {
        Ok(root) => root,
        Err(_) => match brent(&f, lo, hi, tol) {
            Ok(root) => root,
            Err(_) => return guess,
        },
    };

    // The equation has a trivial root at S = K and divergent iterates far
    // from the true boundary; both carry no information.
    if (root - k).abs() / k < STRIKE_REJECTION_BAND
        || (root - guess).abs() > RUNAWAY_REJECTION_FACTOR * guess
    {
        return guess;
    }
    root
}

/// The boundary equation in ratio form: `(S/K)^λ − exp(c₀(S))`.
fn boundary_objective(inputs: &MarketInputs, tau: Time, lambda: Real, s: Real) -> Real {
    let k = inputs.strike();
    let r = inputs.rate();
    let q = inputs.dividend_yield();
    let sigma = inputs.volatility();
    let phi = inputs.sign();

    let h = 1.0 - (-r * tau).exp();
    let sigma2 = sigma * sigma;
    let alpha = 2.0 * r / sigma2;

    let (value, .., theta, _) =
        black_scholes_merton(inputs.option_type(), s, k, r, q, sigma, tau);
    let intrinsic_excess = phi * (s - k) - value;

    let beta = 2.0 * (r - q) / sigma2;
    let denom = 2.0 * lambda + beta - 1.0;

    let mut c0 = 0.0;
    if denom.abs() > 1e-12 && h.abs() > SINGULAR_H {
        let mut correction = 1.0 / h;
        if r.abs() > 1e-12 && intrinsic_excess.abs() > 1e-12 * k {
            correction += theta * (r * tau).exp() / (r * intrinsic_excess);
        }
        c0 = -((1.0 - h) * alpha / denom) * correction;
    }
    // exp would overflow long before the root matters
    let c0 = c0.clamp(-60.0, 60.0);

    (s / k).powf(lambda) - c0.exp()
}
