//! Single-boundary plug-in interface and the bundled reference engine.
//!
//! The single-boundary regimes are mature, well-served territory, so the
//! core delegates them through a narrow plug-in trait instead of carrying
//! its own machinery. A Barone-Adesi–Whaley quadratic approximation ships
//! as the default so the pricer works out of the box; callers with a
//! stronger engine swap it in through the same trait.

use ax_core::{
    errors::{Error, Result},
    MarketInputs, OptionType, Real,
};
use ax_math::distributions::{norm_cdf, norm_pdf};
use std::fmt;

use crate::european::{d1, european_value};

/// Convergence tolerance of the critical-price search, relative to strike.
const CRITICAL_PRICE_TOLERANCE: Real = 1e-8;

/// Iteration budget of the critical-price search.
const CRITICAL_PRICE_MAX_ITERATIONS: u32 = 100;

/// A single-boundary American pricer.
///
/// The core invokes it for the single-boundary regimes without further
/// knowledge of its internals.
pub trait SingleBoundaryEngine: fmt::Debug + Send + Sync {
    /// Price the American option described by `inputs`.
    fn price(&self, inputs: &MarketInputs) -> Result<Real>;
}

/// The Barone-Adesi & Whaley (1987) quadratic approximation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaroneAdesiWhaley;

impl SingleBoundaryEngine for BaroneAdesiWhaley {
    fn price(&self, inputs: &MarketInputs) -> Result<Real> {
        barone_adesi_whaley(inputs)
    }
}

/// Barone-Adesi–Whaley American option price.
///
/// European value plus `A·(S/S*)^λ`, where λ is the payoff-side root of
/// the quadratic `λ² + (n − 1)λ − m/h = 0` and S* the critical exercise
/// price; spot already past S* returns intrinsic value.
///
/// # Errors
/// [`NonConvergence`](Error::NonConvergence) if the critical-price search
/// exhausts its budget, [`NumericalBreakdown`](Error::NumericalBreakdown)
/// if its derivative vanishes; both carry the context of the search.
pub fn barone_adesi_whaley(inputs: &MarketInputs) -> Result<Real> {
    let spot = inputs.spot();
    let strike = inputs.strike();
    let r = inputs.rate();
    let q = inputs.dividend_yield();
    let sigma = inputs.volatility();
    let t = inputs.maturity();
    let phi = inputs.sign();

    let european = european_value(inputs.option_type(), spot, strike, r, q, sigma, t);

    let big_k = 1.0 - (-r * t).exp();
    if big_k.abs() < 1e-15 {
        // r = 0 degenerates the quadratic; the premium vanishes with it.
        return Ok(european);
    }

    let sigma2 = sigma * sigma;
    let m = 2.0 * r / sigma2;
    let n = 2.0 * (r - q) / sigma2;
    let disc = (n - 1.0) * (n - 1.0) + 4.0 * m / big_k;
    if disc < 0.0 {
        return Ok(european);
    }

    // The call premium rides the root above 1, the put premium the
    // negative root; anything else leaves no early-exercise channel.
    let exponent = 0.5 * (-(n - 1.0) + phi * disc.sqrt());
    let usable = match inputs.option_type() {
        OptionType::Call => exponent.is_finite() && exponent > 1.0,
        OptionType::Put => exponent.is_finite() && exponent < 0.0,
    };
    if !usable {
        return Ok(european);
    }

    let s_star =
        match critical_price(inputs.option_type(), strike, r, q, sigma, t, exponent)? {
            Some(s) => s,
            // The critical price escapes the admissible range (e.g. a call
            // on a vanishing dividend); the premium is negligible there.
            None => return Ok(european),
        };

    let exercised = match inputs.option_type() {
        OptionType::Call => spot >= s_star,
        OptionType::Put => spot <= s_star,
    };
    if exercised {
        return Ok(phi * (spot - strike));
    }

    let d1v = d1(s_star, strike, t, r, q, sigma);
    let coeff = phi * (s_star / exponent) * (1.0 - (-q * t).exp() * norm_cdf(phi * d1v));
    Ok(european + coeff * (spot / s_star).powf(exponent))
}

/// Newton search for the critical exercise price S* of the quadratic
/// approximation: the value-matching root of
///
/// `g(S) = φ(S − K) − V_E(S) − φ·(S/λ)·(1 − e^{−qT}Φ(φd₁(S)))`.
///
/// Seeded from the perpetual boundary `K/(1 − 2/λ)` pulled towards the
/// strike over short maturities; iterates stay clamped to the exercise
/// side of the strike. Returns `Ok(None)` when the objective does not
/// change sign over the admissible range (the boundary lies beyond it, so
/// there is no root to find).
fn critical_price(
    option_type: OptionType,
    strike: Real,
    r: Real,
    q: Real,
    sigma: Real,
    t: Real,
    exponent: Real,
) -> Result<Option<Real>> {
    let phi = option_type.sign();
    let sst = sigma * t.sqrt();
    let df_q = (-q * t).exp();

    let objective = |s: Real| {
        let value = european_value(option_type, s, strike, r, q, sigma, t);
        let d1v = d1(s, strike, t, r, q, sigma);
        let delta_term = df_q * norm_cdf(phi * d1v);
        let premium = phi * (s / exponent) * (1.0 - delta_term);
        phi * (s - strike) - value - premium
    };

    let (floor, cap) = match option_type {
        OptionType::Call => (strike * 1.001, strike * 100.0),
        OptionType::Put => (1e-10, strike * 0.999),
    };
    if objective(floor) * objective(cap) > 0.0 {
        return Ok(None);
    }

    let s_perp = strike / (1.0 - 2.0 / exponent);
    let seed = match option_type {
        OptionType::Call => {
            let decay = -((r - q) * t + 2.0 * sst) * strike / (s_perp - strike);
            strike + (s_perp - strike) * (1.0 - decay.exp())
        }
        OptionType::Put => {
            let decay = ((r - q) * t - 2.0 * sst) * strike / (strike - s_perp);
            s_perp + (strike - s_perp) * decay.exp()
        }
    };
    let mut s = if seed.is_finite() { seed } else { strike };
    s = s.clamp(floor, cap);

    for _ in 0..CRITICAL_PRICE_MAX_ITERATIONS {
        let g = objective(s);
        if g.abs() < CRITICAL_PRICE_TOLERANCE * strike {
            return Ok(Some(s));
        }

        let d1v = d1(s, strike, t, r, q, sigma);
        let delta_term = df_q * norm_cdf(phi * d1v);
        let dpremium = (phi / exponent) * (1.0 - delta_term)
            - df_q * norm_pdf(d1v) / (exponent * sst);
        let gp = phi - phi * delta_term - dpremium;
        if gp.abs() < f64::EPSILON {
            return Err(Error::NumericalBreakdown {
                message: format!("critical-price derivative vanished at {s}"),
                last_iterate: Some(s),
            });
        }

        s = (s - g / gp).clamp(floor, cap);
    }

    Err(Error::NonConvergence {
        iterations: CRITICAL_PRICE_MAX_ITERATIONS,
        message: format!("critical-price search stalled at {s} for strike {strike}"),
    })
}
