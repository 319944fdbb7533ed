//! Analytic European option pricing (Black-Scholes-Merton).
//!
//! The closed form is used three ways in this workspace: directly as the
//! price in the no-early-exercise regime, as the base value of the
//! early-exercise decomposition, and (value and theta at the candidate
//! boundary point) inside the QD+ boundary equation.

use ax_core::{OptionType, Real, Time};
use ax_math::distributions::{norm_cdf, norm_pdf};

/// Time-to-expiry below which d₁/d₂ are replaced by a ±10 sentinel.
const DEGENERATE_EXPIRY: Time = 1e-10;

/// `d₁ = [ln(S/K) + (r − q + σ²/2)τ] / (σ√τ)`.
///
/// For τ < 10⁻¹⁰ returns ±10 by the sign of S − K, a sentinel that
/// saturates Φ in either direction at degenerate expiry.
pub fn d1(s: Real, k: Real, tau: Time, r: Real, q: Real, sigma: Real) -> Real {
    if tau < DEGENERATE_EXPIRY {
        return if s >= k { 10.0 } else { -10.0 };
    }
    ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * tau) / (sigma * tau.sqrt())
}

/// `d₂ = d₁ − σ√τ`, with the same degenerate-expiry sentinel as [`d1`].
pub fn d2(s: Real, k: Real, tau: Time, r: Real, q: Real, sigma: Real) -> Real {
    if tau < DEGENERATE_EXPIRY {
        return if s >= k { 10.0 } else { -10.0 };
    }
    d1(s, k, tau, r, q, sigma) - sigma * tau.sqrt()
}

/// Compute Black-Scholes-Merton price and Greeks for a European option.
///
/// Returns `(price, delta, gamma, vega, theta, rho)`.
#[allow(clippy::too_many_arguments)]
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    dividend_yield: Real,
    volatility: Real,
    time_to_expiry: Time,
) -> (Real, Real, Real, Real, Real, Real) {
    let phi = option_type.sign();
    let t = time_to_expiry;

    if t < DEGENERATE_EXPIRY {
        let intrinsic = (phi * (spot - strike)).max(0.0);
        return (intrinsic, 0.0, 0.0, 0.0, 0.0, 0.0);
    }

    let r = risk_free_rate;
    let q = dividend_yield;
    let sigma = volatility;
    let sqrt_t = t.sqrt();
    let std_dev = sigma * sqrt_t;
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();

    let d1v = d1(spot, strike, t, r, q, sigma);
    let d2v = d2(spot, strike, t, r, q, sigma);

    let nd1 = norm_cdf(phi * d1v);
    let nd2 = norm_cdf(phi * d2v);
    let npd1 = norm_pdf(d1v);

    let price = phi * (spot * df_q * nd1 - strike * df_r * nd2);
    let delta = phi * df_q * nd1;
    let gamma = df_q * npd1 / (spot * std_dev);
    // Vega per 1.0 absolute vol, not per 1%
    let vega = spot * df_q * npd1 * sqrt_t;
    // Theta per year
    let theta = {
        let term1 = -(spot * df_q * npd1 * sigma) / (2.0 * sqrt_t);
        let term2 = -phi * r * strike * df_r * nd2;
        let term3 = phi * q * spot * df_q * nd1;
        term1 + term2 + term3
    };
    // Rho per 1.0 rate shift
    let rho = phi * strike * t * df_r * nd2;

    (price, delta, gamma, vega, theta, rho)
}

/// European option value.
#[allow(clippy::too_many_arguments)]
pub fn european_value(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    dividend_yield: Real,
    volatility: Real,
    time_to_expiry: Time,
) -> Real {
    black_scholes_merton(
        option_type,
        spot,
        strike,
        risk_free_rate,
        dividend_yield,
        volatility,
        time_to_expiry,
    )
    .0
}

/// European option theta (per year).
#[allow(clippy::too_many_arguments)]
pub fn european_theta(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    dividend_yield: Real,
    volatility: Real,
    time_to_expiry: Time,
) -> Real {
    black_scholes_merton(
        option_type,
        spot,
        strike,
        risk_free_rate,
        dividend_yield,
        volatility,
        time_to_expiry,
    )
    .4
}
