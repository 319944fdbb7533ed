//! FP-B' boundary refinement.
//!
//! Takes the QD+ seed pair and iterates the stabilized double-boundary
//! fixed point on a grid of collocation points in time-to-maturity. Each
//! iteration runs two passes: the upper curve is updated first at every
//! node from previous-iteration values, then the lower curve is updated
//! reading the *just-computed* upper curve together with a symmetry term in
//! the numerator and a simplified denominator. That asymmetry is
//! load-bearing: a symmetric update oscillates at long maturities.
//!
//! After each iteration the node pairs are scanned for ordering violations.
//! Violating pairs are merged so every returned pair stays ordered, and the
//! crossing time tₛ is the *earliest* calendar node at which a violation
//! occurs; nodes with less time-to-maturity than T − tₛ carry a single
//! merged value from then on.

use ax_core::{
    ensure,
    errors::Result,
    MarketInputs, OptionType, Real, Size, Time,
};
use ax_math::distributions::norm_cdf;
use ax_math::integrals::{Integrator, SegmentIntegral};
use ax_math::interpolation::LinearInterpolation;
use std::fmt;

use crate::european::{d1, d2};

/// Default number of collocation points.
pub const DEFAULT_COLLOCATION_POINTS: Size = 50;

/// Default number of midpoint sub-intervals inside the FP-B' integrals.
pub const DEFAULT_QUADRATURE_INTERVALS: Size = 64;

/// Iteration budget for the fixed point.
pub const MAX_REFINEMENT_ITERATIONS: u32 = 32;

/// Relative-change tolerance for convergence.
pub const REFINEMENT_TOLERANCE: Real = 1e-6;

/// Which computational path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Closed-form European value (no early exercise).
    European,
    /// Delegated to the single-boundary plug-in engine.
    SingleBoundary,
    /// Near-expiry analytic branch.
    NearExpiry,
    /// QD+ seeds used without refinement.
    QdPlus,
    /// Full FP-B' refinement.
    FpBPrime,
}

impl Method {
    /// Stable tag string for diagnostics and detailed results.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::European => "european",
            Method::SingleBoundary => "single-boundary",
            Method::NearExpiry => "near-expiry",
            Method::QdPlus => "qd-plus",
            Method::FpBPrime => "fp-b-prime",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A boundary curve discretized on `m` equispaced time-to-maturity nodes
/// `τ_i = i·T/(m−1)`, from expiry (`τ = 0`) to the full maturity.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCurve {
    maturity: Time,
    values: Vec<Real>,
}

impl BoundaryCurve {
    /// Build a curve from node values ordered by ascending τ.
    pub fn from_values(maturity: Time, values: Vec<Real>) -> Self {
        debug_assert!(values.len() >= 2);
        Self { maturity, values }
    }

    /// A constant curve.
    pub fn constant(maturity: Time, nodes: Size, value: Real) -> Self {
        Self {
            maturity,
            values: vec![value; nodes],
        }
    }

    /// Number of collocation nodes.
    pub fn nodes(&self) -> Size {
        self.values.len()
    }

    /// Node values ordered by ascending τ.
    pub fn values(&self) -> &[Real] {
        &self.values
    }

    /// The τ-grid the values live on.
    pub fn taus(&self) -> Vec<Real> {
        let m = self.values.len();
        (0..m)
            .map(|i| i as Real * self.maturity / (m - 1) as Real)
            .collect()
    }

    /// Boundary level at expiry (τ = 0).
    pub fn at_expiry(&self) -> Real {
        self.values[0]
    }

    /// Boundary level at the full maturity (τ = T).
    pub fn at_maturity(&self) -> Real {
        self.values[self.values.len() - 1]
    }

    /// Linear interpolation in τ, clamped at both ends of the grid.
    pub fn value_at(&self, tau: Time) -> Real {
        let m = self.values.len();
        let dt = self.maturity / (m - 1) as Real;
        let pos = (tau.clamp(0.0, self.maturity)) / dt;
        let i = (pos.floor() as Size).min(m - 2);
        let w = pos - i as Real;
        self.values[i] * (1.0 - w) + self.values[i + 1] * w
    }
}

/// The outcome of a boundary computation.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryResult {
    /// The upper boundary curve.
    pub upper: BoundaryCurve,
    /// The lower boundary curve.
    pub lower: BoundaryCurve,
    /// The crossing (collapse) time in calendar years; 0 = none detected.
    /// When positive, the two curves carry one merged value at every node
    /// with time-to-maturity below `T − crossing_time`.
    pub crossing_time: Time,
    /// Which computational path produced the curves.
    pub method: Method,
    /// Fixed-point iterations used (0 when no iteration ran).
    pub iterations: u32,
    /// Whether the final residual met tolerance.
    pub converged: bool,
    /// The final relative-change residual Δ.
    pub max_residual: Real,
}

/// Configuration of the FP-B' refinement.
#[derive(Debug, Clone)]
pub struct RefinerConfig {
    /// Number of collocation points `m`.
    pub collocation_points: Size,
    /// Midpoint sub-intervals for the inner integrals.
    pub quadrature_intervals: Size,
    /// Iteration budget.
    pub max_iterations: u32,
    /// Relative-change tolerance.
    pub tolerance: Real,
}

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            collocation_points: DEFAULT_COLLOCATION_POINTS,
            quadrature_intervals: DEFAULT_QUADRATURE_INTERVALS,
            max_iterations: MAX_REFINEMENT_ITERATIONS,
            tolerance: REFINEMENT_TOLERANCE,
        }
    }
}

struct NodeTerms {
    n: Real,
    d: Real,
    i_d: Real,
}

/// Refine the seed pair into the full boundary curves.
///
/// A non-converged iteration is *not* an error: the curves are still
/// returned with `converged = false` and the final residual recorded, and
/// the caller decides what to do with the best-effort result.
pub fn refine(
    inputs: &MarketInputs,
    seed_upper: Real,
    seed_lower: Real,
    config: &RefinerConfig,
) -> Result<BoundaryResult> {
    let m = config.collocation_points;
    ensure!(m >= 2, "collocation_points", "need at least 2 nodes, got {m}");
    ensure!(
        config.quadrature_intervals >= 1,
        "quadrature_intervals",
        "need at least 1 sub-interval, got {}",
        config.quadrature_intervals
    );
    ensure!(
        config.max_iterations >= 1,
        "max_iterations",
        "need at least 1 iteration, got {}",
        config.max_iterations
    );

    let t_total = inputs.maturity();
    let k = inputs.strike();
    let taus: Vec<Real> = (0..m)
        .map(|i| i as Real * t_total / (m - 1) as Real)
        .collect();
    let quad = SegmentIntegral::new(config.quadrature_intervals);

    let mut upper = vec![seed_upper; m];
    let mut lower = vec![seed_lower; m];
    let (upper_expiry, lower_expiry) = expiry_pair(inputs, seed_upper);
    upper[0] = upper_expiry;
    lower[0] = lower_expiry;

    let mut crossing_time: Time = 0.0;
    let mut residual = Real::MAX;
    let mut converged = false;
    let mut iterations = 0;

    for iteration in 0..config.max_iterations {
        iterations = iteration + 1;

        // Pass 1: upper curve from previous-iteration values.
        let u_prev = LinearInterpolation::new(&taus, &upper)?;
        let l_prev = LinearInterpolation::new(&taus, &lower)?;
        let mut upper_new = upper.clone();
        for j in 1..m {
            let tau = taus[j];
            if crossing_time > 0.0 && tau < t_total - crossing_time {
                upper_new[j] = upper[j].min(lower[j]);
                continue;
            }
            let x = upper[j];
            let terms = node_terms(inputs, tau, x, &u_prev, &l_prev, &quad)?;
            upper_new[j] = accept_update(inputs, x, k * terms.n / terms.d, terms.d, true);
        }

        // Pass 2: lower curve, reading the just-computed upper curve.
        let u_new = LinearInterpolation::new(&taus, &upper_new)?;
        let mut lower_new = lower.clone();
        for j in 1..m {
            let tau = taus[j];
            if crossing_time > 0.0 && tau < t_total - crossing_time {
                lower_new[j] = upper[j].min(lower[j]);
                continue;
            }
            let y = lower[j];
            let terms = node_terms(inputs, tau, y, &u_new, &l_prev, &quad)?;
            let n_prime = terms.n + (y / k) * terms.i_d;
            let d_prime = terms.d + terms.i_d;
            lower_new[j] = accept_update(inputs, y, k * n_prime / d_prime, d_prime, false);
        }

        // tₛ is recomputed from scratch each iteration, so a node pair that
        // separates again on a later iteration releases the collapse zone
        // one node at a time.
        crossing_time = detect_crossing(&taus, t_total, &mut upper_new, &mut lower_new);

        let mut delta: Real = 0.0;
        for j in 0..m {
            let du = (upper_new[j] - upper[j]).abs() / upper[j].max(1e-10);
            let dl = (lower_new[j] - lower[j]).abs() / lower[j].max(1e-10);
            delta = delta.max(du).max(dl);
        }

        upper = upper_new;
        lower = lower_new;
        residual = delta;
        if delta < config.tolerance {
            converged = true;
            break;
        }
    }

    // The returned curves honor the collapse zone: one value per node with
    // time-to-maturity below T − tₛ.
    enforce_collapse(&taus, t_total, crossing_time, &mut upper, &mut lower);

    Ok(BoundaryResult {
        upper: BoundaryCurve::from_values(t_total, upper),
        lower: BoundaryCurve::from_values(t_total, lower),
        crossing_time,
        method: Method::FpBPrime,
        iterations,
        converged,
        max_residual: residual,
    })
}

/// Analytic boundary values at the expiry node (τ = 0), where the raw
/// update degenerates (both discount factors are 1 and the Φ terms
/// saturate).
fn expiry_pair(inputs: &MarketInputs, seed_upper: Real) -> (Real, Real) {
    let k = inputs.strike();
    let r = inputs.rate();
    let q = inputs.dividend_yield();
    match inputs.option_type() {
        OptionType::Put => {
            // Exercise region collapses to (K·r/q, K) under q < r < 0.
            let lower = if r < 0.0 && q < 0.0 {
                k * (r / q).clamp(0.0, 1.0)
            } else {
                0.0
            };
            (k, lower)
        }
        OptionType::Call => {
            // Mirror: (K, K·r/q) under r < q < 0; unbounded above otherwise.
            let upper = if r < 0.0 && q < 0.0 {
                k * (r / q).max(1.0)
            } else {
                seed_upper.max(k)
            };
            (upper, k)
        }
    }
}

/// Scan the node pairs for ordering violations. Every violating pair is
/// merged to its smaller value, and the returned crossing time is the
/// *earliest* calendar time `t_i = T − τ_i` among the violating nodes
/// (0 when none violate).
fn detect_crossing(
    taus: &[Real],
    t_total: Time,
    upper: &mut [Real],
    lower: &mut [Real],
) -> Time {
    let mut crossing: Time = 0.0;
    let mut found = false;
    for j in 0..taus.len() {
        if upper[j] <= lower[j] {
            let t_cal = t_total - taus[j];
            if !found || t_cal < crossing {
                crossing = t_cal;
            }
            found = true;
            let merged = upper[j].min(lower[j]);
            upper[j] = merged;
            lower[j] = merged;
        }
    }
    if found {
        crossing
    } else {
        0.0
    }
}

/// Enforce the collapse zone implied by a crossing at calendar time
/// `crossing`: every node with time-to-maturity below `T − crossing`
/// carries one merged value. A crossing of 0 means none was detected and
/// leaves the curves untouched.
fn enforce_collapse(
    taus: &[Real],
    t_total: Time,
    crossing: Time,
    upper: &mut [Real],
    lower: &mut [Real],
) {
    if crossing <= 0.0 {
        return;
    }
    let tau_s = t_total - crossing;
    for j in 0..taus.len() {
        if taus[j] < tau_s {
            let merged = upper[j].min(lower[j]);
            upper[j] = merged;
            lower[j] = merged;
        }
    }
}

/// Accept or reject a candidate node update. Non-finite candidates and
/// vanishing denominators keep the previous value; accepted values are
/// clamped to the economically admissible range.
fn accept_update(
    inputs: &MarketInputs,
    previous: Real,
    candidate: Real,
    denominator: Real,
    is_upper: bool,
) -> Real {
    if !candidate.is_finite() || denominator.abs() < 1e-12 {
        return previous;
    }
    let k = inputs.strike();
    match inputs.option_type() {
        OptionType::Put => {
            if is_upper {
                candidate.clamp(1e-10 * k, k)
            } else {
                candidate.clamp(0.0, k)
            }
        }
        OptionType::Call => candidate.max(k),
    }
}

fn node_terms(
    inputs: &MarketInputs,
    tau: Time,
    x: Real,
    u: &LinearInterpolation,
    l: &LinearInterpolation,
    quad: &SegmentIntegral,
) -> Result<NodeTerms> {
    let k = inputs.strike();
    let r = inputs.rate();
    let q = inputs.dividend_yield();
    let sigma = inputs.volatility();
    let phi = inputs.sign();

    let n_tau = 1.0 - (-r * tau).exp() * norm_cdf(phi * d2(x, k, tau, r, q, sigma));
    let d_tau = 1.0 - (-q * tau).exp() * norm_cdf(phi * d1(x, k, tau, r, q, sigma));

    // The brackets are in-region probabilities P(l(s) < S < u(s)), the same
    // for both payoffs.
    let i_n = quad.integrate(
        |s| {
            let elapsed = tau - s;
            let ub = u.value_clamped(s);
            let lb = l.value_clamped(s);
            r * (-r * elapsed).exp()
                * (norm_cdf(-d2(x, ub, elapsed, r, q, sigma))
                    - norm_cdf(-d2(x, lb, elapsed, r, q, sigma)))
        },
        0.0,
        tau,
    )?;
    let i_d = quad.integrate(
        |s| {
            let elapsed = tau - s;
            let ub = u.value_clamped(s);
            let lb = l.value_clamped(s);
            q * (-q * elapsed).exp()
                * (norm_cdf(-d1(x, ub, elapsed, r, q, sigma))
                    - norm_cdf(-d1(x, lb, elapsed, r, q, sigma)))
        },
        0.0,
        tau,
    )?;

    Ok(NodeTerms {
        n: n_tau - i_n,
        d: d_tau - i_d,
        i_d,
    })
}
