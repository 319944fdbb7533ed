//! The American option pricer.
//!
//! Orchestrates regime analysis, the QD+ seed, FP-B' refinement, and the
//! early-exercise-premium decomposition. A pricing call is a deterministic
//! pure function of its `MarketInputs`; the only heap allocations are the
//! boundary arrays scoped to the call.

use ax_core::{
    ensure,
    errors::{Error, Result},
    MarketInputs, OptionType, Real, Size, Time,
};
use ax_math::distributions::norm_cdf;
use ax_math::integrals::{Integrator, SegmentIntegral};

use crate::european::{d1, d2, european_value};
use crate::fpb::{self, BoundaryCurve, BoundaryResult, Method, RefinerConfig};
use crate::qdplus;
use crate::regime::{self, Regime, DEFAULT_HYSTERESIS};
use crate::single_boundary::{BaroneAdesiWhaley, SingleBoundaryEngine};

/// Maturities below three trading days go through the analytic near-expiry
/// branch; the QD+ asymptotics are unreliable there.
pub const NEAR_EXPIRY_THRESHOLD: Time = 3.0 / 252.0;

/// Default midpoint sub-intervals for the premium integral.
pub const DEFAULT_PREMIUM_INTERVALS: Size = 50;

/// Everything a caller can inspect about one pricing call.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingDetails {
    /// The American option price.
    pub price: Real,
    /// The exercise regime the inputs were classified into.
    pub regime: Regime,
    /// Which computational path produced the price.
    pub method: Method,
    /// Upper boundary at τ = T, when boundaries were computed.
    pub upper_boundary_at_maturity: Option<Real>,
    /// Lower boundary at τ = T, when boundaries were computed.
    pub lower_boundary_at_maturity: Option<Real>,
    /// Boundary crossing time in calendar years; 0 = none detected.
    pub crossing_time: Time,
    /// Fixed-point iterations used.
    pub iterations: u32,
    /// Final relative-change residual of the refinement.
    pub max_residual: Real,
    /// Whether the refinement met tolerance (true when none ran).
    pub converged: bool,
    /// Full upper boundary path by ascending τ, when computed.
    pub upper_path: Option<Vec<Real>>,
    /// Full lower boundary path by ascending τ, when computed.
    pub lower_path: Option<Vec<Real>>,
}

/// American vanilla option pricer.
///
/// Double-boundary regimes are priced in-house via QD+ seeding and FP-B'
/// refinement; single-boundary regimes are delegated to the configured
/// [`SingleBoundaryEngine`] plug-in; the no-exercise regime collapses to
/// the European closed form.
#[derive(Debug)]
pub struct AmericanOptionPricer {
    collocation_points: Size,
    use_refinement: bool,
    hysteresis: Real,
    premium_intervals: Size,
    refiner_intervals: Size,
    single_boundary: Box<dyn SingleBoundaryEngine>,
}

impl Default for AmericanOptionPricer {
    fn default() -> Self {
        Self {
            collocation_points: fpb::DEFAULT_COLLOCATION_POINTS,
            use_refinement: true,
            hysteresis: DEFAULT_HYSTERESIS,
            premium_intervals: DEFAULT_PREMIUM_INTERVALS,
            refiner_intervals: fpb::DEFAULT_QUADRATURE_INTERVALS,
            single_boundary: Box::new(BaroneAdesiWhaley),
        }
    }
}

impl AmericanOptionPricer {
    /// A pricer with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of collocation points (must lie in [8, 256]).
    pub fn with_collocation_points(mut self, points: Size) -> Result<Self> {
        ensure!(
            (8..=256).contains(&points),
            "collocation_points",
            "must lie in [8, 256], got {points}"
        );
        self.collocation_points = points;
        Ok(self)
    }

    /// Enable or disable FP-B' refinement (seeds are used as-is when off).
    pub fn with_refinement(mut self, enabled: bool) -> Self {
        self.use_refinement = enabled;
        self
    }

    /// Set the hysteresis half-width for regime classification.
    pub fn with_hysteresis(mut self, epsilon: Real) -> Result<Self> {
        ensure!(
            epsilon.is_finite() && epsilon >= 0.0,
            "hysteresis",
            "must be finite and non-negative, got {epsilon}"
        );
        self.hysteresis = epsilon;
        Ok(self)
    }

    /// Set the midpoint sub-intervals of the premium integral.
    pub fn with_premium_intervals(mut self, intervals: Size) -> Result<Self> {
        ensure!(
            intervals >= 1,
            "premium_intervals",
            "must be at least 1, got {intervals}"
        );
        self.premium_intervals = intervals;
        Ok(self)
    }

    /// Set the midpoint sub-intervals of the FP-B' integrals.
    pub fn with_refiner_intervals(mut self, intervals: Size) -> Result<Self> {
        ensure!(
            intervals >= 1,
            "refiner_intervals",
            "must be at least 1, got {intervals}"
        );
        self.refiner_intervals = intervals;
        Ok(self)
    }

    /// Replace the single-boundary plug-in engine.
    pub fn with_single_boundary_engine(mut self, engine: Box<dyn SingleBoundaryEngine>) -> Self {
        self.single_boundary = engine;
        self
    }

    /// Price the option.
    pub fn price(&self, inputs: &MarketInputs) -> Result<Real> {
        Ok(self.price_with_details(inputs)?.price)
    }

    /// Price the option and expose the boundary diagnostics.
    pub fn price_with_details(&self, inputs: &MarketInputs) -> Result<PricingDetails> {
        let regime = regime::classify(
            inputs.rate(),
            inputs.dividend_yield(),
            inputs.volatility(),
            inputs.option_type(),
            self.hysteresis,
        );
        match regime {
            Regime::NoEarlyExercise => Ok(european_details(inputs, regime)),
            Regime::SingleBoundaryPositive | Regime::SingleBoundaryNegativeDividend => {
                let price = self
                    .single_boundary
                    .price(inputs)
                    .map_err(|e| attach_regime(e, regime))?;
                Ok(flat_details(
                    price.max(inputs.intrinsic_value()),
                    regime,
                    Method::SingleBoundary,
                ))
            }
            Regime::DoubleBoundaryNegativeRates | Regime::DoubleBoundaryPositiveRatesCall => self
                .price_double_boundary(inputs, regime)
                .map_err(|e| attach_regime(e, regime)),
        }
    }

    fn price_double_boundary(
        &self,
        inputs: &MarketInputs,
        regime: Regime,
    ) -> Result<PricingDetails> {
        let t_total = inputs.maturity();
        if t_total < NEAR_EXPIRY_THRESHOLD {
            return Ok(self.near_expiry_details(inputs, regime));
        }

        let seeds = qdplus::boundary_seeds(inputs, t_total)?;
        let boundary = if self.use_refinement {
            let config = RefinerConfig {
                collocation_points: self.collocation_points,
                quadrature_intervals: self.refiner_intervals,
                ..RefinerConfig::default()
            };
            fpb::refine(inputs, seeds.upper, seeds.lower, &config)?
        } else {
            BoundaryResult {
                upper: BoundaryCurve::constant(t_total, self.collocation_points, seeds.upper),
                lower: BoundaryCurve::constant(t_total, self.collocation_points, seeds.lower),
                crossing_time: 0.0,
                method: Method::QdPlus,
                iterations: 0,
                converged: true,
                max_residual: 0.0,
            }
        };

        // Immediate exercise: the spot already sits strictly inside the
        // exercise region at valuation time (τ = T).
        let spot = inputs.spot();
        let upper_now = boundary.upper.at_maturity();
        let lower_now = boundary.lower.at_maturity();
        if lower_now < spot && spot < upper_now {
            let price = inputs.intrinsic_value();
            return Ok(boundary_details(price, regime, boundary));
        }

        let european = european_value(
            inputs.option_type(),
            spot,
            inputs.strike(),
            inputs.rate(),
            inputs.dividend_yield(),
            inputs.volatility(),
            t_total,
        );
        let premium = self.exercise_premium(inputs, &boundary)?;
        let price = (european + premium.max(0.0)).max(inputs.intrinsic_value());
        Ok(boundary_details(price, regime, boundary))
    }

    /// The early-exercise premium: the time integral of the discounted
    /// exercise carry over the region between the two boundaries.
    fn exercise_premium(&self, inputs: &MarketInputs, boundary: &BoundaryResult) -> Result<Real> {
        let s = inputs.spot();
        let k = inputs.strike();
        let r = inputs.rate();
        let q = inputs.dividend_yield();
        let sigma = inputs.volatility();
        let phi = inputs.sign();
        let t_total = inputs.maturity();

        let quad = SegmentIntegral::new(self.premium_intervals);
        quad.integrate(
            |t| {
                let tau_remaining = t_total - t;
                let ub = boundary.upper.value_at(tau_remaining);
                let lb = boundary.lower.value_at(tau_remaining);
                if ub <= lb {
                    return 0.0;
                }
                let br2 = norm_cdf(-d2(s, ub, t, r, q, sigma))
                    - norm_cdf(-d2(s, lb, t, r, q, sigma));
                let br1 = norm_cdf(-d1(s, ub, t, r, q, sigma))
                    - norm_cdf(-d1(s, lb, t, r, q, sigma));
                -phi * (r * k * (-r * t).exp() * br2 - q * s * (-q * t).exp() * br1)
            },
            0.0,
            t_total,
        )
    }

    /// Analytic branch for maturities under the near-expiry threshold:
    /// intrinsic value plus one period of discounted exercise carry.
    fn near_expiry_details(&self, inputs: &MarketInputs, regime: Regime) -> PricingDetails {
        let k = inputs.strike();
        let s = inputs.spot();
        let r = inputs.rate();
        let q = inputs.dividend_yield();
        let t = inputs.maturity();
        let z = inputs.volatility() * t.sqrt();

        let (upper, lower) = match inputs.option_type() {
            OptionType::Put => (k * (1.0 - 0.3 * z), k * (1.0 - z)),
            OptionType::Call => (k * (1.0 + z), k * (1.0 + 0.3 * z)),
        };

        let carry = r * k * (-r * t).exp() - q * s * (-q * t).exp();
        let correction = (-inputs.sign() * carry).max(0.0) * t;
        let price = inputs.intrinsic_value() + correction;

        let m = self.collocation_points;
        PricingDetails {
            price,
            regime,
            method: Method::NearExpiry,
            upper_boundary_at_maturity: Some(upper),
            lower_boundary_at_maturity: Some(lower),
            crossing_time: 0.0,
            iterations: 0,
            max_residual: 0.0,
            converged: true,
            upper_path: Some(vec![upper; m]),
            lower_path: Some(vec![lower; m]),
        }
    }
}

fn european_details(inputs: &MarketInputs, regime: Regime) -> PricingDetails {
    let price = european_value(
        inputs.option_type(),
        inputs.spot(),
        inputs.strike(),
        inputs.rate(),
        inputs.dividend_yield(),
        inputs.volatility(),
        inputs.maturity(),
    );
    // A rate inside the hysteresis band can leave the closed form a shade
    // under intrinsic; an American price never is.
    flat_details(price.max(inputs.intrinsic_value()), regime, Method::European)
}

fn flat_details(price: Real, regime: Regime, method: Method) -> PricingDetails {
    PricingDetails {
        price,
        regime,
        method,
        upper_boundary_at_maturity: None,
        lower_boundary_at_maturity: None,
        crossing_time: 0.0,
        iterations: 0,
        max_residual: 0.0,
        converged: true,
        upper_path: None,
        lower_path: None,
    }
}

fn boundary_details(price: Real, regime: Regime, boundary: BoundaryResult) -> PricingDetails {
    PricingDetails {
        price,
        regime,
        method: boundary.method,
        upper_boundary_at_maturity: Some(boundary.upper.at_maturity()),
        lower_boundary_at_maturity: Some(boundary.lower.at_maturity()),
        crossing_time: boundary.crossing_time,
        iterations: boundary.iterations,
        max_residual: boundary.max_residual,
        converged: boundary.converged,
        upper_path: Some(boundary.upper.values().to_vec()),
        lower_path: Some(boundary.lower.values().to_vec()),
    }
}

/// Errors bubbling out of the inner components get the regime tag attached
/// before surfacing.
fn attach_regime(err: Error, regime: Regime) -> Error {
    match err {
        Error::InvalidInput { parameter, message } => Error::InvalidInput {
            parameter,
            message: format!("{message} [regime: {regime}]"),
        },
        Error::NonConvergence {
            iterations,
            message,
        } => Error::NonConvergence {
            iterations,
            message: format!("{message} [regime: {regime}]"),
        },
        Error::NumericalBreakdown {
            message,
            last_iterate,
        } => Error::NumericalBreakdown {
            message: format!("{message} [regime: {regime}]"),
            last_iterate,
        },
    }
}
