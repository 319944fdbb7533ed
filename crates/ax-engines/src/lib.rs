//! # ax-engines
//!
//! Pricing engines for American vanilla options under general interest-rate
//! regimes, including the double-boundary case that arises when both the
//! risk-free rate and the dividend yield are negative.
//!
//! ## Components
//!
//! - [`regime`] — classify `(r, q, σ, payoff)` into an exercise regime,
//!   with hysteresis against the r = 0 frontier
//! - [`qdplus`] — semi-analytic QD+ seed for the boundary pair
//! - [`fpb`] — the stabilized FP-B' fixed-point refinement of the two
//!   coupled boundary curves
//! - [`european`] — Black-Scholes-Merton closed form (value and Greeks)
//! - [`single_boundary`] — plug-in interface for single-boundary regimes,
//!   with a bundled Barone-Adesi–Whaley reference engine
//! - [`pricer`] — the orchestrating [`AmericanOptionPricer`]

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod european;
pub mod fpb;
pub mod pricer;
pub mod qdplus;
pub mod regime;
pub mod single_boundary;

pub use european::{black_scholes_merton, european_theta, european_value};
pub use fpb::{refine, BoundaryCurve, BoundaryResult, Method, RefinerConfig};
pub use pricer::{AmericanOptionPricer, PricingDetails};
pub use qdplus::{boundary_seeds, QdPlusSeeds};
pub use regime::{
    classify, critical_volatility, max_exercise_volatility, Regime, RegimeAnalyzer,
    DEFAULT_HYSTERESIS,
};
pub use single_boundary::{barone_adesi_whaley, BaroneAdesiWhaley, SingleBoundaryEngine};
