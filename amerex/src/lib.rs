//! # amerex
//!
//! American vanilla option pricing under general interest-rate regimes,
//! including the double-boundary regime that arises when both the risk-free
//! rate and the dividend yield are negative.
//!
//! This crate is a **façade** that re-exports the public items of the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `ax-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! amerex = "0.1"
//! ```
//!
//! ```rust
//! use amerex::core::{MarketInputs, OptionType};
//! use amerex::engines::AmericanOptionPricer;
//!
//! let inputs = MarketInputs::new(95.0, 100.0, 0.5, -0.01, -0.02, 0.15, OptionType::Put)?;
//! let pricer = AmericanOptionPricer::new();
//! let details = pricer.price_with_details(&inputs)?;
//! assert!(details.price >= inputs.intrinsic_value());
//! # Ok::<(), amerex::core::errors::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, market inputs, and error definitions.
pub use ax_core as core;

/// Mathematical kernel: distributions, solvers, quadrature, interpolation.
pub use ax_math as math;

/// Regime analysis, boundary computation, and the American pricer.
pub use ax_engines as engines;
