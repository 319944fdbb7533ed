//! # ax-core
//!
//! Core types, market inputs, and error definitions for amerex.
//!
//! This crate provides the foundational building blocks shared across the
//! workspace – type aliases, the error hierarchy, and the scalar market
//! inputs that every pricing call consumes.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod errors;
pub mod inputs;

pub use inputs::{MarketInputs, OptionType};

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years.
pub type Time = Real;
