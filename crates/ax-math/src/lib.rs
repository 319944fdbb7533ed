//! # ax-math
//!
//! Mathematical kernel for amerex: the standard normal distribution,
//! 1-D root-finding solvers, fixed-node quadrature, and linear
//! interpolation. Everything here is pure scalar arithmetic on `f64`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod distributions;
pub mod integrals;
pub mod interpolation;
pub mod solvers1d;
