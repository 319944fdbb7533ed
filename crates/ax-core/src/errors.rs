//! Error types for amerex.
//!
//! The whole workspace shares a single `thiserror`-derived enum with three
//! kinds: guard violations at entry points (`InvalidInput`), iteration
//! budgets exhausted with the residual still above tolerance
//! (`NonConvergence`), and divisions by zero or NaNs that survive the
//! numerical clamps (`NumericalBreakdown`). The `ensure!` and `fail!`
//! convenience macros construct the first and last of these.

use thiserror::Error;

/// The top-level error type used throughout amerex.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A parameter failed an entry guard. Fatal for the call.
    #[error("invalid input for `{parameter}`: {message}")]
    InvalidInput {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Human-readable description including the offending value.
        message: String,
    },

    /// An iterative routine exhausted its budget without meeting tolerance.
    #[error("no convergence after {iterations} iterations: {message}")]
    NonConvergence {
        /// Number of iterations performed before giving up.
        iterations: u32,
        /// Human-readable description of the failing computation.
        message: String,
    },

    /// A divide-by-zero or NaN arose inside a numerical routine despite the
    /// clamps.
    #[error("numerical breakdown: {message}")]
    NumericalBreakdown {
        /// Human-readable description of the failing computation.
        message: String,
        /// The last good iterate, when one exists, as a diagnostic.
        last_iterate: Option<f64>,
    },
}

/// Shorthand `Result` type used throughout amerex.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Entry-point guard: returns `Err(Error::InvalidInput { .. })` naming the
/// offending parameter if `$cond` is false.
///
/// # Example
/// ```
/// use ax_core::ensure;
/// fn positive(x: f64) -> ax_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x", "must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $param:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidInput {
                parameter: $param,
                message: format!($($msg)*),
            });
        }
    };
}

/// Abort a numerical routine: returns
/// `Err(Error::NumericalBreakdown { .. })` immediately.
///
/// # Example
/// ```
/// use ax_core::fail;
/// fn always_err() -> ax_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::NumericalBreakdown {
            message: format!($($msg)*),
            last_iterate: None,
        })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_names_parameter() {
        let e = Error::InvalidInput {
            parameter: "spot",
            message: "must be positive, got -1".into(),
        };
        let text = e.to_string();
        assert!(text.contains("spot"), "got: {text}");
        assert!(text.contains("-1"), "got: {text}");
    }

    #[test]
    fn breakdown_carries_last_iterate() {
        let e = Error::NumericalBreakdown {
            message: "derivative vanished".into(),
            last_iterate: Some(42.0),
        };
        match e {
            Error::NumericalBreakdown { last_iterate, .. } => {
                assert_eq!(last_iterate, Some(42.0));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn ensure_macro_short_circuits() {
        fn guarded(x: f64) -> Result<f64> {
            ensure!(x.is_finite(), "x", "must be finite, got {x}");
            Ok(x)
        }
        assert!(guarded(1.0).is_ok());
        assert!(matches!(
            guarded(f64::NAN),
            Err(Error::InvalidInput { parameter: "x", .. })
        ));
    }
}
