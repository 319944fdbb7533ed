//! Exercise-regime analysis.
//!
//! The boundary equations have distinct analytic structure depending on the
//! signs of the risk-free rate and the dividend yield; a wrong
//! classification yields a silently wrong price, so everything downstream
//! dispatches on the [`Regime`] tag computed here. Classification applies a
//! hysteresis band of width ε against the r = 0 frontier so that a rate
//! brushing zero between successive pricings cannot flip the regime.

use ax_core::{ensure, errors::Result, OptionType, Rate, Real, Volatility};
use std::fmt;

/// Default hysteresis half-width against the r = 0 frontier (5 bp).
pub const DEFAULT_HYSTERESIS: Real = 5e-4;

/// Qualitative classification of the early-exercise structure.
///
/// Chosen once per price; stable for the life of the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    /// Early exercise is never optimal; the American price equals the
    /// European price.
    NoEarlyExercise,
    /// One exercise boundary, both carry rates non-negative.
    SingleBoundaryPositive,
    /// One exercise boundary with the secondary rate negative (negative
    /// dividend yield for puts, negative risk-free rate for calls).
    SingleBoundaryNegativeDividend,
    /// Two coupled boundaries under negative rates (puts: q < r < 0;
    /// calls: r < q < 0).
    DoubleBoundaryNegativeRates,
    /// Two boundaries for calls under 0 < r < q.
    DoubleBoundaryPositiveRatesCall,
}

impl Regime {
    /// Stable tag string for diagnostics and detailed results.
    pub fn as_str(self) -> &'static str {
        match self {
            Regime::NoEarlyExercise => "no-early-exercise",
            Regime::SingleBoundaryPositive => "single-boundary-positive",
            Regime::SingleBoundaryNegativeDividend => "single-boundary-negative-dividend",
            Regime::DoubleBoundaryNegativeRates => "double-boundary-negative-rates",
            Regime::DoubleBoundaryPositiveRatesCall => "double-boundary-positive-rates-call",
        }
    }

    /// Whether this regime carries two coupled boundaries.
    pub fn is_double_boundary(self) -> bool {
        matches!(
            self,
            Regime::DoubleBoundaryNegativeRates | Regime::DoubleBoundaryPositiveRatesCall
        )
    }

    /// Whether this regime carries exactly one boundary.
    pub fn is_single_boundary(self) -> bool {
        matches!(
            self,
            Regime::SingleBoundaryPositive | Regime::SingleBoundaryNegativeDividend
        )
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The critical volatility `σ* = |√(2|r|) − √(2|q|)|`.
///
/// Below σ* the two boundaries of a double-boundary regime never cross
/// (the collapse time stays at zero); at σ = σ* they touch at the longest
/// maturity.
pub fn critical_volatility(rate: Rate, dividend_yield: Rate) -> Volatility {
    ((2.0 * rate.abs()).sqrt() - (2.0 * dividend_yield.abs()).sqrt()).abs()
}

/// The outer critical volatility `√(2(|r| + |q|))`.
///
/// At or above this level the time value dominates the exercise carry and
/// the double-boundary exercise region is treated as empty. It sits between
/// σ* and `√(2|r|) + √(2|q|)`, the edges of the window in which the
/// characteristic quadratic loses its real roots.
pub fn max_exercise_volatility(rate: Rate, dividend_yield: Rate) -> Volatility {
    (2.0 * (rate.abs() + dividend_yield.abs())).sqrt()
}

/// Classify `(r, q, σ, payoff)` into a [`Regime`].
///
/// `epsilon` is the hysteresis half-width applied against the r = 0
/// frontier (and to the rate-separation tests of the double-boundary
/// regimes).
pub fn classify(
    rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    option_type: OptionType,
    epsilon: Real,
) -> Regime {
    let r = rate;
    let q = dividend_yield;
    match option_type {
        OptionType::Put => {
            if r >= -epsilon {
                if q >= 0.0 {
                    Regime::SingleBoundaryPositive
                } else {
                    Regime::SingleBoundaryNegativeDividend
                }
            } else if q < r - epsilon {
                // q < r < 0: the exercise region is bounded on both sides,
                // provided the time value does not drown the carry.
                if volatility < max_exercise_volatility(r, q) {
                    Regime::DoubleBoundaryNegativeRates
                } else {
                    Regime::NoEarlyExercise
                }
            } else {
                // r < 0 with q >= r: receiving the strike early always
                // costs more than waiting.
                Regime::NoEarlyExercise
            }
        }
        OptionType::Call => {
            if r >= -epsilon {
                if r > epsilon && q > r + epsilon {
                    if volatility < max_exercise_volatility(r, q) {
                        Regime::DoubleBoundaryPositiveRatesCall
                    } else {
                        Regime::SingleBoundaryPositive
                    }
                } else if q > 0.0 {
                    Regime::SingleBoundaryPositive
                } else {
                    // No dividend income to capture: never exercise early.
                    Regime::NoEarlyExercise
                }
            } else if q >= -epsilon {
                // Paying the strike later costs more at negative rates, so
                // the boundary exists even without dividends.
                Regime::SingleBoundaryNegativeDividend
            } else if r < q - epsilon {
                // r < q < 0, the call mirror of the put's double regime.
                if volatility < max_exercise_volatility(r, q) {
                    Regime::DoubleBoundaryNegativeRates
                } else {
                    Regime::NoEarlyExercise
                }
            } else {
                Regime::NoEarlyExercise
            }
        }
    }
}

/// Stateful regime analyzer with sticky hysteresis.
///
/// The pure [`classify`] already applies the ε-band against r = 0; the
/// analyzer additionally remembers the previous classification and keeps it
/// while the rate stays inside the band, so repeated pricings with a rate
/// oscillating around zero see one stable regime.
#[derive(Debug, Clone)]
pub struct RegimeAnalyzer {
    epsilon: Real,
    last: Option<Regime>,
}

impl RegimeAnalyzer {
    /// Create an analyzer with the given hysteresis half-width.
    pub fn new(epsilon: Real) -> Result<Self> {
        ensure!(
            epsilon.is_finite() && epsilon >= 0.0,
            "epsilon",
            "must be finite and non-negative, got {epsilon}"
        );
        Ok(Self {
            epsilon,
            last: None,
        })
    }

    /// The hysteresis half-width.
    pub fn epsilon(&self) -> Real {
        self.epsilon
    }

    /// Classify, keeping the previous regime while `|r| ≤ ε`.
    pub fn classify(
        &mut self,
        rate: Rate,
        dividend_yield: Rate,
        volatility: Volatility,
        option_type: OptionType,
    ) -> Regime {
        let fresh = classify(rate, dividend_yield, volatility, option_type, self.epsilon);
        let chosen = match self.last {
            Some(prev) if rate.abs() <= self.epsilon => prev,
            _ => fresh,
        };
        self.last = Some(chosen);
        chosen
    }
}

impl Default for RegimeAnalyzer {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_HYSTERESIS,
            last: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: Real = DEFAULT_HYSTERESIS;

    #[test]
    fn put_positive_rates() {
        assert_eq!(
            classify(0.05, 0.02, 0.2, OptionType::Put, EPS),
            Regime::SingleBoundaryPositive
        );
        assert_eq!(
            classify(0.05, 0.0, 0.2, OptionType::Put, EPS),
            Regime::SingleBoundaryPositive
        );
    }

    #[test]
    fn put_negative_dividend() {
        assert_eq!(
            classify(0.05, -0.01, 0.2, OptionType::Put, EPS),
            Regime::SingleBoundaryNegativeDividend
        );
    }

    #[test]
    fn put_double_boundary_negative_rates() {
        // q < r < 0 with moderate vol
        assert_eq!(
            classify(-0.01, -0.02, 0.15, OptionType::Put, EPS),
            Regime::DoubleBoundaryNegativeRates
        );
    }

    #[test]
    fn put_high_vol_kills_exercise() {
        // σ above √(2·|q|) leaves no exercise region
        assert_eq!(
            classify(-0.03, -0.05, 0.50, OptionType::Put, EPS),
            Regime::NoEarlyExercise
        );
    }

    #[test]
    fn put_rates_ordered_wrong_way() {
        // r <= q < 0: no early exercise
        assert_eq!(
            classify(-0.03, -0.01, 0.2, OptionType::Put, EPS),
            Regime::NoEarlyExercise
        );
        assert_eq!(
            classify(-0.02, -0.02, 0.2, OptionType::Put, EPS),
            Regime::NoEarlyExercise
        );
    }

    #[test]
    fn hysteresis_against_zero_rate() {
        // Perturbing r across zero inside the band must not flip the regime
        let up = classify(1e-4, 0.02, 0.2, OptionType::Put, EPS);
        let down = classify(-1e-4, 0.02, 0.2, OptionType::Put, EPS);
        assert_eq!(up, down);
        assert_eq!(up, Regime::SingleBoundaryPositive);
    }

    #[test]
    fn sticky_analyzer_keeps_regime_in_band() {
        let mut analyzer = RegimeAnalyzer::default();
        let first = analyzer.classify(2e-4, 0.02, 0.2, OptionType::Put);
        let second = analyzer.classify(-2e-4, 0.02, 0.2, OptionType::Put);
        let third = analyzer.classify(-4e-4, 0.02, 0.2, OptionType::Put);
        assert_eq!(first, second);
        assert_eq!(second, third);
    }

    #[test]
    fn analyzer_rejects_bad_epsilon() {
        assert!(RegimeAnalyzer::new(f64::NAN).is_err());
        assert!(RegimeAnalyzer::new(-1e-4).is_err());
        assert!(RegimeAnalyzer::new(1e-3).is_ok());
    }

    #[test]
    fn call_no_dividend_no_exercise() {
        assert_eq!(
            classify(0.05, 0.0, 0.2, OptionType::Call, EPS),
            Regime::NoEarlyExercise
        );
    }

    #[test]
    fn call_with_dividends_single_boundary() {
        assert_eq!(
            classify(0.05, 0.02, 0.2, OptionType::Call, EPS),
            Regime::SingleBoundaryPositive
        );
    }

    #[test]
    fn call_negative_rate_single_boundary() {
        assert_eq!(
            classify(-0.01, 0.02, 0.2, OptionType::Call, EPS),
            Regime::SingleBoundaryNegativeDividend
        );
        assert_eq!(
            classify(-0.01, 0.0, 0.2, OptionType::Call, EPS),
            Regime::SingleBoundaryNegativeDividend
        );
    }

    #[test]
    fn call_double_boundary_positive_rates() {
        // 0 < r < q with low vol
        assert_eq!(
            classify(0.01, 0.03, 0.1, OptionType::Call, EPS),
            Regime::DoubleBoundaryPositiveRatesCall
        );
        // high vol degrades to the plain dividend-driven single boundary
        assert_eq!(
            classify(0.01, 0.03, 0.5, OptionType::Call, EPS),
            Regime::SingleBoundaryPositive
        );
    }

    #[test]
    fn call_double_boundary_negative_rates() {
        // r < q < 0, the mirror of the put double regime
        assert_eq!(
            classify(-0.02, -0.01, 0.1, OptionType::Call, EPS),
            Regime::DoubleBoundaryNegativeRates
        );
    }

    #[test]
    fn critical_volatility_values() {
        let star = critical_volatility(-0.01, -0.02);
        let expected = (0.04_f64.sqrt() - 0.02_f64.sqrt()).abs();
        assert!((star - expected).abs() < 1e-12, "got {star}");
        assert!(star < max_exercise_volatility(-0.01, -0.02));
    }

    #[test]
    fn regime_tags_are_stable() {
        assert_eq!(
            Regime::DoubleBoundaryNegativeRates.to_string(),
            "double-boundary-negative-rates"
        );
        assert!(Regime::DoubleBoundaryNegativeRates.is_double_boundary());
        assert!(Regime::SingleBoundaryPositive.is_single_boundary());
        assert!(!Regime::NoEarlyExercise.is_double_boundary());
    }
}
