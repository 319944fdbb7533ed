//! Market inputs and payoff vocabulary.
//!
//! The engine is a pure map from [`MarketInputs`] to a price; date
//! arithmetic, term-structure interpolation, and market-data plumbing are
//! the caller's problem. All invariants are enforced at construction, so a
//! `MarketInputs` value in hand is always admissible.

use crate::ensure;
use crate::errors::Result;
use crate::{Rate, Real, Time, Volatility};
use std::fmt;

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// A call option (right to buy).
    Call,
    /// A put option (right to sell).
    Put,
}

impl OptionType {
    /// +1 for Call, −1 for Put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// Scalar market parameters for a single pricing request.
///
/// Immutable once constructed. Spot, strike, maturity, and volatility must
/// be strictly positive and finite; the risk-free rate and the dividend
/// yield may take any finite value — negative rates are first-class here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketInputs {
    spot: Real,
    strike: Real,
    maturity: Time,
    rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    option_type: OptionType,
}

impl MarketInputs {
    /// Validate and construct market inputs.
    ///
    /// # Errors
    /// Returns [`InvalidInput`](crate::errors::Error::InvalidInput) naming
    /// the offending parameter if any guard fails.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        spot: Real,
        strike: Real,
        maturity: Time,
        rate: Rate,
        dividend_yield: Rate,
        volatility: Volatility,
        option_type: OptionType,
    ) -> Result<Self> {
        ensure!(
            spot.is_finite() && spot > 0.0,
            "spot",
            "must be finite and positive, got {spot}"
        );
        ensure!(
            strike.is_finite() && strike > 0.0,
            "strike",
            "must be finite and positive, got {strike}"
        );
        ensure!(
            maturity.is_finite() && maturity > 0.0,
            "maturity",
            "must be finite and positive, got {maturity}"
        );
        ensure!(rate.is_finite(), "rate", "must be finite, got {rate}");
        ensure!(
            dividend_yield.is_finite(),
            "dividend_yield",
            "must be finite, got {dividend_yield}"
        );
        ensure!(
            volatility.is_finite() && volatility > 0.0,
            "volatility",
            "must be finite and positive, got {volatility}"
        );
        Ok(Self {
            spot,
            strike,
            maturity,
            rate,
            dividend_yield,
            volatility,
            option_type,
        })
    }

    /// The spot price of the underlying.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// The strike price.
    pub fn strike(&self) -> Real {
        self.strike
    }

    /// Time to maturity in years.
    pub fn maturity(&self) -> Time {
        self.maturity
    }

    /// The continuously-compounded risk-free rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// The continuously-compounded dividend yield.
    pub fn dividend_yield(&self) -> Rate {
        self.dividend_yield
    }

    /// The Black volatility.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }

    /// The option type (call / put).
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// +1 for Call, −1 for Put.
    pub fn sign(&self) -> Real {
        self.option_type.sign()
    }

    /// `max(φ(S − K), 0)` — the exercise-now value.
    pub fn intrinsic_value(&self) -> Real {
        (self.sign() * (self.spot - self.strike)).max(0.0)
    }
}
