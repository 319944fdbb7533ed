//! Cross-component pricing scenarios spanning every exercise regime.

use ax_core::{MarketInputs, OptionType, Real};
use ax_engines::{
    classify, critical_volatility, european_value, max_exercise_volatility, AmericanOptionPricer,
    BaroneAdesiWhaley, Method, Regime, SingleBoundaryEngine, DEFAULT_HYSTERESIS,
};

fn put(spot: Real, t: Real, r: Real, q: Real, sigma: Real) -> MarketInputs {
    MarketInputs::new(spot, 100.0, t, r, q, sigma, OptionType::Put).unwrap()
}

fn european(mkt: &MarketInputs) -> Real {
    european_value(
        mkt.option_type(),
        mkt.spot(),
        mkt.strike(),
        mkt.rate(),
        mkt.dividend_yield(),
        mkt.volatility(),
        mkt.maturity(),
    )
}

// Scenario 1: plain positive-rate ATM put.
#[test]
fn positive_rates_atm_put() {
    let mkt = put(100.0, 0.5, 0.05, 0.02, 0.20);
    let pricer = AmericanOptionPricer::new();
    let details = pricer.price_with_details(&mkt).unwrap();

    assert_eq!(details.regime, Regime::SingleBoundaryPositive);
    assert!(details.converged);
    assert!(details.price >= european(&mkt) - 1e-9);
    // No-arbitrage cap for a put under positive rates
    assert!(details.price <= mkt.strike() * (-mkt.rate() * mkt.maturity()).exp() + 1e-8);

    // The engine must agree with the external single-boundary engine.
    let reference = BaroneAdesiWhaley.price(&mkt).unwrap();
    assert!(
        (details.price - reference).abs() < 1e-6,
        "engine = {}, plug-in = {reference}",
        details.price
    );
}

// Scenario 2: positive rate, zero dividend.
#[test]
fn positive_rate_no_dividend_put() {
    let mkt = put(100.0, 0.5, 0.05, 0.0, 0.20);
    let details = AmericanOptionPricer::new()
        .price_with_details(&mkt)
        .unwrap();

    assert_eq!(details.regime, Regime::SingleBoundaryPositive);
    assert!(details.price >= european(&mkt) - 1e-9);
    assert!(details.price > 4.0 && details.price < 6.0, "price = {}", details.price);
}

// Scenario 3: the double-boundary negative-rates put.
#[test]
fn negative_rates_double_boundary_put() {
    let mkt = put(95.0, 0.5, -0.01, -0.02, 0.15);
    let details = AmericanOptionPricer::new()
        .price_with_details(&mkt)
        .unwrap();

    assert_eq!(details.regime, Regime::DoubleBoundaryNegativeRates);
    assert_eq!(details.method, Method::FpBPrime);
    assert!(details.converged, "residual = {}", details.max_residual);
    assert!(details.max_residual < 1e-6);
    assert!(
        details.price > european(&mkt),
        "price = {}, european = {}",
        details.price,
        european(&mkt)
    );
    assert_eq!(details.crossing_time, 0.0, "no collapse expected here");

    // Boundary invariant: 0 ≤ L ≤ B ≤ K at every node.
    let upper = details.upper_path.as_ref().unwrap();
    let lower = details.lower_path.as_ref().unwrap();
    for (u, l) in upper.iter().zip(lower.iter()) {
        assert!(*l >= 0.0);
        assert!(l <= u, "lower = {l}, upper = {u}");
        assert!(*u <= mkt.strike() + 1e-9);
    }
}

// Scenario 4: volatility above the outer critical level kills exercise.
#[test]
fn high_vol_negative_rates_equals_european() {
    let mkt = put(100.0, 0.5, -0.03, -0.05, 0.50);
    assert!(mkt.volatility() > max_exercise_volatility(mkt.rate(), mkt.dividend_yield()));

    let details = AmericanOptionPricer::new()
        .price_with_details(&mkt)
        .unwrap();
    assert_eq!(details.regime, Regime::NoEarlyExercise);
    assert!(
        (details.price - european(&mkt)).abs() < 1e-8,
        "price = {}, european = {}",
        details.price,
        european(&mkt)
    );
}

// Scenario 5: the r = q = 0 boundary case.
#[test]
fn zero_rates_put_matches_european_floor() {
    let mkt = put(100.0, 1.0, 0.0, 0.0, 0.20);
    let details = AmericanOptionPricer::new()
        .price_with_details(&mkt)
        .unwrap();
    let eur = european(&mkt);

    assert_eq!(details.regime, Regime::SingleBoundaryPositive);
    assert!(details.price >= eur - 1e-9, "price = {}, eur = {eur}", details.price);
    assert!(details.price > 7.96, "price = {}", details.price);
}

// Scenario 6: maturities inside the near-expiry threshold.
#[test]
fn near_expiry_atm_put_is_intrinsic() {
    let mkt = put(100.0, 1e-4, -0.01, -0.02, 0.20);
    let details = AmericanOptionPricer::new()
        .price_with_details(&mkt)
        .unwrap();

    assert_eq!(details.method, Method::NearExpiry);
    assert!(details.converged);
    assert!(
        (details.price - mkt.intrinsic_value()).abs() < 1e-3,
        "price = {}",
        details.price
    );
}

// Law: the hysteresis band keeps the regime stable across r = 0.
#[test]
fn regime_stable_across_zero_rate() {
    let up = classify(1e-4, 0.02, 0.2, OptionType::Put, DEFAULT_HYSTERESIS);
    let down = classify(-1e-4, 0.02, 0.2, OptionType::Put, DEFAULT_HYSTERESIS);
    assert_eq!(up, down);

    let pricer = AmericanOptionPricer::new();
    let d_up = pricer.price_with_details(&put(100.0, 0.5, 1e-4, 0.02, 0.2)).unwrap();
    let d_down = pricer.price_with_details(&put(100.0, 0.5, -1e-4, 0.02, 0.2)).unwrap();
    assert_eq!(d_up.regime, d_down.regime);
}

// Law: at σ = σ* the exercise region has narrowed towards its collapse
// point; the full coincidence of the two curves is only reached
// asymptotically in τ.
#[test]
fn critical_volatility_narrows_exercise_region() {
    let r = -0.01;
    let q = -0.02;
    let sigma_star = critical_volatility(r, q);
    assert!(sigma_star < max_exercise_volatility(r, q));

    let pricer = AmericanOptionPricer::new();
    let at_star = pricer
        .price_with_details(&put(100.0, 5.0, r, q, sigma_star))
        .unwrap();
    let below_star = pricer
        .price_with_details(&put(100.0, 5.0, r, q, 0.5 * sigma_star))
        .unwrap();

    assert_eq!(at_star.regime, Regime::DoubleBoundaryNegativeRates);
    let width_at_star = at_star.upper_boundary_at_maturity.unwrap()
        - at_star.lower_boundary_at_maturity.unwrap();
    let width_below = below_star.upper_boundary_at_maturity.unwrap()
        - below_star.lower_boundary_at_maturity.unwrap();
    assert!(width_at_star >= 0.0);
    assert!(
        width_at_star <= width_below,
        "region must narrow towards σ*: width(σ*) = {width_at_star}, width(σ*/2) = {width_below}"
    );
}

// Invariant: prices never fall below intrinsic value in any regime.
#[test]
fn price_dominates_intrinsic_across_regimes() {
    let pricer = AmericanOptionPricer::new();
    let cases = [
        put(100.0, 0.5, 0.05, 0.02, 0.20),
        put(80.0, 0.5, 0.05, -0.02, 0.20),
        put(95.0, 0.5, -0.01, -0.02, 0.15),
        put(60.0, 0.5, -0.01, -0.02, 0.15),
        put(100.0, 0.5, -0.03, -0.05, 0.50),
        put(120.0, 2.0, -0.02, -0.04, 0.10),
    ];
    for mkt in cases {
        let price = pricer.price(&mkt).unwrap();
        assert!(
            price >= mkt.intrinsic_value() - 1e-9,
            "S = {}, r = {}, q = {}: price = {price} < intrinsic {}",
            mkt.spot(),
            mkt.rate(),
            mkt.dividend_yield(),
            mkt.intrinsic_value()
        );
    }
}
