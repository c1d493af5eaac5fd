//! Closed-form Black-Scholes-Merton prices and Greeks.
//!
//! Used as the reference for the simulation engines on single-asset
//! European payoffs:
//!
//! $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
//! $$P = K e^{-rT} N(-d_2) - S e^{-qT} N(-d_1)$$
//!
//! with $d_{1,2} = \frac{\ln(S/K) + (r - q \pm \sigma^2/2)T}{\sigma\sqrt{T}}$.

use crate::MarketInputs;
use lsm_core::{require, Real, Result};
use lsm_instruments::{OptionType, Payoff};
use lsm_math::{normal_cdf, normal_pdf};

/// Price and first-order Greeks of a European vanilla option.
///
/// `theta` follows the calendar convention `∂V/∂t = −∂V/∂T`; the adjoint
/// engines report `∂V/∂T` instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholesGreeks {
    /// Present value.
    pub price: Real,
    /// `∂V/∂S`.
    pub delta: Real,
    /// `∂²V/∂S²`.
    pub gamma: Real,
    /// `∂V/∂σ`, per unit volatility.
    pub vega: Real,
    /// `∂V/∂t`, per year.
    pub theta: Real,
    /// `∂V/∂r`, per unit rate.
    pub rho: Real,
}

/// Black-Scholes-Merton formula with continuous dividend yield `q`.
///
/// At or past expiry the intrinsic value is returned with zero Greeks; a
/// vanishing total volatility collapses onto the discounted forward
/// intrinsic value.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    rate: Real,
    dividend_yield: Real,
    volatility: Real,
    maturity: Real,
) -> BlackScholesGreeks {
    let phi = option_type.sign();
    if maturity <= 0.0 {
        return BlackScholesGreeks {
            price: (phi * (spot - strike)).max(0.0),
            delta: 0.0,
            gamma: 0.0,
            vega: 0.0,
            theta: 0.0,
            rho: 0.0,
        };
    }

    let sqrt_t = maturity.sqrt();
    let std_dev = volatility * sqrt_t;
    let df = (-rate * maturity).exp();
    let dq = (-dividend_yield * maturity).exp();
    let forward = spot * dq / df;

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((forward / strike).ln() + 0.5 * std_dev * std_dev) / std_dev;
        (d1, d1 - std_dev)
    } else {
        let side = if forward > strike { 1e15 } else { -1e15 };
        (side, side)
    };

    let n1 = normal_cdf(phi * d1);
    let n2 = normal_cdf(phi * d2);
    let pdf1 = normal_pdf(d1);

    let gamma = if std_dev > 1e-15 {
        dq * pdf1 / (spot * std_dev)
    } else {
        0.0
    };
    let decay = if sqrt_t > 0.0 {
        -spot * dq * pdf1 * volatility / (2.0 * sqrt_t)
    } else {
        0.0
    };

    BlackScholesGreeks {
        price: phi * (spot * dq * n1 - strike * df * n2),
        delta: phi * dq * n1,
        gamma,
        vega: spot * dq * pdf1 * sqrt_t,
        theta: decay - phi * rate * strike * df * n2 + phi * dividend_yield * spot * dq * n1,
        rho: phi * strike * maturity * df * n2,
    }
}

/// Analytic engine for single-asset European vanilla payoffs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticEuropeanEngine;

impl AnalyticEuropeanEngine {
    /// Price `payoff` on `market` (no dividends).
    ///
    /// # Errors
    ///
    /// `Precondition` for basket payoffs or multi-asset markets.
    pub fn calculate(&self, payoff: &Payoff, market: &MarketInputs<Real>) -> Result<BlackScholesGreeks> {
        require!(
            matches!(payoff, Payoff::Vanilla { .. }),
            "analytic engine prices vanilla payoffs only, got {payoff}"
        );
        require!(
            market.assets() == 1,
            "analytic engine needs one underlying, got {}",
            market.assets()
        );
        Ok(black_scholes_merton(
            payoff.option_type(),
            market.spots()[0],
            payoff.strike(),
            market.rate(),
            0.0,
            market.volatilities()[0],
            market.maturity(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn textbook_call() {
        let g = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0);
        assert!((g.price - 10.4506).abs() < 1e-3, "price = {}", g.price);
        assert!(g.delta > 0.6 && g.delta < 0.65, "delta = {}", g.delta);
        assert!(g.gamma > 0.0 && g.vega > 0.0 && g.rho > 0.0);
        assert!(g.theta < 0.0);
    }

    #[test]
    fn put_call_parity() {
        let (s, k, r, q, v, t) = (100.0, 90.0, 0.03, 0.01, 0.25, 2.0);
        let c = black_scholes_merton(OptionType::Call, s, k, r, q, v, t);
        let p = black_scholes_merton(OptionType::Put, s, k, r, q, v, t);
        let parity = s * (-q * t).exp() - k * (-r * t).exp();
        assert_relative_eq!(c.price - p.price, parity, epsilon = 1e-10);
        assert_relative_eq!(c.delta - p.delta, (-q * t).exp(), epsilon = 1e-12);
        assert_relative_eq!(c.vega, p.vega, epsilon = 1e-10);
    }

    #[test]
    fn greeks_match_finite_differences() {
        let f = |s: Real, v: Real, r: Real, t: Real| {
            black_scholes_merton(OptionType::Put, s, 100.0, r, 0.0, v, t).price
        };
        let g = black_scholes_merton(OptionType::Put, 95.0, 100.0, 0.04, 0.0, 0.3, 1.5);
        let h = 1e-5;
        assert_relative_eq!(g.delta, (f(95.0 + h, 0.3, 0.04, 1.5) - f(95.0 - h, 0.3, 0.04, 1.5)) / (2.0 * h), epsilon = 1e-6);
        assert_relative_eq!(g.vega, (f(95.0, 0.3 + h, 0.04, 1.5) - f(95.0, 0.3 - h, 0.04, 1.5)) / (2.0 * h), epsilon = 1e-5);
        assert_relative_eq!(g.rho, (f(95.0, 0.3, 0.04 + h, 1.5) - f(95.0, 0.3, 0.04 - h, 1.5)) / (2.0 * h), epsilon = 1e-5);
        assert_relative_eq!(-g.theta, (f(95.0, 0.3, 0.04, 1.5 + h) - f(95.0, 0.3, 0.04, 1.5 - h)) / (2.0 * h), epsilon = 1e-5);
    }

    #[test]
    fn expired_option_is_intrinsic() {
        let g = black_scholes_merton(OptionType::Put, 80.0, 100.0, 0.05, 0.0, 0.2, 0.0);
        assert_eq!(g.price, 20.0);
        assert_eq!(g.delta, 0.0);
    }

    #[test]
    fn zero_volatility_is_discounted_forward_intrinsic() {
        let g = black_scholes_merton(OptionType::Call, 100.0, 90.0, 0.05, 0.0, 0.0, 1.0);
        assert_relative_eq!(g.price, 100.0 - 90.0 * (-0.05f64).exp(), epsilon = 1e-10);
    }

    proptest::proptest! {
        #[test]
        fn parity_and_bounds_hold(
            s in 10.0f64..200.0,
            k in 10.0f64..200.0,
            r in -0.02f64..0.1,
            v in 0.01f64..1.0,
            t in 0.01f64..5.0,
        ) {
            let c = black_scholes_merton(OptionType::Call, s, k, r, 0.0, v, t);
            let p = black_scholes_merton(OptionType::Put, s, k, r, 0.0, v, t);
            let parity = s - k * (-r * t).exp();
            proptest::prop_assert!((c.price - p.price - parity).abs() < 1e-8 * (s + k));
            proptest::prop_assert!(c.price >= parity.max(0.0) - 1e-9 * (s + k));
            proptest::prop_assert!((0.0..=1.0).contains(&c.delta));
            proptest::prop_assert!(c.gamma >= 0.0 && c.vega >= 0.0);
        }
    }

    #[test]
    fn engine_rejects_baskets() {
        let market = MarketInputs::new(100.0, 0.2, 0.05, 1.0).unwrap();
        let basket = Payoff::basket(OptionType::Call, 100.0, lsm_instruments::BasketKind::BestOf, 1).unwrap();
        assert!(AnalyticEuropeanEngine.calculate(&basket, &market).is_err());
        let vanilla = Payoff::vanilla(OptionType::Call, 100.0).unwrap();
        let g = AnalyticEuropeanEngine.calculate(&vanilla, &market).unwrap();
        assert!((g.price - 10.4506).abs() < 1e-3);
    }
}
