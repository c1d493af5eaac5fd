//! Central finite-difference Greeks.
//!
//! Each parameter is bumped up and down and the price recomputed. Engines
//! reuse their seed, so both revaluations see the same random numbers and
//! the difference quotient is not swamped by simulation noise. Used to
//! cross-check the adjoint engine.

use crate::{Greek, MarketInputs};
use lsm_core::{ensure, Real, Result};
use std::collections::BTreeMap;

/// Bump sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BumpSizes {
    /// Relative spot bump.
    pub spot: Real,
    /// Absolute volatility bump.
    pub volatility: Real,
    /// Absolute rate bump.
    pub rate: Real,
    /// Absolute maturity bump, in years.
    pub maturity: Real,
}

impl Default for BumpSizes {
    fn default() -> Self {
        Self {
            spot: 1e-3,
            volatility: 1e-3,
            rate: 1e-4,
            maturity: 1e-3,
        }
    }
}

/// Delta, vega per underlying, rho and theta (`∂V/∂T`) of `price` at
/// `market`.
///
/// # Errors
///
/// `InvalidParameter` if a bump would push a volatility or the maturity
/// through zero; any error of `price`.
pub fn bump_and_revalue<F>(market: &MarketInputs<Real>, bumps: &BumpSizes, price: F) -> Result<BTreeMap<Greek, Real>>
where
    F: Fn(&MarketInputs<Real>) -> Result<Real>,
{
    ensure!(
        bumps.spot > 0.0 && bumps.volatility > 0.0 && bumps.rate > 0.0 && bumps.maturity > 0.0,
        "bump sizes must be positive"
    );
    ensure!(
        bumps.maturity < market.maturity(),
        "maturity bump {} exceeds maturity {}",
        bumps.maturity,
        market.maturity()
    );
    let central = |up: Real, down: Real, width: Real| (up - down) / width;

    let mut greeks = BTreeMap::new();
    for (i, &s) in market.spots().iter().enumerate() {
        let up = price(&market.bump_spot(i, bumps.spot))?;
        let down = price(&market.bump_spot(i, -bumps.spot))?;
        greeks.insert(Greek::Delta(i), central(up, down, 2.0 * bumps.spot * s));
    }
    for (i, &sigma) in market.volatilities().iter().enumerate() {
        ensure!(
            sigma >= bumps.volatility,
            "volatility[{i}] = {sigma} is below the bump {}",
            bumps.volatility
        );
        let up = price(&market.bump_volatility(i, bumps.volatility))?;
        let down = price(&market.bump_volatility(i, -bumps.volatility))?;
        greeks.insert(Greek::Vega(i), central(up, down, 2.0 * bumps.volatility));
    }
    let up = price(&market.bump_rate(bumps.rate))?;
    let down = price(&market.bump_rate(-bumps.rate))?;
    greeks.insert(Greek::Rho, central(up, down, 2.0 * bumps.rate));

    let up = price(&market.bump_maturity(bumps.maturity))?;
    let down = price(&market.bump_maturity(-bumps.maturity))?;
    greeks.insert(Greek::Theta, central(up, down, 2.0 * bumps.maturity));

    tracing::debug!(greeks = greeks.len(), "bump and revalue");
    Ok(greeks)
}
