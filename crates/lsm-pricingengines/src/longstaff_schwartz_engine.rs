//! Longstaff-Schwartz least-squares Monte Carlo for early-exercise options.
//!
//! # Algorithm
//!
//! 1. Simulate risk-neutral paths on `NT` equal steps.
//! 2. Set each path's cash flow to the payoff at maturity.
//! 3. Walk the exercise dates backwards. At each date, discount the cash
//!    flows to it, regress them on basis functions of the in-the-money
//!    states, and replace a path's cash flow by its exercise value where
//!    that strictly exceeds the fitted continuation value.
//! 4. Discount to today and average.
//!
//! Exercise decisions are made on plain values. The payoff and discount
//! factors stay in the engine's scalar type, so on the tape the estimate
//! differentiates pathwise through whichever cash flow each path ended up
//! holding.

use crate::MarketInputs;
use lsm_autodiff::Scalar;
use lsm_core::{require, Real, Result, Size, Time};
use lsm_instruments::{BermudanOption, Payoff};
use lsm_methods::{
    ContinuationRegressor, McResult, PathTensor, PricingConfig, RegressionOutcome, SimulationGrid,
};

/// What happened at one early-exercise date.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseDateReport {
    /// Grid step.
    pub step: Size,
    /// Calendar time of the step.
    pub time: Time,
    /// Paths in the money.
    pub in_the_money: Size,
    /// Paths whose cash flow was replaced by exercise.
    pub exercised: Size,
    /// Outcome of the continuation regression.
    pub regression: RegressionOutcome,
}

/// Estimate and per-date diagnostics of one Longstaff-Schwartz run.
#[derive(Debug, Clone)]
pub struct LsmResult<S> {
    /// Discounted mean cash flow.
    pub estimate: McResult<S>,
    /// Early-exercise dates in ascending order.
    pub exercise_dates: Vec<ExerciseDateReport>,
}

impl<S: Scalar> LsmResult<S> {
    /// The estimate in the engine's scalar type.
    pub fn value(&self) -> S {
        self.estimate.value
    }

    /// Plain value of the estimate.
    pub fn price(&self) -> Real {
        self.estimate.price()
    }

    /// Standard error of the estimate.
    pub fn std_error(&self) -> Real {
        self.estimate.std_error
    }

    /// Exercise events summed over all dates. A path exercised at several
    /// dates during the backward pass is counted at each.
    pub fn exercise_events(&self) -> Size {
        self.exercise_dates.iter().map(|d| d.exercised).sum()
    }

    /// Scale the estimate by `factor` (e.g. a survival probability).
    pub(crate) fn scaled(mut self, factor: S) -> Self {
        self.estimate.std_error *= factor.value().abs();
        self.estimate.value = self.estimate.value * factor;
        self
    }
}

/// Longstaff-Schwartz engine over lognormal underlyings.
#[derive(Debug, Clone)]
pub struct LongstaffSchwartzEngine {
    config: PricingConfig,
}

impl LongstaffSchwartzEngine {
    /// Engine with a validated configuration.
    pub fn new(config: PricingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Simulate risk-neutral GBM paths for `market` and price `option` on
    /// them.
    pub fn price<S: Scalar>(&self, option: &BermudanOption, market: &MarketInputs<S>) -> Result<LsmResult<S>> {
        require!(
            option.payoff.assets() == market.assets(),
            "payoff on {} underlyings but market of {}",
            option.payoff.assets(),
            market.assets()
        );
        let (grid, paths) = market.simulate(&self.config)?;
        self.price_on_paths(option, &paths, &grid, market.rate())
    }

    /// Backward induction on already simulated paths, discounting at the
    /// flat `rate`.
    pub fn price_on_paths<S: Scalar>(
        &self,
        option: &BermudanOption,
        paths: &PathTensor<S>,
        grid: &SimulationGrid<S>,
        rate: S,
    ) -> Result<LsmResult<S>> {
        let payoff = &option.payoff;
        let assets = paths.assets();
        let nt = grid.steps();
        require!(
            payoff.assets() == assets,
            "payoff on {} underlyings but paths of {}",
            payoff.assets(),
            assets
        );
        require!(
            paths.steps() == nt,
            "paths of {} steps on a grid of {}",
            paths.steps(),
            nt
        );

        let schedule = option
            .exercise
            .schedule(nt, grid.maturity().value(), self.config.exercise_frequency)?;
        let regressor = ContinuationRegressor::new(self.config.basis, assets, regression_scale(payoff))?;
        let dt = grid.dt();
        let np = paths.paths();

        let mut cash_flows: Vec<S> = (0..np).map(|p| payoff.value(paths.states(p, nt))).collect();
        let mut current = nt;
        let mut reports = Vec::with_capacity(schedule.early_steps().len());

        let mut itm: Vec<Size> = Vec::with_capacity(np);
        let mut x: Vec<Real> = Vec::with_capacity(np * assets);
        let mut y: Vec<Real> = Vec::with_capacity(np);
        let mut plain = vec![0.0; assets];

        for &step in schedule.early_steps().iter().rev() {
            let df = discount(rate, dt, current - step);
            for cf in cash_flows.iter_mut() {
                *cf = *cf * df;
            }
            current = step;

            itm.clear();
            x.clear();
            y.clear();
            for (p, cf) in cash_flows.iter().enumerate() {
                for (dst, s) in plain.iter_mut().zip(paths.states(p, step)) {
                    *dst = s.value();
                }
                if payoff.in_the_money(&plain) {
                    itm.push(p);
                    x.extend_from_slice(&plain);
                    y.push(cf.value());
                }
            }

            let regression = regressor.fit(&x, &y);
            let mut exercised = 0;
            for (k, &p) in itm.iter().enumerate() {
                let Some(continuation) = regression.continuation(&x[k * assets..(k + 1) * assets]) else {
                    break;
                };
                let exercise = payoff.value(paths.states(p, step));
                if exercise.value() > continuation {
                    cash_flows[p] = exercise;
                    exercised += 1;
                }
            }

            if matches!(
                regression.outcome,
                RegressionOutcome::RankDeficient { .. } | RegressionOutcome::Failed { .. }
            ) {
                tracing::warn!(step, outcome = %regression.outcome, "degraded continuation regression");
            }
            tracing::trace!(step, in_the_money = itm.len(), exercised, "exercise date");

            reports.push(ExerciseDateReport {
                step,
                time: grid.time(step),
                in_the_money: itm.len(),
                exercised,
                regression: regression.outcome,
            });
        }

        let df = discount(rate, dt, current);
        for cf in cash_flows.iter_mut() {
            *cf = *cf * df;
        }
        reports.reverse();

        let estimate = McResult::from_samples(&cash_flows);
        tracing::debug!(
            payoff = %payoff,
            exercise = %option.exercise,
            dates = reports.len(),
            paths = np,
            value = estimate.price(),
            std_error = estimate.std_error,
            "longstaff-schwartz"
        );
        Ok(LsmResult {
            estimate,
            exercise_dates: reports,
        })
    }
}

/// `exp(−r · steps · dt)`.
fn discount<S: Scalar>(rate: S, dt: S, steps: Size) -> S {
    (-(rate * dt * steps as Real)).exp()
}

fn regression_scale(payoff: &Payoff) -> Real {
    if payoff.strike() > 0.0 {
        payoff.strike()
    } else {
        1.0
    }
}
