//! Credit valuation adjustment under a stochastic default intensity.
//!
//! The counterparty's intensity `λ` follows CIR or CIR++ and is simulated
//! independently of the underlyings. Path `i` survives to maturity with
//! probability
//!
//! ```text
//! Q_i = exp(−Σ_{j<NT} λ_i(t_j) Δt)
//! ```
//!
//! and the adjustment on a terminal payoff is
//!
//! ```text
//! CVA = LGD · mean((1 − Q_i) · e^{−rT} · payoff_i)
//! ```

use crate::{LongstaffSchwartzEngine, LsmResult, MarketInputs};
use lsm_autodiff::{mean, Scalar};
use lsm_core::{ensure, require, Real, Result, Size};
use lsm_instruments::{BermudanOption, Payoff};
use lsm_methods::{McResult, PathSimulator, PricingConfig, SimulationGrid};
use lsm_processes::{CirPlusPlusProcess, IntensityProcess, StochasticProcess};

/// Offset between the seeds of the underlying and intensity streams.
const INTENSITY_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

/// Dynamics of the default intensity.
#[derive(Debug, Clone)]
pub enum IntensityModel<S> {
    /// Plain CIR.
    Cir(IntensityProcess<S>),
    /// CIR plus a deterministic shift.
    CirPlusPlus(CirPlusPlusProcess<S>),
}

impl<S: Scalar> IntensityModel<S> {
    /// The model as a simulatable process.
    pub fn process(&self) -> &dyn StochasticProcess<S> {
        match self {
            Self::Cir(p) => p,
            Self::CirPlusPlus(p) => p,
        }
    }

    fn lift<T: Scalar>(&self) -> IntensityModel<T> {
        match self {
            Self::Cir(p) => IntensityModel::Cir(p.lift()),
            Self::CirPlusPlus(p) => IntensityModel::CirPlusPlus(p.lift()),
        }
    }
}

/// Counterparty credit inputs.
#[derive(Debug, Clone)]
pub struct CreditInputs<S> {
    initial_intensity: S,
    model: IntensityModel<S>,
    loss_given_default: Real,
}

impl<S: Scalar> CreditInputs<S> {
    /// `λ0 ≥ 0` and `LGD ∈ [0, 1]`.
    pub fn new(initial_intensity: S, model: IntensityModel<S>, loss_given_default: Real) -> Result<Self> {
        ensure!(
            initial_intensity.value() >= 0.0,
            "initial intensity must be non-negative, got {}",
            initial_intensity.value()
        );
        ensure!(
            (0.0..=1.0).contains(&loss_given_default),
            "loss given default must be in [0, 1], got {loss_given_default}"
        );
        Ok(Self {
            initial_intensity,
            model,
            loss_given_default,
        })
    }

    /// `λ0`.
    pub fn initial_intensity(&self) -> S {
        self.initial_intensity
    }

    /// Intensity dynamics.
    pub fn model(&self) -> &IntensityModel<S> {
        &self.model
    }

    /// Fraction of exposure lost on default.
    pub fn loss_given_default(&self) -> Real {
        self.loss_given_default
    }

    /// The same inputs over another scalar type, starting from `λ0`.
    pub(crate) fn rebind<T: Scalar>(&self, initial_intensity: T) -> CreditInputs<T> {
        CreditInputs {
            initial_intensity,
            model: self.model.lift(),
            loss_given_default: self.loss_given_default,
        }
    }
}

/// Output of [`CvaEngine::calculate`].
#[derive(Debug, Clone, Copy)]
pub struct CvaResult<S> {
    /// The adjustment.
    pub cva: McResult<S>,
    /// Default-free value of the payoff on the same paths.
    pub undefaulted: McResult<S>,
    /// Survival probability to maturity, averaged over intensity paths.
    pub survival: McResult<S>,
}

impl<S: Scalar> CvaResult<S> {
    /// Default-free value less the adjustment.
    pub fn adjusted_value(&self) -> S {
        self.undefaulted.value - self.cva.value
    }
}

/// Survival probability to the grid's horizon on each simulated
/// intensity path.
pub fn survival_probabilities<S: Scalar>(
    config: &PricingConfig,
    grid: &SimulationGrid<S>,
    credit: &CreditInputs<S>,
) -> Result<Vec<S>> {
    let simulator = PathSimulator::from_config(config)?.reseeded(config.seed.wrapping_add(INTENSITY_SEED_OFFSET));
    let intensities = simulator.simulate(grid, &[credit.initial_intensity], &[credit.model.process()])?;
    let nt = grid.steps();
    let dt = grid.dt();
    Ok((0..intensities.paths())
        .map(|p| {
            let mut hazard = S::from_real(0.0);
            for j in 0..nt {
                hazard = hazard + intensities.state(p, j, 0);
            }
            (-(hazard * dt)).exp()
        })
        .collect())
}

/// Unilateral CVA engine.
#[derive(Debug, Clone)]
pub struct CvaEngine {
    config: PricingConfig,
}

impl CvaEngine {
    /// Engine with a validated configuration.
    pub fn new(config: PricingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use.
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// CVA of a terminal `payoff` against a counterparty with `credit`.
    pub fn calculate<S: Scalar>(
        &self,
        payoff: &Payoff,
        market: &MarketInputs<S>,
        credit: &CreditInputs<S>,
    ) -> Result<CvaResult<S>> {
        require!(
            payoff.assets() == market.assets(),
            "payoff on {} underlyings but market of {}",
            payoff.assets(),
            market.assets()
        );
        let (grid, paths) = market.simulate(&self.config)?;
        let survival = survival_probabilities(&self.config, &grid, credit)?;
        let nt = grid.steps();
        let df = market.discount(grid.dt() * nt as Real);
        let lgd = credit.loss_given_default;

        let np: Size = paths.paths();
        let mut exposures = Vec::with_capacity(np);
        let mut losses = Vec::with_capacity(np);
        for (p, &q) in survival.iter().enumerate() {
            let exposure = payoff.value(paths.states(p, nt)) * df;
            losses.push((S::from_real(1.0) - q) * exposure * lgd);
            exposures.push(exposure);
        }

        let result = CvaResult {
            cva: McResult::from_samples(&losses),
            undefaulted: McResult::from_samples(&exposures),
            survival: McResult::from_samples(&survival),
        };
        tracing::debug!(
            payoff = %payoff,
            cva = result.cva.price(),
            undefaulted = result.undefaulted.price(),
            survival = result.survival.price(),
            "cva"
        );
        Ok(result)
    }

    /// Longstaff-Schwartz value of `option` scaled by the mean survival
    /// probability to maturity.
    pub fn defaultable_value<S: Scalar>(
        &self,
        option: &BermudanOption,
        market: &MarketInputs<S>,
        credit: &CreditInputs<S>,
    ) -> Result<LsmResult<S>> {
        let engine = LongstaffSchwartzEngine::new(self.config.clone())?;
        let undefaulted = engine.price(option, market)?;
        let grid = SimulationGrid::new(market.maturity(), self.config.steps)?;
        let survival = mean(&survival_probabilities(&self.config, &grid, credit)?);
        tracing::debug!(survival = survival.value(), "defaultable longstaff-schwartz");
        Ok(undefaulted.scaled(survival))
    }
}
