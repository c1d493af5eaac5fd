//! Credit valuation adjustment under CIR and CIR++ intensities.

use approx::assert_relative_eq;
use lsm_aad::instruments::{BermudanOption, OptionType, Payoff};
use lsm_aad::methods::{PricingConfig, SimulationGrid};
use lsm_aad::pricingengines::{
    survival_probabilities, CreditInputs, CvaEngine, Greek, IntensityModel, MarketInputs,
    SensitivityEngine,
};
use lsm_aad::processes::{CirPlusPlusProcess, IntensityProcess, ShiftFunction};

fn config() -> PricingConfig {
    PricingConfig::builder().paths(10_000).steps(50).seed(77).build().unwrap()
}

fn cir(speed: f64, mean: f64, vol: f64) -> IntensityModel<f64> {
    IntensityModel::Cir(IntensityProcess::new(speed, mean, vol).unwrap())
}

#[test]
fn cva_grows_with_credit_risk() {
    let market = MarketInputs::new(100.0, 0.2, 0.03, 2.0).unwrap();
    let call = Payoff::vanilla(OptionType::Call, 100.0).unwrap();
    let engine = CvaEngine::new(config()).unwrap();

    let mut previous = 0.0;
    for lambda0 in [0.01, 0.03, 0.06] {
        let credit = CreditInputs::new(lambda0, cir(0.8, lambda0, 0.1), 0.6).unwrap();
        let r = engine.calculate(&call, &market, &credit).unwrap();
        assert!(r.cva.value > previous, "λ0 = {lambda0}");
        assert!(r.adjusted_value() < r.undefaulted.value);
        previous = r.cva.value;
    }
}

#[test]
fn mean_survival_matches_cir_bond_price() {
    // E[exp(−∫λ)] under CIR has a closed form; with Feller satisfied and a
    // fine grid the Euler estimate sits close to it.
    let (k, theta, nu, lambda0, t) = (0.5f64, 0.04f64, 0.1f64, 0.03f64, 2.0f64);
    let h = (k * k + 2.0 * nu * nu).sqrt();
    let denom = 2.0 * h + (k + h) * ((h * t).exp() - 1.0);
    let a = (2.0 * h * ((k + h) * t / 2.0).exp() / denom).powf(2.0 * k * theta / (nu * nu));
    let b = 2.0 * ((h * t).exp() - 1.0) / denom;
    let exact = a * (-b * lambda0).exp();

    let cfg = PricingConfig::builder().paths(20_000).steps(200).seed(4).build().unwrap();
    let grid = SimulationGrid::new(t, 200).unwrap();
    let credit = CreditInputs::new(lambda0, cir(k, theta, nu), 0.6).unwrap();
    let q = survival_probabilities(&cfg, &grid, &credit).unwrap();
    let mean = q.iter().sum::<f64>() / q.len() as f64;
    assert_relative_eq!(mean, exact, epsilon = 2e-3);
}

#[test]
fn cir_plus_plus_shift_lowers_survival() {
    let market = MarketInputs::new(100.0, 0.2, 0.03, 1.0).unwrap();
    let call = Payoff::vanilla(OptionType::Call, 100.0).unwrap();
    let engine = CvaEngine::new(config()).unwrap();
    let base = IntensityProcess::new(0.5, 0.02, 0.1).unwrap();

    let plain = CreditInputs::new(0.02, IntensityModel::Cir(base), 0.6).unwrap();
    let shifted = CreditInputs::new(
        0.02,
        IntensityModel::CirPlusPlus(CirPlusPlusProcess::new(base, ShiftFunction::constant(0.01))),
        0.6,
    )
    .unwrap();
    let a = engine.calculate(&call, &market, &plain).unwrap();
    let b = engine.calculate(&call, &market, &shifted).unwrap();
    // same intensity shocks: survival falls by exactly exp(−0.01·T) per path
    assert_relative_eq!(b.survival.value, a.survival.value * (-0.01f64).exp(), max_relative = 1e-10);
    assert!(b.cva.value > a.cva.value);
}

#[test]
fn intensity_sensitivity_is_positive() {
    let market = MarketInputs::new(100.0, 0.2, 0.03, 2.0).unwrap();
    let call = Payoff::vanilla(OptionType::Call, 100.0).unwrap();
    let credit = CreditInputs::new(0.03, cir(0.8, 0.03, 0.15), 0.6).unwrap();
    let sens = SensitivityEngine::new(
        PricingConfig::builder().paths(4_000).steps(24).seed(9).build().unwrap(),
    )
    .unwrap();

    let report = sens.cva(&call, &market, &credit).unwrap();
    assert!(report.get(Greek::IntensityDelta).unwrap() > 0.0);
    assert!(report.delta().unwrap() > 0.0);
    assert!(report.vega().unwrap() > 0.0);

    let option = BermudanOption::american(Payoff::vanilla(OptionType::Put, 100.0).unwrap());
    let risky = sens.defaultable_longstaff_schwartz(&option, &market, &credit).unwrap();
    assert!(risky.get(Greek::IntensityDelta).unwrap() < 0.0);
    assert!(risky.delta().unwrap() < 0.0);
}
