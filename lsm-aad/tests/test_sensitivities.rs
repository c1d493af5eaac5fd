//! Adjoint Greeks against closed forms, lattices and finite differences.

use approx::assert_relative_eq;
use lsm_aad::autodiff::Tape;
use lsm_aad::core::Error;
use lsm_aad::instruments::{BasketKind, BermudanOption, OptionType, Payoff};
use lsm_aad::methods::{BinomialLattice, PricingConfig};
use lsm_aad::pricingengines::{
    black_scholes_merton, bump_and_revalue, BumpSizes, Greek, LongstaffSchwartzEngine,
    MarketInputs, SensitivityEngine,
};

fn engine(paths: usize, steps: usize) -> SensitivityEngine {
    let config = PricingConfig::builder()
        .paths(paths)
        .steps(steps)
        .seed(31)
        .build()
        .unwrap();
    SensitivityEngine::new(config).unwrap()
}

#[test]
fn european_call_greeks_have_the_right_sign_and_size() {
    let market = MarketInputs::new(100.0, 0.25, 0.01, 2.0).unwrap();
    let call = Payoff::vanilla(OptionType::Call, 90.0).unwrap();
    let report = engine(20_000, 10)
        .longstaff_schwartz(&BermudanOption::european(call), &market)
        .unwrap();
    let bs = black_scholes_merton(OptionType::Call, 100.0, 90.0, 0.01, 0.0, 0.25, 2.0);

    let delta = report.delta().unwrap();
    let vega = report.vega().unwrap();
    assert!(delta > 0.0 && vega > 0.0);
    assert_relative_eq!(delta, bs.delta, epsilon = 0.03);
    assert_relative_eq!(vega, bs.vega, epsilon = 2.0);
    assert_relative_eq!(report.value, bs.price, epsilon = 4.0 * report.std_error);
}

#[test]
fn american_put_delta_matches_lattice() {
    let (s, k, sigma, r, t) = (36.0, 40.0, 0.2, 0.06, 1.0);
    let option = BermudanOption::american(Payoff::vanilla(OptionType::Put, k).unwrap());
    let market = MarketInputs::new(s, sigma, r, t).unwrap();
    let report = engine(20_000, 50).longstaff_schwartz(&option, &market).unwrap();

    let tape = Tape::new();
    let spot = tape.input(s);
    let tree = BinomialLattice::cox_ross_rubinstein(
        spot,
        tape.input(sigma),
        tape.input(r),
        tape.input(t),
        200,
    )
    .unwrap();
    let schedule = option.exercise.schedule(200, t, 1).unwrap();
    let value = tree.price(&option.payoff, &schedule).unwrap();
    let tree_delta = tape.gradient(&value).wrt(&spot).unwrap();

    let delta = report.delta().unwrap();
    assert!(delta < 0.0 && delta > -1.0);
    assert!((delta - tree_delta).abs() < 0.05, "lsm {delta} vs tree {tree_delta}");
    assert!(report.vega().unwrap() > 0.0);
    assert!(report.rho().unwrap() < 0.0);
}

#[test]
fn bermudan_vega_is_non_negative() {
    for (spot, strike) in [(90.0, 100.0), (100.0, 100.0), (110.0, 100.0)] {
        let market = MarketInputs::new(spot, 0.3, 0.05, 1.0).unwrap();
        let option = BermudanOption::american(Payoff::vanilla(OptionType::Put, strike).unwrap());
        let report = engine(5_000, 12).longstaff_schwartz(&option, &market).unwrap();
        assert!(report.vega().unwrap() >= 0.0, "spot {spot}");
    }
}

#[test]
fn european_adjoint_agrees_with_bumping() {
    let market = MarketInputs::basket(vec![100.0, 95.0], vec![0.2, 0.3], 0.03, 1.0).unwrap();
    let payoff = Payoff::basket(OptionType::Call, 100.0, BasketKind::BestOf, 2).unwrap();
    let config = PricingConfig::builder().paths(20_000).steps(4).seed(2).build().unwrap();
    let option = BermudanOption::european(payoff);

    let ls = LongstaffSchwartzEngine::new(config.clone()).unwrap();
    let fd = bump_and_revalue(&market, &BumpSizes::default(), |m| Ok(ls.price(&option, m)?.price())).unwrap();
    let aad = SensitivityEngine::new(config).unwrap().longstaff_schwartz(&option, &market).unwrap();

    assert_eq!(aad.greeks.len(), fd.len());
    for (greek, bumped) in &fd {
        let adjoint = aad.get(*greek).unwrap();
        assert_relative_eq!(adjoint, *bumped, max_relative = 0.02, epsilon = 0.01);
    }
}

#[test]
fn disconnected_parameters_are_reported_individually() {
    let market = MarketInputs::basket(vec![100.0, 1.0], vec![0.2, 0.1], 0.02, 1.0).unwrap();
    let payoff = Payoff::basket(OptionType::Call, 90.0, BasketKind::BestOf, 2).unwrap();
    let report = engine(2_000, 4).european(&payoff, &market).unwrap();

    assert!(report.get(Greek::Delta(0)).is_ok());
    assert!(report.get(Greek::Vega(0)).is_ok());
    assert!(report.rho().is_ok());
    assert!(report.theta().is_ok());
    for greek in [Greek::Delta(1), Greek::Vega(1)] {
        match report.get(greek) {
            Err(Error::GraphDisconnected { parameter }) => assert_eq!(parameter, greek.parameter()),
            other => panic!("{greek}: expected a disconnected graph, got {other:?}"),
        }
    }
}

#[test]
fn greeks_are_reproducible() {
    let market = MarketInputs::new(100.0, 0.2, 0.05, 1.0).unwrap();
    let option = BermudanOption::american(Payoff::vanilla(OptionType::Put, 100.0).unwrap());
    let a = engine(2_000, 10).longstaff_schwartz(&option, &market).unwrap();
    let b = engine(2_000, 10).longstaff_schwartz(&option, &market).unwrap();
    assert_eq!(a.value, b.value);
    for greek in a.greeks.keys() {
        assert_eq!(a.get(*greek).unwrap(), b.get(*greek).unwrap());
    }
}
