//! End-to-end properties of the three generation modes

use approx::assert_relative_eq;
use std::sync::Mutex;

use repayment_simulator::contract::{synthesize_schedule, ContractProfile, ContractTerms, Observation, ObservationWindow};
use repayment_simulator::error::PredictorError;
use repayment_simulator::predictor::features::idx;
use repayment_simulator::predictor::{FnRegressor, PeriodFeatures, RepaymentRegressor, TermBucketClassifier};
use repayment_simulator::simulation::{RunMode, SimulationEngine};
use repayment_simulator::SimulationConfig;

fn terms() -> ContractTerms {
    ContractTerms {
        term: 12,
        contract_sum: 100_000.0,
        gender: "F".to_string(),
        age: 38,
        loan_to_income: 0.5,
        payment_to_income: 10.0,
        downpayment: 15_000.0,
        car_category: 2,
        grace_period: 3,
        rate_change_after_grace: 2.0,
    }
}

fn profile() -> ContractProfile {
    ContractProfile::new(terms(), None).expect("valid profile")
}

fn history() -> Vec<Observation> {
    vec![
        Observation::Observed(20_000.0),
        Observation::Missing,
        Observation::Observed(19_000.0),
        Observation::Observed(22_000.0),
        Observation::Missing,
        Observation::Observed(21_500.0),
    ]
}

fn traced() -> SimulationConfig {
    SimulationConfig {
        record_trace: true,
        ..Default::default()
    }
}

/// Half the scheduled percent plus half the last actual percent
fn blended(features: &PeriodFeatures) -> Result<f64, PredictorError> {
    Ok(0.5 * features.get(idx::PERCENT_SCHEDULED) + 0.5 * features.get(idx::LAST_ACTUAL_PERCENT))
}

/// Records every feature vector it is asked about
struct RecordingRegressor {
    seen: Mutex<Vec<PeriodFeatures>>,
}

impl RecordingRegressor {
    fn new() -> Self {
        Self { seen: Mutex::new(Vec::new()) }
    }

    fn take(&self) -> Vec<PeriodFeatures> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }
}

impl RepaymentRegressor for RecordingRegressor {
    fn predict_next(&self, features: &PeriodFeatures) -> Result<f64, PredictorError> {
        self.seen.lock().unwrap().push(*features);
        blended(features)
    }
}

#[test]
fn grace_step_schedule_scenario() {
    let profile = profile();
    assert_eq!(profile.before_grace(), 20.0);

    let schedule = profile.scheduled_list();
    assert_eq!(schedule.len(), 12);
    for payment in &schedule[..3] {
        assert_relative_eq!(*payment, 20_000.0, max_relative = 1e-12);
    }
    for payment in &schedule[3..] {
        assert_relative_eq!(*payment, 22_000.0, max_relative = 1e-12);
    }
}

#[test]
fn before_grace_is_payment_over_loan_ratio() {
    let profile = ContractProfile::new(
        ContractTerms {
            loan_to_income: 20.0,
            payment_to_income: 4.0,
            ..terms()
        },
        None,
    )
    .unwrap();
    assert_relative_eq!(profile.before_grace(), 0.2);
    assert_eq!(profile.ratio_20(), 1);
}

#[test]
fn supplied_schedule_matching_formula_is_identical() {
    let synthesized = profile();
    let supplied = ContractProfile::new(
        terms(),
        Some(synthesize_schedule(12, 100_000.0, 20.0, 3, 2.0)),
    )
    .unwrap();
    assert_eq!(synthesized, supplied);
}

#[test]
fn every_mode_emits_term_values() {
    let profile = profile();
    let window = ObservationWindow::new(&profile, history()).unwrap();
    let engine = SimulationEngine::new(TermBucketClassifier::default(), FnRegressor(blended), traced()).unwrap();

    for mode in RunMode::ALL {
        let series = engine.run(mode, &profile, &window).unwrap();
        assert_eq!(series.percentage_series.len(), 12, "{mode}");
        assert_eq!(series.pay_series.len(), 12, "{mode}");
        assert_eq!(series.transformed_series.len(), 12, "{mode}");
        assert_eq!(series.trace.len(), 12, "{mode}");
    }
}

#[test]
fn complete_source_keeps_known_payments_verbatim() {
    let profile = profile();
    let window = ObservationWindow::new(&profile, history()).unwrap();
    let engine = SimulationEngine::new(TermBucketClassifier::default(), FnRegressor(blended), traced()).unwrap();

    let series = engine.complete_source_series(&profile, &window).unwrap();

    for (idx, observation) in window.actual_known_list().iter().enumerate() {
        match observation {
            Observation::Observed(pay) => {
                assert_eq!(series.pay_series[idx], *pay);
                assert_eq!(Some(series.percentage_series[idx]), window.actual_percent()[idx]);
            }
            Observation::Missing => {
                assert_eq!(series.percentage_series[idx], series.trace[idx].estimate);
            }
        }
    }
}

#[test]
fn generate_new_ignores_history() {
    let profile = profile();
    let with_history = ObservationWindow::new(&profile, history()).unwrap();
    let without_history = ObservationWindow::unobserved(&profile).unwrap();

    let regressor = RecordingRegressor::new();
    let engine = SimulationEngine::new(TermBucketClassifier::default(), &regressor, SimulationConfig::default()).unwrap();

    let a = engine.generate_new_series(&profile, &with_history).unwrap();
    let features_a = regressor.take();
    let b = engine.generate_new_series(&profile, &without_history).unwrap();
    let features_b = regressor.take();

    assert_eq!(a, b);
    assert_eq!(features_a.len(), 12);
    assert_eq!(features_a, features_b);
}

#[test]
fn by_one_tracks_history_but_reports_estimates() {
    let profile = profile();
    let window = ObservationWindow::new(&profile, history()).unwrap();

    let regressor = RecordingRegressor::new();
    let engine = SimulationEngine::new(TermBucketClassifier::default(), &regressor, traced()).unwrap();
    let series = engine.by_one_series(&profile, &window).unwrap();
    let features = regressor.take();

    for record in &series.trace {
        assert_eq!(record.output_percent, record.estimate);
    }
    // Period 4 sees period 3's observed payment as its last actual pay
    assert_eq!(features[3].get(idx::LAST_ACTUAL_PAY), 19_000.0);
    // Period 3 sees the estimate that filled missing period 2
    assert_relative_eq!(
        features[2].get(idx::LAST_ACTUAL_PERCENT),
        series.trace[1].estimate,
        max_relative = 1e-12
    );
    // After the history runs out, state follows the estimates
    assert_relative_eq!(
        features[7].get(idx::LAST_ACTUAL_PERCENT),
        series.trace[6].estimate,
        max_relative = 1e-12
    );
}

#[test]
fn estimate_respects_average_cap_in_every_mode() {
    let profile = profile();
    let window = ObservationWindow::new(&profile, history()).unwrap();
    let greedy = FnRegressor(|features: &PeriodFeatures| Ok::<_, PredictorError>(70.0 + features.get(idx::PERIOD)));
    let engine = SimulationEngine::new(TermBucketClassifier::default(), greedy, traced()).unwrap();

    for mode in RunMode::ALL {
        let series = engine.run(mode, &profile, &window).unwrap();
        for record in &series.trace {
            assert!(record.estimate >= 0.0);
            assert!(
                record.estimate + record.avg_percent_actual_before <= 100.0 + 1e-8,
                "{mode} period {}: {} + {}",
                record.period,
                record.estimate,
                record.avg_percent_actual_before
            );
        }
    }
}

#[test]
fn cap_bounds_average_not_cumulative_total() {
    let profile = profile();
    let window = ObservationWindow::unobserved(&profile).unwrap();
    let greedy = FnRegressor(|_: &PeriodFeatures| Ok::<_, PredictorError>(60.0));
    let engine = SimulationEngine::new(TermBucketClassifier::default(), greedy, traced()).unwrap();

    let series = engine.generate_new_series(&profile, &window).unwrap();

    // The cap holds per period, yet total repayment overshoots the contract sum.
    assert!(series.trace.iter().any(|r| r.clamped));
    assert!(series.total_percent() > 100.0);
    assert!(series.pay_series.iter().sum::<f64>() > profile.contract_sum());
}

#[test]
fn grace_constancy_never_recovers() {
    let profile = ContractProfile::new(
        ContractTerms {
            grace_period: 5,
            ..terms()
        },
        None,
    )
    .unwrap();
    let window = ObservationWindow::new(
        &profile,
        vec![
            Observation::Observed(20_000.0),
            Observation::Observed(20_000.0),
            Observation::Observed(25_000.0),
            Observation::Observed(25_000.0),
            Observation::Observed(25_000.0),
        ],
    )
    .unwrap();
    let engine = SimulationEngine::new(TermBucketClassifier::default(), FnRegressor(blended), traced()).unwrap();

    let series = engine.complete_source_series(&profile, &window).unwrap();
    let flags: Vec<u8> = series.trace.iter().map(|r| r.is_grace_constant).collect();

    assert_eq!(&flags[..2], &[1, 1]);
    assert!(flags[2..].iter().all(|&f| f == 0));
    assert!(flags.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn constant_grace_payments_keep_flag() {
    let profile = profile();
    let window = ObservationWindow::new(
        &profile,
        vec![Observation::Observed(20_000.0); 3],
    )
    .unwrap();
    let engine = SimulationEngine::new(TermBucketClassifier::default(), FnRegressor(blended), traced()).unwrap();

    let series = engine.complete_source_series(&profile, &window).unwrap();
    let grace: Vec<u8> = series.trace.iter().map(|r| r.grace_on).collect();

    assert_eq!(&grace[..3], &[1, 1, 1]);
    assert!(grace[3..].iter().all(|&g| g == 0));
    assert!(series.trace.iter().all(|r| r.is_grace_constant == 1));
}
