//! Period-by-period simulation engine
//!
//! Every run walks periods `1..=term` in order. Each period:
//!   1. builds the period feature vector from the profile and current state
//!   2. asks the regressor for the next repayment percent
//!   3. clamps the estimate so it plus the average actual percent stays below 100
//!   4. reconciles it with the observed payment (missing -> estimate)
//!   5. advances the state with the value the run mode selects for state
//!   6. appends the value the run mode selects for output
//!
//! State and output sources are chosen independently, which is what separates
//! the three public generation modes.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::series::{PassThrough, PeriodRecord, ResultSeries, SeriesTransform};
use super::state::{Payment, SimulationState};
use crate::config::SimulationConfig;
use crate::contract::{ContractProfile, Observation, ObservationWindow};
use crate::error::{ConfigError, DataShapeError, PredictorError, SimResult};
use crate::predictor::{
    ClassifierRegistry, ClusterClassifier, ClusterLabel, PeriodFeatures, RepaymentRegressor, StaticFeatures,
};
use crate::units::FULL_REPAYMENT_PERCENT;

/// Which value feeds a given sink during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueSource {
    /// The clamped regressor estimate
    Estimate,
    /// The observed payment, falling back to the estimate when missing
    Real,
}

impl ValueSource {
    fn pick(self, real: Payment, estimate: Payment) -> Payment {
        match self {
            ValueSource::Estimate => estimate,
            ValueSource::Real => real,
        }
    }
}

/// Generation mode of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Pure forecast; observed history is never consulted
    GenerateNew,
    /// Imputation: known payments are kept verbatim, gaps are estimated
    CompleteSource,
    /// One-step-ahead back-test: state follows history, output is the estimate
    ByOne,
}

impl RunMode {
    pub const ALL: [RunMode; 3] = [RunMode::GenerateNew, RunMode::CompleteSource, RunMode::ByOne];

    pub fn state_source(self) -> ValueSource {
        match self {
            RunMode::GenerateNew => ValueSource::Estimate,
            RunMode::CompleteSource | RunMode::ByOne => ValueSource::Real,
        }
    }

    pub fn output_source(self) -> ValueSource {
        match self {
            RunMode::GenerateNew | RunMode::ByOne => ValueSource::Estimate,
            RunMode::CompleteSource => ValueSource::Real,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RunMode::GenerateNew => "generate_new_series",
            RunMode::CompleteSource => "complete_source_series",
            RunMode::ByOne => "by_one_series",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cap `estimate` so that `estimate + avg_percent_actual` does not exceed 100.
///
/// Bounds the running average, not the cumulative sum. Returns the capped
/// value and whether the cap applied.
pub fn clamp_estimate(estimate: f64, avg_percent_actual: f64, epsilon: f64) -> (f64, bool) {
    if estimate + avg_percent_actual > FULL_REPAYMENT_PERCENT {
        ((FULL_REPAYMENT_PERCENT - avg_percent_actual - epsilon).max(0.0), true)
    } else {
        (estimate, false)
    }
}

/// Runs repayment simulations against an injected classifier and regressor
pub struct SimulationEngine<C, R> {
    classifier: C,
    regressor: R,
    transform: Box<dyn SeriesTransform>,
    config: SimulationConfig,
}

impl<R: RepaymentRegressor> SimulationEngine<Box<dyn ClusterClassifier>, R> {
    /// Resolve the classifier for `config.clustering` and build the engine
    pub fn from_registry(
        registry: ClassifierRegistry,
        regressor: R,
        config: SimulationConfig,
    ) -> Result<Self, ConfigError> {
        let classifier = registry.resolve(config.clustering)?;
        Self::new(classifier, regressor, config)
    }
}

impl<C: ClusterClassifier, R: RepaymentRegressor> SimulationEngine<C, R> {
    pub fn new(classifier: C, regressor: R, config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            classifier,
            regressor,
            transform: Box::new(PassThrough),
            config,
        })
    }

    /// Replace the post-processing transform (pass-through by default)
    pub fn with_transform<T: SeriesTransform + 'static>(mut self, transform: T) -> Self {
        self.transform = Box::new(transform);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Synthetic forecast that ignores any observed history
    pub fn generate_new_series(&self, profile: &ContractProfile, window: &ObservationWindow) -> SimResult<ResultSeries> {
        self.run(RunMode::GenerateNew, profile, window)
    }

    /// Fill missing periods, keep observed payments verbatim
    pub fn complete_source_series(&self, profile: &ContractProfile, window: &ObservationWindow) -> SimResult<ResultSeries> {
        self.run(RunMode::CompleteSource, profile, window)
    }

    /// One-step-ahead predictions along the observed history
    pub fn by_one_series(&self, profile: &ContractProfile, window: &ObservationWindow) -> SimResult<ResultSeries> {
        self.run(RunMode::ByOne, profile, window)
    }

    /// Cluster label for the contract
    pub fn get_cluster(&self, profile: &ContractProfile) -> SimResult<ClusterLabel> {
        let features = StaticFeatures::from_profile(profile);
        Ok(self.classifier.classify(&features)?)
    }

    /// Simulate all `term` periods in the given mode
    pub fn run(&self, mode: RunMode, profile: &ContractProfile, window: &ObservationWindow) -> SimResult<ResultSeries> {
        let term = profile.term();
        if window.term() != term {
            return Err(DataShapeError::LengthMismatch {
                len: window.term() as usize,
                term,
            }
            .into());
        }
        let contract_sum = profile.contract_sum();
        if window.contract_sum() != contract_sum {
            return Err(DataShapeError::ContractSumMismatch {
                window: window.contract_sum(),
                profile: contract_sum,
            }
            .into());
        }

        info!(
            "{}: term={} contract_sum={:.2} known_periods={}",
            mode,
            term,
            contract_sum,
            window.known_count()
        );

        let mut state = SimulationState::initial(profile);
        let mut series = ResultSeries::with_capacity(term);

        for period in 1..=term {
            let features = PeriodFeatures::assemble(profile, period, &state);
            let raw_estimate = self.regressor.predict_next(&features)?;
            if !raw_estimate.is_finite() {
                return Err(PredictorError::NonFiniteEstimate {
                    period,
                    value: raw_estimate,
                }
                .into());
            }

            let (estimate, clamped) =
                clamp_estimate(raw_estimate, state.avg_percent_actual, self.config.clamp_epsilon);
            let estimated = Payment::from_percent(estimate, contract_sum);

            let observation = window.observation(period);
            let real = match observation {
                Observation::Observed(pay) => Payment::from_pay(pay, contract_sum),
                Observation::Missing => estimated,
            };

            let state_value = mode.state_source().pick(real, estimated);
            let output_value = mode.output_source().pick(real, estimated);

            debug!(
                "{} period {}: estimate={:.6}{} observed={:?}",
                mode,
                period,
                estimate,
                if clamped { " (clamped)" } else { "" },
                observation.value()
            );

            let avg_percent_actual_before = state.avg_percent_actual;
            state.advance(profile, period, state_value, self.config.grace_tolerance);
            series.push(output_value);

            if self.config.record_trace {
                series.trace.push(PeriodRecord {
                    period,
                    raw_estimate,
                    estimate,
                    clamped,
                    observed_pay: observation.value(),
                    avg_percent_actual_before,
                    state_percent: state_value.percent,
                    output_percent: output_value.percent,
                    grace_on: state.grace_on,
                    is_grace_constant: state.is_grace_constant,
                });
            }
        }

        series.transformed_series = self.transform.transform(&series, profile, window);
        Ok(series)
    }
}
