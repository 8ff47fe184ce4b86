//! Error taxonomy for contract construction, observation windows and runs
//!
//! Nothing here is recovered internally: construction fails fast, and a
//! predictor failure aborts the run it happened in.

use thiserror::Error;

/// Crate-wide result alias for simulation operations.
pub type SimResult<T> = Result<T, SimulationError>;

/// Malformed contract inputs, rejected at `ContractProfile` construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("unknown gender code {0:?}, expected \"M\" or \"F\"")]
    UnknownGender(String),

    #[error("unknown car category {0}, expected one of 1..=5")]
    UnknownCarCategory(i64),

    #[error("term must be positive, got {0}")]
    NonPositiveTerm(i64),

    #[error("contract sum must be positive and finite, got {0}")]
    NonPositiveContractSum(f64),

    #[error("loan to income must be positive and finite, got {0}")]
    NonPositiveLoanToIncome(f64),

    #[error("payment to income must be positive and finite, got {0}")]
    NonPositivePaymentToIncome(f64),

    #[error("grace period {grace_period} outside 0..={term}")]
    GracePeriodOutOfRange { grace_period: i64, term: u32 },

    #[error("age must be positive, got {0}")]
    NonPositiveAge(i64),

    #[error("field `{field}` is not finite: {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("scheduled list has {len} entries, term is {term}")]
    ScheduleLength { len: usize, term: u32 },
}

/// History that cannot be shaped into a `term`-long observation window.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataShapeError {
    #[error("contract sum must be positive to derive percentages, got {0}")]
    ZeroContractSum(f64),

    #[error("observed payment for period {period} is not finite: {value}")]
    NonFiniteObservation { period: usize, value: f64 },

    #[error("history has {len} entries after padding, term is {term}")]
    LengthMismatch { len: usize, term: u32 },

    #[error("window was built for contract sum {window}, profile has {profile}")]
    ContractSumMismatch { window: f64, profile: f64 },
}

/// Failure of an external classifier or regressor call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictorError {
    #[error("predictor call failed: {0}")]
    Failed(String),

    #[error("regressor returned a non-finite estimate {value} for period {period}")]
    NonFiniteEstimate { period: u32, value: f64 },
}

/// Predictor selection and configuration problems found at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown clustering method {0:?}")]
    UnknownClusteringMethod(String),

    #[error("no classifier registered for clustering method {0}")]
    UnknownClassifier(String),

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("`{field}` must be non-negative and finite, got {value}")]
    InvalidTolerance { field: &'static str, value: f64 },
}

/// Umbrella error returned by engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    DataShape(#[from] DataShapeError),

    #[error(transparent)]
    Predictor(#[from] PredictorError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
