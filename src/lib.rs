//! Repayment series simulation for installment contracts
//!
//! Back-fills and forecasts monthly repayment series from a contract profile,
//! an observed payment history, and two injected predictors: a cluster
//! classifier and a next-period regressor.

pub mod config;
pub mod contract;
pub mod error;
pub mod evaluation;
pub mod predictor;
pub mod simulation;
pub mod units;

pub use config::SimulationConfig;
pub use contract::{ContractProfile, ContractTerms, Observation, ObservationWindow};
pub use error::{SimResult, SimulationError};
pub use predictor::{ClusterClassifier, ClusterLabel, RepaymentRegressor};
pub use simulation::{ResultSeries, RunMode, SimulationEngine};
