//! External predictor contract: cluster classifier and next-period regressor
//!
//! Both predictors are opaque collaborators. The engine only hands them the
//! fixed-order feature vectors from [`features`] and treats any failure or
//! non-finite output as fatal for the run.

pub mod features;
pub mod registry;
pub mod baseline;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PredictorError;

pub use features::{PeriodFeatures, StaticFeatures, PERIOD_FEATURE_NAMES, STATIC_FEATURE_NAMES};
pub use registry::{ClassifierRegistry, ClusteringMethod};
pub use baseline::{ScheduleFollower, TermBucketClassifier};

/// Behavioural cluster assigned to a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterLabel(pub i64);

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Assigns a contract to a repayment-behaviour cluster from its static features
pub trait ClusterClassifier: Send + Sync {
    fn classify(&self, features: &StaticFeatures) -> Result<ClusterLabel, PredictorError>;
}

/// Predicts the next period's repayment, in percent of the contract sum
pub trait RepaymentRegressor: Send + Sync {
    fn predict_next(&self, features: &PeriodFeatures) -> Result<f64, PredictorError>;
}

impl<T: ClusterClassifier + ?Sized> ClusterClassifier for Box<T> {
    fn classify(&self, features: &StaticFeatures) -> Result<ClusterLabel, PredictorError> {
        (**self).classify(features)
    }
}

impl<T: RepaymentRegressor + ?Sized> RepaymentRegressor for Box<T> {
    fn predict_next(&self, features: &PeriodFeatures) -> Result<f64, PredictorError> {
        (**self).predict_next(features)
    }
}

impl<T: ClusterClassifier + ?Sized> ClusterClassifier for &T {
    fn classify(&self, features: &StaticFeatures) -> Result<ClusterLabel, PredictorError> {
        (**self).classify(features)
    }
}

impl<T: RepaymentRegressor + ?Sized> RepaymentRegressor for &T {
    fn predict_next(&self, features: &PeriodFeatures) -> Result<f64, PredictorError> {
        (**self).predict_next(features)
    }
}

/// Adapts a closure into a [`ClusterClassifier`]
pub struct FnClassifier<F>(pub F);

impl<F> ClusterClassifier for FnClassifier<F>
where
    F: Fn(&StaticFeatures) -> Result<ClusterLabel, PredictorError> + Send + Sync,
{
    fn classify(&self, features: &StaticFeatures) -> Result<ClusterLabel, PredictorError> {
        (self.0)(features)
    }
}

/// Adapts a closure into a [`RepaymentRegressor`]
pub struct FnRegressor<F>(pub F);

impl<F> RepaymentRegressor for FnRegressor<F>
where
    F: Fn(&PeriodFeatures) -> Result<f64, PredictorError> + Send + Sync,
{
    fn predict_next(&self, features: &PeriodFeatures) -> Result<f64, PredictorError> {
        (self.0)(features)
    }
}
