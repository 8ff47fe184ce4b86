//! Deterministic baseline predictors
//!
//! Stand-ins for trained models when none are wired in: the regressor assumes
//! the borrower pays exactly what is scheduled, the classifier buckets
//! contracts by term.

use super::features::idx;
use super::{ClusterClassifier, ClusterLabel, PeriodFeatures, RepaymentRegressor, StaticFeatures};
use crate::error::PredictorError;

/// Predicts the scheduled percent for the period, scaled by `adherence`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleFollower {
    /// 1.0 pays on schedule, 0.9 underpays by 10%
    pub adherence: f64,
}

impl Default for ScheduleFollower {
    fn default() -> Self {
        Self { adherence: 1.0 }
    }
}

impl RepaymentRegressor for ScheduleFollower {
    fn predict_next(&self, features: &PeriodFeatures) -> Result<f64, PredictorError> {
        Ok(features.get(idx::PERCENT_SCHEDULED) * self.adherence)
    }
}

/// Labels a contract by how many term boundaries it exceeds
#[derive(Debug, Clone, PartialEq)]
pub struct TermBucketClassifier {
    /// Ascending upper bounds of each bucket, in periods
    pub boundaries: Vec<u32>,
}

impl Default for TermBucketClassifier {
    fn default() -> Self {
        Self {
            boundaries: vec![12, 36, 60],
        }
    }
}

impl ClusterClassifier for TermBucketClassifier {
    fn classify(&self, features: &StaticFeatures) -> Result<ClusterLabel, PredictorError> {
        let term = features.0[idx::TERM];
        let bucket = self.boundaries.iter().filter(|&&b| term > b as f64).count();
        Ok(ClusterLabel(bucket as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_buckets() {
        let classifier = TermBucketClassifier::default();
        let mut features = StaticFeatures([0.0; 10]);

        for (term, expected) in [(6.0, 0), (12.0, 0), (18.0, 1), (60.0, 2), (84.0, 3)] {
            features.0[idx::TERM] = term;
            assert_eq!(classifier.classify(&features).unwrap(), ClusterLabel(expected));
        }
    }

    #[test]
    fn test_schedule_follower_scales_scheduled_percent() {
        let mut features = PeriodFeatures([0.0; 34]);
        features.0[idx::PERCENT_SCHEDULED] = 20.0;

        let regressor = ScheduleFollower { adherence: 0.5 };
        assert_eq!(regressor.predict_next(&features).unwrap(), 10.0);
    }
}
