//! Emitted series and per-period trace rows

use serde::{Deserialize, Serialize};

use super::state::Payment;
use crate::contract::{ContractProfile, ObservationWindow};

/// Detailed record of one simulated period (only kept when tracing is enabled)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub period: u32,
    /// Regressor output before the 100% clamp
    pub raw_estimate: f64,
    /// Estimate after the clamp, in percent
    pub estimate: f64,
    pub clamped: bool,
    /// Observed payment for the period, if known
    pub observed_pay: Option<f64>,
    /// Average actual percent before this period was applied
    pub avg_percent_actual_before: f64,
    /// Percent that drove the state update
    pub state_percent: f64,
    /// Percent written to the output series
    pub output_percent: f64,
    pub grace_on: u8,
    pub is_grace_constant: u8,
}

/// Output of one simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSeries {
    /// Repayment per period in percent of the contract sum
    pub percentage_series: Vec<f64>,
    /// Repayment per period in currency
    pub pay_series: Vec<f64>,
    /// Series after the post-processing transform
    pub transformed_series: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<PeriodRecord>,
}

impl ResultSeries {
    pub fn with_capacity(term: u32) -> Self {
        Self {
            percentage_series: Vec::with_capacity(term as usize),
            pay_series: Vec::with_capacity(term as usize),
            transformed_series: Vec::new(),
            trace: Vec::new(),
        }
    }

    pub fn push(&mut self, payment: Payment) {
        self.percentage_series.push(payment.percent);
        self.pay_series.push(payment.pay);
    }

    pub fn len(&self) -> usize {
        self.percentage_series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.percentage_series.is_empty()
    }

    /// Sum of emitted percentages
    pub fn total_percent(&self) -> f64 {
        self.percentage_series.iter().sum()
    }
}

/// Post-processing applied once after the period loop
pub trait SeriesTransform: Send + Sync {
    fn transform(&self, series: &ResultSeries, profile: &ContractProfile, window: &ObservationWindow) -> Vec<f64>;
}

/// Copies the percentage series unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl SeriesTransform for PassThrough {
    fn transform(&self, series: &ResultSeries, _profile: &ContractProfile, _window: &ObservationWindow) -> Vec<f64> {
        series.percentage_series.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_series_aligned() {
        let mut series = ResultSeries::with_capacity(3);
        assert!(series.is_empty());

        series.push(Payment { pay: 500.0, percent: 5.0 });
        series.push(Payment { pay: 700.0, percent: 7.0 });

        assert_eq!(series.len(), 2);
        assert_eq!(series.pay_series, vec![500.0, 700.0]);
        assert_eq!(series.total_percent(), 12.0);
    }

    #[test]
    fn test_trace_omitted_from_json_when_empty() {
        let mut series = ResultSeries::default();
        series.push(Payment { pay: 1.0, percent: 0.5 });
        let json = serde_json::to_string(&series).unwrap();
        assert!(!json.contains("trace"));
    }
}
