//! Back-test accuracy of an emitted series against the observed history

use serde::{Deserialize, Serialize};

use crate::contract::ObservationWindow;
use crate::simulation::ResultSeries;

/// Error statistics over the periods with a known payment, in percent units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub compared_periods: usize,
    pub mean_absolute_error: f64,
    pub root_mean_squared_error: f64,
    /// Largest absolute deviation and the 1-indexed period it occurred in
    pub max_absolute_error: f64,
    pub worst_period: u32,
}

impl BacktestReport {
    /// Compare `series` with observed percents; `None` when nothing is observed
    pub fn compare(series: &ResultSeries, window: &ObservationWindow) -> Option<Self> {
        let mut count = 0usize;
        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut max_abs = 0.0;
        let mut worst_period = 0u32;

        for (idx, (emitted, observed)) in series
            .percentage_series
            .iter()
            .zip(window.actual_percent())
            .enumerate()
        {
            let Some(observed) = observed else { continue };
            let error = (emitted - observed).abs();
            count += 1;
            abs_sum += error;
            sq_sum += error * error;
            if error > max_abs || worst_period == 0 {
                max_abs = error;
                worst_period = idx as u32 + 1;
            }
        }

        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(Self {
            compared_periods: count,
            mean_absolute_error: abs_sum / n,
            root_mean_squared_error: (sq_sum / n).sqrt(),
            max_absolute_error: max_abs,
            worst_period,
        })
    }
}
