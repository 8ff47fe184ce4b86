//! Fixed-order feature vectors handed to the predictors
//!
//! The order below is the binding contract with trained models. Never reorder,
//! insert or drop a column without retraining the predictors against it.

use crate::contract::ContractProfile;
use crate::simulation::SimulationState;

pub const STATIC_FEATURE_COUNT: usize = 10;
pub const PERIOD_FEATURE_COUNT: usize = 34;

/// Column names of [`StaticFeatures`], in order
pub const STATIC_FEATURE_NAMES: [&str; STATIC_FEATURE_COUNT] = [
    "term",
    "contract_sum",
    "idx_gender",
    "age",
    "loan_to_income",
    "payment_to_income",
    "downpayment",
    "car_category",
    "grace_period",
    "rate_change_after_grace",
];

/// Column names of [`PeriodFeatures`], in order
pub const PERIOD_FEATURE_NAMES: [&str; PERIOD_FEATURE_COUNT] = [
    "term",
    "contract_sum",
    "idx_gender",
    "age",
    "loan_to_income",
    "payment_to_income",
    "downpayment",
    "car_category",
    "grace_period",
    "rate_change_after_grace",
    "period",
    "pay_scheduled",
    "accumulated_pay_scheduled",
    "accumulated_pay_actual",
    "avg_pay_scheduled",
    "avg_pay_actual",
    "last_actual_pay",
    "prelast_actual_pay",
    "prepre_actual_pay",
    "before_grace",
    "percent_scheduled",
    "accumulated_percent_actual",
    "accumulated_percent_scheduled",
    "avg_percent_actual",
    "avg_percent_scheduled",
    "grace_on",
    "last_actual_percent",
    "prelast_actual_percent",
    "prepre_actual_percent",
    "ratio_10",
    "ratio_20",
    "ratio_30",
    "ratio_40",
    "is_grace_constant",
];

/// Column positions inside [`PeriodFeatures`]
pub mod idx {
    pub const TERM: usize = 0;
    pub const CONTRACT_SUM: usize = 1;
    pub const PERIOD: usize = 10;
    pub const PAY_SCHEDULED: usize = 11;
    pub const ACCUMULATED_PAY_ACTUAL: usize = 13;
    pub const LAST_ACTUAL_PAY: usize = 16;
    pub const BEFORE_GRACE: usize = 19;
    pub const PERCENT_SCHEDULED: usize = 20;
    pub const AVG_PERCENT_ACTUAL: usize = 23;
    pub const GRACE_ON: usize = 25;
    pub const LAST_ACTUAL_PERCENT: usize = 26;
    pub const IS_GRACE_CONSTANT: usize = 33;
}

/// Per-contract vector consumed by the cluster classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticFeatures(pub [f64; STATIC_FEATURE_COUNT]);

impl StaticFeatures {
    pub fn from_profile(profile: &ContractProfile) -> Self {
        StaticFeatures([
            profile.term() as f64,
            profile.contract_sum(),
            profile.idx_gender() as f64,
            profile.age() as f64,
            profile.loan_to_income(),
            profile.payment_to_income(),
            profile.downpayment(),
            profile.car_category().code() as f64,
            profile.grace_period() as f64,
            profile.rate_change_after_grace(),
        ])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Per-period vector consumed by the next-period regressor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodFeatures(pub [f64; PERIOD_FEATURE_COUNT]);

impl PeriodFeatures {
    /// Assemble the vector for 1-indexed `period` from the state before that
    /// period is applied.
    pub fn assemble(profile: &ContractProfile, period: u32, state: &SimulationState) -> Self {
        let s = StaticFeatures::from_profile(profile).0;
        PeriodFeatures([
            s[0],
            s[1],
            s[2],
            s[3],
            s[4],
            s[5],
            s[6],
            s[7],
            s[8],
            s[9],
            period as f64,
            state.pay_scheduled,
            state.accumulated_pay_scheduled,
            state.accumulated_pay_actual,
            state.avg_pay_scheduled,
            state.avg_pay_actual,
            state.last_actual_pay,
            state.prelast_actual_pay,
            state.prepre_actual_pay,
            profile.before_grace(),
            state.percent_scheduled,
            state.accumulated_percent_actual,
            state.accumulated_percent_scheduled,
            state.avg_percent_actual,
            state.avg_percent_scheduled,
            state.grace_on as f64,
            state.last_actual_percent,
            state.prelast_actual_percent,
            state.prepre_actual_percent,
            profile.ratio_10() as f64,
            profile.ratio_20() as f64,
            profile.ratio_30() as f64,
            profile.ratio_40() as f64,
            state.is_grace_constant as f64,
        ])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, column: usize) -> f64 {
        self.0[column]
    }
}
