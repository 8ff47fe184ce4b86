//! Static contract attributes and derived ratios

use serde::{Deserialize, Serialize};
use std::fmt;

use super::schedule::synthesize_schedule;
use crate::error::ValidationError;

/// Borrower gender as coded in the static dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse the dataset code ("M" or "F")
    pub fn from_code(code: &str) -> Result<Self, ValidationError> {
        match code {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            other => Err(ValidationError::UnknownGender(other.to_string())),
        }
    }

    /// Numeric encoding used in feature vectors (M = 1, F = 0)
    pub fn index(self) -> u8 {
        match self {
            Gender::Male => 1,
            Gender::Female => 0,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Vehicle category, one of the five codes 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarCategory(u8);

impl CarCategory {
    pub fn new(code: i64) -> Result<Self, ValidationError> {
        match code {
            1..=5 => Ok(CarCategory(code as u8)),
            other => Err(ValidationError::UnknownCarCategory(other)),
        }
    }

    pub fn code(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for CarCategory {
    type Error = ValidationError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        CarCategory::new(code)
    }
}

/// Raw, unvalidated contract attributes as delivered by a loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    /// Number of monthly periods in the contract (e.g. 6, 12, 18, 60, 84, 120)
    pub term: i64,
    /// Amount financed
    pub contract_sum: f64,
    /// "M" or "F"
    pub gender: String,
    /// Age at contract start
    pub age: i64,
    pub loan_to_income: f64,
    pub payment_to_income: f64,
    pub downpayment: f64,
    /// Should be one of 1..=5
    pub car_category: i64,
    /// Number of leading periods at the grace rate
    pub grace_period: i64,
    /// Rate change applied after the grace period, in percent points
    pub rate_change_after_grace: f64,
}

/// Validated, immutable contract profile
///
/// Construction validates the categorical codes and numeric ranges, derives
/// `before_grace` and the loan-to-income threshold flags, and fixes the
/// scheduled payment list to exactly `term` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractProfile {
    term: u32,
    contract_sum: f64,
    gender: Gender,
    age: u32,
    loan_to_income: f64,
    payment_to_income: f64,
    downpayment: f64,
    car_category: CarCategory,
    grace_period: u32,
    rate_change_after_grace: f64,
    before_grace: f64,
    scheduled_list: Vec<f64>,
}

impl ContractProfile {
    /// Build a profile; when `scheduled_list` is `None` the schedule is
    /// synthesized from the grace terms.
    pub fn new(terms: ContractTerms, scheduled_list: Option<Vec<f64>>) -> Result<Self, ValidationError> {
        let gender = Gender::from_code(&terms.gender)?;
        let car_category = CarCategory::new(terms.car_category)?;

        if terms.term <= 0 || terms.term > u32::MAX as i64 {
            return Err(ValidationError::NonPositiveTerm(terms.term));
        }
        let term = terms.term as u32;

        if !terms.contract_sum.is_finite() || terms.contract_sum <= 0.0 {
            return Err(ValidationError::NonPositiveContractSum(terms.contract_sum));
        }
        if !terms.loan_to_income.is_finite() || terms.loan_to_income <= 0.0 {
            return Err(ValidationError::NonPositiveLoanToIncome(terms.loan_to_income));
        }
        if !terms.payment_to_income.is_finite() || terms.payment_to_income <= 0.0 {
            return Err(ValidationError::NonPositivePaymentToIncome(terms.payment_to_income));
        }
        if terms.age <= 0 || terms.age > u32::MAX as i64 {
            return Err(ValidationError::NonPositiveAge(terms.age));
        }
        if terms.grace_period < 0 || terms.grace_period > terms.term {
            return Err(ValidationError::GracePeriodOutOfRange {
                grace_period: terms.grace_period,
                term,
            });
        }
        for (field, value) in [
            ("downpayment", terms.downpayment),
            ("rate_change_after_grace", terms.rate_change_after_grace),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field, value });
            }
        }
        let grace_period = terms.grace_period as u32;
        let before_grace = terms.payment_to_income / terms.loan_to_income;

        let scheduled_list = match scheduled_list {
            Some(list) => {
                if list.len() != term as usize {
                    return Err(ValidationError::ScheduleLength { len: list.len(), term });
                }
                if let Some(&value) = list.iter().find(|v| !v.is_finite()) {
                    return Err(ValidationError::NonFinite { field: "scheduled_list", value });
                }
                list
            }
            None => synthesize_schedule(
                term,
                terms.contract_sum,
                before_grace,
                grace_period,
                terms.rate_change_after_grace,
            ),
        };

        Ok(Self {
            term,
            contract_sum: terms.contract_sum,
            gender,
            age: terms.age as u32,
            loan_to_income: terms.loan_to_income,
            payment_to_income: terms.payment_to_income,
            downpayment: terms.downpayment,
            car_category,
            grace_period,
            rate_change_after_grace: terms.rate_change_after_grace,
            before_grace,
            scheduled_list,
        })
    }

    pub fn term(&self) -> u32 {
        self.term
    }

    pub fn contract_sum(&self) -> f64 {
        self.contract_sum
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn idx_gender(&self) -> u8 {
        self.gender.index()
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn loan_to_income(&self) -> f64 {
        self.loan_to_income
    }

    pub fn payment_to_income(&self) -> f64 {
        self.payment_to_income
    }

    pub fn downpayment(&self) -> f64 {
        self.downpayment
    }

    pub fn car_category(&self) -> CarCategory {
        self.car_category
    }

    pub fn grace_period(&self) -> u32 {
        self.grace_period
    }

    pub fn rate_change_after_grace(&self) -> f64 {
        self.rate_change_after_grace
    }

    /// Payment-to-income over loan-to-income
    pub fn before_grace(&self) -> f64 {
        self.before_grace
    }

    /// 1 if loan to income is at least `threshold`, else 0
    fn ratio_flag(&self, threshold: f64) -> u8 {
        u8::from(self.loan_to_income >= threshold)
    }

    pub fn ratio_10(&self) -> u8 {
        self.ratio_flag(10.0)
    }

    pub fn ratio_20(&self) -> u8 {
        self.ratio_flag(20.0)
    }

    pub fn ratio_30(&self) -> u8 {
        self.ratio_flag(30.0)
    }

    pub fn ratio_40(&self) -> u8 {
        self.ratio_flag(40.0)
    }

    /// Scheduled payment per period, always `term` entries
    pub fn scheduled_list(&self) -> &[f64] {
        &self.scheduled_list
    }
}
