//! Load contracts from the semicolon-separated static and repayment datasets
//!
//! `Static.csv` carries one row per contract; `Repayments.csv` carries one row
//! per period, in period order, joined on `CONTRACT_ID`. An empty
//! `REPAYMENT_ACTUAL` cell marks a missing payment.

use log::info;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use super::{ContractProfile, ContractTerms, Observation, ObservationWindow};
use crate::error::SimulationError;

/// Where a contract's scheduled payments come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleSource {
    /// Use the `REPAYMENT_SCHEDULED` column
    #[default]
    Supplied,
    /// Ignore the column and synthesize from the grace terms
    Synthesized,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("contract {contract_id}: scheduled payment missing for period {period}")]
    MissingSchedule { contract_id: String, period: usize },

    #[error("contract {contract_id}: {source}")]
    Contract {
        contract_id: String,
        #[source]
        source: SimulationError,
    },
}

/// A fully constructed contract ready for simulation
#[derive(Debug, Clone)]
pub struct ContractRecord {
    pub contract_id: String,
    pub profile: ContractProfile,
    pub window: ObservationWindow,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct StaticRow {
    contract_id: String,
    term: i64,
    contract_sum: f64,
    gender: String,
    age: i64,
    loan_to_income: f64,
    payment_to_income: f64,
    downpayment: f64,
    car_category: i64,
    grace_period: i64,
    rate_change_after_grace: f64,
}

impl StaticRow {
    fn terms(&self) -> ContractTerms {
        ContractTerms {
            term: self.term,
            contract_sum: self.contract_sum,
            gender: self.gender.clone(),
            age: self.age,
            loan_to_income: self.loan_to_income,
            payment_to_income: self.payment_to_income,
            downpayment: self.downpayment,
            car_category: self.car_category,
            grace_period: self.grace_period,
            rate_change_after_grace: self.rate_change_after_grace,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RepaymentRow {
    contract_id: String,
    repayment_scheduled: Option<f64>,
    repayment_actual: Option<f64>,
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(b';').trim(csv::Trim::All);
    builder
}

/// Load and join both datasets from disk
pub fn load_contracts<P: AsRef<Path>, Q: AsRef<Path>>(
    static_path: P,
    repayments_path: Q,
    schedule: ScheduleSource,
) -> Result<Vec<ContractRecord>, LoadError> {
    let static_reader = reader_builder().from_path(static_path)?;
    let repayments_reader = reader_builder().from_path(repayments_path)?;
    join_contracts(static_reader, repayments_reader, schedule)
}

/// Load and join both datasets from arbitrary readers
pub fn load_contracts_from_readers<S: Read, R: Read>(
    static_data: S,
    repayments_data: R,
    schedule: ScheduleSource,
) -> Result<Vec<ContractRecord>, LoadError> {
    join_contracts(
        reader_builder().from_reader(static_data),
        reader_builder().from_reader(repayments_data),
        schedule,
    )
}

fn join_contracts<S: Read, R: Read>(
    mut static_reader: csv::Reader<S>,
    mut repayments_reader: csv::Reader<R>,
    schedule: ScheduleSource,
) -> Result<Vec<ContractRecord>, LoadError> {
    let mut repayments: HashMap<String, Vec<RepaymentRow>> = HashMap::new();
    for row in repayments_reader.deserialize() {
        let row: RepaymentRow = row?;
        repayments.entry(row.contract_id.clone()).or_default().push(row);
    }

    let mut contracts = Vec::new();
    for row in static_reader.deserialize() {
        let row: StaticRow = row?;
        let periods = repayments.remove(&row.contract_id).unwrap_or_default();
        contracts.push(build_record(&row, &periods, schedule)?);
    }

    info!(
        "loaded {} contracts ({} repayment groups without a static row)",
        contracts.len(),
        repayments.len()
    );
    Ok(contracts)
}

fn build_record(
    row: &StaticRow,
    periods: &[RepaymentRow],
    schedule: ScheduleSource,
) -> Result<ContractRecord, LoadError> {
    let contract_error = |source: SimulationError| LoadError::Contract {
        contract_id: row.contract_id.clone(),
        source,
    };

    let scheduled_list = match schedule {
        ScheduleSource::Synthesized => None,
        ScheduleSource::Supplied => Some(
            periods
                .iter()
                .enumerate()
                .map(|(idx, p)| {
                    p.repayment_scheduled.ok_or_else(|| LoadError::MissingSchedule {
                        contract_id: row.contract_id.clone(),
                        period: idx + 1,
                    })
                })
                .collect::<Result<Vec<f64>, LoadError>>()?,
        ),
    };

    let profile = ContractProfile::new(row.terms(), scheduled_list).map_err(|e| contract_error(e.into()))?;
    let history = periods.iter().map(|p| Observation::from(p.repayment_actual));
    let window = ObservationWindow::new(&profile, history).map_err(|e| contract_error(e.into()))?;

    Ok(ContractRecord {
        contract_id: row.contract_id.clone(),
        profile,
        window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATIC: &str = "\
CONTRACT_ID;TERM;CONTRACT_SUM;GENDER;AGE;LOAN_TO_INCOME;PAYMENT_TO_INCOME;DOWNPAYMENT;CAR_CATEGORY;GRACE_PERIOD;RATE_CHANGE_AFTER_GRACE
A1;3;3000;M;40;10;100;0;2;1;0
B2;2;1000;F;31;12;6;100;1;0;0
";

    const REPAYMENTS: &str = "\
CONTRACT_ID;REPAYMENT_SCHEDULED;REPAYMENT_ACTUAL
A1;300;300
A1;300;
A1;300;250
B2;5;5
B2;5;
";

    #[test]
    fn test_join_supplied_schedule() {
        let contracts =
            load_contracts_from_readers(STATIC.as_bytes(), REPAYMENTS.as_bytes(), ScheduleSource::Supplied).unwrap();

        assert_eq!(contracts.len(), 2);
        let a1 = &contracts[0];
        assert_eq!(a1.contract_id, "A1");
        assert_eq!(a1.profile.scheduled_list(), &[300.0, 300.0, 300.0]);
        assert_eq!(
            a1.window.actual_known_list(),
            &[Observation::Observed(300.0), Observation::Missing, Observation::Observed(250.0)]
        );
        assert_eq!(contracts[1].profile.term(), 2);
    }

    #[test]
    fn test_synthesized_schedule_ignores_column() {
        let contracts =
            load_contracts_from_readers(STATIC.as_bytes(), REPAYMENTS.as_bytes(), ScheduleSource::Synthesized).unwrap();

        // B2: before_grace = 6 / 12 = 0.5 percent of 1000
        for payment in contracts[1].profile.scheduled_list() {
            assert!((payment - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_contract_reports_id() {
        let bad_static = STATIC.replace("B2;2;1000;F", "B2;2;1000;X");
        let err = load_contracts_from_readers(bad_static.as_bytes(), REPAYMENTS.as_bytes(), ScheduleSource::Supplied)
            .unwrap_err();
        match err {
            LoadError::Contract { contract_id, .. } => assert_eq!(contract_id, "B2"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_schedule_cell() {
        let repayments = REPAYMENTS.replace("B2;5;\n", "B2;;\n");
        let err = load_contracts_from_readers(STATIC.as_bytes(), repayments.as_bytes(), ScheduleSource::Supplied)
            .unwrap_err();
        assert!(matches!(err, LoadError::MissingSchedule { period: 2, .. }));
    }
}
