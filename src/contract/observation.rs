//! Observed repayment history aligned to the contract term

use serde::{Deserialize, Serialize};

use super::ContractProfile;
use crate::error::DataShapeError;
use crate::units::pay_to_percent;

/// One period of repayment history: either a known payment or missing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Observation {
    Observed(f64),
    Missing,
}

impl Observation {
    pub fn is_missing(&self) -> bool {
        matches!(self, Observation::Missing)
    }

    pub fn value(&self) -> Option<f64> {
        match *self {
            Observation::Observed(pay) => Some(pay),
            Observation::Missing => None,
        }
    }
}

impl From<Option<f64>> for Observation {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Observation::Missing, Observation::Observed)
    }
}

/// Scheduled and observed repayment for each period `1..=term`
///
/// The history is padded with `Missing` or truncated so it always holds
/// exactly `term` entries. Percentages are on the 0-100 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationWindow {
    term: u32,
    contract_sum: f64,
    actual_known_list: Vec<Observation>,
    scheduled_percent: Vec<f64>,
    actual_percent: Vec<Option<f64>>,
}

impl ObservationWindow {
    pub fn new<I>(profile: &ContractProfile, history: I) -> Result<Self, DataShapeError>
    where
        I: IntoIterator<Item = Observation>,
    {
        let term = profile.term();
        let contract_sum = profile.contract_sum();
        if contract_sum.is_nan() || contract_sum <= 0.0 {
            return Err(DataShapeError::ZeroContractSum(contract_sum));
        }

        let mut actual_known_list: Vec<Observation> =
            history.into_iter().take(term as usize).collect();
        actual_known_list.resize(term as usize, Observation::Missing);

        if let Some((idx, value)) = actual_known_list
            .iter()
            .enumerate()
            .find_map(|(idx, obs)| obs.value().filter(|v| !v.is_finite()).map(|v| (idx, v)))
        {
            return Err(DataShapeError::NonFiniteObservation { period: idx + 1, value });
        }

        let scheduled = profile.scheduled_list();
        debug_assert_eq!(scheduled.len(), actual_known_list.len());

        let scheduled_percent = scheduled
            .iter()
            .map(|&pay| pay_to_percent(pay, contract_sum))
            .collect();
        let actual_percent = actual_known_list
            .iter()
            .map(|obs| obs.value().map(|pay| pay_to_percent(pay, contract_sum)))
            .collect();

        Ok(Self {
            term,
            contract_sum,
            actual_known_list,
            scheduled_percent,
            actual_percent,
        })
    }

    /// Window with no known payments
    pub fn unobserved(profile: &ContractProfile) -> Result<Self, DataShapeError> {
        Self::new(profile, std::iter::empty())
    }

    pub fn term(&self) -> u32 {
        self.term
    }

    pub fn contract_sum(&self) -> f64 {
        self.contract_sum
    }

    /// 1-indexed period numbers
    pub fn periods(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.term
    }

    pub fn actual_known_list(&self) -> &[Observation] {
        &self.actual_known_list
    }

    /// Observation for 1-indexed `period`
    pub fn observation(&self, period: u32) -> Observation {
        period
            .checked_sub(1)
            .and_then(|idx| self.actual_known_list.get(idx as usize))
            .copied()
            .unwrap_or(Observation::Missing)
    }

    pub fn scheduled_percent(&self) -> &[f64] {
        &self.scheduled_percent
    }

    pub fn actual_percent(&self) -> &[Option<f64>] {
        &self.actual_percent
    }

    pub fn known_count(&self) -> usize {
        self.actual_known_list.iter().filter(|o| !o.is_missing()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ContractTerms;
    use approx::assert_relative_eq;

    fn profile(term: i64) -> ContractProfile {
        ContractProfile::new(
            ContractTerms {
                term,
                contract_sum: 50_000.0,
                gender: "F".to_string(),
                age: 41,
                loan_to_income: 12.0,
                payment_to_income: 3.0,
                downpayment: 0.0,
                car_category: 1,
                grace_period: 0,
                rate_change_after_grace: 0.0,
            },
            None,
        )
        .expect("valid profile")
    }

    #[test]
    fn test_pads_with_missing_not_zero() {
        let window = ObservationWindow::new(
            &profile(4),
            vec![Observation::Observed(1_000.0), Observation::Observed(0.0)],
        )
        .expect("window");

        assert_eq!(window.actual_known_list().len(), 4);
        assert_eq!(window.actual_known_list()[1], Observation::Observed(0.0));
        assert!(window.actual_known_list()[2].is_missing());
        assert!(window.actual_known_list()[3].is_missing());
        let percent = window.actual_percent();
        assert_relative_eq!(percent[0].expect("observed"), 2.0, max_relative = 1e-12);
        assert_eq!(percent[1], Some(0.0));
        assert!(percent[2..].iter().all(Option::is_none));
        assert_eq!(window.known_count(), 2);
    }

    #[test]
    fn test_truncates_long_history() {
        let history = (0..10).map(|i| Observation::Observed(i as f64 * 100.0));
        let window = ObservationWindow::new(&profile(3), history).expect("window");

        assert_eq!(window.actual_known_list().len(), 3);
        assert_eq!(window.observation(3), Observation::Observed(200.0));
        assert_eq!(window.observation(4), Observation::Missing);
        assert_eq!(window.periods().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_scheduled_percent_uses_hundred_scale() {
        let window = ObservationWindow::unobserved(&profile(2)).expect("window");
        // before_grace = 3 / 12 = 0.25 percent of contract sum per period
        assert!(window.scheduled_percent().iter().all(|&p| (p - 0.25).abs() < 1e-12));
    }

    #[test]
    fn test_rejects_non_finite_observation() {
        let err = ObservationWindow::new(
            &profile(3),
            vec![Observation::Observed(1.0), Observation::Observed(f64::NAN)],
        )
        .unwrap_err();
        assert!(matches!(err, DataShapeError::NonFiniteObservation { period: 2, .. }));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Observation::from(None), Observation::Missing);
        assert_eq!(Observation::from(Some(5.0)), Observation::Observed(5.0));
    }
}
