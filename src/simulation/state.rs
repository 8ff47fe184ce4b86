//! Running aggregates carried from one period to the next

use crate::contract::ContractProfile;
use crate::units::{pay_to_percent, percent_to_pay};

/// A single period's repayment in both units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payment {
    pub pay: f64,
    /// Percent of the contract sum (0-100 scale)
    pub percent: f64,
}

impl Payment {
    pub fn from_pay(pay: f64, contract_sum: f64) -> Self {
        Self {
            pay,
            percent: pay_to_percent(pay, contract_sum),
        }
    }

    pub fn from_percent(percent: f64, contract_sum: f64) -> Self {
        Self {
            pay: percent_to_pay(percent, contract_sum),
            percent,
        }
    }
}

/// Mutable per-run aggregates that feed the period feature vector
///
/// Created by [`SimulationState::initial`] and mutated exactly once per
/// period by [`SimulationState::advance`]. All percentages use the 0-100 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Number of periods already applied
    pub periods_elapsed: u32,

    pub accumulated_pay_actual: f64,
    pub accumulated_percent_actual: f64,
    pub accumulated_pay_scheduled: f64,
    pub accumulated_percent_scheduled: f64,

    pub avg_pay_actual: f64,
    pub avg_percent_actual: f64,
    pub avg_pay_scheduled: f64,
    pub avg_percent_scheduled: f64,

    pub last_actual_pay: f64,
    pub prelast_actual_pay: f64,
    pub prepre_actual_pay: f64,

    pub last_actual_percent: f64,
    pub prelast_actual_percent: f64,
    pub prepre_actual_percent: f64,

    /// 1 while the elapsed period count is within the grace period
    pub grace_on: u8,
    /// 1 until a grace-period payment deviates from its predecessor; never returns to 1
    pub is_grace_constant: u8,

    /// Scheduled payment of the period about to be simulated
    pub pay_scheduled: f64,
    pub percent_scheduled: f64,
}

impl SimulationState {
    /// State before period 1
    pub fn initial(profile: &ContractProfile) -> Self {
        let pay_scheduled = profile.scheduled_list().first().copied().unwrap_or(0.0);
        Self {
            periods_elapsed: 0,
            accumulated_pay_actual: 0.0,
            accumulated_percent_actual: 0.0,
            accumulated_pay_scheduled: 0.0,
            accumulated_percent_scheduled: 0.0,
            avg_pay_actual: 0.0,
            avg_percent_actual: 0.0,
            avg_pay_scheduled: 0.0,
            avg_percent_scheduled: 0.0,
            last_actual_pay: 0.0,
            prelast_actual_pay: 0.0,
            prepre_actual_pay: 0.0,
            last_actual_percent: 0.0,
            prelast_actual_percent: 0.0,
            prepre_actual_percent: 0.0,
            grace_on: u8::from(profile.grace_period() > 0),
            is_grace_constant: 1,
            pay_scheduled,
            percent_scheduled: pay_to_percent(pay_scheduled, profile.contract_sum()),
        }
    }

    /// Apply `payment` as the repayment of 1-indexed `period`.
    ///
    /// `grace_tolerance` is the pay-unit deviation between consecutive grace
    /// payments above which the grace schedule no longer counts as constant.
    pub fn advance(&mut self, profile: &ContractProfile, period: u32, payment: Payment, grace_tolerance: f64) {
        debug_assert_eq!(period, self.periods_elapsed + 1, "periods must be applied in order");
        let contract_sum = profile.contract_sum();

        if period > profile.grace_period() {
            self.grace_on = 0;
        }
        // Period 1 has no predecessor to compare against.
        if self.grace_on == 1
            && period > 1
            && (payment.pay - self.last_actual_pay).abs() > grace_tolerance
        {
            self.is_grace_constant = 0;
        }

        self.accumulated_pay_actual += payment.pay;
        self.accumulated_percent_actual += payment.percent;

        self.accumulated_pay_scheduled += self.pay_scheduled;
        self.accumulated_percent_scheduled = pay_to_percent(self.accumulated_pay_scheduled, contract_sum);

        let elapsed = period as f64;
        self.avg_pay_actual = self.accumulated_pay_actual / elapsed;
        self.avg_percent_actual = self.accumulated_percent_actual / elapsed;
        self.avg_pay_scheduled = self.accumulated_pay_scheduled / elapsed;
        self.avg_percent_scheduled = self.accumulated_percent_scheduled / elapsed;

        self.prepre_actual_pay = self.prelast_actual_pay;
        self.prelast_actual_pay = self.last_actual_pay;
        self.last_actual_pay = payment.pay;

        self.prepre_actual_percent = self.prelast_actual_percent;
        self.prelast_actual_percent = self.last_actual_percent;
        self.last_actual_percent = payment.percent;

        if period < profile.term() {
            self.pay_scheduled = profile.scheduled_list()[period as usize];
            self.percent_scheduled = pay_to_percent(self.pay_scheduled, contract_sum);
        }

        self.periods_elapsed = period;
    }
}
