//! Pay/percent conversions
//!
//! Percentages are expressed on a 0-100 scale of the contract sum everywhere
//! in the crate: observation windows, simulation state, the 100% clamp and the
//! emitted series all use the same convention.

/// Full repayment of the contract sum, in percent.
pub const FULL_REPAYMENT_PERCENT: f64 = 100.0;

/// Convert an absolute payment into percent of the contract sum.
#[inline]
pub fn pay_to_percent(pay: f64, contract_sum: f64) -> f64 {
    pay / contract_sum * 100.0
}

/// Convert a percent of the contract sum into an absolute payment.
#[inline]
pub fn percent_to_pay(percent: f64, contract_sum: f64) -> f64 {
    percent / 100.0 * contract_sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_conversions_use_hundred_scale() {
        assert_relative_eq!(pay_to_percent(20_000.0, 100_000.0), 20.0);
        assert_relative_eq!(percent_to_pay(22.0, 100_000.0), 22_000.0);
    }
}
