//! Scheduled payment synthesis for contracts delivered without a schedule

/// Build a flat schedule with a rate step after the grace period.
///
/// Every period pays `before_grace / 100 * contract_sum`; periods strictly
/// after `grace_period` additionally pay `rate_change_after_grace / 100 *
/// contract_sum`. Returns exactly `term` entries.
pub fn synthesize_schedule(
    term: u32,
    contract_sum: f64,
    before_grace: f64,
    grace_period: u32,
    rate_change_after_grace: f64,
) -> Vec<f64> {
    let base = before_grace / 100.0 * contract_sum;
    let step = rate_change_after_grace / 100.0 * contract_sum;

    (0..term)
        .map(|idx| {
            let mut payment = base;
            if idx >= grace_period {
                payment += step;
            }
            payment
        })
        .collect()
}
