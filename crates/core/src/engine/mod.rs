//! ROI engine: maps one [`RoiInput`] to one [`RoiOutput`].
//!
//! The engine is pure and total. It performs no I/O, never panics for any input
//! record, and every output field is a finite number. Intermediate arithmetic is
//! unrounded; rounding happens once, when the output record is built.

pub mod priority;

use crate::domain::input::{Frequency, RoiInput};
use crate::domain::output::RoiOutput;

pub const FIVE_YEAR_HORIZON: f64 = 5.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;

impl Frequency {
    /// Annualization multiplier.
    pub const fn runs_per_year(self) -> f64 {
        match self {
            Frequency::EveryMinute => 525_600.0,
            Frequency::Hourly => 8_760.0,
            Frequency::Daily => 365.0,
            Frequency::Weekly => 52.0,
            Frequency::Biweekly => 26.0,
            Frequency::Monthly => 12.0,
            Frequency::Quarterly => 4.0,
        }
    }
}

/// License plus maintenance, charged every year.
pub fn recurring_annual_cost(input: &RoiInput) -> f64 {
    input.software_license_cost + input.annual_maintenance_cost
}

/// Investment used as the ROI denominator and the payback numerator.
///
/// This folds the first year of recurring costs into the one-time setup cost.
/// Recurring costs are also subtracted from net savings, so they are counted
/// twice in ROI and payback. Existing reports depend on this figure; any
/// correction belongs here and nowhere else.
pub fn total_investment(input: &RoiInput) -> f64 {
    input.implementation_cost + recurring_annual_cost(input)
}

pub fn annual_labor_cost(input: &RoiInput) -> f64 {
    let annual_runs = input.runs_per_period * input.frequency.runs_per_year();
    let annual_hours = annual_runs * input.hours_per_run * input.staff_count;
    annual_hours * input.hourly_rate
}

/// Months to recover `investment` from `net_annual_savings`.
///
/// No investment pays back immediately (`Some(0.0)`). A positive investment with
/// zero or negative net savings never pays back (`None`).
pub fn payback_months(investment: f64, net_annual_savings: f64) -> Option<f64> {
    if !(investment > 0.0) {
        return Some(0.0);
    }
    if !(net_annual_savings > 0.0) {
        return None;
    }
    Some(saturate(investment / net_annual_savings * MONTHS_PER_YEAR))
}

pub fn roi_percentage(investment: f64, net_annual_savings: f64) -> f64 {
    if !(investment > 0.0) {
        return 0.0;
    }
    saturate((net_annual_savings - investment) / investment * 100.0)
}

pub fn evaluate(input: &RoiInput) -> RoiOutput {
    let annual_labor_cost = annual_labor_cost(input);
    let annual_savings = annual_labor_cost * (input.expected_labor_reduction / 100.0);
    let investment = total_investment(input);
    let net_annual_savings = annual_savings - recurring_annual_cost(input);

    let payback = payback_months(investment, net_annual_savings);
    let roi = roi_percentage(investment, net_annual_savings);
    let five_year_savings = net_annual_savings * FIVE_YEAR_HORIZON - investment;

    let priority_score = priority::score(roi, payback);
    let priority = priority::classify(priority_score);

    tracing::trace!(
        frequency = input.frequency.as_str(),
        annual_labor_cost,
        net_annual_savings,
        investment,
        priority_score,
        "roi evaluated"
    );

    RoiOutput {
        process_name: input.process_name.clone(),
        annual_labor_cost: round_whole(annual_labor_cost),
        annual_savings: round_whole(annual_savings),
        net_annual_savings: round_whole(net_annual_savings),
        payback_period_months: payback.map(round_tenth),
        roi_percentage: round_whole(roi),
        five_year_savings: round_whole(five_year_savings),
        implementation_cost: saturate(investment),
        priority_score,
        priority,
        recommendation: priority.recommendation().to_string(),
    }
}

/// Clamp overflowed values to the largest finite magnitude; NaN becomes 0.
/// Negative zero is normalized to `0.0` so it never serializes as `-0.0`.
pub(crate) fn saturate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(f64::MIN, f64::MAX) + 0.0
    }
}

fn round_whole(value: f64) -> f64 {
    saturate(value).round() + 0.0
}

fn round_tenth(value: f64) -> f64 {
    saturate((saturate(value) * 10.0).round() / 10.0)
}
