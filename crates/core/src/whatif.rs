//! Live what-if adjustments on top of a base input record.

use crate::domain::input::{lenient_opt_f64, RoiInput};
use crate::domain::output::RoiOutput;
use crate::engine::evaluate;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const LABOR_REDUCTION_RANGE: RangeInclusive<f64> = 0.0..=100.0;
pub const IMPLEMENTATION_COST_RANGE: RangeInclusive<f64> = 0.0..=100_000.0;
pub const HOURLY_RATE_RANGE: RangeInclusive<f64> = 20.0..=200.0;
pub const STAFF_COUNT_RANGE: RangeInclusive<f64> = 1.0..=20.0;

/// Overrides for the four slider-driven fields. Absent values keep the base input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WhatIf {
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub expected_labor_reduction: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub implementation_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub hourly_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub staff_count: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhatIfDeltas {
    pub net_annual_savings: f64,
    /// `None` unless both sides pay back.
    pub payback_period_months: Option<f64>,
    pub roi_percentage: f64,
    pub five_year_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhatIfOutcome {
    pub adjusted_inputs: RoiInput,
    pub base: RoiOutput,
    pub adjusted: RoiOutput,
    pub deltas: WhatIfDeltas,
}

impl WhatIf {
    pub fn apply(&self, base: &RoiInput) -> RoiInput {
        let mut out = base.clone();
        if let Some(v) = self.expected_labor_reduction {
            out.expected_labor_reduction = clamp_to(v, &LABOR_REDUCTION_RANGE);
        }
        if let Some(v) = self.implementation_cost {
            out.implementation_cost = clamp_to(v, &IMPLEMENTATION_COST_RANGE);
        }
        if let Some(v) = self.hourly_rate {
            out.hourly_rate = clamp_to(v, &HOURLY_RATE_RANGE);
        }
        if let Some(v) = self.staff_count {
            out.staff_count = clamp_to(v, &STAFF_COUNT_RANGE);
        }
        out
    }

    pub fn run(&self, base_inputs: &RoiInput) -> WhatIfOutcome {
        let adjusted_inputs = self.apply(base_inputs);
        let base = evaluate(base_inputs);
        let adjusted = evaluate(&adjusted_inputs);

        let payback_delta = match (adjusted.payback_period_months, base.payback_period_months) {
            (Some(a), Some(b)) => Some(((a - b) * 10.0).round() / 10.0),
            _ => None,
        };

        let deltas = WhatIfDeltas {
            net_annual_savings: adjusted.net_annual_savings - base.net_annual_savings,
            payback_period_months: payback_delta,
            roi_percentage: adjusted.roi_percentage - base.roi_percentage,
            five_year_savings: adjusted.five_year_savings - base.five_year_savings,
        };

        WhatIfOutcome {
            adjusted_inputs,
            base,
            adjusted,
            deltas,
        }
    }
}

fn clamp_to(value: f64, range: &RangeInclusive<f64>) -> f64 {
    value.clamp(*range.start(), *range.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;
    use serde_json::json;

    fn invoice() -> RoiInput {
        templates::find("invoice-processing").unwrap().input()
    }

    #[test]
    fn empty_adjustment_is_identity() {
        let outcome = WhatIf::default().run(&invoice());
        assert_eq!(outcome.adjusted_inputs, invoice());
        assert_eq!(outcome.base, outcome.adjusted);
        assert_eq!(outcome.deltas.net_annual_savings, 0.0);
        assert_eq!(outcome.deltas.payback_period_months, Some(0.0));
    }

    #[test]
    fn overrides_are_clamped_to_slider_ranges() {
        let adjusted = WhatIf {
            expected_labor_reduction: Some(140.0),
            implementation_cost: Some(-5.0),
            hourly_rate: Some(5.0),
            staff_count: Some(50.0),
        }
        .apply(&invoice());

        assert_eq!(adjusted.expected_labor_reduction, 100.0);
        assert_eq!(adjusted.implementation_cost, 0.0);
        assert_eq!(adjusted.hourly_rate, 20.0);
        assert_eq!(adjusted.staff_count, 20.0);
        assert_eq!(adjusted.runs_per_period, invoice().runs_per_period);
    }

    #[test]
    fn higher_labor_reduction_raises_savings() {
        let outcome = WhatIf {
            expected_labor_reduction: Some(90.0),
            ..WhatIf::default()
        }
        .run(&invoice());

        // 87,600 * 15% more labor removed.
        assert_eq!(outcome.deltas.net_annual_savings, 13_140.0);
        assert!(outcome.deltas.roi_percentage > 0.0);
        assert!(outcome.deltas.payback_period_months.unwrap() <= 0.0);
    }

    #[test]
    fn deserializes_blank_slider_values_as_absent() {
        let what_if: WhatIf =
            serde_json::from_value(json!({ "hourly_rate": "", "staff_count": "4" })).unwrap();
        assert_eq!(what_if.hourly_rate, None);
        assert_eq!(what_if.staff_count, Some(4.0));
    }
}
