use anyhow::Context;
use std::fmt::Write;

use roi_core::compare::{Comparison, Metric, ScenarioKind};
use roi_core::format::{currency, months, percent};
use roi_core::templates::{self, TEMPLATES};
use roi_core::{RoiInput, RoiOutput};

pub fn template_input(id: &str) -> anyhow::Result<RoiInput> {
    let template = templates::find(id).with_context(|| {
        let known: Vec<_> = TEMPLATES.iter().map(|t| t.id).collect();
        format!("unknown template {id:?} (known: {})", known.join(", "))
    })?;
    Ok(template.input())
}

pub fn render_result(out: &RoiOutput) -> String {
    let mut s = String::new();
    if !out.process_name.is_empty() {
        let _ = writeln!(s, "{}", out.process_name);
    }
    let _ = writeln!(s, "  Annual labor cost     {}", currency(out.annual_labor_cost));
    let _ = writeln!(s, "  Gross annual savings  {}", currency(out.annual_savings));
    let _ = writeln!(s, "  Net annual savings    {}", currency(out.net_annual_savings));
    let _ = writeln!(s, "  Total investment      {}", currency(out.implementation_cost));
    let _ = writeln!(s, "  Payback               {}", months(out.payback_period_months));
    let _ = writeln!(s, "  ROI                   {}", percent(out.roi_percentage));
    let _ = writeln!(s, "  5-year net savings    {}", currency(out.five_year_savings));
    let _ = writeln!(
        s,
        "  Priority              {} ({})",
        out.priority.as_str(),
        out.priority_score
    );
    let _ = writeln!(s, "  {}", out.recommendation);
    s
}

pub fn render_templates() -> String {
    let mut s = String::new();
    for t in TEMPLATES {
        let _ = writeln!(
            s,
            "{:<26} {:<12} payback {:<12} {}",
            t.id, t.category, t.benchmarks.typical_payback, t.name
        );
    }
    s
}

pub fn render_comparison(comparison: &Comparison) -> String {
    let mut s = String::new();
    let _ = write!(s, "{:<22}", "Metric");
    for kind in ScenarioKind::ALL {
        let _ = write!(s, "{:>16}", kind.label());
    }
    s.push('\n');

    for row in &comparison.rows {
        let _ = write!(s, "{:<22}", row.label);
        for kind in ScenarioKind::ALL {
            let cell = match row.values.get(&kind) {
                None => "-".to_string(),
                Some(value) => {
                    let mut cell = metric_value(row.metric, *value);
                    if row.best == Some(kind) {
                        cell.push('*');
                    }
                    cell
                }
            };
            let _ = write!(s, "{cell:>16}");
        }
        s.push('\n');
    }

    let insights = &comparison.insights;
    if let Some(v) = insights.best_case_labor_reduction {
        let _ = writeln!(s, "Best case: achieve {v}% labor reduction");
    }
    if let Some(v) = insights.break_even_months {
        let _ = writeln!(s, "Break-even: need at least {v} months of savings");
    }
    if let Some(positive) = insights.worst_case_positive_roi {
        let note = if positive {
            "still positive ROI"
        } else {
            "may not break even in year 1"
        };
        let _ = writeln!(s, "Risk: even in worst case, {note}");
    }
    s
}

fn metric_value(metric: Metric, value: Option<f64>) -> String {
    match (metric, value) {
        (Metric::PaybackMonths, v) => months(v),
        (_, None) => "-".to_string(),
        (Metric::RoiPercentage, Some(v)) => percent(v),
        (_, Some(v)) => currency(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roi_core::compare::{compare, ScenarioSet};

    #[test]
    fn renders_invoice_result() {
        let out = roi_core::evaluate(&template_input("invoice-processing").unwrap());
        let text = render_result(&out);

        assert!(text.starts_with("Invoice Processing\n"));
        assert!(text.contains("Net annual savings    $60,900"));
        assert!(text.contains("Payback               3.9 mo"));
        assert!(text.contains("Priority              High (100)"));
    }

    #[test]
    fn renders_missing_payback() {
        let mut input = template_input("employee-onboarding").unwrap();
        input.expected_labor_reduction = 5.0;
        let text = render_result(&roi_core::evaluate(&input));
        assert!(text.contains("no payback"));
    }

    #[test]
    fn unknown_template_lists_known_ids() {
        let err = template_input("payroll").unwrap_err().to_string();
        assert!(err.contains("invoice-processing"));
    }

    #[test]
    fn comparison_marks_winners() {
        let base = template_input("customer-support-triage").unwrap();
        let mut worst = base.clone();
        worst.expected_labor_reduction = 20.0;
        let set = ScenarioSet::from_inputs(Some(base), None, Some(worst));
        let text = render_comparison(&compare(&set).unwrap());

        assert!(text.contains("$42,580*"));
        assert!(text.lines().any(|l| l.starts_with("Net Annual Savings")));
        assert!(text.contains("Risk: even in worst case"));
    }
}
