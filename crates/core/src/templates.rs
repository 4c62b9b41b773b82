//! Quick-start process templates with benchmark-based defaults.

use crate::domain::input::{Frequency, RoiInput};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Benchmarks {
    pub time_reduction: &'static str,
    pub error_reduction: &'static str,
    pub typical_payback: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemplateDefaults {
    pub frequency: Frequency,
    pub runs_per_period: f64,
    pub hours_per_run: f64,
    pub staff_count: f64,
    pub hourly_rate: f64,
    pub error_rate: f64,
    pub error_fix_cost: f64,
    pub implementation_cost: f64,
    pub software_license_cost: f64,
    pub annual_maintenance_cost: f64,
    pub expected_labor_reduction: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub benchmarks: Benchmarks,
    pub defaults: TemplateDefaults,
}

impl Template {
    pub fn input(&self) -> RoiInput {
        let d = &self.defaults;
        RoiInput {
            process_name: self.name.to_string(),
            frequency: d.frequency,
            runs_per_period: d.runs_per_period,
            hours_per_run: d.hours_per_run,
            staff_count: d.staff_count,
            hourly_rate: d.hourly_rate,
            implementation_cost: d.implementation_cost,
            software_license_cost: d.software_license_cost,
            annual_maintenance_cost: d.annual_maintenance_cost,
            expected_labor_reduction: d.expected_labor_reduction,
            error_rate: Some(d.error_rate),
            error_fix_cost: Some(d.error_fix_cost),
        }
    }
}

pub const TEMPLATES: &[Template] = &[
    Template {
        id: "invoice-processing",
        name: "Invoice Processing",
        category: "Finance",
        description: "Accounts payable automation with data entry, validation, and routing.",
        benchmarks: Benchmarks {
            time_reduction: "60-80%",
            error_reduction: "90%+",
            typical_payback: "4-8 months",
        },
        defaults: TemplateDefaults {
            frequency: Frequency::Daily,
            runs_per_period: 20.0,
            hours_per_run: 0.25,
            staff_count: 2.0,
            hourly_rate: 24.0,
            error_rate: 5.0,
            error_fix_cost: 50.0,
            implementation_cost: 15_000.0,
            software_license_cost: 3_600.0,
            annual_maintenance_cost: 1_200.0,
            expected_labor_reduction: 75.0,
        },
    },
    Template {
        id: "employee-onboarding",
        name: "Employee Onboarding",
        category: "HR",
        description: "New hire paperwork, system access, and orientation workflows.",
        benchmarks: Benchmarks {
            time_reduction: "30-50%",
            error_reduction: "75%+",
            typical_payback: "8-14 months",
        },
        defaults: TemplateDefaults {
            frequency: Frequency::Monthly,
            runs_per_period: 3.0,
            hours_per_run: 8.0,
            staff_count: 2.0,
            hourly_rate: 35.0,
            error_rate: 10.0,
            error_fix_cost: 100.0,
            implementation_cost: 20_000.0,
            software_license_cost: 6_000.0,
            annual_maintenance_cost: 2_000.0,
            expected_labor_reduction: 50.0,
        },
    },
    Template {
        id: "monthly-reporting",
        name: "Monthly Reporting",
        category: "Operations",
        description: "Sales/marketing data aggregation, analysis, and report generation.",
        benchmarks: Benchmarks {
            time_reduction: "50-65%",
            error_reduction: "80%+",
            typical_payback: "6-10 months",
        },
        defaults: TemplateDefaults {
            frequency: Frequency::Monthly,
            runs_per_period: 4.0,
            hours_per_run: 6.0,
            staff_count: 1.0,
            hourly_rate: 37.0,
            error_rate: 3.0,
            error_fix_cost: 75.0,
            implementation_cost: 12_000.0,
            software_license_cost: 2_400.0,
            annual_maintenance_cost: 1_000.0,
            expected_labor_reduction: 65.0,
        },
    },
    Template {
        id: "customer-support-triage",
        name: "Support Ticket Triage",
        category: "Support",
        description: "Automated ticket categorization, routing, and basic auto-responses.",
        benchmarks: Benchmarks {
            time_reduction: "30-50%",
            error_reduction: "60%+",
            typical_payback: "3-6 months",
        },
        defaults: TemplateDefaults {
            frequency: Frequency::Daily,
            runs_per_period: 50.0,
            hours_per_run: 0.1,
            staff_count: 3.0,
            hourly_rate: 22.0,
            error_rate: 8.0,
            error_fix_cost: 15.0,
            implementation_cost: 8_000.0,
            software_license_cost: 4_800.0,
            annual_maintenance_cost: 800.0,
            expected_labor_reduction: 40.0,
        },
    },
    Template {
        id: "lead-routing",
        name: "Lead Routing & Scoring",
        category: "Sales",
        description: "Automatically qualify, score, and assign leads to sales representatives.",
        benchmarks: Benchmarks {
            time_reduction: "80-95%",
            error_reduction: "95%+",
            typical_payback: "2-5 months",
        },
        defaults: TemplateDefaults {
            frequency: Frequency::Daily,
            runs_per_period: 20.0,
            hours_per_run: 0.15,
            staff_count: 2.0,
            hourly_rate: 28.0,
            error_rate: 15.0,
            error_fix_cost: 200.0,
            implementation_cost: 10_000.0,
            software_license_cost: 3_000.0,
            annual_maintenance_cost: 1_500.0,
            expected_labor_reduction: 90.0,
        },
    },
];

pub fn find(id: &str) -> Option<&'static Template> {
    let id = id.trim();
    TEMPLATES.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::output::Priority;
    use crate::engine::evaluate;
    use std::collections::BTreeSet;

    #[test]
    fn ids_are_unique() {
        let ids: BTreeSet<_> = TEMPLATES.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), TEMPLATES.len());
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(find("lead-routing").map(|t| t.category), Some("Sales"));
        assert_eq!(find(" Invoice-Processing ").map(|t| t.name), Some("Invoice Processing"));
        assert!(find("payroll").is_none());
    }

    #[test]
    fn invoice_template_is_a_high_priority_candidate() {
        let out = evaluate(&find("invoice-processing").unwrap().input());
        assert_eq!(out.annual_labor_cost, 87_600.0);
        assert_eq!(out.priority, Priority::High);
    }

    #[test]
    fn every_template_pays_back() {
        for template in TEMPLATES {
            let out = evaluate(&template.input());
            assert!(out.has_payback(), "{} never pays back", template.id);
        }
    }
}
