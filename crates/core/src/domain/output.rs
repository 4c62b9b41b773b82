use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            Priority::High => "Strong automation candidate. Consider prioritizing this project.",
            Priority::Medium => "Viable automation opportunity. Evaluate alongside other projects.",
            Priority::Low => "Lower priority. May need further optimization or cost reduction.",
        }
    }
}

/// Result of one evaluation. Currency amounts and ROI are whole units, payback is
/// rounded to one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiOutput {
    #[serde(default)]
    pub process_name: String,
    pub annual_labor_cost: f64,
    /// Gross labor savings before recurring automation costs.
    pub annual_savings: f64,
    pub net_annual_savings: f64,
    /// `None` when the investment is never recovered (net annual savings <= 0).
    pub payback_period_months: Option<f64>,
    pub roi_percentage: f64,
    pub five_year_savings: f64,
    /// Total investment: one-time setup plus the first year of recurring costs.
    pub implementation_cost: f64,
    pub priority_score: u32,
    pub priority: Priority,
    pub recommendation: String,
}

impl RoiOutput {
    pub fn has_payback(&self) -> bool {
        self.payback_period_months.is_some()
    }
}
