//! Side-by-side comparison of base, best and worst case scenarios.

use crate::domain::input::RoiInput;
use crate::domain::output::RoiOutput;
use crate::engine::evaluate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Base,
    Best,
    Worst,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [ScenarioKind::Base, ScenarioKind::Best, ScenarioKind::Worst];

    pub fn label(self) -> &'static str {
        match self {
            ScenarioKind::Base => "Base Case",
            ScenarioKind::Best => "Best Case",
            ScenarioKind::Worst => "Worst Case",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub inputs: RoiInput,
    pub results: RoiOutput,
}

impl Scenario {
    pub fn evaluate(inputs: RoiInput) -> Self {
        let results = evaluate(&inputs);
        Self { inputs, results }
    }
}

/// A scenario as clients submit it: either bare inputs, or a stored
/// `{inputs, results}` scenario whose results are discarded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScenarioSource {
    Stored { inputs: RoiInput },
    Bare(RoiInput),
}

impl ScenarioSource {
    pub fn into_inputs(self) -> RoiInput {
        match self {
            ScenarioSource::Stored { inputs } | ScenarioSource::Bare(inputs) => inputs,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Scenario>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<Scenario>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worst: Option<Scenario>,
}

impl ScenarioSet {
    pub fn from_inputs(
        base: Option<RoiInput>,
        best: Option<RoiInput>,
        worst: Option<RoiInput>,
    ) -> Self {
        Self {
            base: base.map(Scenario::evaluate),
            best: best.map(Scenario::evaluate),
            worst: worst.map(Scenario::evaluate),
        }
    }

    /// Recomputes every submitted scenario; client-side results are never trusted.
    pub fn from_sources(
        base: Option<ScenarioSource>,
        best: Option<ScenarioSource>,
        worst: Option<ScenarioSource>,
    ) -> Self {
        Self::from_inputs(
            base.map(ScenarioSource::into_inputs),
            best.map(ScenarioSource::into_inputs),
            worst.map(ScenarioSource::into_inputs),
        )
    }

    pub fn get(&self, kind: ScenarioKind) -> Option<&Scenario> {
        match kind {
            ScenarioKind::Base => self.base.as_ref(),
            ScenarioKind::Best => self.best.as_ref(),
            ScenarioKind::Worst => self.worst.as_ref(),
        }
    }

    /// Populated scenarios in base, best, worst order.
    pub fn iter(&self) -> impl Iterator<Item = (ScenarioKind, &Scenario)> {
        ScenarioKind::ALL
            .into_iter()
            .filter_map(move |kind| self.get(kind).map(|s| (kind, s)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scenario with the best value for `metric`. Ties keep the earlier scenario.
    pub fn best_for(&self, metric: Metric) -> Option<ScenarioKind> {
        let direction = metric.direction();
        self.iter()
            .filter_map(|(kind, s)| metric.value(&s.results).map(|v| (kind, v)))
            .reduce(|best, candidate| {
                if direction.improves(candidate.1, best.1) {
                    candidate
                } else {
                    best
                }
            })
            .map(|(kind, _)| kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    pub(crate) fn improves(self, candidate: f64, current: f64) -> bool {
        match self {
            Direction::HigherIsBetter => candidate > current,
            Direction::LowerIsBetter => candidate < current,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    NetAnnualSavings,
    PaybackMonths,
    RoiPercentage,
    FiveYearSavings,
    ImplementationCost,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::NetAnnualSavings,
        Metric::PaybackMonths,
        Metric::RoiPercentage,
        Metric::FiveYearSavings,
        Metric::ImplementationCost,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::NetAnnualSavings => "Net Annual Savings",
            Metric::PaybackMonths => "Payback Period",
            Metric::RoiPercentage => "ROI",
            Metric::FiveYearSavings => "5-Year Net Savings",
            Metric::ImplementationCost => "Implementation Cost",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Metric::PaybackMonths | Metric::ImplementationCost => Direction::LowerIsBetter,
            Metric::NetAnnualSavings | Metric::RoiPercentage | Metric::FiveYearSavings => {
                Direction::HigherIsBetter
            }
        }
    }

    pub fn value(self, results: &RoiOutput) -> Option<f64> {
        match self {
            Metric::NetAnnualSavings => Some(results.net_annual_savings),
            Metric::PaybackMonths => results.payback_period_months,
            Metric::RoiPercentage => Some(results.roi_percentage),
            Metric::FiveYearSavings => Some(results.five_year_savings),
            Metric::ImplementationCost => Some(results.implementation_cost),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub metric: Metric,
    pub label: &'static str,
    pub direction: Direction,
    pub values: BTreeMap<ScenarioKind, Option<f64>>,
    pub best: Option<ScenarioKind>,
}

/// "What must be true" notes derived from the scenario set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    /// Labor reduction the best case assumes.
    pub best_case_labor_reduction: Option<f64>,
    /// Months of base-case net savings needed to cover its setup cost.
    pub break_even_months: Option<f64>,
    pub worst_case_positive_roi: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub rows: Vec<ComparisonRow>,
    pub insights: Insights,
}

pub fn compare(set: &ScenarioSet) -> anyhow::Result<Comparison> {
    anyhow::ensure!(
        set.len() >= 2,
        "comparison needs at least 2 scenarios (got {})",
        set.len()
    );

    let rows = Metric::ALL
        .into_iter()
        .map(|metric| ComparisonRow {
            metric,
            label: metric.label(),
            direction: metric.direction(),
            values: set
                .iter()
                .map(|(kind, s)| (kind, metric.value(&s.results)))
                .collect(),
            best: set.best_for(metric),
        })
        .collect();

    Ok(Comparison {
        rows,
        insights: insights(set),
    })
}

pub fn insights(set: &ScenarioSet) -> Insights {
    // Zero net savings falls back to gross savings, then to 1.
    let break_even_months = set.base.as_ref().map(|base| {
        let results = &base.results;
        let annual = [results.net_annual_savings, results.annual_savings]
            .into_iter()
            .find(|v| *v != 0.0)
            .unwrap_or(1.0);
        (base.inputs.implementation_cost / (annual / 12.0)).round() + 0.0
    });

    Insights {
        best_case_labor_reduction: set.best.as_ref().map(|s| s.inputs.expected_labor_reduction),
        break_even_months,
        worst_case_positive_roi: set.worst.as_ref().map(|s| s.results.roi_percentage > 0.0),
    }
}
