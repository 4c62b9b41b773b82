//! Portfolio view over the project library: totals, ordering, and
//! side-by-side comparison of saved projects with CSV export.

use crate::compare::Direction;
use crate::domain::output::Priority;
use crate::domain::project::Project;
use crate::engine::saturate;
use crate::format;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CSV_FILE_NAME: &str = "project_comparison.csv";
const MISSING: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub project_count: usize,
    pub total_net_savings: f64,
    pub total_implementation_cost: f64,
    /// Mean ROI, rounded to a whole percent. 0 for an empty portfolio.
    pub average_roi: f64,
    /// Mean payback over projects that pay back, one decimal place.
    pub average_payback_months: Option<f64>,
    pub never_pays_back: usize,
}

pub fn summarize(projects: &[Project]) -> Summary {
    let project_count = projects.len();
    let total = |f: fn(&Project) -> f64| saturate(projects.iter().map(f).sum());

    let average_roi = if project_count == 0 {
        0.0
    } else {
        saturate(total(|p| p.results.roi_percentage) / project_count as f64).round() + 0.0
    };

    let paybacks: Vec<f64> = projects
        .iter()
        .filter_map(|p| p.results.payback_period_months)
        .collect();
    let average_payback_months = (!paybacks.is_empty()).then(|| {
        let mean = saturate(paybacks.iter().sum::<f64>()) / paybacks.len() as f64;
        (mean * 10.0).round() / 10.0 + 0.0
    });

    Summary {
        project_count,
        total_net_savings: total(|p| p.results.net_annual_savings),
        total_implementation_cost: total(|p| p.results.implementation_cost),
        average_roi,
        average_payback_months,
        never_pays_back: projects.iter().filter(|p| !p.results.has_payback()).count(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Roi,
    #[default]
    Savings,
    Payback,
    Priority,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

fn priority_rank(priority: Priority) -> u8 {
    match priority {
        Priority::High => 3,
        Priority::Medium => 2,
        Priority::Low => 1,
    }
}

/// Stable sort. Projects that never pay back sort after every finite payback.
pub fn sort(projects: &mut [Project], key: SortKey, order: SortOrder) {
    let payback = |p: &Project| p.results.payback_period_months.unwrap_or(f64::INFINITY);

    projects.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Roi => a.results.roi_percentage.total_cmp(&b.results.roi_percentage),
            SortKey::Savings => a
                .results
                .net_annual_savings
                .total_cmp(&b.results.net_annual_savings),
            SortKey::Payback => payback(a).total_cmp(&payback(b)),
            SortKey::Priority => {
                priority_rank(a.results.priority).cmp(&priority_rank(b.results.priority))
            }
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Orders `found` by `ids`, dropping repeated ids. Errors with the ids that
/// matched no project.
pub fn pick_in_order(mut found: Vec<Project>, ids: &[Uuid]) -> Result<Vec<Project>, Vec<Uuid>> {
    let mut picked = Vec::with_capacity(ids.len());
    let mut missing = Vec::new();

    for id in ids {
        if picked.iter().any(|p: &Project| p.id == *id) {
            continue;
        }
        match found.iter().position(|p| p.id == *id) {
            Some(i) => picked.push(found.swap_remove(i)),
            None => missing.push(*id),
        }
    }

    if missing.is_empty() {
        Ok(picked)
    } else {
        Err(missing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectMetric {
    ProcessName,
    PriorityScore,
    RoiPercentage,
    PaybackMonths,
    NetAnnualSavings,
    FiveYearSavings,
    ImplementationCost,
    AnnualLaborCost,
}

impl ProjectMetric {
    pub const ALL: [ProjectMetric; 8] = [
        ProjectMetric::ProcessName,
        ProjectMetric::PriorityScore,
        ProjectMetric::RoiPercentage,
        ProjectMetric::PaybackMonths,
        ProjectMetric::NetAnnualSavings,
        ProjectMetric::FiveYearSavings,
        ProjectMetric::ImplementationCost,
        ProjectMetric::AnnualLaborCost,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProjectMetric::ProcessName => "Process",
            ProjectMetric::PriorityScore => "Priority",
            ProjectMetric::RoiPercentage => "ROI",
            ProjectMetric::PaybackMonths => "Payback Period",
            ProjectMetric::NetAnnualSavings => "Net Annual Savings",
            ProjectMetric::FiveYearSavings => "5-Year Savings",
            ProjectMetric::ImplementationCost => "Implementation Cost",
            ProjectMetric::AnnualLaborCost => "Annual Labor Cost",
        }
    }

    /// `None` for descriptive rows, which have no winner.
    pub fn direction(self) -> Option<Direction> {
        match self {
            ProjectMetric::ProcessName | ProjectMetric::PriorityScore => None,
            ProjectMetric::RoiPercentage
            | ProjectMetric::NetAnnualSavings
            | ProjectMetric::FiveYearSavings => Some(Direction::HigherIsBetter),
            ProjectMetric::PaybackMonths
            | ProjectMetric::ImplementationCost
            | ProjectMetric::AnnualLaborCost => Some(Direction::LowerIsBetter),
        }
    }

    pub fn value(self, project: &Project) -> Option<f64> {
        let r = &project.results;
        match self {
            ProjectMetric::ProcessName => None,
            ProjectMetric::PriorityScore => Some(f64::from(r.priority_score)),
            ProjectMetric::RoiPercentage => Some(r.roi_percentage),
            ProjectMetric::PaybackMonths => r.payback_period_months,
            ProjectMetric::NetAnnualSavings => Some(r.net_annual_savings),
            ProjectMetric::FiveYearSavings => Some(r.five_year_savings),
            ProjectMetric::ImplementationCost => Some(r.implementation_cost),
            ProjectMetric::AnnualLaborCost => Some(r.annual_labor_cost),
        }
    }

    pub fn display(self, project: &Project) -> String {
        let r = &project.results;
        match self {
            ProjectMetric::ProcessName => {
                let name = project.inputs.process_name.trim();
                if name.is_empty() { MISSING } else { name }.to_string()
            }
            ProjectMetric::PriorityScore => {
                format!("{} ({})", r.priority.as_str(), r.priority_score)
            }
            ProjectMetric::RoiPercentage => format::percent(r.roi_percentage),
            ProjectMetric::PaybackMonths => format::months(r.payback_period_months),
            ProjectMetric::NetAnnualSavings
            | ProjectMetric::FiveYearSavings
            | ProjectMetric::ImplementationCost
            | ProjectMetric::AnnualLaborCost => match self.value(project) {
                Some(v) => format::currency(v),
                None => MISSING.to_string(),
            },
        }
    }

    /// Project with the best value. Ties keep the earlier project; projects
    /// without a value are skipped.
    fn best(self, projects: &[Project]) -> Option<Uuid> {
        let direction = self.direction()?;
        projects
            .iter()
            .filter_map(|p| self.value(p).map(|v| (p.id, v)))
            .reduce(|best, candidate| {
                if direction.improves(candidate.1, best.1) {
                    candidate
                } else {
                    best
                }
            })
            .map(|(id, _)| id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectColumn {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRow {
    pub metric: ProjectMetric,
    pub label: &'static str,
    pub direction: Option<Direction>,
    /// One entry per project, in column order.
    pub values: Vec<Option<f64>>,
    pub cells: Vec<String>,
    pub best: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectComparison {
    pub projects: Vec<ProjectColumn>,
    pub rows: Vec<ProjectRow>,
}

pub fn compare_projects(projects: &[Project]) -> anyhow::Result<ProjectComparison> {
    anyhow::ensure!(
        projects.len() >= 2,
        "comparison needs at least 2 projects (got {})",
        projects.len()
    );

    let rows = ProjectMetric::ALL
        .into_iter()
        .map(|metric| ProjectRow {
            metric,
            label: metric.label(),
            direction: metric.direction(),
            values: projects.iter().map(|p| metric.value(p)).collect(),
            cells: projects.iter().map(|p| metric.display(p)).collect(),
            best: metric.best(projects),
        })
        .collect();

    Ok(ProjectComparison {
        projects: projects
            .iter()
            .map(|p| ProjectColumn {
                id: p.id,
                name: p.name.clone(),
            })
            .collect(),
        rows,
    })
}

impl ProjectComparison {
    /// `Metric` header plus one column per project; one line per metric.
    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer
            .write_record(
                std::iter::once("Metric").chain(self.projects.iter().map(|p| p.name.as_str())),
            )
            .context("failed to write csv header")?;
        for row in &self.rows {
            writer
                .write_record(std::iter::once(row.label).chain(row.cells.iter().map(String::as_str)))
                .with_context(|| format!("failed to write csv row {}", row.label))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("failed to flush csv: {}", e.error()))?;
        String::from_utf8(bytes).context("csv output is not utf-8")
    }

    pub fn row(&self, metric: ProjectMetric) -> Option<&ProjectRow> {
        self.rows.iter().find(|r| r.metric == metric)
    }
}
