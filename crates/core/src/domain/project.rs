use crate::compare::{Scenario, ScenarioSet};
use crate::domain::input::RoiInput;
use crate::domain::output::RoiOutput;
use crate::engine::evaluate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const UNTITLED_PROJECT: &str = "Untitled Project";
const COPY_SUFFIX: &str = " (Copy)";

/// A saved evaluation in the project library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub inputs: RoiInput,
    pub results: RoiOutput,
    pub scenarios: ScenarioSet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    #[serde(default)]
    pub name: Option<String>,
    pub inputs: RoiInput,
    /// Stored verbatim when present; computed from `inputs` otherwise.
    #[serde(default)]
    pub results: Option<RoiOutput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default)]
    pub name: Option<String>,
    /// Replaces the inputs and recomputes the results.
    #[serde(default)]
    pub inputs: Option<RoiInput>,
    #[serde(default)]
    pub scenarios: Option<ScenarioSet>,
}

impl Project {
    pub fn create(new: NewProject, now: DateTime<Utc>) -> Self {
        let results = new.results.unwrap_or_else(|| evaluate(&new.inputs));
        let name = resolve_name(new.name.as_deref(), &new.inputs);
        let scenarios = ScenarioSet {
            base: Some(Scenario {
                inputs: new.inputs.clone(),
                results: results.clone(),
            }),
            ..ScenarioSet::default()
        };

        Self {
            id: Uuid::new_v4(),
            name,
            created: now,
            updated: now,
            inputs: new.inputs,
            results,
            scenarios,
        }
    }

    pub fn duplicate(&self, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: format!("{}{COPY_SUFFIX}", self.name),
            created: now,
            updated: now,
            ..self.clone()
        }
    }

    pub fn apply_update(&mut self, update: ProjectUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            let name = name.trim();
            if !name.is_empty() {
                self.name = name.to_string();
            }
        }
        if let Some(inputs) = update.inputs {
            self.results = evaluate(&inputs);
            self.inputs = inputs;
        }
        if let Some(scenarios) = update.scenarios {
            self.scenarios = scenarios;
        }
        self.updated = now;
    }

    /// Whether re-evaluating the stored inputs reproduces the stored results.
    pub fn is_consistent(&self) -> bool {
        evaluate(&self.inputs) == self.results
    }
}

fn resolve_name(requested: Option<&str>, inputs: &RoiInput) -> String {
    [requested.unwrap_or_default(), inputs.process_name.as_str()]
        .into_iter()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(UNTITLED_PROJECT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()
    }

    fn new_project(name: Option<&str>, process_name: &str) -> NewProject {
        let mut inputs = templates::find("monthly-reporting").unwrap().input();
        inputs.process_name = process_name.to_string();
        NewProject {
            name: name.map(str::to_string),
            inputs,
            results: None,
        }
    }

    #[test]
    fn create_names_and_seeds_base_scenario() {
        let project = Project::create(new_project(None, "Monthly Reporting"), now());

        assert_eq!(project.name, "Monthly Reporting");
        assert_eq!(project.created, project.updated);
        assert!(project.is_consistent());
        let base = project.scenarios.base.as_ref().unwrap();
        assert_eq!(base.inputs, project.inputs);
        assert_eq!(base.results, project.results);
        assert!(project.scenarios.best.is_none());
    }

    #[test]
    fn blank_names_fall_back_to_untitled() {
        assert_eq!(Project::create(new_project(Some("  "), ""), now()).name, UNTITLED_PROJECT);
        assert_eq!(Project::create(new_project(Some("Q3 pilot"), "x"), now()).name, "Q3 pilot");
    }

    #[test]
    fn duplicate_gets_new_identity() {
        let original = Project::create(new_project(None, "Reporting"), now());
        let later = now() + chrono::Duration::hours(1);
        let copy = original.duplicate(later);

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Reporting (Copy)");
        assert_eq!(copy.created, later);
        assert_eq!(copy.inputs, original.inputs);
        assert_eq!(copy.scenarios, original.scenarios);
    }

    #[test]
    fn update_recomputes_results_for_new_inputs() {
        let mut project = Project::create(new_project(None, "Reporting"), now());
        let mut inputs = project.inputs.clone();
        inputs.hourly_rate *= 2.0;

        let later = now() + chrono::Duration::minutes(5);
        project.apply_update(
            ProjectUpdate {
                inputs: Some(inputs.clone()),
                ..ProjectUpdate::default()
            },
            later,
        );

        assert_eq!(project.inputs, inputs);
        assert!(project.is_consistent());
        assert_eq!(project.updated, later);
        assert_eq!(project.name, "Reporting");
    }

    #[test]
    fn json_round_trip_preserves_results() {
        let project = Project::create(new_project(None, "Reporting"), now());
        let stored = serde_json::to_string(&project).unwrap();
        let reloaded: Project = serde_json::from_str(&stored).unwrap();

        assert_eq!(reloaded, project);
        assert!(reloaded.is_consistent());
        assert_eq!(serde_json::to_string(&reloaded).unwrap(), stored);
    }
}
