//! Requirement vocabulary and evaluator.
//!
//! # Invariants
//! - Evaluation is a pure function of the requirement and the snapshot.
//! - Empty populations never satisfy a percentage threshold.

use crate::model::project::Project;
use crate::model::task::completion_ratio;
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Minimum share of `done` tasks before QA review.
pub const TASKS_DONE_THRESHOLD: f64 = 0.70;
/// Minimum team size before work can start.
pub const MIN_TEAM_SIZE: usize = 2;

/// Named predicate gating a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Name,
    CompanyId,
    Description,
    PartnerId,
    PmId,
    #[serde(rename = "team_min_2")]
    TeamMin2,
    AutoTasksCreated,
    #[serde(rename = "tasks_70_percent_done")]
    Tasks70PercentDone,
    #[serde(rename = "quality_checklist_100")]
    QualityChecklist100,
}

impl Requirement {
    pub const ALL: [Requirement; 9] = [
        Requirement::Name,
        Requirement::CompanyId,
        Requirement::Description,
        Requirement::PartnerId,
        Requirement::PmId,
        Requirement::TeamMin2,
        Requirement::AutoTasksCreated,
        Requirement::Tasks70PercentDone,
        Requirement::QualityChecklist100,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CompanyId => "company_id",
            Self::Description => "description",
            Self::PartnerId => "partner_id",
            Self::PmId => "pm_id",
            Self::TeamMin2 => "team_min_2",
            Self::AutoTasksCreated => "auto_tasks_created",
            Self::Tasks70PercentDone => "tasks_70_percent_done",
            Self::QualityChecklist100 => "quality_checklist_100",
        }
    }

    /// Strict lookup used by configuration and data-loading paths.
    pub fn parse(value: &str) -> Result<Self, UnknownRequirement> {
        Self::ALL
            .into_iter()
            .find(|requirement| requirement.as_str() == value)
            .ok_or_else(|| UnknownRequirement(value.to_string()))
    }

    /// Returns whether `project` satisfies this requirement.
    pub fn evaluate(self, project: &Project) -> bool {
        match self {
            Self::Name => is_filled(Some(project.name.as_str())),
            Self::CompanyId => is_filled(project.company_id.as_deref()),
            Self::Description => is_filled(Some(project.description.as_str())),
            Self::PartnerId => is_filled(project.partner_id.as_deref()),
            Self::PmId => is_filled(project.pm_id.as_deref()),
            Self::TeamMin2 => project.team_size() >= MIN_TEAM_SIZE,
            Self::AutoTasksCreated => !project.tasks.is_empty(),
            Self::Tasks70PercentDone => completion_ratio(&project.tasks)
                .is_some_and(|ratio| ratio >= TASKS_DONE_THRESHOLD),
            Self::QualityChecklist100 => {
                !project.quality_checklist.is_empty()
                    && project.quality_checklist.iter().all(|item| item.checked)
            }
        }
    }
}

impl Display for Requirement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requirement name outside the known vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRequirement(pub String);

impl Display for UnknownRequirement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown workflow requirement: `{}`", self.0)
    }
}

impl Error for UnknownRequirement {}

/// Evaluates a requirement given by name.
///
/// Unknown names evaluate to `true` and are logged at `warn`, so a typo in a
/// stored rule never blocks a project but is still visible in diagnostics.
pub fn evaluate_named(name: &str, project: &Project) -> bool {
    match Requirement::parse(name) {
        Ok(requirement) => requirement.evaluate(project),
        Err(_) => {
            warn!(
                "event=requirement_unknown module=workflow status=fallback requirement={} project_id={}",
                name, project.id
            );
            true
        }
    }
}

fn is_filled(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{evaluate_named, Requirement, UnknownRequirement};
    use crate::model::project::{Project, QualityCheck, TeamMember};
    use crate::model::task::{Task, TaskStatus};

    fn project_with_tasks(done: usize, open: usize) -> Project {
        let mut project = Project::new("Acme Audit");
        for index in 0..done {
            project
                .tasks
                .push(Task::with_status(format!("done {index}"), TaskStatus::Done));
        }
        for index in 0..open {
            project
                .tasks
                .push(Task::with_status(format!("open {index}"), TaskStatus::InProgress));
        }
        project
    }

    #[test]
    fn tasks_threshold_is_false_without_tasks() {
        let project = project_with_tasks(0, 0);
        assert!(!Requirement::Tasks70PercentDone.evaluate(&project));
    }

    #[test]
    fn tasks_threshold_is_inclusive_at_seventy_percent() {
        assert!(Requirement::Tasks70PercentDone.evaluate(&project_with_tasks(7, 3)));
        assert!(!Requirement::Tasks70PercentDone.evaluate(&project_with_tasks(6, 4)));
        assert!(Requirement::Tasks70PercentDone.evaluate(&project_with_tasks(1, 0)));
    }

    #[test]
    fn team_min_2_counts_members() {
        let mut project = Project::new("Acme Audit");
        project.team.push(TeamMember::new("e1", "auditor"));
        assert!(!Requirement::TeamMin2.evaluate(&project));
        project.team.push(TeamMember::new("e2", "senior auditor"));
        assert!(Requirement::TeamMin2.evaluate(&project));
    }

    #[test]
    fn team_min_2_ignores_repeated_employee() {
        let mut project = Project::new("Acme Audit");
        project.team.push(TeamMember::new("e1", "auditor"));
        project.team.push(TeamMember::new("e1", "senior auditor"));
        assert_eq!(project.team_size(), 1);
        assert!(!Requirement::TeamMin2.evaluate(&project));
    }

    #[test]
    fn text_requirements_reject_blank_values() {
        let mut project = Project::new("  ");
        project.company_id = Some(String::new());
        project.description = "\n".to_string();
        assert!(!Requirement::Name.evaluate(&project));
        assert!(!Requirement::CompanyId.evaluate(&project));
        assert!(!Requirement::Description.evaluate(&project));
        assert!(!Requirement::PartnerId.evaluate(&project));
    }

    #[test]
    fn quality_checklist_needs_every_item_checked() {
        let mut project = Project::new("Acme Audit");
        assert!(!Requirement::QualityChecklist100.evaluate(&project));

        project
            .quality_checklist
            .push(QualityCheck::new("working papers reviewed", true));
        project
            .quality_checklist
            .push(QualityCheck::new("partner review", false));
        assert!(!Requirement::QualityChecklist100.evaluate(&project));

        project.quality_checklist[1].checked = true;
        assert!(Requirement::QualityChecklist100.evaluate(&project));
    }

    #[test]
    fn auto_tasks_created_needs_one_task() {
        assert!(!Requirement::AutoTasksCreated.evaluate(&project_with_tasks(0, 0)));
        assert!(Requirement::AutoTasksCreated.evaluate(&project_with_tasks(0, 1)));
    }

    #[test]
    fn parse_is_strict_but_named_lookup_is_permissive() {
        assert_eq!(
            Requirement::parse("budget_approved"),
            Err(UnknownRequirement("budget_approved".to_string()))
        );
        let project = Project::new("");
        assert!(evaluate_named("budget_approved", &project));
        assert!(!evaluate_named("name", &project));
    }

    #[test]
    fn serde_names_match_stable_ids() {
        for requirement in Requirement::ALL {
            let json = serde_json::to_value(requirement).unwrap();
            assert_eq!(json, requirement.as_str());
        }
    }
}
