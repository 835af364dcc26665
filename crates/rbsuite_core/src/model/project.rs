//! Project domain model.
//!
//! # Responsibility
//! - Define the project snapshot consumed by the workflow engine.
//! - Validate persisted attributes (money, schedule, team, tasks).
//!
//! # Invariants
//! - `status` is one of the ten `ProjectStatus` values.
//! - `status` is private; rehydration constructors set it, only
//!   `workflow::engine` changes it afterwards.
//! - `deadline` is not earlier than `start_date` when both are set.
//! - Team members are unique by `employee_id`.

use crate::model::task::{Task, TaskValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ProjectId = Uuid;

static CURRENCY_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency regex"));

/// Position of a project in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    PreApproval,
    PartnerAssigned,
    PmAssigned,
    TeamAssembled,
    InProgress,
    QaReview,
    ClientSignoff,
    Closed,
    Archived,
}

impl ProjectStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [ProjectStatus; 10] = [
        ProjectStatus::Draft,
        ProjectStatus::PreApproval,
        ProjectStatus::PartnerAssigned,
        ProjectStatus::PmAssigned,
        ProjectStatus::TeamAssembled,
        ProjectStatus::InProgress,
        ProjectStatus::QaReview,
        ProjectStatus::ClientSignoff,
        ProjectStatus::Closed,
        ProjectStatus::Archived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PreApproval => "pre_approval",
            Self::PartnerAssigned => "partner_assigned",
            Self::PmAssigned => "pm_assigned",
            Self::TeamAssembled => "team_assembled",
            Self::InProgress => "in_progress",
            Self::QaReview => "qa_review",
            Self::ClientSignoff => "client_signoff",
            Self::Closed => "closed",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership of one employee in a project team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub employee_id: String,
    /// On-project role label, e.g. `senior auditor`.
    pub project_role: String,
}

impl TeamMember {
    pub fn new(employee_id: impl Into<String>, project_role: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            project_role: project_role.into(),
        }
    }
}

/// One QA checklist line reviewed before client sign-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCheck {
    pub label: String,
    pub checked: bool,
}

impl QualityCheck {
    pub fn new(label: impl Into<String>, checked: bool) -> Self {
        Self {
            label: label.into(),
            checked,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectValidationError {
    NilId,
    NegativeAmount(i64),
    InvalidCurrency(String),
    InvalidSchedule { start_date: i64, deadline: i64 },
    DuplicateTeamMember(String),
    Task(TaskValidationError),
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "project id must not be nil"),
            Self::NegativeAmount(amount) => {
                write!(f, "project amount must not be negative, got {amount}")
            }
            Self::InvalidCurrency(code) => {
                write!(f, "currency must be a three-letter upper-case code, got `{code}`")
            }
            Self::InvalidSchedule {
                start_date,
                deadline,
            } => write!(
                f,
                "deadline ({deadline}) must be >= start_date ({start_date})"
            ),
            Self::DuplicateTeamMember(employee_id) => {
                write!(f, "employee `{employee_id}` is already on the team")
            }
            Self::Task(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Task(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for ProjectValidationError {
    fn from(value: TaskValidationError) -> Self {
        Self::Task(value)
    }
}

/// Project snapshot as seen by the workflow core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    /// Contract amount in minor currency units.
    pub amount_minor: Option<i64>,
    pub currency: Option<String>,
    /// Unix epoch milliseconds.
    pub start_date: Option<i64>,
    /// Unix epoch milliseconds. Should be >= `start_date` when set.
    pub deadline: Option<i64>,
    status: ProjectStatus,
    pub company_id: Option<String>,
    pub partner_id: Option<String>,
    pub pm_id: Option<String>,
    pub team: Vec<TeamMember>,
    pub tasks: Vec<Task>,
    pub quality_checklist: Vec<QualityCheck>,
}

impl Project {
    /// Creates a `draft` project with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_status(Uuid::new_v4(), name, ProjectStatus::Draft)
    }

    /// Rehydrates a snapshot at a known status.
    ///
    /// Used by storage and import paths; later status changes go through the
    /// workflow engine only.
    pub fn with_status(id: ProjectId, name: impl Into<String>, status: ProjectStatus) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            amount_minor: None,
            currency: None,
            start_date: None,
            deadline: None,
            status,
            company_id: None,
            partner_id: None,
            pm_id: None,
            team: Vec::new(),
            tasks: Vec::new(),
            quality_checklist: Vec::new(),
        }
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: ProjectStatus) {
        self.status = status;
    }

    /// Number of distinct employees on the team.
    pub fn team_size(&self) -> usize {
        self.team
            .iter()
            .map(|member| member.employee_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Checks attribute invariants. Does not look at workflow requirements.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.id.is_nil() {
            return Err(ProjectValidationError::NilId);
        }
        if let Some(amount) = self.amount_minor {
            if amount < 0 {
                return Err(ProjectValidationError::NegativeAmount(amount));
            }
        }
        if let Some(code) = self.currency.as_deref() {
            if !CURRENCY_CODE_RE.is_match(code) {
                return Err(ProjectValidationError::InvalidCurrency(code.to_string()));
            }
        }
        if let (Some(start_date), Some(deadline)) = (self.start_date, self.deadline) {
            if deadline < start_date {
                return Err(ProjectValidationError::InvalidSchedule {
                    start_date,
                    deadline,
                });
            }
        }

        let mut seen = BTreeSet::new();
        for member in &self.team {
            if !seen.insert(member.employee_id.as_str()) {
                return Err(ProjectValidationError::DuplicateTeamMember(
                    member.employee_id.clone(),
                ));
            }
        }

        for task in &self.tasks {
            task.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Project, ProjectStatus, ProjectValidationError, TeamMember};

    #[test]
    fn new_project_starts_in_draft() {
        let project = Project::new("Acme Audit");
        assert_eq!(project.status(), ProjectStatus::Draft);
        assert!(!project.id.is_nil());
        assert!(project.validate().is_ok());
    }

    #[test]
    fn status_parse_matches_as_str() {
        for status in ProjectStatus::ALL {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProjectStatus::parse("cancelled"), None);
    }

    #[test]
    fn validate_rejects_lowercase_currency() {
        let mut project = Project::new("Acme Audit");
        project.currency = Some("kzt".to_string());
        assert_eq!(
            project.validate().unwrap_err(),
            ProjectValidationError::InvalidCurrency("kzt".to_string())
        );
    }

    #[test]
    fn validate_rejects_deadline_before_start() {
        let mut project = Project::new("Acme Audit");
        project.start_date = Some(2_000);
        project.deadline = Some(1_000);
        assert_eq!(
            project.validate().unwrap_err(),
            ProjectValidationError::InvalidSchedule {
                start_date: 2_000,
                deadline: 1_000
            }
        );
    }

    #[test]
    fn validate_rejects_duplicate_team_member() {
        let mut project = Project::new("Acme Audit");
        project.team.push(TeamMember::new("e1", "auditor"));
        project.team.push(TeamMember::new("e1", "senior auditor"));
        assert!(matches!(
            project.validate().unwrap_err(),
            ProjectValidationError::DuplicateTeamMember(id) if id == "e1"
        ));
    }
}
