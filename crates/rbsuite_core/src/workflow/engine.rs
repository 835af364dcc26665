//! Transition decisions over an in-memory project snapshot.
//!
//! # Responsibility
//! - Answer "what is next", "may this role move it", and "why not".
//! - Apply an allowed transition by changing `status` and nothing else.
//!
//! # Invariants
//! - The actor role is always an explicit argument.
//! - Denials are values, not panics: terminal state is reported before role,
//!   role before requirements.
//! - A denied `apply_transition` leaves the project untouched.

use crate::model::project::{Project, ProjectStatus};
use crate::model::role::Role;
use crate::workflow::requirement::Requirement;
use crate::workflow::table::{lifecycle_chain, rule_for};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reason a transition may not fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionDenied {
    /// The status has no outgoing edges.
    TerminalState { status: ProjectStatus },
    /// The role is not listed for the current status.
    UnauthorizedRole { status: ProjectStatus, role: Role },
    /// At least one requirement failed; carries all failures in table order.
    RequirementsUnmet {
        status: ProjectStatus,
        failing: Vec<Requirement>,
    },
}

impl TransitionDenied {
    /// Stable code for logs and API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TerminalState { .. } => "terminal_state",
            Self::UnauthorizedRole { .. } => "unauthorized_role",
            Self::RequirementsUnmet { .. } => "requirements_unmet",
        }
    }
}

impl Display for TransitionDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TerminalState { status } => {
                write!(f, "status `{status}` is terminal; no further transitions")
            }
            Self::UnauthorizedRole { status, role } => {
                write!(f, "role `{role}` may not advance a project in `{status}`")
            }
            Self::RequirementsUnmet { status, failing } => {
                let names = failing
                    .iter()
                    .map(|requirement| requirement.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "requirements unmet for `{status}`: {names}")
            }
        }
    }
}

impl Error for TransitionDenied {}

/// Applied status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: ProjectStatus,
    pub to: ProjectStatus,
}

/// One line of the requirement checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementCheck {
    pub requirement: Requirement,
    pub satisfied: bool,
}

/// Position of a project along the lifecycle chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowProgress {
    /// 1-based step number of the current status.
    pub current_step: usize,
    pub total_steps: usize,
    /// 0 at `draft`, 100 at `archived`.
    pub percent: u8,
}

/// True when `target` is a next candidate of the current status and `role` is
/// authorized for it. Requirements are not evaluated.
pub fn can_transition(project: &Project, target: ProjectStatus, role: Role) -> bool {
    let rule = rule_for(project.status());
    rule.allows_target(target) && rule.allows_role(role)
}

/// First next candidate of the current status, `None` when terminal.
pub fn next_candidate_status(project: &Project) -> Option<ProjectStatus> {
    rule_for(project.status()).next.first().copied()
}

/// Decides the transition for `role` and returns the target status.
pub fn check_transition(project: &Project, role: Role) -> Result<ProjectStatus, TransitionDenied> {
    let status = project.status();
    let rule = rule_for(status);

    let Some(target) = rule.next.first().copied() else {
        return Err(TransitionDenied::TerminalState { status });
    };
    if !rule.allows_role(role) {
        return Err(TransitionDenied::UnauthorizedRole { status, role });
    }

    let failing = failing_requirements(project);
    if !failing.is_empty() {
        return Err(TransitionDenied::RequirementsUnmet { status, failing });
    }

    Ok(target)
}

/// True when `role` is authorized and every requirement holds.
pub fn is_transition_permitted(project: &Project, role: Role) -> bool {
    check_transition(project, role).is_ok()
}

/// Moves `project` to its next status when permitted.
///
/// Only `status` changes. The caller persists the change (compare-and-swap on
/// the previous status) and publishes the resulting event.
pub fn apply_transition(project: &mut Project, role: Role) -> Result<StatusChange, TransitionDenied> {
    let from = project.status();
    let to = check_transition(project, role)?;
    project.set_status(to);
    Ok(StatusChange { from, to })
}

/// Requirement checklist for the current status, in table order.
pub fn requirement_report(project: &Project) -> Vec<RequirementCheck> {
    rule_for(project.status())
        .requirements
        .iter()
        .map(|requirement| RequirementCheck {
            requirement: *requirement,
            satisfied: requirement.evaluate(project),
        })
        .collect()
}

/// Requirements of the current status that do not hold.
pub fn failing_requirements(project: &Project) -> Vec<Requirement> {
    rule_for(project.status())
        .requirements
        .iter()
        .copied()
        .filter(|requirement| !requirement.evaluate(project))
        .collect()
}

pub fn workflow_progress(project: &Project) -> WorkflowProgress {
    let chain = lifecycle_chain();
    let index = chain
        .iter()
        .position(|status| *status == project.status())
        .unwrap_or_default();
    let last = chain.len().saturating_sub(1).max(1);

    WorkflowProgress {
        current_step: index + 1,
        total_steps: chain.len(),
        percent: (index * 100 / last) as u8,
    }
}
