//! Project workflow use-case service.
//!
//! # Responsibility
//! - Create draft projects and update their working data.
//! - Advance a project one status: fetch, decide, compare-and-swap, publish.
//! - Expose the requirement checklist and progress for presentation callers.
//!
//! # Invariants
//! - The acting role is an explicit argument of every call.
//! - An event is published only after the status write committed.
//! - A concurrent status change is never overwritten; it surfaces as a
//!   retryable error or triggers a fresh decision in `advance_with_retry`.

use crate::model::project::{Project, ProjectId, ProjectStatus};
use crate::model::role::Role;
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository, RepoError};
use crate::workflow::engine::{
    apply_transition, requirement_report, workflow_progress, RequirementCheck, TransitionDenied,
    WorkflowProgress,
};
use crate::workflow::event::{ProjectStatusChanged, StatusEventSink};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;
use std::time::{SystemTime, UNIX_EPOCH};

/// Roles allowed to open a new project.
const PROJECT_CREATOR_ROLES: &[Role] = &[Role::Procurement];

#[derive(Debug)]
pub enum WorkflowServiceError {
    /// The engine refused the transition.
    Denied(TransitionDenied),
    ProjectNotFound(ProjectId),
    /// `role` may not open projects.
    CreateNotAllowed(Role),
    /// New projects must start in `draft`.
    NotDraft(ProjectStatus),
    /// Stored status moved on between read and write. Re-read and retry.
    ConcurrentModification {
        project_id: ProjectId,
        expected: ProjectStatus,
        actual: ProjectStatus,
    },
    Repo(RepoError),
}

impl WorkflowServiceError {
    /// True when re-reading the project and deciding again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}

impl Display for WorkflowServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::CreateNotAllowed(role) => write!(f, "role `{role}` may not create projects"),
            Self::NotDraft(status) => {
                write!(f, "new projects must start in `draft`, got `{status}`")
            }
            Self::ConcurrentModification {
                project_id,
                expected,
                actual,
            } => write!(
                f,
                "project {project_id} moved from `{expected}` to `{actual}` concurrently"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkflowServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Denied(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransitionDenied> for WorkflowServiceError {
    fn from(value: TransitionDenied) -> Self {
        Self::Denied(value)
    }
}

impl From<RepoError> for WorkflowServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ProjectNotFound(id),
            RepoError::ConcurrentModification {
                project_id,
                expected,
                actual,
            } => Self::ConcurrentModification {
                project_id,
                expected,
                actual,
            },
            other => Self::Repo(other),
        }
    }
}

/// Workflow facade over a project repository and an event sink.
pub struct WorkflowService<R: ProjectRepository, S: StatusEventSink> {
    repo: R,
    sink: S,
}

impl<R: ProjectRepository, S: StatusEventSink> WorkflowService<R, S> {
    pub fn new(repo: R, sink: S) -> Self {
        Self { repo, sink }
    }

    /// Persists a new `draft` project opened by `actor`.
    pub fn create_project(
        &self,
        actor: Role,
        project: &Project,
    ) -> Result<ProjectId, WorkflowServiceError> {
        if !PROJECT_CREATOR_ROLES.contains(&actor) {
            return Err(WorkflowServiceError::CreateNotAllowed(actor));
        }
        if project.status() != ProjectStatus::Draft {
            return Err(WorkflowServiceError::NotDraft(project.status()));
        }

        let id = self.repo.create_project(project)?;
        info!(
            "event=project_create module=service status=ok project_id={id} actor_role={actor}"
        );
        Ok(id)
    }

    /// Saves working data (details, team, tasks, checklist). Status is kept.
    pub fn update_project(&self, project: &Project) -> Result<(), WorkflowServiceError> {
        self.repo.update_project(project)?;
        Ok(())
    }

    pub fn get_project(&self, id: ProjectId) -> Result<Option<Project>, WorkflowServiceError> {
        Ok(self.repo.get_project(id)?)
    }

    pub fn list_projects(
        &self,
        query: &ProjectListQuery,
    ) -> Result<Vec<Project>, WorkflowServiceError> {
        Ok(self.repo.list_projects(query)?)
    }

    /// Checklist of the current status's requirements.
    pub fn requirement_report(
        &self,
        id: ProjectId,
    ) -> Result<Vec<RequirementCheck>, WorkflowServiceError> {
        let project = self.load(id)?;
        Ok(requirement_report(&project))
    }

    pub fn progress(&self, id: ProjectId) -> Result<WorkflowProgress, WorkflowServiceError> {
        let project = self.load(id)?;
        Ok(workflow_progress(&project))
    }

    pub fn status_history(
        &self,
        id: ProjectId,
    ) -> Result<Vec<ProjectStatusChanged>, WorkflowServiceError> {
        Ok(self.repo.status_history(id)?)
    }

    /// Moves the project one status forward on behalf of `actor`.
    ///
    /// # Errors
    /// - `Denied` for terminal, unauthorized or unmet-requirement cases.
    /// - `ConcurrentModification` when another writer advanced it first.
    pub fn advance(
        &self,
        id: ProjectId,
        actor: Role,
    ) -> Result<ProjectStatusChanged, WorkflowServiceError> {
        let mut project = self.load(id)?;

        let change = match apply_transition(&mut project, actor) {
            Ok(change) => change,
            Err(denied) => {
                info!(
                    "event=project_advance module=service status=denied project_id={id} actor_role={actor} from={} reason={}",
                    project.status(),
                    denied.code()
                );
                return Err(denied.into());
            }
        };

        let event = ProjectStatusChanged {
            project_id: id,
            from_status: change.from,
            to_status: change.to,
            actor_role: actor,
            timestamp: now_epoch_ms(),
        };

        if let Err(err) = self.repo.compare_and_set_status(&event) {
            warn!(
                "event=project_advance module=service status=error project_id={id} actor_role={actor} from={} to={} error={err}",
                change.from, change.to
            );
            return Err(err.into());
        }

        info!(
            "event=project_advance module=service status=ok project_id={id} actor_role={actor} from={} to={}",
            change.from, change.to
        );
        self.sink.publish(&event);
        Ok(event)
    }

    /// `advance`, re-reading and re-deciding after concurrent modifications.
    ///
    /// Gives up after `max_attempts` and returns the last error. Denials are
    /// returned immediately.
    pub fn advance_with_retry(
        &self,
        id: ProjectId,
        actor: Role,
        max_attempts: NonZeroU32,
    ) -> Result<ProjectStatusChanged, WorkflowServiceError> {
        let mut attempt = 1;
        loop {
            match self.advance(id, actor) {
                Err(err) if err.is_retryable() && attempt < max_attempts.get() => {
                    info!(
                        "event=project_advance_retry module=service status=retry project_id={id} attempt={attempt}"
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn load(&self, id: ProjectId) -> Result<Project, WorkflowServiceError> {
        self.repo
            .get_project(id)?
            .ok_or(WorkflowServiceError::ProjectNotFound(id))
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
