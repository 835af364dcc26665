//! Project workflow core for RB Partners Suite.
//! This crate owns project lifecycle rules: who may move a project to its
//! next status, and which data must be complete first.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod workflow;

pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::project::{
    Project, ProjectId, ProjectStatus, ProjectValidationError, QualityCheck, TeamMember,
};
pub use model::role::Role;
pub use model::task::{
    completion_ratio, Task, TaskId, TaskPriority, TaskStatus, TaskValidationError,
};
pub use repo::project_repo::{
    ProjectListQuery, ProjectRepository, RepoError, RepoResult, SqliteProjectRepository,
};
pub use service::workflow_service::{WorkflowService, WorkflowServiceError};
pub use workflow::engine::{
    apply_transition, can_transition, check_transition, failing_requirements,
    is_transition_permitted, next_candidate_status, requirement_report, workflow_progress,
    RequirementCheck, StatusChange, TransitionDenied, WorkflowProgress,
};
pub use workflow::event::{LogEventSink, ProjectStatusChanged, StatusEventSink};
pub use workflow::requirement::{evaluate_named, Requirement, UnknownRequirement};
pub use workflow::table::{lifecycle_chain, rule_for, TransitionRule};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
