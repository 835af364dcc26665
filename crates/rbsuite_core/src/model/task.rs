//! Task domain model.
//!
//! # Responsibility
//! - Define the unit of work attached to a project.
//! - Derive completion ratios used by workflow requirements.
//!
//! # Invariants
//! - `id` is stable and non-nil.
//! - Hour counters are finite and never negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type TaskId = Uuid;

/// Task lifecycle state. Independent from the project workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Backlog,
    Todo,
    InProgress,
    InReview,
    Done,
    Blocked,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "backlog" => Some(Self::Backlog),
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "in_review" => Some(Self::InReview),
            "done" => Some(Self::Done),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// Validation failures for task records.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskValidationError {
    NilId,
    BlankTitle,
    InvalidHours { field: &'static str, value: f64 },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::InvalidHours { field, value } => {
                write!(f, "{field} must be a finite, non-negative number, got {value}")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Unit of work belonging to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub estimated_hours: f64,
    pub spent_hours: f64,
    /// Employee id of the assignee, if any.
    pub assignee_id: Option<String>,
}

impl Task {
    /// Creates a `todo` task with medium priority and zeroed hours.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            estimated_hours: 0.0,
            spent_hours: 0.0,
            assignee_id: None,
        }
    }

    /// Shorthand for building fixtures and imports with a known status.
    pub fn with_status(title: impl Into<String>, status: TaskStatus) -> Self {
        let mut task = Self::new(title);
        task.status = status;
        task
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        check_hours("estimated_hours", self.estimated_hours)?;
        check_hours("spent_hours", self.spent_hours)?;
        Ok(())
    }
}

fn check_hours(field: &'static str, value: f64) -> Result<(), TaskValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TaskValidationError::InvalidHours { field, value })
    }
}

/// Share of `done` tasks, or `None` when there are no tasks at all.
pub fn completion_ratio(tasks: &[Task]) -> Option<f64> {
    if tasks.is_empty() {
        return None;
    }
    let done = tasks.iter().filter(|task| task.is_done()).count();
    Some(done as f64 / tasks.len() as f64)
}
