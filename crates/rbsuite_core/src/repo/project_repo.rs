//! Project repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist project snapshots with their team, tasks and QA checklist.
//! - Perform the optimistic status update guarded by the previously read
//!   status.
//!
//! # Invariants
//! - Write paths call `Project::validate()` before SQL mutations.
//! - `update_project` never writes `status`; only `compare_and_set_status`
//!   does, together with a history row in the same transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::project::{
    Project, ProjectId, ProjectStatus, ProjectValidationError, QualityCheck, TeamMember,
};
use crate::model::role::Role;
use crate::model::task::{Task, TaskPriority, TaskStatus};
use crate::workflow::event::ProjectStatusChanged;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    amount_minor,
    currency,
    start_date,
    deadline,
    status,
    company_id,
    partner_id,
    pm_id
FROM projects";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Validation(ProjectValidationError),
    Db(DbError),
    NotFound(ProjectId),
    InvalidData(String),
    /// The stored status moved on after the caller read it.
    ConcurrentModification {
        project_id: ProjectId,
        expected: ProjectStatus,
        actual: ProjectStatus,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "project not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted project data: {message}"),
            Self::ConcurrentModification {
                project_id,
                expected,
                actual,
            } => write!(
                f,
                "project {project_id} status changed concurrently: expected `{expected}`, found `{actual}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProjectValidationError> for RepoError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing projects.
#[derive(Debug, Clone, Default)]
pub struct ProjectListQuery {
    pub status: Option<ProjectStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Persistence collaborator of the workflow service.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    /// Replaces every attribute and collection except `status`.
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    /// Writes `change.to_status` only if the stored status still equals
    /// `change.from_status`, and records the change in the status history.
    fn compare_and_set_status(&self, change: &ProjectStatusChanged) -> RepoResult<()>;
    /// Status changes of one project, oldest first.
    fn status_history(&self, id: ProjectId) -> RepoResult<Vec<ProjectStatusChanged>>;
}

impl<R: ProjectRepository + ?Sized> ProjectRepository for &R {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        (**self).create_project(project)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        (**self).update_project(project)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        (**self).get_project(id)
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        (**self).list_projects(query)
    }

    fn compare_and_set_status(&self, change: &ProjectStatusChanged) -> RepoResult<()> {
        (**self).compare_and_set_status(change)
    }

    fn status_history(&self, id: ProjectId) -> RepoResult<Vec<ProjectStatusChanged>> {
        (**self).status_history(id)
    }
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn begin_immediate(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        let tx = self.begin_immediate()?;
        tx.execute(
            "INSERT INTO projects (
                id,
                name,
                description,
                amount_minor,
                currency,
                start_date,
                deadline,
                status,
                company_id,
                partner_id,
                pm_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                project.id.to_string(),
                project.name.as_str(),
                project.description.as_str(),
                project.amount_minor,
                project.currency.as_deref(),
                project.start_date,
                project.deadline,
                project.status().as_str(),
                project.company_id.as_deref(),
                project.partner_id.as_deref(),
                project.pm_id.as_deref(),
            ],
        )?;
        write_collections(&tx, project)?;
        tx.commit()?;

        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let tx = self.begin_immediate()?;
        let changed = tx.execute(
            "UPDATE projects
             SET
                name = ?2,
                description = ?3,
                amount_minor = ?4,
                currency = ?5,
                start_date = ?6,
                deadline = ?7,
                company_id = ?8,
                partner_id = ?9,
                pm_id = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                project.id.to_string(),
                project.name.as_str(),
                project.description.as_str(),
                project.amount_minor,
                project.currency.as_deref(),
                project.start_date,
                project.deadline,
                project.company_id.as_deref(),
                project.partner_id.as_deref(),
                project.pm_id.as_deref(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(project.id));
        }

        let id = project.id.to_string();
        tx.execute("DELETE FROM project_team WHERE project_id = ?1;", [&id])?;
        tx.execute("DELETE FROM project_tasks WHERE project_id = ?1;", [&id])?;
        tx.execute(
            "DELETE FROM project_quality_checks WHERE project_id = ?1;",
            [&id],
        )?;
        write_collections(&tx, project)?;
        tx.commit()?;

        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => {
                let mut project = parse_project_row(row)?;
                load_collections(self.conn, &mut project)?;
                project.validate()?;
                Ok(Some(project))
            }
            None => Ok(None),
        }
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        sql.push_str(" ORDER BY updated_at DESC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        for project in &mut projects {
            load_collections(self.conn, project)?;
            project.validate()?;
        }
        Ok(projects)
    }

    fn compare_and_set_status(&self, change: &ProjectStatusChanged) -> RepoResult<()> {
        let id = change.project_id.to_string();
        let tx = self.begin_immediate()?;

        let changed = tx.execute(
            "UPDATE projects
             SET
                status = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND status = ?2;",
            params![
                id,
                change.from_status.as_str(),
                change.to_status.as_str()
            ],
        )?;

        if changed == 0 {
            let actual: Option<String> = tx
                .query_row("SELECT status FROM projects WHERE id = ?1;", [&id], |row| {
                    row.get(0)
                })
                .optional()?;
            return match actual {
                None => Err(RepoError::NotFound(change.project_id)),
                Some(value) => Err(RepoError::ConcurrentModification {
                    project_id: change.project_id,
                    expected: change.from_status,
                    actual: parse_status_column(&value, "projects.status")?,
                }),
            };
        }

        tx.execute(
            "INSERT INTO project_status_history (
                project_id,
                from_status,
                to_status,
                actor_role,
                changed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id,
                change.from_status.as_str(),
                change.to_status.as_str(),
                change.actor_role.as_str(),
                change.timestamp,
            ],
        )?;
        tx.commit()?;

        Ok(())
    }

    fn status_history(&self, id: ProjectId) -> RepoResult<Vec<ProjectStatusChanged>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_status, to_status, actor_role, changed_at
             FROM project_status_history
             WHERE project_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut history = Vec::new();

        while let Some(row) = rows.next()? {
            let from_status: String = row.get("from_status")?;
            let to_status: String = row.get("to_status")?;
            let actor_role: String = row.get("actor_role")?;
            history.push(ProjectStatusChanged {
                project_id: id,
                from_status: parse_status_column(&from_status, "project_status_history.from_status")?,
                to_status: parse_status_column(&to_status, "project_status_history.to_status")?,
                actor_role: Role::parse(&actor_role).ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "invalid role `{actor_role}` in project_status_history.actor_role"
                    ))
                })?,
                timestamp: row.get("changed_at")?,
            });
        }

        Ok(history)
    }
}

fn write_collections(tx: &Transaction<'_>, project: &Project) -> RepoResult<()> {
    let id = project.id.to_string();

    for member in &project.team {
        tx.execute(
            "INSERT INTO project_team (project_id, employee_id, project_role)
             VALUES (?1, ?2, ?3);",
            params![id, member.employee_id.as_str(), member.project_role.as_str()],
        )?;
    }

    for (position, task) in project.tasks.iter().enumerate() {
        tx.execute(
            "INSERT INTO project_tasks (
                id,
                project_id,
                title,
                status,
                priority,
                estimated_hours,
                spent_hours,
                assignee_id,
                position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.id.to_string(),
                id,
                task.title.as_str(),
                task.status.as_str(),
                task.priority.as_str(),
                task.estimated_hours,
                task.spent_hours,
                task.assignee_id.as_deref(),
                position as i64,
            ],
        )?;
    }

    for (position, check) in project.quality_checklist.iter().enumerate() {
        tx.execute(
            "INSERT INTO project_quality_checks (project_id, position, label, checked)
             VALUES (?1, ?2, ?3, ?4);",
            params![id, position as i64, check.label.as_str(), bool_to_int(check.checked)],
        )?;
    }

    Ok(())
}

fn load_collections(conn: &Connection, project: &mut Project) -> RepoResult<()> {
    let id = project.id.to_string();

    let mut team_stmt = conn.prepare(
        "SELECT employee_id, project_role
         FROM project_team
         WHERE project_id = ?1
         ORDER BY employee_id ASC;",
    )?;
    let mut rows = team_stmt.query([&id])?;
    project.team.clear();
    while let Some(row) = rows.next()? {
        project.team.push(TeamMember {
            employee_id: row.get("employee_id")?,
            project_role: row.get("project_role")?,
        });
    }

    let mut task_stmt = conn.prepare(
        "SELECT id, title, status, priority, estimated_hours, spent_hours, assignee_id
         FROM project_tasks
         WHERE project_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = task_stmt.query([&id])?;
    project.tasks.clear();
    while let Some(row) = rows.next()? {
        project.tasks.push(parse_task_row(row)?);
    }

    let mut check_stmt = conn.prepare(
        "SELECT label, checked
         FROM project_quality_checks
         WHERE project_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = check_stmt.query([&id])?;
    project.quality_checklist.clear();
    while let Some(row) = rows.next()? {
        let checked = int_to_bool(row.get("checked")?, "project_quality_checks.checked")?;
        project.quality_checklist.push(QualityCheck {
            label: row.get("label")?,
            checked,
        });
    }

    Ok(())
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id = parse_uuid_column(&row.get::<_, String>("id")?, "projects.id")?;
    let status = parse_status_column(&row.get::<_, String>("status")?, "projects.status")?;

    let mut project = Project::with_status(id, row.get::<_, String>("name")?, status);
    project.description = row.get("description")?;
    project.amount_minor = row.get("amount_minor")?;
    project.currency = row.get("currency")?;
    project.start_date = row.get("start_date")?;
    project.deadline = row.get("deadline")?;
    project.company_id = row.get("company_id")?;
    project.partner_id = row.get("partner_id")?;
    project.pm_id = row.get("pm_id")?;
    Ok(project)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let status_text: String = row.get("status")?;
    let priority_text: String = row.get("priority")?;

    Ok(Task {
        id: parse_uuid_column(&row.get::<_, String>("id")?, "project_tasks.id")?,
        title: row.get("title")?,
        status: TaskStatus::parse(&status_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid task status `{status_text}` in project_tasks.status"
            ))
        })?,
        priority: TaskPriority::parse(&priority_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid task priority `{priority_text}` in project_tasks.priority"
            ))
        })?,
        estimated_hours: row.get("estimated_hours")?,
        spent_hours: row.get("spent_hours")?,
        assignee_id: row.get("assignee_id")?,
    })
}

fn parse_uuid_column(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_status_column(value: &str, column: &str) -> RepoResult<ProjectStatus> {
    ProjectStatus::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid project status `{value}` in {column}"))
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
