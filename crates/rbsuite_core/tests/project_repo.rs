use rbsuite_core::db::open_db_in_memory;
use rbsuite_core::{
    Project, ProjectListQuery, ProjectRepository, ProjectStatus, ProjectStatusChanged,
    ProjectValidationError, QualityCheck, RepoError, Role, SqliteProjectRepository, Task,
    TaskPriority, TaskStatus, TeamMember,
};
use uuid::Uuid;

fn full_project() -> Project {
    let mut project = Project::new("Acme Audit");
    project.description = "Annual audit".to_string();
    project.amount_minor = Some(2_500_000);
    project.currency = Some("KZT".to_string());
    project.start_date = Some(1_767_225_600_000);
    project.deadline = Some(1_775_001_600_000);
    project.company_id = Some("c1".to_string());
    project.team.push(TeamMember::new("e1", "auditor"));
    project.team.push(TeamMember::new("e2", "senior auditor"));

    let mut task = Task::with_status("inventory count", TaskStatus::InReview);
    task.priority = TaskPriority::High;
    task.estimated_hours = 12.5;
    task.spent_hours = 4.0;
    task.assignee_id = Some("e1".to_string());
    project.tasks.push(task);
    project
        .tasks
        .push(Task::with_status("bank confirmations", TaskStatus::Done));

    project
        .quality_checklist
        .push(QualityCheck::new("working papers reviewed", false));
    project
}

fn change(project: &Project, from: ProjectStatus, to: ProjectStatus, role: Role) -> ProjectStatusChanged {
    ProjectStatusChanged {
        project_id: project.id,
        from_status: from,
        to_status: to,
        actor_role: role,
        timestamp: 1_767_225_600_000,
    }
}

#[test]
fn create_and_get_roundtrip_preserves_collections() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let project = full_project();
    let id = repo.create_project(&project).unwrap();

    let loaded = repo.get_project(id).unwrap().unwrap();
    assert_eq!(loaded, project);
}

#[test]
fn get_missing_project_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);
    assert!(repo.get_project(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn create_rejects_invalid_project() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let mut project = full_project();
    project.currency = Some("tenge".to_string());
    let err = repo.create_project(&project).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ProjectValidationError::InvalidCurrency(_))
    ));
    assert!(repo.get_project(project.id).unwrap().is_none());
}

#[test]
fn update_replaces_collections_but_keeps_status() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let project = full_project();
    repo.create_project(&project).unwrap();

    let mut edited = Project::with_status(project.id, "Acme Audit FY2026", ProjectStatus::Archived);
    edited.team.push(TeamMember::new("e3", "manager"));
    repo.update_project(&edited).unwrap();

    let loaded = repo.get_project(project.id).unwrap().unwrap();
    assert_eq!(loaded.status(), ProjectStatus::Draft);
    assert_eq!(loaded.name, "Acme Audit FY2026");
    assert_eq!(loaded.team, vec![TeamMember::new("e3", "manager")]);
    assert!(loaded.tasks.is_empty());
    assert!(loaded.quality_checklist.is_empty());
}

#[test]
fn update_missing_project_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let project = full_project();
    let err = repo.update_project(&project).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == project.id));
}

#[test]
fn compare_and_set_advances_and_records_history() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let project = full_project();
    repo.create_project(&project).unwrap();

    let first = change(&project, ProjectStatus::Draft, ProjectStatus::PreApproval, Role::Procurement);
    repo.compare_and_set_status(&first).unwrap();

    let loaded = repo.get_project(project.id).unwrap().unwrap();
    assert_eq!(loaded.status(), ProjectStatus::PreApproval);
    assert_eq!(repo.status_history(project.id).unwrap(), vec![first]);
}

#[test]
fn compare_and_set_with_stale_status_reports_concurrent_modification() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let project = full_project();
    repo.create_project(&project).unwrap();

    let winner = change(&project, ProjectStatus::Draft, ProjectStatus::PreApproval, Role::Procurement);
    repo.compare_and_set_status(&winner).unwrap();

    let stale = change(&project, ProjectStatus::Draft, ProjectStatus::PreApproval, Role::Procurement);
    let err = repo.compare_and_set_status(&stale).unwrap_err();
    match err {
        RepoError::ConcurrentModification {
            project_id,
            expected,
            actual,
        } => {
            assert_eq!(project_id, project.id);
            assert_eq!(expected, ProjectStatus::Draft);
            assert_eq!(actual, ProjectStatus::PreApproval);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(repo.status_history(project.id).unwrap().len(), 1);
}

#[test]
fn compare_and_set_on_missing_project_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let ghost = Project::new("ghost");
    let err = repo
        .compare_and_set_status(&change(
            &ghost,
            ProjectStatus::Draft,
            ProjectStatus::PreApproval,
            Role::Procurement,
        ))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == ghost.id));
}

#[test]
fn list_filters_by_status_and_paginates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let draft_a = Project::new("a");
    let draft_b = Project::new("b");
    let closed = Project::with_status(Uuid::new_v4(), "c", ProjectStatus::Closed);
    for project in [&draft_a, &draft_b, &closed] {
        repo.create_project(project).unwrap();
    }

    let drafts = repo
        .list_projects(&ProjectListQuery {
            status: Some(ProjectStatus::Draft),
            ..ProjectListQuery::default()
        })
        .unwrap();
    assert_eq!(drafts.len(), 2);
    assert!(drafts.iter().all(|p| p.status() == ProjectStatus::Draft));

    let all = repo.list_projects(&ProjectListQuery::default()).unwrap();
    assert_eq!(all.len(), 3);

    let page = repo
        .list_projects(&ProjectListQuery {
            limit: Some(2),
            offset: 2,
            ..ProjectListQuery::default()
        })
        .unwrap();
    assert_eq!(page.len(), 1);
}

#[test]
fn invalid_persisted_task_id_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProjectRepository::new(&conn);

    let project = Project::new("Acme Audit");
    repo.create_project(&project).unwrap();
    conn.execute(
        "INSERT INTO project_tasks (id, project_id, title, status, priority, position)
         VALUES ('not-a-uuid', ?1, 'broken', 'todo', 'low', 0);",
        [project.id.to_string()],
    )
    .unwrap();

    let err = repo.get_project(project.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("not-a-uuid")));
}
