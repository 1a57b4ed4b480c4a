use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use taskdeck_core::db::open_db_in_memory;
use taskdeck_core::{
    AddTaskRequest, NoteService, ProjectDraft, ProjectEdit, ProjectScope, ProjectService,
    ProjectServiceError, SqliteNoteRepository, SqliteProjectRepository, SqliteTaskRepository,
    TaskService, TaskStatus,
};

type Projects<'c> =
    ProjectService<SqliteProjectRepository<'c>, SqliteTaskRepository<'c>, SqliteNoteRepository<'c>>;

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn project_service(conn: &Connection) -> Projects<'_> {
    ProjectService::new(
        SqliteProjectRepository::try_new(conn).unwrap(),
        SqliteTaskRepository::try_new(conn).unwrap(),
        SqliteNoteRepository::try_new(conn).unwrap(),
    )
}

fn draft(title: &str, tags: &[&str]) -> ProjectDraft {
    ProjectDraft {
        title: title.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        ..ProjectDraft::default()
    }
}

#[test]
fn create_normalizes_tags_and_round_trips() {
    let conn = open_db_in_memory().unwrap();
    let service = project_service(&conn);

    let created = service
        .create_project(&draft("  Launch  ", &["Work", "work ", "Client"]), at(1, 9))
        .unwrap();
    assert_eq!(created.title, "Launch");
    assert_eq!(created.tags, vec!["client", "work"]);

    let loaded = service.get_project(created.id, false).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(service.available_tags().unwrap(), vec!["client", "work"]);
}

#[test]
fn blank_title_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = project_service(&conn);

    assert!(matches!(
        service.create_project(&draft("   ", &[]), at(1, 9)),
        Err(ProjectServiceError::InvalidTitle)
    ));
}

#[test]
fn tag_filter_and_update_replace_tag_set() {
    let conn = open_db_in_memory().unwrap();
    let service = project_service(&conn);

    let home = service
        .create_project(&draft("Home", &["personal"]), at(1, 9))
        .unwrap();
    service
        .create_project(&draft("Office", &["work"]), at(2, 9))
        .unwrap();

    let personal = service.list_projects(Some("Personal"), false).unwrap();
    assert_eq!(personal.len(), 1);
    assert_eq!(personal[0].id, home.id);

    service
        .update_project(
            home.id,
            &ProjectEdit {
                tags: Some(vec!["Work".to_string()]),
                description: Some("  chores ".to_string()),
                ..ProjectEdit::default()
            },
        )
        .unwrap();

    assert!(service.list_projects(Some("personal"), false).unwrap().is_empty());
    assert_eq!(service.list_projects(Some("work"), false).unwrap().len(), 2);
    let updated = service.get_project(home.id, false).unwrap().unwrap();
    assert_eq!(updated.description, "chores");
    assert_eq!(service.available_tags().unwrap(), vec!["work"]);
}

#[test]
fn trash_restore_and_purge_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let service = project_service(&conn);
    let project = service
        .create_project(&draft("Old", &[]), at(1, 9))
        .unwrap();

    assert!(matches!(
        service.purge_project(project.id),
        Err(ProjectServiceError::ProjectNotFound(_))
    ));

    service.trash_project(project.id, at(3, 9)).unwrap();
    assert!(service.list_projects(None, false).unwrap().is_empty());
    let trashed = service.list_projects(None, true).unwrap();
    assert_eq!(trashed.len(), 1);
    assert_eq!(trashed[0].deleted_at, Some(at(3, 9)));
    assert!(service.get_project(project.id, false).unwrap().is_none());

    service.restore_project(project.id).unwrap();
    let restored = service.get_project(project.id, false).unwrap().unwrap();
    assert!(!restored.is_deleted);
    assert_eq!(restored.deleted_at, None);

    service.trash_project(project.id, at(4, 9)).unwrap();
    service.trash_project(project.id, at(5, 9)).unwrap();
    let retrashed = service.get_project(project.id, true).unwrap().unwrap();
    assert_eq!(retrashed.deleted_at, Some(at(4, 9)));
    assert!(matches!(
        service.trash_project(uuid::Uuid::new_v4(), at(5, 9)),
        Err(ProjectServiceError::ProjectNotFound(_))
    ));

    service.purge_project(project.id).unwrap();
    assert!(service.get_project(project.id, true).unwrap().is_none());
}

#[test]
fn purge_cascades_to_tasks_and_notes() {
    let conn = open_db_in_memory().unwrap();
    let projects = project_service(&conn);
    let project = projects
        .create_project(&draft("Doomed", &[]), at(1, 9))
        .unwrap();

    let mut tasks = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    tasks
        .add_task(&AddTaskRequest::new(project.id, "task"), at(1, 10))
        .unwrap();
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    notes.add_note(project.id, "note", at(1, 11)).unwrap();

    projects.trash_project(project.id, at(2, 9)).unwrap();
    projects.purge_project(project.id).unwrap();

    let remaining: i64 = conn
        .query_row(
            "SELECT (SELECT COUNT(*) FROM tasks) + (SELECT COUNT(*) FROM notes);",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn bundle_and_overview_join_tasks_and_notes() {
    let conn = open_db_in_memory().unwrap();
    let projects = project_service(&conn);
    let project = projects
        .create_project(&draft("Joined", &["x"]), at(1, 9))
        .unwrap();

    let mut tasks = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let created = tasks
        .add_task(&AddTaskRequest::new(project.id, "first"), at(2, 9))
        .unwrap();
    tasks
        .add_task(&AddTaskRequest::new(project.id, "second"), at(3, 9))
        .unwrap();
    tasks.set_status(created[0].id, TaskStatus::Done).unwrap();
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    notes.add_note(project.id, "latest thought", at(5, 9)).unwrap();

    let bundle = projects.project_bundle(project.id).unwrap();
    assert_eq!(bundle.tasks.len(), 2);
    assert_eq!(bundle.notes.len(), 1);

    let overviews = projects.project_overviews(None).unwrap();
    assert_eq!(overviews.len(), 1);
    assert_eq!(overviews[0].counts.done, 1);
    assert_eq!(overviews[0].counts.todo, 1);
    assert_eq!(overviews[0].last_updated, Some(at(5, 9)));

    let bundles = projects.project_bundles(ProjectScope::All).unwrap();
    assert_eq!(bundles.len(), 1);
}

#[test]
fn reminders_match_day_and_notify_flag_only() {
    let conn = open_db_in_memory().unwrap();
    let service = project_service(&conn);
    let day = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

    let mut due = draft("Due", &[]);
    due.reminder_date = Some(day);
    due.notify = true;
    let due = service.create_project(&due, at(1, 9)).unwrap();

    let mut silent = draft("Silent", &[]);
    silent.reminder_date = Some(day);
    service.create_project(&silent, at(1, 9)).unwrap();

    let mut other_day = draft("Other", &[]);
    other_day.reminder_date = day.succ_opt();
    other_day.notify = true;
    service.create_project(&other_day, at(1, 9)).unwrap();

    let reminders = service.due_project_reminders(day).unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].id, due.id);
}
