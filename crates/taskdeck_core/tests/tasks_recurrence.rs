use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use taskdeck_core::db::open_db_in_memory;
use taskdeck_core::{
    AddTaskRequest, Cadence, Priority, ProjectDraft, ProjectId, ProjectService,
    SqliteNoteRepository, SqliteProjectRepository, SqliteTaskRepository, TaskEdit, TaskFilter,
    TaskService, TaskServiceError, TaskStatus,
};

fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn seed_project(conn: &Connection) -> ProjectId {
    let service = ProjectService::new(
        SqliteProjectRepository::try_new(conn).unwrap(),
        SqliteTaskRepository::try_new(conn).unwrap(),
        SqliteNoteRepository::try_new(conn).unwrap(),
    );
    service
        .create_project(
            &ProjectDraft {
                title: "Tracker".to_string(),
                ..ProjectDraft::default()
            },
            at(1, 1, 9),
        )
        .unwrap()
        .id
}

#[test]
fn monthly_request_stores_one_task_per_clamped_occurrence() {
    let conn = open_db_in_memory().unwrap();
    let project_id = seed_project(&conn);
    let mut service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let mut request = AddTaskRequest::new(project_id, "Pay rent")
        .recurring(Cadence::Monthly, at(4, 30, 0));
    request.due_at = Some(at(1, 31, 0));
    request.priority = Priority::High;

    let created = service.add_task(&request, at(1, 15, 9)).unwrap();
    let dues: Vec<NaiveDateTime> = created.iter().filter_map(|task| task.due_at).collect();
    assert_eq!(
        dues,
        vec![at(1, 31, 0), at(2, 29, 0), at(3, 31, 0), at(4, 30, 0)]
    );

    let stored = service.all_tasks(&TaskFilter::default()).unwrap();
    assert_eq!(stored.len(), 4);
    assert!(stored.iter().all(|task| task.is_recurring
        && task.recurrence == Cadence::Monthly
        && task.recurrence_end == Some(at(4, 30, 0))
        && task.priority == Priority::High
        && task.title == "Pay rent"));
}

#[test]
fn end_before_start_or_non_recurring_yields_single_task() {
    let conn = open_db_in_memory().unwrap();
    let project_id = seed_project(&conn);
    let mut service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let mut backwards =
        AddTaskRequest::new(project_id, "Backwards").recurring(Cadence::Daily, at(6, 1, 0));
    backwards.due_at = Some(at(6, 5, 0));
    assert_eq!(service.add_task(&backwards, at(6, 1, 9)).unwrap().len(), 1);

    let mut one_off =
        AddTaskRequest::new(project_id, "One off").recurring(Cadence::Daily, at(6, 30, 0));
    one_off.is_recurring = false;
    one_off.due_at = Some(at(6, 5, 0));
    assert_eq!(service.add_task(&one_off, at(6, 1, 9)).unwrap().len(), 1);

    let mut same_day =
        AddTaskRequest::new(project_id, "Same day").recurring(Cadence::Daily, at(6, 1, 0));
    same_day.due_at = Some(at(6, 1, 0));
    assert_eq!(service.add_task(&same_day, at(6, 1, 9)).unwrap().len(), 1);
}

#[test]
fn missing_due_date_defaults_to_now() {
    let conn = open_db_in_memory().unwrap();
    let project_id = seed_project(&conn);
    let mut service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let created = service
        .add_task(&AddTaskRequest::new(project_id, "Now-ish"), at(6, 10, 8))
        .unwrap();
    assert_eq!(created[0].due_at, Some(at(6, 10, 8)));
    assert_eq!(created[0].status, TaskStatus::Todo);
}

#[test]
fn blank_titles_are_rejected_on_add_and_edit() {
    let conn = open_db_in_memory().unwrap();
    let project_id = seed_project(&conn);
    let mut service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.add_task(&AddTaskRequest::new(project_id, "  "), at(6, 1, 9)),
        Err(TaskServiceError::InvalidTitle)
    ));

    let task = service
        .add_task(&AddTaskRequest::new(project_id, "Real"), at(6, 1, 9))
        .unwrap()
        .remove(0);
    let edit = TaskEdit {
        title: Some(String::new()),
        ..TaskEdit::default()
    };
    assert!(matches!(
        service.edit_task(task.id, &edit),
        Err(TaskServiceError::InvalidTitle)
    ));
}

#[test]
fn edit_status_and_delete_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let project_id = seed_project(&conn);
    let mut service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let task = service
        .add_task(&AddTaskRequest::new(project_id, "Draft"), at(6, 1, 9))
        .unwrap()
        .remove(0);

    let edited = service
        .edit_task(
            task.id,
            &TaskEdit {
                title: Some(" Final ".to_string()),
                priority: Some(Priority::Low),
                due_at: Some(None),
            },
        )
        .unwrap();
    assert_eq!(edited.title, "Final");
    assert_eq!(edited.due_at, None);

    service.set_status(task.id, TaskStatus::InProgress).unwrap();
    let loaded = service.get_task(task.id).unwrap().unwrap();
    assert_eq!(loaded.status, TaskStatus::InProgress);
    assert_eq!(loaded.priority, Priority::Low);

    service.delete_task(task.id).unwrap();
    assert!(service.get_task(task.id).unwrap().is_none());
    assert!(matches!(
        service.delete_task(task.id),
        Err(TaskServiceError::TaskNotFound(id)) if id == task.id
    ));
}

#[test]
fn listing_pages_filters_and_searches() {
    let conn = open_db_in_memory().unwrap();
    let project_id = seed_project(&conn);
    let mut service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let mut daily =
        AddTaskRequest::new(project_id, "Standup").recurring(Cadence::Daily, at(6, 10, 0));
    daily.due_at = Some(at(6, 1, 0));
    let created = service.add_task(&daily, at(6, 1, 9)).unwrap();
    assert_eq!(created.len(), 10);
    service
        .add_task(&AddTaskRequest::new(project_id, "Retro"), at(6, 2, 9))
        .unwrap();
    service.set_status(created[0].id, TaskStatus::Done).unwrap();

    let first = service.list_tasks(&TaskFilter::default(), 1).unwrap();
    assert_eq!(first.items.len(), 6);
    assert_eq!(first.total_items, 11);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items[0].due_at, Some(at(6, 1, 0)));

    let last = service.list_tasks(&TaskFilter::default(), 9).unwrap();
    assert_eq!(last.page, 2);
    assert_eq!(last.items.len(), 5);
    assert_eq!(last.items[4].title, "Retro");

    let search = TaskFilter {
        search: Some("RETR".to_string()),
        ..TaskFilter::default()
    };
    assert_eq!(service.list_tasks(&search, 1).unwrap().total_items, 1);

    let done = TaskFilter {
        status: Some(TaskStatus::Done),
        ..TaskFilter::default()
    };
    assert_eq!(service.list_tasks(&done, 1).unwrap().items.len(), 1);

    let empty = TaskFilter {
        search: Some("nothing".to_string()),
        ..TaskFilter::default()
    };
    let page = service.list_tasks(&empty, 3).unwrap();
    assert_eq!((page.page, page.total_pages, page.items.len()), (1, 1, 0));

    let counts = service.status_counts(Some(project_id)).unwrap();
    assert_eq!((counts.todo, counts.done, counts.total()), (10, 1, 11));
}

#[test]
fn due_buckets_and_agenda_read_from_storage() {
    let conn = open_db_in_memory().unwrap();
    let project_id = seed_project(&conn);
    let mut service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let now = at(6, 10, 8);

    let mut add = |title: &str, due: NaiveDateTime| {
        let mut request = AddTaskRequest::new(project_id, title);
        request.due_at = Some(due);
        service.add_task(&request, at(6, 1, 9)).unwrap().remove(0)
    };
    let t1 = add("overdue", at(6, 8, 9));
    let t2 = add("today", at(6, 10, 17));
    let t3 = add("tomorrow", at(6, 11, 9));
    let t4 = add("finished", at(6, 9, 9));
    service.set_status(t4.id, TaskStatus::Done).unwrap();

    let buckets = service.due_buckets(now).unwrap();
    assert_eq!(buckets.overdue, vec![t1.id]);
    assert_eq!(buckets.today, vec![t2.id]);
    assert_eq!(buckets.tomorrow, vec![t3.id]);

    let agenda = service.weekly_agenda(now).unwrap();
    assert_eq!(agenda.days.len(), 7);
    assert_eq!(agenda.days[0].tasks, vec![t2.id]);
    assert_eq!(agenda.days[1].tasks, vec![t3.id]);
    assert_eq!(agenda.overdue, vec![t1.id]);
}
