use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::rc::Rc;
use taskdeck_core::db::open_db_in_memory;
use taskdeck_core::notify::{reminder_mail, LogMailer, Mailer, ReminderNotice, ReminderTracker};
use taskdeck_core::{
    AddTaskRequest, ProjectDraft, ProjectService, SqliteNoteRepository, SqliteProjectRepository,
    SqliteTaskRepository, TaskListQuery, TaskService, TaskStatus,
};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

#[test]
fn subscribers_receive_snapshots_after_each_write() {
    let conn = open_db_in_memory().unwrap();
    let projects = ProjectService::new(
        SqliteProjectRepository::try_new(&conn).unwrap(),
        SqliteTaskRepository::try_new(&conn).unwrap(),
        SqliteNoteRepository::try_new(&conn).unwrap(),
    );
    let project = projects
        .create_project(
            &ProjectDraft {
                title: "Live".to_string(),
                ..ProjectDraft::default()
            },
            at(1, 9),
        )
        .unwrap();

    let mut tasks = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let snapshots = Rc::new(RefCell::new(Vec::<usize>::new()));
    let sink = Rc::clone(&snapshots);
    let done_query = TaskListQuery {
        project_id: Some(project.id),
        status: Some(TaskStatus::Done),
        ..TaskListQuery::default()
    };
    let subscription = tasks
        .subscribe(done_query, move |snapshot| sink.borrow_mut().push(snapshot.len()))
        .unwrap();

    let created = tasks
        .add_task(&AddTaskRequest::new(project.id, "watch me"), at(2, 9))
        .unwrap();
    tasks.set_status(created[0].id, TaskStatus::Done).unwrap();
    tasks.delete_task(created[0].id).unwrap();
    assert_eq!(*snapshots.borrow(), vec![0, 0, 1, 0]);

    assert!(tasks.unsubscribe(subscription));
    tasks
        .add_task(&AddTaskRequest::new(project.id, "unseen"), at(2, 10))
        .unwrap();
    assert_eq!(snapshots.borrow().len(), 4);
}

#[test]
fn purging_a_project_refreshes_shared_task_feed() {
    let conn = open_db_in_memory().unwrap();
    let mut tasks = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let projects = ProjectService::new(
        SqliteProjectRepository::try_new(&conn).unwrap(),
        SqliteTaskRepository::try_new(&conn).unwrap(),
        SqliteNoteRepository::try_new(&conn).unwrap(),
    )
    .with_feed(tasks.feed());
    let project = projects
        .create_project(
            &ProjectDraft {
                title: "Doomed".to_string(),
                ..ProjectDraft::default()
            },
            at(1, 9),
        )
        .unwrap();
    tasks
        .add_task(&AddTaskRequest::new(project.id, "goes with it"), at(2, 9))
        .unwrap();

    let snapshots = Rc::new(RefCell::new(Vec::<usize>::new()));
    let sink = Rc::clone(&snapshots);
    tasks
        .subscribe(TaskListQuery::default(), move |snapshot| {
            sink.borrow_mut().push(snapshot.len())
        })
        .unwrap();
    assert_eq!(*snapshots.borrow(), vec![1]);

    projects.trash_project(project.id, at(3, 9)).unwrap();
    assert_eq!(*snapshots.borrow(), vec![1]);

    projects.purge_project(project.id).unwrap();
    assert_eq!(*snapshots.borrow(), vec![1, 0]);
    assert!(tasks.all_tasks(&Default::default()).unwrap().is_empty());
}

#[test]
fn tracker_and_mailer_announce_each_overdue_task_once() {
    let conn = open_db_in_memory().unwrap();
    let projects = ProjectService::new(
        SqliteProjectRepository::try_new(&conn).unwrap(),
        SqliteTaskRepository::try_new(&conn).unwrap(),
        SqliteNoteRepository::try_new(&conn).unwrap(),
    );
    let project = projects
        .create_project(
            &ProjectDraft {
                title: "Reminders".to_string(),
                ..ProjectDraft::default()
            },
            at(1, 9),
        )
        .unwrap();

    let mut tasks = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let mut late = AddTaskRequest::new(project.id, "Late report");
    late.due_at = Some(at(8, 9));
    let late = tasks.add_task(&late, at(1, 9)).unwrap().remove(0);

    let all = tasks.all_tasks(&Default::default()).unwrap();
    let mut tracker = ReminderTracker::new();
    let notices = tracker.observe(&all, at(10, 8));
    assert_eq!(notices, vec![ReminderNotice::Overdue { task: late.id }]);

    let mailer = LogMailer::new();
    let mail = reminder_mail("me@example.com", &notices, &all).unwrap();
    mailer.send(&mail).unwrap();
    assert_eq!(mailer.sent().len(), 1);
    assert!(mailer.sent()[0].body.contains("Late report"));

    assert!(tracker.observe(&all, at(10, 12)).is_empty());
}
