//! `taskdeck overdue`, `week` and `dashboard` implementations

use anyhow::Result;
use clap::Args;
use std::collections::HashMap;
use taskdeck_core::db::Connection;
use taskdeck_core::{
    DashboardService, SqliteNoteRepository, SqliteProjectRepository, SqliteTaskRepository, Task,
    TaskFilter, TaskId, TaskService, ACTIVITY_FEED_LEN,
};

use super::{format_when, now, short_id};

#[derive(Args)]
pub struct JsonArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

fn load_tasks(conn: &Connection) -> Result<Vec<Task>> {
    let service = TaskService::new(SqliteTaskRepository::try_new(conn)?);
    Ok(service.all_tasks(&TaskFilter::default())?)
}

fn print_task_line(task: &Task) {
    let due = task.due_at.map(format_when).unwrap_or_default();
    println!(
        "  {}  {}  [{}] {}",
        short_id(&task.id),
        due,
        task.priority,
        task.title
    );
}

pub fn overdue(conn: &Connection, args: JsonArgs) -> Result<()> {
    let service = TaskService::new(SqliteTaskRepository::try_new(conn)?);
    let buckets = service.due_buckets(now())?;
    let tasks = service.all_tasks(&TaskFilter::default())?;
    let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|task| (task.id, task)).collect();
    let overdue: Vec<&Task> = buckets
        .overdue
        .iter()
        .filter_map(|id| by_id.get(id).copied())
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&overdue)?);
        return Ok(());
    }
    if overdue.is_empty() {
        println!("Nothing overdue.");
        return Ok(());
    }
    println!("Overdue ({}):", overdue.len());
    for task in overdue {
        print_task_line(task);
    }
    Ok(())
}

pub fn week(conn: &Connection, args: JsonArgs) -> Result<()> {
    let tasks = load_tasks(conn)?;
    let agenda = taskdeck_core::build_weekly_agenda(&tasks, now());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&agenda)?);
        return Ok(());
    }

    let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|task| (task.id, task)).collect();
    if !agenda.overdue.is_empty() {
        println!("Overdue:");
        for id in &agenda.overdue {
            if let Some(task) = by_id.get(id) {
                print_task_line(task);
            }
        }
        println!();
    }
    for day in &agenda.days {
        println!("{}", day.date.format("%a %Y-%m-%d"));
        if day.tasks.is_empty() {
            println!("  -");
        }
        for id in &day.tasks {
            if let Some(task) = by_id.get(id) {
                let done = if task.is_done() { "x" } else { " " };
                println!("  [{done}] {} ({})", task.title, task.priority);
            }
        }
    }
    Ok(())
}

pub fn dashboard(conn: &Connection, args: JsonArgs) -> Result<()> {
    let service = DashboardService::new(
        SqliteProjectRepository::try_new(conn)?,
        SqliteTaskRepository::try_new(conn)?,
        SqliteNoteRepository::try_new(conn)?,
    );
    let summary = service.summary(now())?;
    let activity = service.activity_feed(ACTIVITY_FEED_LEN)?;

    if args.json {
        let payload = serde_json::json!({
            "summary": summary,
            "activity": activity,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Active projects:   {}", summary.active_projects);
    println!("Trashed projects:  {}", summary.trashed_projects);
    println!("Tasks this week:   {}", summary.tasks_this_week);
    println!("Notes this week:   {}", summary.notes_this_week);

    println!("\nRecent activity:");
    if activity.is_empty() {
        println!("  No recent activity to show.");
    }
    for entry in &activity {
        let label = match entry.kind {
            taskdeck_core::ActivityKind::ProjectAdded => "Project added",
            taskdeck_core::ActivityKind::ProjectTrashed => "Project trashed",
            taskdeck_core::ActivityKind::TaskCreated => "Task created",
            taskdeck_core::ActivityKind::NoteCreated => "Note created",
        };
        println!("  {}  {:<16} {}", format_when(entry.at), label, entry.message);
    }
    Ok(())
}
