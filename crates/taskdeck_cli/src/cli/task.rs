//! `taskdeck task` subcommands implementation

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::fs;
use std::path::PathBuf;
use taskdeck_core::db::Connection;
use taskdeck_core::export::csv::tasks_to_csv;
use taskdeck_core::{
    AddTaskRequest, Cadence, Priority, SqliteTaskRepository, Task, TaskEdit, TaskFilter,
    TaskService, TaskStatus,
};

use super::{
    format_when, now, parse_when, project_service, resolve_project, resolve_task, short_id,
    truncate,
};
use crate::config::Config;

const TABLE_COL_TITLE: usize = 32;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task, expanding recurring tasks into occurrences
    Add(TaskAddArgs),

    /// List tasks one page at a time
    List(TaskListArgs),

    /// Edit title, priority or due date
    Edit(TaskEditArgs),

    /// Set task status
    Status(TaskStatusArgs),

    /// Delete a task
    Delete(TaskRefArgs),

    /// Import tasks from a CSV file
    Import(TaskImportArgs),

    /// Export tasks as CSV
    Export(TaskExportArgs),
}

#[derive(Args)]
pub struct TaskAddArgs {
    /// Project ID, ID prefix or title
    project: String,

    /// Task title
    title: String,

    /// First due date (YYYY-MM-DD or YYYY-MM-DD HH:MM); defaults to now
    #[arg(long)]
    due: Option<String>,

    #[arg(long, default_value = "medium")]
    priority: Priority,

    /// Repeat daily, weekly or monthly
    #[arg(long, requires = "until")]
    every: Option<Cadence>,

    /// Last allowed occurrence date
    #[arg(long, requires = "every")]
    until: Option<String>,
}

#[derive(Args)]
pub struct TaskListArgs {
    /// Project ID, ID prefix or title
    #[arg(long)]
    project: Option<String>,

    /// todo, "in progress" or done
    #[arg(long)]
    status: Option<TaskStatus>,

    /// Case-insensitive title search
    #[arg(long)]
    search: Option<String>,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct TaskEditArgs {
    /// Task ID or ID prefix
    task: String,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    priority: Option<Priority>,

    #[arg(long)]
    due: Option<String>,

    /// Remove the due date
    #[arg(long, conflicts_with = "due")]
    clear_due: bool,
}

#[derive(Args)]
pub struct TaskStatusArgs {
    /// Task ID or ID prefix
    task: String,

    /// todo, "in progress" or done
    status: TaskStatus,
}

#[derive(Args)]
pub struct TaskRefArgs {
    /// Task ID or ID prefix
    task: String,
}

#[derive(Args)]
pub struct TaskImportArgs {
    /// Project ID, ID prefix or title
    project: String,

    /// CSV file with Title, Status, Priority and Due Date columns
    file: PathBuf,
}

#[derive(Args)]
pub struct TaskExportArgs {
    /// Project ID, ID prefix or title
    #[arg(long)]
    project: Option<String>,

    #[arg(long)]
    status: Option<TaskStatus>,

    /// Output file (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

pub fn run(conn: &Connection, config: &Config, command: TaskCommands) -> Result<()> {
    let mut service = TaskService::new(SqliteTaskRepository::try_new(conn)?)
        .with_page_size(config.page_size.unwrap_or_default());

    match command {
        TaskCommands::Add(args) => add(conn, &mut service, args),
        TaskCommands::List(args) => list(conn, &service, args),
        TaskCommands::Edit(args) => edit(&mut service, args),
        TaskCommands::Status(args) => status(&mut service, args),
        TaskCommands::Delete(args) => delete(&mut service, args),
        TaskCommands::Import(args) => import(conn, &mut service, args),
        TaskCommands::Export(args) => export(conn, &service, args),
    }
}

type Tasks<'c> = TaskService<SqliteTaskRepository<'c>>;

fn project_id(conn: &Connection, identifier: &str) -> Result<uuid::Uuid> {
    let projects = project_service(conn)?.list_projects(None, false)?;
    Ok(resolve_project(identifier, &projects)?.id)
}

fn find_task(service: &Tasks<'_>, identifier: &str) -> Result<Task> {
    let tasks = service.all_tasks(&TaskFilter::default())?;
    Ok(resolve_task(identifier, &tasks)?.clone())
}

fn add(conn: &Connection, service: &mut Tasks<'_>, args: TaskAddArgs) -> Result<()> {
    let mut request = AddTaskRequest::new(project_id(conn, &args.project)?, args.title);
    request.priority = args.priority;
    request.due_at = args.due.as_deref().map(parse_when).transpose()?;
    if let (Some(cadence), Some(until)) = (args.every, args.until.as_deref()) {
        request = request.recurring(cadence, parse_when(until)?);
    }

    let created = service.add_task(&request, now())?;
    if created.len() == 1 {
        println!("Created task {}", short_id(&created[0].id));
    } else {
        println!("Created {} occurrences", created.len());
    }
    Ok(())
}

fn list(conn: &Connection, service: &Tasks<'_>, args: TaskListArgs) -> Result<()> {
    let filter = TaskFilter {
        project_id: args
            .project
            .as_deref()
            .map(|identifier| project_id(conn, identifier))
            .transpose()?,
        status: args.status,
        search: args.search,
    };
    let page = service.list_tasks(&filter, args.page)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page.items)?);
        return Ok(());
    }
    if page.items.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    println!(
        "{:<8}  {:<width$}  {:<11}  {:<6}  DUE",
        "ID",
        "TITLE",
        "STATUS",
        "PRIO",
        width = TABLE_COL_TITLE
    );
    for task in &page.items {
        let due = task.due_at.map(format_when).unwrap_or_default();
        let marker = if task.is_recurring { "*" } else { "" };
        println!(
            "{:<8}  {:<width$}  {:<11}  {:<6}  {}{}",
            short_id(&task.id),
            truncate(&task.title, TABLE_COL_TITLE),
            task.status.label(),
            task.priority.code(),
            due,
            marker,
            width = TABLE_COL_TITLE
        );
    }
    println!(
        "\nPage {} of {} ({} tasks)",
        page.page, page.total_pages, page.total_items
    );
    Ok(())
}

fn edit(service: &mut Tasks<'_>, args: TaskEditArgs) -> Result<()> {
    let task = find_task(service, &args.task)?;
    let due_at = if args.clear_due {
        Some(None)
    } else {
        args.due.as_deref().map(parse_when).transpose()?.map(Some)
    };
    let edit = TaskEdit {
        title: args.title,
        priority: args.priority,
        due_at,
    };
    let updated = service.edit_task(task.id, &edit)?;
    println!("Updated task {}", short_id(&updated.id));
    Ok(())
}

fn status(service: &mut Tasks<'_>, args: TaskStatusArgs) -> Result<()> {
    let task = find_task(service, &args.task)?;
    service.set_status(task.id, args.status)?;
    println!("Task marked as {}", args.status);
    Ok(())
}

fn delete(service: &mut Tasks<'_>, args: TaskRefArgs) -> Result<()> {
    let task = find_task(service, &args.task)?;
    service.delete_task(task.id)?;
    println!("Deleted task {}", short_id(&task.id));
    Ok(())
}

fn import(conn: &Connection, service: &mut Tasks<'_>, args: TaskImportArgs) -> Result<()> {
    let project = project_id(conn, &args.project)?;
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let report = service.import_csv(project, &text, now())?;

    println!("Imported {} tasks", report.imported.len());
    for (line, reason) in &report.rejected {
        eprintln!("  line {line}: {reason}");
    }
    for (line, reason) in &report.warnings {
        eprintln!("  line {line} (warning): {reason}");
    }
    Ok(())
}

fn export(conn: &Connection, service: &Tasks<'_>, args: TaskExportArgs) -> Result<()> {
    let filter = TaskFilter {
        project_id: args
            .project
            .as_deref()
            .map(|identifier| project_id(conn, identifier))
            .transpose()?,
        status: args.status,
        search: None,
    };
    let csv = tasks_to_csv(&service.all_tasks(&filter)?);

    match args.output {
        Some(path) => {
            fs::write(&path, csv).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}
