//! `taskdeck project` subcommands implementation

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use taskdeck_core::db::Connection;
use taskdeck_core::palette::TagPalette;
use taskdeck_core::schedule::days::parse_day;
use taskdeck_core::{ProjectDraft, ProjectEdit, ProjectOverview};

use super::{format_when, now, project_service, resolve_project, short_id, truncate};

const TABLE_COL_TITLE: usize = 28;
const TABLE_COL_TAGS: usize = 24;

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project
    Add(ProjectAddArgs),

    /// List active projects, or the trash
    List(ProjectListArgs),

    /// Edit project fields
    Edit(ProjectEditArgs),

    /// Move a project to the trash
    Trash(ProjectRefArgs),

    /// Restore a project from the trash
    Restore(ProjectRefArgs),

    /// Permanently delete a trashed project with its tasks and notes
    Purge(ProjectRefArgs),

    /// List all tags in use
    Tags,

    /// Show a project with its tasks and notes
    Show(ProjectShowArgs),
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project title
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    /// Tag (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Reminder day (YYYY-MM-DD)
    #[arg(long)]
    remind: Option<String>,

    /// Enable the reminder
    #[arg(long)]
    notify: bool,
}

#[derive(Args)]
pub struct ProjectListArgs {
    /// Only projects with this tag
    #[arg(long)]
    tag: Option<String>,

    /// List the trash instead
    #[arg(long)]
    trash: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct ProjectEditArgs {
    /// Project ID, ID prefix or title
    project: String,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Replacement tag set (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Remove every tag
    #[arg(long, conflicts_with = "tags")]
    clear_tags: bool,

    /// Reminder day (YYYY-MM-DD)
    #[arg(long)]
    remind: Option<String>,

    /// Remove the reminder day
    #[arg(long, conflicts_with = "remind")]
    clear_remind: bool,

    /// Enable or disable the reminder
    #[arg(long)]
    notify: Option<bool>,
}

#[derive(Args)]
pub struct ProjectRefArgs {
    /// Project ID, ID prefix or title
    project: String,
}

#[derive(Args)]
pub struct ProjectShowArgs {
    /// Project ID, ID prefix or title
    project: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(conn: &Connection, command: ProjectCommands) -> Result<()> {
    match command {
        ProjectCommands::Add(args) => add(conn, args),
        ProjectCommands::List(args) => list(conn, args),
        ProjectCommands::Edit(args) => edit(conn, args),
        ProjectCommands::Trash(args) => trash(conn, args),
        ProjectCommands::Restore(args) => restore(conn, args),
        ProjectCommands::Purge(args) => purge(conn, args),
        ProjectCommands::Tags => tags(conn),
        ProjectCommands::Show(args) => show(conn, args),
    }
}

fn parse_reminder(value: &str) -> Result<chrono::NaiveDate> {
    match parse_day(value) {
        Some(day) => Ok(day.date()),
        None => bail!("Invalid reminder day `{}`; expected YYYY-MM-DD", value),
    }
}

fn add(conn: &Connection, args: ProjectAddArgs) -> Result<()> {
    let service = project_service(conn)?;
    let draft = ProjectDraft {
        title: args.title,
        description: args.description,
        tags: args.tags,
        reminder_date: args.remind.as_deref().map(parse_reminder).transpose()?,
        notify: args.notify,
    };
    let project = service.create_project(&draft, now())?;
    println!("Created project {} ({})", project.title, short_id(&project.id));
    Ok(())
}

fn list(conn: &Connection, args: ProjectListArgs) -> Result<()> {
    let service = project_service(conn)?;

    if args.trash {
        let trashed = service.list_projects(args.tag.as_deref(), true)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&trashed)?);
            return Ok(());
        }
        if trashed.is_empty() {
            println!("Trash is empty.");
            return Ok(());
        }
        for project in &trashed {
            let deleted = project.deleted_at.map(format_when).unwrap_or_default();
            println!("{}  {}  trashed {}", short_id(&project.id), project.title, deleted);
        }
        return Ok(());
    }

    let overviews = service.project_overviews(args.tag.as_deref())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&overviews)?);
        return Ok(());
    }
    if overviews.is_empty() {
        println!("No projects found.");
        return Ok(());
    }

    let mut palette = TagPalette::new();
    println!(
        "{:<8}  {:<width_title$}  {:<width_tags$}  TODO/PROG/DONE  UPDATED",
        "ID",
        "TITLE",
        "TAGS",
        width_title = TABLE_COL_TITLE,
        width_tags = TABLE_COL_TAGS
    );
    for overview in &overviews {
        print_overview_row(overview, &mut palette);
    }
    Ok(())
}

fn print_overview_row(overview: &ProjectOverview, palette: &mut TagPalette) {
    let tags = overview
        .project
        .tags
        .iter()
        .map(|tag| format!("{tag}:{}", palette.color(tag)))
        .collect::<Vec<_>>()
        .join(",");
    let updated = overview
        .last_updated
        .map(format_when)
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<8}  {:<width_title$}  {:<width_tags$}  {:>4}/{:>4}/{:>4}  {}",
        short_id(&overview.project.id),
        truncate(&overview.project.title, TABLE_COL_TITLE),
        truncate(&tags, TABLE_COL_TAGS),
        overview.counts.todo,
        overview.counts.in_progress,
        overview.counts.done,
        updated,
        width_title = TABLE_COL_TITLE,
        width_tags = TABLE_COL_TAGS
    );
}

fn edit(conn: &Connection, args: ProjectEditArgs) -> Result<()> {
    let service = project_service(conn)?;
    let projects = service.list_projects(None, false)?;
    let target = resolve_project(&args.project, &projects)?.id;

    let tags = if args.clear_tags {
        Some(Vec::new())
    } else if args.tags.is_empty() {
        None
    } else {
        Some(args.tags)
    };
    let reminder_date = if args.clear_remind {
        Some(None)
    } else {
        args.remind
            .as_deref()
            .map(parse_reminder)
            .transpose()?
            .map(Some)
    };

    let edit = ProjectEdit {
        title: args.title,
        description: args.description,
        tags,
        reminder_date,
        notify: args.notify,
    };
    let project = service.update_project(target, &edit)?;
    println!("Updated project {}", project.title);
    Ok(())
}

fn trash(conn: &Connection, args: ProjectRefArgs) -> Result<()> {
    let service = project_service(conn)?;
    let projects = service.list_projects(None, false)?;
    let project = resolve_project(&args.project, &projects)?;
    service.trash_project(project.id, now())?;
    println!("Moved {} to trash", project.title);
    Ok(())
}

fn restore(conn: &Connection, args: ProjectRefArgs) -> Result<()> {
    let service = project_service(conn)?;
    let trashed = service.list_projects(None, true)?;
    let project = resolve_project(&args.project, &trashed)?;
    service.restore_project(project.id)?;
    println!("Restored {}", project.title);
    Ok(())
}

fn purge(conn: &Connection, args: ProjectRefArgs) -> Result<()> {
    let service = project_service(conn)?;
    let trashed = service.list_projects(None, true)?;
    let project = resolve_project(&args.project, &trashed)?;
    service.purge_project(project.id)?;
    println!("Permanently deleted {}", project.title);
    Ok(())
}

fn tags(conn: &Connection) -> Result<()> {
    let service = project_service(conn)?;
    let mut palette = TagPalette::new();
    for tag in service.available_tags()? {
        let color = palette.color(&tag);
        println!("{tag} ({color})");
    }
    Ok(())
}

fn show(conn: &Connection, args: ProjectShowArgs) -> Result<()> {
    let service = project_service(conn)?;
    let mut projects = service.list_projects(None, false)?;
    projects.extend(service.list_projects(None, true)?);
    let project = resolve_project(&args.project, &projects)?;
    let bundle = service.project_bundle(project.id)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
        return Ok(());
    }

    println!("{} ({})", bundle.project.title, bundle.project.id);
    if !bundle.project.description.is_empty() {
        println!("  {}", bundle.project.description);
    }
    if !bundle.project.tags.is_empty() {
        println!("  tags: {}", bundle.project.tags.join(", "));
    }
    if let Some(day) = bundle.project.reminder_date {
        let state = if bundle.project.notify { "on" } else { "off" };
        println!("  reminder: {} ({state})", day.format("%Y-%m-%d"));
    }
    if bundle.project.is_deleted {
        println!("  in trash");
    }

    println!("\nTasks ({}):", bundle.tasks.len());
    for task in &bundle.tasks {
        let due = task.due_at.map(format_when).unwrap_or_default();
        println!(
            "  {}  [{}] {} ({}) {}",
            short_id(&task.id),
            task.status,
            task.title,
            task.priority,
            due
        );
    }

    println!("\nNotes ({}):", bundle.notes.len());
    for note in &bundle.notes {
        println!("  {}  {}  {}", short_id(&note.id), format_when(note.created_at), note.content);
    }
    Ok(())
}
