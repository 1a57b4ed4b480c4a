//! CLI command definitions and shared helpers.

pub mod export;
pub mod note;
pub mod project;
pub mod reminders;
pub mod report;
pub mod task;

use anyhow::{bail, Result};
use chrono::{NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use taskdeck_core::db::Connection;
use std::path::PathBuf;
use taskdeck_core::schedule::days::parse_day;
use taskdeck_core::{
    Project, ProjectService, SqliteNoteRepository, SqliteProjectRepository, SqliteTaskRepository,
    Task,
};

#[derive(Parser)]
#[command(name = "taskdeck", version, about = "Track projects, tasks and notes")]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "TASKDECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true, env = "TASKDECK_DB")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: project::ProjectCommands,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: task::TaskCommands,
    },

    /// Manage project notes
    Note {
        #[command(subcommand)]
        command: note::NoteCommands,
    },

    /// Show due-date and project reminders
    Reminders(reminders::RemindersArgs),

    /// List overdue tasks
    Overdue(report::JsonArgs),

    /// Show the seven-day agenda
    Week(report::JsonArgs),

    /// Show summary stats and recent activity
    Dashboard(report::JsonArgs),

    /// Export all records
    Export {
        #[command(subcommand)]
        command: export::ExportCommands,
    },

    /// Print the version
    Version,
}

pub type Projects<'c> =
    ProjectService<SqliteProjectRepository<'c>, SqliteTaskRepository<'c>, SqliteNoteRepository<'c>>;

pub fn project_service(conn: &Connection) -> Result<Projects<'_>> {
    Ok(ProjectService::new(
        SqliteProjectRepository::try_new(conn)?,
        SqliteTaskRepository::try_new(conn)?,
        SqliteNoteRepository::try_new(conn)?,
    ))
}

/// Current local wall-clock time.
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Resolves a project by ID, ID prefix or case-insensitive title.
pub fn resolve_project<'a>(identifier: &str, projects: &'a [Project]) -> Result<&'a Project> {
    let needle = identifier.trim();
    if let Some(project) = projects.iter().find(|p| p.id.to_string() == needle) {
        return Ok(project);
    }
    if needle.len() >= 4 {
        let matches: Vec<&Project> = projects
            .iter()
            .filter(|p| p.id.to_string().starts_with(needle))
            .collect();
        match matches.as_slice() {
            [project] => return Ok(*project),
            [] => {}
            _ => bail!("Project ID prefix is ambiguous: {}", identifier),
        }
    }
    if let Some(project) = projects.iter().find(|p| p.title.eq_ignore_ascii_case(needle)) {
        return Ok(project);
    }
    bail!("Project not found: {}", identifier)
}

/// Resolves a task by ID or ID prefix.
pub fn resolve_task<'a>(identifier: &str, tasks: &'a [Task]) -> Result<&'a Task> {
    let needle = identifier.trim();
    if let Some(task) = tasks.iter().find(|t| t.id.to_string() == needle) {
        return Ok(task);
    }
    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|t| needle.len() >= 4 && t.id.to_string().starts_with(needle))
        .collect();
    match matches.as_slice() {
        [task] => Ok(*task),
        [] => bail!("Task not found: {}", identifier),
        _ => bail!("Task ID prefix is ambiguous: {}", identifier),
    }
}

/// Parses `YYYY-MM-DD` or `YYYY-MM-DD HH:MM`.
pub fn parse_when(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    if let Some(day) = parse_day(value) {
        return Ok(day);
    }
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(at);
        }
    }
    bail!("Invalid date `{}`; expected YYYY-MM-DD or YYYY-MM-DD HH:MM", value)
}

pub fn format_when(at: NaiveDateTime) -> String {
    if at.time() == NaiveTime::MIN {
        at.format("%Y-%m-%d").to_string()
    } else {
        at.format("%Y-%m-%d %H:%M").to_string()
    }
}

pub fn short_id(id: &uuid::Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max <= 3 {
        s.chars().take(max).collect()
    } else {
        let mut cut: String = s.chars().take(max - 3).collect();
        cut.push_str("...");
        cut
    }
}
