//! `taskdeck note` subcommands implementation

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use taskdeck_core::db::Connection;
use taskdeck_core::{Note, NoteService, SqliteNoteRepository};

use super::{format_when, now, project_service, resolve_project, short_id};

#[derive(Subcommand)]
pub enum NoteCommands {
    /// Add a note to a project
    Add(NoteAddArgs),

    /// List notes, newest first
    List(NoteListArgs),

    /// Replace a note's text
    Edit(NoteEditArgs),

    /// Delete a note
    Delete(NoteRefArgs),
}

#[derive(Args)]
pub struct NoteAddArgs {
    /// Project ID, ID prefix or title
    project: String,

    content: String,
}

#[derive(Args)]
pub struct NoteListArgs {
    /// Project ID, ID prefix or title
    #[arg(long)]
    project: Option<String>,

    /// Case-insensitive text search
    #[arg(long)]
    search: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct NoteEditArgs {
    /// Note ID or ID prefix
    note: String,

    content: String,
}

#[derive(Args)]
pub struct NoteRefArgs {
    /// Note ID or ID prefix
    note: String,
}

pub fn run(conn: &Connection, command: NoteCommands) -> Result<()> {
    let service = NoteService::new(SqliteNoteRepository::try_new(conn)?);
    match command {
        NoteCommands::Add(args) => {
            let projects = project_service(conn)?.list_projects(None, false)?;
            let project = resolve_project(&args.project, &projects)?;
            let note = service.add_note(project.id, &args.content, now())?;
            println!("Added note {} to {}", short_id(&note.id), project.title);
        }
        NoteCommands::List(args) => {
            let project_id = match args.project.as_deref() {
                Some(identifier) => {
                    let projects = project_service(conn)?.list_projects(None, false)?;
                    Some(resolve_project(identifier, &projects)?.id)
                }
                None => None,
            };
            let notes = service.list_notes(project_id, args.search.as_deref())?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else if notes.is_empty() {
                println!("No notes found.");
            } else {
                for note in &notes {
                    println!(
                        "{}  {}  {}",
                        short_id(&note.id),
                        format_when(note.created_at),
                        note.content
                    );
                }
            }
        }
        NoteCommands::Edit(args) => {
            let note = resolve_note(&args.note, &service.list_notes(None, None)?)?;
            service.edit_note(note.id, &args.content)?;
            println!("Updated note {}", short_id(&note.id));
        }
        NoteCommands::Delete(args) => {
            let note = resolve_note(&args.note, &service.list_notes(None, None)?)?;
            service.delete_note(note.id)?;
            println!("Deleted note {}", short_id(&note.id));
        }
    }
    Ok(())
}

fn resolve_note(identifier: &str, notes: &[Note]) -> Result<Note> {
    let needle = identifier.trim();
    let matches: Vec<&Note> = notes
        .iter()
        .filter(|note| {
            let id = note.id.to_string();
            id == needle || (needle.len() >= 4 && id.starts_with(needle))
        })
        .collect();
    match matches.as_slice() {
        [note] => Ok((*note).clone()),
        [] => bail!("Note not found: {}", identifier),
        _ => bail!("Note ID prefix is ambiguous: {}", identifier),
    }
}
