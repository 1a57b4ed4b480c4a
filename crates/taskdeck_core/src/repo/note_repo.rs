//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/edit/delete and per-project listing over `notes`.
//!
//! # Invariants
//! - Note lists are newest first: `created_at DESC, uuid ASC`.
//! - Stored content is trimmed and non-blank.

use super::{ensure_connection_ready, parse_instant, parse_uuid, RepoError, RepoResult};
use crate::db::instant_to_db;
use crate::model::note::{Note, NoteId};
use crate::model::project::ProjectId;
use crate::model::ValidationError;
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const NOTE_SELECT_SQL: &str = "SELECT uuid, project_uuid, content, created_at FROM notes";

/// Query options for listing notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListQuery {
    pub project_id: Option<ProjectId>,
    /// Case-insensitive substring filter on content.
    pub search: Option<String>,
}

pub trait NoteRepository {
    fn create_note(&self, note: &Note) -> RepoResult<NoteId>;
    fn update_note_content(&self, id: NoteId, content: &str) -> RepoResult<()>;
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    fn list_recent_notes(&self, limit: u32) -> RepoResult<Vec<Note>>;
    fn count_notes_created_since(&self, since: NaiveDateTime) -> RepoResult<u32>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_notes(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;
        self.conn.execute(
            "INSERT INTO notes (uuid, project_uuid, content, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                note.id.to_string(),
                note.project_id.to_string(),
                note.content.trim(),
                instant_to_db(note.created_at),
            ],
        )?;
        Ok(note.id)
    }

    fn update_note_content(&self, id: NoteId, content: &str) -> RepoResult<()> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::BlankContent.into());
        }
        let changed = self.conn.execute(
            "UPDATE notes SET content = ?2 WHERE uuid = ?1;",
            params![id.to_string(), trimmed],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let sql = format!("{NOTE_SELECT_SQL} WHERE uuid = ?;");
        Ok(self
            .query_notes(&sql, vec![Value::Text(id.to_string())])?
            .into_iter()
            .next())
    }

    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let mut sql = format!("{NOTE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values = Vec::new();

        if let Some(project_id) = query.project_id {
            sql.push_str(" AND project_uuid = ?");
            bind_values.push(Value::Text(project_id.to_string()));
        }
        if let Some(needle) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
        {
            sql.push_str(" AND instr(lower(content), lower(?)) > 0");
            bind_values.push(Value::Text(needle.to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC");
        self.query_notes(&sql, bind_values)
    }

    fn list_recent_notes(&self, limit: u32) -> RepoResult<Vec<Note>> {
        let sql = format!("{NOTE_SELECT_SQL} ORDER BY created_at DESC, uuid ASC LIMIT ?;");
        self.query_notes(&sql, vec![Value::Integer(i64::from(limit))])
    }

    fn count_notes_created_since(&self, since: NaiveDateTime) -> RepoResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM notes WHERE created_at >= ?1;",
            [instant_to_db(since)],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let project_text: String = row.get("project_uuid")?;
    let note = Note {
        id: parse_uuid(&uuid_text, "notes.uuid")?,
        project_id: parse_uuid(&project_text, "notes.project_uuid")?,
        content: row.get("content")?,
        created_at: parse_instant(row.get("created_at")?, "notes.created_at")?,
    };
    note.validate()?;
    Ok(note)
}
